use std::ops::Add;

/// Element type of an [`ImplicitTreap`](crate::ImplicitTreap).
///
/// Range sums need an additive identity and addition; range adds also need
/// the sum of `count` copies of a delta so that a subtree aggregate can be
/// updated without visiting the subtree.
pub trait SumValue: Clone + Add<Output = Self> {
    fn zero() -> Self;

    /// `self + self + ... + self`, `count` times.
    ///
    /// No intermediate value exceeds the full sum in magnitude, so this does
    /// not overflow whenever the result fits in `Self`.
    fn times(&self, count: usize) -> Self {
        let mut result = Self::zero();
        let mut base = self.clone();
        let mut count = count;
        while count > 0 {
            if count & 1 == 1 {
                result = result + base.clone();
            }
            count >>= 1;
            if count > 0 {
                base = base.clone() + base;
            }
        }
        result
    }
}

macro_rules! impl_sum_value_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl SumValue for $t {
                fn zero() -> Self {
                    0
                }
            }
        )*
    };
}

macro_rules! impl_sum_value_float {
    ($($t:ty),* $(,)?) => {
        $(
            impl SumValue for $t {
                fn zero() -> Self {
                    0.0
                }

                fn times(&self, count: usize) -> Self {
                    *self * count as $t
                }
            }
        )*
    };
}

impl_sum_value_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_sum_value_float!(f32, f64);
