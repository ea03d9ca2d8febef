//! A positional sequence backed by an implicit treap.
//!
//! [`ImplicitTreap`] stores an ordered sequence of summable values and
//! supports insertion, removal, random access, range sum, range add and
//! range reversal in `O(log n)` expected time, using lazy propagation for
//! the two range updates.

mod error;
mod iter;
mod node;
mod treap;
mod value;

pub use error::{OutOfRange, Result};
pub use iter::{IntoIter, Iter};
pub use treap::ImplicitTreap;
pub use value::SumValue;
