use std::iter::FusedIterator;
use std::vec;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::node::{Link, Node};
use crate::treap::ImplicitTreap;
use crate::value::SumValue;

/// In-order iterator over a fully resolved tree.
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T: SumValue> Iter<'a, T> {
    fn new(root: &'a Link<T>) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: Node::size(root),
        };
        iter.descend_left(root.as_deref());
        iter
    }

    fn descend_left(&mut self, mut link: Option<&'a Node<T>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, T: SumValue> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend_left(node.right.as_deref());
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: SumValue> ExactSizeIterator for Iter<'_, T> {}

impl<T: SumValue> FusedIterator for Iter<'_, T> {}

/// Owning iterator, produced by [`ImplicitTreap::into_iter`].
pub struct IntoIter<T> {
    inner: vec::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: SumValue, R: Rng> ImplicitTreap<T, R> {
    /// Iterates over the sequence in order.
    ///
    /// Resolves all pending lazy state first, which costs `O(n)` once.
    pub fn iter(&mut self) -> Iter<'_, T> {
        Iter::new(self.resolve_all())
    }
}

impl<'a, T: SumValue, R: Rng> IntoIterator for &'a mut ImplicitTreap<T, R> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: SumValue, R: Rng> IntoIterator for ImplicitTreap<T, R> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let mut values = Vec::with_capacity(self.len());
        Node::drain(self.into_root(), &mut values);
        IntoIter {
            inner: values.into_iter(),
        }
    }
}

impl<T: SumValue> FromIterator<T> for ImplicitTreap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<T: SumValue> From<Vec<T>> for ImplicitTreap<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: SumValue, R: Rng + SeedableRng> Extend<T> for ImplicitTreap<T, R> {
    /// Builds the new elements as a separate tree in linear time and
    /// concatenates it.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let tail = Self::from_iter_with_rng(iter, R::from_rng(self.rng_mut()));
        self.append(tail);
    }
}

impl<T: SumValue> ImplicitTreap<T, StdRng> {
    /// Builds a sequence from `values` with priorities drawn from `seed`.
    pub fn from_iter_with_seed<I: IntoIterator<Item = T>>(values: I, seed: u64) -> Self {
        Self::from_iter_with_rng(values, StdRng::seed_from_u64(seed))
    }
}
