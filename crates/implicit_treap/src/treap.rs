use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{OutOfRange, Result};
use crate::node::{Link, Node};
use crate::value::SumValue;

const DEFAULT_SEED: u64 = 0x5EED_7EA9;

/// A mutable sequence addressed by position, backed by a randomized
/// balanced tree with lazy range add and lazy range reversal.
///
/// All positional operations take `O(log n)` expected time. Ranges are
/// closed: `range_sum(l, r)` covers positions `l..=r`.
///
/// Reads take `&mut self` because they resolve pending lazy state along the
/// path they walk. This never changes the observable sequence.
///
/// ```
/// use implicit_treap::ImplicitTreap;
///
/// let mut seq = ImplicitTreap::new();
/// seq.insert(5, 0).unwrap();
/// seq.insert(3, 0).unwrap();
/// seq.insert(7, 1).unwrap();
/// assert_eq!(seq.to_vec(), vec![3, 7, 5]);
///
/// seq.range_add(0, 1, 10).unwrap();
/// seq.reverse(0, 2).unwrap();
/// assert_eq!(seq.to_vec(), vec![5, 17, 13]);
/// assert_eq!(seq.range_sum(0, 2), Ok(35));
/// ```
#[derive(Clone)]
pub struct ImplicitTreap<T, R = StdRng> {
    root: Link<T>,
    rng: R,
}

impl<T: SumValue> ImplicitTreap<T> {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<T: SumValue, R: Rng> ImplicitTreap<T, R> {
    pub fn with_rng(rng: R) -> Self {
        Self { root: None, rng }
    }

    /// Builds a sequence from `values` in linear time.
    pub fn from_iter_with_rng<I: IntoIterator<Item = T>>(values: I, mut rng: R) -> Self {
        let root = Node::build(values, &mut rng);
        log::debug!("built implicit treap of length {}", Node::size(&root));
        Self { root, rng }
    }

    pub fn len(&self) -> usize {
        Node::size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Inserts `value` so that it ends up at `position`, shifting later
    /// elements right. Requires `position <= len()`.
    pub fn insert(&mut self, value: T, position: usize) -> Result<()> {
        self.check_index(position, self.len() + 1)?;
        let node = Some(Box::new(Node::new(value, self.rng.random())));
        let (left, right) = Node::split(self.root.take(), position);
        self.root = Node::merge(Node::merge(left, node), right);
        Ok(())
    }

    pub fn push_back(&mut self, value: T) {
        let node = Some(Box::new(Node::new(value, self.rng.random())));
        self.root = Node::merge(self.root.take(), node);
    }

    /// Removes and returns the element at `position`.
    pub fn erase(&mut self, position: usize) -> Result<T> {
        self.check_index(position, self.len())?;
        let (left, rest) = Node::split(self.root.take(), position);
        let (target, right) = Node::split(rest, 1);
        self.root = Node::merge(left, right);
        target.map(|node| node.value).ok_or_else(|| OutOfRange::Index {
            index: position,
            len: self.len(),
        })
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.len().checked_sub(1)?;
        self.erase(last).ok()
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.erase(0).ok()
    }

    pub fn at(&mut self, position: usize) -> Result<T> {
        let len = self.len();
        self.check_index(position, len)?;
        Node::get(&mut self.root, position)
            .cloned()
            .ok_or_else(|| OutOfRange::Index {
                index: position,
                len,
            })
    }

    pub fn set(&mut self, position: usize, value: T) -> Result<()> {
        self.check_index(position, self.len())?;
        Node::set(&mut self.root, position, value);
        Ok(())
    }

    /// Sum of the elements at positions `l..=r`.
    pub fn range_sum(&mut self, l: usize, r: usize) -> Result<T> {
        self.check_range(l, r)?;
        Ok(self.with_middle(l, r, |mid| Node::agg(mid)))
    }

    /// Adds `delta` to every element at positions `l..=r`.
    pub fn range_add(&mut self, l: usize, r: usize, delta: T) -> Result<()> {
        self.check_range(l, r)?;
        self.with_middle(l, r, |mid| {
            if let Some(node) = mid.as_deref_mut() {
                node.apply_add(&delta);
            }
        });
        Ok(())
    }

    /// Reverses the order of the elements at positions `l..=r`.
    pub fn reverse(&mut self, l: usize, r: usize) -> Result<()> {
        self.check_range(l, r)?;
        self.with_middle(l, r, |mid| {
            if let Some(node) = mid.as_deref_mut() {
                node.toggle_reverse();
            }
        });
        Ok(())
    }

    pub fn clear(&mut self) {
        log::debug!("clearing implicit treap of length {}", self.len());
        self.root = None;
    }

    /// Moves every element of `other` to the end of `self`.
    pub fn append(&mut self, other: Self) {
        log::trace!("appending {} elements to {}", other.len(), self.len());
        self.root = Node::merge(self.root.take(), other.root);
    }

    /// Splits the sequence in two: `self` keeps `[0, at)` and the returned
    /// sequence holds `[at, len)`. Requires `at <= len()`.
    pub fn split_off(&mut self, at: usize) -> Result<Self>
    where
        R: SeedableRng,
    {
        self.check_index(at, self.len() + 1)?;
        log::trace!("splitting implicit treap of length {} at {}", self.len(), at);
        let (left, right) = Node::split(self.root.take(), at);
        self.root = left;
        Ok(Self {
            root: right,
            rng: R::from_rng(&mut self.rng),
        })
    }

    /// Position of the first element `>= value`, or `len()` if there is
    /// none. Only meaningful while the sequence is sorted ascending.
    pub fn lower_bound(&mut self, value: &T) -> usize
    where
        T: PartialOrd,
    {
        let len = self.len();
        Node::lower_bound(&mut self.root, value, 0).unwrap_or(len)
    }

    /// Position of the first element equal to `value`, assuming the
    /// sequence is sorted ascending.
    pub fn find_pos(&mut self, value: &T) -> Option<usize>
    where
        T: PartialOrd,
    {
        let position = Node::lower_bound(&mut self.root, value, 0)?;
        match Node::get(&mut self.root, position) {
            Some(found) if found == value => Some(position),
            _ => None,
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        Node::collect(&self.root, None, false, &mut out);
        out
    }

    pub(crate) fn resolve_all(&mut self) -> &Link<T> {
        Node::resolve_all(&mut self.root);
        &self.root
    }

    pub(crate) fn into_root(self) -> Link<T> {
        self.root
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    fn with_middle<U, F>(&mut self, l: usize, r: usize, f: F) -> U
    where
        F: FnOnce(&mut Link<T>) -> U,
    {
        let (left, rest) = Node::split(self.root.take(), l);
        let (mut mid, right) = Node::split(rest, r - l + 1);
        let out = f(&mut mid);
        self.root = Node::merge(left, Node::merge(mid, right));
        out
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<()> {
        if index < bound {
            return Ok(());
        }
        log::trace!("rejected index {index} (bound {bound})");
        Err(OutOfRange::Index {
            index,
            len: self.len(),
        })
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        let len = self.len();
        if start <= end && end < len {
            return Ok(());
        }
        log::trace!("rejected range [{start}, {end}] (len {len})");
        Err(OutOfRange::Range { start, end, len })
    }
}

impl<T: SumValue> Default for ImplicitTreap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SumValue + fmt::Debug, R> fmt::Debug for ImplicitTreap<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut values = Vec::with_capacity(Node::size(&self.root));
        Node::collect(&self.root, None, false, &mut values);
        f.debug_list().entries(values.iter()).finish()
    }
}

impl<T: SumValue + PartialEq, R, S> PartialEq<ImplicitTreap<T, S>> for ImplicitTreap<T, R> {
    fn eq(&self, other: &ImplicitTreap<T, S>) -> bool {
        if Node::size(&self.root) != Node::size(&other.root) {
            return false;
        }
        let mut lhs = Vec::new();
        let mut rhs = Vec::new();
        Node::collect(&self.root, None, false, &mut lhs);
        Node::collect(&other.root, None, false, &mut rhs);
        lhs == rhs
    }
}

impl<T: SumValue + Eq, R> Eq for ImplicitTreap<T, R> {}

#[cfg(test)]
impl<T: SumValue + PartialEq + fmt::Debug, R> ImplicitTreap<T, R> {
    pub(crate) fn assert_invariants(&self) {
        Node::assert_invariants(&self.root);
    }
}
