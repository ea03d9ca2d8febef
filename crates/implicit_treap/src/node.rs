use std::mem;

use rand::Rng;

use crate::value::SumValue;

pub(crate) type Link<T> = Option<Box<Node<T>>>;

/// A treap node keyed implicitly by its in-order position.
///
/// Lazy state conventions:
/// - `pending_add` has already been applied to `value` and `agg` of this
///   node, but not yet to the children.
/// - `pending_rev` means `left` and `right` are stored in the opposite
///   order and have not been swapped yet.
///
/// Both are cleared by [`Node::push`], which must run before the children
/// are read or re-linked.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    agg: T,
    pending_add: Option<T>,
    pending_rev: bool,
    priority: u64,
    size: usize,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T: SumValue> Node<T> {
    pub(crate) fn new(value: T, priority: u64) -> Self {
        Self {
            agg: value.clone(),
            value,
            pending_add: None,
            pending_rev: false,
            priority,
            size: 1,
            left: None,
            right: None,
        }
    }

    pub(crate) fn size(link: &Link<T>) -> usize {
        link.as_ref().map_or(0, |node| node.size)
    }

    pub(crate) fn agg(link: &Link<T>) -> T {
        link.as_ref().map_or_else(T::zero, |node| node.agg.clone())
    }

    /// Adds `delta` to every element of this subtree.
    pub(crate) fn apply_add(&mut self, delta: &T) {
        self.value = self.value.clone() + delta.clone();
        self.agg = self.agg.clone() + delta.times(self.size);
        self.pending_add = Some(match self.pending_add.take() {
            Some(pending) => pending + delta.clone(),
            None => delta.clone(),
        });
    }

    pub(crate) fn toggle_reverse(&mut self) {
        self.pending_rev = !self.pending_rev;
    }

    /// Pushes pending state one level down.
    ///
    /// The two channels commute: the additive delta does not depend on
    /// which child is on which side. An orientation-sensitive action (e.g.
    /// range assign) would need the swap to happen first.
    pub(crate) fn push(&mut self) {
        if self.pending_rev {
            mem::swap(&mut self.left, &mut self.right);
            if let Some(left) = self.left.as_deref_mut() {
                left.toggle_reverse();
            }
            if let Some(right) = self.right.as_deref_mut() {
                right.toggle_reverse();
            }
            self.pending_rev = false;
        }

        if let Some(delta) = self.pending_add.take() {
            if let Some(left) = self.left.as_deref_mut() {
                left.apply_add(&delta);
            }
            if let Some(right) = self.right.as_deref_mut() {
                right.apply_add(&delta);
            }
        }
    }

    // Children may still hold lazy state; their `agg` already includes it.
    pub(crate) fn recalc(&mut self) {
        self.size = 1 + Self::size(&self.left) + Self::size(&self.right);
        self.agg = Self::agg(&self.left) + self.value.clone() + Self::agg(&self.right);
    }

    pub(crate) fn split(root: Link<T>, left_count: usize) -> (Link<T>, Link<T>) {
        let mut node = match root {
            Some(node) => node,
            None => return (None, None),
        };
        if left_count == 0 {
            return (None, Some(node));
        }
        if left_count >= node.size {
            return (Some(node), None);
        }

        node.push();
        let left_size = Self::size(&node.left);
        if left_count <= left_size {
            let (left, right) = Self::split(node.left.take(), left_count);
            node.left = right;
            node.recalc();
            (left, Some(node))
        } else {
            let (left, right) = Self::split(node.right.take(), left_count - left_size - 1);
            node.right = left;
            node.recalc();
            (Some(node), right)
        }
    }

    /// Concatenates two sequences, every element of `left` first.
    pub(crate) fn merge(left: Link<T>, right: Link<T>) -> Link<T> {
        match (left, right) {
            (None, right) => right,
            (left, None) => left,
            (Some(mut left), Some(mut right)) => {
                if left.priority > right.priority {
                    left.push();
                    left.right = Self::merge(left.right.take(), Some(right));
                    left.recalc();
                    Some(left)
                } else {
                    right.push();
                    right.left = Self::merge(Some(left), right.left.take());
                    right.recalc();
                    Some(right)
                }
            }
        }
    }

    /// Builds a treap holding `values` in order, in linear time.
    ///
    /// The stack holds the right spine of the tree built so far, with
    /// priorities strictly decreasing from bottom to top.
    pub(crate) fn build<I, R>(values: I, rng: &mut R) -> Link<T>
    where
        I: IntoIterator<Item = T>,
        R: Rng + ?Sized,
    {
        let mut spine: Vec<Box<Node<T>>> = Vec::new();
        for value in values {
            let mut node = Box::new(Node::new(value, rng.random()));
            let mut chain: Link<T> = None;
            while let Some(mut top) = spine.pop() {
                if top.priority >= node.priority {
                    spine.push(top);
                    break;
                }
                top.right = chain;
                top.recalc();
                chain = Some(top);
            }
            node.left = chain;
            node.recalc();
            spine.push(node);
        }

        let mut root: Link<T> = None;
        while let Some(mut top) = spine.pop() {
            top.right = root;
            top.recalc();
            root = Some(top);
        }
        root
    }

    pub(crate) fn get(link: &mut Link<T>, index: usize) -> Option<&T> {
        let node = link.as_deref_mut()?;
        node.push();
        let left_size = Self::size(&node.left);
        if index < left_size {
            Self::get(&mut node.left, index)
        } else if index == left_size {
            Some(&node.value)
        } else {
            Self::get(&mut node.right, index - left_size - 1)
        }
    }

    pub(crate) fn set(link: &mut Link<T>, index: usize, value: T) {
        let Some(node) = link.as_deref_mut() else {
            return;
        };
        node.push();
        let left_size = Self::size(&node.left);
        if index < left_size {
            Self::set(&mut node.left, index, value);
        } else if index == left_size {
            node.value = value;
        } else {
            Self::set(&mut node.right, index - left_size - 1, value);
        }
        node.recalc();
    }

    pub(crate) fn lower_bound(link: &mut Link<T>, value: &T, offset: usize) -> Option<usize>
    where
        T: PartialOrd,
    {
        let node = link.as_deref_mut()?;
        node.push();
        let here = offset + Self::size(&node.left);
        if node.value >= *value {
            Some(Self::lower_bound(&mut node.left, value, offset).unwrap_or(here))
        } else {
            Self::lower_bound(&mut node.right, value, here + 1)
        }
    }

    pub(crate) fn resolve_all(link: &mut Link<T>) {
        if let Some(node) = link.as_deref_mut() {
            node.push();
            Self::resolve_all(&mut node.left);
            Self::resolve_all(&mut node.right);
        }
    }

    // `inherited`: pending adds of the ancestors. `flipped`: parity of their reversals.
    pub(crate) fn collect(link: &Link<T>, inherited: Option<&T>, flipped: bool, out: &mut Vec<T>) {
        let Some(node) = link.as_deref() else {
            return;
        };
        let value = match inherited {
            Some(delta) => node.value.clone() + delta.clone(),
            None => node.value.clone(),
        };
        let below = match (inherited, node.pending_add.as_ref()) {
            (Some(outer), Some(own)) => Some(outer.clone() + own.clone()),
            (Some(outer), None) => Some(outer.clone()),
            (None, own) => own.cloned(),
        };
        let flipped_below = flipped ^ node.pending_rev;
        let (first, second) = if flipped_below {
            (&node.right, &node.left)
        } else {
            (&node.left, &node.right)
        };
        Self::collect(first, below.as_ref(), flipped_below, out);
        out.push(value);
        Self::collect(second, below.as_ref(), flipped_below, out);
    }

    pub(crate) fn drain(link: Link<T>, out: &mut Vec<T>) {
        if let Some(mut node) = link {
            node.push();
            let right = node.right.take();
            Self::drain(node.left.take(), out);
            out.push(node.value);
            Self::drain(right, out);
        }
    }
}

#[cfg(test)]
impl<T: SumValue + PartialEq + std::fmt::Debug> Node<T> {
    pub(crate) fn assert_invariants(link: &Link<T>) -> usize {
        let Some(node) = link.as_deref() else {
            return 0;
        };
        for child in [&node.left, &node.right].into_iter().flatten() {
            assert!(child.priority <= node.priority, "heap order violated");
        }
        let left_size = Self::assert_invariants(&node.left);
        let right_size = Self::assert_invariants(&node.right);
        assert_eq!(node.size, 1 + left_size + right_size, "size mismatch");

        let mut expected = Self::agg(&node.left) + node.value.clone() + Self::agg(&node.right);
        if let Some(pending) = node.pending_add.as_ref() {
            expected = expected + pending.times(left_size + right_size);
        }
        assert_eq!(node.agg, expected, "aggregate mismatch");
        node.size
    }
}
