//! A red-black tree engine for ordered containers.
//!
//! [`RbTree`] stores values in key order and can run in two modes on the same
//! tree: *unique* insertion rejects a value whose key is already present,
//! *equal* insertion keeps duplicates in the order they were inserted. How a
//! value maps to its key and how keys compare is decided by a [`KeyPolicy`],
//! which is all a set, map, multiset or multimap facade has to supply.
//!
//! Nodes live in an arena and are addressed by stable [`Handle`]s. A [`Pos`]
//! is either a node or the past-the-end position, and works like a C++
//! iterator: it survives insertions and the erasure of other elements.
//!
//! ```
//! use rbtree_engine::{First, RbTree};
//!
//! let mut map = RbTree::new(First);
//! for (k, v) in [(5, 'e'), (3, 'c'), (8, 'h')] {
//!     map.insert_unique((k, v));
//! }
//! let pos = map.lower_bound(&4);
//! assert_eq!(map.get(pos), Some(&(5, 'e')));
//! assert_eq!(map.get(map.next_pos(pos)), Some(&(8, 'h')));
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::ops::Index;

mod check;
mod clone;
mod erase;
mod error;
mod insert;
mod iter;
mod lookup;
mod node;
mod policy;
mod rotate;
mod traverse;

#[cfg(test)]
mod test_support;

pub use error::AllocError;
pub use iter::{IntoIter, Iter, Range};
pub use node::{Handle, Pos};
pub use policy::{ByKey, First, Identity, KeyPolicy};

use node::{Header, Slot};

/// An ordered collection backed by a red-black tree.
///
/// `P` decides the ordering, see [`KeyPolicy`]. It is a logic error for an
/// element's key to change, relative to the other keys, while it is in the
/// tree; the tree stays memory safe but lookups and ordering become
/// unspecified.
pub struct RbTree<T, P> {
    slots: Vec<Slot<T>>,
    // head of the list of vacant slots
    free: Option<Handle>,
    header: Header,
    len: usize,
    policy: P,
}

impl<T, P> RbTree<T, P> {
    /// Makes a new, empty `RbTree` ordered by `policy`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use rbtree_engine::{Identity, RbTree};
    ///
    /// let mut set = RbTree::new(Identity);
    ///
    /// // entries can now be inserted into the empty set
    /// set.insert_unique(1);
    /// ```
    pub fn new(policy: P) -> RbTree<T, P> {
        Self::with_capacity(0, policy)
    }

    /// Makes a new, empty `RbTree` with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize, policy: P) -> RbTree<T, P> {
        RbTree {
            slots: Vec::with_capacity(capacity),
            free: None,
            header: Header::default(),
            len: 0,
            policy,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Makes room for at least `additional` more nodes.
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Fallible [`reserve`](RbTree::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        Ok(self.slots.try_reserve(additional)?)
    }

    /// Clears the tree, removing all elements.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use rbtree_engine::{Identity, RbTree};
    ///
    /// let mut a = RbTree::new(Identity);
    /// a.insert_unique(1);
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        log::debug!("clearing tree of {} elements", self.len);
        self.slots.clear();
        self.free = None;
        self.header = Header::default();
        self.len = 0;
    }

    /// Exchanges the contents of two trees without touching any node.
    ///
    /// Positions into either tree keep pointing at the same elements, now
    /// owned by the other tree.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use rbtree_engine::{Identity, RbTree};
    ///
    /// let mut a = RbTree::new(Identity);
    /// assert_eq!(a.len(), 0);
    /// a.insert_unique(1);
    /// assert_eq!(a.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The largest number of elements the tree can hold.
    pub fn max_size(&self) -> usize {
        isize::MAX as usize / core::mem::size_of::<Slot<T>>().max(1)
    }

    /// The element at `pos`, `None` for `End`.
    pub fn get(&self, pos: Pos) -> Option<&T> {
        pos.handle().map(|node| &self.node(node).value)
    }

    /// Mutable access to the element at `pos`.
    ///
    /// The element's key must keep its place in the ordering; mutate only
    /// the parts the policy does not look at.
    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
        pos.handle().map(|node| &mut self.node_mut(node).value)
    }

    /// Returns the first element, the one with the minimum key.
    pub fn first(&self) -> Option<&T> {
        self.get(self.begin())
    }

    /// Returns the last element, the one with the maximum key.
    pub fn last(&self) -> Option<&T> {
        self.get(self.rbegin())
    }
}

impl<T, P: Default> Default for RbTree<T, P> {
    fn default() -> RbTree<T, P> {
        Self::new(P::default())
    }
}

impl<T, P> Index<Pos> for RbTree<T, P> {
    type Output = T;

    /// Returns a reference to the element at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is `End`.
    fn index(&self, pos: Pos) -> &T {
        self.get(pos).expect("no element at the end position")
    }
}

impl<T: fmt::Debug, P> fmt::Debug for RbTree<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, P> PartialEq for RbTree<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, P> Eq for RbTree<T, P> {}

impl<T: PartialOrd, P> PartialOrd for RbTree<T, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, P> Ord for RbTree<T, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

/// Extends in equal mode, keeping every value.
impl<T, P: KeyPolicy<T>> Extend<T> for RbTree<T, P> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_equal_iter(iter);
    }
}

/// Collects in equal mode, keeping every value.
impl<T, P: KeyPolicy<T> + Default> FromIterator<T> for RbTree<T, P> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> RbTree<T, P> {
        let mut tree = Self::default();
        tree.insert_equal_iter(iter);
        tree
    }
}

#[cfg(test)]
mod test {
    use super::{First, Identity, Pos, RbTree};
    use crate::test_support::{init_logger, Multi, Set};
    use pretty_assertions::assert_eq;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    #[test]
    fn seven_keys_then_erase_root() {
        init_logger();
        let mut set = Set::default();
        for k in [5, 3, 8, 1, 4, 7, 9] {
            set.insert_unique(k);
        }
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(set.len(), 7);

        assert_eq!(set.erase_key(&5), 1);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 7, 8, 9]);
        assert_eq!(set.len(), 6);
        set.check_invariants().unwrap();

        assert_eq!(set.find(&42), set.end());
        assert_eq!(set.lower_bound(&4), set.upper_bound(&3));
        assert_eq!(set[set.lower_bound(&4)], 4);
    }

    #[test]
    fn swap_exchanges_positions_too() {
        let mut a = Set::default();
        let mut b = Set::default();
        let (one, _) = a.insert_unique(1);
        b.insert_unique_iter([7, 8, 9]);
        a.swap(&mut b);
        assert_eq!(a.len(), 3);
        assert_eq!(b.get(one), Some(&1));
        a.check_invariants().unwrap();
        b.check_invariants().unwrap();
    }

    #[test]
    fn clear_then_reuse() {
        let mut set = Set::default();
        set.insert_unique_iter(0..10);
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.begin(), Pos::End);
        set.check_invariants().unwrap();
        set.insert_unique(3);
        assert_eq!(set.first(), Some(&3));
        assert_eq!(set.last(), Some(&3));
    }

    #[test]
    fn mapped_values_are_mutable() {
        let mut map = RbTree::new(First);
        map.insert_unique((1, "a"));
        let pos = map.find(&1);
        if let Some(entry) = map.get_mut(pos) {
            entry.1 = "b";
        }
        assert_eq!(map[pos], (1, "b"));
        assert_eq!(map.get_mut(Pos::End), None);
    }

    #[test]
    fn comparisons_and_formatting() {
        let a: RbTree<i32, Identity> = [3, 1, 2].into_iter().collect();
        let mut b = Set::default();
        b.extend([2, 3, 1]);
        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), "{1, 2, 3}");
        b.insert_unique(4);
        assert!(a < b);
        assert_ne!(a, b);
        assert!(a.max_size() >= a.len());
    }

    #[test]
    fn capacity_hints() {
        let mut set = RbTree::with_capacity(16, Identity);
        set.reserve(8);
        set.try_reserve(8).unwrap();
        set.insert_unique(1);
        assert!(set.try_reserve(usize::MAX).is_err());
        assert_eq!(set.len(), 1);
    }

    #[derive(Clone, Debug)]
    enum Op {
        InsertUnique(u8),
        InsertEqual(u8),
        Erase(u8),
        EraseAll(u8),
    }

    impl Arbitrary for Op {
        fn arbitrary(g: &mut Gen) -> Op {
            let k = u8::arbitrary(g) % 64;
            match u8::arbitrary(g) % 4 {
                0 => Op::InsertUnique(k),
                1 => Op::InsertEqual(k),
                2 => Op::Erase(k),
                _ => Op::EraseAll(k),
            }
        }
    }

    #[quickcheck]
    fn invariants_hold_after_any_ops(ops: Vec<Op>) -> bool {
        let mut tree = RbTree::new(First);
        let mut model: Vec<(u8, usize)> = vec![];
        for (i, op) in ops.into_iter().enumerate() {
            match op {
                Op::InsertUnique(k) => {
                    let (_, inserted) = tree.insert_unique((k, i));
                    if model.iter().all(|&(key, _)| key != k) {
                        assert!(inserted);
                        model.push((k, i));
                    } else {
                        assert!(!inserted);
                    }
                }
                Op::InsertEqual(k) => {
                    tree.insert_equal((k, i));
                    model.push((k, i));
                }
                Op::Erase(k) => {
                    let removed = tree.remove(&k);
                    let expected = model.iter().position(|&(key, _)| key == k).map(|at| model.remove(at));
                    assert_eq!(removed, expected);
                }
                Op::EraseAll(k) => {
                    let before = model.len();
                    model.retain(|&(key, _)| key != k);
                    assert_eq!(tree.erase_key(&k), before - model.len());
                }
            }
            tree.check_invariants().unwrap();
        }
        // stable sort keeps duplicates in insertion order, just like the tree
        model.sort_by_key(|&(k, _)| k);
        tree.len() == model.len() && tree.iter().copied().eq(model)
    }

    #[quickcheck]
    fn insertion_order_is_irrelevant(xs: Vec<i16>) -> bool {
        let mut t1 = RbTree::new(Identity);
        let mut t2 = RbTree::new(Identity);
        t1.insert_unique_iter(xs.iter().copied());
        t2.insert_unique_iter(xs.iter().rev().copied());
        t1 == t2
    }

    #[quickcheck]
    fn size_law(xs: Vec<u16>, erase: Vec<u16>) -> bool {
        let mut set = RbTree::new(Identity);
        let inserted = set.insert_unique_iter(xs);
        let mut erased = 0;
        for k in erase {
            erased += set.erase_key(&k);
        }
        set.check_invariants().is_ok() && set.len() == inserted - erased
    }

    #[quickcheck]
    fn duplicates_come_back_in_insertion_order(xs: Vec<u8>) -> bool {
        let mut multi = Multi::default();
        for (i, &k) in xs.iter().enumerate() {
            multi.insert_equal((i32::from(k % 8), i));
        }
        (0..8).all(|k| {
            let seen: Vec<usize> = multi.equal_range_iter(&k).map(|&(_, i)| i).collect();
            seen.windows(2).all(|w| w[0] < w[1]) && seen.len() == multi.count(&k)
        })
    }

    #[quickcheck]
    fn clone_is_equal_and_independent(xs: Vec<u8>) -> bool {
        let mut tree = RbTree::new(Identity);
        tree.insert_equal_iter(xs.iter().copied());
        let mut cloned = tree.clone();
        if cloned != tree || cloned.check_invariants().is_err() {
            return false;
        }
        let before: Vec<u8> = tree.iter().copied().collect();
        for k in xs.iter().take(xs.len() / 2 + 1) {
            cloned.remove(k);
        }
        cloned.insert_unique(255);
        tree.iter().copied().eq(before)
    }
}
