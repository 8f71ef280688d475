use crate::node::{Handle, Pos};
use crate::policy::KeyPolicy;
use crate::RbTree;

#[derive(Clone, Copy)]
enum Bound {
    // first key not less than the probe
    Lower,
    // first key greater than the probe
    Upper,
}

impl<T, P: KeyPolicy<T>> RbTree<T, P> {
    /// Descends from `node_option`, returning the first position matching
    /// `bound`, or `fallback` if no node below qualifies.
    fn bounded_descent(&self, mut node_option: Option<Handle>, mut fallback: Pos, key: &P::Key, bound: Bound) -> Pos {
        while let Some(node) = node_option {
            let go_left = match bound {
                Bound::Lower => !self.policy.less(self.key(node), key),
                Bound::Upper => self.policy.less(key, self.key(node)),
            };
            if go_left {
                fallback = Pos::Real(node);
                node_option = self.node(node).left;
            } else {
                node_option = self.node(node).right;
            }
        }
        fallback
    }

    /// Position of the first element whose key is not less than `key`.
    pub fn lower_bound(&self, key: &P::Key) -> Pos {
        self.bounded_descent(self.header.root, Pos::End, key, Bound::Lower)
    }

    /// Position of the first element whose key is greater than `key`.
    pub fn upper_bound(&self, key: &P::Key) -> Pos {
        self.bounded_descent(self.header.root, Pos::End, key, Bound::Upper)
    }

    /// `(lower_bound(key), upper_bound(key))` in a single descent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{Identity, RbTree};
    ///
    /// let mut multiset = RbTree::new(Identity);
    /// multiset.insert_equal_iter([1, 2, 2, 3]);
    /// let (first, last) = multiset.equal_range(&2);
    /// assert_eq!(multiset.range(first, last).count(), 2);
    /// let (first, last) = multiset.equal_range(&5);
    /// assert_eq!(first, last);
    /// ```
    pub fn equal_range(&self, key: &P::Key) -> (Pos, Pos) {
        let mut node_option = self.header.root;
        let mut bound = Pos::End;

        while let Some(node) = node_option {
            if self.policy.less(self.key(node), key) {
                node_option = self.node(node).right;
            } else if self.policy.less(key, self.key(node)) {
                bound = Pos::Real(node);
                node_option = self.node(node).left;
            } else {
                // equal keys live on both sides of the first match
                let upper = self.bounded_descent(self.node(node).right, bound, key, Bound::Upper);
                let lower = self.bounded_descent(self.node(node).left, Pos::Real(node), key, Bound::Lower);
                return (lower, upper);
            }
        }
        (bound, bound)
    }

    /// Position of the first element with key `key`, or `End`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{First, RbTree};
    ///
    /// let mut map = RbTree::new(First);
    /// map.insert_unique((1, "a"));
    /// assert_eq!(map.get(map.find(&1)), Some(&(1, "a")));
    /// assert_eq!(map.find(&2), map.end());
    /// ```
    pub fn find(&self, key: &P::Key) -> Pos {
        match self.lower_bound(key) {
            pos @ Pos::Real(node) if !self.policy.less(key, self.key(node)) => pos,
            _ => Pos::End,
        }
    }

    /// Number of elements with key `key`.
    pub fn count(&self, key: &P::Key) -> usize {
        let (first, last) = self.equal_range(key);
        self.range(first, last).count()
    }

    /// Returns `true` if some element has key `key`.
    pub fn contains(&self, key: &P::Key) -> bool {
        !self.find(key).is_end()
    }
}
