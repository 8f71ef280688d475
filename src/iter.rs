use core::iter::FusedIterator;

use crate::node::{Handle, Pos};
use crate::policy::KeyPolicy;
use crate::RbTree;

/// In-order iterator over a whole tree.
pub struct Iter<'a, T, P> {
    tree: &'a RbTree<T, P>,
    front: Pos,
    // one past the next element handed out from the back
    back: Pos,
    len: usize,
}

impl<'a, T, P> Iterator for Iter<'a, T, P> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let tree = self.tree;
        let node = self.front.handle()?;
        self.front = tree.next_pos(self.front);
        self.len -= 1;
        Some(&tree.node(node).value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T, P> DoubleEndedIterator for Iter<'a, T, P> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let tree = self.tree;
        self.back = tree.prev_pos(self.back);
        self.len -= 1;
        Some(&tree.node(self.back.handle()?).value)
    }
}

impl<T, P> ExactSizeIterator for Iter<'_, T, P> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<T, P> FusedIterator for Iter<'_, T, P> {}

impl<T, P> Clone for Iter<'_, T, P> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

/// In-order iterator over the elements of `[first, last)`.
pub struct Range<'a, T, P> {
    tree: &'a RbTree<T, P>,
    front: Pos,
    back: Pos,
}

impl<'a, T, P> Iterator for Range<'a, T, P> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let tree = self.tree;
        let node = self.front.handle()?;
        self.front = tree.next_pos(self.front);
        Some(&tree.node(node).value)
    }
}

impl<'a, T, P> DoubleEndedIterator for Range<'a, T, P> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let tree = self.tree;
        self.back = tree.prev_pos(self.back);
        Some(&tree.node(self.back.handle()?).value)
    }
}

impl<T, P> FusedIterator for Range<'_, T, P> {}

impl<T, P> Clone for Range<'_, T, P> {
    fn clone(&self) -> Self {
        Range { ..*self }
    }
}

impl<T, P> RbTree<T, P> {
    /// Iterates over all elements in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{Identity, RbTree};
    ///
    /// let mut set = RbTree::new(Identity);
    /// set.insert_unique_iter([3, 1, 2]);
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    /// assert_eq!(set.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T, P> {
        Iter {
            tree: self,
            front: self.begin(),
            back: Pos::End,
            len: self.len,
        }
    }

    /// Iterates over `[first, last)`. `last` must be reachable from `first`.
    pub fn range(&self, first: Pos, last: Pos) -> Range<'_, T, P> {
        Range {
            tree: self,
            front: first,
            back: last,
        }
    }
}

impl<T, P: KeyPolicy<T>> RbTree<T, P> {
    /// Iterates over the elements with key `key`, oldest first.
    pub fn equal_range_iter(&self, key: &P::Key) -> Range<'_, T, P> {
        let (first, last) = self.equal_range(key);
        self.range(first, last)
    }
}

impl<'a, T, P> IntoIterator for &'a RbTree<T, P> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, P>;

    fn into_iter(self) -> Iter<'a, T, P> {
        self.iter()
    }
}

/// Owning in-order iterator.
///
/// Each step splices the current minimum (or maximum, from the back) out of
/// the remaining tree, so nothing is rebalanced on the way.
pub struct IntoIter<T, P> {
    tree: RbTree<T, P>,
    front: Option<Handle>,
    back: Option<Handle>,
}

impl<T, P> IntoIterator for RbTree<T, P> {
    type Item = T;
    type IntoIter = IntoIter<T, P>;

    fn into_iter(self) -> IntoIter<T, P> {
        IntoIter {
            front: self.header.leftmost,
            back: self.header.rightmost,
            tree: self,
        }
    }
}

impl<T, P> Iterator for IntoIter<T, P> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.tree.len == 0 {
            return None;
        }

        let node = self.front?;
        let tree = &mut self.tree;
        // node is the minimum of what is left, so it has no left child
        let (right_child_option, parent_option) = {
            let node = tree.node(node);
            (node.right, node.parent)
        };
        tree.replace_child(parent_option, node, right_child_option);
        if let Some(right_child) = right_child_option {
            tree.node_mut(right_child).parent = parent_option;
        }
        self.front = match right_child_option {
            // if we have a right child, go down and take the leftmost child
            Some(right_child) => Some(tree.minimum(right_child)),
            None => parent_option,
        };
        tree.len -= 1;
        Some(tree.release(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len, Some(self.tree.len))
    }
}

impl<T, P> DoubleEndedIterator for IntoIter<T, P> {
    fn next_back(&mut self) -> Option<T> {
        if self.tree.len == 0 {
            return None;
        }

        let node = self.back?;
        let tree = &mut self.tree;
        let (left_child_option, parent_option) = {
            let node = tree.node(node);
            (node.left, node.parent)
        };
        tree.replace_child(parent_option, node, left_child_option);
        if let Some(left_child) = left_child_option {
            tree.node_mut(left_child).parent = parent_option;
        }
        self.back = match left_child_option {
            Some(left_child) => Some(tree.maximum(left_child)),
            None => parent_option,
        };
        tree.len -= 1;
        Some(tree.release(node))
    }
}

impl<T, P> ExactSizeIterator for IntoIter<T, P> {
    fn len(&self) -> usize {
        self.tree.len
    }
}

impl<T, P> FusedIterator for IntoIter<T, P> {}

#[cfg(test)]
mod test {
    use crate::test_support::{init_logger, Set};

    // from https://github.com/rust-lang/rust/blob/master/library/alloc/src/collections/btree/map/tests.rs
    #[test]
    fn test_iter() {
        init_logger();
        // Miri is too slow
        let size = if cfg!(miri) { 200 } else { 10000 };
        let mut set = Set::default();
        set.insert_unique_iter(0..size as i32);

        fn test<T>(size: usize, mut iter: T)
        where
            T: Iterator<Item = i32>,
        {
            for i in 0..size {
                assert_eq!(iter.size_hint(), (size - i, Some(size - i)));
                assert_eq!(iter.next().unwrap(), i as i32);
            }
            assert_eq!(iter.size_hint(), (0, Some(0)));
            assert_eq!(iter.next(), None);
        }
        test(size, set.iter().copied());
        test(size, set.into_iter());
    }

    #[test]
    fn test_iter_rev() {
        // Miri is too slow
        let size = if cfg!(miri) { 200 } else { 10000 };
        let mut set = Set::default();
        set.insert_unique_iter(0..size as i32);

        fn test<T>(size: usize, mut iter: T)
        where
            T: Iterator<Item = i32>,
        {
            for i in 0..size {
                assert_eq!(iter.size_hint(), (size - i, Some(size - i)));
                assert_eq!(iter.next().unwrap(), (size - i - 1) as i32);
            }
            assert_eq!(iter.size_hint(), (0, Some(0)));
            assert_eq!(iter.next(), None);
        }
        test(size, set.iter().rev().copied());
        test(size, set.into_iter().rev());
    }

    #[test]
    fn test_iter_mixed() {
        let mut set = Set::default();
        set.insert_unique_iter([40, 10, 30, 20, 50, 60, 5]);

        let mut iter = set.iter();
        assert_eq!(iter.next(), Some(&5));
        assert_eq!(iter.next_back(), Some(&60));
        assert_eq!(iter.next(), Some(&10));
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.rev().copied().collect::<Vec<_>>(), vec![50, 40, 30, 20]);

        let mut owned = set.clone().into_iter();
        assert_eq!(owned.next_back(), Some(60));
        assert_eq!(owned.next(), Some(5));
        assert_eq!(owned.next_back(), Some(50));
        assert_eq!(owned.next(), Some(10));
        assert_eq!(owned.collect::<Vec<_>>(), vec![20, 30, 40]);
    }

    #[test]
    fn partially_consumed_into_iter_drops_rest() {
        use std::rc::Rc;
        let marker = Rc::new(());
        let mut map = crate::RbTree::new(crate::First);
        for i in 0..10 {
            map.insert_unique((i, marker.clone()));
        }
        let mut iter = map.into_iter();
        iter.next();
        iter.next_back();
        drop(iter);
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn ranges() {
        let mut set = Set::default();
        set.insert_unique_iter(0..10);
        let (first, last) = (set.find(&3), set.find(&7));
        assert_eq!(set.range(first, last).copied().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(set.range(first, last).rev().copied().collect::<Vec<_>>(), vec![6, 5, 4, 3]);
        assert_eq!(set.range(last, set.end()).count(), 3);
        assert_eq!(set.range(first, first).next(), None);

        let mut both = set.range(first, last);
        assert_eq!(both.next(), Some(&3));
        assert_eq!(both.next_back(), Some(&6));
        assert_eq!(both.next(), Some(&4));
        assert_eq!(both.next_back(), Some(&5));
        assert_eq!(both.next(), None);
        assert_eq!(both.next_back(), None);

        let collected: Vec<i32> = (&set).into_iter().copied().collect();
        assert_eq!(collected.len(), 10);
    }
}
