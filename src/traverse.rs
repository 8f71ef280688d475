use crate::node::{Handle, Pos};
use crate::RbTree;

impl<T, P> RbTree<T, P> {
    /// In-order successor of `node`, `None` past the last node.
    pub(crate) fn increment(&self, node: Handle) -> Option<Handle> {
        // if we have a right child, go down and take the leftmost child
        if let Some(right_child) = self.node(node).right {
            return Some(self.minimum(right_child));
        }
        // otherwise climb until we come up from a left child
        let mut curr = node;
        while let Some(parent) = self.node(curr).parent {
            if self.node(parent).left == Some(curr) {
                return Some(parent);
            }
            curr = parent;
        }
        None
    }

    /// In-order predecessor of `node`, `None` before the first node.
    pub(crate) fn decrement(&self, node: Handle) -> Option<Handle> {
        if let Some(left_child) = self.node(node).left {
            return Some(self.maximum(left_child));
        }
        let mut curr = node;
        while let Some(parent) = self.node(curr).parent {
            if self.node(parent).right == Some(curr) {
                return Some(parent);
            }
            curr = parent;
        }
        None
    }

    /// Position of the first (smallest) element, `End` if the tree is empty.
    pub fn begin(&self) -> Pos {
        self.header.leftmost.into()
    }

    /// The past-the-end position.
    pub fn end(&self) -> Pos {
        Pos::End
    }

    /// Position of the last (largest) element, where reverse traversal starts.
    ///
    /// Walking backwards from here with [`prev_pos`](RbTree::prev_pos) ends at
    /// [`rend`](RbTree::rend).
    pub fn rbegin(&self) -> Pos {
        self.header.rightmost.into()
    }

    /// Where reverse traversal ends: `End`, reached by stepping back from the
    /// first element.
    pub fn rend(&self) -> Pos {
        Pos::End
    }

    /// Steps one element forward.
    ///
    /// The last element steps to `End`, and `End` stays at `End`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{Identity, Pos, RbTree};
    ///
    /// let mut set = RbTree::new(Identity);
    /// set.insert_unique(2);
    /// set.insert_unique(1);
    /// let first = set.begin();
    /// let second = set.next_pos(first);
    /// assert_eq!(set.get(second), Some(&2));
    /// assert_eq!(set.next_pos(second), Pos::End);
    /// ```
    pub fn next_pos(&self, pos: Pos) -> Pos {
        match pos {
            Pos::Real(node) => self.increment(node).into(),
            Pos::End => Pos::End,
        }
    }

    /// Steps one element back.
    ///
    /// `End` steps to the last element (or stays at `End` when the tree is
    /// empty) and the first element steps to `End`.
    pub fn prev_pos(&self, pos: Pos) -> Pos {
        match pos {
            Pos::Real(node) => self.decrement(node).into(),
            // the header has no place in the tree, its predecessor is cached
            Pos::End => self.header.rightmost.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::test_support::{init_logger, Set};
    use crate::Pos;

    #[test]
    fn walk_forward_and_back() {
        init_logger();
        let mut set = Set::default();
        for i in [50, 20, 80, 10, 30, 70, 90, 25] {
            set.insert_unique(i);
        }

        let mut forward = vec![];
        let mut pos = set.begin();
        while pos != set.end() {
            forward.push(*set.get(pos).unwrap());
            pos = set.next_pos(pos);
        }
        assert_eq!(forward, vec![10, 20, 25, 30, 50, 70, 80, 90]);

        let mut backward = vec![];
        let mut pos = set.rbegin();
        while pos != set.rend() {
            backward.push(*set.get(pos).unwrap());
            pos = set.prev_pos(pos);
        }
        forward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn end_steps_back_to_last() {
        let mut set = Set::default();
        assert_eq!(set.prev_pos(Pos::End), Pos::End);
        assert_eq!(set.begin(), Pos::End);

        // single node: the header's predecessor is the root itself
        let (only, _) = set.insert_unique(7);
        assert_eq!(set.prev_pos(Pos::End), only);
        assert_eq!(set.next_pos(only), Pos::End);
        assert_eq!(set.prev_pos(only), Pos::End);
        assert_eq!(set.next_pos(Pos::End), Pos::End);
    }
}
