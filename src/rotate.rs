use crate::node::Handle;
use crate::RbTree;

impl<T, P> RbTree<T, P> {
    /// Points whatever referred to `old` as a child (its parent, or the
    /// header when `old` is the root) at `new` instead.
    pub(crate) fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            Some(parent) => {
                let parent_node = self.node_mut(parent);
                if parent_node.left == Some(old) {
                    parent_node.left = new;
                } else {
                    parent_node.right = new;
                }
            }
            // if old was root
            None => self.header.root = new,
        }
    }

    pub(crate) fn rotate_left(&mut self, node: Handle) {
        // rotation is not possible if right child is empty
        if let Some(right_child) = self.node(node).right {
            //
            //     g                  g
            //     |                  |
            //     n         -->     rc
            //    / \                / \
            //   lc  rc             n   rrgc
            //      /  \           / \
            //   rlgc  rrgc       lc rlgc
            //
            log::trace!("rotate left at {node:?}");
            let right_left_gchild = self.node(right_child).left;
            self.node_mut(node).right = right_left_gchild;
            if let Some(right_left_gchild) = right_left_gchild {
                self.node_mut(right_left_gchild).parent = Some(node);
            }

            // right child's parent becomes node's parent
            let parent = self.node(node).parent;
            self.node_mut(right_child).parent = parent;
            self.replace_child(parent, node, Some(right_child));

            self.node_mut(right_child).left = Some(node);
            self.node_mut(node).parent = Some(right_child);
        }
    }

    pub(crate) fn rotate_right(&mut self, node: Handle) {
        // rotation is not possible if left child is empty
        if let Some(left_child) = self.node(node).left {
            //
            //         g                 g
            //         |                 |
            //         n       -->      lc
            //        / \               / \
            //       lc  rc          llgc  n
            //      /  \                  / \
            //   llgc  lrgc           lrgc   rc
            //
            log::trace!("rotate right at {node:?}");
            let left_right_gchild = self.node(left_child).right;
            self.node_mut(node).left = left_right_gchild;
            if let Some(left_right_gchild) = left_right_gchild {
                self.node_mut(left_right_gchild).parent = Some(node);
            }

            let parent = self.node(node).parent;
            self.node_mut(left_child).parent = parent;
            self.replace_child(parent, node, Some(left_child));

            self.node_mut(left_child).right = Some(node);
            self.node_mut(node).parent = Some(left_child);
        }
    }
}

#[cfg(test)]
mod test {
    use crate::test_support::{handles, Set};
    use crate::Pos;

    fn shape(set: &Set) -> Vec<(i32, Option<i32>, Option<i32>)> {
        let value = |h: Option<crate::Handle>| h.map(|h| set.node(h).value);
        handles(set)
            .into_iter()
            .map(|h| {
                let node = set.node(h);
                (node.value, value(node.left), value(node.right))
            })
            .collect()
    }

    #[test]
    fn rotations_keep_order_and_invert() {
        let mut set = Set::default();
        for i in [2, 1, 4, 3, 5] {
            set.insert_unique(i);
        }
        let before = shape(&set);
        let root = set.header.root.unwrap();

        set.rotate_left(root);
        let new_root = set.header.root.unwrap();
        assert_eq!(set.node(new_root).value, 4);
        assert_eq!(set.node(new_root).parent, None);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        // 3 moved across from 4 to 2
        assert_eq!(set.node(set.node(new_root).left.unwrap()).right.map(|h| set.node(h).value), Some(3));

        set.rotate_right(new_root);
        assert_eq!(shape(&set), before);
        assert_eq!(set.header.root, Some(root));
    }

    #[test]
    fn rotation_without_child_is_a_no_op() {
        let mut set = Set::default();
        let (Pos::Real(only), _) = set.insert_unique(1) else { unreachable!() };
        set.rotate_left(only);
        set.rotate_right(only);
        assert_eq!(set.header.root, Some(only));
        set.check_invariants().unwrap();
    }
}
