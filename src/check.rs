use crate::node::{Handle, Slot};
use crate::policy::KeyPolicy;
use crate::RbTree;

impl<T, P: KeyPolicy<T>> RbTree<T, P> {
    /// Used by tests
    #[doc(hidden)]
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        let occupied = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_)))
            .count();
        if occupied != self.len {
            return Err("arena holds a different number of nodes than len");
        }

        let Some(root) = self.header.root else {
            if self.len != 0 {
                return Err("empty tree with nonzero len");
            }
            if self.header.leftmost.is_some() || self.header.rightmost.is_some() {
                return Err("empty tree with cached extremes");
            }
            return Ok(());
        };
        if self.node(root).parent.is_some() {
            return Err("root node has a parent");
        }
        if self.node(root).is_red() {
            return Err("root node is red");
        }

        let mut count = 0;
        self.check_subtree(root, &mut count)?;
        if count != self.len {
            return Err("len does not match the number of reachable nodes");
        }
        if self.header.leftmost != Some(self.minimum(root)) {
            return Err("leftmost is not the minimum");
        }
        if self.header.rightmost != Some(self.maximum(root)) {
            return Err("rightmost is not the maximum");
        }

        let mut iter = self.iter();
        if let Some(mut prev) = iter.next() {
            for value in iter {
                if self.policy.less(self.policy.key_of(value), self.policy.key_of(prev)) {
                    return Err("in-order walk is not sorted");
                }
                prev = value;
            }
        }
        Ok(())
    }

    // returns the black height of the subtree, counting node itself
    fn check_subtree(&self, node: Handle, count: &mut usize) -> Result<usize, &'static str> {
        *count += 1;
        let this = self.node(node);
        let mut heights = [0; 2];
        for (height, child_option) in heights.iter_mut().zip([this.left, this.right]) {
            if let Some(child) = child_option {
                if self.node(child).parent != Some(node) {
                    return Err("child does not point back at its parent");
                }
                if this.is_red() && self.node(child).is_red() {
                    return Err("red node has a red child");
                }
                *height = self.check_subtree(child, count)?;
            }
        }
        if heights[0] != heights[1] {
            return Err("black height differs between siblings");
        }
        Ok(heights[0] + usize::from(this.is_black()))
    }

    /// Number of black nodes on every path from the root to a leaf.
    #[doc(hidden)]
    pub fn black_height(&self) -> usize {
        let mut height = 0;
        let mut node_option = self.header.root;
        while let Some(node) = node_option {
            height += usize::from(self.node(node).is_black());
            node_option = self.node(node).left;
        }
        height
    }
}
