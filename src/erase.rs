use crate::node::{Color, Handle, Pos};
use crate::policy::KeyPolicy;
use crate::RbTree;

impl<T, P> RbTree<T, P> {
    /// Removes the element at `pos` and returns it.
    ///
    /// Returns `None` for `End`. Positions of all other elements stay valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{Identity, RbTree};
    ///
    /// let mut set = RbTree::new(Identity);
    /// let (pos, _) = set.insert_unique(1);
    /// assert_eq!(set.erase(pos), Some(1));
    /// assert_eq!(set.erase(set.end()), None);
    /// assert!(set.is_empty());
    /// ```
    pub fn erase(&mut self, pos: Pos) -> Option<T> {
        let Pos::Real(node) = pos else {
            return None;
        };
        self.unlink(node);
        self.len -= 1;
        Some(self.release(node))
    }

    /// Removes every element in `[first, last)` and returns how many there
    /// were. `last` must be reachable from `first`.
    pub fn erase_range(&mut self, first: Pos, last: Pos) -> usize {
        if first == self.begin() && last == Pos::End {
            let count = self.len;
            self.clear();
            return count;
        }
        let mut count = 0;
        let mut pos = first;
        while pos != last {
            let next = self.next_pos(pos);
            if self.erase(pos).is_none() {
                break;
            }
            count += 1;
            pos = next;
        }
        count
    }

    /// Removes and returns the first element.
    pub fn pop_first(&mut self) -> Option<T> {
        self.erase(self.begin())
    }

    /// Removes and returns the last element.
    pub fn pop_last(&mut self) -> Option<T> {
        self.erase(self.rbegin())
    }

    /// Keeps only the elements for which `keep` returns `true`, visiting them
    /// in order.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let mut pos = self.begin();
        while let Pos::Real(node) = pos {
            pos = self.next_pos(pos);
            if !keep(&self.node(node).value) {
                self.erase(Pos::Real(node));
            }
        }
    }

    fn transplant(&mut self, to_replace: Handle, replacement_option: Option<Handle>) {
        let parent = self.node(to_replace).parent;
        self.replace_child(parent, to_replace, replacement_option);
        if let Some(node) = replacement_option {
            self.node_mut(node).parent = parent;
        }
    }

    /// Takes `node` out of the tree and restores the red-black properties.
    /// The node itself keeps its value and slot.
    fn unlink(&mut self, node: Handle) {
        let (left_child_option, right_child_option, parent_option) = {
            let node = self.node(node);
            (node.left, node.right, node.parent)
        };

        // an extremum has no child on its outer side
        if self.header.leftmost == Some(node) {
            self.header.leftmost = match right_child_option {
                Some(right_child) => Some(self.minimum(right_child)),
                None => parent_option,
            };
        }
        if self.header.rightmost == Some(node) {
            self.header.rightmost = match left_child_option {
                Some(left_child) => Some(self.maximum(left_child)),
                None => parent_option,
            };
        }

        // color taken out of the tree, and the spot it was taken from
        let (removed_color, child_option, child_parent) = match (left_child_option, right_child_option) {
            (Some(left_child), Some(right_child)) => {
                let successor = self.minimum(right_child);
                let successor_right_child_option = self.node(successor).right;

                // new parent of successor's right child
                let successor_right_child_parent = if successor == right_child {
                    // case 2: node's successor is its right child
                    //
                    //     (n)          (s)
                    //     / \          / \
                    //   (x) (s)  ->  (x) (c)
                    //         \
                    //         (c)
                    //
                    Some(successor)
                } else {
                    // case 3: node's successor is leftmost under it's right child subtree
                    //
                    //     (n)          (s)
                    //     / \          / \
                    //   (x) (y)  ->  (x) (y)
                    //       /            /
                    //     (p)          (p)
                    //     /            /
                    //   (s)          (c)
                    //     \
                    //     (c)
                    //
                    let successor_parent = self.node(successor).parent;

                    // replace successor by its right child
                    self.transplant(successor, successor_right_child_option);

                    // node's right child becomes successor's right child
                    self.node_mut(successor).right = Some(right_child);
                    self.node_mut(right_child).parent = Some(successor);

                    successor_parent
                };

                // replace node by its successor
                self.transplant(node, Some(successor));

                // give node's left child to its successor
                self.node_mut(successor).left = Some(left_child);
                self.node_mut(left_child).parent = Some(successor);

                // swap colors: the successor takes over node's color, and the
                // successor's own color is what leaves the tree
                let successor_color = self.node(successor).color;
                let node_color = self.node(node).color;
                self.set_color(successor, node_color);
                self.set_color(node, successor_color);

                (successor_color, successor_right_child_option, successor_right_child_parent)
            }
            _ => {
                // case 1: node to erase has at most 1 child
                let child_option = left_child_option.or(right_child_option);
                self.transplant(node, child_option);
                (self.node(node).color, child_option, parent_option)
            }
        };

        let unlinked = self.node_mut(node);
        unlinked.parent = None;
        unlinked.left = None;
        unlinked.right = None;

        if removed_color == Color::Black {
            self.erase_fixup(child_option, child_parent);
        }
    }

    /// `node_option` carries an extra black: every path through it is one
    /// black short of its sibling's paths.
    fn erase_fixup(&mut self, mut node_option: Option<Handle>, mut parent_option: Option<Handle>) {
        while node_option != self.header.root && self.is_black(node_option) {
            // only the root has no parent, and the loop stops there
            let Some(parent) = parent_option else {
                break;
            };

            if node_option == self.node(parent).left {
                // sibling must exist since all leaf paths going through
                // parent and node have 1 less black node count
                let mut sibling = self.node(parent).right.expect("missing sibling");
                if self.node(sibling).is_red() {
                    // case 1: node's sibling is red
                    //
                    // action: left rotate at parent
                    //
                    //     P               S
                    //    / \             / \
                    //   N   s    -->    p   Sr
                    //      / \         / \
                    //     Sl  Sr      N   Sl
                    //
                    log::trace!("erase fixup: red sibling {sibling:?}");
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    // sibling must have black children, since the leaf paths through
                    // parent and sibling hasn't had an extra black till now
                    sibling = self
                        .node(parent)
                        .right
                        .expect("red sibling must have black children");
                }

                let (sibling_left_child_option, sibling_right_child_option) = {
                    let sibling = self.node(sibling);
                    (sibling.left, sibling.right)
                };
                if self.is_black(sibling_left_child_option) && self.is_black(sibling_right_child_option) {
                    // case 2: sibling is black and both its children are black
                    //
                    // action: flip sibling's color
                    //
                    // (p could be either color here)
                    //
                    //    (p)           (p)
                    //    / \           / \
                    //   N   S    -->  N   s
                    //      / \           / \
                    //     Sl  Sr        Sl  Sr
                    //
                    // the extra black moves up to p, which absorbs it when red
                    self.set_color(sibling, Color::Red);
                    node_option = Some(parent);
                    parent_option = self.node(parent).parent;
                    continue;
                }

                if self.is_black(sibling_right_child_option) {
                    // case 3: sibling is black, sibling's left child is red and right is black
                    //
                    // action: color flips & right rotate at sibling
                    //
                    //    (p)           (p)
                    //    / \           / \
                    //   N   S    -->  N   Sl
                    //      / \             \
                    //     sl  Sr            s
                    //                        \
                    //                         Sr
                    //
                    let sibling_left_child = sibling_left_child_option.expect("sibling's left child empty!");
                    self.set_color(sibling_left_child, Color::Black);
                    self.set_color(sibling, Color::Red);
                    self.rotate_right(sibling);
                    // new sibling is original sibling's left child
                    sibling = sibling_left_child;
                }

                // case 4: sibling is black, sibling's right child is red
                //
                // action: color flips and left rotate at parent
                //
                //     (p)             (s)
                //     / \             / \
                //    N   S     -->   P   Sr
                //       / \         / \
                //     (sl) sr      N  (sl)
                //
                let sibling_right_child = self.node(sibling).right.expect("sibling's right child empty!");
                let parent_color = self.node(parent).color;
                self.set_color(sibling, parent_color);
                self.set_color(parent, Color::Black);
                self.set_color(sibling_right_child, Color::Black);
                self.rotate_left(parent);
                node_option = self.header.root;
                break;
            } else {
                // same as if case but with "right" and "left" exchanged
                let mut sibling = self.node(parent).left.expect("missing sibling");
                if self.node(sibling).is_red() {
                    // case 1
                    log::trace!("erase fixup: red sibling {sibling:?}");
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self
                        .node(parent)
                        .left
                        .expect("red sibling must have black children");
                }

                let (sibling_left_child_option, sibling_right_child_option) = {
                    let sibling = self.node(sibling);
                    (sibling.left, sibling.right)
                };
                if self.is_black(sibling_left_child_option) && self.is_black(sibling_right_child_option) {
                    // case 2
                    self.set_color(sibling, Color::Red);
                    node_option = Some(parent);
                    parent_option = self.node(parent).parent;
                    continue;
                }

                if self.is_black(sibling_left_child_option) {
                    // case 3
                    let sibling_right_child = sibling_right_child_option.expect("sibling's right child empty!");
                    self.set_color(sibling_right_child, Color::Black);
                    self.set_color(sibling, Color::Red);
                    self.rotate_left(sibling);
                    sibling = sibling_right_child;
                }

                // case 4
                let sibling_left_child = self.node(sibling).left.expect("sibling's left child empty!");
                let parent_color = self.node(parent).color;
                self.set_color(sibling, parent_color);
                self.set_color(parent, Color::Black);
                self.set_color(sibling_left_child, Color::Black);
                self.rotate_right(parent);
                node_option = self.header.root;
                break;
            }
        }

        // a red node absorbs the extra black, and the root is always black
        if let Some(node) = node_option {
            self.set_color(node, Color::Black);
        }
    }
}

impl<T, P: KeyPolicy<T>> RbTree<T, P> {
    /// Removes every element whose key equals `key`, returning how many.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{Identity, RbTree};
    ///
    /// let mut multiset = RbTree::new(Identity);
    /// multiset.insert_equal_iter([1, 2, 2, 3]);
    /// assert_eq!(multiset.erase_key(&2), 2);
    /// assert_eq!(multiset.erase_key(&2), 0);
    /// assert_eq!(multiset.len(), 2);
    /// ```
    pub fn erase_key(&mut self, key: &P::Key) -> usize {
        let (first, last) = self.equal_range(key);
        self.erase_range(first, last)
    }

    /// Removes the first element whose key equals `key` and returns it.
    pub fn remove(&mut self, key: &P::Key) -> Option<T> {
        let pos = self.find(key);
        self.erase(pos)
    }
}

#[cfg(test)]
mod test {
    use crate::test_support::{init_logger, Multi, Set};
    use crate::Pos;
    use pretty_assertions::assert_eq;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn contents(set: &Set) -> Vec<i32> {
        set.iter().copied().collect()
    }

    #[test]
    fn erase_two_child_node() {
        init_logger();
        let mut set = Set::default();
        set.insert_unique_iter([5, 3, 8, 1, 4, 7, 9]);
        let four = set.find(&4);
        let eight = set.find(&8);

        assert_eq!(set.remove(&5), Some(5));
        assert_eq!(contents(&set), vec![1, 3, 4, 7, 8, 9]);
        assert_eq!(set.len(), 6);
        set.check_invariants().unwrap();
        // spliced nodes keep their identity
        assert_eq!(set.get(four), Some(&4));
        assert_eq!(set.get(eight), Some(&8));
    }

    #[test]
    fn erase_extremes_updates_cache() {
        init_logger();
        let mut set = Set::default();
        set.insert_unique_iter(0..20);
        assert_eq!(set.pop_first(), Some(0));
        assert_eq!(set.pop_last(), Some(19));
        assert_eq!(set.first(), Some(&1));
        assert_eq!(set.last(), Some(&18));
        set.check_invariants().unwrap();
        while set.pop_first().is_some() {
            set.check_invariants().unwrap();
        }
        assert_eq!(set.begin(), Pos::End);
        assert_eq!(set.rbegin(), Pos::End);
        assert_eq!(set.pop_last(), None);
    }

    #[test]
    fn erase_in_shuffled_order() {
        init_logger();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut keys: Vec<i32> = (0..500).collect();
        keys.shuffle(&mut rng);
        let mut set = Set::default();
        set.insert_unique_iter(keys.iter().copied());
        keys.shuffle(&mut rng);

        for (erased, k) in keys.iter().enumerate() {
            assert_eq!(set.remove(k), Some(*k));
            assert_eq!(set.remove(k), None);
            assert_eq!(set.len(), 500 - erased - 1);
            set.check_invariants().unwrap();
        }
        assert!(set.is_empty());
    }

    #[test]
    fn erase_range_and_keys() {
        init_logger();
        let mut map = Multi::default();
        for (i, k) in [1, 2, 2, 2, 3, 4].into_iter().enumerate() {
            map.insert_equal((k, i));
        }
        assert_eq!(map.erase_key(&2), 3);
        assert_eq!(map.erase_key(&7), 0);
        assert_eq!(map.iter().map(|&(k, _)| k).collect::<Vec<_>>(), vec![1, 3, 4]);
        map.check_invariants().unwrap();

        let three = map.find(&3);
        assert_eq!(map.erase_range(three, map.end()), 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.erase_range(map.begin(), map.end()), 1);
        assert!(map.is_empty());
        map.check_invariants().unwrap();
    }

    #[test]
    fn retain_even() {
        init_logger();
        let mut set = Set::default();
        set.insert_unique_iter(0..100);
        set.retain(|v| v % 2 == 0);
        assert_eq!(contents(&set), (0..100).step_by(2).collect::<Vec<_>>());
        set.check_invariants().unwrap();
    }

    #[test]
    fn erased_slot_is_not_reachable() {
        let mut set = Set::default();
        let (pos, _) = set.insert_unique(1);
        set.insert_unique(2);
        set.erase(pos);
        set.check_invariants().unwrap();
        assert_eq!(set.begin(), set.find(&2));
    }
}
