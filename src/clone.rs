use core::convert::Infallible;

use crate::error::AllocError;
use crate::node::{infallible, Handle, Header, Side, Slot};
use crate::RbTree;

/// Source node, its copied parent and which child of that parent it becomes.
type Frame = (Handle, Option<Handle>, Side);

impl<T, P: Clone> RbTree<T, P> {
    /// Upper bound on the copy stack: it holds at most one pending sibling
    /// per level, and the height is at most 2 log2(n + 1).
    pub(crate) fn copy_stack_bound(&self) -> usize {
        2 * (usize::BITS - self.len.leading_zeros()) as usize + 1
    }

    /// Copies the tree node by node, keeping its shape and colors.
    ///
    /// Walks the source in pre-order with an explicit stack, so the depth of
    /// the source never turns into call depth. `slots` and `stack` come in
    /// with their capacity already reserved. If `clone_value` or `alloc`
    /// fails, the partial copy is dropped with every node it had, and the
    /// error is returned.
    fn copy_tree<E>(
        &self,
        slots: Vec<Slot<T>>,
        mut stack: Vec<Frame>,
        mut clone_value: impl FnMut(&T) -> Result<T, E>,
        mut alloc: impl FnMut(&mut Self, T) -> Result<Handle, E>,
    ) -> Result<Self, E> {
        let mut copy = RbTree {
            slots,
            free: None,
            header: Header::default(),
            len: 0,
            policy: self.policy.clone(),
        };

        if let Some(root) = self.header.root {
            stack.push((root, None, Side::Left));
        }

        while let Some((source, parent_option, side)) = stack.pop() {
            let source_node = self.node(source);
            let value = match clone_value(&source_node.value) {
                Ok(value) => value,
                Err(err) => {
                    log::debug!("tree copy failed, discarding {} copied nodes", copy.len);
                    return Err(err);
                }
            };
            let node = match alloc(&mut copy, value) {
                Ok(node) => node,
                Err(err) => {
                    log::debug!("tree copy failed, discarding {} copied nodes", copy.len);
                    return Err(err);
                }
            };

            let copied = copy.node_mut(node);
            copied.color = source_node.color;
            copied.parent = parent_option;
            match parent_option {
                Some(parent) => match side {
                    Side::Left => copy.node_mut(parent).left = Some(node),
                    Side::Right => copy.node_mut(parent).right = Some(node),
                },
                None => copy.header.root = Some(node),
            }
            if self.header.leftmost == Some(source) {
                copy.header.leftmost = Some(node);
            }
            if self.header.rightmost == Some(source) {
                copy.header.rightmost = Some(node);
            }
            copy.len += 1;

            // left is popped first, so slots come out in pre-order
            if let Some(right_child) = source_node.right {
                stack.push((right_child, Some(node), Side::Right));
            }
            if let Some(left_child) = source_node.left {
                stack.push((left_child, Some(node), Side::Left));
            }
        }

        Ok(copy)
    }

    /// Deep copy whose values are built by a fallible constructor.
    ///
    /// Nothing of the partial copy survives a failure: its nodes are released
    /// before the error reaches the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{AllocError, Identity, RbTree};
    ///
    /// let mut set = RbTree::new(Identity);
    /// set.insert_unique_iter([1, 2, 3]);
    ///
    /// let doubled = set.try_clone_with(|v| Ok::<_, AllocError>(v * 2)).unwrap();
    /// assert_eq!(doubled.iter().copied().collect::<Vec<_>>(), [2, 4, 6]);
    /// ```
    pub fn try_clone_with<E, F>(&self, clone_value: F) -> Result<Self, E>
    where
        F: FnMut(&T) -> Result<T, E>,
        E: From<AllocError>,
    {
        let mut slots = Vec::new();
        let mut stack = Vec::new();
        let reserved = slots
            .try_reserve_exact(self.len)
            .and_then(|()| stack.try_reserve_exact(self.copy_stack_bound()));
        if let Err(err) = reserved {
            log::debug!("no room to copy a tree of {} nodes: {err}", self.len);
            return Err(E::from(AllocError::from(err)));
        }
        self.copy_tree(slots, stack, clone_value, |tree, value| {
            tree.try_alloc(value).map_err(E::from)
        })
    }
}

impl<T: Clone, P: Clone> RbTree<T, P> {
    /// Fallible [`clone`](Clone::clone).
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        self.try_clone_with(|value| Ok(value.clone()))
    }

    /// Fallible [`clone_from`](Clone::clone_from): on failure `self` is left
    /// exactly as it was.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), AllocError> {
        let copy = source.try_clone()?;
        *self = copy;
        Ok(())
    }
}

impl<T: Clone, P: Clone> Clone for RbTree<T, P> {
    fn clone(&self) -> Self {
        infallible(self.copy_tree(
            Vec::with_capacity(self.len),
            Vec::with_capacity(self.copy_stack_bound()),
            |value| Ok::<T, Infallible>(value.clone()),
            Self::grow,
        ))
    }
}
