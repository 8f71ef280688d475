use core::convert::Infallible;

use crate::error::AllocError;
use crate::RbTree;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Stable address of a node in a tree's arena.
///
/// A handle stays valid from the insertion that created the node until the
/// node is erased, no matter how many other nodes are inserted, erased or
/// rotated around it in the meantime.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Handle(pub(crate) usize);

impl Handle {
    /// Index of the node's slot in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A position in a tree: a real node, or the past-the-end position.
///
/// `End` is what `end()` and `rend()` return, what lookups return on a miss,
/// and where stepping past either extreme lands. Stepping backwards from
/// `End` lands on the last element.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Pos {
    Real(Handle),
    End,
}

impl Pos {
    pub fn is_end(self) -> bool {
        self == Pos::End
    }

    pub fn handle(self) -> Option<Handle> {
        match self {
            Pos::Real(handle) => Some(handle),
            Pos::End => None,
        }
    }
}

impl From<Option<Handle>> for Pos {
    fn from(handle: Option<Handle>) -> Pos {
        handle.map_or(Pos::End, Pos::Real)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

pub(crate) struct Node<T> {
    pub(crate) parent: Option<Handle>,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) color: Color,
    pub(crate) value: T,
}

impl<T> Node<T> {
    fn new(value: T) -> Node<T> {
        Node {
            parent: None,
            left: None,
            right: None,
            color: Color::Red,
            value,
        }
    }

    pub(crate) fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }
}

pub(crate) enum Slot<T> {
    Occupied(Node<T>),
    // next entry of the free list
    Vacant(Option<Handle>),
}

/// The header of the tree: root anchor plus cached extremes.
///
/// Together with [`Pos::End`] this plays the part of the sentinel node: the
/// root hangs off it, `leftmost` makes `begin()` O(1), and `rightmost` is
/// where decrementing `End` goes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Header {
    pub(crate) root: Option<Handle>,
    pub(crate) leftmost: Option<Handle>,
    pub(crate) rightmost: Option<Handle>,
}

pub(crate) fn infallible<R>(result: Result<R, Infallible>) -> R {
    match result {
        Ok(r) => r,
        Err(never) => match never {},
    }
}

impl<T, P> RbTree<T, P> {
    pub(crate) fn node(&self, handle: Handle) -> &Node<T> {
        match &self.slots[handle.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => panic!("stale tree position {handle:?}"),
        }
    }

    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<T> {
        match &mut self.slots[handle.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => panic!("stale tree position {handle:?}"),
        }
    }

    /// `None` children count as black.
    pub(crate) fn is_black(&self, node: Option<Handle>) -> bool {
        !self.is_red(node)
    }

    pub(crate) fn is_red(&self, node: Option<Handle>) -> bool {
        node.map_or(false, |node| self.node(node).is_red())
    }

    pub(crate) fn set_color(&mut self, node: Handle, color: Color) {
        self.node_mut(node).color = color;
    }

    pub(crate) fn minimum(&self, mut node: Handle) -> Handle {
        while let Some(left_node) = self.node(node).left {
            node = left_node;
        }
        node
    }

    pub(crate) fn maximum(&self, mut node: Handle) -> Handle {
        while let Some(right_node) = self.node(node).right {
            node = right_node;
        }
        node
    }

    /// Stores `value` in a fresh, unlinked red node, reusing a vacant slot
    /// when there is one.
    pub(crate) fn try_alloc(&mut self, value: T) -> Result<Handle, AllocError> {
        if self.len >= self.max_size() {
            log::debug!("refusing node allocation at max size {}", self.max_size());
            return Err(AllocError::max_size(self.max_size()));
        }
        if let Some(handle) = self.pop_free() {
            self.slots[handle.0] = Slot::Occupied(Node::new(value));
            return Ok(handle);
        }
        if let Err(err) = self.slots.try_reserve(1) {
            log::debug!("node allocation failed with {} nodes live: {err}", self.len);
            return Err(err.into());
        }
        self.slots.push(Slot::Occupied(Node::new(value)));
        Ok(Handle(self.slots.len() - 1))
    }

    /// Like `try_alloc`, but leaves out-of-memory handling to `Vec`.
    pub(crate) fn alloc(&mut self, value: T) -> Handle {
        if let Some(handle) = self.pop_free() {
            self.slots[handle.0] = Slot::Occupied(Node::new(value));
            return handle;
        }
        self.slots.push(Slot::Occupied(Node::new(value)));
        Handle(self.slots.len() - 1)
    }

    pub(crate) fn grow(tree: &mut Self, value: T) -> Result<Handle, Infallible> {
        Ok(tree.alloc(value))
    }

    pub(crate) fn try_grow(tree: &mut Self, value: T) -> Result<Handle, AllocError> {
        tree.try_alloc(value)
    }

    fn pop_free(&mut self) -> Option<Handle> {
        let handle = self.free?;
        self.free = match self.slots[handle.0] {
            Slot::Vacant(next) => next,
            Slot::Occupied(_) => panic!("free list points at live node {handle:?}"),
        };
        Some(handle)
    }

    /// Frees an unlinked node's slot and hands back its value.
    pub(crate) fn release(&mut self, handle: Handle) -> T {
        match core::mem::replace(&mut self.slots[handle.0], Slot::Vacant(self.free)) {
            Slot::Occupied(node) => {
                self.free = Some(handle);
                node.value
            }
            Slot::Vacant(next) => {
                self.slots[handle.0] = Slot::Vacant(next);
                panic!("double release of tree position {handle:?}")
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::test_support::{init_logger, Set};
    use crate::Pos;

    #[test]
    fn erased_slots_are_reused() {
        init_logger();
        let mut set = Set::default();
        let (a, _) = set.insert_unique(1);
        set.insert_unique(2);
        set.erase(a);
        let (c, _) = set.insert_unique(3);
        assert_eq!(a, c);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        set.check_invariants().unwrap();
    }

    #[test]
    fn pos_from_handle() {
        assert_eq!(Pos::from(None), Pos::End);
        assert!(Pos::End.is_end());
        assert_eq!(Pos::End.handle(), None);
    }

    #[test]
    #[should_panic(expected = "stale tree position")]
    fn stale_position_panics() {
        let mut set = Set::default();
        let (a, _) = set.insert_unique(1);
        set.erase(a);
        set.get(a);
    }
}
