use crate::error::AllocError;
use crate::node::{infallible, Color, Handle, Header, Pos, Side};
use crate::policy::KeyPolicy;
use crate::RbTree;

fn reserve_one<E: From<AllocError>>(inserted: &mut Vec<Handle>) -> Result<(), E> {
    inserted.try_reserve(1).map_err(|err| {
        log::debug!("no room to record {} inserted nodes: {err}", inserted.len() + 1);
        E::from(AllocError::from(err))
    })
}

/// The empty child slot a new node goes into.
#[derive(Clone, Copy, Debug)]
struct InsertAt {
    // option because insertion could be in an empty tree
    parent: Option<Handle>,
    side: Side,
}

enum SearchResult {
    Found(Handle),
    InsertionPoint(InsertAt),
}

use SearchResult::*;

impl<T, P: KeyPolicy<T>> RbTree<T, P> {
    pub(crate) fn key(&self, node: Handle) -> &P::Key {
        self.policy.key_of(&self.node(node).value)
    }

    fn search_unique(&self, key: &P::Key) -> SearchResult {
        let mut node_option = self.header.root;
        let mut parent_option = None;
        let mut went_left = true;

        while let Some(node) = node_option {
            parent_option = node_option;
            went_left = self.policy.less(key, self.key(node));
            node_option = if went_left {
                self.node(node).left
            } else {
                self.node(node).right
            };
        }

        let Some(parent) = parent_option else {
            return InsertionPoint(InsertAt {
                parent: None,
                side: Side::Left,
            });
        };
        let at = InsertAt {
            parent: Some(parent),
            side: if went_left { Side::Left } else { Side::Right },
        };

        // the only node that can hold an equal key is the one just before the slot
        let before = if went_left {
            match self.decrement(parent) {
                Some(before) => before,
                None => return InsertionPoint(at),
            }
        } else {
            parent
        };
        if self.policy.less(self.key(before), key) {
            InsertionPoint(at)
        } else {
            Found(before)
        }
    }

    // ties go right, behind the equal keys already present
    fn search_equal(&self, key: &P::Key) -> InsertAt {
        let mut node_option = self.header.root;
        let mut at = InsertAt {
            parent: None,
            side: Side::Left,
        };

        while let Some(node) = node_option {
            at.parent = Some(node);
            if self.policy.less(key, self.key(node)) {
                at.side = Side::Left;
                node_option = self.node(node).left;
            } else {
                at.side = Side::Right;
                node_option = self.node(node).right;
            }
        }
        at
    }

    /// Slot right before `hint` if the key fits there without a descent.
    ///
    /// `fits_before(key, node)` and `fits_after(node, key)` say whether the
    /// key may sit before/after `node` in the current mode.
    fn check_hint(
        &self,
        hint: Pos,
        key: &P::Key,
        fits_after: impl Fn(&P::Key, &P::Key) -> bool,
        fits_before: impl Fn(&P::Key, &P::Key) -> bool,
    ) -> Option<InsertAt> {
        match hint {
            Pos::End => {
                let last = self.header.rightmost?;
                fits_after(self.key(last), key).then_some(InsertAt {
                    parent: Some(last),
                    side: Side::Right,
                })
            }
            Pos::Real(node) => {
                if !fits_before(key, self.key(node)) {
                    return None;
                }
                let Some(before) = self.decrement(node) else {
                    // node is the leftmost, nothing hangs off its left
                    return Some(InsertAt {
                        parent: Some(node),
                        side: Side::Left,
                    });
                };
                if !fits_after(self.key(before), key) {
                    return None;
                }
                // either before has no right child, or node has no left child
                Some(if self.node(before).right.is_none() {
                    InsertAt {
                        parent: Some(before),
                        side: Side::Right,
                    }
                } else {
                    InsertAt {
                        parent: Some(node),
                        side: Side::Left,
                    }
                })
            }
        }
    }

    fn hint_unique(&self, hint: Pos, key: &P::Key) -> Option<InsertAt> {
        self.check_hint(
            hint,
            key,
            |before, key| self.policy.less(before, key),
            |key, after| self.policy.less(key, after),
        )
    }

    fn hint_equal(&self, hint: Pos, key: &P::Key) -> Option<InsertAt> {
        let before = self.check_hint(
            hint,
            key,
            |before, key| !self.policy.less(key, before),
            |key, after| !self.policy.less(after, key),
        );
        if before.is_some() {
            return before;
        }

        // key sorts after the hint, try the slot right behind it
        let Pos::Real(node) = hint else {
            return None;
        };
        if self.policy.less(key, self.key(node)) {
            return None;
        }
        let Some(after) = self.increment(node) else {
            return Some(InsertAt {
                parent: Some(node),
                side: Side::Right,
            });
        };
        if self.policy.less(self.key(after), key) {
            return None;
        }
        Some(if self.node(node).right.is_none() {
            InsertAt {
                parent: Some(node),
                side: Side::Right,
            }
        } else {
            InsertAt {
                parent: Some(after),
                side: Side::Left,
            }
        })
    }

    fn insert_unique_in<E>(
        &mut self,
        hint: Option<Pos>,
        value: T,
        alloc: impl FnOnce(&mut Self, T) -> Result<Handle, E>,
    ) -> Result<(Pos, bool), E> {
        let key = self.policy.key_of(&value);
        let found = match hint.and_then(|hint| self.hint_unique(hint, key)) {
            Some(at) => InsertionPoint(at),
            None => self.search_unique(key),
        };
        match found {
            Found(node) => Ok((Pos::Real(node), false)),
            InsertionPoint(at) => {
                let node = alloc(self, value)?;
                self.link(at, node);
                Ok((Pos::Real(node), true))
            }
        }
    }

    fn insert_equal_in<E>(
        &mut self,
        hint: Option<Pos>,
        value: T,
        alloc: impl FnOnce(&mut Self, T) -> Result<Handle, E>,
    ) -> Result<Pos, E> {
        let key = self.policy.key_of(&value);
        let at = match hint.and_then(|hint| self.hint_equal(hint, key)) {
            Some(at) => at,
            None => self.search_equal(key),
        };
        let node = alloc(self, value)?;
        self.link(at, node);
        Ok(Pos::Real(node))
    }

    /// Inserts `value` unless an element with an equal key is present.
    ///
    /// Returns the position of the new element and `true`, or the position of
    /// the element already holding the key and `false`. In the latter case
    /// the tree is left untouched and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{Identity, RbTree};
    ///
    /// let mut set = RbTree::new(Identity);
    /// let (pos, inserted) = set.insert_unique(37);
    /// assert!(inserted);
    /// assert_eq!(set.insert_unique(37), (pos, false));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert_unique(&mut self, value: T) -> (Pos, bool) {
        infallible(self.insert_unique_in(None, value, Self::grow))
    }

    /// Fallible [`insert_unique`](RbTree::insert_unique).
    pub fn try_insert_unique(&mut self, value: T) -> Result<(Pos, bool), AllocError> {
        self.insert_unique_in(None, value, Self::try_grow)
    }

    /// Inserts `value` after every element with an equal key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{First, RbTree};
    ///
    /// let mut multimap = RbTree::new(First);
    /// multimap.insert_equal((1, "first"));
    /// multimap.insert_equal((1, "second"));
    /// let values: Vec<_> = multimap.equal_range_iter(&1).map(|(_, v)| *v).collect();
    /// assert_eq!(values, ["first", "second"]);
    /// ```
    pub fn insert_equal(&mut self, value: T) -> Pos {
        infallible(self.insert_equal_in(None, value, Self::grow))
    }

    /// Fallible [`insert_equal`](RbTree::insert_equal).
    pub fn try_insert_equal(&mut self, value: T) -> Result<Pos, AllocError> {
        self.insert_equal_in(None, value, Self::try_grow)
    }

    /// Like [`insert_unique`](RbTree::insert_unique), starting from a guess
    /// of where `value` belongs.
    ///
    /// If `value`'s key falls strictly between the element before `hint` and
    /// the element at `hint`, the value is linked there without searching.
    /// Any other hint, including a wrong one, costs a normal descent. Returns
    /// the position of the new element, or of the element already holding
    /// the key.
    pub fn insert_unique_hint(&mut self, hint: Pos, value: T) -> Pos {
        infallible(self.insert_unique_in(Some(hint), value, Self::grow)).0
    }

    /// Fallible [`insert_unique_hint`](RbTree::insert_unique_hint).
    pub fn try_insert_unique_hint(&mut self, hint: Pos, value: T) -> Result<Pos, AllocError> {
        Ok(self.insert_unique_in(Some(hint), value, Self::try_grow)?.0)
    }

    /// Like [`insert_equal`](RbTree::insert_equal), starting from a guess of
    /// where `value` belongs.
    ///
    /// If `value`'s key fits between the element before `hint` and the
    /// element at `hint`, the value is linked right before `hint`. Otherwise,
    /// if it fits between `hint` and the element after it, the value is
    /// linked right after `hint`. Either way it may land in the middle of a
    /// run of equal keys. Any other hint costs a normal descent, which puts
    /// the value after every element with an equal key.
    pub fn insert_equal_hint(&mut self, hint: Pos, value: T) -> Pos {
        infallible(self.insert_equal_in(Some(hint), value, Self::grow))
    }

    /// Fallible [`insert_equal_hint`](RbTree::insert_equal_hint).
    pub fn try_insert_equal_hint(&mut self, hint: Pos, value: T) -> Result<Pos, AllocError> {
        self.insert_equal_in(Some(hint), value, Self::try_grow)
    }

    /// Inserts every value whose key is not yet present, returning how many
    /// were inserted.
    pub fn insert_unique_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) -> usize {
        let mut count = 0;
        for value in iter {
            let (_, inserted) = infallible(self.insert_unique_in(Some(Pos::End), value, Self::grow));
            count += usize::from(inserted);
        }
        count
    }

    /// Inserts every value, returning how many were inserted.
    pub fn insert_equal_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) -> usize {
        let mut count = 0;
        for value in iter {
            infallible(self.insert_equal_in(Some(Pos::End), value, Self::grow));
            count += 1;
        }
        count
    }

    /// Atomic bulk [`insert_unique`](RbTree::insert_unique).
    ///
    /// Values come from a fallible source. On the first error, either from
    /// the source or from node allocation, every value this call inserted is
    /// erased again and the error is returned; the tree then holds exactly
    /// what it held before.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_engine::{AllocError, Identity, RbTree};
    ///
    /// #[derive(Debug)]
    /// enum LoadError {
    ///     Parse,
    ///     Alloc(AllocError),
    /// }
    ///
    /// impl From<AllocError> for LoadError {
    ///     fn from(err: AllocError) -> LoadError {
    ///         LoadError::Alloc(err)
    ///     }
    /// }
    ///
    /// let mut set = RbTree::new(Identity);
    /// set.insert_unique(1);
    ///
    /// let input = ["3", "x", "2"].map(|s| s.parse::<i32>().map_err(|_| LoadError::Parse));
    /// assert!(matches!(set.try_insert_unique_iter(input), Err(LoadError::Parse)));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn try_insert_unique_iter<I, E>(&mut self, iter: I) -> Result<usize, E>
    where
        I: IntoIterator<Item = Result<T, E>>,
        E: From<AllocError>,
    {
        let mut inserted = Vec::new();
        for value in iter {
            // room for the handle first, so a linked node is never left unrecorded
            let step = reserve_one(&mut inserted).and_then(|()| value).and_then(|value| {
                self.insert_unique_in(Some(Pos::End), value, |tree, value| {
                    tree.try_alloc(value).map_err(E::from)
                })
            });
            match step {
                Ok((Pos::Real(node), true)) => inserted.push(node),
                Ok(_) => {}
                Err(err) => {
                    self.roll_back(inserted);
                    return Err(err);
                }
            }
        }
        Ok(inserted.len())
    }

    /// Atomic bulk [`insert_equal`](RbTree::insert_equal), rolled back the
    /// same way as [`try_insert_unique_iter`](RbTree::try_insert_unique_iter).
    pub fn try_insert_equal_iter<I, E>(&mut self, iter: I) -> Result<usize, E>
    where
        I: IntoIterator<Item = Result<T, E>>,
        E: From<AllocError>,
    {
        let mut inserted = Vec::new();
        for value in iter {
            // room for the handle first, so a linked node is never left unrecorded
            let step = reserve_one(&mut inserted).and_then(|()| value).and_then(|value| {
                self.insert_equal_in(Some(Pos::End), value, |tree, value| {
                    tree.try_alloc(value).map_err(E::from)
                })
            });
            match step {
                Ok(Pos::Real(node)) => inserted.push(node),
                Ok(Pos::End) => {}
                Err(err) => {
                    self.roll_back(inserted);
                    return Err(err);
                }
            }
        }
        Ok(inserted.len())
    }

    fn roll_back(&mut self, inserted: Vec<Handle>) {
        log::debug!("bulk insertion failed, rolling back {} nodes", inserted.len());
        for node in inserted.into_iter().rev() {
            self.erase(Pos::Real(node));
        }
    }
}

impl<T, P> RbTree<T, P> {
    fn link(&mut self, at: InsertAt, node: Handle) {
        self.node_mut(node).parent = at.parent;
        match at.parent {
            Some(parent) => match at.side {
                Side::Left => {
                    debug_assert!(self.node(parent).left.is_none());
                    self.node_mut(parent).left = Some(node);
                    if self.header.leftmost == Some(parent) {
                        self.header.leftmost = Some(node);
                    }
                }
                Side::Right => {
                    debug_assert!(self.node(parent).right.is_none());
                    self.node_mut(parent).right = Some(node);
                    if self.header.rightmost == Some(parent) {
                        self.header.rightmost = Some(node);
                    }
                }
            },
            // tree was empty
            None => {
                self.header = Header {
                    root: Some(node),
                    leftmost: Some(node),
                    rightmost: Some(node),
                }
            }
        }

        self.insert_fixup(node);
        self.len += 1;
    }

    fn insert_fixup(&mut self, mut node: Handle) {
        while let Some(mut parent) = self.node(node).parent {
            // loop invariant: node is red

            // if parent is black, we are done
            if self.node(parent).is_black() {
                break;
            }

            // since parent is red and root is always black, grandparent will exist
            let gparent = self.node(parent).parent.expect("where are you grandparent?");

            if Some(parent) == self.node(gparent).left {
                let uncle_option = self.node(gparent).right;
                match uncle_option {
                    Some(uncle) if self.node(uncle).is_red() => {
                        // case 1: node's uncle is red.
                        //
                        // action: flip colors
                        //
                        // indicate color with case: black is uppercase and red is lowercase
                        //
                        //       G            g
                        //      / \          / \
                        //     p   u  -->   P   U
                        //    /            /
                        //   n            n
                        //
                        // since g's parent might be red, need to recurse at g
                        log::trace!("insert fixup: red uncle at {gparent:?}");
                        self.set_color(parent, Color::Black);
                        self.set_color(uncle, Color::Black);
                        self.set_color(gparent, Color::Red);
                        node = gparent;
                    }
                    _ => {
                        if Some(node) == self.node(parent).right {
                            // case 2: uncle is black (remember NULLs are also considered black)
                            // and node is parent's right child
                            //
                            // action: left rotate at parent
                            //
                            //      G             G
                            //     / \           / \
                            //    p   U  -->    n   U
                            //     \           /
                            //      n         p
                            //
                            // fall through to case 3 to fix red-property
                            self.rotate_left(parent);
                            parent = node;
                        }

                        // case 3: uncle is black and node is parent's left child
                        //
                        // action: right rotate at grandparent
                        //
                        //        G           P
                        //       / \         / \
                        //      p   U  -->  n   g
                        //     /                 \
                        //    n                   U
                        //
                        self.set_color(parent, Color::Black);
                        self.set_color(gparent, Color::Red);
                        self.rotate_right(gparent);
                        break;
                    }
                }
            } else {
                // same as if case but with "right" and "left" exchanged
                let uncle_option = self.node(gparent).left;
                match uncle_option {
                    // both parent and uncle are red
                    Some(uncle) if self.node(uncle).is_red() => {
                        // case 1
                        log::trace!("insert fixup: red uncle at {gparent:?}");
                        self.set_color(parent, Color::Black);
                        self.set_color(uncle, Color::Black);
                        self.set_color(gparent, Color::Red);
                        node = gparent;
                    }
                    _ => {
                        if Some(node) == self.node(parent).left {
                            // case 2
                            self.rotate_right(parent);
                            parent = node;
                        }

                        // case 3
                        self.set_color(parent, Color::Black);
                        self.set_color(gparent, Color::Red);
                        self.rotate_left(gparent);
                        break;
                    }
                }
            }
        }

        if let Some(root) = self.header.root {
            self.set_color(root, Color::Black);
        }
    }
}
