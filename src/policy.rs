use core::fmt;
use core::marker::PhantomData;

/// How a tree orders its values.
///
/// The tree never compares two values directly. It projects each one to its
/// key with [`key_of`](KeyPolicy::key_of) and compares keys with
/// [`less`](KeyPolicy::less), which must be a strict weak ordering. A set
/// stores its keys as values ([`Identity`]), a map stores `(key, value)` pairs
/// and orders them by the first component ([`First`]).
pub trait KeyPolicy<T> {
    type Key: ?Sized;

    fn key_of<'a>(&self, value: &'a T) -> &'a Self::Key;

    fn less(&self, a: &Self::Key, b: &Self::Key) -> bool;
}

/// Set-like policy: every value is its own key, ordered by `Ord`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<T: Ord> KeyPolicy<T> for Identity {
    type Key = T;

    fn key_of<'a>(&self, value: &'a T) -> &'a T {
        value
    }

    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// Map-like policy: values are `(key, mapped)` pairs ordered by key.
#[derive(Clone, Copy, Debug, Default)]
pub struct First;

impl<K: Ord, V> KeyPolicy<(K, V)> for First {
    type Key = K;

    fn key_of<'a>(&self, value: &'a (K, V)) -> &'a K {
        &value.0
    }

    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Policy assembled from a key projection and a less-than predicate.
///
/// ```
/// use rbtree_engine::{ByKey, RbTree};
///
/// // order (initial, age) records by descending age
/// let policy = ByKey::new(|p: &(char, u32)| &p.1, |a: &u32, b: &u32| a > b);
/// let mut tree = RbTree::new(policy);
/// tree.insert_equal(('a', 31));
/// tree.insert_equal(('b', 45));
/// assert_eq!(tree.first(), Some(&('b', 45)));
/// ```
pub struct ByKey<F, C, K: ?Sized> {
    key_of: F,
    less: C,
    _marker: PhantomData<fn(&K)>,
}

impl<F, C, K: ?Sized> ByKey<F, C, K> {
    pub fn new<T>(key_of: F, less: C) -> ByKey<F, C, K>
    where
        F: Fn(&T) -> &K,
        C: Fn(&K, &K) -> bool,
    {
        ByKey {
            key_of,
            less,
            _marker: PhantomData,
        }
    }
}

impl<T, K: ?Sized, F, C> KeyPolicy<T> for ByKey<F, C, K>
where
    F: Fn(&T) -> &K,
    C: Fn(&K, &K) -> bool,
{
    type Key = K;

    fn key_of<'a>(&self, value: &'a T) -> &'a K {
        (self.key_of)(value)
    }

    fn less(&self, a: &K, b: &K) -> bool {
        (self.less)(a, b)
    }
}

impl<F: Clone, C: Clone, K: ?Sized> Clone for ByKey<F, C, K> {
    fn clone(&self) -> Self {
        ByKey {
            key_of: self.key_of.clone(),
            less: self.less.clone(),
            _marker: PhantomData,
        }
    }
}

impl<F, C, K: ?Sized> fmt::Debug for ByKey<F, C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByKey").finish_non_exhaustive()
    }
}
