use core::fmt;
use std::collections::TryReserveError;

/// Failure to allocate a tree node.
///
/// Returned by the `try_*` operations. Whatever operation failed has already
/// released every node it created by the time the caller sees this.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllocError {
    kind: AllocErrorKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AllocErrorKind {
    Reserve(TryReserveError),
    MaxSize(usize),
}

impl AllocError {
    pub(crate) fn max_size(max: usize) -> AllocError {
        AllocError {
            kind: AllocErrorKind::MaxSize(max),
        }
    }

    /// `true` when the tree already holds `max_size()` nodes.
    pub fn is_max_size(&self) -> bool {
        matches!(self.kind, AllocErrorKind::MaxSize(_))
    }
}

impl From<TryReserveError> for AllocError {
    fn from(err: TryReserveError) -> AllocError {
        AllocError {
            kind: AllocErrorKind::Reserve(err),
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AllocErrorKind::Reserve(_) => f.write_str("failed to allocate a tree node"),
            AllocErrorKind::MaxSize(max) => write!(f, "tree is at its maximum size of {max} nodes"),
        }
    }
}

impl std::error::Error for AllocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AllocErrorKind::Reserve(err) => Some(err),
            AllocErrorKind::MaxSize(_) => None,
        }
    }
}
