use core::fmt;

use allocated::AllocErrorWithLayout;

/// Errors reported by tree and record operations.
///
/// Every operation that returns an `Error` leaves the tree exactly as it was
/// before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A node with an equal key is already in the tree.
    Duplicate,
    /// No node matched the requested key.
    NotFound,
    /// The allocator could not satisfy a request.
    Alloc(AllocErrorWithLayout),
    /// The node is already part of a tree.
    AlreadyLinked,
    /// The node is not part of any tree.
    NotLinked,
    /// A rotation was requested but the child it promotes is absent.
    MissingChild,
    /// The child slot a node was to be linked into is already taken.
    SlotOccupied,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Duplicate => f.write_str("key already present in tree"),
            Error::NotFound => f.write_str("key not found"),
            Error::Alloc(error) => fmt::Display::fmt(error, f),
            Error::AlreadyLinked => f.write_str("node is already linked into a tree"),
            Error::NotLinked => f.write_str("node is not linked into a tree"),
            Error::MissingChild => f.write_str("rotation requires a child that is absent"),
            Error::SlotOccupied => f.write_str("child slot is already occupied"),
        }
    }
}

impl core::error::Error for Error {}

impl From<AllocErrorWithLayout> for Error {
    #[inline]
    fn from(error: AllocErrorWithLayout) -> Self {
        Error::Alloc(error)
    }
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
