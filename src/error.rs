use core::fmt;

/// Errors returned by the containers in this crate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// [`AvlTree::remove`](crate::AvlTree::remove) was called.
    ///
    /// `value` is the `Debug` rendering of the key that was to be removed.
    #[error("can't remove {value}: remove is not implemented for AVL trees")]
    RemoveUnsupported { value: String },
}

impl Error {
    pub(crate) fn remove_unsupported<K: fmt::Debug + ?Sized>(key: &K) -> Self {
        Error::RemoveUnsupported {
            value: format!("{key:?}"),
        }
    }
}
