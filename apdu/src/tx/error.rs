// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Transaction validation errors
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum TxError {
    /// Buffer ends before the transaction header or a declared field
    #[cfg_attr(feature = "thiserror", error("transaction truncated"))]
    Truncated,

    /// Sub-item count is zero
    #[cfg_attr(feature = "thiserror", error("transaction has no sub-items"))]
    NoSubItems,

    /// Sub-item count exceeds the variant maximum
    #[cfg_attr(feature = "thiserror", error("too many sub-items ({0})"))]
    TooManySubItems(u8),

    /// Declared size does not match the supplied length
    #[cfg_attr(
        feature = "thiserror",
        error("size mismatch (expected {expected}, actual {actual})")
    )]
    SizeMismatch { expected: usize, actual: usize },

    /// Transaction is too short to carry hashable content
    #[cfg_attr(feature = "thiserror", error("transaction has no hashable content"))]
    NotHashable,
}
