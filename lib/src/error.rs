// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_xmss_apdu::{
    state::{Mode, SignState},
    tx::TxError,
};

/// Ledger XMSS API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or device error
    #[error("Transport error: {0}")]
    Transport(#[from] ledger_lib::Error),

    /// Unexpected device state
    #[error("Unexpected device state (mode: {0}, state: {1})")]
    UnexpectedState(Mode, SignState),

    /// Unexpected APDU response
    #[error("Unexpected APDU response")]
    UnexpectedResponse,

    /// Transaction failed local validation
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(TxError),

    /// No one-time keys remain on the device
    #[error("One-time keys exhausted")]
    KeysExhausted,

    /// Timeout waiting for user
    #[error("Timeout waiting for user interaction")]
    UserTimeout,

    /// User denied operation
    #[error("Operation rejected by user")]
    UserDenied,

    /// Returned signature failed verification
    #[error("Signature verification failed")]
    InvalidSignature,
}

impl From<TxError> for Error {
    fn from(e: TxError) -> Self {
        Error::InvalidTransaction(e)
    }
}
