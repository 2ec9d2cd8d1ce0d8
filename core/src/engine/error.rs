// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_proto::ApduError;
use ledger_xmss_apdu::{status::StatusCode, tx::TxError};

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Invalid argument length
    #[cfg_attr(feature = "thiserror", error("Invalid argument length"))]
    InvalidLength = 0x00,

    /// Transaction failed validation
    #[cfg_attr(feature = "thiserror", error("Invalid transaction"))]
    InvalidTransaction = 0x01,

    /// Signature index out of range
    #[cfg_attr(feature = "thiserror", error("Invalid signature index"))]
    InvalidIndex = 0x02,

    /// Command not available in the current device mode
    #[cfg_attr(feature = "thiserror", error("Invalid device mode"))]
    InvalidMode = 0x03,

    /// Key generation already complete
    #[cfg_attr(feature = "thiserror", error("Key already initialised"))]
    AlreadyInitialised = 0x04,

    /// All one-time keys have been used
    #[cfg_attr(feature = "thiserror", error("One-time keys exhausted"))]
    KeysExhausted = 0x05,

    /// Pending user approval
    #[cfg_attr(feature = "thiserror", error("pending user approval"))]
    ApprovalPending = 0x06,

    /// Unexpected event
    #[cfg_attr(feature = "thiserror", error("Unexpected event"))]
    UnexpectedEvent = 0x07,

    /// Message encoding failed
    #[cfg_attr(feature = "thiserror", error("message encoding failed"))]
    EncodingFailed = 0x08,

    /// Unrecognised instruction
    #[cfg_attr(feature = "thiserror", error("Unknown instruction"))]
    UnknownInstruction = 0x09,

    /// Unrecognised class
    #[cfg_attr(feature = "thiserror", error("Unknown class"))]
    UnknownClass = 0x0a,
}

impl From<TxError> for Error {
    fn from(_: TxError) -> Self {
        Error::InvalidTransaction
    }
}

impl From<ApduError> for Error {
    fn from(e: ApduError) -> Self {
        match e {
            ApduError::InvalidLength => Error::InvalidLength,
            _ => Error::InvalidTransaction,
        }
    }
}

/// Map engine errors to response status words
impl From<Error> for StatusCode {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidLength => StatusCode::WrongLength,
            Error::InvalidTransaction | Error::InvalidIndex => StatusCode::DataInvalid,
            Error::InvalidMode
            | Error::AlreadyInitialised
            | Error::KeysExhausted
            | Error::ApprovalPending
            | Error::UnexpectedEvent => StatusCode::CommandNotAllowed,
            Error::UnknownInstruction => StatusCode::InstructionNotSupported,
            Error::UnknownClass => StatusCode::ClassNotSupported,
            Error::EncodingFailed => StatusCode::ExecutionError,
        }
    }
}
