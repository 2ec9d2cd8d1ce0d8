// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Response status words
//!
//! Every reply carries one of these in the trailing two bytes (big-endian, ISO 7816).

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

/// APDU status codes
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumIter, TryFromPrimitive)]
#[repr(u16)]
pub enum StatusCode {
    /// Command completed
    Ok = 0x9000,

    /// Response could not be encoded
    ExecutionError = 0x6400,

    /// Header or payload length is inconsistent
    WrongLength = 0x6700,

    /// Payload was well-formed but semantically invalid
    DataInvalid = 0x6984,

    /// Command is not permitted in the current device mode
    CommandNotAllowed = 0x6986,

    /// Unknown instruction byte
    InstructionNotSupported = 0x6D00,

    /// Unknown class byte
    ClassNotSupported = 0x6E00,
}

impl StatusCode {
    /// Status word as transmitted on the wire
    pub fn to_bytes(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }

    /// Split a raw response into `(payload, status)`
    pub fn split(resp: &[u8]) -> Option<(&[u8], u16)> {
        if resp.len() < 2 {
            return None;
        }

        let (data, sw) = resp.split_at(resp.len() - 2);
        Some((data, u16::from_be_bytes([sw[0], sw[1]])))
    }
}
