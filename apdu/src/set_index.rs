// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Signature index override APDU
//!
//! **Dangerous**: moving the index backwards permits reuse of a one-time
//! signing leaf, which allows signature forgery. The device only stages the
//! request, the override is committed following on-device confirmation.

use encdec::{DecodeOwned, Encode};

use crate::{ApduError, ApduStatic, Instruction, XMSS_APDU_CLA};

/// Set the next signature index
///
/// ## Encoding:
/// ```text
///  0                   1
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |             INDEX             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SetIndexReq {
    /// New signature index, up to and including the leaf count
    pub index: u16,
}

impl SetIndexReq {
    pub fn new(index: u16) -> Self {
        Self { index }
    }
}

impl ApduStatic for SetIndexReq {
    const CLA: u8 = XMSS_APDU_CLA;
    const INS: u8 = Instruction::SetIndex as u8;
}

impl Encode for SetIndexReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(2)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < 2 {
            return Err(ApduError::InvalidLength);
        }

        buff[..2].copy_from_slice(&self.index.to_le_bytes());

        Ok(2)
    }
}

/// Decoding is strict, payloads must be exactly two bytes
impl DecodeOwned for SetIndexReq {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.len() != 2 {
            return Err(ApduError::InvalidLength);
        }

        let index = u16::from_le_bytes([buff[0], buff[1]]);

        Ok((Self { index }, 2))
    }
}
