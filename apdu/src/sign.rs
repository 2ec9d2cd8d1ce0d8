// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Signing APDUs
//!
//! A [`SignReq`] carries a serialised [transaction][crate::tx::Transaction],
//! which is validated and hashed before the device requests confirmation.
//! Once approved the signature index is committed and the signature is
//! streamed in [`SIG_CHUNKS`] slices via [`SignNextReq`].

use encdec::{Decode, Encode};

use crate::{ApduError, ApduStatic, Instruction, XMSS_APDU_CLA};

/// Encoded XMSS signature length
/// (`index:4 | randomiser:32 | wots:67*32 | auth_path:8*32`)
pub const SIG_SIZE: usize = 4 + 32 + 67 * 32 + 8 * 32;

/// Number of [`SignNextReq`] exchanges required to fetch a signature
pub const SIG_CHUNKS: usize = 10;

/// Maximum bytes per signature chunk, the final chunk carries the remainder
pub const SIG_CHUNK_SIZE: usize = SIG_SIZE.div_ceil(SIG_CHUNKS);

/// Minimum transaction payload (type and sub-item count)
pub const SIGN_REQ_MIN_LEN: usize = 2;

/// Byte range of a signature chunk
pub const fn chunk_range(chunk: usize) -> core::ops::Range<usize> {
    let start = chunk * SIG_CHUNK_SIZE;
    let end = start + SIG_CHUNK_SIZE;

    if start > SIG_SIZE {
        SIG_SIZE..SIG_SIZE
    } else if end > SIG_SIZE {
        start..SIG_SIZE
    } else {
        start..end
    }
}

/// Submit a transaction for signing
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    TX_TYPE    |   NUM_ITEMS   |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
/// /                      TRANSACTION_BODY...                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct SignReq<'a> {
    /// Serialised transaction
    pub tx: &'a [u8],
}

impl<'a> SignReq<'a> {
    pub fn new(tx: &'a [u8]) -> Self {
        Self { tx }
    }
}

impl<'a> ApduStatic for SignReq<'a> {
    const CLA: u8 = XMSS_APDU_CLA;
    const INS: u8 = Instruction::Sign as u8;
}

impl<'a> Encode for SignReq<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.tx.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let d = self.tx;

        if buff.len() < d.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..d.len()].copy_from_slice(d);

        Ok(d.len())
    }
}

impl<'a> Decode<'a> for SignReq<'a> {
    type Output = Self;
    type Error = ApduError;

    /// Decode a [`SignReq`], consuming the whole payload
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < SIGN_REQ_MIN_LEN {
            return Err(ApduError::InvalidLength);
        }

        Ok((Self { tx: buff }, buff.len()))
    }
}

/// Fetch the next signature chunk
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct SignNextReq {}

impl ApduStatic for SignNextReq {
    const CLA: u8 = XMSS_APDU_CLA;
    const INS: u8 = Instruction::SignNext as u8;
}

/// Signature chunk response, raw signature bytes.
/// Empty where no signing session is active or the session is exhausted.
#[derive(Clone, PartialEq, Debug)]
pub struct SignChunk<'a> {
    pub data: &'a [u8],
}

impl<'a> Encode for SignChunk<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.data.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let d = self.data;

        if buff.len() < d.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..d.len()].copy_from_slice(d);

        Ok(d.len())
    }
}

impl<'a> Decode<'a> for SignChunk<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() > SIG_CHUNK_SIZE {
            return Err(ApduError::InvalidLength);
        }

        Ok((Self { data: buff }, buff.len()))
    }
}
