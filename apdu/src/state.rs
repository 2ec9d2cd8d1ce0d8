// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device State APDUs
//!

use encdec::{Decode, DecodeOwned, Encode};
use ledger_proto::ApduError;
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use crate::{ApduStatic, Instruction, XMSS_APDU_CLA};

/// Persistent device mode
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Debug,
    EnumString,
    Display,
    EnumVariantNames,
    EnumIter,
    TryFromPrimitive,
)]
#[repr(u8)]
pub enum Mode {
    /// No key material, key generation has not started
    NotInitialised = 0x00,
    /// Leaves are being generated
    KeygenRunning = 0x01,
    /// Key pair available for signing
    Ready = 0x02,
}

/// Signing dialogue state, reported alongside [`Mode`]
#[derive(
    Copy, Clone, PartialEq, Eq, Debug, EnumString, Display, EnumVariantNames, EnumIter, TryFromPrimitive,
)]
#[repr(u8)]
pub enum SignState {
    Idle = 0x00,
    SignPending = 0x01,
    Signing = 0x02,
    SignComplete = 0x03,
    IndexPending = 0x04,
    Denied = 0x05,
}

/// Helper for single byte enum encodings
macro_rules! encdec_u8_enum {
    ($t:ty) => {
        impl Encode for $t {
            type Error = ApduError;

            fn encode_len(&self) -> Result<usize, ApduError> {
                Ok(1)
            }

            fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
                if buff.is_empty() {
                    return Err(ApduError::InvalidLength);
                }
                buff[0] = *self as u8;
                Ok(1)
            }
        }

        impl DecodeOwned for $t {
            type Output = Self;

            type Error = ApduError;

            fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
                if buff.is_empty() {
                    return Err(ApduError::InvalidLength);
                }

                match Self::try_from(buff[0]) {
                    Ok(v) => Ok((v, 1)),
                    Err(_) => Err(ApduError::InvalidEncoding),
                }
            }
        }
    };
}

encdec_u8_enum!(Mode);
encdec_u8_enum!(SignState);

/// Device state request APDU
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct StateReq {}

impl ApduStatic for StateReq {
    const CLA: u8 = XMSS_APDU_CLA;
    const INS: u8 = Instruction::GetState as u8;
}

/// Device state response APDU.
///
/// Returned for state queries as well as key generation, sign and
/// set-index requests, reporting the persisted mode and index alongside
/// the signing dialogue state.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     MODE      |             INDEX             |  SIGN_STATE   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     VALUE     |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct StateResp {
    /// Persisted device mode
    pub mode: Mode,
    /// Leaf counter (keygen) or next signature index (ready)
    pub index: u16,
    /// Signing dialogue state
    pub state: SignState,
    /// Value associated with the dialogue state (next chunk while signing)
    pub value: u8,
}

impl StateResp {
    pub fn new(mode: Mode, index: u16, state: SignState, value: u8) -> Self {
        Self {
            mode,
            index,
            state,
            value,
        }
    }
}
