// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Key generation APDUs
//!
//! Key generation is fragmented into one leaf per request so each command
//! completes within the transport timeout. Starting from
//! [`Mode::NotInitialised`][crate::state::Mode] the device reaches
//! [`Mode::Ready`][crate::state::Mode] after [`KEYGEN_STEPS`] requests, each
//! answered with a [`StateResp`][crate::state::StateResp].

use encdec::{Decode, Encode};

use crate::{ApduError, ApduStatic, Instruction, XMSS_APDU_CLA};

/// Number of [`KeygenReq`] steps from an uninitialised device to a usable key pair
/// (one per leaf plus one for the root)
pub const KEYGEN_STEPS: usize = 257;

/// Execute one key generation step
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct KeygenReq {}

impl ApduStatic for KeygenReq {
    const CLA: u8 = XMSS_APDU_CLA;
    const INS: u8 = Instruction::KeygenStep as u8;
}
