// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use ledger_xmss_apdu::{
    prelude::*,
    sign::SIG_CHUNK_SIZE,
    ApduError,
};

use super::State;
use crate::xmss::PUBLIC_KEY_LEN;

/// [`Engine`][super::Engine] outputs (typically encoded to response [APDUs][crate::apdu])
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// No output
    None,

    /// Application version
    Version {
        flags: AppFlags,
        major: u8,
        minor: u8,
        patch: u8,
    },

    /// Device and dialogue state
    State {
        mode: Mode,
        index: u16,
        state: State,
    },

    /// XMSS public key (root and public seed)
    PublicKey([u8; PUBLIC_KEY_LEN]),

    /// Signature chunk, `len` bytes of `data` are valid
    Chunk {
        data: [u8; SIG_CHUNK_SIZE],
        len: usize,
    },
}

impl Output {
    /// Fetch engine state, where available
    pub fn state(&self) -> Option<State> {
        match self {
            Output::State { state, .. } => Some(*state),
            _ => None,
        }
    }

    /// Fetch chunk data, where available
    pub fn chunk(&self) -> Option<&[u8]> {
        match self {
            Output::Chunk { data, len } => Some(&data[..*len]),
            _ => None,
        }
    }

    /// Encode an [`Output`] object to a response APDU
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::None => Ok(0),
            Output::Version {
                flags,
                major,
                minor,
                patch,
            } => AppInfoResp::new(*flags, *major, *minor, *patch).encode(buff),
            Output::State { mode, index, state } => {
                let (s, value) = state.sign_state();
                StateResp::new(*mode, *index, s, value).encode(buff)
            }
            Output::PublicKey(public_key) => PublicKeyResp::new(*public_key).encode(buff),
            Output::Chunk { data, len } => SignChunk { data: &data[..*len] }.encode(buff),
        }
    }
}
