// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for XMSS app communication
//!
//! This module provides protocol definitions and a reference implementation for communication
//! with XMSS hash-based signature wallets, alongside the [transaction codec][tx] used to
//! validate and hash the payloads submitted for signing.
//!
//! APDUs use a primitive binary encoding to simplify implementation with unsupported languages and platforms.
//! Response fields are little-endian, transaction payloads retain their network encoding
//! (big-endian amounts) so the on-device hash matches the value computed by the network.
//!

#![cfg_attr(not(feature = "std"), no_std)]

use core::fmt::Debug;

pub use ledger_proto::{ApduError, ApduReq, ApduStatic};

pub mod app_info;
pub mod keygen;
pub mod prelude;
pub mod public_key;
pub mod set_index;
pub mod sign;
pub mod state;
pub mod status;
pub mod tx;

mod helpers;

/// XMSS APDU Class
pub const XMSS_APDU_CLA: u8 = 0x77;

/// XMSS APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version
    GetVersion = 0x00,

    /// Fetch persisted device state
    GetState = 0x01,

    /// Execute a single key generation step
    KeygenStep = 0x02,

    /// Fetch the XMSS public key
    GetPublicKey = 0x03,

    /// Submit a transaction for signing
    Sign = 0x04,

    /// Fetch the next signature chunk
    SignNext = 0x05,

    /// Override the signature index (requires confirmation)
    SetIndex = 0x06,
}

/// Helper macro for encoding `bitflags` types
#[macro_export]
macro_rules! encdec_bitflags {
    ($b:ty) => {
        impl encdec::Encode for $b {
            type Error = ApduError;

            fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
                let bits: u8 = self.bits();
                encdec::Encode::encode(&bits, buff).map_err(|e| e.into())
            }

            fn encode_len(&self) -> Result<usize, Self::Error> {
                let bits: u8 = self.bits();
                encdec::Encode::encode_len(&bits).map_err(|e| e.into())
            }
        }

        impl encdec::DecodeOwned for $b {
            type Output = $b;
            type Error = ApduError;

            fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Self::Error> {
                if buff.is_empty() {
                    return Err(ApduError::InvalidLength);
                }
                let v = <$b>::from_bits_truncate(buff[0]);
                Ok((v, 1))
            }
        }
    };
}
