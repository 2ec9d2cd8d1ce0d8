// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Public key APDUs

use encdec::{Decode, Encode};

use crate::{helpers::arr, ApduError, ApduStatic, Instruction, XMSS_APDU_CLA};

/// Signature scheme descriptor, XMSS SHA2-256 with a height 8 tree
pub const XMSS_DESCRIPTOR: [u8; 3] = [0x00, 0x04, 0x00];

/// Public key length (root followed by public seed)
pub const PUBLIC_KEY_LEN: usize = 64;

/// Fetch the XMSS public key, only available once key generation is complete
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct PublicKeyReq {}

impl ApduStatic for PublicKeyReq {
    const CLA: u8 = XMSS_APDU_CLA;
    const INS: u8 = Instruction::GetPublicKey as u8;
}

/// Public key response APDU
///
/// ## Encoding:
/// ```text
/// +------------+--------------+---------------------+
/// | DESCRIPTOR |  ROOT (32)   |  PUBLIC_SEED (32)   |
/// |    (3)     |              |                     |
/// +------------+--------------+---------------------+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct PublicKeyResp {
    /// Scheme descriptor
    #[encdec(with = "arr")]
    pub descriptor: [u8; 3],

    /// Merkle root followed by the public seed
    #[encdec(with = "arr")]
    pub public_key: [u8; PUBLIC_KEY_LEN],
}

impl PublicKeyResp {
    pub fn new(public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self {
            descriptor: XMSS_DESCRIPTOR,
            public_key,
        }
    }

    /// Merkle tree root
    pub fn root(&self) -> &[u8] {
        &self.public_key[..32]
    }

    /// Public seed used for key and bitmask derivation
    pub fn pub_seed(&self) -> &[u8] {
        &self.public_key[32..]
    }
}
