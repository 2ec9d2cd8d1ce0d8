// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Encoded XMSS signatures, as assembled from device chunks

use ledger_xmss_core::xmss::{
    self, N, PUBLIC_KEY_LEN, SIG_AUTH_OFFSET, SIG_RANDOMISER_OFFSET, SIG_SIZE, SIG_WOTS_OFFSET,
    TREE_HEIGHT, WOTS_LEN,
};

use crate::Error;

/// XMSS signature (`index:4 | randomiser:32 | wots:67*32 | auth_path:8*32`)
#[derive(Clone, PartialEq)]
pub struct Signature([u8; SIG_SIZE]);

impl Signature {
    /// Signature (leaf) index
    pub fn index(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Per-signature randomiser
    pub fn randomiser(&self) -> &[u8] {
        &self.0[SIG_RANDOMISER_OFFSET..][..N]
    }

    /// WOTS+ signature elements
    pub fn wots(&self) -> impl Iterator<Item = &[u8]> {
        self.0[SIG_WOTS_OFFSET..][..WOTS_LEN * N].chunks(N)
    }

    /// Authentication path, leaf level first
    pub fn auth_path(&self) -> impl Iterator<Item = &[u8]> {
        self.0[SIG_AUTH_OFFSET..][..TREE_HEIGHT * N].chunks(N)
    }

    /// Verify the signature over a transaction hash
    pub fn verify(&self, public_key: &[u8; PUBLIC_KEY_LEN], tx_hash: &[u8; 32]) -> bool {
        xmss::verify(public_key, tx_hash, &self.0)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let b: [u8; SIG_SIZE] = value.try_into().map_err(|_| Error::UnexpectedResponse)?;
        Ok(Self(b))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Signature {{ index: {}, randomiser: {} }}",
            self.index(),
            hex::encode(self.randomiser())
        )
    }
}
