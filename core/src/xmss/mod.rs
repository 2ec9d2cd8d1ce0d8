// Copyright (c) 2022-2023 The MobileCoin Foundation

//! XMSS-SHA2_8_256 primitives
//!
//! A single height 8 tree of WOTS+ (w = 16) one-time keys, hashed with SHA-256.
//! Everything here is a pure function of the [`KeySeeds`] and indices so
//! leaves may be regenerated after an interrupted key generation step, and
//! signature elements may be computed independently when streaming a
//! signature in chunks.
//!
//! ## Signature encoding
//!
//! ```text
//! +-----------+----------------+-------------------+------------------+
//! | INDEX (4) | RANDOMISER (32)| WOTS+ (67 x 32)   | AUTH_PATH (8x32) |
//! | big-end.  |                |                   |                  |
//! +-----------+----------------+-------------------+------------------+
//! ```

use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};
use static_assertions::const_assert_eq;
use zeroize::Zeroize;

mod address;
pub use address::Address;

mod hash;
pub use hash::{h_msg, prf, to_bytes_32};

pub mod tree;
pub mod wots;

/// Hash output length
pub const N: usize = 32;

/// Winternitz parameter
pub const WOTS_W: usize = 16;

/// Message digits
pub const WOTS_LEN1: usize = 64;

/// Checksum digits
pub const WOTS_LEN2: usize = 3;

/// WOTS+ chains per one-time key
pub const WOTS_LEN: usize = WOTS_LEN1 + WOTS_LEN2;

/// Merkle tree height
pub const TREE_HEIGHT: usize = 8;

/// Number of one-time keys
pub const LEAF_COUNT: usize = 1 << TREE_HEIGHT;

/// Device seed length
pub const SEED_LEN: usize = 48;

/// Public key length (root followed by public seed)
pub const PUBLIC_KEY_LEN: usize = 2 * N;

/// Encoded signature length
pub const SIG_SIZE: usize = 4 + N + WOTS_LEN * N + TREE_HEIGHT * N;

const_assert_eq!(SIG_SIZE, ledger_xmss_apdu::sign::SIG_SIZE);
const_assert_eq!(PUBLIC_KEY_LEN, ledger_xmss_apdu::public_key::PUBLIC_KEY_LEN);

/// Signature field offsets
pub const SIG_RANDOMISER_OFFSET: usize = 4;
pub const SIG_WOTS_OFFSET: usize = SIG_RANDOMISER_OFFSET + N;
pub const SIG_AUTH_OFFSET: usize = SIG_WOTS_OFFSET + WOTS_LEN * N;

/// Hash value
pub type Hash = [u8; N];

/// Secret and public seeds expanded from the device seed
pub struct KeySeeds {
    pub sk_seed: Hash,
    pub sk_prf: Hash,
    pub pub_seed: Hash,
}

impl KeySeeds {
    /// Expand a device seed via SHAKE-256
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        let mut h = Shake256::default();
        h.update(seed);

        let mut b = [0u8; 3 * N];
        h.finalize_xof().read(&mut b);

        let mut s = Self {
            sk_seed: [0u8; N],
            sk_prf: [0u8; N],
            pub_seed: [0u8; N],
        };
        s.sk_seed.copy_from_slice(&b[..N]);
        s.sk_prf.copy_from_slice(&b[N..][..N]);
        s.pub_seed.copy_from_slice(&b[2 * N..]);

        b.zeroize();

        s
    }
}

impl Drop for KeySeeds {
    fn drop(&mut self) {
        self.sk_seed.zeroize();
        self.sk_prf.zeroize();
    }
}

/// Compute leaf `index` (compressed WOTS+ public key)
#[cfg_attr(feature = "noinline", inline(never))]
pub fn leaf(seeds: &KeySeeds, index: u16) -> Hash {
    let mut pk = wots::public_key(seeds, index as u32);
    wots::ltree(&mut pk, &seeds.pub_seed, index as u32)
}

/// Per-signature randomiser
pub fn randomiser(seeds: &KeySeeds, index: u16) -> Hash {
    prf(&seeds.sk_prf, &to_bytes_32(index as u32))
}

/// Digest signed by the one-time key
pub fn message_digest(r: &Hash, root: &Hash, index: u16, msg: &Hash) -> Hash {
    h_msg(r, root, index as u32, msg)
}

/// Build a public key from root and public seed
pub fn public_key(root: &Hash, pub_seed: &Hash) -> [u8; PUBLIC_KEY_LEN] {
    let mut pk = [0u8; PUBLIC_KEY_LEN];
    pk[..N].copy_from_slice(root);
    pk[N..].copy_from_slice(pub_seed);
    pk
}

fn hash_at(b: &[u8], offset: usize) -> Hash {
    let mut h = [0u8; N];
    h.copy_from_slice(&b[offset..][..N]);
    h
}

/// Verify an encoded signature over a 32 byte message
pub fn verify(public_key: &[u8; PUBLIC_KEY_LEN], msg: &Hash, sig: &[u8]) -> bool {
    if sig.len() != SIG_SIZE {
        return false;
    }

    let index = u32::from_be_bytes([sig[0], sig[1], sig[2], sig[3]]);
    if index as usize >= LEAF_COUNT {
        return false;
    }

    let root = hash_at(public_key, 0);
    let pub_seed = hash_at(public_key, N);

    let r = hash_at(sig, SIG_RANDOMISER_OFFSET);
    let digest = message_digest(&r, &root, index as u16, msg);
    let digits = wots::digits(&digest);

    let mut pk = [[0u8; N]; WOTS_LEN];
    for (i, p) in pk.iter_mut().enumerate() {
        let s = hash_at(sig, SIG_WOTS_OFFSET + i * N);
        *p = wots::element_from_sig(&s, &pub_seed, index, &digits, i);
    }
    let leaf = wots::ltree(&mut pk, &pub_seed, index);

    let mut auth = [[0u8; N]; TREE_HEIGHT];
    for (k, a) in auth.iter_mut().enumerate() {
        *a = hash_at(sig, SIG_AUTH_OFFSET + k * N);
    }

    tree::root_from_path(&leaf, index, &auth, &pub_seed) == root
}
