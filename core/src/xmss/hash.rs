// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Keyed hash functions, SHA-256 with a 32 byte domain separation prefix

use sha2::{Digest as _, Sha256};

use super::{Address, Hash, N};

const PREFIX_F: u8 = 0;
const PREFIX_H: u8 = 1;
const PREFIX_H_MSG: u8 = 2;
const PREFIX_PRF: u8 = 3;

/// Big-endian integer padded to 32 bytes
pub fn to_bytes_32(v: u32) -> [u8; N] {
    let mut b = [0u8; N];
    b[N - 4..].copy_from_slice(&v.to_be_bytes());
    b
}

fn keyed(prefix: u8, key: &[u8], parts: &[&[u8]]) -> Hash {
    let mut h = Sha256::new();

    h.update(to_bytes_32(prefix as u32));
    h.update(key);
    for p in parts {
        h.update(p);
    }

    h.finalize().into()
}

/// Chain function
pub fn f(key: &Hash, m: &Hash) -> Hash {
    keyed(PREFIX_F, key, &[&m[..]])
}

/// Tree hash over two nodes
pub fn h(key: &Hash, left: &Hash, right: &Hash) -> Hash {
    keyed(PREFIX_H, key, &[&left[..], &right[..]])
}

/// Message hash, keyed by randomiser, root and signature index
pub fn h_msg(r: &Hash, root: &Hash, index: u32, m: &Hash) -> Hash {
    keyed(PREFIX_H_MSG, r, &[&root[..], &to_bytes_32(index)[..], &m[..]])
}

pub fn prf(key: &Hash, m: &[u8; 32]) -> Hash {
    keyed(PREFIX_PRF, key, &[&m[..]])
}

/// Keyed [`h`] with bitmasks, derived from `pub_seed` with key_and_mask 0..=2
pub fn rand_hash(left: &Hash, right: &Hash, pub_seed: &Hash, addr: Address) -> Hash {
    let key = prf(pub_seed, &addr.with_key_and_mask(0).to_bytes());
    let bm0 = prf(pub_seed, &addr.with_key_and_mask(1).to_bytes());
    let bm1 = prf(pub_seed, &addr.with_key_and_mask(2).to_bytes());

    h(&key, &xor(left, &bm0), &xor(right, &bm1))
}

pub fn xor(a: &Hash, b: &Hash) -> Hash {
    let mut r = [0u8; N];
    for i in 0..N {
        r[i] = a[i] ^ b[i];
    }
    r
}
