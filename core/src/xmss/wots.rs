// Copyright (c) 2022-2023 The MobileCoin Foundation

//! WOTS+ one-time signatures (w = 16)

use zeroize::Zeroize;

use super::{
    hash::{f, prf, rand_hash, xor},
    Address, Hash, KeySeeds, N, WOTS_LEN, WOTS_LEN1, WOTS_LEN2, WOTS_W,
};

/// Apply `steps` chain iterations to `x`, starting at step `start`
pub fn chain(x: &Hash, start: u32, steps: u32, pub_seed: &Hash, addr: Address) -> Hash {
    let mut tmp = *x;

    for j in start..start + steps {
        let a = addr.with_hash(j);

        let key = prf(pub_seed, &a.with_key_and_mask(0).to_bytes());
        let bm = prf(pub_seed, &a.with_key_and_mask(1).to_bytes());

        tmp = f(&key, &xor(&tmp, &bm));
    }

    tmp
}

/// Split bytes into base-w digits, high nibble first
fn base_w(input: &[u8], out: &mut [u8]) {
    for (i, d) in out.iter_mut().enumerate() {
        let b = input[i / 2];
        *d = match i % 2 {
            0 => b >> 4,
            _ => b & 0x0f,
        };
    }
}

/// Message digits followed by checksum digits
pub fn digits(m: &Hash) -> [u8; WOTS_LEN] {
    let mut d = [0u8; WOTS_LEN];
    base_w(m, &mut d[..WOTS_LEN1]);

    let max = (WOTS_W - 1) as u32;
    let csum: u32 = d[..WOTS_LEN1].iter().map(|v| max - *v as u32).sum();

    // len2 * log2(w) = 12 bits, left-aligned in two bytes
    let csum = (csum << 4) as u16;
    base_w(&csum.to_be_bytes(), &mut d[WOTS_LEN1..]);

    debug_assert_eq!(WOTS_LEN - WOTS_LEN1, WOTS_LEN2);

    d
}

/// Secret chain start for a leaf and chain index
fn secret(seeds: &KeySeeds, leaf: u32, chain_index: u32) -> Hash {
    let a = Address::ots(leaf).with_chain(chain_index);
    prf(&seeds.sk_seed, &a.to_bytes())
}

/// Compute the full WOTS+ public key for a leaf
pub fn public_key(seeds: &KeySeeds, leaf: u32) -> [Hash; WOTS_LEN] {
    let mut pk = [[0u8; N]; WOTS_LEN];
    let max = (WOTS_W - 1) as u32;

    for (i, p) in pk.iter_mut().enumerate() {
        let mut sk = secret(seeds, leaf, i as u32);
        *p = chain(&sk, 0, max, &seeds.pub_seed, Address::ots(leaf).with_chain(i as u32));
        sk.zeroize();
    }

    pk
}

/// Compute a single signature element for chain `i`
pub fn sign_element(seeds: &KeySeeds, leaf: u32, digits: &[u8; WOTS_LEN], i: usize) -> Hash {
    let mut sk = secret(seeds, leaf, i as u32);

    let s = chain(
        &sk,
        0,
        digits[i] as u32,
        &seeds.pub_seed,
        Address::ots(leaf).with_chain(i as u32),
    );
    sk.zeroize();

    s
}

/// Recover the public key element for chain `i` from a signature element
pub fn element_from_sig(
    sig: &Hash,
    pub_seed: &Hash,
    leaf: u32,
    digits: &[u8; WOTS_LEN],
    i: usize,
) -> Hash {
    let max = (WOTS_W - 1) as u32;
    let d = digits[i] as u32;

    chain(
        sig,
        d,
        max - d,
        pub_seed,
        Address::ots(leaf).with_chain(i as u32),
    )
}

/// Compress a WOTS+ public key into a leaf
pub fn ltree(pk: &mut [Hash; WOTS_LEN], pub_seed: &Hash, leaf: u32) -> Hash {
    let mut addr = Address::ltree(leaf).with_tree_height(0);
    let mut len = WOTS_LEN;

    while len > 1 {
        for i in 0..len / 2 {
            let a = addr.with_tree_index(i as u32);
            pk[i] = rand_hash(&pk[2 * i], &pk[2 * i + 1], pub_seed, a);
        }

        if len % 2 == 1 {
            pk[len / 2] = pk[len - 1];
        }

        len = len.div_ceil(2);
        addr = addr.with_tree_height(addr.tree_height() + 1);
    }

    pk[0]
}
