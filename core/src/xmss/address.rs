// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Hash addresses, eight big-endian words domain-separating every hash call

use byteorder::{BigEndian, ByteOrder};

const TYPE: usize = 3;
const WORD_4: usize = 4;
const WORD_5: usize = 5;
const WORD_6: usize = 6;
const KEY_AND_MASK: usize = 7;

const TYPE_OTS: u32 = 0;
const TYPE_LTREE: u32 = 1;
const TYPE_HASH_TREE: u32 = 2;

/// Hash address
///
/// ```text
/// | layer | tree (2 words) | type | ots / ltree / 0 | chain / height | hash / index | key_and_mask |
/// ```
///
/// Layer and tree words are always zero for a single tree.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Address([u32; 8]);

impl Address {
    /// WOTS+ chain address for a leaf
    pub fn ots(leaf: u32) -> Self {
        let mut a = [0u32; 8];
        a[TYPE] = TYPE_OTS;
        a[WORD_4] = leaf;
        Self(a)
    }

    /// L-tree address for a leaf
    pub fn ltree(leaf: u32) -> Self {
        let mut a = [0u32; 8];
        a[TYPE] = TYPE_LTREE;
        a[WORD_4] = leaf;
        Self(a)
    }

    /// Main tree node address
    pub fn hash_tree() -> Self {
        let mut a = [0u32; 8];
        a[TYPE] = TYPE_HASH_TREE;
        Self(a)
    }

    /// Set chain index (OTS addresses)
    pub fn with_chain(mut self, chain: u32) -> Self {
        self.0[WORD_5] = chain;
        self
    }

    /// Set hash step within a chain (OTS addresses)
    pub fn with_hash(mut self, hash: u32) -> Self {
        self.0[WORD_6] = hash;
        self
    }

    /// Set node height (L-tree and hash tree addresses)
    pub fn with_tree_height(mut self, height: u32) -> Self {
        self.0[WORD_5] = height;
        self
    }

    /// Set node index (L-tree and hash tree addresses)
    pub fn with_tree_index(mut self, index: u32) -> Self {
        self.0[WORD_6] = index;
        self
    }

    pub fn with_key_and_mask(mut self, km: u32) -> Self {
        self.0[KEY_AND_MASK] = km;
        self
    }

    pub fn tree_height(&self) -> u32 {
        self.0[WORD_5]
    }

    /// Serialise to 32 bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut b = [0u8; 32];
        BigEndian::write_u32_into(&self.0, &mut b);
        b
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn address_layout() {
        let a = Address::ots(0x0102).with_chain(66).with_hash(14).with_key_and_mask(1);

        let b = a.to_bytes();
        assert_eq!(&b[..12], &[0u8; 12]);
        assert_eq!(&b[12..16], &[0, 0, 0, 0]);
        assert_eq!(&b[16..20], &[0, 0, 0x01, 0x02]);
        assert_eq!(&b[20..24], &[0, 0, 0, 66]);
        assert_eq!(&b[24..28], &[0, 0, 0, 14]);
        assert_eq!(&b[28..32], &[0, 0, 0, 1]);

        let t = Address::hash_tree().with_tree_height(7).with_tree_index(1);
        let b = t.to_bytes();
        assert_eq!(&b[12..16], &[0, 0, 0, 2]);
        assert_eq!(&b[16..20], &[0, 0, 0, 0]);
        assert_eq!(&b[20..24], &[0, 0, 0, 7]);
        assert_eq!(&b[24..28], &[0, 0, 0, 1]);

        assert_eq!(Address::ltree(3).to_bytes()[15], 1);
    }
}
