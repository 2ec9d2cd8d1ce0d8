// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Merkle tree over stored leaves

use super::{hash::rand_hash, Address, Hash, TREE_HEIGHT};

/// Compute the node at `height` / `index`, fetching leaves via `leaf`
pub fn node<F: Fn(u16) -> Hash>(leaf: &F, pub_seed: &Hash, height: u32, index: u32) -> Hash {
    if height == 0 {
        return leaf(index as u16);
    }

    let l = node(leaf, pub_seed, height - 1, 2 * index);
    let r = node(leaf, pub_seed, height - 1, 2 * index + 1);

    let addr = Address::hash_tree()
        .with_tree_height(height - 1)
        .with_tree_index(index);

    rand_hash(&l, &r, pub_seed, addr)
}

/// Compute the tree root
pub fn root<F: Fn(u16) -> Hash>(leaf: &F, pub_seed: &Hash) -> Hash {
    node(leaf, pub_seed, TREE_HEIGHT as u32, 0)
}

/// Compute the authentication path node at `height` for `leaf_index`
/// (the sibling of the path node at this height)
pub fn auth_node<F: Fn(u16) -> Hash>(
    leaf: &F,
    pub_seed: &Hash,
    leaf_index: u32,
    height: u32,
) -> Hash {
    node(leaf, pub_seed, height, (leaf_index >> height) ^ 1)
}

/// Climb from a leaf to the root using an authentication path
pub fn root_from_path(
    leaf: &Hash,
    leaf_index: u32,
    auth: &[Hash; TREE_HEIGHT],
    pub_seed: &Hash,
) -> Hash {
    let mut n = *leaf;

    for (k, a) in auth.iter().enumerate() {
        let k = k as u32;
        let addr = Address::hash_tree()
            .with_tree_height(k)
            .with_tree_index(leaf_index >> (k + 1));

        n = match (leaf_index >> k) & 1 {
            0 => rand_hash(&n, a, pub_seed, addr),
            _ => rand_hash(a, &n, pub_seed, addr),
        };
    }

    n
}
