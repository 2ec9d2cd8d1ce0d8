// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Incremental key generation
//!
//! Each call to [`step`] computes and persists a single leaf (or the root),
//! so long-running generation survives interruption and each command
//! completes within the transport timeout. Leaves are a pure function of
//! the device seed and index, replaying a step rewrites identical data.

use ledger_xmss_apdu::state::Mode;

use super::{Driver, Storage};
use crate::{
    engine::store::DeviceState,
    helpers::device_seeds,
    xmss::{self, LEAF_COUNT},
};

/// Outcome of a key generation step
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Progress {
    /// Leaf with the provided index was written
    Leaf(u16),
    /// Root computed, key pair ready
    Complete,
    /// Key pair already available, nothing to do
    AlreadyInitialised,
}

impl Progress {
    /// Check whether further steps are required
    pub fn remaining(&self) -> bool {
        matches!(self, Progress::Leaf(_))
    }
}

/// Execute one key generation step against the provided storage
#[cfg_attr(feature = "noinline", inline(never))]
pub fn step<DRV: Driver, S: Storage>(drv: &DRV, store: &mut S) -> Progress {
    let mut state = store.state();

    // Start generation, then continue straight into the first leaf
    if state.mode == Mode::NotInitialised {
        #[cfg(feature = "log")]
        log::info!("starting key generation");

        state = DeviceState::keygen(0);
        store.set_state(&state);
    }

    if state.mode == Mode::Ready {
        return Progress::AlreadyInitialised;
    }

    let seeds = device_seeds(drv);

    if (state.index as usize) < LEAF_COUNT {
        let index = state.index;

        let leaf = xmss::leaf(&seeds, index);
        store.set_leaf(index, &leaf);
        store.set_state(&DeviceState::keygen(index + 1));

        #[cfg(feature = "log")]
        log::debug!("generated leaf {}/{}", index + 1, LEAF_COUNT);

        return Progress::Leaf(index);
    }

    let root = xmss::tree::root(&|i| store.leaf(i), &seeds.pub_seed);
    let public_key = xmss::public_key(&root, &seeds.pub_seed);

    store.set_state(&DeviceState::ready(0, public_key));

    #[cfg(feature = "log")]
    log::info!("key generation complete");

    Progress::Complete
}
