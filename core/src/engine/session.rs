// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Chunked signature extraction
//!
//! The signature is never held in memory, each chunk recomputes only the
//! signature elements overlapping its byte range. The signature index is
//! persisted as used on [`SignSession::init`], before any signature bytes are
//! released, so an abandoned session burns the leaf rather than risking reuse.

use ledger_xmss_apdu::{
    sign::{chunk_range, SIG_CHUNKS},
    state::Mode,
};

use super::{Driver, Error, Storage};
use crate::{
    engine::store::DeviceState,
    helpers::device_seeds,
    xmss::{
        self, wots, Hash, KeySeeds, N, SIG_AUTH_OFFSET, SIG_RANDOMISER_OFFSET, SIG_SIZE,
        SIG_WOTS_OFFSET, TREE_HEIGHT, WOTS_LEN,
    },
};

/// Signature segments, in encoding order
#[derive(Copy, Clone, PartialEq, Debug)]
enum SigPart {
    Index,
    Randomiser,
    Wots(usize),
    Auth(usize),
}

impl SigPart {
    /// Number of segments in an encoded signature
    const COUNT: usize = 2 + WOTS_LEN + TREE_HEIGHT;

    fn at(n: usize) -> Self {
        match n {
            0 => SigPart::Index,
            1 => SigPart::Randomiser,
            n if n < 2 + WOTS_LEN => SigPart::Wots(n - 2),
            n => SigPart::Auth(n - 2 - WOTS_LEN),
        }
    }

    /// Byte offset and length within the signature
    fn span(&self) -> (usize, usize) {
        match self {
            SigPart::Index => (0, 4),
            SigPart::Randomiser => (SIG_RANDOMISER_OFFSET, N),
            SigPart::Wots(i) => (SIG_WOTS_OFFSET + i * N, N),
            SigPart::Auth(k) => (SIG_AUTH_OFFSET + k * N, N),
        }
    }
}

/// Signing session state
#[derive(Clone, PartialEq, Debug)]
pub struct SignSession {
    /// Leaf index in use
    index: u16,
    /// Per-signature randomiser
    r: Hash,
    /// Digest signed by the one-time key
    digest: Hash,
    /// Next chunk
    chunk: usize,
}

impl SignSession {
    /// Start a signing session for a transaction hash, committing the
    /// next signature index.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn init<DRV: Driver, S: Storage>(
        drv: &DRV,
        store: &mut S,
        tx_hash: &Hash,
    ) -> Result<Self, Error> {
        let state = store.state();

        if state.mode != Mode::Ready {
            return Err(Error::InvalidMode);
        }
        if state.is_exhausted() {
            return Err(Error::KeysExhausted);
        }

        let index = state.index;
        let seeds = device_seeds(drv);

        let mut root = [0u8; N];
        root.copy_from_slice(&state.public_key[..N]);

        let r = xmss::randomiser(&seeds, index);
        let digest = xmss::message_digest(&r, &root, index, tx_hash);

        // Commit prior to releasing any signature data
        store.set_state(&DeviceState::ready(index + 1, state.public_key));

        #[cfg(feature = "log")]
        log::debug!("signing with index {}", index);

        Ok(Self {
            index,
            r,
            digest,
            chunk: 0,
        })
    }

    /// Signature index in use
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Next chunk to be produced
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// Check whether all chunks have been produced
    pub fn is_complete(&self) -> bool {
        self.chunk >= SIG_CHUNKS
    }

    /// Write the next signature chunk to `buff`, returning the bytes written
    /// (zero once the session is exhausted)
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn next<DRV: Driver, S: Storage>(
        &mut self,
        drv: &DRV,
        store: &S,
        buff: &mut [u8],
    ) -> Result<usize, Error> {
        if self.is_complete() {
            return Ok(0);
        }

        let range = chunk_range(self.chunk);
        if buff.len() < range.len() {
            return Err(Error::InvalidLength);
        }

        let seeds = device_seeds(drv);
        let digits = wots::digits(&self.digest);

        for n in 0..SigPart::COUNT {
            let part = SigPart::at(n);
            let (offset, len) = part.span();

            // Skip segments outside this chunk
            let (start, end) = (offset.max(range.start), (offset + len).min(range.end));
            if start >= end {
                continue;
            }

            let value = self.render(part, &seeds, store, &digits);

            buff[start - range.start..end - range.start]
                .copy_from_slice(&value[start - offset..end - offset]);
        }

        #[cfg(feature = "log")]
        log::debug!(
            "signature chunk {}/{} ({} bytes)",
            self.chunk + 1,
            SIG_CHUNKS,
            range.len()
        );

        self.chunk += 1;

        debug_assert!(range.end <= SIG_SIZE);

        Ok(range.len())
    }

    fn render<S: Storage>(
        &self,
        part: SigPart,
        seeds: &KeySeeds,
        store: &S,
        digits: &[u8; WOTS_LEN],
    ) -> Hash {
        let mut v = [0u8; N];

        match part {
            SigPart::Index => v[..4].copy_from_slice(&(self.index as u32).to_be_bytes()),
            SigPart::Randomiser => v = self.r,
            SigPart::Wots(i) => v = wots::sign_element(seeds, self.index as u32, digits, i),
            SigPart::Auth(k) => {
                v = xmss::tree::auth_node(
                    &|i| store.leaf(i),
                    &seeds.pub_seed,
                    self.index as u32,
                    k as u32,
                )
            }
        }

        v
    }
}

impl Drop for SignSession {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.r.zeroize();
        self.digest.zeroize();
    }
}
