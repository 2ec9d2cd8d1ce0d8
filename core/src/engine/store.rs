// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Persistent device state
//!
//! The [`DeviceState`] record is only ever replaced as a whole, platforms
//! implement [`Storage::set_state`] as a single atomic write so a power loss
//! leaves either the prior or the new record.

use encdec::{DecodeOwned, Encode};
use ledger_proto::ApduError;

use ledger_xmss_apdu::state::Mode;

use crate::xmss::{Hash, LEAF_COUNT, PUBLIC_KEY_LEN};

/// Persisted device state
///
/// ## Encoding:
/// ```text
/// +----------+-----------+-------------------------+
/// | MODE (1) | INDEX (2) |    PUBLIC_KEY (64)      |
/// +----------+-----------+-------------------------+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct DeviceState {
    pub mode: Mode,
    /// Next leaf (while generating) or next signature index (once ready)
    pub index: u16,
    /// Root and public seed, valid in [`Mode::Ready`]
    pub public_key: [u8; PUBLIC_KEY_LEN],
}

impl DeviceState {
    /// Encoded record length
    pub const LEN: usize = 1 + 2 + PUBLIC_KEY_LEN;

    /// Blank state, prior to key generation
    pub const fn new() -> Self {
        Self {
            mode: Mode::NotInitialised,
            index: 0,
            public_key: [0u8; PUBLIC_KEY_LEN],
        }
    }

    /// Key generation in progress at leaf `index`
    pub const fn keygen(index: u16) -> Self {
        Self {
            mode: Mode::KeygenRunning,
            index,
            public_key: [0u8; PUBLIC_KEY_LEN],
        }
    }

    /// Key pair ready with signature index `index`
    pub const fn ready(index: u16, public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self {
            mode: Mode::Ready,
            index,
            public_key,
        }
    }

    /// Check whether signing leaves remain
    pub fn is_exhausted(&self) -> bool {
        self.index as usize >= LEAF_COUNT
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl Encode for DeviceState {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(Self::LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < Self::LEN {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.mode as u8;
        buff[1..3].copy_from_slice(&self.index.to_le_bytes());
        buff[3..Self::LEN].copy_from_slice(&self.public_key);

        Ok(Self::LEN)
    }
}

/// Decoding never fails on content, unrecognised modes read as
/// [`Mode::NotInitialised`] so blank or corrupt storage restarts key generation.
impl DecodeOwned for DeviceState {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.len() < Self::LEN {
            return Err(ApduError::InvalidLength);
        }

        let mode = Mode::try_from(buff[0]).unwrap_or(Mode::NotInitialised);
        let index = u16::from_le_bytes([buff[1], buff[2]]);

        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(&buff[3..Self::LEN]);

        Ok((
            Self {
                mode,
                index,
                public_key,
            },
            Self::LEN,
        ))
    }
}

/// [`Storage`] provides persistent memory for [`Engine`][super::Engine] instances
pub trait Storage {
    /// Read the current device state
    fn state(&self) -> DeviceState;

    /// Atomically replace the device state
    fn set_state(&mut self, state: &DeviceState);

    /// Read a stored leaf
    fn leaf(&self, index: u16) -> Hash;

    /// Write a leaf (during key generation)
    fn set_leaf(&mut self, index: u16, leaf: &Hash);
}

impl<T: Storage> Storage for &mut T {
    fn state(&self) -> DeviceState {
        T::state(self)
    }

    fn set_state(&mut self, state: &DeviceState) {
        T::set_state(self, state)
    }

    fn leaf(&self, index: u16) -> Hash {
        T::leaf(self, index)
    }

    fn set_leaf(&mut self, index: u16, leaf: &Hash) {
        T::set_leaf(self, index, leaf)
    }
}

/// RAM backed [`Storage`], holding the encoded state record and leaf table
#[derive(Clone)]
pub struct MemoryStorage {
    record: [u8; DeviceState::LEN],
    leaves: [Hash; LEAF_COUNT],
}

impl MemoryStorage {
    /// Create blank storage (zeroed, as erased flash)
    pub const fn new() -> Self {
        Self {
            record: [0u8; DeviceState::LEN],
            leaves: [[0u8; 32]; LEAF_COUNT],
        }
    }

    /// Raw persisted record
    pub fn record(&self) -> &[u8] {
        &self.record
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn state(&self) -> DeviceState {
        match DeviceState::decode_owned(&self.record) {
            Ok((s, _)) => s,
            Err(_) => DeviceState::new(),
        }
    }

    fn set_state(&mut self, state: &DeviceState) {
        let mut b = [0u8; DeviceState::LEN];
        if state.encode(&mut b).is_ok() {
            self.record = b;
        }
    }

    fn leaf(&self, index: u16) -> Hash {
        self.leaves
            .get(index as usize)
            .copied()
            .unwrap_or([0u8; 32])
    }

    fn set_leaf(&mut self, index: u16, leaf: &Hash) {
        if let Some(l) = self.leaves.get_mut(index as usize) {
            *l = *leaf;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blank_storage_not_initialised() {
        let s = MemoryStorage::new();
        assert_eq!(s.state(), DeviceState::new());
        assert_eq!(s.state().mode, Mode::NotInitialised);
    }

    #[test]
    fn record_layout() {
        let mut pk = [0u8; PUBLIC_KEY_LEN];
        pk[0] = 0xaa;
        pk[63] = 0xbb;

        let mut s = MemoryStorage::new();
        s.set_state(&DeviceState::ready(0x0102, pk));

        let r = s.record();
        assert_eq!(r.len(), 67);
        assert_eq!(&r[..3], &[0x02, 0x02, 0x01]);
        assert_eq!(r[3], 0xaa);
        assert_eq!(r[66], 0xbb);

        assert_eq!(s.state(), DeviceState::ready(0x0102, pk));
    }

    #[test]
    fn corrupt_mode_resets() {
        let mut b = [0u8; DeviceState::LEN];
        b[0] = 0x7f;
        b[1] = 0x05;

        let (s, n) = DeviceState::decode_owned(&b).unwrap();
        assert_eq!(n, DeviceState::LEN);
        assert_eq!(s.mode, Mode::NotInitialised);
    }
}
