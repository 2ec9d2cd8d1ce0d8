#![allow(unused)]

use bip39::{Language, Mnemonic, Seed};
use lazy_static::lazy_static;
use zeroize::Zeroizing;

use ledger_xmss_core::{
    apdu::{
        state::Mode,
        tx::{Transaction, ADDRESS_LEN},
    },
    engine::{Driver, Engine, Event, MemoryStorage, Storage},
};

pub const MNEMONIC: &str = "duck deal pretty pen thunder economy wide common goose fit engine main aisle curtain choose cube claim snake enroll detect brief history float unit";

/// Driver implementation for test use
pub struct TestDriver {
    /// BIP39 Mnemonic derived seed
    pub seed: [u8; 64],
}

impl TestDriver {
    pub fn new(seed: Seed) -> Self {
        let mut b = [0u8; 64];
        b.copy_from_slice(seed.as_bytes());
        Self { seed: b }
    }
}

impl Default for TestDriver {
    fn default() -> Self {
        let mnemonic = Mnemonic::from_phrase(MNEMONIC, Language::English).unwrap();
        Self::new(Seed::new(&mnemonic, ""))
    }
}

impl Driver for TestDriver {
    fn derive_key(&self, path: &[u32]) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(slip10_ed25519::derive_ed25519_private_key(
            &self.seed, path,
        ))
    }
}

lazy_static! {
    /// Storage with key generation complete for [`TestDriver::default`]
    pub static ref READY: MemoryStorage = {
        let mut e = Engine::new(TestDriver::default(), MemoryStorage::new());

        while e.device_state().mode != Mode::Ready {
            e.update(&Event::KeygenStep).unwrap();
        }

        e.storage().clone()
    };
}

/// Create an engine with a ready key pair at the provided signature index
pub fn ready_engine(index: u16) -> Engine<TestDriver, MemoryStorage> {
    let mut s = READY.clone();

    let mut state = s.state();
    state.index = index;
    s.set_state(&state);

    Engine::new(TestDriver::default(), s)
}

pub fn setup_logging() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

/// Build a serialised transfer with random addresses
pub fn transfer(amounts: &[u64]) -> std::vec::Vec<u8> {
    let mut tx = vec![0x00, amounts.len() as u8];

    // Master address and fee
    tx.extend_from_slice(&rand::random::<[u8; 32]>());
    tx.extend_from_slice(&[0x01; ADDRESS_LEN - 32]);
    tx.extend_from_slice(&100u64.to_be_bytes());

    for a in amounts {
        tx.extend_from_slice(&rand::random::<[u8; 32]>());
        tx.extend_from_slice(&[0x02; ADDRESS_LEN - 32]);
        tx.extend_from_slice(&a.to_be_bytes());
    }

    tx
}

/// Parse a serialised transaction
pub fn parse(tx: &[u8]) -> Transaction {
    Transaction::parse(tx).unwrap()
}
