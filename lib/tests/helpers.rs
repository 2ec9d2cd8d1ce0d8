#![allow(unused)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use bip39::{Language, Mnemonic, Seed};
use lazy_static::lazy_static;
use log::{debug, trace};
use zeroize::Zeroizing;

use ledger_xmss_core::{
    apdu::state::Mode,
    dispatch::handle_apdu,
    engine::{Driver, Engine, Event, MemoryStorage, State, Storage},
};

pub const MNEMONIC: &str = "duck deal pretty pen thunder economy wide common goose fit engine main aisle curtain choose cube claim snake enroll detect brief history float unit";

/// Driver implementation for test use
pub struct TestDriver {
    /// BIP39 Mnemonic derived seed
    pub seed: [u8; 64],
}

impl Default for TestDriver {
    fn default() -> Self {
        let mnemonic = Mnemonic::from_phrase(MNEMONIC, Language::English).unwrap();
        let seed = Seed::new(&mnemonic, "");

        let mut b = [0u8; 64];
        b.copy_from_slice(seed.as_bytes());
        Self { seed: b }
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

/// In-process device, exchanging raw APDUs with an [`Engine`]
#[derive(Clone)]
pub struct TestEngine {
    pub engine: Arc<Mutex<Engine<TestDriver, MemoryStorage>>>,
}

impl TestEngine {
    pub fn new(store: MemoryStorage) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Engine::new(TestDriver::default(), store))),
        }
    }

    pub fn state(&self) -> State {
        self.engine.lock().unwrap().state()
    }

    pub fn index(&self) -> u16 {
        self.engine.lock().unwrap().device_state().index
    }
}

#[async_trait]
impl ledger_lib::Exchange for TestEngine {
    async fn exchange(
        &mut self,
        command: &[u8],
        _timeout: Duration,
    ) -> Result<Vec<u8>, ledger_lib::Error> {
        trace!("cmd: {:02x?}", command);

        let mut resp = [0u8; 256];

        let r = {
            let mut e = self.engine.lock().unwrap();
            handle_apdu(&mut *e, command, &mut resp)
        };

        debug!("status: {:?} ({} bytes)", r.status, r.len);

        Ok(resp[..r.len].to_vec())
    }
}

/// Wait for the engine to reach a pending state then approve (or deny)
pub async fn user_response(e: TestEngine, approve: bool) {
    loop {
        {
            let mut engine = e.engine.lock().unwrap();

            if engine.state().is_pending() {
                debug!("UI: {}", if approve { "approve" } else { "deny" });

                match approve {
                    true => engine.approve().unwrap(),
                    false => engine.deny(),
                }
                return;
            }
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn setup_logging() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

/// Build a serialised transfer
pub fn transfer(amounts: &[u64]) -> Vec<u8> {
    let mut tx = vec![0x00, amounts.len() as u8];

    tx.extend_from_slice(&[0x11; 39]);
    tx.extend_from_slice(&100u64.to_be_bytes());

    for a in amounts {
        tx.extend_from_slice(&rand::random::<[u8; 32]>());
        tx.extend_from_slice(&[0x22; 7]);
        tx.extend_from_slice(&a.to_be_bytes());
    }

    tx
}
