// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] provides functionality required by XMSS hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding details.
//!
//! Persistent state (mode, signature index, public key and leaf table) lives
//! behind the [Storage] trait, dialogue state (pending requests and signing
//! sessions) is held by the engine and lost on reset.

use strum::{Display, EnumIter, EnumString, EnumVariantNames};
use zeroize::Zeroizing;

use ledger_xmss_apdu::{
    app_info::AppFlags,
    sign::SIG_CHUNK_SIZE,
    state::{Mode, SignState},
    tx::Transaction,
};

use crate::xmss::{LEAF_COUNT, PUBLIC_KEY_LEN};

mod event;
pub use event::Event;

mod output;
pub use output::Output;

mod error;
pub use error::Error;

mod store;
pub use store::{DeviceState, MemoryStorage, Storage};

pub mod keygen;
pub use keygen::Progress;

mod session;
pub use session::SignSession;

/// Hardened derivation flag
const H: u32 = 0x8000_0000;

/// Device key derivation path (`m/44'/238'/0'/0'/0'`)
pub const XMSS_PATH: [u32; 5] = [44 | H, 238 | H, H, H, H];

/// Application version, reported via [`Event::GetVersion`]
pub const VERSION: (u8, u8, u8) = (
    parse_u8(env!("CARGO_PKG_VERSION_MAJOR")),
    parse_u8(env!("CARGO_PKG_VERSION_MINOR")),
    parse_u8(env!("CARGO_PKG_VERSION_PATCH")),
);

const fn parse_u8(s: &str) -> u8 {
    let b = s.as_bytes();
    let mut v = 0u8;
    let mut i = 0;
    while i < b.len() {
        v = v * 10 + (b[i] - b'0');
        i += 1;
    }
    v
}

/// Engine internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Idle state, no request running
    Init,
    /// Transaction pending user approval
    SignPending,
    /// Signature streaming, with the next chunk
    Signing(u8),
    /// All signature chunks delivered
    SignComplete,
    /// Signature index override pending user approval
    IndexPending(u16),
    /// Request denied by the user
    Denied,
}

impl State {
    /// Map to the reported dialogue state and associated value
    pub fn sign_state(&self) -> (SignState, u8) {
        match self {
            State::Init => (SignState::Idle, 0),
            State::SignPending => (SignState::SignPending, 0),
            State::Signing(n) => (SignState::Signing, *n),
            State::SignComplete => (SignState::SignComplete, 0),
            State::IndexPending(_) => (SignState::IndexPending, 0),
            State::Denied => (SignState::Denied, 0),
        }
    }

    /// Check whether the state requires user approval
    pub fn is_pending(&self) -> bool {
        matches!(self, State::SignPending | State::IndexPending(_))
    }
}

/// [`Driver`] trait provides platform support for [`Engine`] instances
pub trait Driver {
    /// Derive a 32 byte device secret for the provided (hardened) path
    fn derive_key(&self, path: &[u32]) -> Zeroizing<[u8; 32]>;
}

impl<T: Driver> Driver for &mut T {
    fn derive_key(&self, path: &[u32]) -> Zeroizing<[u8; 32]> {
        T::derive_key(self, path)
    }
}

/// [Engine] provides hardware-independent support for XMSS wallet operations
pub struct Engine<DRV: Driver, S: Storage> {
    state: State,

    /// Transaction staged for approval
    pending: Option<Transaction>,
    /// Canonical hash of the staged transaction
    tx_hash: [u8; 32],

    session: Option<SignSession>,

    flags: AppFlags,

    drv: DRV,
    store: S,
}

impl<DRV: Driver, S: Storage> Engine<DRV, S> {
    /// Create a new engine instance with the provided driver and storage
    pub fn new(drv: DRV, store: S) -> Self {
        Self {
            state: State::Init,
            pending: None,
            tx_hash: [0u8; 32],
            session: None,
            flags: AppFlags::empty(),
            drv,
            store,
        }
    }

    /// Set application flags reported in version responses
    pub fn with_flags(mut self, flags: AppFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Handle incoming events
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        let device = self.store.state();

        match (self.state, evt) {
            // Empty event, do nothing
            (_, Event::None) => (),

            (_, Event::GetVersion) => {
                let (major, minor, patch) = VERSION;
                return Ok(Output::Version {
                    flags: self.flags,
                    major,
                    minor,
                    patch,
                });
            }

            (_, Event::GetState) => (),

            // Key generation, one leaf per step
            (_, Event::KeygenStep) => {
                if keygen::step(&self.drv, &mut self.store) == Progress::AlreadyInitialised {
                    return Err(Error::AlreadyInitialised);
                }
            }

            (_, Event::GetPublicKey) => {
                if device.mode != Mode::Ready {
                    return Err(Error::InvalidMode);
                }
                return Ok(Output::PublicKey(device.public_key));
            }

            // Refuse to replace a request the user is reviewing
            (s, Event::Sign(_) | Event::SetIndex(_)) if s.is_pending() => {
                return Err(Error::ApprovalPending);
            }

            // Stage transaction for approval
            (_, Event::Sign(raw)) => {
                if device.mode != Mode::Ready {
                    return Err(Error::InvalidMode);
                }
                if device.is_exhausted() {
                    return Err(Error::KeysExhausted);
                }

                let tx = Transaction::parse(raw)?;

                self.tx_hash = tx.canonical_hash()?;

                #[cfg(feature = "log")]
                log::info!(
                    "transaction {:?} pending approval (index {})",
                    tx.kind(),
                    device.index
                );

                self.pending = Some(tx);
                self.session = None;
                self.state = State::SignPending;
            }

            (s, Event::SignNext) if s.is_pending() => return Err(Error::ApprovalPending),

            (_, Event::SignNext) => {
                if device.mode != Mode::Ready {
                    return Err(Error::InvalidMode);
                }
                return self.sign_next();
            }

            // Stage signature index override, always requires approval
            (_, Event::SetIndex(index)) => {
                if device.mode != Mode::Ready {
                    return Err(Error::InvalidMode);
                }
                if *index as usize > LEAF_COUNT {
                    return Err(Error::InvalidIndex);
                }

                self.pending = None;
                self.session = None;
                self.state = State::IndexPending(*index);
            }
        }

        // Default to returning updated state
        Ok(self.state_output())
    }

    /// Produce the next signature chunk, empty where no session is active
    fn sign_next(&mut self) -> Result<Output, Error> {
        let mut data = [0u8; SIG_CHUNK_SIZE];

        let session = match self.session.as_mut() {
            Some(s) => s,
            None => return Ok(Output::Chunk { data, len: 0 }),
        };

        let len = session.next(&self.drv, &self.store, &mut data)?;

        self.state = match session.is_complete() {
            true => State::SignComplete,
            false => State::Signing(session.chunk() as u8),
        };

        Ok(Output::Chunk { data, len })
    }

    fn state_output(&self) -> Output {
        let device = self.store.state();
        Output::State {
            mode: device.mode,
            index: device.index,
            state: self.state,
        }
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Signature index of the active signing session
    pub fn session_index(&self) -> Option<u16> {
        self.session.as_ref().map(|s| s.index())
    }

    /// Fetch persisted device state
    pub fn device_state(&self) -> DeviceState {
        self.store.state()
    }

    /// Fetch the transaction pending approval
    pub fn pending_transaction(&self) -> Option<&Transaction> {
        match self.state {
            State::SignPending => self.pending.as_ref(),
            _ => None,
        }
    }

    /// Fetch the signature index override pending approval
    pub fn pending_index(&self) -> Option<u16> {
        match self.state {
            State::IndexPending(i) => Some(i),
            _ => None,
        }
    }

    /// Access underlying storage
    pub fn storage(&self) -> &S {
        &self.store
    }

    /// Approve a pending request.
    ///
    /// For transactions this commits the signature index and moves to
    /// [`State::Signing`], for index overrides the new index is written.
    pub fn approve(&mut self) -> Result<(), Error> {
        match self.state {
            State::SignPending => {
                let r = SignSession::init(&self.drv, &mut self.store, &self.tx_hash);

                self.pending = None;

                match r {
                    Ok(s) => {
                        self.session = Some(s);
                        self.state = State::Signing(0);
                        Ok(())
                    }
                    Err(e) => {
                        self.state = State::Init;
                        Err(e)
                    }
                }
            }
            State::IndexPending(index) => {
                let device = self.store.state();
                if device.mode != Mode::Ready {
                    self.state = State::Init;
                    return Err(Error::InvalidMode);
                }

                #[cfg(feature = "log")]
                log::warn!(
                    "signature index override {} -> {}, reusing an index compromises the key",
                    device.index,
                    index
                );

                self.store
                    .set_state(&DeviceState::ready(index, device.public_key));
                self.state = State::Init;

                Ok(())
            }
            _ => Err(Error::UnexpectedEvent),
        }
    }

    /// Deny a pending request
    pub fn deny(&mut self) {
        self.pending = None;
        self.session = None;
        self.state = State::Denied;
    }

    /// Reset engine state
    pub fn reset(&mut self) {
        self.pending = None;
        self.session = None;
        self.tx_hash = [0u8; 32];
        self.state = State::Init;
    }

    /// Fetch the public key where available
    pub fn public_key(&self) -> Option<[u8; PUBLIC_KEY_LEN]> {
        let device = self.store.state();
        match device.mode {
            Mode::Ready => Some(device.public_key),
            _ => None,
        }
    }
}
