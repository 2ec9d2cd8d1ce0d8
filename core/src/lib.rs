// Copyright (c) 2022-2023 The MobileCoin Foundation

//! XMSS hardware wallet core
//!
//! This provides a common [Engine][engine] supporting XMSS key generation and
//! transaction signing for execution on hardware wallets.
//!
//! Interactions with the [Engine][engine] are performed via [Event][engine::Event]s and [Output][engine::Output]s,
//! see [ledger_xmss_apdu] for APDU objects and wire encodings. Platforms without
//! an APDU layer of their own may use [`handle_apdu`][dispatch::handle_apdu] to
//! process raw command buffers.
//!
//! ## Operations
//!
//! Prior to interacting with a hardware wallet the client should issue an
//! [`AppInfoReq`][ledger_xmss_apdu::app_info::AppInfoReq] to fetch an
//! [`AppInfoResp`][ledger_xmss_apdu::app_info::AppInfoResp] containing the
//! application version and flags, then a [`StateReq`][ledger_xmss_apdu::state::StateReq]
//! to fetch the persisted device mode and signature index.
//!
//! ### Key generation
//!
//! Key generation computes one of the 256 one-time key leaves per
//! [`KeygenReq`][ledger_xmss_apdu::keygen::KeygenReq], with a final step
//! computing the Merkle root, so 257 requests move a blank device to
//! [`Mode::Ready`][ledger_xmss_apdu::state::Mode::Ready]. Progress is persisted
//! after every step, interrupted generation resumes where it stopped.
//!
//! Once ready the public key may be fetched via [`PublicKeyReq`][ledger_xmss_apdu::public_key::PublicKeyReq].
//!
//! ### Signing a transaction
//!
//! 1. Issue [`SignReq`][ledger_xmss_apdu::sign::SignReq] containing the serialised
//!    [`Transaction`][ledger_xmss_apdu::tx::Transaction]. The device validates and
//!    hashes the transaction then awaits user approval
//!    ([`SignState::SignPending`][ledger_xmss_apdu::state::SignState::SignPending]).
//! 2. Poll [`StateReq`][ledger_xmss_apdu::state::StateReq] until the state
//!    moves to `Signing` (approved) or `Denied`. On approval the signature index
//!    is committed before any signature data is released.
//! 3. Issue [`SIG_CHUNKS`][ledger_xmss_apdu::sign::SIG_CHUNKS] x
//!    [`SignNextReq`][ledger_xmss_apdu::sign::SignNextReq] and concatenate the
//!    returned chunks to form the signature.
//!
//! ### Overriding the signature index
//!
//! [`SetIndexReq`][ledger_xmss_apdu::set_index::SetIndexReq] stages a new
//! signature index for user approval. This is dangerous, reusing an index
//! permits signature forgery, and is intended only for recovery of devices
//! whose index is known to lag the network.
//!

#![cfg_attr(not(feature = "std"), no_std)]

pub use ledger_xmss_apdu::{self as apdu};

pub mod dispatch;

pub mod engine;

pub mod helpers;

pub mod xmss;
