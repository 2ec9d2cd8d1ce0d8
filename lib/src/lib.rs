// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger XMSS API Library (and CLI)
//!
//! Provides a [DeviceHandle] for driving XMSS key generation and transaction
//! signing on devices reachable via [ledger_lib] transports.

/// Re-export `ledger-xmss-apdu` for consumers
pub use ledger_xmss_apdu::{self as apdu};

pub use ledger_lib::{Device, Exchange};

mod handle;
pub use handle::DeviceHandle;

mod error;
pub use error::Error;

mod signature;
pub use signature::Signature;

/// Device discovery filter
#[derive(Copy, Clone, Debug, PartialEq, clap::ValueEnum, strum::Display)]
#[non_exhaustive]
pub enum Filter {
    /// List all devices available using supported transports
    Any,
    /// List only HID devices
    Hid,
    /// List only TCP (speculos) devices
    Tcp,
    /// List only BLE devices
    Ble,
}

impl From<Filter> for ledger_lib::Filters {
    fn from(f: Filter) -> Self {
        match f {
            Filter::Any => ledger_lib::Filters::Any,
            Filter::Hid => ledger_lib::Filters::Hid,
            Filter::Tcp => ledger_lib::Filters::Tcp,
            Filter::Ble => ledger_lib::Filters::Ble,
        }
    }
}
