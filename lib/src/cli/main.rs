// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the Ledger XMSS NanoApp

use clap::Parser;
use ledger_lib::{Device, LedgerProvider, Transport};
use log::{debug, error, info, warn, LevelFilter};

use ledger_xmss::{
    apdu::tx::{Transaction, TxKind},
    DeviceHandle, Filter,
};
use ledger_xmss_core::helpers::fmt_quanta;

mod helpers;
use helpers::*;

/// Ledger command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Supported transports for ledger discovery
    #[clap(long, value_enum, default_value = "any")]
    target: Filter,

    /// Device index (where more than one device is available)
    #[clap(long, default_value = "0")]
    device_index: usize,

    /// Timeout for user interaction (seconds)
    #[clap(long, default_value = "30")]
    timeout_s: usize,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// List available devices
    List,

    /// Fetch application version
    Version,

    /// Fetch device mode and signature index
    State,

    /// Run (or resume) key generation
    Keygen,

    /// Fetch XMSS public key
    PublicKey,

    /// Sign a hex encoded transaction
    Sign {
        /// Serialised transaction
        tx: HexBytes,

        /// Skip local signature verification
        #[clap(long)]
        no_verify: bool,
    },

    /// Override the next signature index (DANGEROUS, permits key reuse)
    SetIndex {
        /// New signature index
        index: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default())?;

    // Connect to ledger device
    let mut p = LedgerProvider::init().await;

    debug!("Using transport: {:?}", args.target);

    // List available devices
    let devices = p.list(args.target.into()).await?;
    if devices.is_empty() {
        return Err(anyhow::anyhow!("No devices found"));
    }

    // Handle list command
    if args.cmd == Actions::List {
        info!("Devices:");
        for (i, d) in devices.iter().enumerate() {
            info!("  {}: {:?}", i, d);
        }

        return Ok(());
    }

    // Select device by index
    let n = devices.len();
    let info = match devices.into_iter().nth(args.device_index) {
        Some(v) => v,
        None => {
            return Err(anyhow::anyhow!(
                "Invalid device index: {} (max: {})",
                args.device_index,
                n - 1
            ))
        }
    };

    debug!("Using device {}: {:?}", args.device_index, info);

    // Connect to device
    let d = match p.connect(info).await {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to connect to device {}", args.device_index);
            return Err(e.into());
        }
    };

    let t = DeviceHandle::from(d).with_user_timeout(args.timeout_s);

    // Execute command
    execute(t, args.cmd).await?;

    Ok(())
}

/// Execute a command with the provided device
async fn execute<T: Device + Send>(mut t: DeviceHandle<T>, cmd: Actions) -> anyhow::Result<()> {
    debug!("Executing command: {:?}", cmd);

    match cmd {
        Actions::Version => {
            let v = t.version().await?;

            info!("app version: {}", v);
        }
        Actions::State => {
            let s = t.state().await?;

            info!("mode: {}", s.mode);
            info!("signature index: {}", s.index);
            info!("state: {} ({})", s.state, s.value);
        }
        Actions::Keygen => {
            info!("running key generation, this may take a while");

            let pk = t
                .keygen(|n| {
                    if n % 32 == 0 {
                        info!("keygen step {}", n);
                    }
                })
                .await?;

            info!("public key: {}", hex::encode(pk));
        }
        Actions::PublicKey => {
            let pk = t.public_key().await?;

            info!("public key: {}", hex::encode(pk));
        }
        Actions::Sign { tx, no_verify } => {
            let parsed = Transaction::parse(tx.as_ref())
                .map_err(|e| anyhow::anyhow!("Invalid transaction: {}", e))?;

            display_tx(&parsed);

            info!("confirm the transaction on the device");

            let sig = t.sign(tx.as_ref(), !no_verify).await?;

            info!("signature index: {}", sig.index());
            info!("signature: {}", sig);
        }
        Actions::SetIndex { index } => {
            warn!("overriding the signature index may permit key reuse and signature forgery");
            info!("confirm the index override on the device");

            t.set_index(index).await?;

            info!("signature index set to {}", index);
        }
        _ => unreachable!(),
    }

    Ok(())
}

/// Display a transaction summary prior to signing
fn display_tx(tx: &Transaction) {
    let mut buff = [0u8; 32];

    match tx.kind() {
        Some(k) => info!("transaction: {} ({} items)", k, tx.count()),
        None => info!("transaction: unknown type {}", tx.tag()),
    }

    if let Some(m) = tx.master() {
        let label = match tx.kind() {
            Some(TxKind::Transfer | TxKind::TokenTransfer) => "fee",
            _ => "amount",
        };
        info!(
            "  source: {} {}: {}",
            hex::encode(m.address),
            label,
            fmt_quanta(m.amount, &mut buff)
        );
    }

    for d in tx.destinations() {
        info!(
            "  to: {} amount: {}",
            hex::encode(d.address),
            fmt_quanta(d.amount, &mut buff)
        );
    }

    if let Transaction::Message { message, .. } = tx {
        match std::str::from_utf8(message) {
            Ok(s) => info!("  message: '{}'", s),
            Err(_) => info!("  message: {}", hex::encode(message)),
        }
    }
}
