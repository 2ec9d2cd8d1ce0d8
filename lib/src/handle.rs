// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the device
//! and is generic over [ledger_lib::Device]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use ledger_lib::Device;
use ledger_proto::{ApduBase, ApduReq};
use log::{debug, info, warn};
use tokio::sync::Mutex;

use ledger_xmss_apdu::{
    keygen::{KeygenReq, KEYGEN_STEPS},
    prelude::*,
    public_key::PUBLIC_KEY_LEN,
    sign::{chunk_range, SIG_CHUNKS, SIG_SIZE},
};

use ledger_xmss_core::xmss::LEAF_COUNT;

use crate::{Error, Signature};

/// Interval between device state polls while awaiting the user
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// XMSS handle for a connected ledger [Device].
///
/// This is generic over [Device] types to support different
/// underlying transports / providers
#[derive(Clone)]
pub struct DeviceHandle<T: Device> {
    /// Device handle for communication
    t: Arc<Mutex<T>>,
    /// Timeout for user acknowledgements
    user_timeout_s: usize,
    /// Timeout for APDU requests
    request_timeout_s: usize,
}

/// Create a [DeviceHandle] wrapper from a type implementing [Device]
impl<T: Device> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            user_timeout_s: 30,
            request_timeout_s: 2,
        }
    }
}

impl<T: Device + Send> DeviceHandle<T> {
    /// Set timeout for user interaction
    pub fn with_user_timeout(mut self, seconds: usize) -> Self {
        self.user_timeout_s = seconds;
        self
    }

    /// Set timeout for APDU requests
    pub fn with_request_timeout(mut self, seconds: usize) -> Self {
        self.request_timeout_s = seconds;
        self
    }

    /// Helper to fetch user interaction timeout
    fn user_timeout(&self) -> Duration {
        Duration::from_secs(self.user_timeout_s as u64)
    }

    /// Helper to fetch APDU request timeout
    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s as u64)
    }

    /// Fetch application version and flags
    pub async fn version(&mut self) -> Result<AppInfoResp, Error> {
        let mut buff = [0u8; 256];

        debug!("Requesting app version");

        let resp = self
            .request::<AppInfoResp>(AppInfoReq {}, &mut buff, self.request_timeout())
            .await?;

        Ok(resp)
    }

    /// Fetch device mode, signature index and dialogue state
    pub async fn state(&mut self) -> Result<StateResp, Error> {
        let mut buff = [0u8; 256];

        let resp = self
            .request::<StateResp>(StateReq {}, &mut buff, self.request_timeout())
            .await?;

        Ok(resp)
    }

    /// Run key generation to completion, calling `progress` with the
    /// completed step count after each step.
    ///
    /// Generation resumes from the persisted progress, so this may be
    /// re-run following interruption.
    pub async fn keygen(
        &mut self,
        mut progress: impl FnMut(usize) + Send,
    ) -> Result<[u8; PUBLIC_KEY_LEN], Error> {
        let mut buff = [0u8; 256];

        let mut s = self.state().await?;

        // Bounded by the step count, with allowance for the first step
        for _ in 0..=KEYGEN_STEPS {
            if s.mode == Mode::Ready {
                break;
            }

            s = self
                .request::<StateResp>(KeygenReq {}, &mut buff, self.request_timeout())
                .await?;

            let n = match s.mode {
                Mode::Ready => KEYGEN_STEPS,
                _ => s.index as usize,
            };
            progress(n);
        }

        if s.mode != Mode::Ready {
            return Err(Error::UnexpectedState(s.mode, s.state));
        }

        info!("Key generation complete");

        self.public_key().await
    }

    /// Fetch the XMSS public key (root followed by public seed)
    pub async fn public_key(&mut self) -> Result<[u8; PUBLIC_KEY_LEN], Error> {
        let mut buff = [0u8; 256];

        debug!("Requesting public key");

        let resp = self
            .request::<PublicKeyResp>(PublicKeyReq {}, &mut buff, self.request_timeout())
            .await?;

        Ok(resp.public_key)
    }

    /// Sign a serialised transaction, awaiting user approval.
    ///
    /// When `verify` is set the assembled signature is checked against
    /// the device public key prior to returning.
    pub async fn sign(&mut self, tx: &[u8], verify: bool) -> Result<Signature, Error> {
        let mut buff = [0u8; 256];

        // Validate and hash locally, the device computes the same hash
        let t = Transaction::parse(tx)?;
        let tx_hash = t.canonical_hash()?;

        debug!("Signing {:?} transaction (hash: {})", t.kind(), hex::encode(tx_hash));

        // Check the device can sign
        let s = self.state().await?;
        if s.mode != Mode::Ready {
            return Err(Error::UnexpectedState(s.mode, s.state));
        }
        if s.index as usize >= LEAF_COUNT {
            return Err(Error::KeysExhausted);
        }

        let public_key = match verify {
            true => Some(self.public_key().await?),
            false => None,
        };

        // Submit transaction
        let resp = self
            .request::<StateResp>(SignReq::new(tx), &mut buff, self.request_timeout())
            .await?;
        if resp.state != SignState::SignPending {
            return Err(Error::UnexpectedState(resp.mode, resp.state));
        }

        // Await user approval
        self.await_approval(SignState::Signing).await?;

        // Fetch signature chunks
        let mut sig = Vec::with_capacity(SIG_SIZE);
        for c in 0..SIG_CHUNKS {
            let chunk = self
                .request::<SignChunk>(SignNextReq {}, &mut buff, self.request_timeout())
                .await?;

            if chunk.data.len() != chunk_range(c).len() {
                warn!(
                    "Unexpected chunk {} length: {} bytes",
                    c,
                    chunk.data.len()
                );
                return Err(Error::UnexpectedResponse);
            }

            sig.extend_from_slice(chunk.data);
        }

        let sig = Signature::try_from(&sig[..])?;

        info!("Signed with index {}", sig.index());

        if let Some(pk) = public_key {
            if !sig.verify(&pk, &tx_hash) {
                return Err(Error::InvalidSignature);
            }
        }

        Ok(sig)
    }

    /// Override the next signature index, awaiting user approval.
    ///
    /// **Dangerous**: reusing a signature index allows signature forgery,
    /// this is only intended for recovering devices with a stale index.
    pub async fn set_index(&mut self, index: u16) -> Result<(), Error> {
        let mut buff = [0u8; 256];

        warn!("Requesting signature index override: {}", index);

        let resp = self
            .request::<StateResp>(SetIndexReq::new(index), &mut buff, self.request_timeout())
            .await?;
        if resp.state != SignState::IndexPending {
            return Err(Error::UnexpectedState(resp.mode, resp.state));
        }

        let s = self.await_approval(SignState::Idle).await?;
        if s.index != index {
            return Err(Error::UnexpectedState(s.mode, s.state));
        }

        Ok(())
    }

    /// Poll device state until the pending request is approved (moving to
    /// `approved`) or denied.
    async fn await_approval(&mut self, approved: SignState) -> Result<StateResp, Error> {
        let user_timeout = self.user_timeout();

        let poll = async {
            loop {
                let s = self.state().await?;

                match s.state {
                    v if v == approved => return Ok(s),
                    SignState::SignPending | SignState::IndexPending => {
                        tokio::time::sleep(POLL_INTERVAL).await;
                    }
                    SignState::Denied => return Err(Error::UserDenied),
                    _ => return Err(Error::UnexpectedState(s.mode, s.state)),
                }
            }
        };

        debug!("Waiting for user approval");

        match tokio::time::timeout(user_timeout, poll).await {
            Ok(r) => r,
            Err(_) => Err(Error::UserTimeout),
        }
    }
}

/// Re-export [Device] trait for XMSS [DeviceHandle]
#[async_trait]
impl<T: Device + Send> Device for DeviceHandle<T> {
    async fn request<'a, 'b, RESP: ApduBase<'b>>(
        &mut self,
        request: impl ApduReq<'a> + Send,
        buff: &'b mut [u8],
        timeout: Duration,
    ) -> Result<RESP, ledger_lib::Error> {
        self.t.lock().await.request(request, buff, timeout).await
    }
}
