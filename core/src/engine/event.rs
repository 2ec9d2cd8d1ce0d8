// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Decode;

use ledger_xmss_apdu::{prelude::*, ApduError, ApduStatic};

use super::Error;

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Event<'a> {
    None,

    /// Fetch application version
    GetVersion,

    /// Fetch device state
    GetState,

    /// Execute a single key generation step
    KeygenStep,

    /// Fetch XMSS public key
    GetPublicKey,

    /// Submit a serialised transaction for signing
    ///
    /// Validated by the engine once the device mode permits signing.
    Sign(&'a [u8]),

    /// Fetch the next signature chunk
    SignNext,

    /// Override the next signature index.
    ///
    /// Dangerous, moving the index backwards permits one-time key reuse.
    /// Only applied following user approval.
    SetIndex(u16),
}

/// Helper for decoding APDUs to events
fn decode_event<'a, T>(buff: &'a [u8]) -> Result<Event<'a>, Error>
where
    T: Decode<'a, Error = ApduError>,
    Event<'a>: From<T::Output>,
{
    T::decode(buff)
        .map(|(v, _n)| Event::from(v))
        .map_err(Error::from)
}

impl<'a> Event<'a> {
    /// Parse an incoming APDU to engine event
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(ins: u8, buff: &'a [u8]) -> Result<Self, Error> {
        match ins {
            AppInfoReq::INS => decode_event::<AppInfoReq>(buff),
            StateReq::INS => decode_event::<StateReq>(buff),
            KeygenReq::INS => decode_event::<KeygenReq>(buff),
            PublicKeyReq::INS => decode_event::<PublicKeyReq>(buff),
            SignReq::INS => {
                let (req, _n) = SignReq::decode(buff)?;
                Ok(Event::Sign(req.tx))
            }
            SignNextReq::INS => decode_event::<SignNextReq>(buff),
            SetIndexReq::INS => decode_event::<SetIndexReq>(buff),
            _ => Err(Error::UnknownInstruction),
        }
    }
}

impl<'a> From<AppInfoReq> for Event<'a> {
    fn from(_: AppInfoReq) -> Self {
        Event::GetVersion
    }
}

impl<'a> From<StateReq> for Event<'a> {
    fn from(_: StateReq) -> Self {
        Event::GetState
    }
}

impl<'a> From<KeygenReq> for Event<'a> {
    fn from(_: KeygenReq) -> Self {
        Event::KeygenStep
    }
}

impl<'a> From<PublicKeyReq> for Event<'a> {
    fn from(_: PublicKeyReq) -> Self {
        Event::GetPublicKey
    }
}

impl<'a> From<SignNextReq> for Event<'a> {
    fn from(_: SignNextReq) -> Self {
        Event::SignNext
    }
}

impl<'a> From<SetIndexReq> for Event<'a> {
    fn from(r: SetIndexReq) -> Self {
        Event::SetIndex(r.index)
    }
}
