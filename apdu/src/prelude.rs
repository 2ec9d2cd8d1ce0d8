//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    app_info::{AppFlags, AppInfoReq, AppInfoResp},
    keygen::KeygenReq,
    public_key::{PublicKeyReq, PublicKeyResp},
    set_index::SetIndexReq,
    sign::{SignChunk, SignNextReq, SignReq},
    state::{Mode, SignState, StateReq, StateResp},
    status::StatusCode,
    tx::{Transaction, TxError, TxKind},
};
