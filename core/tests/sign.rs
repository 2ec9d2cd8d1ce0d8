use ledger_xmss_core::{
    apdu::{
        sign::{chunk_range, SIG_CHUNKS, SIG_SIZE},
        state::Mode,
        status::StatusCode,
    },
    engine::{Error, Event, Output, State, Storage},
    xmss::{self, LEAF_COUNT},
};

mod helpers;
use helpers::*;

/// Fetch all signature chunks, checking engine state along the way
fn fetch_signature<E>(mut next: E) -> anyhow::Result<Vec<u8>>
where
    E: FnMut() -> Result<Output, Error>,
{
    let mut sig = Vec::new();

    for c in 0..SIG_CHUNKS {
        let o = next()?;
        let d = o.chunk().expect("expected chunk output");

        assert_eq!(d.len(), chunk_range(c).len(), "chunk {c} length");
        sig.extend_from_slice(d);
    }

    Ok(sig)
}

#[test]
fn sign_transfer() -> anyhow::Result<()> {
    setup_logging();

    let mut e = ready_engine(5);
    let pk = e.public_key().unwrap();

    let raw = transfer(&[1_000, 2_000_000]);
    let tx = parse(&raw);
    let tx_hash = tx.canonical_hash().unwrap();

    // Submit transaction, pending approval
    let r = e.update(&Event::Sign(&raw))?;
    assert_eq!(r.state(), Some(State::SignPending));
    assert_eq!(e.pending_transaction(), Some(&tx));

    // Index is unchanged until approval
    assert_eq!(e.device_state().index, 5);
    assert_eq!(e.update(&Event::SignNext), Err(Error::ApprovalPending));

    e.approve()?;
    assert_eq!(e.state(), State::Signing(0));

    // Index commits before any signature data is released
    assert_eq!(e.device_state().index, 6);
    assert_eq!(e.session_index(), Some(5));

    let sig = fetch_signature(|| e.update(&Event::SignNext))?;
    assert_eq!(sig.len(), SIG_SIZE);
    assert_eq!(e.state(), State::SignComplete);

    // Session exhausted
    let o = e.update(&Event::SignNext)?;
    assert_eq!(o.chunk(), Some(&[][..]));

    // Signature uses leaf 5 and verifies
    assert_eq!(&sig[..4], &[0, 0, 0, 5]);
    assert!(xmss::verify(&pk, &tx_hash, &sig));

    Ok(())
}

#[test]
fn sign_increments_index() -> anyhow::Result<()> {
    let mut e = ready_engine(0);
    let pk = e.public_key().unwrap();

    for i in 0..3u16 {
        let raw = transfer(&[i as u64 + 1]);
        let h = parse(&raw).canonical_hash().unwrap();

        e.update(&Event::Sign(&raw))?;
        e.approve()?;

        let sig = fetch_signature(|| e.update(&Event::SignNext))?;
        assert_eq!(u32::from_be_bytes([sig[0], sig[1], sig[2], sig[3]]), i as u32);
        assert!(xmss::verify(&pk, &h, &sig));

        assert_eq!(e.device_state().index, i + 1);
    }

    Ok(())
}

#[test]
fn sign_exhausted() -> anyhow::Result<()> {
    let mut e = ready_engine(LEAF_COUNT as u16);

    let raw = transfer(&[1]);
    let r = e.update(&Event::Sign(&raw));

    assert_eq!(r, Err(Error::KeysExhausted));
    assert_eq!(StatusCode::from(Error::KeysExhausted), StatusCode::CommandNotAllowed);
    assert_eq!(e.device_state().index, LEAF_COUNT as u16);

    // The final leaf remains usable
    let mut e = ready_engine(LEAF_COUNT as u16 - 1);
    let pk = e.public_key().unwrap();

    let raw = transfer(&[1]);
    let h = parse(&raw).canonical_hash().unwrap();

    e.update(&Event::Sign(&raw))?;
    e.approve()?;

    let sig = fetch_signature(|| e.update(&Event::SignNext))?;
    assert!(xmss::verify(&pk, &h, &sig));
    assert!(e.device_state().index as usize == LEAF_COUNT);

    Ok(())
}

#[test]
fn sign_denied() -> anyhow::Result<()> {
    let mut e = ready_engine(9);

    e.update(&Event::Sign(&transfer(&[7])))?;

    e.deny();
    assert_eq!(e.state(), State::Denied);
    assert_eq!(e.pending_transaction(), None);
    assert_eq!(e.device_state().index, 9);
    assert_eq!(e.session_index(), None);

    // No session, empty chunks
    let o = e.update(&Event::SignNext)?;
    assert_eq!(o.chunk(), Some(&[][..]));

    // Nothing left to approve
    assert_eq!(e.approve(), Err(Error::UnexpectedEvent));
    assert_eq!(e.device_state().index, 9);

    Ok(())
}

#[test]
fn sign_abandoned_burns_index() -> anyhow::Result<()> {
    let mut e = ready_engine(3);

    e.update(&Event::Sign(&transfer(&[1])))?;
    e.approve()?;

    // Fetch a partial signature then start over
    e.update(&Event::SignNext)?;
    e.reset();

    assert_eq!(e.device_state().index, 4);

    e.update(&Event::Sign(&transfer(&[2])))?;
    e.approve()?;

    let sig = fetch_signature(|| e.update(&Event::SignNext))?;
    assert_eq!(&sig[..4], &[0, 0, 0, 4]);

    Ok(())
}

#[test]
fn sign_invalid_transaction() -> anyhow::Result<()> {
    let mut e = ready_engine(0);

    // Unknown types are size checked but can not be hashed
    assert_eq!(
        e.update(&Event::Sign(&[0x09, 0x01])),
        Err(Error::InvalidTransaction)
    );
    assert_eq!(e.state(), State::Init);

    // Truncated transfers are rejected without staging
    let mut raw = transfer(&[1]);
    raw.pop();
    assert_eq!(e.update(&Event::Sign(&raw)), Err(Error::InvalidTransaction));
    assert_eq!(e.pending_transaction(), None);

    Ok(())
}

#[test]
fn set_index() -> anyhow::Result<()> {
    setup_logging();

    let mut e = ready_engine(10);

    // Out of range
    assert_eq!(e.update(&Event::SetIndex(257)), Err(Error::InvalidIndex));
    assert_eq!(StatusCode::from(Error::InvalidIndex), StatusCode::DataInvalid);

    // Staged pending approval
    let r = e.update(&Event::SetIndex(2))?;
    assert_eq!(r.state(), Some(State::IndexPending(2)));
    assert_eq!(e.pending_index(), Some(2));
    assert_eq!(e.device_state().index, 10);

    // Other requests refused while pending
    let raw = transfer(&[1]);
    assert_eq!(e.update(&Event::Sign(&raw)), Err(Error::ApprovalPending));

    e.approve()?;
    assert_eq!(e.state(), State::Init);
    assert_eq!(e.device_state().index, 2);
    assert_eq!(e.device_state().mode, Mode::Ready);

    // Denied overrides are discarded
    e.update(&Event::SetIndex(200))?;
    e.deny();
    assert_eq!(e.device_state().index, 2);

    // Setting the leaf count marks the key as exhausted
    e.reset();
    e.update(&Event::SetIndex(LEAF_COUNT as u16))?;
    e.approve()?;
    assert!(e.device_state().is_exhausted());

    // Public key is retained
    assert_eq!(e.storage().state().public_key, READY.state().public_key);

    Ok(())
}
