// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Raw APDU dispatch
//!
//! [`handle_apdu`] accepts a complete command buffer (`CLA INS P1 P2 LC DATA`),
//! routes it to the [`Engine`] and writes the response data followed by a
//! big-endian status word. Every command produces a status, errors are mapped
//! via [`StatusCode::from`].

use ledger_xmss_apdu::{status::StatusCode, XMSS_APDU_CLA};

use crate::engine::{Driver, Engine, Error, Event, Storage};

/// APDU header length
pub const APDU_HEADER_LEN: usize = 5;

/// Dispatch result
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Reply {
    /// Response length, including the two byte status word
    pub len: usize,
    /// Response status
    pub status: StatusCode,
}

/// Handle a single command APDU, writing the response to `tx`
#[cfg_attr(feature = "noinline", inline(never))]
pub fn handle_apdu<DRV: Driver, S: Storage>(
    engine: &mut Engine<DRV, S>,
    rx: &[u8],
    tx: &mut [u8],
) -> Reply {
    // Reserve space for the status word
    let data_len = tx.len().saturating_sub(2);

    let (n, status) = match dispatch(engine, rx, &mut tx[..data_len]) {
        Ok(n) => (n, StatusCode::Ok),
        Err(e) => {
            #[cfg(feature = "log")]
            log::debug!("command failed: {e:?}");

            (0, StatusCode::from(e))
        }
    };

    if tx.len() < n + 2 {
        return Reply { len: 0, status };
    }

    tx[n..][..2].copy_from_slice(&status.to_bytes());

    Reply { len: n + 2, status }
}

fn dispatch<DRV: Driver, S: Storage>(
    engine: &mut Engine<DRV, S>,
    rx: &[u8],
    tx: &mut [u8],
) -> Result<usize, Error> {
    if rx.len() < APDU_HEADER_LEN {
        return Err(Error::InvalidLength);
    }

    let (cla, ins, lc) = (rx[0], rx[1], rx[4] as usize);
    if rx.len() != APDU_HEADER_LEN + lc {
        return Err(Error::InvalidLength);
    }

    if cla != XMSS_APDU_CLA {
        return Err(Error::UnknownClass);
    }

    #[cfg(feature = "log")]
    log::debug!("apdu ins: 0x{ins:02x} lc: {lc}");

    let evt = Event::parse(ins, &rx[APDU_HEADER_LEN..])?;
    let out = engine.update(&evt)?;

    out.encode(tx).map_err(|_| Error::EncodingFailed)
}

#[cfg(test)]
mod test {
    use zeroize::Zeroizing;

    use super::*;
    use crate::engine::{MemoryStorage, State};
    use ledger_xmss_apdu::{state::Mode, Instruction};

    struct ZeroDriver;

    impl Driver for ZeroDriver {
        fn derive_key(&self, _path: &[u32]) -> Zeroizing<[u8; 32]> {
            Zeroizing::new([0u8; 32])
        }
    }

    fn apdu(cla: u8, ins: Instruction, data: &[u8]) -> ([u8; 64], usize) {
        let mut b = [0u8; 64];
        b[0] = cla;
        b[1] = ins as u8;
        b[4] = data.len() as u8;
        b[5..][..data.len()].copy_from_slice(data);
        (b, 5 + data.len())
    }

    #[test]
    fn get_state() {
        let mut engine = Engine::new(ZeroDriver, MemoryStorage::new());
        let mut tx = [0u8; 256];

        let (rx, n) = apdu(XMSS_APDU_CLA, Instruction::GetState, &[]);
        let r = handle_apdu(&mut engine, &rx[..n], &mut tx);

        assert_eq!(r.status, StatusCode::Ok);
        assert_eq!(r.len, 7);
        assert_eq!(&tx[..7], &[0x00, 0x00, 0x00, 0x00, 0x00, 0x90, 0x00]);
    }

    #[test]
    fn bad_class() {
        let mut engine = Engine::new(ZeroDriver, MemoryStorage::new());
        let mut tx = [0u8; 256];

        let (rx, n) = apdu(0xe0, Instruction::KeygenStep, &[]);
        let r = handle_apdu(&mut engine, &rx[..n], &mut tx);

        assert_eq!(r.status, StatusCode::ClassNotSupported);
        assert_eq!(&tx[..r.len], &[0x6e, 0x00]);

        // Keygen did not run
        assert_eq!(engine.device_state().mode, Mode::NotInitialised);
        assert_eq!(engine.state(), State::Init);
    }

    #[test]
    fn bad_lengths() {
        let mut engine = Engine::new(ZeroDriver, MemoryStorage::new());
        let mut tx = [0u8; 256];

        // Short header
        let r = handle_apdu(&mut engine, &[XMSS_APDU_CLA, 0x01, 0x00], &mut tx);
        assert_eq!(r.status, StatusCode::WrongLength);

        // LC exceeds payload
        let r = handle_apdu(
            &mut engine,
            &[XMSS_APDU_CLA, 0x01, 0x00, 0x00, 0x04, 0xaa],
            &mut tx,
        );
        assert_eq!(r.status, StatusCode::WrongLength);

        // Set index with a single byte
        let (rx, n) = apdu(XMSS_APDU_CLA, Instruction::SetIndex, &[0x01]);
        let r = handle_apdu(&mut engine, &rx[..n], &mut tx);
        assert_eq!(r.status, StatusCode::WrongLength);
    }

    #[test]
    fn unknown_instruction() {
        let mut engine = Engine::new(ZeroDriver, MemoryStorage::new());
        let mut tx = [0u8; 256];

        let r = handle_apdu(&mut engine, &[XMSS_APDU_CLA, 0x30, 0, 0, 0], &mut tx);
        assert_eq!(r.status, StatusCode::InstructionNotSupported);
        assert_eq!(&tx[..r.len], &[0x6d, 0x00]);
    }

    #[test]
    fn not_ready() {
        let mut engine = Engine::new(ZeroDriver, MemoryStorage::new());
        let mut tx = [0u8; 256];

        for ins in [
            Instruction::GetPublicKey,
            Instruction::SignNext,
        ] {
            let (rx, n) = apdu(XMSS_APDU_CLA, ins, &[]);
            let r = handle_apdu(&mut engine, &rx[..n], &mut tx);
            assert_eq!(r.status, StatusCode::CommandNotAllowed, "{ins}");
        }

        let (rx, n) = apdu(XMSS_APDU_CLA, Instruction::SetIndex, &[0x01, 0x00]);
        let r = handle_apdu(&mut engine, &rx[..n], &mut tx);
        assert_eq!(r.status, StatusCode::CommandNotAllowed);
    }

    #[test]
    fn sign_checks_mode_first() {
        let mut engine = Engine::new(ZeroDriver, MemoryStorage::new());
        let mut tx = [0u8; 256];

        // Transfer with no destinations, malformed but not reached
        let (rx, n) = apdu(XMSS_APDU_CLA, Instruction::Sign, &[0x00, 0x00]);
        let r = handle_apdu(&mut engine, &rx[..n], &mut tx);
        assert_eq!(r.status, StatusCode::CommandNotAllowed);

        // Same during key generation
        let (keygen, k) = apdu(XMSS_APDU_CLA, Instruction::KeygenStep, &[]);
        handle_apdu(&mut engine, &keygen[..k], &mut tx);
        assert_eq!(engine.device_state().mode, Mode::KeygenRunning);

        let r = handle_apdu(&mut engine, &rx[..n], &mut tx);
        assert_eq!(r.status, StatusCode::CommandNotAllowed);
        assert_eq!(engine.state(), State::Init);
    }
}
