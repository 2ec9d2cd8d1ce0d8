// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::str::from_utf8;

use emstr::{helpers::Fractional, EncodeStr};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};
use zeroize::Zeroize;

use crate::{
    engine::{Driver, XMSS_PATH},
    xmss::{KeySeeds, SEED_LEN},
};

/// Quanta per token (9 decimal places)
pub const SCALAR_QUANTA: i64 = 1_000_000_000;

/// Derive XMSS key seeds from the device secret.
///
/// The 32 byte device key at [`XMSS_PATH`] is stretched to the 48 byte
/// XMSS seed, which is in turn expanded into [`KeySeeds`].
#[cfg_attr(feature = "noinline", inline(never))]
pub fn device_seeds<DRV: Driver>(drv: &DRV) -> KeySeeds {
    let key = drv.derive_key(&XMSS_PATH);

    let mut h = Shake256::default();
    h.update(key.as_ref());

    let mut seed = [0u8; SEED_LEN];
    h.finalize_xof().read(&mut seed);

    let seeds = KeySeeds::from_seed(&seed);

    // Clear intermediate seed following use
    seed.zeroize();

    seeds
}

/// Helper to format quanta amounts for display
pub fn fmt_quanta(amount: u64, buff: &mut [u8]) -> &str {
    // Circulating supply is well within i64 range
    let value = match i64::try_from(amount) {
        Ok(v) => v,
        Err(_) => return "OVERFLOW",
    };

    let mut n = match emstr::write!(&mut buff[..], Fractional::<i64>::new(value, SCALAR_QUANTA))
    {
        Ok(v) => v,
        Err(_) => return "ENCODE_ERR",
    };

    match emstr::write!(&mut buff[n..], " QRL") {
        Ok(v) => n += v,
        Err(_) => return "ENCODE_ERR",
    }

    match from_utf8(&buff[..n]) {
        Ok(v) => v,
        Err(_) => "INVALID_UTF8",
    }
}

#[cfg(test)]
mod test {
    use super::{fmt_quanta, SCALAR_QUANTA};

    #[test]
    fn fmt_qrl() {
        let q = SCALAR_QUANTA as u64;

        let tests = &[
            (1, "0.000000001 QRL"),
            (10_000, "0.00001 QRL"),
            (10_020_000, "0.01002 QRL"),
            (q, "1 QRL"),
            (400 * q, "400 QRL"),
            (400 * q + 10_000, "400.00001 QRL"),
        ];

        for (v, s) in tests {
            let mut buff = [0u8; 32];

            let e = fmt_quanta(*v, &mut buff);
            assert_eq!(&e, s);
        }
    }

    #[test]
    fn fmt_overflow() {
        let mut buff = [0u8; 32];
        assert_eq!(fmt_quanta(u64::MAX, &mut buff), "OVERFLOW");
    }
}
