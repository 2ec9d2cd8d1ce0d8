// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application Information APDUs

use encdec::{Decode, Encode};

use super::{encdec_bitflags, ApduError, ApduStatic, Instruction, XMSS_APDU_CLA};

/// Fetch application version APDU
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct AppInfoReq {}

impl ApduStatic for AppInfoReq {
    /// Application Info command APDU is class `0x77`
    const CLA: u8 = XMSS_APDU_CLA;

    /// Application Info GET APDU is instruction `0x00`
    const INS: u8 = Instruction::GetVersion as u8;
}

bitflags::bitflags! {
    /// Application info flags
    pub struct AppFlags: u8 {
        /// Build uses a fixed test seed, keys MUST NOT be used for funds
        const TEST_MODE = 1 << 0;
    }
}

encdec_bitflags!(AppFlags);

/// Application version response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     FLAGS     |     MAJOR     |     MINOR     |     PATCH     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct AppInfoResp {
    /// Application flags
    pub flags: AppFlags,

    /// Major version
    pub major: u8,

    /// Minor version
    pub minor: u8,

    /// Patch version
    pub patch: u8,
}

impl AppInfoResp {
    /// Create a new application version APDU
    pub fn new(flags: AppFlags, major: u8, minor: u8, patch: u8) -> Self {
        Self {
            flags,
            major,
            minor,
            patch,
        }
    }
}

impl core::fmt::Display for AppInfoResp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.flags.contains(AppFlags::TEST_MODE) {
            write!(f, " (test mode)")?;
        }
        Ok(())
    }
}
