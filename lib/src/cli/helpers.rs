// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Variable length hex encoded data
#[derive(Clone, PartialEq, Debug)]
pub struct HexBytes(pub Vec<u8>);

impl std::str::FromStr for HexBytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start_matches("0x");
        hex::decode(s).map(HexBytes)
    }
}

impl AsRef<[u8]> for HexBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for HexBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

#[cfg(test)]
mod test {
    use super::HexBytes;

    #[test]
    fn parse_hex() {
        let h: HexBytes = "0x0003aabb".parse().unwrap();
        assert_eq!(h.0, vec![0x00, 0x03, 0xaa, 0xbb]);
        assert_eq!(h.to_string(), "0003aabb");

        assert!("0x123".parse::<HexBytes>().is_err());
    }
}
