// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction codec, used to validate and hash transactions submitted for signing.
//!
//! Transactions use a fixed binary layout, a two byte header followed by a
//! master address / amount block shared between all variants, then a
//! variant-specific body containing `count` sub-items.
//!
//! ## Encoding:
//! ```text
//! +---------+---------+------------------+-------------+---------------------------+
//! | TX_TYPE |  COUNT  |  MASTER_ADDRESS  |   MASTER    |  [EXTRA] | COUNT x ITEM   |
//! |   (1)   |   (1)   |       (39)       | AMOUNT (8)  |                           |
//! +---------+---------+------------------+-------------+---------------------------+
//! ```
//!
//! | Type | Variant           | Extra          | Item                        | Max |
//! |------|-------------------|----------------|-----------------------------|-----|
//! | 0    | Transfer          | -              | address (39), amount (8)    | 3   |
//! | 1    | TokenTransfer     | token hash (32)| address (39), amount (8)    | 3   |
//! | 2    | SlaveRegistration | -              | public key (35), access (8) | 3   |
//! | 3    | Message           | -              | message byte (1)            | 80  |
//!
//! Amounts are big-endian integers with [`QUANTA_DECIMALS`] decimal places.
//! Unknown types are accepted with a two byte (header only) encoding.

use byteorder::{BigEndian, ByteOrder};
use heapless::Vec;
use num_enum::TryFromPrimitive;
use sha2::{Digest as _, Sha256};
use strum::{Display, EnumIter};

mod error;
pub use error::TxError;

/// Address length in bytes
pub const ADDRESS_LEN: usize = 39;

/// Amount length in bytes
pub const AMOUNT_LEN: usize = 8;

/// Address / amount block length
pub const ADDR_BLOCK_LEN: usize = ADDRESS_LEN + AMOUNT_LEN;

/// Slave public key length
pub const SLAVE_PK_LEN: usize = 35;

/// Slave access type length
pub const ACCESS_TYPE_LEN: usize = 8;

/// Slave registration block length
pub const SLAVE_BLOCK_LEN: usize = SLAVE_PK_LEN + ACCESS_TYPE_LEN;

/// Token hash length
pub const TOKEN_HASH_LEN: usize = 32;

/// Maximum number of structured sub-items
pub const SUBITEM_MAX: usize = 3;

/// Maximum message length
pub const MESSAGE_MAX: usize = 80;

/// Decimal places for displayed amounts
pub const QUANTA_DECIMALS: usize = 9;

/// Transaction type and sub-item count
const META_LEN: usize = 2;

/// Hashes exclude the metadata and master (source) address
pub const HASH_OFFSET: usize = META_LEN + ADDRESS_LEN;

/// Largest valid encoding (token transfer with three destinations)
pub const MAX_TX_SIZE: usize =
    META_LEN + ADDR_BLOCK_LEN + TOKEN_HASH_LEN + SUBITEM_MAX * ADDR_BLOCK_LEN;

/// Transaction types
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumIter, TryFromPrimitive)]
#[repr(u8)]
pub enum TxKind {
    Transfer = 0,
    TokenTransfer = 1,
    SlaveRegistration = 2,
    Message = 3,
}

impl TxKind {
    /// Offset of the first sub-item
    pub const fn header_len(&self) -> usize {
        match self {
            TxKind::TokenTransfer => META_LEN + ADDR_BLOCK_LEN + TOKEN_HASH_LEN,
            _ => META_LEN + ADDR_BLOCK_LEN,
        }
    }

    /// Encoded length of each sub-item
    pub const fn item_len(&self) -> usize {
        match self {
            TxKind::Transfer | TxKind::TokenTransfer => ADDR_BLOCK_LEN,
            TxKind::SlaveRegistration => SLAVE_BLOCK_LEN,
            TxKind::Message => 1,
        }
    }

    /// Maximum sub-item count
    pub const fn max_items(&self) -> usize {
        match self {
            TxKind::Message => MESSAGE_MAX,
            _ => SUBITEM_MAX,
        }
    }
}

/// Address and amount, used for the master block and transfer destinations
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AddrBlock {
    pub address: [u8; ADDRESS_LEN],
    /// Amount (or fee for the master block) in base units
    pub amount: u64,
}

/// Slave key registration
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SlaveBlock {
    pub public_key: [u8; SLAVE_PK_LEN],
    pub access_type: [u8; ACCESS_TYPE_LEN],
}

/// Transaction submitted for signing
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Transaction {
    Transfer {
        master: AddrBlock,
        destinations: Vec<AddrBlock, SUBITEM_MAX>,
    },
    TokenTransfer {
        master: AddrBlock,
        token_hash: [u8; TOKEN_HASH_LEN],
        destinations: Vec<AddrBlock, SUBITEM_MAX>,
    },
    SlaveRegistration {
        master: AddrBlock,
        slaves: Vec<SlaveBlock, SUBITEM_MAX>,
    },
    Message {
        master: AddrBlock,
        message: Vec<u8, MESSAGE_MAX>,
    },
    /// Unrecognised type, size-checked only
    Unknown { tag: u8, count: u8 },
}

/// Compute the expected wire size from a transaction header,
/// validating the sub-item count for the transaction type.
pub fn wire_size(raw: &[u8]) -> Result<usize, TxError> {
    if raw.len() < META_LEN {
        return Err(TxError::Truncated);
    }

    let (tag, count) = (raw[0], raw[1]);
    if count == 0 {
        return Err(TxError::NoSubItems);
    }

    match TxKind::try_from(tag) {
        Ok(kind) => {
            if count as usize > kind.max_items() {
                return Err(TxError::TooManySubItems(count));
            }
            Ok(kind.header_len() + count as usize * kind.item_len())
        }
        Err(_) => {
            if count as usize > SUBITEM_MAX {
                return Err(TxError::TooManySubItems(count));
            }
            Ok(META_LEN)
        }
    }
}

impl Transaction {
    /// Parse and validate a serialised transaction
    pub fn parse(raw: &[u8]) -> Result<Self, TxError> {
        let expected = wire_size(raw)?;
        if expected != raw.len() {
            return Err(TxError::SizeMismatch {
                expected,
                actual: raw.len(),
            });
        }

        let mut r = Reader::new(raw);
        let (tag, count) = (r.u8()?, r.u8()? as usize);

        let kind = match TxKind::try_from(tag) {
            Ok(k) => k,
            Err(_) => {
                return Ok(Transaction::Unknown {
                    tag,
                    count: count as u8,
                })
            }
        };

        let master = r.addr_block()?;

        let tx = match kind {
            TxKind::Transfer => Transaction::Transfer {
                master,
                destinations: r.items(count, Reader::addr_block)?,
            },
            TxKind::TokenTransfer => {
                let token_hash = r.array()?;
                Transaction::TokenTransfer {
                    master,
                    token_hash,
                    destinations: r.items(count, Reader::addr_block)?,
                }
            }
            TxKind::SlaveRegistration => Transaction::SlaveRegistration {
                master,
                slaves: r.items(count, Reader::slave_block)?,
            },
            TxKind::Message => Transaction::Message {
                master,
                message: r.items(count, Reader::u8)?,
            },
        };

        Ok(tx)
    }

    /// Transaction type, `None` for unknown variants
    pub fn kind(&self) -> Option<TxKind> {
        match self {
            Transaction::Transfer { .. } => Some(TxKind::Transfer),
            Transaction::TokenTransfer { .. } => Some(TxKind::TokenTransfer),
            Transaction::SlaveRegistration { .. } => Some(TxKind::SlaveRegistration),
            Transaction::Message { .. } => Some(TxKind::Message),
            Transaction::Unknown { .. } => None,
        }
    }

    /// Raw transaction type tag
    pub fn tag(&self) -> u8 {
        match self {
            Transaction::Unknown { tag, .. } => *tag,
            _ => self.kind().map(|k| k as u8).unwrap_or_default(),
        }
    }

    /// Sub-item count
    pub fn count(&self) -> usize {
        match self {
            Transaction::Transfer { destinations, .. }
            | Transaction::TokenTransfer { destinations, .. } => destinations.len(),
            Transaction::SlaveRegistration { slaves, .. } => slaves.len(),
            Transaction::Message { message, .. } => message.len(),
            Transaction::Unknown { count, .. } => *count as usize,
        }
    }

    /// Master address / amount block
    pub fn master(&self) -> Option<&AddrBlock> {
        match self {
            Transaction::Transfer { master, .. }
            | Transaction::TokenTransfer { master, .. }
            | Transaction::SlaveRegistration { master, .. }
            | Transaction::Message { master, .. } => Some(master),
            Transaction::Unknown { .. } => None,
        }
    }

    /// Transfer destinations (empty for non-transfer variants)
    pub fn destinations(&self) -> &[AddrBlock] {
        match self {
            Transaction::Transfer { destinations, .. }
            | Transaction::TokenTransfer { destinations, .. } => destinations.as_slice(),
            _ => &[],
        }
    }

    /// Exact encoded length
    pub fn encoded_len(&self) -> usize {
        match self.kind() {
            Some(k) => k.header_len() + self.count() * k.item_len(),
            None => META_LEN,
        }
    }

    /// Encode transaction to wire format, returning the encoded length
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, TxError> {
        let mut w = Writer::new(buff);

        w.put(&[self.tag(), self.count() as u8])?;

        if let Some(m) = self.master() {
            w.addr_block(m)?;
        }

        match self {
            Transaction::Transfer { destinations, .. } => {
                for d in destinations {
                    w.addr_block(d)?;
                }
            }
            Transaction::TokenTransfer {
                token_hash,
                destinations,
                ..
            } => {
                w.put(token_hash)?;
                for d in destinations {
                    w.addr_block(d)?;
                }
            }
            Transaction::SlaveRegistration { slaves, .. } => {
                for s in slaves {
                    w.put(&s.public_key)?;
                    w.put(&s.access_type)?;
                }
            }
            Transaction::Message { message, .. } => w.put(message)?,
            Transaction::Unknown { .. } => (),
        }

        Ok(w.index)
    }

    /// Compute the canonical transaction hash, SHA-256 over the wire encoding
    /// excluding the metadata and master address.
    pub fn canonical_hash(&self) -> Result<[u8; 32], TxError> {
        let mut buff = [0u8; MAX_TX_SIZE];
        let n = self.encode(&mut buff)?;

        if n < HASH_OFFSET {
            return Err(TxError::NotHashable);
        }

        Ok(Sha256::digest(&buff[HASH_OFFSET..n]).into())
    }
}

/// Cursor for decoding fixed-layout fields
struct Reader<'a> {
    buff: &'a [u8],
    index: usize,
}

impl<'a> Reader<'a> {
    fn new(buff: &'a [u8]) -> Self {
        Self { buff, index: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TxError> {
        if self.buff.len() < self.index + n {
            return Err(TxError::Truncated);
        }

        let d = &self.buff[self.index..][..n];
        self.index += n;

        Ok(d)
    }

    fn u8(&mut self) -> Result<u8, TxError> {
        self.take(1).map(|d| d[0])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], TxError> {
        let mut a = [0u8; N];
        a.copy_from_slice(self.take(N)?);
        Ok(a)
    }

    fn addr_block(&mut self) -> Result<AddrBlock, TxError> {
        let address = self.array()?;
        let amount = BigEndian::read_u64(self.take(AMOUNT_LEN)?);
        Ok(AddrBlock { address, amount })
    }

    fn slave_block(&mut self) -> Result<SlaveBlock, TxError> {
        Ok(SlaveBlock {
            public_key: self.array()?,
            access_type: self.array()?,
        })
    }

    fn items<T, const N: usize>(
        &mut self,
        count: usize,
        f: fn(&mut Self) -> Result<T, TxError>,
    ) -> Result<Vec<T, N>, TxError> {
        let mut v = Vec::new();
        for _ in 0..count {
            v.push(f(self)?)
                .map_err(|_| TxError::TooManySubItems(count as u8))?;
        }
        Ok(v)
    }
}

/// Cursor for encoding fixed-layout fields
struct Writer<'a> {
    buff: &'a mut [u8],
    index: usize,
}

impl<'a> Writer<'a> {
    fn new(buff: &'a mut [u8]) -> Self {
        Self { buff, index: 0 }
    }

    fn put(&mut self, d: &[u8]) -> Result<(), TxError> {
        if self.buff.len() < self.index + d.len() {
            return Err(TxError::Truncated);
        }

        self.buff[self.index..][..d.len()].copy_from_slice(d);
        self.index += d.len();

        Ok(())
    }

    fn addr_block(&mut self, b: &AddrBlock) -> Result<(), TxError> {
        let mut amount = [0u8; AMOUNT_LEN];
        BigEndian::write_u64(&mut amount, b.amount);

        self.put(&b.address)?;
        self.put(&amount)
    }
}

#[cfg(test)]
mod test {
    use rand::random;
    use strum::IntoEnumIterator;

    use super::*;

    /// Build a raw transaction with random content
    fn raw_tx(tag: u8, count: u8) -> ([u8; 512], usize) {
        let mut buff = [0u8; 512];
        buff.iter_mut().for_each(|b| *b = random());
        buff[0] = tag;
        buff[1] = count;

        let n = match TxKind::try_from(tag) {
            Ok(k) => k.header_len() + count as usize * k.item_len(),
            Err(_) => 2,
        };

        (buff, n)
    }

    #[test]
    fn parse_boundary_counts() {
        for kind in TxKind::iter() {
            let (raw, n) = raw_tx(kind as u8, 0);
            assert_eq!(Transaction::parse(&raw[..n]), Err(TxError::NoSubItems));

            let max = kind.max_items() as u8;
            for count in [1, max] {
                let (raw, n) = raw_tx(kind as u8, count);
                let tx = Transaction::parse(&raw[..n])
                    .unwrap_or_else(|e| panic!("{kind} count {count} rejected: {e}"));
                assert_eq!(tx.kind(), Some(kind));
                assert_eq!(tx.count(), count as usize);
            }

            let (raw, n) = raw_tx(kind as u8, max + 1);
            assert_eq!(
                Transaction::parse(&raw[..n]),
                Err(TxError::TooManySubItems(max + 1))
            );
        }
    }

    #[test]
    fn parse_size_mismatch() {
        let (raw, n) = raw_tx(TxKind::Transfer as u8, 2);
        assert_eq!(n, 49 + 2 * 47);

        assert_eq!(
            Transaction::parse(&raw[..n - 1]),
            Err(TxError::SizeMismatch {
                expected: n,
                actual: n - 1
            })
        );
        assert_eq!(
            Transaction::parse(&raw[..n + 1]),
            Err(TxError::SizeMismatch {
                expected: n,
                actual: n + 1
            })
        );

        assert_eq!(Transaction::parse(&raw[..1]), Err(TxError::Truncated));

        let e = Transaction::parse(&raw[..n - 1]).unwrap_err();
        assert_eq!(
            e.to_string(),
            format!("size mismatch (expected {}, actual {})", n, n - 1)
        );
    }

    #[test]
    fn slave_registration_uses_slave_blocks() {
        let (raw, n) = raw_tx(TxKind::SlaveRegistration as u8, 3);
        assert_eq!(n, 49 + 3 * 43);

        let tx = Transaction::parse(&raw[..n]).unwrap();
        match &tx {
            Transaction::SlaveRegistration { slaves, .. } => {
                assert_eq!(&slaves[2].public_key[..], &raw[49 + 2 * 43..][..35]);
                assert_eq!(&slaves[2].access_type[..], &raw[49 + 2 * 43 + 35..][..8]);
            }
            _ => panic!("unexpected variant: {tx:?}"),
        }
    }

    #[test]
    fn encode_matches_wire() {
        for kind in TxKind::iter() {
            let (raw, n) = raw_tx(kind as u8, 2);
            let tx = Transaction::parse(&raw[..n]).unwrap();

            let mut buff = [0u8; MAX_TX_SIZE];
            let m = tx.encode(&mut buff).unwrap();

            assert_eq!(m, n);
            assert_eq!(tx.encoded_len(), n);
            assert_eq!(&buff[..m], &raw[..n]);
        }
    }

    #[test]
    fn transfer_amounts_big_endian() {
        let (mut raw, n) = raw_tx(TxKind::Transfer as u8, 1);
        raw[41..49].copy_from_slice(&[0, 0, 0, 0, 0, 0, 0x01, 0x02]);
        raw[49 + 39..][..8].copy_from_slice(&1_500_000_000u64.to_be_bytes());

        let tx = Transaction::parse(&raw[..n]).unwrap();

        assert_eq!(tx.master().unwrap().amount, 0x0102);
        assert_eq!(tx.destinations()[0].amount, 1_500_000_000);
    }

    #[test]
    fn hash_skips_source_address() {
        let (raw, n) = raw_tx(TxKind::TokenTransfer as u8, 3);
        let a = Transaction::parse(&raw[..n]).unwrap();

        let mut raw_b = raw;
        raw_b[2..41].iter_mut().for_each(|b| *b = !*b);
        let b = Transaction::parse(&raw_b[..n]).unwrap();

        assert_ne!(a, b);
        assert_eq!(a.canonical_hash().unwrap(), b.canonical_hash().unwrap());

        let expected: [u8; 32] = Sha256::digest(&raw[HASH_OFFSET..n]).into();
        assert_eq!(a.canonical_hash().unwrap(), expected);

        // Changing any hashed byte changes the digest
        let mut raw_c = raw;
        raw_c[45] ^= 0x01;
        let c = Transaction::parse(&raw_c[..n]).unwrap();
        assert_ne!(a.canonical_hash().unwrap(), c.canonical_hash().unwrap());
    }

    #[test]
    fn unknown_kind_size_only() {
        let tx = Transaction::parse(&[0x09, 0x02]).unwrap();
        assert_eq!(tx, Transaction::Unknown { tag: 0x09, count: 2 });
        assert_eq!(tx.encoded_len(), 2);

        assert_eq!(tx.canonical_hash(), Err(TxError::NotHashable));

        assert_eq!(
            Transaction::parse(&[0x09, 0x02, 0x00]),
            Err(TxError::SizeMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            Transaction::parse(&[0x09, 0x04]),
            Err(TxError::TooManySubItems(4))
        );
    }

    #[test]
    fn message_hash() {
        let msg = b"hello xmss";

        let mut raw = [0u8; 49 + 10];
        raw[0] = TxKind::Message as u8;
        raw[1] = msg.len() as u8;
        raw[49..].copy_from_slice(msg);

        let tx = Transaction::parse(&raw).unwrap();
        match &tx {
            Transaction::Message { message, .. } => assert_eq!(&message[..], &msg[..]),
            _ => panic!("unexpected variant: {tx:?}"),
        }

        let expected: [u8; 32] = Sha256::digest(&raw[41..]).into();
        assert_eq!(tx.canonical_hash().unwrap(), expected);
    }
}
