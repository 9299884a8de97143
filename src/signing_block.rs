/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! APK Signing Block reader.
//!
//! The block sits immediately before the ZIP central directory:
//!
//! ```text
//! u64 size | (u64 len, u32 id, value[len - 4])* | u64 size | "APK Sig Block 42"
//! ```
//!
//! Both size fields count everything after the leading size field.

use crate::{archive::ZipLayout, error::FormatError};

pub const APK_SIG_BLOCK_MAGIC: &[u8; 16] = b"APK Sig Block 42";
pub const V2_BLOCK_ID: u32 = 0x7109_871a;
pub const V3_BLOCK_ID: u32 = 0xf053_68c0;
/// v3.1 block; recognised for logging only.
pub const V31_BLOCK_ID: u32 = 0x1b93_ad61;
pub const VERITY_PADDING_BLOCK_ID: u32 = 0x4272_7765;

const FOOTER_SIZE: usize = 24;

/// One `(id, value)` pair from the signing block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningBlockEntry {
    pub id: u32,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningBlock {
    /// File offset of the leading size field
    pub offset: usize,
    pub entries: Vec<SigningBlockEntry>,
}

impl SigningBlock {
    /// Reads the block preceding the central directory described by `layout`.
    pub fn read(bytes: &[u8], layout: &ZipLayout) -> Result<Self, FormatError> {
        let cd = layout.cd_offset;
        if cd < FOOTER_SIZE || cd > bytes.len() {
            return Err(FormatError::MissingSigningBlock);
        }
        let footer = &bytes[cd - FOOTER_SIZE..cd];
        if &footer[8..] != APK_SIG_BLOCK_MAGIC {
            return Err(FormatError::MissingSigningBlock);
        }

        let footer_size = ByteReader::new(&footer[..8], "signing block footer").read_u64()?;
        if footer_size < FOOTER_SIZE as u64 {
            return Err(FormatError::malformed(
                "signing block",
                format!("declared size {} is smaller than its footer", footer_size),
            ));
        }
        let available = (cd - 8) as u64;
        if footer_size > available {
            return Err(FormatError::Truncated {
                context: "signing block",
                offset: cd - FOOTER_SIZE,
                wanted: footer_size.saturating_add(8) as usize,
                remaining: cd,
            });
        }

        let start = cd - footer_size as usize - 8;
        let header_size = ByteReader::new(&bytes[start..start + 8], "signing block header").read_u64()?;
        if header_size != footer_size {
            return Err(FormatError::BlockSizeMismatch {
                header: header_size,
                footer: footer_size,
            });
        }

        let mut pairs = ByteReader::new(&bytes[start + 8..cd - FOOTER_SIZE], "signing block pair");
        let mut entries = Vec::new();
        while !pairs.is_empty() {
            let len = pairs.read_u64()?;
            if len < 4 {
                return Err(FormatError::malformed(
                    "signing block pair",
                    format!("pair length {} cannot hold an id", len),
                ));
            }
            let len = pairs.checked_len(len)?;
            let mut pair = ByteReader::new(pairs.read_bytes(len)?, "signing block pair");
            let id = pair.read_u32()?;
            entries.push(SigningBlockEntry {
                id,
                value: pair.rest().to_vec(),
            });
        }

        Ok(Self {
            offset: start,
            entries,
        })
    }

    /// Locates the EOCD and reads the block in one step.
    pub fn locate(bytes: &[u8]) -> Result<Self, FormatError> {
        let layout = ZipLayout::locate(bytes)?;
        Self::read(bytes, &layout)
    }

    /// Value of the first entry with `id`.
    pub fn get(&self, id: u32) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.value.as_slice())
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn ids(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.id).collect()
    }
}

/// Little-endian cursor over a borrowed slice. Never reads past its slice.
#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8], context: &'static str) -> Self {
        Self {
            data,
            pos: 0,
            context,
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn truncated(&self, wanted: usize) -> FormatError {
        FormatError::Truncated {
            context: self.context,
            offset: self.pos,
            wanted,
            remaining: self.remaining(),
        }
    }

    fn checked_len(&self, len: u64) -> Result<usize, FormatError> {
        if len > self.remaining() as u64 {
            return Err(self.truncated(len.min(usize::MAX as u64) as usize));
        }
        Ok(len as usize)
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, FormatError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64, FormatError> {
        let b = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a `u32` length prefix and the bytes it covers.
    pub(crate) fn read_prefixed(&mut self) -> Result<&'a [u8], FormatError> {
        let len = self.read_u32()?;
        let len = self.checked_len(len as u64)?;
        self.read_bytes(len)
    }

    /// Like [`read_prefixed`](Self::read_prefixed) but returns a reader over the value.
    pub(crate) fn read_nested(&mut self, context: &'static str) -> Result<ByteReader<'a>, FormatError> {
        Ok(ByteReader::new(self.read_prefixed()?, context))
    }

    /// Splits the remaining bytes into a sequence of length-prefixed values.
    pub(crate) fn read_sequence(&mut self) -> Result<Vec<&'a [u8]>, FormatError> {
        let mut out = Vec::new();
        while !self.is_empty() {
            out.push(self.read_prefixed()?);
        }
        Ok(out)
    }

    /// Splits the remaining bytes into length-prefixed `(u32 id, value)` records.
    pub(crate) fn read_id_value_sequence(&mut self) -> Result<Vec<(u32, &'a [u8])>, FormatError> {
        let context = self.context;
        let mut out = Vec::new();
        while !self.is_empty() {
            let mut record = self.read_nested(context)?;
            let id = record.read_u32()?;
            out.push((id, record.rest()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(pairs: &[(u32, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (id, value) in pairs {
            body.extend_from_slice(&((value.len() + 4) as u64).to_le_bytes());
            body.extend_from_slice(&id.to_le_bytes());
            body.extend_from_slice(value);
        }
        let size = (body.len() + FOOTER_SIZE) as u64;
        let mut out = size.to_le_bytes().to_vec();
        out.extend_from_slice(&body);
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(APK_SIG_BLOCK_MAGIC);
        out
    }

    fn layout_at(cd_offset: usize) -> ZipLayout {
        ZipLayout {
            cd_offset,
            cd_size: 0,
            eocd_offset: cd_offset,
        }
    }

    #[test]
    fn reads_pairs_in_order() {
        let mut bytes = b"local file data".to_vec();
        let start = bytes.len();
        bytes.extend(block(&[(V2_BLOCK_ID, b"two"), (0x1234, b""), (V3_BLOCK_ID, b"three")]));
        let sb = SigningBlock::read(&bytes, &layout_at(bytes.len())).unwrap();
        assert_eq!(sb.offset, start);
        assert_eq!(sb.ids(), vec![V2_BLOCK_ID, 0x1234, V3_BLOCK_ID]);
        assert_eq!(sb.get(V3_BLOCK_ID), Some(&b"three"[..]));
        assert_eq!(sb.get(0x1234), Some(&b""[..]));
        assert!(!sb.contains(V31_BLOCK_ID));
    }

    #[test]
    fn missing_magic() {
        let bytes = vec![0u8; 64];
        assert_eq!(
            SigningBlock::read(&bytes, &layout_at(64)),
            Err(FormatError::MissingSigningBlock)
        );
        assert_eq!(
            SigningBlock::read(&bytes, &layout_at(10)),
            Err(FormatError::MissingSigningBlock)
        );
    }

    #[test]
    fn oversized_declared_length() {
        let mut bytes = block(&[(V2_BLOCK_ID, b"x")]);
        let footer = bytes.len() - FOOTER_SIZE;
        bytes[footer..footer + 8].copy_from_slice(&(1u64 << 40).to_le_bytes());
        let err = SigningBlock::read(&bytes, &layout_at(bytes.len())).unwrap_err();
        assert!(matches!(err, FormatError::Truncated { .. }));
    }

    #[test]
    fn header_footer_mismatch() {
        let mut bytes = block(&[(V2_BLOCK_ID, b"x")]);
        bytes[0] ^= 0x01;
        let err = SigningBlock::read(&bytes, &layout_at(bytes.len())).unwrap_err();
        assert!(matches!(err, FormatError::BlockSizeMismatch { .. }));
    }

    #[test]
    fn pair_overruns_block() {
        let mut bytes = block(&[(V2_BLOCK_ID, b"abcd")]);
        bytes[8..16].copy_from_slice(&100u64.to_le_bytes());
        let err = SigningBlock::read(&bytes, &layout_at(bytes.len())).unwrap_err();
        assert!(matches!(err, FormatError::Truncated { .. }));
    }

    #[test]
    fn byte_reader_sequences() {
        let mut data = Vec::new();
        for v in [&b"ab"[..], b"", b"xyz"] {
            data.extend_from_slice(&(v.len() as u32).to_le_bytes());
            data.extend_from_slice(v);
        }
        let seq = ByteReader::new(&data, "test").read_sequence().unwrap();
        assert_eq!(seq, vec![&b"ab"[..], b"", b"xyz"]);

        let bad = 9u32.to_le_bytes();
        assert!(ByteReader::new(&bad, "test").read_prefixed().is_err());
    }
}
