/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! ZIP container access: End-of-Central-Directory layout for the signing
//! block, and entry listing/reading through the `zip` crate.

use crate::error::{FormatError, InspectError};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const EOCD_SIG: [u8; 4] = 0x0605_4b50u32.to_le_bytes();
const EOCD_MIN_SIZE: usize = 22;
const EOCD_CD_SIZE_OFFSET: usize = 12;
const EOCD_CD_OFFSET_OFFSET: usize = 16;
const EOCD_COMMENT_LEN_OFFSET: usize = 20;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

/// Where the central directory and EOCD sit inside the package bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZipLayout {
    pub cd_offset: usize,
    pub cd_size: usize,
    pub eocd_offset: usize,
}

impl ZipLayout {
    /// Scans backwards for the EOCD record whose comment runs exactly to
    /// the end of the file. ZIP64 archives are not supported.
    pub fn locate(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < EOCD_MIN_SIZE {
            return Err(FormatError::MissingEndOfCentralDirectory);
        }
        let last = bytes.len() - EOCD_MIN_SIZE;
        let first = last.saturating_sub(MAX_COMMENT_LEN);

        for pos in (first..=last).rev() {
            if bytes[pos..pos + 4] != EOCD_SIG {
                continue;
            }
            let comment_len = read_u16(bytes, pos + EOCD_COMMENT_LEN_OFFSET) as usize;
            if pos + EOCD_MIN_SIZE + comment_len != bytes.len() {
                continue;
            }
            let cd_size = read_u32(bytes, pos + EOCD_CD_SIZE_OFFSET) as usize;
            let cd_offset = read_u32(bytes, pos + EOCD_CD_OFFSET_OFFSET) as usize;
            if cd_offset > pos || cd_offset + cd_size > pos {
                return Err(FormatError::malformed(
                    "end of central directory",
                    format!(
                        "central directory {}+{} overlaps EOCD at {}",
                        cd_offset, cd_size, pos
                    ),
                ));
            }
            return Ok(Self {
                cd_offset,
                cd_size,
                eocd_offset: pos,
            });
        }
        Err(FormatError::MissingEndOfCentralDirectory)
    }

    pub fn central_directory<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.cd_offset..self.eocd_offset]
    }

    /// Copy of the EOCD with its central-directory offset rewritten.
    pub fn eocd_with_cd_offset(&self, bytes: &[u8], cd_offset: usize) -> Vec<u8> {
        let mut eocd = bytes[self.eocd_offset..].to_vec();
        let field = EOCD_CD_OFFSET_OFFSET..EOCD_CD_OFFSET_OFFSET + 4;
        eocd[field].copy_from_slice(&(cd_offset as u32).to_le_bytes());
        eocd
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// One entry of the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub name: String,
    /// Offset of the local file header
    pub offset: u64,
    /// Uncompressed size
    pub size: u64,
}

/// Read-only view over the entries of an in-memory package.
pub struct Archive<'a> {
    inner: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Archive<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self, InspectError> {
        Ok(Self {
            inner: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    pub fn entries(&mut self) -> Result<Vec<ZipEntry>, InspectError> {
        let mut out = Vec::with_capacity(self.inner.len());
        for i in 0..self.inner.len() {
            let file = self.inner.by_index_raw(i)?;
            out.push(ZipEntry {
                name: file.name().to_string(),
                offset: file.header_start(),
                size: file.size(),
            });
        }
        Ok(out)
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.file_names().map(str::to_string).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.index_for_name(name).is_some()
    }

    pub fn read(&mut self, name: &str) -> Result<Vec<u8>, InspectError> {
        let mut file = self.inner.by_name(name).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => InspectError::EntryNotFound(name.to_string()),
            other => InspectError::Zip(other),
        })?;
        // Declared sizes are untrusted.
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn sample_zip(comment: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("AndroidManifest.xml", opts).unwrap();
        writer.write_all(b"<manifest/>").unwrap();
        writer.start_file("classes.dex", opts).unwrap();
        writer.write_all(b"dex\n035\0").unwrap();
        writer.set_comment(comment);
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn locates_eocd_with_comment() {
        let bytes = sample_zip("built by tests");
        let layout = ZipLayout::locate(&bytes).unwrap();
        assert_eq!(bytes.len() - layout.eocd_offset, 22 + "built by tests".len());
        assert!(layout.cd_offset < layout.eocd_offset);
        assert_eq!(layout.cd_offset + layout.cd_size, layout.eocd_offset);
    }

    #[test]
    fn missing_eocd() {
        assert_eq!(
            ZipLayout::locate(&[0u8; 64]),
            Err(FormatError::MissingEndOfCentralDirectory)
        );
        assert_eq!(
            ZipLayout::locate(b"PK"),
            Err(FormatError::MissingEndOfCentralDirectory)
        );
    }

    #[test]
    fn rewrites_cd_offset() {
        let bytes = sample_zip("");
        let layout = ZipLayout::locate(&bytes).unwrap();
        let eocd = layout.eocd_with_cd_offset(&bytes, 0x01020304);
        assert_eq!(&eocd[16..20], &[4, 3, 2, 1]);
        assert_eq!(eocd.len(), 22);
    }

    #[test]
    fn lists_and_reads_entries() {
        let bytes = sample_zip("");
        let mut archive = Archive::open(&bytes).unwrap();
        let entries = archive.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "AndroidManifest.xml");
        assert_eq!(entries[0].offset, 0);
        assert_eq!(entries[1].size, 8);
        assert!(archive.contains("classes.dex"));
        assert_eq!(archive.read("AndroidManifest.xml").unwrap(), b"<manifest/>");
        assert!(matches!(
            archive.read("missing.txt"),
            Err(InspectError::EntryNotFound(_))
        ));
    }
}
