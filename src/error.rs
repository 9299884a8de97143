/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Error types and handling for the ApkInspect library.
//! Defines every failure that can surface while verifying signatures or
//! decoding manifests.

use crate::verification::Scheme;
use std::{fmt, io};

/// Structural problems in the package bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No End-of-Central-Directory record could be found
    MissingEndOfCentralDirectory,
    /// The `APK Sig Block 42` magic is absent before the central directory
    MissingSigningBlock,
    /// A length or offset points past the available bytes
    Truncated {
        context: &'static str,
        offset: usize,
        wanted: usize,
        remaining: usize,
    },
    /// The signing block header and footer disagree on its size
    BlockSizeMismatch { header: u64, footer: u64 },
    /// Anything else that does not parse
    Malformed { context: &'static str, detail: String },
}

impl FormatError {
    pub fn malformed(context: &'static str, detail: impl Into<String>) -> Self {
        Self::Malformed {
            context,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::MissingEndOfCentralDirectory => {
                write!(f, "End of Central Directory record not found")
            }
            FormatError::MissingSigningBlock => write!(f, "APK Signing Block not found"),
            FormatError::Truncated {
                context,
                offset,
                wanted,
                remaining,
            } => write!(
                f,
                "{}: need {} bytes at offset {}, only {} remaining",
                context, wanted, offset, remaining
            ),
            FormatError::BlockSizeMismatch { header, footer } => write!(
                f,
                "signing block size mismatch: header {} vs footer {}",
                header, footer
            ),
            FormatError::Malformed { context, detail } => write!(f, "{}: {}", context, detail),
        }
    }
}

/// Comprehensive error type for all inspection operations.
#[derive(Debug)]
pub enum InspectError {
    /// I/O errors during file operations
    Io(io::Error),
    /// ZIP format errors from the archive reader
    Zip(zip::result::ZipError),
    /// PEM format parsing errors
    Pem(pem::PemError),
    /// Protobuf decoding errors
    Protobuf(prost::DecodeError),
    /// Structural errors in the package bytes
    Format(FormatError),
    /// The scheme is not present in the package
    SignatureNotFound(Scheme),
    /// The scheme is present but its signature does not check out
    CryptoVerification { scheme: Scheme, reason: String },
    /// Certificate parsing failures
    Certificate(String),
    /// A required archive entry is missing
    EntryNotFound(String),
    /// An intent-filter element name whose kind cannot be inferred
    UnknownIntentElement(String),
    /// No scheme at all is present in the package
    Unsigned,
    /// Configuration or setup errors
    Config(String),
    /// A memoized error shared by reference, carried as its message
    Shared(String),
}

impl InspectError {
    pub fn verification(scheme: Scheme, reason: impl Into<String>) -> Self {
        Self::CryptoVerification {
            scheme,
            reason: reason.into(),
        }
    }

    /// Owned copy of a borrowed error, keeping only its message.
    pub fn shared(e: &InspectError) -> Self {
        Self::Shared(e.to_string())
    }
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectError::Io(e) => write!(f, "I/O Error: {}", e),
            InspectError::Zip(e) => write!(f, "ZIP Error: {}", e),
            InspectError::Pem(e) => write!(f, "PEM Parsing Error: {}", e),
            InspectError::Protobuf(e) => write!(f, "Protobuf Error: {}", e),
            InspectError::Format(e) => write!(f, "Format Error: {}", e),
            InspectError::SignatureNotFound(s) => write!(f, "{} signature not found", s),
            InspectError::CryptoVerification { scheme, reason } => {
                write!(f, "{} verification failed: {}", scheme, reason)
            }
            InspectError::Certificate(s) => write!(f, "Certificate Error: {}", s),
            InspectError::EntryNotFound(s) => write!(f, "Entry not found: {}", s),
            InspectError::UnknownIntentElement(s) => {
                write!(f, "Cannot infer intent element kind of '{}'", s)
            }
            InspectError::Unsigned => write!(f, "No v1, v2 or v3 signature found"),
            InspectError::Config(s) => write!(f, "Configuration Error: {}", s),
            InspectError::Shared(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for InspectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InspectError::Io(e) => Some(e),
            InspectError::Zip(e) => Some(e),
            InspectError::Pem(e) => Some(e),
            InspectError::Protobuf(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for InspectError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<zip::result::ZipError> for InspectError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Zip(e)
    }
}

impl From<pem::PemError> for InspectError {
    fn from(e: pem::PemError) -> Self {
        Self::Pem(e)
    }
}

impl From<prost::DecodeError> for InspectError {
    fn from(e: prost::DecodeError) -> Self {
        Self::Protobuf(e)
    }
}

impl From<FormatError> for InspectError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}
