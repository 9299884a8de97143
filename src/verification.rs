/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Signature verification across the v1, v2 and v3 schemes.
//!
//! Every scheme is attempted in the order v3, v2, v1 and all results are
//! kept. The trust decision belongs to the first scheme that is present:
//! a failed v3 is never rescued by a valid v1.

use crate::{
    archive::ZipLayout,
    certificate::Certificate,
    crypto::{ContentDigest, CryptoEngine},
    error::{FormatError, InspectError},
    scheme_v1::V1Verifier,
    scheme_v2::V2Verifier,
    scheme_v3::V3Verifier,
    signing_block::SigningBlock,
    ui::Ui,
};
use std::{fmt, sync::OnceLock};

/// Android signature schemes, ordered by age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scheme {
    V1,
    V2,
    V3,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::V1 => write!(f, "v1 (JAR)"),
            Scheme::V2 => write!(f, "v2"),
            Scheme::V3 => write!(f, "v3"),
        }
    }
}

/// Outcome of one scheme.
#[derive(Debug)]
pub struct VerificationResult {
    pub scheme: Scheme,
    pub verified: bool,
    /// Certificates of every signer, in signer order
    pub certificates: Vec<Certificate>,
    pub error: Option<InspectError>,
}

impl VerificationResult {
    pub fn verified(scheme: Scheme, certificates: Vec<Certificate>) -> Self {
        Self {
            scheme,
            verified: true,
            certificates,
            error: None,
        }
    }

    pub fn failed(scheme: Scheme, error: InspectError) -> Self {
        Self {
            scheme,
            verified: false,
            certificates: Vec::new(),
            error: Some(error),
        }
    }
}

/// Aggregate trust decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustStatus {
    Verified(Scheme),
    Failed(Scheme),
    Unsigned,
}

/// A scheme that was not present in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedScheme {
    pub scheme: Scheme,
    pub reason: String,
}

#[derive(Debug)]
pub struct SignatureReport {
    /// Results of every present scheme, strongest first
    pub results: Vec<VerificationResult>,
    pub skipped: Vec<SkippedScheme>,
    pub status: TrustStatus,
}

impl SignatureReport {
    pub fn is_verified(&self) -> bool {
        matches!(self.status, TrustStatus::Verified(_))
    }

    pub fn result(&self, scheme: Scheme) -> Option<&VerificationResult> {
        self.results.iter().find(|r| r.scheme == scheme)
    }

    /// The result that decided [`status`](Self::status).
    pub fn winner(&self) -> Option<&VerificationResult> {
        match self.status {
            TrustStatus::Verified(s) | TrustStatus::Failed(s) => self.result(s),
            TrustStatus::Unsigned => None,
        }
    }

    /// Certificates of the winning scheme, empty unless it verified.
    pub fn signer_certificates(&self) -> &[Certificate] {
        match self.winner() {
            Some(r) if r.verified => &r.certificates,
            _ => &[],
        }
    }
}

/// Shared input for every scheme verifier.
pub struct VerificationContext<'a> {
    pub bytes: &'a [u8],
    pub layout: ZipLayout,
    /// `None` when the package carries no APK Signing Block
    pub signing_block: Option<SigningBlock>,
    pub ui: &'a Ui,
    sha256: OnceLock<Vec<u8>>,
    sha512: OnceLock<Vec<u8>>,
}

impl<'a> VerificationContext<'a> {
    /// Fails on a missing EOCD or a corrupt signing block; an absent block
    /// is not an error.
    pub fn new(bytes: &'a [u8], ui: &'a Ui) -> Result<Self, InspectError> {
        let layout = ZipLayout::locate(bytes)?;
        ui.debug(&format!(
            "Central directory at {} ({} bytes), EOCD at {}",
            layout.cd_offset, layout.cd_size, layout.eocd_offset
        ));
        let signing_block = match SigningBlock::read(bytes, &layout) {
            Ok(block) => {
                ui.verbose(&format!(
                    "APK Signing Block at {} with {} entries",
                    block.offset,
                    block.entries.len()
                ));
                for id in block.ids() {
                    ui.debug(&format!("Signing block entry 0x{:08x}", id));
                }
                Some(block)
            }
            Err(FormatError::MissingSigningBlock) => {
                ui.verbose("No APK Signing Block present");
                None
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            bytes,
            layout,
            signing_block,
            ui,
            sha256: OnceLock::new(),
            sha512: OnceLock::new(),
        })
    }

    /// Chunked digest of the package, computed once per algorithm.
    /// `None` without a signing block.
    pub fn content_digest(&self, alg: ContentDigest) -> Option<&[u8]> {
        let block = self.signing_block.as_ref()?;
        let cell = match alg {
            ContentDigest::Sha256 => &self.sha256,
            ContentDigest::Sha512 => &self.sha512,
        };
        let digest = cell.get_or_init(|| {
            let eocd = self.layout.eocd_with_cd_offset(self.bytes, block.offset);
            let sections: [&[u8]; 3] = [
                &self.bytes[..block.offset],
                self.layout.central_directory(self.bytes),
                &eocd,
            ];
            CryptoEngine::chunked_digest_with_ui(alg, &sections, Some(self.ui))
        });
        Some(digest.as_slice())
    }
}

/// One signature scheme.
pub trait SchemeVerifier {
    fn scheme(&self) -> Scheme;

    /// `Err(SignatureNotFound)` means the scheme is absent.
    fn verify(&self, ctx: &VerificationContext<'_>) -> Result<VerificationResult, InspectError>;
}

/// Runs every scheme over the package bytes.
pub fn verify(bytes: &[u8], ui: &Ui) -> Result<SignatureReport, InspectError> {
    let ctx = VerificationContext::new(bytes, ui)?;
    let verifiers: [&dyn SchemeVerifier; 3] = [&V3Verifier, &V2Verifier, &V1Verifier];

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for verifier in verifiers {
        let scheme = verifier.scheme();
        ui.verbose(&format!("Checking {} signature", scheme));
        match verifier.verify(&ctx) {
            Ok(result) => {
                if result.verified {
                    ui.verbose(&format!(
                        "{} verified ({} certificate(s))",
                        scheme,
                        result.certificates.len()
                    ));
                }
                results.push(result);
            }
            Err(InspectError::SignatureNotFound(s)) => {
                ui.very_verbose(&format!("{} not present", s));
                skipped.push(SkippedScheme {
                    scheme: s,
                    reason: format!("{} signature not found", s),
                });
            }
            Err(e) => {
                ui.verbose(&format!("{} failed: {}", scheme, e));
                results.push(VerificationResult::failed(scheme, e));
            }
        }
    }

    let status = match results.first() {
        Some(r) if r.verified => TrustStatus::Verified(r.scheme),
        Some(r) => TrustStatus::Failed(r.scheme),
        None => TrustStatus::Unsigned,
    };
    ui.debug(&format!("Trust status: {:?}", status));

    Ok(SignatureReport {
        results,
        skipped,
        status,
    })
}
