/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! APK Signature Scheme v3 and its proof-of-rotation lineage.

use crate::{
    certificate::Certificate,
    crypto::{CryptoEngine, SignatureAlgorithm},
    error::{FormatError, InspectError},
    signer::SignerBlock,
    signing_block::{ByteReader, V31_BLOCK_ID, V3_BLOCK_ID},
    verification::{Scheme, SchemeVerifier, VerificationContext, VerificationResult},
};

pub const PROOF_OF_ROTATION_ATTR_ID: u32 = 0x3ba0_6f8c;
const LINEAGE_VERSION: u32 = 1;

/// One certificate in a rotation history.
#[derive(Debug, Clone)]
pub struct LineageNode {
    pub certificate: Certificate,
    /// Algorithm the previous level used to sign this node
    pub signed_algorithm: u32,
    /// Algorithm this level uses to sign the next node
    pub signature_algorithm: u32,
    pub flags: u32,
}

/// Ordered signing-certificate history, oldest first.
#[derive(Debug, Clone)]
pub struct SigningCertificateLineage {
    pub nodes: Vec<LineageNode>,
}

impl SigningCertificateLineage {
    /// Parses the proof-of-rotation attribute and checks every link.
    ///
    /// ```text
    /// u32 version
    /// lp(node)*: lp(lp(cert) u32 signed_alg) u32 flags u32 sig_alg lp(signature)
    /// ```
    ///
    /// Each node after the first must be signed by the previous node's key
    /// with the algorithm the previous node declared.
    pub fn parse(value: &[u8]) -> Result<Self, InspectError> {
        let mut r = ByteReader::new(value, "proof-of-rotation");
        let version = r.read_u32()?;
        if version != LINEAGE_VERSION {
            return Err(InspectError::verification(
                Scheme::V3,
                format!("unsupported lineage version {}", version),
            ));
        }

        let mut nodes: Vec<LineageNode> = Vec::new();
        while !r.is_empty() {
            let mut node = r.read_nested("lineage node")?;
            let signed_data = node.read_prefixed()?;
            let flags = node.read_u32()?;
            let signature_algorithm = node.read_u32()?;
            let signature = node.read_prefixed()?;

            let mut sd = ByteReader::new(signed_data, "lineage signed data");
            let certificate = Certificate::from_der(sd.read_prefixed()?)?;
            let signed_algorithm = sd.read_u32()?;

            if let Some(prev) = nodes.last() {
                if prev.signature_algorithm != signed_algorithm {
                    return Err(InspectError::verification(
                        Scheme::V3,
                        format!(
                            "lineage level {} algorithm 0x{:04x} differs from declared 0x{:04x}",
                            nodes.len(),
                            signed_algorithm,
                            prev.signature_algorithm
                        ),
                    ));
                }
                let alg = SignatureAlgorithm::from_id(prev.signature_algorithm).ok_or_else(|| {
                    InspectError::verification(
                        Scheme::V3,
                        format!("unknown lineage algorithm 0x{:04x}", prev.signature_algorithm),
                    )
                })?;
                CryptoEngine::verify_signature(
                    Scheme::V3,
                    alg,
                    &prev.certificate.public_key.key_data,
                    signed_data,
                    signature,
                )
                .map_err(|_| {
                    InspectError::verification(
                        Scheme::V3,
                        format!("lineage level {} is not signed by its predecessor", nodes.len()),
                    )
                })?;
            }

            nodes.push(LineageNode {
                certificate,
                signed_algorithm,
                signature_algorithm,
                flags,
            });
        }

        if nodes.is_empty() {
            return Err(FormatError::malformed("proof-of-rotation", "empty lineage").into());
        }
        Ok(Self { nodes })
    }

    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.nodes.iter().map(|n| &n.certificate)
    }

    pub fn current(&self) -> Option<&Certificate> {
        self.nodes.last().map(|n| &n.certificate)
    }
}

pub struct V3Verifier;

impl SchemeVerifier for V3Verifier {
    fn scheme(&self) -> Scheme {
        Scheme::V3
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> Result<VerificationResult, InspectError> {
        let block = ctx
            .signing_block
            .as_ref()
            .ok_or(InspectError::SignatureNotFound(Scheme::V3))?;
        if block.contains(V31_BLOCK_ID) {
            ctx.ui.very_verbose("v3.1 block present; only the v3 block is checked");
        }
        let value = block
            .get(V3_BLOCK_ID)
            .ok_or(InspectError::SignatureNotFound(Scheme::V3))?;

        let signers = SignerBlock::parse_all(Scheme::V3, value)?;
        ctx.ui.very_verbose(&format!("v3 block has {} signer(s)", signers.len()));

        let mut certificates = Vec::new();
        for signer in &signers {
            check_sdk_range(signer)?;
            let certs = signer.verify(Scheme::V3, ctx)?;

            if let Some(attr) = signer.attribute(PROOF_OF_ROTATION_ATTR_ID) {
                let lineage = SigningCertificateLineage::parse(attr)?;
                if lineage.current() != certs.first() {
                    return Err(InspectError::verification(
                        Scheme::V3,
                        "lineage does not end with the signer certificate",
                    ));
                }
                ctx.ui.verbose(&format!(
                    "v3 key rotation: {} certificate(s) in lineage",
                    lineage.nodes.len()
                ));
                for cert in lineage.certificates() {
                    ctx.ui.debug(&format!("  lineage: {}", cert.subject));
                }
            }
            certificates.extend(certs);
        }
        Ok(VerificationResult::verified(Scheme::V3, certificates))
    }
}

fn check_sdk_range(signer: &SignerBlock<'_>) -> Result<(), InspectError> {
    let (Some(sdk), Some(signed)) = (signer.sdk, signer.signed_sdk) else {
        return Err(InspectError::verification(Scheme::V3, "missing SDK range"));
    };
    if sdk != signed {
        return Err(InspectError::verification(
            Scheme::V3,
            format!(
                "signed SDK range {}..={} differs from {}..={}",
                signed.min, signed.max, sdk.min, sdk.max
            ),
        ));
    }
    if sdk.min > sdk.max {
        return Err(InspectError::verification(
            Scheme::V3,
            format!("empty SDK range {}..={}", sdk.min, sdk.max),
        ));
    }
    Ok(())
}
