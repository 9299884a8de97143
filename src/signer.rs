/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Signer records shared by the v2 and v3 block formats.
//!
//! ```text
//! signers   := lp(lp(signer)*)
//! signer    := lp(signed_data) [u32 min_sdk u32 max_sdk] lp(lp(u32 alg, lp(sig))*) lp(spki)
//! signed    := lp(lp(u32 alg, lp(digest))*) lp(lp(cert)*) [u32 min u32 max] lp(lp(u32 id, value)*)
//! ```
//!
//! `lp` is a little-endian `u32` length prefix; the bracketed SDK fields
//! only exist in v3.

use crate::{
    certificate::{Certificate, PublicKeyInfo},
    crypto::{CryptoEngine, SignatureAlgorithm},
    error::{FormatError, InspectError},
    signing_block::ByteReader,
    verification::{Scheme, VerificationContext},
};

/// Inclusive platform SDK range a v3 signer applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdkRange {
    pub min: u32,
    pub max: u32,
}

/// One parsed signer. Borrowed from the signing block value.
#[derive(Debug, Clone)]
pub struct SignerBlock<'a> {
    /// Exact bytes covered by the signatures
    pub signed_data: &'a [u8],
    pub digests: Vec<(u32, &'a [u8])>,
    pub certificates: Vec<&'a [u8]>,
    pub additional_attributes: Vec<(u32, &'a [u8])>,
    pub signatures: Vec<(u32, &'a [u8])>,
    /// SubjectPublicKeyInfo DER
    pub public_key: &'a [u8],
    /// v3 only: range outside signed data
    pub sdk: Option<SdkRange>,
    /// v3 only: range inside signed data
    pub signed_sdk: Option<SdkRange>,
}

impl<'a> SignerBlock<'a> {
    /// Parses the `signers` sequence of a v2 or v3 block value.
    pub fn parse_all(scheme: Scheme, value: &'a [u8]) -> Result<Vec<Self>, InspectError> {
        let mut outer = ByteReader::new(value, "signers");
        let signers = outer.read_nested("signers")?.read_sequence()?;
        if !outer.is_empty() {
            return Err(FormatError::malformed(
                "signers",
                format!("{} trailing bytes after signer sequence", outer.remaining()),
            )
            .into());
        }
        if signers.is_empty() {
            return Err(InspectError::verification(scheme, "no signers"));
        }
        signers
            .into_iter()
            .map(|bytes| Self::parse(scheme, bytes))
            .collect()
    }

    pub fn parse(scheme: Scheme, bytes: &'a [u8]) -> Result<Self, InspectError> {
        let with_sdk = scheme == Scheme::V3;
        let mut r = ByteReader::new(bytes, "signer");

        let signed_data = r.read_prefixed()?;
        let sdk = if with_sdk {
            Some(read_sdk_range(&mut r)?)
        } else {
            None
        };
        let signatures = prefixed_pairs(r.read_nested("signatures")?)?;
        let public_key = r.read_prefixed()?;

        let mut sd = ByteReader::new(signed_data, "signed data");
        let digests = prefixed_pairs(sd.read_nested("digests")?)?;
        let certificates = sd.read_nested("certificates")?.read_sequence()?;
        let signed_sdk = if with_sdk {
            Some(read_sdk_range(&mut sd)?)
        } else {
            None
        };
        let additional_attributes = sd
            .read_nested("additional attributes")?
            .read_id_value_sequence()?;

        Ok(Self {
            signed_data,
            digests,
            certificates,
            additional_attributes,
            signatures,
            public_key,
            sdk,
            signed_sdk,
        })
    }

    pub fn attribute(&self, id: u32) -> Option<&'a [u8]> {
        self.additional_attributes
            .iter()
            .find(|(k, _)| *k == id)
            .map(|(_, v)| *v)
    }

    /// Strongest verifiable algorithm; the first one wins ties.
    pub fn best_signature(&self) -> Option<(SignatureAlgorithm, &'a [u8])> {
        let mut best: Option<(SignatureAlgorithm, &'a [u8])> = None;
        for (id, sig) in &self.signatures {
            let Some(alg) = SignatureAlgorithm::from_id(*id) else {
                continue;
            };
            if !alg.is_verifiable() {
                continue;
            }
            match best {
                Some((current, _)) if current.rank() >= alg.rank() => {}
                _ => best = Some((alg, *sig)),
            }
        }
        best
    }

    /// Checks signature, digest list, content digest and certificate key.
    /// Returns the decoded certificates.
    pub fn verify(
        &self,
        scheme: Scheme,
        ctx: &VerificationContext<'_>,
    ) -> Result<Vec<Certificate>, InspectError> {
        let (alg, sig) = self
            .best_signature()
            .ok_or_else(|| InspectError::verification(scheme, "no supported signature algorithm"))?;
        ctx.ui.debug(&format!("{} signer uses {}", scheme, alg.name()));

        let key = PublicKeyInfo::from_spki_der(self.public_key)?;
        CryptoEngine::verify_signature(scheme, alg, &key.key_data, self.signed_data, sig)?;

        let signature_ids: Vec<u32> = self.signatures.iter().map(|(id, _)| *id).collect();
        let digest_ids: Vec<u32> = self.digests.iter().map(|(id, _)| *id).collect();
        if signature_ids != digest_ids {
            return Err(InspectError::verification(
                scheme,
                "signature and digest algorithm lists differ",
            ));
        }

        let declared = self
            .digests
            .iter()
            .find(|(id, _)| *id == alg.id())
            .map(|(_, d)| *d)
            .ok_or_else(|| InspectError::verification(scheme, "no digest for signature algorithm"))?;
        let content_digest = alg.content_digest();
        let actual = ctx
            .content_digest(content_digest)
            .ok_or(InspectError::SignatureNotFound(scheme))?;
        if declared != actual {
            return Err(InspectError::verification(
                scheme,
                format!("{} content digest mismatch", content_digest.name()),
            ));
        }

        let certificates = self
            .certificates
            .iter()
            .map(|der| Certificate::from_der(der))
            .collect::<Result<Vec<_>, _>>()?;
        let first = certificates
            .first()
            .ok_or_else(|| InspectError::verification(scheme, "no certificates"))?;
        if first.public_key.spki_der != self.public_key {
            return Err(InspectError::verification(
                scheme,
                "public key does not match first certificate",
            ));
        }
        Ok(certificates)
    }
}

fn read_sdk_range(r: &mut ByteReader<'_>) -> Result<SdkRange, FormatError> {
    Ok(SdkRange {
        min: r.read_u32()?,
        max: r.read_u32()?,
    })
}

/// `(u32 id, lp(value))` records where the value carries its own prefix.
fn prefixed_pairs<'a>(mut r: ByteReader<'a>) -> Result<Vec<(u32, &'a [u8])>, FormatError> {
    r.read_id_value_sequence()?
        .into_iter()
        .map(|(id, rest)| {
            let mut inner = ByteReader::new(rest, "length-prefixed value");
            Ok((id, inner.read_prefixed()?))
        })
        .collect()
}
