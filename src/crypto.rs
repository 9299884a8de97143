/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Hashing and signature primitives shared by every signature scheme.

use crate::{certificate::KeyKind, error::InspectError, ui::Ui, verification::Scheme};
use rayon::prelude::*;
use ring::{digest, signature};

/// Chunk size used by the v2/v3 content digest.
pub const CHUNK_SIZE: usize = 1024 * 1024;

const CHUNK_PREFIX: u8 = 0xa5;
const TOP_LEVEL_PREFIX: u8 = 0x5a;

/// Content digest families used by the APK Signing Block schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentDigest {
    Sha256,
    Sha512,
}

impl ContentDigest {
    fn algorithm(self) -> &'static digest::Algorithm {
        match self {
            ContentDigest::Sha256 => &digest::SHA256,
            ContentDigest::Sha512 => &digest::SHA512,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ContentDigest::Sha256 => "SHA-256",
            ContentDigest::Sha512 => "SHA-512",
        }
    }
}

/// Signature algorithm ids found in v2/v3 signer blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    RsaPssSha256,
    RsaPssSha512,
    RsaPkcs1Sha256,
    RsaPkcs1Sha512,
    EcdsaSha256,
    EcdsaSha512,
    DsaSha256,
}

impl SignatureAlgorithm {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0x0101 => Some(Self::RsaPssSha256),
            0x0102 => Some(Self::RsaPssSha512),
            0x0103 => Some(Self::RsaPkcs1Sha256),
            0x0104 => Some(Self::RsaPkcs1Sha512),
            0x0201 => Some(Self::EcdsaSha256),
            0x0202 => Some(Self::EcdsaSha512),
            0x0301 => Some(Self::DsaSha256),
            _ => None,
        }
    }

    pub fn id(self) -> u32 {
        match self {
            Self::RsaPssSha256 => 0x0101,
            Self::RsaPssSha512 => 0x0102,
            Self::RsaPkcs1Sha256 => 0x0103,
            Self::RsaPkcs1Sha512 => 0x0104,
            Self::EcdsaSha256 => 0x0201,
            Self::EcdsaSha512 => 0x0202,
            Self::DsaSha256 => 0x0301,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::RsaPssSha256 => "RSASSA-PSS with SHA2-256",
            Self::RsaPssSha512 => "RSASSA-PSS with SHA2-512",
            Self::RsaPkcs1Sha256 => "RSASSA-PKCS1-v1_5 with SHA2-256",
            Self::RsaPkcs1Sha512 => "RSASSA-PKCS1-v1_5 with SHA2-512",
            Self::EcdsaSha256 => "ECDSA with SHA2-256",
            Self::EcdsaSha512 => "ECDSA with SHA2-512",
            Self::DsaSha256 => "DSA with SHA2-256",
        }
    }

    pub fn content_digest(self) -> ContentDigest {
        match self {
            Self::RsaPssSha512 | Self::RsaPkcs1Sha512 | Self::EcdsaSha512 => ContentDigest::Sha512,
            _ => ContentDigest::Sha256,
        }
    }

    /// ring has no ECDSA-SHA512 or DSA verifier.
    pub fn is_verifiable(self) -> bool {
        !matches!(self, Self::EcdsaSha512 | Self::DsaSha256)
    }

    /// Preference order when a signer offers several algorithms.
    pub fn rank(self) -> u8 {
        match self.content_digest() {
            ContentDigest::Sha512 => 2,
            ContentDigest::Sha256 => 1,
        }
    }

    fn verification_algorithm(
        self,
        key: &[u8],
    ) -> Option<&'static dyn signature::VerificationAlgorithm> {
        match self {
            Self::RsaPssSha256 => Some(&signature::RSA_PSS_2048_8192_SHA256),
            Self::RsaPssSha512 => Some(&signature::RSA_PSS_2048_8192_SHA512),
            Self::RsaPkcs1Sha256 => Some(&signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY),
            Self::RsaPkcs1Sha512 => Some(&signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY),
            Self::EcdsaSha256 => match ec_curve(key)? {
                EcCurve::P256 => Some(&signature::ECDSA_P256_SHA256_ASN1),
                EcCurve::P384 => Some(&signature::ECDSA_P384_SHA256_ASN1),
            },
            Self::EcdsaSha512 | Self::DsaSha256 => None,
        }
    }
}

/// Message digests referenced by PKCS#7 signer infos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDigest {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl MessageDigest {
    fn algorithm(self) -> &'static digest::Algorithm {
        match self {
            MessageDigest::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            MessageDigest::Sha256 => &digest::SHA256,
            MessageDigest::Sha384 => &digest::SHA384,
            MessageDigest::Sha512 => &digest::SHA512,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageDigest::Sha1 => "SHA-1",
            MessageDigest::Sha256 => "SHA-256",
            MessageDigest::Sha384 => "SHA-384",
            MessageDigest::Sha512 => "SHA-512",
        }
    }

    fn verification_algorithm(
        self,
        kind: &KeyKind,
        key: &[u8],
    ) -> Option<&'static dyn signature::VerificationAlgorithm> {
        match (kind, self) {
            (KeyKind::Rsa, MessageDigest::Sha1) => {
                Some(&signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY)
            }
            (KeyKind::Rsa, MessageDigest::Sha256) => {
                Some(&signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY)
            }
            (KeyKind::Rsa, MessageDigest::Sha384) => Some(&signature::RSA_PKCS1_2048_8192_SHA384),
            (KeyKind::Rsa, MessageDigest::Sha512) => {
                Some(&signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY)
            }
            (KeyKind::Ec, MessageDigest::Sha256) => match ec_curve(key)? {
                EcCurve::P256 => Some(&signature::ECDSA_P256_SHA256_ASN1),
                EcCurve::P384 => Some(&signature::ECDSA_P384_SHA256_ASN1),
            },
            (KeyKind::Ec, MessageDigest::Sha384) => match ec_curve(key)? {
                EcCurve::P256 => Some(&signature::ECDSA_P256_SHA384_ASN1),
                EcCurve::P384 => Some(&signature::ECDSA_P384_SHA384_ASN1),
            },
            _ => None,
        }
    }
}

enum EcCurve {
    P256,
    P384,
}

/// Uncompressed points only: 0x04 || X || Y.
fn ec_curve(key: &[u8]) -> Option<EcCurve> {
    match key.len() {
        65 => Some(EcCurve::P256),
        97 => Some(EcCurve::P384),
        _ => None,
    }
}

pub struct CryptoEngine;

impl CryptoEngine {
    pub fn digest(alg: MessageDigest, data: &[u8]) -> Vec<u8> {
        digest::digest(alg.algorithm(), data).as_ref().to_vec()
    }

    pub fn compute_sha1(data: &[u8]) -> String {
        hex::encode(digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, data))
    }

    pub fn compute_sha256(data: &[u8]) -> String {
        hex::encode(digest::digest(&digest::SHA256, data))
    }

    /// Computes the v2/v3 content digest over the given sections.
    ///
    /// Every section is split into 1 MiB chunks; each chunk is hashed as
    /// `0xa5 || u32le(len) || chunk` and the results are folded into
    /// `0x5a || u32le(count) || digests`. Empty sections contribute nothing.
    pub fn chunked_digest(alg: ContentDigest, sections: &[&[u8]]) -> Vec<u8> {
        Self::chunked_digest_with_ui(alg, sections, None)
    }

    pub fn chunked_digest_with_ui(
        alg: ContentDigest,
        sections: &[&[u8]],
        ui: Option<&Ui>,
    ) -> Vec<u8> {
        let algorithm = alg.algorithm();
        let chunks: Vec<&[u8]> = sections
            .iter()
            .flat_map(|section| section.chunks(CHUNK_SIZE))
            .collect();

        if let Some(ui) = ui {
            if ui.debug {
                ui.debug(&format!(
                    "{} content digest: {} chunks over {} sections",
                    alg.name(),
                    chunks.len(),
                    sections.len()
                ));
            }
        }

        let chunk_digests: Vec<digest::Digest> = chunks
            .par_iter()
            .map(|chunk| {
                let mut ctx = digest::Context::new(algorithm);
                ctx.update(&[CHUNK_PREFIX]);
                ctx.update(&(chunk.len() as u32).to_le_bytes());
                ctx.update(chunk);
                ctx.finish()
            })
            .collect();

        let mut top = digest::Context::new(algorithm);
        top.update(&[TOP_LEVEL_PREFIX]);
        top.update(&(chunk_digests.len() as u32).to_le_bytes());
        for d in &chunk_digests {
            top.update(d.as_ref());
        }
        top.finish().as_ref().to_vec()
    }

    /// Verifies a v2/v3 signature with the raw subject public key bytes.
    pub fn verify_signature(
        scheme: Scheme,
        alg: SignatureAlgorithm,
        public_key: &[u8],
        message: &[u8],
        sig: &[u8],
    ) -> Result<(), InspectError> {
        let verifier = alg.verification_algorithm(public_key).ok_or_else(|| {
            InspectError::verification(scheme, format!("unsupported algorithm: {}", alg.name()))
        })?;
        signature::UnparsedPublicKey::new(verifier, public_key)
            .verify(message, sig)
            .map_err(|_| {
                InspectError::verification(scheme, format!("{} signature did not verify", alg.name()))
            })
    }

    /// Verifies a PKCS#7 signer info signature.
    pub fn verify_legacy_signature(
        kind: &KeyKind,
        alg: MessageDigest,
        public_key: &[u8],
        message: &[u8],
        sig: &[u8],
    ) -> Result<(), InspectError> {
        let verifier = alg
            .verification_algorithm(kind, public_key)
            .ok_or_else(|| {
                InspectError::verification(
                    Scheme::V1,
                    format!("unsupported {} key with {}", kind, alg.name()),
                )
            })?;
        signature::UnparsedPublicKey::new(verifier, public_key)
            .verify(message, sig)
            .map_err(|_| InspectError::verification(Scheme::V1, "signer info signature did not verify"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_sha256_known_answer() {
        let d = CryptoEngine::chunked_digest(ContentDigest::Sha256, &[b"hello", b"", b"world"]);
        assert_eq!(
            hex::encode(d),
            "1e0404ca04a3a69308f66af7e263d7884f25f6e4ddd8fb4b72ed8d0c77f6601b"
        );
    }

    #[test]
    fn chunked_sha512_known_answer() {
        let d = CryptoEngine::chunked_digest(ContentDigest::Sha512, &[b"hello", b"", b"world"]);
        assert_eq!(
            hex::encode(d),
            "819e353ff8384764186ea54f10bf6bc03a0e3a97c8c9cdf557029be94128a73e\
             7b5359f005d768b5a5957a11389c7b9f2ceb8cec077ea98f4094781bf65cbfae"
        );
    }

    #[test]
    fn chunk_boundary_splits_section() {
        let big = vec![0x42u8; CHUNK_SIZE + 1];
        let d = CryptoEngine::chunked_digest(ContentDigest::Sha256, &[&big]);
        assert_eq!(
            hex::encode(d),
            "f13b00967d03c0dfbddce6faa873ea2c547673df0d9e64a1d8e6d06989b2930b"
        );
    }

    #[test]
    fn no_sections_hashes_header_only() {
        let d = CryptoEngine::chunked_digest(ContentDigest::Sha256, &[]);
        assert_eq!(
            hex::encode(d),
            "1043190b67a6bc391c83a3770c7c1fc51f694c6326bfc07b2b5cdc2f2732c4e0"
        );
    }

    #[test]
    fn algorithm_ids() {
        for id in [0x0101, 0x0102, 0x0103, 0x0104, 0x0201, 0x0202, 0x0301] {
            assert_eq!(SignatureAlgorithm::from_id(id).map(|a| a.id()), Some(id));
        }
        assert!(SignatureAlgorithm::from_id(0x0421).is_none());
        assert!(SignatureAlgorithm::RsaPkcs1Sha512.rank() > SignatureAlgorithm::EcdsaSha256.rank());
    }

    #[test]
    fn dsa_is_reported_unsupported() {
        let err = CryptoEngine::verify_signature(
            Scheme::V2,
            SignatureAlgorithm::DsaSha256,
            &[0u8; 10],
            b"msg",
            b"sig",
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }
}
