/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! X.509 certificate model exposed by verification results.

use crate::{crypto::CryptoEngine, error::InspectError, ui::Ui};
use ::pem as pem_crate;
use std::{fmt, fs, path::Path};
use x509_parser::prelude::*;

const OID_RSA: &str = "1.2.840.113549.1.1.1";
const OID_EC: &str = "1.2.840.10045.2.1";
const OID_DSA: &str = "1.2.840.10040.4.1";
const OID_ED25519: &str = "1.3.101.112";
const PEM_ARMOR: &[u8] = b"-----BEGIN";

/// Public key family, taken from the SubjectPublicKeyInfo algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyKind {
    Rsa,
    Ec,
    Dsa,
    Ed25519,
    Other(String),
}

impl KeyKind {
    fn from_oid(oid: &str) -> Self {
        match oid {
            OID_RSA => KeyKind::Rsa,
            OID_EC => KeyKind::Ec,
            OID_DSA => KeyKind::Dsa,
            OID_ED25519 => KeyKind::Ed25519,
            other => KeyKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Rsa => write!(f, "RSA"),
            KeyKind::Ec => write!(f, "EC"),
            KeyKind::Dsa => write!(f, "DSA"),
            KeyKind::Ed25519 => write!(f, "Ed25519"),
            KeyKind::Other(oid) => write!(f, "unknown ({})", oid),
        }
    }
}

/// A decoded SubjectPublicKeyInfo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyInfo {
    pub kind: KeyKind,
    /// Full DER encoding of the SubjectPublicKeyInfo
    pub spki_der: Vec<u8>,
    /// Contents of the subjectPublicKey bit string, as consumed by ring
    pub key_data: Vec<u8>,
}

impl PublicKeyInfo {
    pub fn from_spki_der(der: &[u8]) -> Result<Self, InspectError> {
        let (_, spki) = SubjectPublicKeyInfo::from_der(der)
            .map_err(|e| InspectError::Certificate(format!("Invalid public key: {}", e)))?;
        Ok(Self::from_parsed(&spki))
    }

    fn from_parsed(spki: &SubjectPublicKeyInfo<'_>) -> Self {
        Self {
            kind: KeyKind::from_oid(&spki.algorithm.algorithm.to_id_string()),
            spki_der: spki.raw.to_vec(),
            key_data: spki.subject_public_key.data.to_vec(),
        }
    }
}

/// A signer certificate. Two certificates are the same identity when their
/// DER encodings are byte-equal.
#[derive(Debug, Clone)]
pub struct Certificate {
    pub subject: String,
    pub issuer: String,
    /// Serial number as upper-case hex
    pub serial: String,
    /// Validity window in unix seconds
    pub not_before: i64,
    pub not_after: i64,
    pub not_before_display: String,
    pub not_after_display: String,
    /// Signature algorithm OID in dotted form
    pub signature_algorithm: String,
    pub public_key: PublicKeyInfo,
    der: Vec<u8>,
    issuer_raw: Vec<u8>,
    serial_raw: Vec<u8>,
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl Certificate {
    pub fn from_der(der: &[u8]) -> Result<Self, InspectError> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| InspectError::Certificate(format!("Invalid certificate: {}", e)))?;

        let validity = cert.validity();
        Ok(Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: hex::encode_upper(cert.raw_serial()),
            not_before: validity.not_before.timestamp(),
            not_after: validity.not_after.timestamp(),
            not_before_display: validity.not_before.to_string(),
            not_after_display: validity.not_after.to_string(),
            signature_algorithm: cert.signature_algorithm.algorithm.to_id_string(),
            public_key: PublicKeyInfo::from_parsed(cert.public_key()),
            der: der.to_vec(),
            issuer_raw: cert.tbs_certificate.issuer.as_raw().to_vec(),
            serial_raw: cert.raw_serial().to_vec(),
        })
    }

    /// Accepts either a PEM `CERTIFICATE` block or raw DER.
    ///
    /// Input that carries a PEM armor line must parse as PEM.
    pub fn from_pem_or_der(content: &[u8], ui: Option<&Ui>) -> Result<Self, InspectError> {
        if content.windows(PEM_ARMOR.len()).any(|w| w == PEM_ARMOR) {
            let pem = pem_crate::parse(content)?;
            return Self::from_der(pem.contents());
        }
        if let Some(ui) = ui {
            ui.debug("Input is not PEM, attempting to parse as binary X.509 DER...");
        }
        Self::from_der(content)
    }

    pub fn load(path: &Path, ui: &Ui) -> Result<Self, InspectError> {
        ui.debug(&format!("Loading certificate: {}", path.display()));
        let content = fs::read(path)?;
        Self::from_pem_or_der(&content, Some(ui))
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn sha1_fingerprint(&self) -> String {
        CryptoEngine::compute_sha1(&self.der)
    }

    pub fn sha256_fingerprint(&self) -> String {
        CryptoEngine::compute_sha256(&self.der)
    }

    pub fn is_valid_at(&self, unix_time: i64) -> bool {
        self.not_before <= unix_time && unix_time <= self.not_after
    }

    /// Matches a PKCS#7 IssuerAndSerialNumber.
    pub(crate) fn matches_issuer_serial(&self, issuer_raw: &[u8], serial: &[u8]) -> bool {
        self.issuer_raw == issuer_raw && self.serial_raw == serial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNER_CERT: &[u8] = include_bytes!("../tests/test-assets/signer_cert.pem");
    const ROTATED_CERT: &[u8] = include_bytes!("../tests/test-assets/rotated_cert.pem");
    const EC_CERT: &[u8] = include_bytes!("../tests/test-assets/ec_cert.pem");

    #[test]
    fn parses_pem_certificate() {
        let cert = Certificate::from_pem_or_der(SIGNER_CERT, None).unwrap();
        assert!(cert.subject.contains("CN=Android Debug"));
        assert_eq!(cert.subject, cert.issuer);
        assert_eq!(cert.serial, "5C9234C91108C62CD0449B404065B74A84EF52D8");
        assert_eq!(cert.public_key.kind, KeyKind::Rsa);
        assert!(cert.not_before < cert.not_after);
        assert_eq!(cert.sha256_fingerprint().len(), 64);
        assert_eq!(cert.sha1_fingerprint().len(), 40);
    }

    #[test]
    fn der_round_trips_identity() {
        let cert = Certificate::from_pem_or_der(SIGNER_CERT, None).unwrap();
        let again = Certificate::from_pem_or_der(cert.der(), None).unwrap();
        assert_eq!(cert, again);

        let other = Certificate::from_pem_or_der(ROTATED_CERT, None).unwrap();
        assert_ne!(cert, other);
    }

    #[test]
    fn spki_matches_certificate_key() {
        let cert = Certificate::from_pem_or_der(SIGNER_CERT, None).unwrap();
        let key = PublicKeyInfo::from_spki_der(&cert.public_key.spki_der).unwrap();
        assert_eq!(key, cert.public_key);
    }

    #[test]
    fn validity_window() {
        let cert = Certificate::from_pem_or_der(SIGNER_CERT, None).unwrap();
        assert!(cert.is_valid_at(cert.not_before));
        assert!(!cert.is_valid_at(cert.not_after + 1));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Certificate::from_pem_or_der(b"not a certificate", None).is_err());
    }

    #[test]
    fn broken_pem_reports_pem_error() {
        let err = Certificate::from_pem_or_der(
            b"-----BEGIN CERTIFICATE-----\n!!not base64!!\n-----END CERTIFICATE-----\n",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, InspectError::Pem(_)));
    }

    #[test]
    fn parses_ec_certificate() {
        let cert = Certificate::from_pem_or_der(EC_CERT, None).unwrap();
        assert_eq!(cert.public_key.kind, KeyKind::Ec);
        assert_eq!(cert.public_key.key_data.len(), 65);
        assert_eq!(cert.public_key.key_data[0], 0x04);
    }
}
