/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Minimal PKCS#7 SignedData reader for JAR signature block files
//! (`META-INF/*.RSA`, `*.DSA`, `*.EC`).
//!
//! `simple_asn1` decodes the structure; raw DER slices are cut from the
//! original buffer by offset so that signed bytes are never re-encoded.
//! Only definite-length DER is accepted.

use crate::{
    crypto::MessageDigest,
    error::{FormatError, InspectError},
};
use simple_asn1::{oid, ASN1Block, ASN1Class, BigUint, OID};

const SET_TAG: u8 = 0x31;

/// The parts of a SignedData needed to verify a JAR signature.
#[derive(Debug, Clone)]
pub struct SignedData {
    /// DER certificates, in encoded order
    pub certificates: Vec<Vec<u8>>,
    pub signer_infos: Vec<SignerInfo>,
}

#[derive(Debug, Clone)]
pub struct SignerInfo {
    /// Raw DER of the issuer Name
    pub issuer: Vec<u8>,
    /// Big-endian two's complement serial number
    pub serial: Vec<u8>,
    /// `None` when the digest OID is not one we support
    pub digest_algorithm: Option<MessageDigest>,
    /// Authenticated attributes re-tagged as a DER SET
    pub authenticated_attributes: Option<Vec<u8>>,
    /// Value of the messageDigest authenticated attribute
    pub message_digest: Option<Vec<u8>>,
    pub signature: Vec<u8>,
}

impl SignerInfo {
    /// The bytes the signature covers: the authenticated attributes when
    /// present, the signed content otherwise.
    pub fn signed_bytes<'a>(&'a self, content: &'a [u8]) -> &'a [u8] {
        self.authenticated_attributes.as_deref().unwrap_or(content)
    }
}

fn malformed(detail: impl Into<String>) -> InspectError {
    FormatError::malformed("PKCS#7", detail).into()
}

fn oid_signed_data() -> OID {
    oid!(1, 2, 840, 113549, 1, 7, 2)
}

fn oid_message_digest() -> OID {
    oid!(1, 2, 840, 113549, 1, 9, 4)
}

fn digest_from_oid(oid: &OID) -> Option<MessageDigest> {
    [
        (oid!(1, 3, 14, 3, 2, 26), MessageDigest::Sha1),
        (oid!(2, 16, 840, 1, 101, 3, 4, 2, 1), MessageDigest::Sha256),
        (oid!(2, 16, 840, 1, 101, 3, 4, 2, 2), MessageDigest::Sha384),
        (oid!(2, 16, 840, 1, 101, 3, 4, 2, 3), MessageDigest::Sha512),
    ]
    .into_iter()
    .find(|(known, _)| known == oid)
    .map(|(_, alg)| alg)
}

/// Context-specific tag number of a constructed `[n]` element.
fn context_tag(block: &ASN1Block) -> Option<&BigUint> {
    match block {
        ASN1Block::Explicit(ASN1Class::ContextSpecific, _, tag, _) => Some(tag),
        ASN1Block::Unknown(ASN1Class::ContextSpecific, true, _, tag, _) => Some(tag),
        _ => None,
    }
}

fn is_context(block: &ASN1Block, n: u32) -> bool {
    context_tag(block).is_some_and(|tag| *tag == BigUint::from(n))
}

/// Header and content length of the TLV at `offset`.
fn tlv_header(der: &[u8], offset: usize) -> Result<(usize, usize), InspectError> {
    let byte = |i: usize| {
        der.get(i)
            .copied()
            .ok_or_else(|| malformed(format!("element at {} runs past end", offset)))
    };

    let mut pos = offset;
    if byte(pos)? & 0x1f == 0x1f {
        pos += 1;
        while byte(pos)? & 0x80 != 0 {
            pos += 1;
        }
    }
    pos += 1;

    let first = byte(pos)?;
    pos += 1;
    let content_len = match first {
        0x80 => return Err(malformed("indefinite-length encoding is not supported")),
        n if n < 0x80 => n as usize,
        n => {
            let count = (n & 0x7f) as usize;
            if count > 4 {
                return Err(malformed(format!("length of {} bytes is too large", count)));
            }
            let mut len = 0usize;
            for _ in 0..count {
                len = (len << 8) | byte(pos)? as usize;
                pos += 1;
            }
            len
        }
    };
    Ok((pos - offset, content_len))
}

/// The full TLV starting at `offset`.
fn raw_element(der: &[u8], offset: usize) -> Result<&[u8], InspectError> {
    let (header, content) = tlv_header(der, offset)?;
    let end = offset
        .checked_add(header + content)
        .filter(|end| *end <= der.len())
        .ok_or_else(|| malformed(format!("element at {} overruns the buffer", offset)))?;
    Ok(&der[offset..end])
}

/// Splits concatenated TLVs.
fn split_elements(content: &[u8]) -> Result<Vec<&[u8]>, InspectError> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < content.len() {
        let element = raw_element(content, pos)?;
        pos += element.len();
        out.push(element);
    }
    Ok(out)
}

/// Parses a DER ContentInfo wrapping a SignedData.
pub fn parse_signed_data(der: &[u8]) -> Result<SignedData, InspectError> {
    let blocks = simple_asn1::from_der(der).map_err(|e| malformed(e.to_string()))?;
    let content_info = match blocks.first() {
        Some(ASN1Block::Sequence(_, items)) => items,
        _ => return Err(malformed("ContentInfo is not a SEQUENCE")),
    };
    match content_info.first() {
        Some(ASN1Block::ObjectIdentifier(_, oid)) if *oid == oid_signed_data() => {}
        _ => return Err(malformed("content type is not signedData")),
    }
    let signed_data = match content_info.get(1) {
        Some(ASN1Block::Explicit(ASN1Class::ContextSpecific, _, _, inner)) => match inner.as_ref() {
            ASN1Block::Sequence(_, items) => items,
            _ => return Err(malformed("SignedData is not a SEQUENCE")),
        },
        _ => return Err(malformed("missing SignedData content")),
    };

    // version, digestAlgorithms, contentInfo, [0] certificates, [1] crls, signerInfos
    if signed_data.len() < 4 {
        return Err(malformed("SignedData has too few fields"));
    }
    let mut certificates = Vec::new();
    for block in &signed_data[3..signed_data.len() - 1] {
        if is_context(block, 0) {
            let raw = raw_element(der, block.offset())?;
            let (header, _) = tlv_header(der, block.offset())?;
            certificates.extend(split_elements(&raw[header..])?.into_iter().map(<[u8]>::to_vec));
        }
    }

    let signer_infos = match signed_data.last() {
        Some(ASN1Block::Set(_, infos)) => infos
            .iter()
            .map(|info| match info {
                ASN1Block::Sequence(_, fields) => parse_signer_info(der, fields),
                _ => Err(malformed("SignerInfo is not a SEQUENCE")),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(malformed("signerInfos is not a SET")),
    };

    Ok(SignedData {
        certificates,
        signer_infos,
    })
}

fn parse_signer_info(der: &[u8], fields: &[ASN1Block]) -> Result<SignerInfo, InspectError> {
    let mut it = fields.iter().skip(1).peekable();

    let (issuer, serial) = match it.next() {
        Some(ASN1Block::Sequence(_, parts)) => match (parts.first(), parts.get(1)) {
            (Some(name), Some(ASN1Block::Integer(_, serial))) => (
                raw_element(der, name.offset())?.to_vec(),
                serial.to_signed_bytes_be(),
            ),
            _ => return Err(malformed("bad issuerAndSerialNumber")),
        },
        _ => return Err(malformed("missing issuerAndSerialNumber")),
    };

    let digest_algorithm = match it.next() {
        Some(ASN1Block::Sequence(_, alg)) => match alg.first() {
            Some(ASN1Block::ObjectIdentifier(_, oid)) => digest_from_oid(oid),
            _ => return Err(malformed("bad digestAlgorithm")),
        },
        _ => return Err(malformed("missing digestAlgorithm")),
    };

    let mut authenticated_attributes = None;
    let mut message_digest = None;
    if it.peek().is_some_and(|block| is_context(block, 0)) {
        if let Some(block) = it.next() {
            let mut attrs = raw_element(der, block.offset())?.to_vec();
            attrs[0] = SET_TAG;
            message_digest = find_message_digest(&attrs)?;
            authenticated_attributes = Some(attrs);
        }
    }

    // digestEncryptionAlgorithm
    it.next();

    let signature = match it.next() {
        Some(ASN1Block::OctetString(_, sig)) => sig.clone(),
        _ => return Err(malformed("missing encryptedDigest")),
    };

    Ok(SignerInfo {
        issuer,
        serial,
        digest_algorithm,
        authenticated_attributes,
        message_digest,
        signature,
    })
}

fn find_message_digest(attrs_set: &[u8]) -> Result<Option<Vec<u8>>, InspectError> {
    let blocks = simple_asn1::from_der(attrs_set).map_err(|e| malformed(e.to_string()))?;
    let Some(ASN1Block::Set(_, attrs)) = blocks.first() else {
        return Err(malformed("authenticated attributes are not a SET"));
    };
    for attr in attrs {
        let ASN1Block::Sequence(_, parts) = attr else {
            continue;
        };
        if let (Some(ASN1Block::ObjectIdentifier(_, oid)), Some(ASN1Block::Set(_, values))) =
            (parts.first(), parts.get(1))
        {
            if *oid == oid_message_digest() {
                return match values.first() {
                    Some(ASN1Block::OctetString(_, d)) => Ok(Some(d.clone())),
                    _ => Err(malformed("messageDigest value is not an OCTET STRING")),
                };
            }
        }
    }
    Ok(None)
}
