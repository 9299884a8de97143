/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Builders for signed test packages.

#![allow(dead_code)]

use apkinspect::{
    archive::ZipLayout,
    certificate::Certificate,
    crypto::{ContentDigest, CryptoEngine, SignatureAlgorithm},
    signing_block::{APK_SIG_BLOCK_MAGIC, V2_BLOCK_ID, V3_BLOCK_ID},
};
use ring::{
    rand::SystemRandom,
    signature::{
        EcdsaKeyPair, RsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING, RSA_PKCS1_SHA256,
        RSA_PKCS1_SHA512, RSA_PSS_SHA256, RSA_PSS_SHA512,
    },
};
use std::io::{Cursor, Write};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

pub const SIGNER_KEY: &[u8] = include_bytes!("../test-assets/signer_key.pem");
pub const SIGNER_CERT: &[u8] = include_bytes!("../test-assets/signer_cert.pem");
pub const ROTATED_KEY: &[u8] = include_bytes!("../test-assets/rotated_key.pem");
pub const ROTATED_CERT: &[u8] = include_bytes!("../test-assets/rotated_cert.pem");
pub const EC_KEY: &[u8] = include_bytes!("../test-assets/ec_key.pem");
pub const EC_CERT: &[u8] = include_bytes!("../test-assets/ec_cert.pem");

pub const V1_MANIFEST: &[u8] = include_bytes!("../test-assets/v1/MANIFEST.MF");
pub const V1_CERT_SF: &[u8] = include_bytes!("../test-assets/v1/CERT.SF");
pub const V1_CERT_RSA: &[u8] = include_bytes!("../test-assets/v1/CERT.RSA");
pub const V1_STRIPPED_SF: &[u8] = include_bytes!("../test-assets/v1/STRIPPED.SF");
pub const V1_STRIPPED_RSA: &[u8] = include_bytes!("../test-assets/v1/STRIPPED.RSA");

pub const RSA_PSS_SHA256_ID: u32 = 0x0101;
pub const RSA_PSS_SHA512_ID: u32 = 0x0102;
pub const RSA_PKCS1_SHA256_ID: u32 = 0x0103;
pub const RSA_PKCS1_SHA512_ID: u32 = 0x0104;
pub const ECDSA_SHA256_ID: u32 = 0x0201;

pub enum TestKey {
    Rsa(RsaKeyPair),
    Ecdsa(EcdsaKeyPair),
}

/// A private key paired with its certificate.
pub struct TestSigner {
    pub key: TestKey,
    pub cert: Certificate,
}

impl TestSigner {
    pub fn load(key_pem: &[u8], cert_pem: &[u8]) -> Self {
        let pkcs8 = pem::parse(key_pem).unwrap();
        Self {
            key: TestKey::Rsa(RsaKeyPair::from_pkcs8(pkcs8.contents()).unwrap()),
            cert: Certificate::from_pem_or_der(cert_pem, None).unwrap(),
        }
    }

    /// P-256 key; signs with ECDSA-SHA256 whatever id is asked for.
    pub fn ec() -> Self {
        let pkcs8 = pem::parse(EC_KEY).unwrap();
        let key = EcdsaKeyPair::from_pkcs8(
            &ECDSA_P256_SHA256_ASN1_SIGNING,
            pkcs8.contents(),
            &SystemRandom::new(),
        )
        .unwrap();
        Self {
            key: TestKey::Ecdsa(key),
            cert: Certificate::from_pem_or_der(EC_CERT, None).unwrap(),
        }
    }

    pub fn debug() -> Self {
        Self::load(SIGNER_KEY, SIGNER_CERT)
    }

    pub fn rotated() -> Self {
        Self::load(ROTATED_KEY, ROTATED_CERT)
    }

    pub fn sign(&self, alg_id: u32, message: &[u8]) -> Vec<u8> {
        let rng = SystemRandom::new();
        match &self.key {
            TestKey::Rsa(key) => {
                let padding: &'static dyn ring::signature::RsaEncoding = match alg_id {
                    RSA_PSS_SHA256_ID => &RSA_PSS_SHA256,
                    RSA_PSS_SHA512_ID => &RSA_PSS_SHA512,
                    RSA_PKCS1_SHA512_ID => &RSA_PKCS1_SHA512,
                    _ => &RSA_PKCS1_SHA256,
                };
                let mut sig = vec![0u8; key.public().modulus_len()];
                key.sign(padding, &rng, message, &mut sig).unwrap();
                sig
            }
            TestKey::Ecdsa(key) => key.sign(&rng, message).unwrap().as_ref().to_vec(),
        }
    }
}

pub fn lp(data: &[u8]) -> Vec<u8> {
    let mut out = (data.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(data);
    out
}

/// `lp(u32 id || lp(value))`
fn id_lp(id: u32, value: &[u8]) -> Vec<u8> {
    let mut rec = id.to_le_bytes().to_vec();
    rec.extend(lp(value));
    lp(&rec)
}

/// `lp(u32 id || value)`
pub fn attribute(id: u32, value: &[u8]) -> Vec<u8> {
    let mut rec = id.to_le_bytes().to_vec();
    rec.extend_from_slice(value);
    lp(&rec)
}

/// Stored ZIP with the given entries.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, opts).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Entries of an APK carrying the v1 fixture signature.
pub fn v1_entries() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("AndroidManifest.xml", b"<manifest/>".as_slice()),
        ("classes.dex", b"dex\n035\0".as_slice()),
        ("META-INF/MANIFEST.MF", V1_MANIFEST),
        ("META-INF/CERT.SF", V1_CERT_SF),
        ("META-INF/CERT.RSA", V1_CERT_RSA),
    ]
}

/// Content digest the signing block will cover once inserted into `zip`.
pub fn content_digest(zip: &[u8], alg: ContentDigest) -> Vec<u8> {
    let layout = ZipLayout::locate(zip).unwrap();
    CryptoEngine::chunked_digest(
        alg,
        &[
            &zip[..layout.cd_offset],
            layout.central_directory(zip),
            &zip[layout.eocd_offset..],
        ],
    )
}

fn digest_for(alg_id: u32) -> ContentDigest {
    SignatureAlgorithm::from_id(alg_id)
        .map(|a| a.content_digest())
        .unwrap_or(ContentDigest::Sha256)
}

/// Options for one v2/v3 signer record.
pub struct SignerOptions<'a> {
    pub signer: &'a TestSigner,
    pub alg_id: u32,
    pub sdk: Option<(u32, u32)>,
    pub signed_sdk: Option<(u32, u32)>,
    pub attributes: Vec<Vec<u8>>,
}

impl<'a> SignerOptions<'a> {
    pub fn v2(signer: &'a TestSigner, alg_id: u32) -> Self {
        Self {
            signer,
            alg_id,
            sdk: None,
            signed_sdk: None,
            attributes: Vec::new(),
        }
    }

    pub fn v3(signer: &'a TestSigner, alg_id: u32) -> Self {
        Self {
            signer,
            alg_id,
            sdk: Some((24, u32::MAX)),
            signed_sdk: Some((24, u32::MAX)),
            attributes: Vec::new(),
        }
    }

    /// Encodes the signer record for an unsigned `zip`.
    pub fn encode(&self, zip: &[u8]) -> Vec<u8> {
        let digest = content_digest(zip, digest_for(self.alg_id));

        let mut signed = lp(&id_lp(self.alg_id, &digest));
        signed.extend(lp(&lp(self.signer.cert.der())));
        if let Some((min, max)) = self.signed_sdk {
            signed.extend(min.to_le_bytes());
            signed.extend(max.to_le_bytes());
        }
        signed.extend(lp(&self.attributes.concat()));

        let signature = self.signer.sign(self.alg_id, &signed);
        let mut record = lp(&signed);
        if let Some((min, max)) = self.sdk {
            record.extend(min.to_le_bytes());
            record.extend(max.to_le_bytes());
        }
        record.extend(lp(&id_lp(self.alg_id, &signature)));
        record.extend(lp(&self.signer.cert.public_key.spki_der));
        record
    }
}

/// Block value holding the given signer records.
pub fn signers_value(records: &[Vec<u8>]) -> Vec<u8> {
    let seq: Vec<u8> = records.iter().flat_map(|r| lp(r)).collect();
    lp(&seq)
}

/// Serialises an APK Signing Block with the given pairs.
pub fn signing_block(pairs: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (id, value) in pairs {
        body.extend(((value.len() + 4) as u64).to_le_bytes());
        body.extend(id.to_le_bytes());
        body.extend_from_slice(value);
    }
    let size = (body.len() + 24) as u64;
    let mut block = size.to_le_bytes().to_vec();
    block.extend(body);
    block.extend(size.to_le_bytes());
    block.extend_from_slice(APK_SIG_BLOCK_MAGIC);
    block
}

/// Inserts `block` before the central directory and fixes the EOCD.
pub fn insert_block(zip: &[u8], block: &[u8]) -> Vec<u8> {
    let layout = ZipLayout::locate(zip).unwrap();
    let mut out = zip[..layout.cd_offset].to_vec();
    out.extend_from_slice(block);
    out.extend_from_slice(layout.central_directory(zip));
    out.extend(layout.eocd_with_cd_offset(zip, layout.cd_offset + block.len()));
    out
}

/// Signs `zip` with one v2 signer.
pub fn sign_v2(zip: &[u8], signer: &TestSigner, alg_id: u32) -> Vec<u8> {
    let record = SignerOptions::v2(signer, alg_id).encode(zip);
    insert_block(zip, &signing_block(&[(V2_BLOCK_ID, signers_value(&[record]))]))
}

/// Signs `zip` with one v3 signer.
pub fn sign_v3(zip: &[u8], opts: &SignerOptions<'_>) -> Vec<u8> {
    let record = opts.encode(zip);
    insert_block(zip, &signing_block(&[(V3_BLOCK_ID, signers_value(&[record]))]))
}

/// Proof-of-rotation value; each `(signer, alg)` signs the following node.
pub fn lineage(levels: &[(&TestSigner, u32)], forge_with: Option<&TestSigner>) -> Vec<u8> {
    let mut out = 1u32.to_le_bytes().to_vec();
    let mut previous: Option<(&TestSigner, u32)> = None;
    for &(signer, alg_id) in levels {
        let mut signed = lp(signer.cert.der());
        signed.extend(previous.map_or(0, |(_, a)| a).to_le_bytes());

        let signature = match previous {
            Some((prev, prev_alg)) => forge_with.unwrap_or(prev).sign(prev_alg, &signed),
            None => Vec::new(),
        };
        let mut node = lp(&signed);
        node.extend(0u32.to_le_bytes());
        node.extend(alg_id.to_le_bytes());
        node.extend(lp(&signature));
        out.extend(lp(&node));
        previous = Some((signer, alg_id));
    }
    out
}
