/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! JAR signature scheme (v1).
//!
//! Checks each `META-INF/*.RSA|DSA|EC` signature block against its `.SF`
//! file. Per-entry digests in the `.SF` and `MANIFEST.MF` are not checked.

use crate::{
    archive::Archive,
    certificate::Certificate,
    crypto::CryptoEngine,
    error::InspectError,
    pkcs7::{self, SignedData},
    signing_block::{SigningBlock, V2_BLOCK_ID, V3_BLOCK_ID},
    ui::Ui,
    verification::{Scheme, SchemeVerifier, VerificationContext, VerificationResult},
};

pub const MANIFEST_NAME: &str = "META-INF/MANIFEST.MF";
const APK_SIGNED_HEADER: &str = "X-Android-APK-Signed";
const SIGNATURE_BLOCK_EXTENSIONS: [&str; 3] = ["RSA", "DSA", "EC"];

pub struct V1Verifier;

impl SchemeVerifier for V1Verifier {
    fn scheme(&self) -> Scheme {
        Scheme::V1
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> Result<VerificationResult, InspectError> {
        let mut archive = Archive::open(ctx.bytes)?;
        let mut block_files: Vec<String> = archive
            .names()
            .into_iter()
            .filter(|name| is_signature_block_file(name))
            .collect();
        if block_files.is_empty() {
            return Err(InspectError::SignatureNotFound(Scheme::V1));
        }
        block_files.sort();

        if !archive.contains(MANIFEST_NAME) {
            return Err(InspectError::verification(
                Scheme::V1,
                format!("{} is missing", MANIFEST_NAME),
            ));
        }

        let mut certificates = Vec::new();
        for block_name in &block_files {
            let sf_name = signature_file_name(block_name);
            ctx.ui.very_verbose(&format!("v1 signer: {} / {}", block_name, sf_name));

            let sf = archive.read(&sf_name).map_err(|e| match e {
                InspectError::EntryNotFound(_) => InspectError::verification(
                    Scheme::V1,
                    format!("{} has no matching {}", block_name, sf_name),
                ),
                other => other,
            })?;
            check_stripping(&sf, ctx.signing_block.as_ref())?;

            let block = archive.read(block_name)?;
            let signed_data = pkcs7::parse_signed_data(&block)?;
            certificates.extend(verify_signature_file(&signed_data, &sf, ctx.ui)?);
        }
        Ok(VerificationResult::verified(Scheme::V1, certificates))
    }
}

/// `META-INF/<name>.RSA|DSA|EC`, directly under `META-INF/`.
pub fn is_signature_block_file(name: &str) -> bool {
    let Some(file) = name.strip_prefix("META-INF/") else {
        return false;
    };
    if file.contains('/') {
        return false;
    }
    match file.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && SIGNATURE_BLOCK_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
        }
        None => false,
    }
}

fn signature_file_name(block_name: &str) -> String {
    match block_name.rsplit_once('.') {
        Some((stem, _)) => format!("{}.SF", stem),
        None => format!("{}.SF", block_name),
    }
}

/// Checks every signer info of a block file against the `.SF` bytes and
/// returns the certificate of each signer.
pub fn verify_signature_file(
    signed_data: &SignedData,
    sf: &[u8],
    ui: &Ui,
) -> Result<Vec<Certificate>, InspectError> {
    let certificates = signed_data
        .certificates
        .iter()
        .map(|der| Certificate::from_der(der))
        .collect::<Result<Vec<_>, _>>()?;
    if signed_data.signer_infos.is_empty() {
        return Err(InspectError::verification(Scheme::V1, "no signer infos"));
    }

    let mut signers = Vec::new();
    for info in &signed_data.signer_infos {
        let cert = certificates
            .iter()
            .find(|c| c.matches_issuer_serial(&info.issuer, &info.serial))
            .ok_or_else(|| {
                InspectError::verification(Scheme::V1, "no certificate matches signer info")
            })?;
        let alg = info
            .digest_algorithm
            .ok_or_else(|| InspectError::verification(Scheme::V1, "unsupported digest algorithm"))?;
        ui.debug(&format!("v1 signer {} uses {}", cert.subject, alg.name()));

        if info.authenticated_attributes.is_some() {
            let declared = info.message_digest.as_deref().ok_or_else(|| {
                InspectError::verification(Scheme::V1, "authenticated attributes lack messageDigest")
            })?;
            if declared != CryptoEngine::digest(alg, sf).as_slice() {
                return Err(InspectError::verification(
                    Scheme::V1,
                    ".SF digest does not match messageDigest",
                ));
            }
        }

        CryptoEngine::verify_legacy_signature(
            &cert.public_key.kind,
            alg,
            &cert.public_key.key_data,
            info.signed_bytes(sf),
            &info.signature,
        )?;
        signers.push(cert.clone());
    }
    Ok(signers)
}

/// A `.SF` naming v2 or v3 in `X-Android-APK-Signed` requires those blocks.
fn check_stripping(sf: &[u8], block: Option<&SigningBlock>) -> Result<(), InspectError> {
    let text = String::from_utf8_lossy(sf);
    let lines = unfold_lines(&text);
    let Some(value) = main_attribute(&lines, APK_SIGNED_HEADER) else {
        return Ok(());
    };
    for id in value.split(',').map(str::trim) {
        let (scheme, block_id) = match id {
            "2" => (Scheme::V2, V2_BLOCK_ID),
            "3" => (Scheme::V3, V3_BLOCK_ID),
            _ => continue,
        };
        if !block.is_some_and(|b| b.contains(block_id)) {
            return Err(InspectError::verification(
                Scheme::V1,
                format!(".SF claims {} but that signature was stripped", scheme),
            ));
        }
    }
    Ok(())
}

/// Joins manifest continuation lines (those starting with a space).
fn unfold_lines(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in s.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some(last) = out.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        out.push(line.to_string());
    }
    out
}

/// Header value from the main section, which ends at the first blank line.
fn main_attribute<'a>(lines: &'a [String], key: &str) -> Option<&'a str> {
    lines
        .iter()
        .take_while(|line| !line.is_empty())
        .find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(key).then(|| v.trim())
        })
}
