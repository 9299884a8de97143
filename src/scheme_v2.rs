/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! APK Signature Scheme v2.

use crate::{
    error::InspectError,
    signer::SignerBlock,
    signing_block::{V2_BLOCK_ID, V3_BLOCK_ID},
    verification::{Scheme, SchemeVerifier, VerificationContext, VerificationResult},
};

/// Additional attribute naming the newest scheme the signer also applied.
pub const STRIPPING_PROTECTION_ATTR_ID: u32 = 0xbeef_f00d;
const STRIPPING_PROTECTION_V3: u32 = 3;

pub struct V2Verifier;

impl SchemeVerifier for V2Verifier {
    fn scheme(&self) -> Scheme {
        Scheme::V2
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> Result<VerificationResult, InspectError> {
        let block = ctx
            .signing_block
            .as_ref()
            .ok_or(InspectError::SignatureNotFound(Scheme::V2))?;
        let value = block
            .get(V2_BLOCK_ID)
            .ok_or(InspectError::SignatureNotFound(Scheme::V2))?;

        let signers = SignerBlock::parse_all(Scheme::V2, value)?;
        ctx.ui.very_verbose(&format!("v2 block has {} signer(s)", signers.len()));

        let mut certificates = Vec::new();
        for (i, signer) in signers.iter().enumerate() {
            check_stripping_protection(signer, block.contains(V3_BLOCK_ID))?;
            let certs = signer.verify(Scheme::V2, ctx).map_err(|e| {
                ctx.ui.debug(&format!("v2 signer #{} rejected: {}", i + 1, e));
                e
            })?;
            certificates.extend(certs);
        }
        Ok(VerificationResult::verified(Scheme::V2, certificates))
    }
}

/// A v2 signer that claims v3 was applied is invalid when the v3 block is gone.
fn check_stripping_protection(signer: &SignerBlock<'_>, has_v3: bool) -> Result<(), InspectError> {
    let Some(value) = signer.attribute(STRIPPING_PROTECTION_ATTR_ID) else {
        return Ok(());
    };
    if value.len() < 4 {
        return Err(InspectError::verification(
            Scheme::V2,
            "truncated stripping protection attribute",
        ));
    }
    let claimed = u32::from_le_bytes([value[0], value[1], value[2], value[3]]);
    if claimed == STRIPPING_PROTECTION_V3 && !has_v3 {
        return Err(InspectError::verification(
            Scheme::V2,
            "signer claims v3 but the v3 block was stripped",
        ));
    }
    Ok(())
}
