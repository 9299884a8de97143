/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! A package opened for inspection.
//!
//! The signature report and the manifest are each computed at most once,
//! even when several threads ask for them at the same time.

use crate::{
    archive::Archive,
    certificate::Certificate,
    error::InspectError,
    manifest::Manifest,
    resources::ProtoResourceTable,
    ui::Ui,
    verification::{self, Scheme, SignatureReport},
};
use std::{fs, path::Path, sync::OnceLock};

pub const BUNDLE_MANIFEST: &str = "base/manifest/AndroidManifest.xml";
pub const BUNDLE_RESOURCES: &str = "base/resources.pb";
const APK_MANIFEST: &str = "AndroidManifest.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// Installable APK
    Apk,
    /// Android App Bundle with protobuf-compiled resources
    Aab,
    Unknown,
}

pub struct Package {
    bytes: Vec<u8>,
    ui: Ui,
    signatures: OnceLock<Result<SignatureReport, InspectError>>,
    manifest: OnceLock<Result<Manifest, InspectError>>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self, InspectError> {
        Ok(Self::from_bytes(fs::read(path)?))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ui: Ui::default(),
            signatures: OnceLock::new(),
            manifest: OnceLock::new(),
        }
    }

    pub fn with_ui(mut self, ui: Ui) -> Self {
        self.ui = ui;
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> PackageKind {
        let Ok(archive) = Archive::open(&self.bytes) else {
            return PackageKind::Unknown;
        };
        if archive.contains(BUNDLE_MANIFEST) {
            PackageKind::Aab
        } else if archive.contains(APK_MANIFEST) {
            PackageKind::Apk
        } else {
            PackageKind::Unknown
        }
    }

    /// Verification report, computed on first use.
    pub fn signatures(&self) -> Result<&SignatureReport, &InspectError> {
        self.signatures
            .get_or_init(|| verification::verify(&self.bytes, &self.ui))
            .as_ref()
    }

    /// Signers of the v1 scheme alone; empty when it is absent or failed.
    pub fn v1_certificates(&self) -> Vec<Certificate> {
        self.signatures()
            .ok()
            .and_then(|report| report.result(Scheme::V1))
            .filter(|r| r.verified)
            .map(|r| r.certificates.clone())
            .unwrap_or_default()
    }

    /// Manifest of an App Bundle's base module, computed on first use.
    pub fn manifest(&self) -> Result<&Manifest, &InspectError> {
        self.manifest.get_or_init(|| self.load_manifest()).as_ref()
    }

    fn load_manifest(&self) -> Result<Manifest, InspectError> {
        let mut archive = Archive::open(&self.bytes)?;
        if !archive.contains(BUNDLE_MANIFEST) && archive.contains(APK_MANIFEST) {
            return Err(InspectError::Config(
                "binary XML manifests are not supported; expected an App Bundle".into(),
            ));
        }
        let root = crate::manifest::ManifestNode::decode(&archive.read(BUNDLE_MANIFEST)?)?;
        self.ui.debug(&format!("Decoded {}", BUNDLE_MANIFEST));

        if !archive.contains(BUNDLE_RESOURCES) {
            self.ui.verbose("No resource table; references stay unresolved");
            return Ok(Manifest::new(root));
        }
        let table = ProtoResourceTable::decode(&archive.read(BUNDLE_RESOURCES)?)?;
        self.ui
            .verbose(&format!("Resource table with {} ids", table.len()));
        Ok(Manifest::with_resources(root, Box::new(table)))
    }
}
