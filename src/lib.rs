/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! # ApkInspect Library
//!
//! Verifies the v1 (JAR), v2 and v3 signatures of Android packages and reads
//! the protobuf-compiled manifest of Android App Bundles. It provides the
//! core functionality for the `apkinspect` command-line tool.

pub mod archive;
pub mod certificate;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod intent_filter;
pub mod manifest;
pub mod package;
pub mod pkcs7;
pub mod protobuf;
pub mod resources;
pub mod scheme_v1;
pub mod scheme_v2;
pub mod scheme_v3;
pub mod signer;
pub mod signing_block;
pub mod ui;
pub mod verification;

pub use error::{FormatError, InspectError};
pub use package::Package;
pub use verification::{Scheme, SignatureReport, TrustStatus, VerificationResult};

pub const APP_NAME: &str = "ApkInspect";
pub const APP_BIN_NAME: &str = "apkinspect";
pub const APP_VERSION: &str = "1.0.0";
pub const APP_AUTHOR: &str = "Tiash H Kabir / @MrCarb0n";
pub const APP_ABOUT: &str =
    "Signature verification and manifest inspection for Android APK and AAB packages.";
