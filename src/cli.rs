/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

use crate::{
    certificate::Certificate,
    config::{Config, Mode},
    error::InspectError,
    manifest::{Manifest, ManifestNode},
    package::Package,
    ui::Ui,
    verification::{SignatureReport, TrustStatus},
    *,
};
use clap::{Arg, ArgAction, Command};
use std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

/// Command-line definition of the `apkinspect` binary.
pub fn build_command(binary_name: String) -> Command {
    Command::new(APP_NAME)
        .bin_name(binary_name)
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .disable_version_flag(true)
        .help_template("{about-with-newline}{usage-heading} {usage}\n\n{all-args}\n")
        .subcommand_required(false)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("verify")
                .about("Verify the v1/v2/v3 signatures of an APK")
                .arg_required_else_help(true)
                .arg(
                    Arg::new("input")
                        .required(true)
                        .help("Path to the APK to verify")
                        .index(1),
                )
                .arg(
                    Arg::new("cert")
                        .short('p')
                        .long("cert")
                        .help("Expected signer certificate (PEM/DER)"),
                ),
        )
        .subcommand(
            Command::new("manifest")
                .about("Print the manifest of an Android App Bundle")
                .arg_required_else_help(true)
                .arg(
                    Arg::new("input")
                        .required(true)
                        .help("Path to the .aab file")
                        .index(1),
                )
                .arg(
                    Arg::new("locale")
                        .short('l')
                        .long("locale")
                        .help("Locale used to resolve the application label"),
                ),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Set verbosity level (-v for verbose, -vv for more verbose, -vvv for debug)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Suppress all output except errors"),
        )
        .arg(
            Arg::new("version_custom")
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version information"),
        )
}

pub fn run() -> Result<(), InspectError> {
    let binary_name = std::env::args()
        .next()
        .and_then(|p| {
            Path::new(&p)
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| APP_BIN_NAME.to_string());

    let matches = build_command(binary_name).get_matches();

    if matches.get_flag("version_custom") {
        let mut ui = Ui::new(false, false, false, false, true);
        ui.enable_colors_if_supported();
        ui.print_version_info();
        return Ok(());
    }

    let verbosity_level = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    let mut ui = Ui::from_verbosity_level(verbosity_level, quiet, true);
    ui.enable_colors_if_supported();

    ui.print_banner();

    if matches.subcommand().is_none() {
        return Err(InspectError::Config("No command provided".into()));
    }

    run_logic(&matches, &ui)
}

fn run_logic(matches: &clap::ArgMatches, ui: &Ui) -> Result<(), InspectError> {
    let config = Config::from_matches(matches, ui)?;
    ui.debug(&format!(
        "Verbosity {} (quiet: {})",
        config.verbosity_level, config.quiet
    ));
    let package = Package::open(&config.input_path)?.with_ui(ui.clone());

    match config.mode {
        Mode::Verify { ref cert_path } => {
            ui.print_mode_header("VERIFICATION MODE");
            ui.info(&format!("Verifying: {}", config.input_path.display()));

            let report = package.signatures().map_err(InspectError::shared)?;
            print_signature_report(report, &package, ui);

            let signer = match report.status {
                TrustStatus::Verified(_) => report.signer_certificates().first(),
                TrustStatus::Failed(scheme) => {
                    let reason = report
                        .winner()
                        .and_then(|r| r.error.as_ref())
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "unknown error".into());
                    return Err(InspectError::verification(scheme, reason));
                }
                TrustStatus::Unsigned => return Err(InspectError::Unsigned),
            };

            if let Some(path) = cert_path {
                let expected = Certificate::load(path, ui)?;
                ui.verbose(&format!("Expected signer: {}", expected.subject));
                if !report.signer_certificates().contains(&expected) {
                    return Err(InspectError::Certificate(format!(
                        "Signer {} does not match {}",
                        signer.map(|c| c.subject.as_str()).unwrap_or("-"),
                        path.display()
                    )));
                }
            }
            if let Some(cert) = signer {
                print_signer(cert, ui);
            }
            for result in report.results.iter().filter(|r| !r.verified) {
                ui.warn(&format!("{} signature is invalid", result.scheme));
            }
            ui.success("Signature valid. Package authentic.");
        }
        Mode::Manifest { ref locale } => {
            ui.print_mode_header("MANIFEST");
            ui.info(&format!("Reading: {}", config.input_path.display()));
            ui.verbose(&format!("Package kind: {:?}", package.kind()));

            let manifest = package.manifest().map_err(InspectError::shared)?;
            print_manifest(manifest, locale, ui);
        }
    }

    Ok(())
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn print_signature_report(report: &SignatureReport, package: &Package, ui: &Ui) {
    let mut fields: Vec<(&str, String)> = Vec::new();
    let labels: Vec<String> = report.results.iter().map(|r| r.scheme.to_string()).collect();
    for (label, result) in labels.iter().zip(&report.results) {
        let status = match &result.error {
            None => format!("verified ({} signer(s))", result.certificates.len()),
            Some(e) => format!("FAILED: {}", e),
        };
        fields.push((label.as_str(), status));
    }
    let skipped: Vec<String> = report.skipped.iter().map(|s| s.scheme.to_string()).collect();
    for label in &skipped {
        fields.push((label.as_str(), "not present".into()));
    }

    let status = match report.status {
        TrustStatus::Verified(s) => format!("trusted via {}", s),
        TrustStatus::Failed(s) => format!("rejected by {}", s),
        TrustStatus::Unsigned => "unsigned".into(),
    };
    fields.push(("Status", status));

    if let Some(cert) = report.signer_certificates().first() {
        fields.push(("Signer", cert.subject.clone()));
        fields.push(("SHA-256", cert.sha256_fingerprint()));
        fields.push(("Key", cert.public_key.kind.to_string()));
    }
    let legacy = package.v1_certificates();
    if let Some(cert) = legacy.first() {
        if report.signer_certificates().first() != Some(cert) {
            fields.push(("v1 signer", cert.subject.clone()));
        }
    }
    ui.print_report("Signature Report", &fields);
}

fn print_signer(cert: &Certificate, ui: &Ui) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    if !cert.is_valid_at(now) {
        ui.warn(&format!(
            "Signer certificate is outside its validity period ({} .. {})",
            cert.not_before_display, cert.not_after_display
        ));
    }
    ui.print_summary(
        "Signer Certificate",
        &[
            ("Subject", cert.subject.clone()),
            ("Issuer", cert.issuer.clone()),
            ("Serial", cert.serial.clone()),
            ("From", cert.not_before_display.clone()),
            ("Until", cert.not_after_display.clone()),
            ("SHA-1", cert.sha1_fingerprint()),
            ("Sig OID", cert.signature_algorithm.clone()),
        ],
    );
}

fn component_names(nodes: &[ManifestNode]) -> Vec<String> {
    nodes.iter().filter_map(|n| n.string("name")).collect()
}

fn print_manifest(manifest: &Manifest, locale: &str, ui: &Ui) {
    ui.print_report(
        "Manifest",
        &[
            ("Package", or_dash(manifest.package_name())),
            ("Version", or_dash(manifest.version_name())),
            ("Code", or_dash(manifest.version_code())),
            ("Min SDK", or_dash(manifest.min_sdk_version())),
            ("Target SDK", or_dash(manifest.target_sdk_version())),
            ("Label", or_dash(manifest.label(locale))),
            ("Device", manifest.device().to_string()),
        ],
    );
    ui.print_list("Icons", &manifest.icons());
    ui.print_list("Permissions", &manifest.use_permissions());
    ui.print_list("Features", &manifest.use_features());
    ui.print_list("Activities", &component_names(manifest.activities()));
    ui.print_list("Services", &component_names(manifest.services()));
    ui.print_list("Receivers", &component_names(manifest.receivers()));
    ui.print_list("Providers", &component_names(manifest.providers()));
    ui.print_list("Deep links", &manifest.deep_links());
    ui.print_list("URL schemes", &manifest.schemes());
}
