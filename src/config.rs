// ApkInspect - Signature verification and manifest inspection for Android packages
// Copyright (C) 2026 Tiash H Kabir / @MrCarb0n
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Configuration parsing and validation for the ApkInspect CLI.

use crate::{error::InspectError, resources::DEFAULT_LOCALE, ui::Ui};
use clap::ArgMatches;
use std::path::PathBuf;

/// Execution mode for the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Verify signatures, optionally pinning the signer certificate
    Verify { cert_path: Option<PathBuf> },
    /// Print manifest facts, resolving labels for `locale`
    Manifest { locale: String },
}

/// Application configuration parsed from command-line arguments.
#[derive(Debug)]
pub struct Config {
    /// Package to inspect
    pub input_path: PathBuf,
    pub mode: Mode,
    /// Whether to suppress non-error output
    pub quiet: bool,
    /// Verbosity level (0 = off, 1 = verbose, 2 = very verbose, 3+ = debug)
    pub verbosity_level: u8,
}

impl Config {
    /// Parse configuration from command-line argument matches.
    ///
    /// # Arguments
    /// * `matches` - The clap argument matches structure
    /// * `ui` - User interface for verbose output
    ///
    /// # Returns
    /// Configuration object or an error
    pub fn from_matches(matches: &ArgMatches, ui: &Ui) -> Result<Self, InspectError> {
        let quiet = matches.get_flag("quiet");
        let verbosity_level = matches.get_count("verbose");

        let (input_path, mode) = match matches.subcommand() {
            Some(("verify", sub)) => (Self::parse_input(sub, ui)?, Self::parse_verify(sub, ui)?),
            Some(("manifest", sub)) => (Self::parse_input(sub, ui)?, Self::parse_manifest(sub, ui)),
            _ => {
                return Err(InspectError::Config(
                    "No subcommand provided. Use 'verify' or 'manifest'.".into(),
                ))
            }
        };

        Ok(Self {
            input_path,
            mode,
            quiet,
            verbosity_level,
        })
    }

    /// Resolve and validate the package path.
    ///
    /// # Arguments
    /// * `matches` - The clap subcommand matches
    /// * `ui` - User interface for debug output
    ///
    /// # Returns
    /// Path to an existing file or an error
    fn parse_input(matches: &ArgMatches, ui: &Ui) -> Result<PathBuf, InspectError> {
        let path = PathBuf::from(
            matches
                .get_one::<String>("input")
                .ok_or_else(|| InspectError::Config("No input file specified".into()))?,
        );
        let metadata = std::fs::metadata(&path).map_err(|e| {
            InspectError::Config(format!("Cannot access input file {}: {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(InspectError::Config(format!(
                "Input is not a file: {}",
                path.display()
            )));
        }
        ui.debug(&format!("Using input file: {}", path.display()));
        Ok(path)
    }

    /// Parse verification mode configuration.
    ///
    /// # Arguments
    /// * `matches` - The clap subcommand matches for verification
    /// * `ui` - User interface for verbose output
    ///
    /// # Returns
    /// Verify mode with the optional pinned certificate, or an error
    fn parse_verify(matches: &ArgMatches, ui: &Ui) -> Result<Mode, InspectError> {
        let cert_path = match matches.get_one::<String>("cert") {
            Some(cert) => {
                let path = PathBuf::from(cert);
                if !path.exists() {
                    return Err(InspectError::Config(format!(
                        "Certificate file does not exist: {}",
                        path.display()
                    )));
                }
                ui.debug(&format!("Pinning signer to: {}", path.display()));
                Some(path)
            }
            None => None,
        };
        Ok(Mode::Verify { cert_path })
    }

    fn parse_manifest(matches: &ArgMatches, ui: &Ui) -> Mode {
        let locale = matches
            .get_one::<String>("locale")
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());
        ui.debug(&format!("Label locale: '{}'", locale));
        Mode::Manifest { locale }
    }
}
