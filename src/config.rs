//! Configuration management for the gallery-validate tool.
//!
//! Handles:
//! - Command-line argument parsing
//! - Settings file resolution (explicit path, user config directory, built-in)
//! - Scripted edits and resets to replay against a fixture

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use crate::dom::MemoryDocument;
use crate::dom::fixture::DocumentFixture;
use crate::settings::Settings;

/// Name of the settings file looked up in the user config directory
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Command-line arguments for gallery-validate
#[derive(Debug, Parser)]
#[command(name = "gallery-validate")]
#[command(about = "Run the gallery form validation engine over a form fixture")]
#[command(version)]
pub struct Args {
    /// Form fixture to validate; the built-in gallery dialogs when omitted
    #[arg(help = "TOML file describing the forms to validate")]
    pub fixture: Option<PathBuf>,

    /// Settings file overriding the default selectors and classes
    #[arg(long, help = "TOML or JSON file with validation settings")]
    pub settings: Option<PathBuf>,

    /// Edits to replay, in order, as typed input
    #[arg(
        long = "input",
        value_name = "ID=VALUE",
        value_parser = parse_edit,
        help = "Type VALUE into the field with id ID (repeatable)"
    )]
    pub inputs: Vec<FieldEdit>,

    /// Forms to reset after the edits
    #[arg(
        long = "clear",
        value_name = "FORM_NAME",
        help = "Clear the validation state of the named form (repeatable)"
    )]
    pub clear: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level for the tool
    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// A value typed into one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub field_id: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_edit(raw: &str) -> Result<FieldEdit, String> {
    match raw.split_once('=') {
        Some((field_id, value)) if !field_id.is_empty() => Ok(FieldEdit {
            field_id: field_id.to_string(),
            value: value.to_string(),
        }),
        _ => Err(format!("expected ID=VALUE, got '{}'", raw)),
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub fixture: Option<PathBuf>,
    /// Settings file to load; built-in gallery settings when `None`
    pub settings_path: Option<PathBuf>,
    pub inputs: Vec<FieldEdit>,
    pub clear: Vec<String>,
    pub format: OutputFormat,
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        Self::from_args_with_config_dir(args, dirs::config_dir())
    }

    /// Like [`Config::from_args`], with the user config directory supplied
    pub fn from_args_with_config_dir(args: Args, config_dir: Option<PathBuf>) -> Result<Self> {
        let settings_path = match args.settings {
            Some(path) => {
                if !path.is_file() {
                    bail!("Settings file {:?} does not exist", path);
                }
                Some(path)
            }
            None => config_dir
                .map(|dir| dir.join("gallery-validation").join(SETTINGS_FILE_NAME))
                .filter(|path| path.is_file()),
        };

        Ok(Config {
            fixture: args.fixture,
            settings_path,
            inputs: args.inputs,
            clear: args.clear,
            format: args.format,
            log_level: args.log_level,
        })
    }

    /// Load the effective settings
    pub fn load_settings(&self) -> Result<Settings> {
        match &self.settings_path {
            Some(path) => Settings::load(path)
                .with_context(|| format!("Failed to load settings from {:?}", path)),
            None => Ok(Settings::gallery()),
        }
    }

    /// Build the document to validate, the gallery dialogs when no fixture was given
    pub fn load_document(&self) -> Result<MemoryDocument> {
        let fixture = match &self.fixture {
            Some(path) => DocumentFixture::load(path)?,
            None => DocumentFixture::gallery()?,
        };
        Ok(fixture.build())
    }
}
