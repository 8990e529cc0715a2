//! Declaration and resolution of the checker's configuration options.
//!
//! The checker declares its options once, as data, and registrars adapt
//! that declaration to a concrete backend: [`ClapRegistrar`] turns the
//! specs into command-line arguments, [`ConfigKeys`] collects the keys a
//! persisted config file may set. Hosts embedding the checker can supply
//! their own [`OptionRegistrar`] instead.

use crate::checker::Settings;
use crate::config::Config;
use crate::features::Version;
use clap::{Arg, ArgAction, ArgMatches, Command};
use thiserror::Error;

/// How an option's value is expressed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// A boolean switch, false unless given.
    Flag,
    /// An option taking one value.
    Value,
}

/// Declaration of a single checker option.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    /// Long flag name, kebab-case.
    pub name: &'static str,
    /// Key in persisted configuration, snake_case.
    pub config_key: &'static str,
    /// Help text.
    pub help: &'static str,
    /// Flag or value option.
    pub kind: OptionKind,
    /// Whether the option may also be sourced from persisted config.
    pub parse_from_config: bool,
}

/// The checker's three options.
pub const CHECKER_OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: "require-code",
        config_key: "require_code",
        help: "Do only apply to files which not only have comments and (doc)strings",
        kind: OptionKind::Flag,
        parse_from_config: true,
    },
    OptionSpec {
        name: "min-version",
        config_key: "min_version",
        help: "The minimum version supported so that it can ignore mandatory and non-existent features",
        kind: OptionKind::Value,
        parse_from_config: true,
    },
    OptionSpec {
        name: "require-used",
        config_key: "require_used",
        help: "Only alert when relevant features are used",
        kind: OptionKind::Flag,
        parse_from_config: true,
    },
];

/// Backend-agnostic registration surface for option-parsing collaborators.
pub trait OptionRegistrar {
    /// Registers one declared option with the backend.
    fn add_option(&mut self, spec: &OptionSpec);
}

/// Declares every checker option to `registrar`.
pub fn register_options(registrar: &mut dyn OptionRegistrar) {
    for spec in CHECKER_OPTIONS {
        registrar.add_option(spec);
    }
}

/// Registrar backend that appends the options to a [`clap::Command`].
pub struct ClapRegistrar {
    command: Option<Command>,
}

impl ClapRegistrar {
    /// Wraps a command under construction.
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            command: Some(command),
        }
    }

    /// Returns the command with all registered options attached.
    #[must_use]
    pub fn into_command(self) -> Command {
        // The option is only vacated inside add_option, where it is
        // immediately refilled.
        self.command.unwrap_or_else(|| Command::new("futurelint"))
    }
}

impl OptionRegistrar for ClapRegistrar {
    fn add_option(&mut self, spec: &OptionSpec) {
        let arg = Arg::new(spec.name).long(spec.name).help(spec.help);
        let arg = match spec.kind {
            OptionKind::Flag => arg.action(ArgAction::SetTrue),
            OptionKind::Value => arg.action(ArgAction::Set).value_name("VALUE"),
        };
        if let Some(command) = self.command.take() {
            self.command = Some(command.arg(arg));
        }
    }
}

/// Registrar backend that records which config-file keys are honored,
/// i.e. the options declared with `parse_from_config`.
#[derive(Debug, Default)]
pub struct ConfigKeys {
    /// The honored snake_case keys.
    pub keys: Vec<&'static str>,
}

impl OptionRegistrar for ConfigKeys {
    fn add_option(&mut self, spec: &OptionSpec) {
        if spec.parse_from_config {
            self.keys.push(spec.config_key);
        }
    }
}

/// Raw option values gathered from one or more backends, before
/// validation. `None` means the backend did not set the option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionValues {
    /// `--require-code` / `require_code`.
    pub require_code: Option<bool>,
    /// `--min-version` / `min_version`, still unparsed.
    pub min_version: Option<String>,
    /// `--require-used` / `require_used`.
    pub require_used: Option<bool>,
}

impl OptionValues {
    /// Reads the honored keys out of a loaded config file.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut registered = ConfigKeys::default();
        register_options(&mut registered);

        let mut values = Self::default();
        for key in registered.keys {
            match key {
                "require_code" => values.require_code = config.futurelint.require_code,
                "min_version" => values.min_version = config.futurelint.min_version.clone(),
                "require_used" => values.require_used = config.futurelint.require_used,
                _ => {}
            }
        }
        values
    }

    /// Reads the option values out of parsed command-line matches. A flag
    /// left at its false default counts as unset so it cannot mask a
    /// config-file value.
    #[must_use]
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            require_code: matches.get_flag("require-code").then_some(true),
            min_version: matches.get_one::<String>("min-version").cloned(),
            require_used: matches.get_flag("require-used").then_some(true),
        }
    }

    /// Overlays `other` on top of `self`; set values in `other` win.
    #[must_use]
    pub fn overlay(self, other: Self) -> Self {
        Self {
            require_code: other.require_code.or(self.require_code),
            min_version: other.min_version.or(self.min_version),
            require_used: other.require_used.or(self.require_used),
        }
    }
}

/// A fatal configuration error, raised before any file is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    /// The minimum version was not dot-separated integers with at most
    /// three components.
    #[error("Minimum version \"{0}\" not formatted like \"A.B.C\"")]
    BadMinVersion(String),
    /// An ignore entry matched no diagnostic code, not even as a prefix.
    #[error("The code(s) is/are invalid: \"{0}\"")]
    InvalidIgnoreCodes(String),
}

/// Validates gathered option values into checker [`Settings`].
pub fn resolve_settings(values: &OptionValues) -> Result<Settings, OptionError> {
    let min_version = match &values.min_version {
        Some(raw) => Some(parse_min_version(raw)?),
        None => None,
    };
    Ok(Settings {
        require_code: values.require_code.unwrap_or(false),
        min_version,
        require_used: values.require_used.unwrap_or(false),
    })
}

/// Parses a minimum-version string such as `2.7` or `3`, padding missing
/// components with zeros.
pub fn parse_min_version(raw: &str) -> Result<Version, OptionError> {
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() > 3 {
        return Err(OptionError::BadMinVersion(raw.to_owned()));
    }
    let mut numbers = [0u32; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| OptionError::BadMinVersion(raw.to_owned()))?;
    }
    Ok((numbers[0], numbers[1], numbers[2]))
}
