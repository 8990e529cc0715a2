//! Standalone command-line surface.
//!
//! Thin glue around the checker: reads each file, parses it, runs the
//! checker and prints `filename:line:column: message` for every finding
//! that is not ignored. The process exit code is 1 when anything was
//! printed.

use crate::checker::{self, FutureImportChecker};
use crate::config::Config;
use crate::options::{self, ClapRegistrar, OptionError, OptionValues};
use crate::utils::LineIndex;
use anyhow::{anyhow, Context as _, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use ruff_python_parser::parse_module;
use rustc_hash::FxHashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Builds the command, registering the checker's own options through the
/// clap registrar backend.
#[must_use]
pub fn build_command() -> Command {
    let command = Command::new(checker::NAME)
        .version(checker::VERSION)
        .about("Checks Python files for missing or redundant __future__ imports")
        .arg(
            Arg::new("ignore")
                .long("ignore")
                .value_name("CODES")
                .action(ArgAction::Set)
                .help("Ignore the given comma-separated codes"),
        )
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .num_args(1..)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Python files to check"),
        );
    let mut registrar = ClapRegistrar::new(command);
    options::register_options(&mut registrar);
    registrar.into_command()
}

/// Expands a comma-separated ignore list into full diagnostic codes.
///
/// Each entry may be a full code or a prefix; a prefix expands to every
/// code starting with it. An entry matching nothing at all is a fatal
/// configuration error.
pub fn expand_ignore_codes(raw: &str) -> Result<FxHashSet<String>, OptionError> {
    let valid = checker::all_codes();
    let mut ignored = FxHashSet::default();
    let mut invalid = Vec::new();
    for entry in raw.split(',') {
        let mut matched = false;
        for code in &valid {
            if code.starts_with(entry) {
                ignored.insert(code.clone());
                matched = true;
            }
        }
        if !matched {
            invalid.push(entry);
        }
    }
    if invalid.is_empty() {
        Ok(ignored)
    } else {
        Err(OptionError::InvalidIgnoreCodes(invalid.join("\", \"")))
    }
}

/// Parses `args` (without the program name) and runs the checker over
/// every listed file, printing diagnostics to stdout.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    let matches = build_command()
        .get_matches_from(std::iter::once(checker::NAME.to_owned()).chain(args));
    run(&matches, &mut std::io::stdout())
}

/// Runs the checker for parsed matches, writing diagnostics to `out`.
/// Returns the intended process exit code.
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> Result<i32> {
    let files: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    // Persisted config is resolved once, relative to the first file.
    let config = files
        .first()
        .map_or_else(Config::load, |file| Config::load_from_path(file));
    let values = OptionValues::from_config(&config).overlay(OptionValues::from_matches(matches));
    let settings = options::resolve_settings(&values)?;

    let ignore_raw = matches.get_one::<String>("ignore").cloned().or_else(|| {
        config
            .futurelint
            .ignore
            .as_ref()
            .map(|codes| codes.join(","))
    });
    let ignored = match ignore_raw.as_deref() {
        Some(raw) => expand_ignore_codes(raw)?,
        None => FxHashSet::default(),
    };

    let mut has_errors = false;
    for filename in &files {
        let source = fs::read_to_string(filename)
            .with_context(|| format!("failed to read {}", filename.display()))?;
        let parsed = parse_module(&source)
            .map_err(|err| anyhow!("failed to parse {}: {err}", filename.display()))?;
        let module = parsed.into_syntax();
        let line_index = LineIndex::new(&source);
        let checker =
            FutureImportChecker::new(&module, filename.as_path(), &line_index, settings.clone());
        for diagnostic in checker.run() {
            if ignored.contains(&diagnostic.code) {
                continue;
            }
            has_errors = true;
            writeln!(
                out,
                "{}:{}:{}: {}",
                filename.display(),
                diagnostic.line,
                diagnostic.col + 1,
                diagnostic.message
            )?;
        }
    }
    Ok(i32::from(has_errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_cli(args: &[&str]) -> Result<(i32, String)> {
        let matches = build_command()
            .try_get_matches_from(std::iter::once("futurelint").chain(args.iter().copied()))?;
        let mut buffer = Vec::new();
        let code = run(&matches, &mut buffer)?;
        Ok((code, String::from_utf8(buffer)?))
    }

    #[test]
    fn expands_exact_codes() {
        let ignored = expand_ignore_codes("FI14,FI90").unwrap();
        assert_eq!(ignored.len(), 2);
        assert!(ignored.contains("FI14"));
        assert!(ignored.contains("FI90"));
    }

    #[test]
    fn expands_prefixes_to_all_matches() {
        let ignored = expand_ignore_codes("FI1").unwrap();
        // FI10 through FI17.
        assert_eq!(ignored.len(), 8);
        assert!(ignored.contains("FI10"));
        assert!(ignored.contains("FI17"));
        assert!(!ignored.contains("FI50"));
    }

    #[test]
    fn rejects_unknown_codes() {
        let err = expand_ignore_codes("foobar").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The code(s) is/are invalid: \"foobar\""
        );
        let err = expand_ignore_codes("FI14,nope,FI20").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The code(s) is/are invalid: \"nope\", \"FI20\""
        );
    }

    #[test]
    fn prints_diagnostics_with_one_based_columns() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.py");
        std::fs::write(&file, "from __future__ import division\nx = 1\n").unwrap();

        let (code, output) = run_cli(&[file.to_str().unwrap()]).unwrap();
        assert_eq!(code, 1);
        let expected = format!(
            "{}:1:1: FI50 __future__ import \"division\" present",
            file.display()
        );
        assert!(output.lines().any(|line| line == expected), "{output}");
        // Seven remaining features are missing at line 1.
        assert_eq!(output.lines().count(), 8);
    }

    #[test]
    fn ignore_flag_suppresses_matching_codes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        let (code, output) = run_cli(&["--ignore", "FI1", file.to_str().unwrap()]).unwrap();
        assert_eq!(code, 0);
        assert!(output.is_empty());

        let (code, output) =
            run_cli(&["--ignore", "FI14", file.to_str().unwrap()]).unwrap();
        assert_eq!(code, 1);
        assert!(!output.contains("FI14"));
        assert_eq!(output.lines().count(), 7);
    }

    #[test]
    fn invalid_ignore_code_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        let err = run_cli(&["--ignore", "foobar", file.to_str().unwrap()]).unwrap_err();
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn min_version_flag_filters_findings() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        let (_, output) = run_cli(&["--min-version", "2.6", file.to_str().unwrap()]).unwrap();
        assert!(!output.contains("generator_stop"));
        assert!(output.contains("division"));
    }

    #[test]
    fn malformed_min_version_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        let err = run_cli(&["--min-version", "1.2.3.4", file.to_str().unwrap()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Minimum version \"1.2.3.4\" not formatted like \"A.B.C\""
        );
    }

    #[test]
    fn config_file_supplies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".futurelint.toml"),
            "[futurelint]\nignore = [\"FI1\", \"FI5\"]\n",
        )
        .unwrap();
        let file = dir.path().join("sample.py");
        std::fs::write(&file, "from __future__ import division\nx = 1\n").unwrap();

        // FI1 and FI5 expand to every missing and present code, so nothing
        // is left to report.
        let (code, output) = run_cli(&[file.to_str().unwrap()]).unwrap();
        assert_eq!(code, 0, "{output}");
        assert!(output.is_empty());
    }
}
