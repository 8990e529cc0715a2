//! The per-file checker: reconciles declared `__future__` imports against
//! the feature registry and produces diagnostics.
//!
//! Code numbering is a public contract consumed by ignore lists: missing
//! diagnostics are `FI1x` (10 + feature index), present diagnostics are
//! `FI5x` (the missing code + 40) and an unknown import name is `FI90`.

use crate::features::{self, Version, ALL_FEATURES};
use crate::utils::LineIndex;
use crate::visitor::FutureImportVisitor;
use ruff_python_ast::ModModule;
use rustc_hash::FxHashSet;
use std::path::PathBuf;

/// Plugin name reported as the origin of every diagnostic.
pub const NAME: &str = "futurelint";
/// Plugin version, surfaced to host frameworks and `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const MISSING_BASE: usize = 10;
const PRESENT_OFFSET: usize = 40;
const UNKNOWN_CODE: usize = 90;

/// Checker-scoped configuration, resolved from CLI flags and persisted
/// config before any [`FutureImportChecker::run`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Only evaluate files that contain more than comments and
    /// (doc)strings.
    pub require_code: bool,
    /// Minimum supported Python version; suppresses findings for features
    /// already mandatory at (or below) it, or not yet available above it.
    pub min_version: Option<Version>,
    /// Only report missing features whose backing language construct is
    /// actually used in the file.
    pub require_used: bool,
}

/// One reported finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-indexed line: the import statement for present and unknown
    /// findings, line 1 for missing ones.
    pub line: usize,
    /// 0-indexed column; always the start of the line.
    pub col: usize,
    /// Stable code, e.g. `FI14` or `FI54`.
    pub code: String,
    /// Full message text, starting with the code. The exact wording is
    /// parsed by downstream tools and must not change.
    pub message: String,
    /// Name of the checker that produced the finding.
    pub origin: &'static str,
}

impl Diagnostic {
    fn new(line: usize, code: usize, name: &str, status: &str) -> Self {
        let code = format!("FI{code}");
        let message = format!("{code} __future__ import \"{name}\" {status}");
        Self {
            line,
            col: 0,
            code,
            message,
            origin: NAME,
        }
    }
}

/// Every code the checker can emit, in registry order: the missing codes,
/// then the present codes, then the unknown-name sentinel.
#[must_use]
pub fn all_codes() -> Vec<String> {
    let mut codes: Vec<String> = ALL_FEATURES
        .iter()
        .map(|f| format!("FI{}", MISSING_BASE + f.index))
        .collect();
    codes.extend(
        ALL_FEATURES
            .iter()
            .map(|f| format!("FI{}", MISSING_BASE + PRESENT_OFFSET + f.index)),
    );
    codes.push(format!("FI{UNKNOWN_CODE}"));
    codes
}

/// Checks one parsed file for missing and redundant `__future__` imports.
///
/// The tree and line index are supplied by the caller; the checker never
/// touches the filesystem.
pub struct FutureImportChecker<'a> {
    tree: &'a ModModule,
    /// File under test. Not used by the checker itself; kept for hosts
    /// that associate diagnostics with their source.
    pub filename: PathBuf,
    line_index: &'a LineIndex,
    settings: Settings,
}

impl<'a> FutureImportChecker<'a> {
    /// Creates a checker for one parsed module.
    #[must_use]
    pub fn new(
        tree: &'a ModModule,
        filename: impl Into<PathBuf>,
        line_index: &'a LineIndex,
        settings: Settings,
    ) -> Self {
        Self {
            tree,
            filename: filename.into(),
            line_index,
            settings,
        }
    }

    /// Runs the checker and returns its findings as a finite, single-pass
    /// sequence.
    ///
    /// Declared-and-known features appear once in the present pass;
    /// everything else is covered by the missing pass, so no feature is
    /// ever reported twice.
    pub fn run(&self) -> impl Iterator<Item = Diagnostic> {
        let mut visitor = FutureImportVisitor::new(self.line_index);
        visitor.visit_body(&self.tree.body);

        let mut diagnostics = Vec::new();
        if self.settings.require_code && !visitor.uses_code() {
            return diagnostics.into_iter();
        }

        let mut declared: FxHashSet<&str> = FxHashSet::default();
        for import in &visitor.future_imports {
            // Duplicate declarations collapse onto the first occurrence.
            if !declared.insert(import.name.as_str()) {
                continue;
            }
            if let Some(diagnostic) = self.evaluate(&import.name, import.line, true) {
                diagnostics.push(diagnostic);
            }
        }

        for feature in &ALL_FEATURES {
            if declared.contains(feature.name) {
                continue;
            }
            if self.settings.require_used && !visitor.feature_used(feature.name) {
                continue;
            }
            if let Some(diagnostic) = self.evaluate(feature.name, 1, false) {
                diagnostics.push(diagnostic);
            }
        }

        diagnostics.into_iter()
    }

    /// Builds the diagnostic for one feature name, or `None` when the
    /// minimum-version window suppresses it.
    ///
    /// The window is inclusive at the lower bound and exclusive at the
    /// upper one: a feature is noise once `mandatory <= min_version`, and
    /// does not exist yet while `optional > min_version`. Unknown names
    /// are never version-filtered.
    fn evaluate(&self, name: &str, line: usize, present: bool) -> Option<Diagnostic> {
        let Some(feature) = features::by_name(name) else {
            return Some(Diagnostic::new(line, UNKNOWN_CODE, name, "does not exist"));
        };

        if let Some(min_version) = self.settings.min_version {
            if feature.mandatory <= min_version || feature.optional > min_version {
                return None;
            }
        }

        let (code, status) = if present {
            (MISSING_BASE + PRESENT_OFFSET + feature.index, "present")
        } else {
            (MISSING_BASE + feature.index, "missing")
        };
        Some(Diagnostic::new(line, code, name, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruff_python_parser::parse_module;

    fn check(source: &str, settings: Settings) -> Vec<Diagnostic> {
        let line_index = LineIndex::new(source);
        let module = parse_module(source).unwrap().into_syntax();
        FutureImportChecker::new(&module, "test.py", &line_index, settings)
            .run()
            .collect()
    }

    #[test]
    fn message_format_is_stable() {
        let diagnostics = check("from __future__ import division\nx = 1\n", Settings::default());
        let present = diagnostics
            .iter()
            .find(|d| d.code == "FI50")
            .expect("present diagnostic");
        assert_eq!(present.message, "FI50 __future__ import \"division\" present");
        assert_eq!(present.line, 1);
        assert_eq!(present.col, 0);
        assert_eq!(present.origin, NAME);
    }

    #[test]
    fn missing_diagnostics_sit_at_line_one() {
        let diagnostics = check("x = 1\n", Settings::default());
        assert_eq!(diagnostics.len(), ALL_FEATURES.len());
        for (feature, diagnostic) in ALL_FEATURES.iter().zip(&diagnostics) {
            assert_eq!(diagnostic.code, format!("FI{}", 10 + feature.index));
            assert_eq!(
                diagnostic.message,
                format!("{} __future__ import \"{}\" missing", diagnostic.code, feature.name)
            );
            assert_eq!(diagnostic.line, 1);
        }
    }

    #[test]
    fn unicode_literals_scenario() {
        let source = "from __future__ import unicode_literals\nimport sys\nprint(sys.version)\n";
        let diagnostics = check(source, Settings::default());
        assert_eq!(diagnostics.len(), 8);
        assert_eq!(diagnostics[0].code, "FI54");
        assert_eq!(diagnostics[0].line, 1);
        let missing: Vec<&str> = diagnostics[1..].iter().map(|d| d.code.as_str()).collect();
        assert_eq!(
            missing,
            vec!["FI10", "FI11", "FI12", "FI13", "FI15", "FI16", "FI17"]
        );
    }

    #[test]
    fn unknown_name_reports_does_not_exist() {
        let source = "x = 1\nfrom __future__ import bogus_name\n";
        let diagnostics = check(source, Settings::default());
        let unknown = diagnostics
            .iter()
            .find(|d| d.code == "FI90")
            .expect("unknown diagnostic");
        assert_eq!(
            unknown.message,
            "FI90 __future__ import \"bogus_name\" does not exist"
        );
        assert_eq!(unknown.line, 2);
        // The full missing set is still reported.
        let missing = diagnostics.iter().filter(|d| d.code.starts_with("FI1")).count();
        assert_eq!(missing, ALL_FEATURES.len());
    }

    #[test]
    fn duplicate_declarations_report_once() {
        let source =
            "from __future__ import division\nfrom __future__ import division\nx = 1\n";
        let diagnostics = check(source, Settings::default());
        let present: Vec<_> = diagnostics.iter().filter(|d| d.code == "FI50").collect();
        assert_eq!(present.len(), 1);
        assert_eq!(present[0].line, 1);
    }

    #[test]
    fn require_code_exempts_empty_files() {
        let settings = Settings {
            require_code: true,
            ..Settings::default()
        };
        assert!(check("", settings.clone()).is_empty());
        assert!(check("# only a comment\n", settings).is_empty());
        // Without require_code the full missing set appears.
        assert_eq!(check("", Settings::default()).len(), ALL_FEATURES.len());
    }

    #[test]
    fn require_code_still_checks_directive_only_files() {
        let settings = Settings {
            require_code: true,
            ..Settings::default()
        };
        let diagnostics = check("from __future__ import division\n", settings);
        assert!(diagnostics.iter().any(|d| d.code == "FI50"));
    }

    #[test]
    fn require_used_filters_unused_features() {
        let settings = Settings {
            require_used: true,
            ..Settings::default()
        };
        // Only prints (no string literals); expect print_function missing
        // plus the two features with no usage flag.
        let diagnostics = check("print(42)\n", settings);
        let codes: Vec<&str> = diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["FI13", "FI15", "FI16"]);
    }

    #[test]
    fn require_used_keeps_exercised_features() {
        let settings = Settings {
            require_used: true,
            ..Settings::default()
        };
        let source = "import os\nwith open('f') as f:\n    x = 1 / 2\n";
        let diagnostics = check(source, settings);
        let codes: Vec<&str> = diagnostics.iter().map(|d| d.code.as_str()).collect();
        // division, absolute_import, with_statement and unicode_literals
        // (the 'f' string literal) plus the two unflagged features.
        assert_eq!(codes, vec!["FI10", "FI11", "FI12", "FI14", "FI15", "FI16"]);
    }

    #[test]
    fn min_version_suppresses_mandatory_features() {
        let settings = Settings {
            min_version: Some((2, 6, 0)),
            ..Settings::default()
        };
        let diagnostics = check("x = 1\n", settings);
        let codes: Vec<&str> = diagnostics.iter().map(|d| d.code.as_str()).collect();
        // with_statement (mandatory 2.6.0), nested_scopes, generators are
        // already mandatory; generator_stop (optional 3.5.0) is too new.
        assert_eq!(codes, vec!["FI10", "FI11", "FI13", "FI14"]);
    }

    #[test]
    fn min_version_suppresses_present_diagnostics_too() {
        let settings = Settings {
            min_version: Some((2, 6, 0)),
            ..Settings::default()
        };
        // generator_stop does not exist at 2.6: declaring it produces no
        // present diagnostic under that minimum.
        let source = "from __future__ import generator_stop\nx = 1\n";
        let diagnostics = check(source, settings.clone());
        assert!(diagnostics.iter().all(|d| d.code != "FI55"));

        // with_statement is already mandatory at 2.6: same suppression.
        let source = "from __future__ import with_statement\nx = 1\n";
        let diagnostics = check(source, settings);
        assert!(diagnostics.iter().all(|d| d.code != "FI52"));
    }

    #[test]
    fn min_version_boundary_is_inclusive_lower_exclusive_upper() {
        // At exactly optional == min the feature is reportable.
        let settings = Settings {
            min_version: Some((3, 5, 0)),
            ..Settings::default()
        };
        let diagnostics = check("x = 1\n", settings);
        assert!(diagnostics.iter().any(|d| d.code == "FI15"));

        // At exactly mandatory == min it is suppressed.
        let settings = Settings {
            min_version: Some((3, 7, 0)),
            ..Settings::default()
        };
        let diagnostics = check("x = 1\n", settings);
        assert!(diagnostics.iter().all(|d| d.code != "FI15"));
    }

    #[test]
    fn partition_is_disjoint() {
        let source = "from __future__ import division, bogus\nimport os\nprint(os.name)\n";
        let diagnostics = check(source, Settings::default());
        let mut present = FxHashSet::default();
        let mut missing = FxHashSet::default();
        let mut unknown = FxHashSet::default();
        for diagnostic in &diagnostics {
            let name = diagnostic
                .message
                .split('"')
                .nth(1)
                .expect("quoted name")
                .to_owned();
            if diagnostic.code == "FI90" {
                unknown.insert(name);
            } else if diagnostic.message.ends_with("present") {
                present.insert(name);
            } else {
                missing.insert(name);
            }
        }
        assert!(present.is_disjoint(&missing));
        assert!(present.is_disjoint(&unknown));
        assert!(missing.is_disjoint(&unknown));
        assert!(present.contains("division"));
        assert!(unknown.contains("bogus"));
        assert_eq!(missing.len(), ALL_FEATURES.len() - 1);
    }

    #[test]
    fn all_codes_cover_every_feature() {
        let codes = all_codes();
        assert_eq!(codes.len(), ALL_FEATURES.len() * 2 + 1);
        assert!(codes.contains(&"FI10".to_owned()));
        assert!(codes.contains(&"FI57".to_owned()));
        assert!(codes.contains(&"FI90".to_owned()));
    }
}
