//! Checks Python source files for the presence or absence of `__future__`
//! imports.
//!
//! The crate walks an already-parsed syntax tree once, reconciles the
//! `from __future__ import` statements it finds against a fixed registry
//! of known features, and reports a diagnostic per feature that is either
//! missing, redundantly present, or unknown. It can run standalone (see
//! [`cli`]) or be embedded by a host that supplies the parsed tree and
//! applies the options through the [`options`] registration surface.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// The checker: reconciles declared imports against the registry and
/// yields diagnostics with stable codes.
pub mod checker;

/// Persisted TOML configuration loading.
pub mod config;

/// The fixed registry of known `__future__` features and their version
/// windows.
pub mod features;

/// Option declaration and resolution, with pluggable registrar backends.
pub mod options;

/// Byte-offset to line-number mapping and other small helpers.
pub mod utils;

/// The single-pass AST visitor that classifies a file's contents.
pub mod visitor;

/// The standalone command-line surface.
pub mod cli;
