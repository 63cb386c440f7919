// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error diagnostics.
//!
//! Figment errors become miette reports. An unknown key is located in the
//! TOML file that introduced it and gets a "did you mean" hint.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(strongbox::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Suggested correction via fuzzy matching, if any.
        suggestion: Option<String>,
        /// Comma-separated valid keys for the section.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(strongbox::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(strongbox::config::missing_key),
        help("add `{key} = <value>` to your strongbox.toml")
    )]
    MissingKey { key: String },

    /// A value deserialized but failed a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(strongbox::config::validation))]
    Validation { message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(strongbox::config::other))]
    Other(String),
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// A config file read back for span lookup.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as figment reports it in error metadata.
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read `path`, or `None` if it does not exist or cannot be read.
    pub fn read(path: &std::path::Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Some(Self::new(path.display().to_string(), content))
    }
}

/// Turn every error carried by `err` into a [`ConfigError`].
pub fn figment_to_config_errors(err: figment::Error, sources: &[SourceFile]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, sources))
        .collect()
}

fn convert(error: &figment::Error, sources: &[SourceFile]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = match source_of(error, sources)
                .and_then(|file| locate_key(&file.content, &error.path, field).map(|at| (file, at)))
            {
                Some((file, at)) => (
                    Some(SourceSpan::new(at.into(), field.len())),
                    Some(NamedSource::new(&file.name, file.content.clone())),
                ),
                None => (None, None),
            };
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: closest_key(field, *expected).map(str::to_string),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: qualified(&error.path, field),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            detail: format!("found {actual}"),
            expected: expected.clone(),
        },
        Kind::UnknownVariant(value, variants) => ConfigError::InvalidType {
            key: error.path.join("."),
            detail: format!("`{value}` is not recognized"),
            expected: format!("one of {}", variants.join(", ")),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

fn qualified(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", path.join("."))
    }
}

/// The loaded file that produced `error`, if it came from one.
fn source_of<'a>(error: &figment::Error, sources: &'a [SourceFile]) -> Option<&'a SourceFile> {
    let name = match &error.metadata.as_ref()?.source {
        Some(figment::Source::File(path)) => path.display().to_string(),
        Some(figment::Source::Custom(name)) => name.clone(),
        _ => return None,
    };
    sources.iter().find(|file| file.name == name)
}

/// Byte offset of `field` inside the table named by `path`.
///
/// Walks the file line by line tracking the current `[table]` header, so a
/// key with the same name in another table is not matched. An empty `path`
/// means the root table, before any header.
pub fn locate_key(content: &str, path: &[String], field: &str) -> Option<usize> {
    let wanted = path.join(".");
    let mut table = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(header) = trimmed.strip_prefix('[') {
            table = header
                .split(']')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
        } else if table == wanted
            && let Some(rest) = trimmed.strip_prefix(field)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }

    None
}

/// Most similar valid key by Jaro-Winkler, above [`SUGGESTION_THRESHOLD`].
pub fn closest_key<'a, S: AsRef<str>>(unknown: &str, valid_keys: &'a [S]) -> Option<&'a str> {
    valid_keys
        .iter()
        .map(|key| (key.as_ref(), strsim::jaro_winkler(unknown, key.as_ref())))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key)
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
