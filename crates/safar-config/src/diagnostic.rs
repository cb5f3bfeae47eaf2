// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error reporting.
//!
//! Bridges figment failures into miette diagnostics. Unknown keys get a
//! "did you mean?" suggestion drawn from the bot's actual section layout,
//! and file-based loads get a source span pointing at the offending key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// The whole config surface, section by section. Suggestions and the key
/// listings in help text come from here rather than from whatever serde
/// happened to report.
const SECTIONS: &[(&str, &[&str])] = &[
    ("bot", &["name", "log_level"]),
    ("telegram", &["bot_token", "admin_id", "forward_timeout_secs"]),
    ("storage", &["data_dir", "cache_ttl_secs"]),
    ("reminder", &["enabled", "hour", "fallback_interval_secs"]),
];

/// Jaro-Winkler floor below which a near-miss is not offered.
/// `admin_di` scores well against `admin_id`; unrelated noise does not.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with enough context for miette to render an
/// Elm-style report.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key or section was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(safar::config::unknown_key), help("{help}"))]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Suggestion and key listing for the offending section.
        help: String,
        /// Source span for the offending key.
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        /// The source file content for context display.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(safar::config::invalid_value), help("expected {expected}"))]
    InvalidValue {
        /// The key with the wrong value, dotted (`telegram.admin_id`).
        key: String,
        /// Description of the mismatch.
        detail: String,
        /// What was expected.
        expected: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(safar::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(safar::config::other))]
    Other(String),
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A figment error may carry several failures; each becomes its own
/// diagnostic. Every field has a serde default, so a missing-field error
/// cannot occur here and falls through to the catch-all.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, _) => {
                let (span, src) = locate_key(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    help: unknown_key_help(&error.path, field),
                    span,
                    src,
                }
            }
            Kind::InvalidType(actual, expected) => ConfigError::InvalidValue {
                key: error.path.join("."),
                detail: format!("found {actual}"),
                expected: expected.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Build the help line for an unknown key.
///
/// A bare unknown name is a misspelled section header; a name under a
/// known section draws its suggestion from that section's keys.
fn unknown_key_help(path: &[String], key: &str) -> String {
    if path.is_empty() {
        let sections: Vec<&str> = SECTIONS.iter().map(|(name, _)| *name).collect();
        return match nearest(key, &sections) {
            Some(hit) => format!("did you mean the `[{hit}]` section? Sections: {}", sections.join(", ")),
            None => format!("sections: {}", sections.join(", ")),
        };
    }

    let section = path[0].as_str();
    match SECTIONS.iter().find(|(name, _)| *name == section) {
        Some((_, keys)) => match nearest(key, keys) {
            Some(hit) => format!("did you mean `{hit}`? [{section}] keys: {}", keys.join(", ")),
            None => format!("[{section}] keys: {}", keys.join(", ")),
        },
        None => format!("no `[{section}]` section in safar.toml"),
    }
}

/// Best Jaro-Winkler match above the threshold, if any.
fn nearest<'a>(unknown: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&candidate| (strsim::jaro_winkler(unknown, candidate), candidate))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
}

/// Point a span at `key` inside the file figment blamed, when that file
/// is among the loaded TOML sources. String-based loads have no file, so
/// they render without a span.
fn locate_key(
    error: &figment::error::Error,
    key: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let path = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        Some(figment::Source::File(path)) => path.display().to_string(),
        _ => return (None, None),
    };

    let Some((_, content)) = toml_sources.iter().find(|(p, _)| *p == path) else {
        return (None, None);
    };

    let section = error.path.first().map(String::as_str);
    match key_offset(content, section, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `key` at the start of a line, scanning after the
/// `[section]` header when one applies.
fn key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let start = match section {
        None => 0,
        Some(name) => {
            let header = format!("[{name}]");
            content.find(&header)? + header.len()
        }
    };

    let mut pos = start;
    for line in content[start..].split_inclusive('\n') {
        let lead = line.len() - line.trim_start().len();
        if let Some(after) = line[lead..].strip_prefix(key) {
            // Only a real assignment counts, not a longer key sharing the prefix.
            if after.trim_start().starts_with('=') {
                return Some(pos + lead);
            }
        }
        pos += line.len();
    }

    None
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn misspelled_telegram_key_suggests_admin_id() {
        let err = load_config_from_str("[telegram]\nadmin_di = 5\n").unwrap_err();
        let errors = figment_to_config_errors(err, &[]);
        assert!(matches!(
            &errors[0],
            ConfigError::UnknownKey { key, help, .. }
                if key == "admin_di" && help.contains("did you mean `admin_id`")
        ));
    }

    #[test]
    fn misspelled_section_suggests_the_section() {
        let help = unknown_key_help(&[], "remidner");
        assert!(help.contains("did you mean the `[reminder]` section?"));
    }

    #[test]
    fn unknown_storage_key_lists_section_keys() {
        let help = unknown_key_help(&["storage".to_string()], "zzzzzz");
        assert!(!help.contains("did you mean"));
        assert!(help.contains("data_dir, cache_ttl_secs"));
    }

    #[test]
    fn nearest_skips_distant_candidates() {
        assert_eq!(nearest("zzzzzz", &["name", "log_level"]), None);
        assert_eq!(nearest("cache_tl_secs", &["data_dir", "cache_ttl_secs"]), Some("cache_ttl_secs"));
    }

    #[test]
    fn key_offset_searches_after_the_section_header() {
        let content = "[bot]\nname = \"safar\"\n\n[reminder]\nhuor = 9\n";
        let offset = key_offset(content, Some("reminder"), "huor").unwrap();
        assert_eq!(&content[offset..offset + 4], "huor");
    }

    #[test]
    fn key_offset_ignores_longer_keys_sharing_a_prefix() {
        let content = "[reminder]\nhour_of_day = 9\n";
        assert_eq!(key_offset(content, Some("reminder"), "hour"), None);
    }

    #[test]
    fn bad_type_reports_dotted_key() {
        let err = load_config_from_str("[telegram]\nadmin_id = \"five\"\n").unwrap_err();
        let errors = figment_to_config_errors(err, &[]);
        assert!(matches!(
            &errors[0],
            ConfigError::InvalidValue { key, .. } if key == "telegram.admin_id"
        ));
    }
}
