//! `.env` parser.
//!
//! Each non-blank line not starting with `#` must look like `KEY=VALUE`
//! (optionally prefixed by `export`). Lines that don't are skipped with a
//! warning. The whole file becomes a single environment.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use portage_domain::{
    CanonicalEnvironment, ImportFormat, ImportIr, ImportWarning, ParseOutcome, RawDocument,
    WarningCode,
};

use super::config::ImportConfig;
use super::parser::{DialectParser, ParseContext};

static LINE: OnceLock<Regex> = OnceLock::new();
static KEY: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn line_pattern() -> &'static Regex {
    LINE.get_or_init(|| {
        Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_.\-]*)\s*=\s*(.*)$").expect("valid regex")
    })
}

/// Whether `key` can be written as a `.env` variable name.
#[allow(clippy::expect_used)]
pub(crate) fn is_valid_key(key: &str) -> bool {
    KEY.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid regex"))
        .is_match(key)
}

/// Lines that carry content: not blank, not a comment.
pub(crate) fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Splits a `KEY=VALUE` line, stripping quotes and trailing comments.
pub(crate) fn parse_line(line: &str) -> Option<(String, String)> {
    let captures = line_pattern().captures(line)?;
    let key = captures.get(1)?.as_str().to_string();
    let raw = captures.get(2).map_or("", |m| m.as_str()).trim();
    Some((key, unquote(raw)))
}

fn unquote(raw: &str) -> String {
    if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                value.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => value.push('\n'),
                Some(escaped @ ('"' | '\\')) => value.push(escaped),
                Some(other) => {
                    value.push('\\');
                    value.push(other);
                }
                None => value.push('\\'),
            }
        }
        return value;
    }
    if let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        return inner.to_string();
    }
    raw.split_once(" #")
        .map_or(raw, |(value, _)| value)
        .trim_end()
        .to_string()
}

/// `.env` keeps the default name, `.env.staging` becomes `staging`, anything
/// else uses the file stem.
fn environment_name(document: &RawDocument, config: &ImportConfig) -> String {
    let file_name = document
        .filename
        .as_deref()
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned());
    match file_name.as_deref() {
        None | Some(".env") => config.default_environment_name.clone(),
        Some(name) => name
            .strip_prefix(".env.")
            .filter(|suffix| !suffix.is_empty())
            .map(str::to_string)
            .or_else(|| document.stem())
            .unwrap_or_else(|| config.default_environment_name.clone()),
    }
}

/// Parser for line-oriented `.env` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotEnvParser;

impl DialectParser for DotEnvParser {
    fn format(&self) -> ImportFormat {
        ImportFormat::DotEnv
    }

    fn parse(&self, document: &RawDocument, config: &ImportConfig) -> ParseOutcome {
        let name = environment_name(document, config);
        let mut ctx = ParseContext::new(config);
        let mut environment = CanonicalEnvironment::new(name.clone());

        for (number, line) in content_lines(&document.content) {
            match parse_line(line) {
                Some((key, value)) => {
                    environment.variables.insert(key, value);
                }
                None => ctx.warn(ImportWarning::warning(
                    WarningCode::MalformedLine,
                    format!("line {number}"),
                    "Line is not in KEY=VALUE form and was skipped",
                )),
            }
        }

        tracing::debug!(
            environment = %name,
            variables = environment.variables.len(),
            "Parsed .env file"
        );

        let ir = ImportIr {
            environments: vec![environment],
            ..ImportIr::default()
        };
        ctx.finish(&name, ir)
    }
}
