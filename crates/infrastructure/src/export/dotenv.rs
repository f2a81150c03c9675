//! `.env` writer.

use portage_domain::{
    ExportFormat, ExportOptions, ExportResult, ImportWarning, WarningCode, WorkspaceSnapshot,
};

use super::{ExportError, single_environment};
use crate::import::dotenv::is_valid_key;

/// Writes one environment as `KEY=VALUE` lines.
pub struct DotEnvExporter;

impl DotEnvExporter {
    /// Export the snapshot's first environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot has no environment.
    pub fn export(
        snapshot: &WorkspaceSnapshot,
        _options: &ExportOptions,
    ) -> Result<ExportResult, ExportError> {
        let format = ExportFormat::DotEnv;
        let mut result = ExportResult::new(String::new(), format, 0);
        let environment = single_environment(snapshot, format, &mut result)?;

        let mut content = String::new();
        for (key, value) in &environment.variables {
            if !is_valid_key(key) {
                result.add_warning(ImportWarning::warning(
                    WarningCode::FieldDropped,
                    format!("{}/{key}", environment.name),
                    format!("'{key}' is not a valid .env variable name and was skipped"),
                ));
                continue;
            }
            content.push_str(key);
            content.push('=');
            content.push_str(&quote(value));
            content.push('\n');
        }

        result.content = content;
        result.environment_count = 1;
        Ok(result)
    }
}

/// Quotes values the parser would otherwise split or strip.
fn quote(value: &str) -> String {
    let needs_quotes = value.contains([' ', '#', '\t'])
        || value.starts_with(['"', '\''])
        || value.contains('\n');
    if !needs_quotes {
        return value.to_string();
    }
    if value.contains('"') && !value.contains('\'') && !value.contains('\n') {
        return format!("'{value}'");
    }
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::import::{DialectParser, DotEnvParser, ImportConfig};
    use portage_domain::{EnvironmentRecord, RawDocument};
    use pretty_assertions::assert_eq;

    fn export(env: EnvironmentRecord) -> ExportResult {
        let snapshot = WorkspaceSnapshot {
            environments: vec![env],
            ..WorkspaceSnapshot::default()
        };
        DotEnvExporter::export(&snapshot, &ExportOptions::new(ExportFormat::DotEnv)).unwrap()
    }

    #[test]
    fn test_plain_and_quoted_values() {
        let result = export(
            EnvironmentRecord::new("dev")
                .with_variable("API_KEY", "abc123")
                .with_variable("GREETING", "hello world")
                .with_variable("TAG", "#1")
                .with_variable("JSON", r#"{"a": 1}"#),
        );
        assert_eq!(
            result.content,
            "API_KEY=abc123\nGREETING=\"hello world\"\nJSON='{\"a\": 1}'\nTAG=\"#1\"\n"
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_round_trip_through_parser() {
        let env = EnvironmentRecord::new("dev")
            .with_variable("A", "plain")
            .with_variable("B", "two words # not a comment")
            .with_variable("C", "line1\nline2")
            .with_variable("D", "");
        let result = export(env.clone());
        let outcome = DotEnvParser.parse(&RawDocument::new(result.content), &ImportConfig::default());
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.ir.environments[0].variables, env.variables);
    }

    #[test]
    fn test_invalid_keys_are_skipped() {
        let result = export(EnvironmentRecord::new("dev").with_variable("has space", "x"));
        assert!(result.content.is_empty());
        assert_eq!(result.warnings[0].code, WarningCode::FieldDropped);
    }
}
