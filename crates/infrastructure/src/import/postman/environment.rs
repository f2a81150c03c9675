//! Postman environment parser.

use portage_domain::{
    CanonicalEnvironment, ImportFormat, ImportIr, ParseOutcome, RawDocument,
};
use serde_json::Value;

use super::environment_types::PostmanEnvVariable;
use crate::import::config::ImportConfig;
use crate::import::parser::{
    DialectParser, ParseContext, array_field, child_path, decode_item, item_label,
    parse_json_object,
};

/// Parser for `{id, name, values}` environment exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostmanEnvironmentParser;

impl DialectParser for PostmanEnvironmentParser {
    fn format(&self) -> ImportFormat {
        ImportFormat::PostmanEnvironment
    }

    fn parse(&self, document: &RawDocument, config: &ImportConfig) -> ParseOutcome {
        let root = match parse_json_object(&document.content) {
            Ok(root) => root,
            Err(e) => return ParseOutcome::failed(e),
        };
        let values = match array_field(&root, "values") {
            Ok(values) => values,
            Err(e) => return ParseOutcome::failed(e),
        };

        let name = root
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| config.default_environment_name.clone(), str::to_string);

        let mut ctx = ParseContext::new(config);
        let mut environment = CanonicalEnvironment::new(name.clone());
        let mut disabled = 0;
        for (i, value) in values.iter().enumerate() {
            let path = child_path(&name, &item_label(value, &format!("value {}", i + 1)));
            let Some(variable) = decode_item::<PostmanEnvVariable>(&mut ctx, value, &path) else {
                continue;
            };
            if variable.key.is_empty() {
                continue;
            }
            if variable.enabled {
                environment.variables.insert(variable.key, variable.value);
            } else {
                disabled += 1;
                environment
                    .disabled_variables
                    .insert(variable.key, variable.value);
            }
        }
        ctx.count_disabled_variables(disabled);

        tracing::debug!(
            environment = %name,
            variables = environment.variables.len(),
            disabled,
            "Parsed Postman environment"
        );

        let ir = ImportIr {
            environments: vec![environment],
            ..ImportIr::default()
        };
        ctx.finish(&name, ir)
    }
}
