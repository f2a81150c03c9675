//! Parser contract shared by every dialect, plus the bookkeeping each
//! parser needs while walking a document.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;

use portage_domain::{
    ErrorCode, ImportError, ImportFormat, ImportIr, ImportWarning, ParseOutcome, RawDocument,
    WarningCode,
};

use super::config::ImportConfig;

/// Name given to a folder whose source carries none.
pub(crate) const UNTITLED_FOLDER: &str = "Untitled Folder";

/// Name given to a request whose source carries none.
pub(crate) const UNTITLED_REQUEST: &str = "Untitled Request";

/// One parsing strategy per input dialect.
///
/// Implementations never panic and never abort on a single bad item: a
/// structurally unusable document yields exactly one [`ImportError`] and an
/// empty IR, anything else yields warnings.
pub trait DialectParser: Send + Sync {
    /// The dialect this parser understands.
    fn format(&self) -> ImportFormat;

    /// Converts the raw document into the canonical IR.
    fn parse(&self, document: &RawDocument, config: &ImportConfig) -> ParseOutcome;
}

/// Per-document state: warnings, the item budget and disabled-entry counts.
pub(crate) struct ParseContext<'a> {
    pub config: &'a ImportConfig,
    warnings: Vec<ImportWarning>,
    items: usize,
    limit_reported: bool,
    disabled_headers: usize,
    disabled_params: usize,
    disabled_variables: usize,
}

impl<'a> ParseContext<'a> {
    pub const fn new(config: &'a ImportConfig) -> Self {
        Self {
            config,
            warnings: Vec::new(),
            items: 0,
            limit_reported: false,
            disabled_headers: 0,
            disabled_params: 0,
            disabled_variables: 0,
        }
    }

    pub fn warn(&mut self, warning: ImportWarning) {
        self.warnings.push(warning);
    }

    /// Claims one slot of the item budget. Returns `false` once the budget is
    /// spent; the first refusal records a single warning.
    pub fn admit_item(&mut self, path: &str) -> bool {
        if self.items >= self.config.max_items {
            if !self.limit_reported {
                self.limit_reported = true;
                self.warn(ImportWarning::warning(
                    WarningCode::ItemLimitReached,
                    path,
                    format!(
                        "Document exceeds {} items; remaining items were dropped",
                        self.config.max_items
                    ),
                ));
            }
            return false;
        }
        self.items += 1;
        true
    }

    /// `name`, or `fallback` with a `NameDefaulted` warning when blank.
    pub fn name_or(&mut self, name: &str, fallback: &str, path: &str) -> String {
        if !name.trim().is_empty() {
            return name.to_string();
        }
        self.warn(ImportWarning::warning(
            WarningCode::NameDefaulted,
            path,
            format!("Item has no name; imported as '{fallback}'"),
        ));
        fallback.to_string()
    }

    pub fn count_disabled_headers(&mut self, n: usize) {
        self.disabled_headers += n;
    }

    pub fn count_disabled_params(&mut self, n: usize) {
        self.disabled_params += n;
    }

    pub fn count_disabled_variables(&mut self, n: usize) {
        self.disabled_variables += n;
    }

    /// Wraps up the document, appending the aggregate disabled-entry warning.
    pub fn finish(mut self, path: &str, ir: ImportIr) -> ParseOutcome {
        let mut parts = Vec::new();
        if self.disabled_headers > 0 {
            parts.push(format!("{} header(s)", self.disabled_headers));
        }
        if self.disabled_params > 0 {
            parts.push(format!("{} parameter(s)", self.disabled_params));
        }
        if self.disabled_variables > 0 {
            parts.push(format!("{} variable(s)", self.disabled_variables));
        }
        if !parts.is_empty() {
            self.warnings.push(ImportWarning::info(
                WarningCode::DisabledExcluded,
                path,
                format!("Disabled entries kept inactive: {}", parts.join(", ")),
            ));
        }
        ParseOutcome::parsed(ir, self.warnings)
    }
}

/// Parses the document as a JSON object.
pub(crate) fn parse_json_object(content: &str) -> Result<Map<String, Value>, ImportError> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ImportError::new(
            ErrorCode::InvalidStructure,
            "Document root must be a JSON object",
        )),
        Err(e) => Err(ImportError::new(
            ErrorCode::InvalidSyntax,
            format!("Invalid JSON: {e}"),
        )),
    }
}

/// An optional array field; absent or null reads as empty, anything else is fatal.
pub(crate) fn array_field<'v>(
    root: &'v Map<String, Value>,
    field: &str,
) -> Result<&'v [Value], ImportError> {
    match root.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ImportError::new(
            ErrorCode::InvalidStructure,
            format!("'{field}' must be an array"),
        )),
    }
}

/// Deserializes one item, turning a failure into an `ItemSkipped` warning.
pub(crate) fn decode_item<T: DeserializeOwned>(
    ctx: &mut ParseContext<'_>,
    value: &Value,
    path: &str,
) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(item) => Some(item),
        Err(e) => {
            ctx.warn(ImportWarning::error(
                WarningCode::ItemSkipped,
                path,
                format!("Malformed item was skipped: {e}"),
            ));
            None
        }
    }
}

/// Decodes items one by one, dropping repeated ids with a warning.
pub(crate) fn decode_unique<T, F>(
    ctx: &mut ParseContext<'_>,
    values: &[Value],
    collection: &str,
    seen: &mut HashSet<String>,
    id_of: F,
) -> Vec<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> String,
{
    let mut decoded = Vec::new();
    for (i, value) in values.iter().enumerate() {
        let path = child_path(collection, &item_label(value, &format!("item {}", i + 1)));
        let Some(item) = decode_item::<T>(ctx, value, &path) else {
            continue;
        };
        let id = id_of(&item);
        if !seen.insert(id.clone()) {
            ctx.warn(ImportWarning::warning(
                WarningCode::DuplicateId,
                &path,
                format!("Duplicate id '{id}' was dropped"),
            ));
            continue;
        }
        decoded.push(item);
    }
    decoded
}

/// Best-effort label for an item that failed to decode.
pub(crate) fn item_label(value: &Value, fallback: &str) -> String {
    value
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| fallback.to_string(), str::to_string)
}

/// Joins a warning path.
pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Deserializes strings leniently: numbers and booleans are stringified,
/// null becomes empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

/// Like [`lenient_string`], keeping absence distinct from empty.
pub(crate) fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| value_to_string(&v)))
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
