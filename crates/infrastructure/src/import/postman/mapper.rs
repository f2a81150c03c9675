//! Postman to Portage field mapping.
//!
//! Shared by the v1 and v2 parsers. Each mapper records its own warnings on
//! the [`ParseContext`] so callers only deal with canonical values.

use serde_json::Value;
use std::collections::BTreeMap;

use portage_domain::{
    ApiKeyLocation, AuthConfig, FormDataField, ImportWarning, KeyValue, RequestBody, WarningCode,
};

use super::types::{
    PostmanAuth, PostmanBody, PostmanFormParam, PostmanHeader, PostmanQueryParam, PostmanVariable,
};
use crate::import::parser::ParseContext;

/// Auth types Postman supports that Portage cannot carry.
const UNSUPPORTED_AUTH: &[&str] = &[
    "digest", "hawk", "ntlm", "awsv4", "akamai", "asap", "edgegrid", "jwt",
];

/// Map headers, keeping disabled ones flagged.
pub(crate) fn map_headers(ctx: &mut ParseContext<'_>, headers: &[PostmanHeader]) -> Vec<KeyValue> {
    let disabled = headers.iter().filter(|h| h.disabled).count();
    ctx.count_disabled_headers(disabled);
    headers
        .iter()
        .map(|h| KeyValue {
            key: h.key.clone(),
            value: h.value.clone(),
            enabled: !h.disabled,
        })
        .collect()
}

/// Map query parameters, keeping disabled ones flagged.
pub(crate) fn map_query_params(
    ctx: &mut ParseContext<'_>,
    params: &[PostmanQueryParam],
) -> Vec<KeyValue> {
    let disabled = params.iter().filter(|p| p.disabled).count();
    ctx.count_disabled_params(disabled);
    params
        .iter()
        .map(|p| KeyValue {
            key: p.key.clone(),
            value: p.value.clone().unwrap_or_default(),
            enabled: !p.disabled,
        })
        .collect()
}

/// Classify raw text as JSON when the language says so or it looks like JSON.
pub(crate) fn raw_body(raw: String, language: Option<&str>) -> Option<RequestBody> {
    if raw.is_empty() {
        return None;
    }
    let trimmed = raw.trim_start();
    if language == Some("json") || trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(json) = serde_json::from_str::<Value>(&raw) {
            return Some(RequestBody::json(json));
        }
    }
    Some(RequestBody::text(raw))
}

/// Map urlencoded fields.
pub(crate) fn urlencoded_body(
    ctx: &mut ParseContext<'_>,
    params: &[PostmanFormParam],
) -> Option<RequestBody> {
    if params.is_empty() {
        return None;
    }
    ctx.count_disabled_params(params.iter().filter(|p| p.disabled).count());
    Some(RequestBody::FormUrlencoded {
        fields: params
            .iter()
            .map(|p| KeyValue {
                key: p.key.clone(),
                value: p.value.clone().unwrap_or_default(),
                enabled: !p.disabled,
            })
            .collect(),
    })
}

/// Map multipart fields; file parts keep only their reference.
pub(crate) fn form_data_body(
    ctx: &mut ParseContext<'_>,
    params: &[PostmanFormParam],
    path: &str,
) -> Option<RequestBody> {
    if params.is_empty() {
        return None;
    }
    ctx.count_disabled_params(params.iter().filter(|p| p.disabled).count());

    let fields: Vec<FormDataField> = params
        .iter()
        .map(|p| {
            if p.is_file() {
                FormDataField::File {
                    key: p.key.clone(),
                    src: p.src.clone(),
                    enabled: !p.disabled,
                }
            } else {
                FormDataField::Text {
                    key: p.key.clone(),
                    value: p.value.clone().unwrap_or_default(),
                    enabled: !p.disabled,
                }
            }
        })
        .collect();

    let file_count = fields
        .iter()
        .filter(|f| matches!(f, FormDataField::File { .. }))
        .count();
    if file_count > 0 {
        ctx.warn(ImportWarning::warning(
            WarningCode::FileContentMissing,
            path,
            format!("{file_count} file field(s) were imported without actual file content"),
        ));
    }

    Some(RequestBody::FormData { fields })
}

/// Binary body; the file itself never travels with the document.
pub(crate) fn binary_body(
    ctx: &mut ParseContext<'_>,
    filename: Option<String>,
    path: &str,
) -> RequestBody {
    ctx.warn(ImportWarning::warning(
        WarningCode::FileContentMissing,
        path,
        "Binary file body imported without actual content. The file must be re-attached.",
    ));
    RequestBody::Binary { filename }
}

/// Warn about a body mode nothing maps to.
pub(crate) fn unsupported_body(ctx: &mut ParseContext<'_>, mode: &str, path: &str) {
    ctx.warn(ImportWarning::warning(
        WarningCode::BodyUnsupported,
        path,
        format!("Unknown body mode '{mode}' was skipped"),
    ));
}

/// Map a v2 body.
pub(crate) fn map_body(
    ctx: &mut ParseContext<'_>,
    body: &PostmanBody,
    path: &str,
) -> Option<RequestBody> {
    match body.mode.as_str() {
        "" | "none" => None,
        "raw" => {
            let language = body
                .options
                .as_ref()
                .and_then(|o| o.raw.as_ref())
                .and_then(|r| r.language.as_deref());
            raw_body(body.raw.clone().unwrap_or_default(), language)
        }
        "urlencoded" => urlencoded_body(ctx, &body.urlencoded),
        "formdata" => form_data_body(ctx, &body.formdata, path),
        "file" => {
            let filename = body.file.as_ref().and_then(|f| f.src.clone());
            Some(binary_body(ctx, filename, path))
        }
        "graphql" => body.graphql.as_ref().map(|gql| RequestBody::Graphql {
            query: gql.query.clone(),
            variables: gql.variables.clone().filter(|v| !v.trim().is_empty()),
        }),
        other => {
            unsupported_body(ctx, other, path);
            None
        }
    }
}

/// Map an explicit auth block.
///
/// Returns `None` for `noauth`, `inherit`, and for types downgraded with a
/// warning; callers decide whether that means "no auth" or "keep inheriting".
pub(crate) fn map_auth(
    ctx: &mut ParseContext<'_>,
    auth: &PostmanAuth,
    path: &str,
) -> Option<AuthConfig> {
    match auth.auth_type.as_str() {
        "noauth" | "inherit" => None,
        "bearer" => Some(AuthConfig::bearer(
            PostmanAuth::get_param(&auth.bearer, "token").unwrap_or_default(),
        )),
        "basic" => Some(AuthConfig::basic(
            PostmanAuth::get_param(&auth.basic, "username").unwrap_or_default(),
            PostmanAuth::get_param(&auth.basic, "password").unwrap_or_default(),
        )),
        "apikey" => {
            let location = match PostmanAuth::get_param(&auth.apikey, "in").as_deref() {
                Some("query") => ApiKeyLocation::Query,
                _ => ApiKeyLocation::Header,
            };
            Some(AuthConfig::ApiKey {
                key: PostmanAuth::get_param(&auth.apikey, "key").unwrap_or_default(),
                value: PostmanAuth::get_param(&auth.apikey, "value").unwrap_or_default(),
                location,
            })
        }
        "oauth2" => {
            ctx.warn(ImportWarning::warning(
                WarningCode::AuthPartial,
                path,
                "OAuth2 configuration imported partially. Tokens may need to be re-configured.",
            ));
            Some(AuthConfig::Oauth2 {
                access_token: PostmanAuth::get_param(&auth.oauth2, "accessToken"),
                token_url: PostmanAuth::get_param(&auth.oauth2, "accessTokenUrl"),
            })
        }
        other if UNSUPPORTED_AUTH.contains(&other) => {
            ctx.warn(ImportWarning::warning(
                WarningCode::AuthDowngraded,
                path,
                format!("Authentication type '{other}' is not supported and was set to none"),
            ));
            None
        }
        other => {
            ctx.warn(ImportWarning::warning(
                WarningCode::AuthDowngraded,
                path,
                format!("Unknown authentication type '{other}' was set to none"),
            ));
            None
        }
    }
}

/// Collection variables; disabled ones are counted and left out.
pub(crate) fn map_variables(
    ctx: &mut ParseContext<'_>,
    variables: &[PostmanVariable],
) -> BTreeMap<String, String> {
    ctx.count_disabled_variables(variables.iter().filter(|v| v.disabled).count());
    variables
        .iter()
        .filter(|v| !v.disabled && !v.key.is_empty())
        .map(|v| (v.key.clone(), v.value.clone().unwrap_or_default()))
        .collect()
}

/// One info warning per owner carrying scripts.
pub(crate) fn warn_scripts(ctx: &mut ParseContext<'_>, has_scripts: bool, path: &str, owner: &str) {
    if has_scripts {
        ctx.warn(ImportWarning::info(
            WarningCode::ScriptsDropped,
            path,
            format!("{owner} scripts (pre-request/test) are not supported and were skipped"),
        ));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::import::config::ImportConfig;
    use pretty_assertions::assert_eq;

    fn auth(json: &str) -> PostmanAuth {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_raw_json_detection() {
        assert_eq!(
            raw_body(r#"{"a": 1}"#.to_string(), None),
            Some(RequestBody::json(serde_json::json!({"a": 1})))
        );
        assert_eq!(
            raw_body("{not json".to_string(), Some("json")),
            Some(RequestBody::text("{not json"))
        );
        assert_eq!(raw_body(String::new(), None), None);
    }

    #[test]
    fn test_apikey_query_location() {
        let config = ImportConfig::default();
        let mut ctx = ParseContext::new(&config);
        let mapped = map_auth(
            &mut ctx,
            &auth(
                r#"{"type": "apikey", "apikey": [
                    {"key": "key", "value": "X-Key"},
                    {"key": "value", "value": "s3cret"},
                    {"key": "in", "value": "query"}
                ]}"#,
            ),
            "req",
        );
        assert_eq!(
            mapped,
            Some(AuthConfig::ApiKey {
                key: "X-Key".to_string(),
                value: "s3cret".to_string(),
                location: ApiKeyLocation::Query,
            })
        );
    }

    #[test]
    fn test_unsupported_auth_is_downgraded_with_warning() {
        let config = ImportConfig::default();
        let mut ctx = ParseContext::new(&config);
        assert_eq!(map_auth(&mut ctx, &auth(r#"{"type": "digest"}"#), "req"), None);
        assert_eq!(map_auth(&mut ctx, &auth(r#"{"type": "mystery"}"#), "req"), None);
        assert_eq!(map_auth(&mut ctx, &auth(r#"{"type": "noauth"}"#), "req"), None);

        let outcome = ctx.finish("doc", portage_domain::ImportIr::default());
        let codes: Vec<_> = outcome.warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, vec![WarningCode::AuthDowngraded, WarningCode::AuthDowngraded]);
    }

    #[test]
    fn test_form_data_file_warns() {
        let config = ImportConfig::default();
        let mut ctx = ParseContext::new(&config);
        let params: Vec<PostmanFormParam> = serde_json::from_str(
            r#"[{"key": "name", "value": "x"}, {"key": "upload", "type": "file", "src": "/tmp/a.png"}]"#,
        )
        .unwrap();
        let body = form_data_body(&mut ctx, &params, "req").unwrap();
        match body {
            RequestBody::FormData { fields } => assert_eq!(fields.len(), 2),
            other => panic!("Expected form data, got {other:?}"),
        }
        let outcome = ctx.finish("doc", portage_domain::ImportIr::default());
        assert_eq!(outcome.warnings[0].code, WarningCode::FileContentMissing);
    }
}
