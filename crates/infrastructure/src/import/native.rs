//! Parser for Portage's own export format.

use serde_json::Value;
use std::collections::HashSet;

use portage_domain::{
    CanonicalCollection, CanonicalEnvironment, CanonicalFolder, CanonicalRequest, ErrorCode,
    ImportError, ImportFormat, ImportIr, ImportWarning, ParseOutcome, RawDocument, TempId,
    WarningCode,
};

use super::config::ImportConfig;
use super::parser::{
    DialectParser, ParseContext, UNTITLED_FOLDER, UNTITLED_REQUEST, array_field, child_path,
    decode_item, decode_unique, item_label, parse_json_object,
};
use crate::native::{
    NATIVE_VERSION, NativeCollection, NativeEnvironment, NativeFolder, NativeRequest,
};

/// Parser for `portage-collection-export` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeParser;

impl DialectParser for NativeParser {
    fn format(&self) -> ImportFormat {
        ImportFormat::Native
    }

    fn parse(&self, document: &RawDocument, config: &ImportConfig) -> ParseOutcome {
        let root = match parse_json_object(&document.content) {
            Ok(root) => root,
            Err(e) => return ParseOutcome::failed(e),
        };
        let (raw_folders, raw_requests, raw_environments) = match (
            array_field(&root, "folders"),
            array_field(&root, "requests"),
            array_field(&root, "environments"),
        ) {
            (Ok(folders), Ok(requests), Ok(environments)) => (folders, requests, environments),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return ParseOutcome::failed(e),
        };
        let collection = match root.get("collection") {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<NativeCollection>(value.clone()) {
                Ok(collection) => Some(collection),
                Err(e) => {
                    return ParseOutcome::failed(ImportError::new(
                        ErrorCode::InvalidStructure,
                        format!("Invalid collection block: {e}"),
                    ));
                }
            },
        };

        let mut ctx = ParseContext::new(config);
        let has_items = !raw_folders.is_empty() || !raw_requests.is_empty();
        let collection = match collection {
            Some(c) => Some(CanonicalCollection {
                name: if c.name.trim().is_empty() {
                    config.default_collection_name.clone()
                } else {
                    c.name
                },
                description: c.description,
                variables: c.variables,
            }),
            None if has_items => Some(CanonicalCollection {
                name: config.default_collection_name.clone(),
                ..CanonicalCollection::default()
            }),
            None => None,
        };
        let name = collection
            .as_ref()
            .map_or_else(|| "export".to_string(), |c| c.name.clone());

        if let Some(version) = root.get("version").and_then(Value::as_str) {
            if version != NATIVE_VERSION {
                ctx.warn(ImportWarning::info(
                    WarningCode::FieldDropped,
                    &name,
                    format!("Export version {version} differs from {NATIVE_VERSION}; unknown fields were ignored"),
                ));
            }
        }

        let mut seen = HashSet::new();
        let folders = decode_unique::<NativeFolder, _>(
            &mut ctx,
            raw_folders,
            &name,
            &mut seen,
            |f| f.id.clone(),
        );
        let requests = decode_unique::<NativeRequest, _>(
            &mut ctx,
            raw_requests,
            &name,
            &mut seen,
            |r| r.id.clone(),
        );

        let mut ir_folders = Vec::with_capacity(folders.len());
        for folder in folders {
            let path = child_path(&name, &folder.name);
            if !ctx.admit_item(&path) {
                continue;
            }
            ir_folders.push(CanonicalFolder {
                temp_id: TempId::new(folder.id),
                name: ctx.name_or(&folder.name, UNTITLED_FOLDER, &path),
                description: folder.description,
                parent: folder.parent_id.map(TempId::new),
                order: folder.order,
            });
        }

        let mut ir_requests = Vec::with_capacity(requests.len());
        for request in requests {
            let path = child_path(&name, &request.name);
            if !ctx.admit_item(&path) {
                continue;
            }
            ctx.count_disabled_headers(request.headers.iter().filter(|h| !h.enabled).count());
            ctx.count_disabled_params(request.query_params.iter().filter(|p| !p.enabled).count());
            let mut canonical = CanonicalRequest::new(
                TempId::new(request.id),
                ctx.name_or(&request.name, UNTITLED_REQUEST, &path),
                &request.method,
                request.url,
            );
            canonical.headers = request.headers;
            canonical.query_params = request.query_params;
            canonical.body = request.body;
            canonical.auth = request.auth;
            canonical.folder = request.folder_id.map(TempId::new);
            canonical.order = request.order;
            ir_requests.push(canonical);
        }

        let mut environments = Vec::with_capacity(raw_environments.len());
        for (i, value) in raw_environments.iter().enumerate() {
            let path = child_path(&name, &item_label(value, &format!("environment {}", i + 1)));
            let Some(env) = decode_item::<NativeEnvironment>(&mut ctx, value, &path) else {
                continue;
            };
            let env_name = ctx.name_or(&env.name, &config.default_environment_name, &path);
            environments.push(CanonicalEnvironment {
                display_name: env
                    .display_name
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| env_name.clone()),
                name: env_name,
                variables: env.variables,
                ..CanonicalEnvironment::default()
            });
        }

        tracing::debug!(
            collection = %name,
            folders = ir_folders.len(),
            requests = ir_requests.len(),
            "Parsed native export"
        );

        let ir = ImportIr {
            collection,
            folders: ir_folders,
            requests: ir_requests,
            environments,
        };
        ctx.finish(&name, ir)
    }
}
