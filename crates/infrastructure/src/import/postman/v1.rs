//! Legacy Postman Collection v1 parser.
//!
//! Folders and requests arrive as parallel flat arrays. The parser indexes
//! them by id, derives each entity's parent from the foreign keys and the
//! `order`/`folders_order` lists, and reuses the source ids as temp ids.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use portage_domain::{
    AuthConfig, CanonicalCollection, CanonicalFolder, CanonicalRequest, ImportFormat, ImportIr,
    KeyValue, ParseOutcome, RawDocument, RequestBody, TempId,
};

use super::mapper::{
    binary_body, form_data_body, map_auth, map_variables, raw_body, unsupported_body,
    urlencoded_body, warn_scripts,
};
use super::types::{PostmanAuth, PostmanFormParam, PostmanVariable};
use super::v1_types::{PostmanV1Folder, PostmanV1Pair, PostmanV1Request};
use crate::import::config::ImportConfig;
use crate::import::parser::{
    DialectParser, ParseContext, UNTITLED_FOLDER, UNTITLED_REQUEST, array_field, child_path,
    decode_item, decode_unique, parse_json_object,
};

/// Parser for legacy Postman v1 collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostmanV1Parser;

impl DialectParser for PostmanV1Parser {
    fn format(&self) -> ImportFormat {
        ImportFormat::PostmanV1
    }

    fn parse(&self, document: &RawDocument, config: &ImportConfig) -> ParseOutcome {
        let root = match parse_json_object(&document.content) {
            Ok(root) => root,
            Err(e) => return ParseOutcome::failed(e),
        };
        let (raw_folders, raw_requests, raw_variables) = match (
            array_field(&root, "folders"),
            array_field(&root, "requests"),
            array_field(&root, "variables"),
        ) {
            (Ok(folders), Ok(requests), Ok(variables)) => (folders, requests, variables),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return ParseOutcome::failed(e),
        };

        let mut ctx = ParseContext::new(config);
        let name = root
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .map_or_else(|| config.default_collection_name.clone(), str::to_string);

        let variables: Vec<PostmanVariable> = raw_variables
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                decode_item(&mut ctx, v, &child_path(&name, &format!("variable {}", i + 1)))
            })
            .collect();
        let variables = map_variables(&mut ctx, &variables);
        let collection_auth = root
            .get("auth")
            .filter(|v| !v.is_null())
            .and_then(|v| decode_item::<PostmanAuth>(&mut ctx, v, &name))
            .and_then(|auth| map_auth(&mut ctx, &auth, &name))
            .unwrap_or_default();
        warn_scripts(
            &mut ctx,
            root.get("events")
                .and_then(Value::as_array)
                .is_some_and(|e| !e.is_empty()),
            &name,
            "Collection",
        );

        let mut seen = HashSet::new();
        let folders = decode_unique::<PostmanV1Folder, _>(
            &mut ctx,
            raw_folders,
            &name,
            &mut seen,
            |f| f.id.clone(),
        );
        let requests = decode_unique::<PostmanV1Request, _>(
            &mut ctx,
            raw_requests,
            &name,
            &mut seen,
            |r| r.id.clone(),
        );

        let index = FolderIndex::build(&root, &folders);

        let mut folder_auth: HashMap<&str, AuthConfig> = HashMap::new();
        let mut ir_folders = Vec::new();
        for (position, folder) in folders.iter().enumerate() {
            let path = child_path(&name, &folder.name);
            warn_scripts(&mut ctx, !folder.events.is_empty(), &path, "Folder");
            if let Some(auth) = folder
                .auth
                .as_ref()
                .and_then(|auth| map_auth(&mut ctx, auth, &path))
            {
                folder_auth.insert(folder.id.as_str(), auth);
            }
            if !ctx.admit_item(&path) {
                continue;
            }
            let parent = index.folder_parent.get(folder.id.as_str()).copied();
            let siblings = parent.map_or(&index.root_folders_order, |p| &index.folders[p].folders_order);
            ir_folders.push(CanonicalFolder {
                temp_id: TempId::new(&folder.id),
                name: ctx.name_or(&folder.name, UNTITLED_FOLDER, &path),
                description: folder.description.clone().filter(|d| !d.trim().is_empty()),
                parent: parent.map(|p| TempId::new(&index.folders[p].id)),
                order: listed_position(siblings, &folder.id, position),
            });
        }

        let mut ir_requests = Vec::new();
        for (position, request) in requests.iter().enumerate() {
            let path = child_path(&name, &request.name);
            warn_scripts(&mut ctx, request.has_scripts(), &path, "Request");
            if !ctx.admit_item(&path) {
                continue;
            }
            let folder = index.request_folder(request);
            let siblings = folder.map_or(&index.root_order, |f| &index.folders[f].order);

            let auth = match &request.auth {
                Some(explicit) if explicit.auth_type != "inherit" => {
                    map_auth(&mut ctx, explicit, &path).unwrap_or_default()
                }
                _ => index
                    .ancestors(folder)
                    .find_map(|f| folder_auth.get(index.folders[f].id.as_str()))
                    .cloned()
                    .unwrap_or_else(|| collection_auth.clone()),
            };

            let mut canonical = CanonicalRequest::new(
                TempId::new(&request.id),
                ctx.name_or(&request.name, UNTITLED_REQUEST, &path),
                &request.method,
                request.url.clone(),
            );
            canonical.headers = headers(&mut ctx, request);
            canonical.query_params = pairs(&request.query_params);
            ctx.count_disabled_params(request.query_params.iter().filter(|p| !p.enabled).count());
            canonical.body = body(&mut ctx, request, &path);
            canonical.auth = auth;
            canonical.folder = folder.map(|f| TempId::new(&index.folders[f].id));
            canonical.order = listed_position(siblings, &request.id, position);
            ir_requests.push(canonical);
        }

        tracing::debug!(
            collection = %name,
            folders = ir_folders.len(),
            requests = ir_requests.len(),
            "Parsed Postman v1 collection"
        );

        let ir = ImportIr {
            collection: Some(CanonicalCollection {
                name: name.clone(),
                description: root
                    .get("description")
                    .and_then(Value::as_str)
                    .filter(|d| !d.trim().is_empty())
                    .map(str::to_string),
                variables,
            }),
            folders: ir_folders,
            requests: ir_requests,
            environments: Vec::new(),
        };
        ctx.finish(&name, ir)
    }
}

/// Id-based lookups over the decoded folders.
struct FolderIndex<'f> {
    folders: &'f [PostmanV1Folder],
    by_id: HashMap<&'f str, usize>,
    /// Folder id to parent folder index.
    folder_parent: HashMap<&'f str, usize>,
    /// Request id to listing folder index.
    listed_requests: HashMap<String, usize>,
    root_order: Vec<String>,
    root_folders_order: Vec<String>,
}

impl<'f> FolderIndex<'f> {
    fn build(root: &Map<String, Value>, folders: &'f [PostmanV1Folder]) -> Self {
        let by_id: HashMap<&str, usize> = folders
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id.as_str(), i))
            .collect();

        // An explicit parent pointer wins over a listing in `folders_order`.
        let mut folder_parent = HashMap::new();
        for folder in folders {
            if let Some(&parent) = folder.folder.as_deref().and_then(|p| by_id.get(p)) {
                if folders[parent].id != folder.id {
                    folder_parent.insert(folder.id.as_str(), parent);
                }
            }
        }
        let mut listed_requests = HashMap::new();
        for (parent, folder) in folders.iter().enumerate() {
            for child in &folder.folders_order {
                if let Some((&id, _)) = by_id.get_key_value(child.as_str()) {
                    if id != folder.id {
                        folder_parent.entry(id).or_insert(parent);
                    }
                }
            }
            for request in &folder.order {
                listed_requests.entry(request.clone()).or_insert(parent);
            }
        }

        Self {
            folders,
            by_id,
            folder_parent,
            listed_requests,
            root_order: string_list(root.get("order")),
            root_folders_order: string_list(root.get("folders_order")),
        }
    }

    fn request_folder(&self, request: &PostmanV1Request) -> Option<usize> {
        request
            .folder
            .as_deref()
            .and_then(|id| self.by_id.get(id).copied())
            .or_else(|| self.listed_requests.get(&request.id).copied())
    }

    /// The folder itself, then its ancestors. Stops on a repeated folder.
    fn ancestors(&self, start: Option<usize>) -> impl Iterator<Item = usize> + '_ {
        let mut visited = HashSet::new();
        std::iter::successors(start, move |&current| {
            self.folder_parent
                .get(self.folders[current].id.as_str())
                .copied()
        })
        .take_while(move |&f| visited.insert(f))
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Position in the sibling listing, or after every listed sibling by array position.
fn listed_position(listing: &[String], id: &str, position: usize) -> u32 {
    let index = listing
        .iter()
        .position(|listed| listed == id)
        .unwrap_or(listing.len() + position);
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn pairs(pairs: &[PostmanV1Pair]) -> Vec<KeyValue> {
    pairs
        .iter()
        .map(|p| KeyValue {
            key: p.key.clone(),
            value: p.value.clone(),
            enabled: p.enabled,
        })
        .collect()
}

fn headers(ctx: &mut ParseContext<'_>, request: &PostmanV1Request) -> Vec<KeyValue> {
    let headers = match &request.header_data {
        Some(data) if !data.is_empty() => pairs(data),
        _ => parse_header_lines(&request.headers),
    };
    ctx.count_disabled_headers(headers.iter().filter(|h| !h.enabled).count());
    headers
}

/// Parses `Key: Value` lines; a `//` prefix marks the header disabled.
fn parse_header_lines(text: &str) -> Vec<KeyValue> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            let (enabled, line) = line
                .strip_prefix("//")
                .map_or((true, line), |rest| (false, rest.trim_start()));
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            (!key.is_empty()).then(|| KeyValue {
                key: key.to_string(),
                value: value.trim().to_string(),
                enabled,
            })
        })
        .collect()
}

fn form_params(pairs: &[PostmanV1Pair]) -> Vec<PostmanFormParam> {
    pairs
        .iter()
        .map(|p| PostmanFormParam {
            key: p.key.clone(),
            value: Some(p.value.clone()),
            src: p.src.clone(),
            param_type: p.pair_type.clone(),
            disabled: !p.enabled,
        })
        .collect()
}

fn body(ctx: &mut ParseContext<'_>, request: &PostmanV1Request, path: &str) -> Option<RequestBody> {
    let data = request.data.as_deref().unwrap_or_default();
    match request.data_mode.as_deref() {
        None | Some("" | "none") => None,
        Some("raw") => raw_body(request.raw_mode_data.clone().unwrap_or_default(), None),
        Some("urlencoded") => urlencoded_body(ctx, &form_params(data)),
        Some("params") => form_data_body(ctx, &form_params(data), path),
        Some("binary") => Some(binary_body(ctx, None, path)),
        Some("graphql") => request.graphql_mode_data.as_ref().map(|gql| RequestBody::Graphql {
            query: gql.query.clone(),
            variables: gql.variables.clone().filter(|v| !v.trim().is_empty()),
        }),
        Some(other) => {
            unsupported_body(ctx, other, path);
            None
        }
    }
}
