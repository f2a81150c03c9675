//! Postman Collection v2.x parser.
//!
//! Walks the nested `item` tree. A node carrying an `item` array is a folder,
//! a node carrying a `request` is a leaf. Auth is resolved while walking, so
//! every emitted request holds its effective auth.

use serde_json::Value;
use std::collections::HashMap;

use portage_domain::{
    AuthConfig, CanonicalCollection, CanonicalFolder, CanonicalRequest, ErrorCode, ImportError,
    ImportFormat, ImportIr, ImportWarning, ParseOutcome, RawDocument, TempId, WarningCode,
};

use super::mapper::{map_auth, map_body, map_headers, map_query_params, map_variables, warn_scripts};
use super::types::{PostmanAuth, PostmanInfo, PostmanItem, PostmanRequest, PostmanVariable};
use crate::import::config::ImportConfig;
use crate::import::parser::{
    DialectParser, ParseContext, UNTITLED_FOLDER, UNTITLED_REQUEST, array_field, child_path,
    decode_item, item_label, parse_json_object,
};

/// Parser for Postman Collection v2.0 / v2.1 documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostmanV2Parser;

impl DialectParser for PostmanV2Parser {
    fn format(&self) -> ImportFormat {
        ImportFormat::PostmanV2
    }

    fn parse(&self, document: &RawDocument, config: &ImportConfig) -> ParseOutcome {
        let root = match parse_json_object(&document.content) {
            Ok(root) => root,
            Err(e) => return ParseOutcome::failed(e),
        };
        let items = match array_field(&root, "item") {
            Ok(items) => items,
            Err(e) => return ParseOutcome::failed(e),
        };
        let info: PostmanInfo = match root.get("info") {
            None | Some(Value::Null) => PostmanInfo::default(),
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(info) => info,
                Err(e) => {
                    return ParseOutcome::failed(ImportError::new(
                        ErrorCode::InvalidStructure,
                        format!("Invalid 'info' block: {e}"),
                    ));
                }
            },
        };
        let raw_variables = match array_field(&root, "variable") {
            Ok(variables) => variables,
            Err(e) => return ParseOutcome::failed(e),
        };

        let mut ctx = ParseContext::new(config);
        let name = info
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| config.default_collection_name.clone());

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
        let has_scripts = root
            .get("event")
            .and_then(Value::as_array)
            .is_some_and(|events| !events.is_empty());
        warn_scripts(&mut ctx, has_scripts, &name, "Collection");

        let mut walker = ItemWalker::new(&mut ctx);
        walker.walk(items, None, 0, &name, &collection_auth);
        let (folders, requests) = (walker.folders, walker.requests);

        tracing::debug!(
            collection = %name,
            folders = folders.len(),
            requests = requests.len(),
            "Parsed Postman v2 collection"
        );

        let ir = ImportIr {
            collection: Some(CanonicalCollection {
                name: name.clone(),
                description: info.description.and_then(|d| d.text()),
                variables,
            }),
            folders,
            requests,
            environments: Vec::new(),
        };
        ctx.finish(&name, ir)
    }
}

struct ItemWalker<'c, 'a> {
    ctx: &'c mut ParseContext<'a>,
    folders: Vec<CanonicalFolder>,
    requests: Vec<CanonicalRequest>,
    next_order: HashMap<Option<TempId>, u32>,
}

impl<'c, 'a> ItemWalker<'c, 'a> {
    fn new(ctx: &'c mut ParseContext<'a>) -> Self {
        Self {
            ctx,
            folders: Vec::new(),
            requests: Vec::new(),
            next_order: HashMap::new(),
        }
    }

    /// Sibling positions stay unique even when flattened folders merge their
    /// children into an ancestor.
    fn order_under(&mut self, parent: Option<&TempId>) -> u32 {
        let slot = self.next_order.entry(parent.cloned()).or_insert(0);
        let order = *slot;
        *slot += 1;
        order
    }

    fn walk(
        &mut self,
        items: &[Value],
        parent: Option<&TempId>,
        depth: usize,
        path: &str,
        inherited: &AuthConfig,
    ) {
        for (index, value) in items.iter().enumerate() {
            let item_path = child_path(path, &item_label(value, &format!("item {}", index + 1)));

            let Some(object) = value.as_object() else {
                self.skip(&item_path, "Item is not an object");
                continue;
            };
            let children = match object.get("item") {
                None | Some(Value::Null) => None,
                Some(Value::Array(children)) => Some(children.as_slice()),
                Some(_) => {
                    self.skip(&item_path, "'item' must be an array");
                    continue;
                }
            };

            // Children are decoded on their own so one bad leaf never takes
            // its siblings down with it.
            let mut shallow = object.clone();
            shallow.remove("item");
            let Some(item) =
                decode_item::<PostmanItem>(self.ctx, &Value::Object(shallow), &item_path)
            else {
                continue;
            };

            if let Some(children) = children {
                self.folder(&item, children, parent, depth, &item_path, inherited);
            } else if let Some(request) = &item.request {
                self.request(&item, request, parent, &item_path, inherited);
            } else {
                self.skip(&item_path, "Item has neither children nor a request");
            }
        }
    }

    fn folder(
        &mut self,
        item: &PostmanItem,
        children: &[Value],
        parent: Option<&TempId>,
        depth: usize,
        path: &str,
        inherited: &AuthConfig,
    ) {
        if item.request.is_some() {
            self.ctx.warn(ImportWarning::warning(
                WarningCode::StrayRequestDiscarded,
                path,
                "Item has both children and a request; imported as a folder",
            ));
        }
        warn_scripts(self.ctx, !item.event.is_empty(), path, "Folder");

        let effective = item
            .auth
            .as_ref()
            .and_then(|auth| map_auth(self.ctx, auth, path))
            .unwrap_or_else(|| inherited.clone());

        let max_depth = self.ctx.config.max_depth;
        if depth >= max_depth {
            self.ctx.warn(ImportWarning::warning(
                WarningCode::DepthFlattened,
                path,
                format!("Folder exceeds maximum depth of {max_depth} and was flattened"),
            ));
            self.walk(children, parent, depth, path, &effective);
            return;
        }

        if !self.ctx.admit_item(path) {
            return;
        }
        let temp_id = TempId::sequential("folder", self.folders.len() + 1);
        let order = self.order_under(parent);
        let name = self.ctx.name_or(&item.name, UNTITLED_FOLDER, path);
        self.folders.push(CanonicalFolder {
            temp_id: temp_id.clone(),
            name,
            description: item.description.as_ref().and_then(|d| d.text()),
            parent: parent.cloned(),
            order,
        });
        self.walk(children, Some(&temp_id), depth + 1, path, &effective);
    }

    fn request(
        &mut self,
        item: &PostmanItem,
        request: &PostmanRequest,
        parent: Option<&TempId>,
        path: &str,
        inherited: &AuthConfig,
    ) {
        warn_scripts(self.ctx, !item.event.is_empty(), path, "Request");
        if !self.ctx.admit_item(path) {
            return;
        }

        let auth = match request.auth.as_ref().or(item.auth.as_ref()) {
            Some(explicit) if explicit.auth_type != "inherit" => {
                map_auth(self.ctx, explicit, path).unwrap_or_default()
            }
            _ => inherited.clone(),
        };

        let name = self.ctx.name_or(&item.name, UNTITLED_REQUEST, path);
        let mut canonical = CanonicalRequest::new(
            TempId::sequential("request", self.requests.len() + 1),
            name,
            &request.method,
            request.url.raw(),
        );
        canonical.headers = map_headers(self.ctx, &request.header);
        canonical.query_params = map_query_params(self.ctx, request.url.query_params());
        canonical.body = request
            .body
            .as_ref()
            .and_then(|body| map_body(self.ctx, body, path));
        canonical.auth = auth;
        canonical.folder = parent.cloned();
        canonical.order = self.order_under(parent);
        self.requests.push(canonical);
    }

    fn skip(&mut self, path: &str, reason: &str) {
        self.ctx.warn(ImportWarning::error(
            WarningCode::ItemSkipped,
            path,
            format!("Malformed item was skipped: {reason}"),
        ));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use portage_domain::{ErrorCode, KeyValue, RequestBody};
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> ParseOutcome {
        PostmanV2Parser.parse(&RawDocument::new(json), &ImportConfig::default())
    }

    fn parse_with(json: &str, config: &ImportConfig) -> ParseOutcome {
        PostmanV2Parser.parse(&RawDocument::new(json), config)
    }

    fn codes(outcome: &ParseOutcome) -> Vec<WarningCode> {
        outcome.warnings.iter().map(|w| w.code).collect()
    }

    #[test]
    fn test_minimal_collection_yields_one_request_without_warnings() {
        let outcome = parse(
            r#"{"info":{"schema":"https://schema.getpostman.com/json/collection/v2.1.0/"},"item":[{"name":"Get Users","request":{"method":"GET","url":"https://api.test/users"}}]}"#,
        );

        assert!(!outcome.is_fatal());
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.ir.folders.len(), 0);
        assert_eq!(outcome.ir.requests.len(), 1);
        let request = &outcome.ir.requests[0];
        assert_eq!(request.name, "Get Users");
        assert_eq!(request.method, "GET");
        assert_eq!(request.url, "https://api.test/users");
        assert_eq!(
            outcome.ir.collection.as_ref().map(|c| c.name.as_str()),
            Some("Imported Collection")
        );
    }

    #[test]
    fn test_nested_folders_keep_parent_links_and_order() {
        let outcome = parse(
            r#"{
                "info": {"name": "My API", "schema": "v2.1"},
                "item": [
                    {"name": "Get Users", "request": {"method": "get", "url": "https://api.example.com/users"}},
                    {"name": "Auth", "item": [
                        {"name": "Login", "request": {"method": "POST", "url": "https://api.example.com/login"}},
                        {"name": "Tokens", "item": []}
                    ]}
                ],
                "variable": [{"key": "baseUrl", "value": "https://api.example.com"}]
            }"#,
        );

        let ir = &outcome.ir;
        assert_eq!(ir.folders.len(), 2);
        assert_eq!(ir.requests.len(), 2);
        assert_eq!(ir.requests[0].method, "GET");
        assert_eq!(ir.requests[0].folder, None);
        assert_eq!(ir.requests[0].order, 0);

        let auth_folder = &ir.folders[0];
        assert_eq!(auth_folder.name, "Auth");
        assert_eq!(auth_folder.parent, None);
        assert_eq!(auth_folder.order, 1);

        assert_eq!(ir.requests[1].folder, Some(auth_folder.temp_id.clone()));
        assert_eq!(ir.folders[1].parent, Some(auth_folder.temp_id.clone()));
        assert_eq!(ir.folders[1].order, 1);

        let collection = ir.collection.as_ref().unwrap();
        assert_eq!(collection.name, "My API");
        assert_eq!(
            collection.variables.get("baseUrl").map(String::as_str),
            Some("https://api.example.com")
        );
    }

    #[test]
    fn test_item_with_children_and_request_is_a_folder() {
        let outcome = parse(
            r#"{"info": {"name": "C"}, "item": [
                {"name": "Both", "item": [], "request": {"method": "GET", "url": "/x"}}
            ]}"#,
        );
        assert_eq!(outcome.ir.folders.len(), 1);
        assert!(outcome.ir.requests.is_empty());
        assert_eq!(codes(&outcome), vec![WarningCode::StrayRequestDiscarded]);
    }

    #[test]
    fn test_auth_inherits_nearest_non_noauth_ancestor() {
        let outcome = parse(
            r#"{
                "info": {"name": "C"},
                "auth": {"type": "bearer", "bearer": [{"key": "token", "value": "root"}]},
                "item": [
                    {"name": "Open", "auth": {"type": "noauth"}, "item": [
                        {"name": "Inherits", "request": {"method": "GET", "url": "/a"}},
                        {"name": "Explicit none", "request": {"method": "GET", "url": "/b", "auth": {"type": "noauth"}}}
                    ]},
                    {"name": "Basic", "auth": {"type": "basic", "basic": [{"key": "username", "value": "u"}]}, "item": [
                        {"name": "Nested", "request": {"method": "GET", "url": "/c"}}
                    ]}
                ]
            }"#,
        );

        let auth_of = |name: &str| {
            outcome
                .ir
                .requests
                .iter()
                .find(|r| r.name == name)
                .map(|r| r.auth.clone())
                .unwrap()
        };
        assert_eq!(auth_of("Inherits"), AuthConfig::bearer("root"));
        assert_eq!(auth_of("Explicit none"), AuthConfig::None);
        assert_eq!(auth_of("Nested"), AuthConfig::basic("u", ""));
    }

    #[test]
    fn test_unknown_request_auth_is_downgraded_not_inherited() {
        let outcome = parse(
            r#"{"info": {"name": "C"},
                "auth": {"type": "bearer", "bearer": [{"key": "token", "value": "root"}]},
                "item": [{"name": "R", "request": {"method": "GET", "url": "/", "auth": {"type": "hawk"}}}]}"#,
        );
        assert_eq!(outcome.ir.requests[0].auth, AuthConfig::None);
        assert_eq!(codes(&outcome), vec![WarningCode::AuthDowngraded]);
    }

    #[test]
    fn test_disabled_entries_are_flagged_and_counted_once() {
        let outcome = parse(
            r#"{"info": {"name": "C"}, "item": [{"name": "R", "request": {
                "method": "GET",
                "url": {"raw": "https://x.test?a=1&b=2", "query": [
                    {"key": "a", "value": "1"},
                    {"key": "b", "value": "2", "disabled": true}
                ]},
                "header": [
                    {"key": "Accept", "value": "*/*"},
                    {"key": "X-Debug", "value": "1", "disabled": true}
                ]
            }}]}"#,
        );

        let request = &outcome.ir.requests[0];
        assert_eq!(
            request.headers,
            vec![KeyValue::new("Accept", "*/*"), KeyValue::disabled("X-Debug", "1")]
        );
        assert_eq!(request.query_params.len(), 2);
        assert!(!request.query_params[1].enabled);
        assert_eq!(codes(&outcome), vec![WarningCode::DisabledExcluded]);
    }

    #[test]
    fn test_bodies_are_mapped() {
        let outcome = parse(
            r#"{"info": {"name": "C"}, "item": [
                {"name": "Json", "request": {"method": "POST", "url": "/", "body": {"mode": "raw", "raw": "{\"a\": 1}", "options": {"raw": {"language": "json"}}}}},
                {"name": "Form", "request": {"method": "POST", "url": "/", "body": {"mode": "urlencoded", "urlencoded": [{"key": "k", "value": "v"}]}}},
                {"name": "Gql", "request": {"method": "POST", "url": "/", "body": {"mode": "graphql", "graphql": {"query": "{ me }"}}}}
            ]}"#,
        );

        let bodies: Vec<_> = outcome.ir.requests.iter().map(|r| r.body.clone()).collect();
        assert_eq!(bodies[0], Some(RequestBody::json(serde_json::json!({"a": 1}))));
        assert_eq!(
            bodies[1],
            Some(RequestBody::FormUrlencoded {
                fields: vec![KeyValue::new("k", "v")]
            })
        );
        assert_eq!(
            bodies[2],
            Some(RequestBody::Graphql {
                query: "{ me }".to_string(),
                variables: None
            })
        );
    }

    #[test]
    fn test_malformed_item_is_skipped_and_siblings_survive() {
        let outcome = parse(
            r#"{"info": {"name": "C"}, "item": [
                {"name": "Bad", "request": {"method": 42}},
                "not an object",
                {"name": "Good", "request": {"method": "GET", "url": "/ok"}}
            ]}"#,
        );
        assert!(!outcome.is_fatal());
        assert_eq!(outcome.ir.requests.len(), 1);
        assert_eq!(outcome.ir.requests[0].name, "Good");
        assert_eq!(
            codes(&outcome),
            vec![WarningCode::ItemSkipped, WarningCode::ItemSkipped]
        );
        assert_eq!(outcome.warnings[0].path, "C/Bad");
    }

    #[test]
    fn test_unnamed_items_get_default_names() {
        let outcome = parse(
            r#"{"info": {"name": "C"}, "item": [
                {"request": {"method": "GET", "url": "https://a.test"}},
                {"name": " ", "item": [{"name": "Inner", "request": {"url": "/i"}}]}
            ]}"#,
        );
        assert_eq!(outcome.ir.requests[0].name, "Untitled Request");
        assert_eq!(outcome.ir.folders[0].name, "Untitled Folder");
        assert_eq!(
            codes(&outcome),
            vec![WarningCode::NameDefaulted, WarningCode::NameDefaulted]
        );
        assert_eq!(outcome.warnings[0].path, "C/item 1");
    }

    #[test]
    fn test_structural_failure_is_one_fatal_error() {
        let outcome = parse(r#"{"info": {"name": "C"}, "item": {"oops": true}}"#);
        assert!(outcome.is_fatal());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].code, ErrorCode::InvalidStructure);
        assert!(outcome.ir.is_empty());

        let outcome = parse("{ not json");
        assert_eq!(outcome.errors[0].code, ErrorCode::InvalidSyntax);
    }

    #[test]
    fn test_depth_beyond_limit_is_flattened() {
        let config = ImportConfig {
            max_depth: 1,
            ..ImportConfig::default()
        };
        let outcome = parse_with(
            r#"{"info": {"name": "C"}, "item": [
                {"name": "Top", "item": [
                    {"name": "Deep", "item": [
                        {"name": "Leaf", "request": {"method": "GET", "url": "/leaf"}}
                    ]},
                    {"name": "Sibling", "request": {"method": "GET", "url": "/s"}}
                ]}
            ]}"#,
            &config,
        );

        assert_eq!(outcome.ir.folders.len(), 1);
        let top = &outcome.ir.folders[0].temp_id;
        let orders: Vec<_> = outcome
            .ir
            .requests
            .iter()
            .map(|r| (r.name.as_str(), r.folder.as_ref(), r.order))
            .collect();
        assert_eq!(
            orders,
            vec![("Leaf", Some(top), 0), ("Sibling", Some(top), 1)]
        );
        assert_eq!(codes(&outcome), vec![WarningCode::DepthFlattened]);
    }

    #[test]
    fn test_item_limit_drops_the_rest_with_one_warning() {
        let config = ImportConfig {
            max_items: 2,
            ..ImportConfig::default()
        };
        let outcome = parse_with(
            r#"{"info": {"name": "C"}, "item": [
                {"name": "A", "request": {"url": "/a"}},
                {"name": "B", "request": {"url": "/b"}},
                {"name": "C", "request": {"url": "/c"}},
                {"name": "D", "request": {"url": "/d"}}
            ]}"#,
            &config,
        );
        assert_eq!(outcome.ir.requests.len(), 2);
        assert_eq!(codes(&outcome), vec![WarningCode::ItemLimitReached]);
    }

    #[test]
    fn test_scripts_warn_once_per_owner() {
        let outcome = parse(
            r#"{"info": {"name": "C"},
                "event": [{"listen": "prerequest"}],
                "item": [{"name": "R", "event": [{"listen": "test"}, {"listen": "prerequest"}],
                          "request": {"url": "/"}}]}"#,
        );
        assert_eq!(
            codes(&outcome),
            vec![WarningCode::ScriptsDropped, WarningCode::ScriptsDropped]
        );
    }
}
