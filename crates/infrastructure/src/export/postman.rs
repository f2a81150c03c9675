//! Postman Collection v2.1 and Postman Environment writers.
//!
//! Field mapping mirrors the importer. Every request carries its effective
//! auth, so no inheritance is reconstructed on the way out.

use chrono::Utc;
use std::collections::HashSet;

use portage_domain::persistence::active_entries;
use portage_domain::{
    ApiKeyLocation, AuthConfig, ExportFormat, ExportOptions, ExportResult, FolderRecord,
    FormDataField, ImportWarning, KeyValue, RequestBody, RequestRecord, WarningCode,
    WorkspaceSnapshot,
};

use super::{ExportError, single_environment};
use crate::import::postman::types::{
    PostmanAuth, PostmanAuthParam, PostmanBody, PostmanBodyFile, PostmanBodyOptions,
    PostmanCollection, PostmanDescription, PostmanFormParam, PostmanGraphQL, PostmanHeader,
    PostmanInfo, PostmanItem, PostmanQueryParam, PostmanRawOptions, PostmanRequest, PostmanUrl,
    PostmanUrlStructured, PostmanVariable, SCHEMA_V2_1,
};
use crate::import::postman::{PostmanEnvVariable, PostmanEnvironment};
use crate::serialization::to_json;

/// Writes Postman Collection v2.1 documents.
pub struct PostmanV2Exporter;

impl PostmanV2Exporter {
    /// Export the snapshot's collection tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot has no collection or serialization fails.
    pub fn export(
        snapshot: &WorkspaceSnapshot,
        options: &ExportOptions,
    ) -> Result<ExportResult, ExportError> {
        let collection = snapshot
            .collection
            .as_ref()
            .ok_or(ExportError::MissingCollection {
                format: ExportFormat::PostmanV2,
            })?;

        let tree = Tree::new(snapshot, options.include_disabled);
        let document = PostmanCollection {
            info: PostmanInfo {
                name: Some(collection.name.clone()),
                postman_id: collection.id.clone(),
                description: collection.description.clone().map(PostmanDescription::Text),
                schema: Some(SCHEMA_V2_1.to_string()),
            },
            item: tree.items(None, &mut HashSet::new()),
            variable: collection
                .variables
                .iter()
                .map(|(key, value)| PostmanVariable {
                    key: key.clone(),
                    value: Some(value.clone()),
                    var_type: Some("string".to_string()),
                    disabled: false,
                })
                .collect(),
            auth: None,
            event: Vec::new(),
        };

        let content = to_json(&document, options.pretty_print)?;
        let mut result = ExportResult::new(content, ExportFormat::PostmanV2, snapshot.requests.len());
        if !snapshot.environments.is_empty() {
            result.add_warning(ImportWarning::info(
                WarningCode::FieldDropped,
                &collection.name,
                format!(
                    "Postman collections do not carry environments; {} environment(s) were left out",
                    snapshot.environments.len()
                ),
            ));
        }
        Ok(result)
    }
}

/// Parent lookups over the snapshot. Dangling parent pointers read as root.
struct Tree<'s> {
    snapshot: &'s WorkspaceSnapshot,
    folder_ids: HashSet<&'s str>,
    include_disabled: bool,
}

enum Node<'s> {
    Folder(&'s FolderRecord),
    Request(&'s RequestRecord),
}

impl<'s> Tree<'s> {
    fn new(snapshot: &'s WorkspaceSnapshot, include_disabled: bool) -> Self {
        Self {
            snapshot,
            folder_ids: snapshot
                .folders
                .iter()
                .filter_map(|f| f.id.as_deref())
                .collect(),
            include_disabled,
        }
    }

    fn parent_of<'a>(&self, id: Option<&'a str>) -> Option<&'a str> {
        id.filter(|id| self.folder_ids.contains(id))
    }

    /// A folder pointing at itself sits at the root.
    fn folder_parent<'a>(&self, folder: &'a FolderRecord) -> Option<&'a str> {
        self.parent_of(folder.parent_id.as_deref())
            .filter(|parent| folder.id.as_deref() != Some(*parent))
    }

    /// Folders and requests under `parent`, by order with folders first on ties.
    fn items(&self, parent: Option<&str>, visited: &mut HashSet<&'s str>) -> Vec<PostmanItem> {
        let mut nodes: Vec<(u32, u8, usize, Node<'s>)> = Vec::new();
        for (i, folder) in self.snapshot.folders.iter().enumerate() {
            if self.folder_parent(folder) == parent {
                nodes.push((folder.order, 0, i, Node::Folder(folder)));
            }
        }
        for (i, request) in self.snapshot.requests.iter().enumerate() {
            if self.parent_of(request.folder_id.as_deref()) == parent {
                nodes.push((request.order, 1, i, Node::Request(request)));
            }
        }
        nodes.sort_by_key(|(order, kind, index, _)| (*order, *kind, *index));

        nodes
            .into_iter()
            .filter_map(|(_, _, _, node)| match node {
                Node::Folder(folder) => {
                    let id = folder.id.as_deref();
                    if let Some(id) = id {
                        if !visited.insert(id) {
                            return None;
                        }
                    }
                    Some(PostmanItem {
                        name: folder.name.clone(),
                        description: folder.description.clone().map(PostmanDescription::Text),
                        item: Some(id.map_or_else(Vec::new, |id| self.items(Some(id), visited))),
                        request: None,
                        event: Vec::new(),
                        auth: None,
                    })
                }
                Node::Request(request) => Some(PostmanItem {
                    name: request.name.clone(),
                    description: None,
                    item: None,
                    request: Some(self.request(request)),
                    event: Vec::new(),
                    auth: None,
                }),
            })
            .collect()
    }

    fn request(&self, request: &RequestRecord) -> PostmanRequest {
        let query = active_entries(&request.query_params, self.include_disabled)
            .into_iter()
            .map(|kv| PostmanQueryParam {
                key: kv.key,
                value: Some(kv.value),
                disabled: !kv.enabled,
            })
            .collect();
        PostmanRequest {
            method: request.method.clone(),
            url: PostmanUrl::Structured(PostmanUrlStructured {
                raw: Some(request.url.clone()),
                query,
            }),
            header: active_entries(&request.headers, self.include_disabled)
                .into_iter()
                .map(|kv| PostmanHeader {
                    key: kv.key,
                    value: kv.value,
                    disabled: !kv.enabled,
                })
                .collect(),
            body: request
                .body
                .as_ref()
                .map(|body| map_body(body, self.include_disabled)),
            auth: map_auth(&request.auth),
            description: None,
        }
    }
}

fn form_params(fields: &[KeyValue], include_disabled: bool) -> Vec<PostmanFormParam> {
    active_entries(fields, include_disabled)
        .into_iter()
        .map(|kv| PostmanFormParam {
            key: kv.key,
            value: Some(kv.value),
            src: None,
            param_type: None,
            disabled: !kv.enabled,
        })
        .collect()
}

fn map_body(body: &RequestBody, include_disabled: bool) -> PostmanBody {
    match body {
        RequestBody::Json { content } => PostmanBody {
            mode: "raw".to_string(),
            raw: Some(serde_json::to_string_pretty(content).unwrap_or_else(|_| content.to_string())),
            options: Some(PostmanBodyOptions {
                raw: Some(PostmanRawOptions {
                    language: Some("json".to_string()),
                }),
            }),
            ..PostmanBody::default()
        },
        RequestBody::Text { content } => PostmanBody {
            mode: "raw".to_string(),
            raw: Some(content.clone()),
            ..PostmanBody::default()
        },
        RequestBody::FormUrlencoded { fields } => PostmanBody {
            mode: "urlencoded".to_string(),
            urlencoded: form_params(fields, include_disabled),
            ..PostmanBody::default()
        },
        RequestBody::FormData { fields } => PostmanBody {
            mode: "formdata".to_string(),
            formdata: fields
                .iter()
                .filter(|f| include_disabled || f.enabled())
                .map(|field| match field {
                    FormDataField::Text { key, value, enabled } => PostmanFormParam {
                        key: key.clone(),
                        value: Some(value.clone()),
                        src: None,
                        param_type: Some("text".to_string()),
                        disabled: !enabled,
                    },
                    FormDataField::File { key, src, enabled } => PostmanFormParam {
                        key: key.clone(),
                        value: None,
                        src: src.clone(),
                        param_type: Some("file".to_string()),
                        disabled: !enabled,
                    },
                })
                .collect(),
            ..PostmanBody::default()
        },
        RequestBody::Binary { filename } => PostmanBody {
            mode: "file".to_string(),
            file: Some(PostmanBodyFile {
                src: filename.clone(),
            }),
            ..PostmanBody::default()
        },
        RequestBody::Graphql { query, variables } => PostmanBody {
            mode: "graphql".to_string(),
            graphql: Some(PostmanGraphQL {
                query: query.clone(),
                variables: variables.clone(),
            }),
            ..PostmanBody::default()
        },
    }
}

fn map_auth(auth: &AuthConfig) -> Option<PostmanAuth> {
    let mut mapped = PostmanAuth::of_type(match auth {
        AuthConfig::None => return None,
        AuthConfig::ApiKey { .. } => "apikey",
        other => other.kind(),
    });
    match auth {
        AuthConfig::None => {}
        AuthConfig::Bearer { token } => {
            mapped.bearer = vec![PostmanAuthParam::string("token", token.clone())];
        }
        AuthConfig::Basic { username, password } => {
            mapped.basic = vec![
                PostmanAuthParam::string("username", username.clone()),
                PostmanAuthParam::string("password", password.clone()),
            ];
        }
        AuthConfig::ApiKey {
            key,
            value,
            location,
        } => {
            let location = match location {
                ApiKeyLocation::Header => "header",
                ApiKeyLocation::Query => "query",
            };
            mapped.apikey = vec![
                PostmanAuthParam::string("key", key.clone()),
                PostmanAuthParam::string("value", value.clone()),
                PostmanAuthParam::string("in", location),
            ];
        }
        AuthConfig::Oauth2 {
            access_token,
            token_url,
        } => {
            mapped.oauth2 = [("accessToken", access_token), ("accessTokenUrl", token_url)]
                .into_iter()
                .filter_map(|(key, value)| {
                    value
                        .as_ref()
                        .map(|v| PostmanAuthParam::string(key, v.clone()))
                })
                .collect();
        }
    }
    Some(mapped)
}

/// Writes Postman environment documents.
pub struct PostmanEnvironmentExporter;

impl PostmanEnvironmentExporter {
    /// Export the snapshot's first environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot has no environment or serialization fails.
    pub fn export(
        snapshot: &WorkspaceSnapshot,
        options: &ExportOptions,
    ) -> Result<ExportResult, ExportError> {
        let format = ExportFormat::PostmanEnvironment;
        let mut result = ExportResult::new(String::new(), format, 0);
        let environment = single_environment(snapshot, format, &mut result)?;

        let document = PostmanEnvironment {
            id: environment.id.clone(),
            name: Some(environment.name.clone()),
            values: environment
                .variables
                .iter()
                .map(|(key, value)| PostmanEnvVariable::new(key.clone(), value.clone()))
                .collect(),
            postman_variable_scope: Some("environment".to_string()),
            postman_exported_at: Some(Utc::now().to_rfc3339()),
        };
        result.content = to_json(&document, options.pretty_print)?;
        result.environment_count = 1;
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::import::{DialectParser, ImportConfig, PostmanEnvironmentParser, PostmanV2Parser};
    use portage_domain::{CollectionRecord, EnvironmentRecord, RawDocument};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn as_value(content: &str) -> Value {
        serde_json::from_str(content).unwrap()
    }

    fn snapshot() -> WorkspaceSnapshot {
        let mut collection = CollectionRecord::new("Shop").with_variable("host", "shop.test");
        collection.id = Some("c1".to_string());
        let mut orders = FolderRecord::new("c1", "Orders").with_order(1);
        orders.id = Some("f1".to_string());
        let mut list = RequestRecord::new("c1", "List orders", "GET", "{{host}}/orders").in_folder("f1");
        list.auth = AuthConfig::ApiKey {
            key: "X-Key".to_string(),
            value: "k".to_string(),
            location: ApiKeyLocation::Query,
        };
        let mut ping = RequestRecord::new("c1", "Ping", "POST", "{{host}}/ping");
        ping.body = Some(RequestBody::json(json!({"ping": true})));
        WorkspaceSnapshot {
            collection: Some(collection),
            folders: vec![orders],
            requests: vec![list, ping],
            environments: Vec::new(),
        }
    }

    #[test]
    fn test_v2_tree_and_schema() {
        let result = PostmanV2Exporter::export(&snapshot(), &ExportOptions::default()).unwrap();
        let value = as_value(&result.content);
        assert_eq!(value["info"]["schema"], json!(SCHEMA_V2_1));
        assert_eq!(value["item"][0]["name"], json!("Ping"));
        assert_eq!(value["item"][1]["name"], json!("Orders"));
        assert_eq!(value["item"][1]["item"][0]["request"]["auth"]["type"], json!("apikey"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_v2_reimport_keeps_requests_and_auth() {
        let result = PostmanV2Exporter::export(&snapshot(), &ExportOptions::default()).unwrap();
        let outcome = PostmanV2Parser.parse(&RawDocument::new(result.content), &ImportConfig::default());
        assert!(outcome.warnings.is_empty());
        let ir = outcome.ir;
        assert_eq!(ir.collection.unwrap().variables["host"], "shop.test");

        let list = ir.requests.iter().find(|r| r.name == "List orders").unwrap();
        assert_eq!(list.url, "{{host}}/orders");
        assert!(matches!(list.auth, AuthConfig::ApiKey { location: ApiKeyLocation::Query, .. }));
        let ping = ir.requests.iter().find(|r| r.name == "Ping").unwrap();
        assert_eq!(ping.body, Some(RequestBody::json(json!({"ping": true}))));
    }

    #[test]
    fn test_v2_requires_collection() {
        let err = PostmanV2Exporter::export(&WorkspaceSnapshot::default(), &ExportOptions::default());
        assert!(matches!(err, Err(ExportError::MissingCollection { .. })));
    }

    #[test]
    fn test_v2_warns_about_environments() {
        let mut snapshot = snapshot();
        snapshot.environments.push(EnvironmentRecord::new("dev"));
        let result = PostmanV2Exporter::export(&snapshot, &ExportOptions::default()).unwrap();
        assert_eq!(result.warnings[0].code, WarningCode::FieldDropped);
    }

    #[test]
    fn test_environment_export_round_trip() {
        let snapshot = WorkspaceSnapshot {
            environments: vec![
                EnvironmentRecord::new("staging").with_variable("BASE_URL", "https://staging.test"),
                EnvironmentRecord::new("prod"),
            ],
            ..WorkspaceSnapshot::default()
        };
        let result = PostmanEnvironmentExporter::export(&snapshot, &ExportOptions::default()).unwrap();
        assert_eq!(result.environment_count, 1);
        assert_eq!(result.warnings.len(), 1);

        let outcome = PostmanEnvironmentParser
            .parse(&RawDocument::new(result.content), &ImportConfig::default());
        let env = &outcome.ir.environments[0];
        assert_eq!(env.name, "staging");
        assert_eq!(env.variables["BASE_URL"], "https://staging.test");
    }

    #[test]
    fn test_environment_export_needs_an_environment() {
        let err = PostmanEnvironmentExporter::export(&WorkspaceSnapshot::default(), &ExportOptions::default());
        assert!(matches!(err, Err(ExportError::NothingToExport { .. })));
    }
}
