//! Postman collection translator.
//!
//! Mechanical mapping from the finished Swagger document to a Postman
//! collection v2.1: one item group per tag, one request per operation.
//! Swagger `{x}` path parameters become Postman `:x` variables. Item groups
//! sort alphabetically, with an optional pinned group first.

use crate::swagger::{Operation, Parameter, Swagger};
use indexmap::IndexMap;
use serde::Serialize;

const SCHEMA_V210: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

const COLLECTION_DESCRIPTION: &str = "# API POSTMAN COLLECTION\\n## Usage\\nPut `{{BASE_URL}}` as environment. For more context, refer to: https://learning.postman.com/docs/sending-requests/variables/.";

/// Postman collection v2.1
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub info: CollectionInfo,
    pub item: Vec<ItemGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub schema: String,
}

/// One folder of requests, grouped by tag
#[derive(Debug, Clone, Serialize)]
pub struct ItemGroup {
    pub name: String,
    pub item: Vec<RequestItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestItem {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub request: Request,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response: Vec<ResponseStub>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub url: Url,
    pub method: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<Header>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Url {
    pub host: Vec<String>,
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParam>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<Variable>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Body {
    pub mode: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formdata: Vec<Variable>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryParam {
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Variable {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub var_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseStub {
    pub status: String,
    pub code: i64,
    pub name: String,
}

fn base_headers() -> Vec<Header> {
    vec![
        Header { key: "Accept".to_string(), value: "application/json".to_string() },
        Header { key: "Content-Language".to_string(), value: "{{CONTENT_LANGUAGE}}".to_string() },
        Header { key: "User-Agent".to_string(), value: "{{USER_AGENT}}".to_string() },
    ]
}

/// Translate a finished document into a collection.
///
/// `pin_first` names an item group that sorts before all others; remaining
/// groups sort alphabetically.
pub fn translate(doc: &Swagger, pin_first: Option<&str>) -> Collection {
    let mut groups: IndexMap<String, ItemGroup> = IndexMap::new();

    for (path, item) in &doc.paths {
        let url = postman_url(&format!("{}{}", doc.base_path, path));

        for (method, op) in item.operations() {
            let group_name =
                op.tags.first().cloned().unwrap_or_else(|| "default".to_string());
            let group = groups
                .entry(group_name.clone())
                .or_insert_with(|| ItemGroup { name: group_name, item: Vec::new() });
            group.item.push(request_item(&url, method, op));
        }
    }

    let mut item: Vec<ItemGroup> = groups.into_values().collect();
    item.sort_by(|a, b| {
        let a_pinned = pin_first.map(|p| a.name.eq_ignore_ascii_case(p)).unwrap_or(false);
        let b_pinned = pin_first.map(|p| b.name.eq_ignore_ascii_case(p)).unwrap_or(false);
        b_pinned.cmp(&a_pinned).then_with(|| a.name.cmp(&b.name))
    });

    Collection {
        info: CollectionInfo {
            name: doc.infos.title.clone(),
            description: COLLECTION_DESCRIPTION.to_string(),
            schema: SCHEMA_V210.to_string(),
        },
        item,
    }
}

/// Swagger path -> Postman URL string: `{x}` becomes `:x`.
fn postman_url(path: &str) -> String {
    path.replace('{', ":").replace('}', "")
}

fn request_item(url: &str, method: &str, op: &Operation) -> RequestItem {
    let mut headers = Vec::new();
    let mut variables = Vec::new();
    let mut query = Vec::new();
    let mut formdata = Vec::new();

    for param in &op.parameters {
        match param.in_location.as_str() {
            "path" => variables.push(path_variable(param)),
            "formData" => formdata.push(Variable {
                id: String::new(),
                key: param.name.clone(),
                var_type: param.param_type.clone(),
                name: String::new(),
                description: param.description.clone(),
            }),
            "query" => query.push(QueryParam {
                key: param.name.clone(),
                description: param.description.clone(),
            }),
            _ => {}
        }
    }

    let body = if formdata.is_empty() {
        None
    } else {
        headers.push(Header {
            key: "Content-Type".to_string(),
            value: "multipart/form-data".to_string(),
        });
        Some(Body { mode: "formdata".to_string(), formdata })
    };

    let mut response = Vec::new();
    for (status, resp) in &op.responses {
        response.push(ResponseStub {
            status: status.clone(),
            code: status.parse().unwrap_or(0),
            name: resp.description.clone(),
        });
    }

    let mut header = base_headers();
    header.extend(headers);

    RequestItem {
        name: format!("{} {}", method, url),
        id: op.operation_id.clone(),
        description: op.description.clone(),
        request: Request {
            url: Url {
                host: vec!["{{BASE_URL}}".to_string()],
                path: url.split('/').filter(|s| !s.is_empty()).map(String::from).collect(),
                query,
                variable: variables,
            },
            method: method.to_string(),
            header,
            body,
        },
        response,
    }
}

fn path_variable(param: &Parameter) -> Variable {
    Variable {
        id: param.name.clone(),
        key: String::new(),
        var_type: param.param_type.clone(),
        name: param.name.clone(),
        description: param.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swagger::{Item, Parameter, Response, Swagger};

    fn doc_with(paths: &[(&str, &str, &str)]) -> Swagger {
        // (path, method, tag)
        let mut doc = Swagger::default();
        doc.infos.title = "Shop API".to_string();
        doc.base_path = "/v1".to_string();
        for (path, method, tag) in paths {
            let mut op = Operation { tags: vec![tag.to_string()], ..Default::default() };
            op.responses.insert(
                "200".to_string(),
                Response { description: "ok".to_string(), schema: None },
            );
            doc.paths.entry(path.to_string()).or_insert_with(Item::default).set_operation(method, op);
        }
        doc
    }

    #[test]
    fn test_groups_by_first_tag() {
        let doc = doc_with(&[
            ("/invoices", "POST", "billing"),
            ("/invoices/{id}", "GET", "billing"),
            ("/users", "GET", "users"),
        ]);
        let collection = translate(&doc, None);

        assert_eq!(collection.item.len(), 2);
        let billing = collection.item.iter().find(|g| g.name == "billing").unwrap();
        assert_eq!(billing.item.len(), 2);
    }

    #[test]
    fn test_path_parameters_use_colon_form() {
        let doc = doc_with(&[("/invoices/{id}", "GET", "billing")]);
        let collection = translate(&doc, None);

        let request = &collection.item[0].item[0];
        assert_eq!(request.name, "GET /v1/invoices/:id");
        assert_eq!(request.request.url.path, vec!["v1", "invoices", ":id"]);
    }

    #[test]
    fn test_pinned_group_sorts_first() {
        let doc = doc_with(&[
            ("/a", "GET", "alpha"),
            ("/c", "GET", "customers"),
            ("/b", "GET", "beta"),
        ]);

        let collection = translate(&doc, Some("customers"));
        let names: Vec<&str> = collection.item.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["customers", "alpha", "beta"]);

        let unpinned = translate(&doc, None);
        let names: Vec<&str> = unpinned.item.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "customers"]);
    }

    #[test]
    fn test_form_data_parameter_forces_body_and_header() {
        let mut doc = doc_with(&[("/upload", "POST", "files")]);
        let op = doc.paths.get_mut("/upload").unwrap().post.as_mut().unwrap();
        op.parameters.push(Parameter {
            name: "file".to_string(),
            in_location: "formData".to_string(),
            param_type: "file".to_string(),
            required: true,
            ..Default::default()
        });

        let collection = translate(&doc, None);
        let request = &collection.item[0].item[0].request;
        let body = request.body.as_ref().unwrap();
        assert_eq!(body.mode, "formdata");
        assert_eq!(body.formdata[0].key, "file");
        assert!(request
            .header
            .iter()
            .any(|h| h.key == "Content-Type" && h.value == "multipart/form-data"));
    }

    #[test]
    fn test_responses_become_stubs() {
        let doc = doc_with(&[("/a", "GET", "alpha")]);
        let collection = translate(&doc, None);
        let request = &collection.item[0].item[0];
        assert_eq!(request.response.len(), 1);
        assert_eq!(request.response[0].code, 200);
        assert_eq!(request.response[0].name, "ok");
    }
}
