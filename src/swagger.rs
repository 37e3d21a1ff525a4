//! Swagger 2.0 document model.
//!
//! Mirrors the subset of the specification the generator emits. All maps that
//! end up in the output (`paths`, `definitions`, `properties`, `responses`)
//! are `IndexMap`s so the serialized document is stable across runs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Swagger {
    /// Specification version, always "2.0"
    #[serde(rename = "swagger")]
    pub swagger_version: String,
    /// API info block
    #[serde(rename = "info")]
    pub infos: Information,
    /// API host, e.g. "api.example.com"
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub host: String,
    /// Base path prepended to every path, e.g. "/v1"
    #[serde(rename = "basePath", skip_serializing_if = "String::is_empty", default)]
    pub base_path: String,
    /// Transfer schemes, e.g. ["https"]
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub schemes: Vec<String>,
    /// Path string -> per-method operation slots
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub paths: IndexMap<String, Item>,
    /// Canonical schema name -> schema
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub definitions: IndexMap<String, Schema>,
    /// Tag list shown by documentation UIs
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
}

/// Swagger info object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Information {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub version: String,
    #[serde(rename = "termsOfService", skip_serializing_if = "String::is_empty", default)]
    pub terms_of_service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// Contact information for the API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub url: String,
    #[serde(rename = "email", skip_serializing_if = "String::is_empty", default)]
    pub e_mail: String,
}

/// License information for the API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct License {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub url: String,
}

/// Tag attached to operations, with an optional description taken from the
/// controller doc comment or the route-adjacent comment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
}

/// PathItem: up to seven operation slots for one path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl Item {
    /// Place an operation into the slot named by `method` (upper-case HTTP
    /// method). Unknown methods are ignored.
    pub fn set_operation(&mut self, method: &str, op: Operation) {
        match method {
            "GET" => self.get = Some(op),
            "PUT" => self.put = Some(op),
            "POST" => self.post = Some(op),
            "DELETE" => self.delete = Some(op),
            "OPTIONS" => self.options = Some(op),
            "HEAD" => self.head = Some(op),
            "PATCH" => self.patch = Some(op),
            _ => {}
        }
    }

    /// Iterate the occupied slots as (METHOD, operation) pairs.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("GET", &self.get),
            ("PUT", &self.put),
            ("POST", &self.post),
            ("DELETE", &self.delete),
            ("OPTIONS", &self.options),
            ("HEAD", &self.head),
            ("PATCH", &self.patch),
        ]
        .into_iter()
        .filter_map(|(m, op)| op.as_ref().map(|op| (m, op)))
    }

    /// Mutable variant of [`Item::operations`].
    pub fn operations_mut(&mut self) -> impl Iterator<Item = (&'static str, &mut Operation)> {
        [
            ("GET", &mut self.get),
            ("PUT", &mut self.put),
            ("POST", &mut self.post),
            ("DELETE", &mut self.delete),
            ("OPTIONS", &mut self.options),
            ("HEAD", &mut self.head),
            ("PATCH", &mut self.patch),
        ]
        .into_iter()
        .filter_map(|(m, op)| op.as_mut().map(|op| (m, op)))
    }
}

/// One HTTP verb at one path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(rename = "operationId", skip_serializing_if = "String::is_empty", default)]
    pub operation_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub consumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub produces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub responses: IndexMap<String, Response>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub deprecated: bool,
}

/// Operation parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "in", skip_serializing_if = "String::is_empty", default)]
    pub in_location: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(rename = "required", skip_serializing_if = "std::ops::Not::not", default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty", default)]
    pub param_type: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ParameterItems>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty", default)]
    pub enum_values: Vec<String>,
    #[serde(rename = "default", skip_serializing_if = "String::is_empty", default)]
    pub default: String,
}

/// Item descriptor for array-typed parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterItems {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty", default)]
    pub item_type: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub format: String,
}

/// Response for one status token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// JSON Schema fragment keyed in `definitions` or embedded in a response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub title: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty", default)]
    pub schema_type: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub format: String,
    #[serde(rename = "$ref", skip_serializing_if = "String::is_empty", default)]
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Property>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
}

/// Recursive property variant: primitive, array, inline object, map or `$ref`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty", default)]
    pub property_type: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub format: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(rename = "$ref", skip_serializing_if = "String::is_empty", default)]
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Property>>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Property>>,
}

impl Property {
    /// Primitive property from a `type:format` pair.
    pub fn primitive(property_type: &str, format: &str) -> Self {
        Property {
            property_type: property_type.to_string(),
            format: format.to_string(),
            ..Default::default()
        }
    }

    /// `$ref` property pointing at a canonical definition name.
    pub fn reference(canonical: &str) -> Self {
        Property {
            reference: format!("#/definitions/{}", canonical),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_are_skipped() {
        let op = Operation {
            summary: "ping".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"summary":"ping"}"#);
    }

    #[test]
    fn test_item_set_and_iterate() {
        let mut item = Item::default();
        item.set_operation("POST", Operation::default());
        item.set_operation("TRACE", Operation::default());

        let methods: Vec<&str> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(methods, vec!["POST"]);
    }

    #[test]
    fn test_ref_serializes_as_dollar_ref() {
        let prop = Property::reference("model.Item");
        let json = serde_json::to_string(&prop).unwrap();
        assert_eq!(json, r##"{"$ref":"#/definitions/model.Item"}"##);
    }

    #[test]
    fn test_properties_preserve_insertion_order() {
        let mut props = IndexMap::new();
        props.insert("zeta".to_string(), Property::primitive("string", ""));
        props.insert("alpha".to_string(), Property::primitive("integer", "int64"));
        let schema = Schema {
            schema_type: "object".to_string(),
            properties: Some(props),
            ..Default::default()
        };

        let json = serde_json::to_string(&schema).unwrap();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        assert!(zeta < alpha, "declaration order must survive serialization");
    }
}
