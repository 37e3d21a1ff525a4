//! Document assembler: info block, final merge and post-build validation.

use crate::annotation::{parse_line, Annotation};
use crate::collector::Collector;
use crate::swagger::{Contact, License, Operation, Swagger};
use crate::syntax::SourceFile;
use log::{debug, warn};
use std::collections::HashSet;

pub const SWAGGER_VERSION: &str = "2.0";

/// Fresh document with the specification version set.
pub fn new_document() -> Swagger {
    Swagger { swagger_version: SWAGGER_VERSION.to_string(), ..Default::default() }
}

/// Apply the entry file's file-level annotations to the document info block.
///
/// Every comment line of the file participates; unknown and operation-level
/// annotations are ignored here.
pub fn apply_info_annotations(doc: &mut Swagger, entry: &SourceFile) {
    for comment in &entry.comments {
        let annotation = match parse_line(&comment.text) {
            Ok(Some(a)) => a,
            _ => continue,
        };
        match annotation {
            Annotation::ApiVersion(version) => doc.infos.version = version,
            Annotation::Title(title) => doc.infos.title = title,
            Annotation::Description(desc) => {
                // literal \n sequences decode to newlines in the info block
                doc.infos.description = desc.replace("\\n", "\n");
            }
            Annotation::TermsOfServiceUrl(url) => doc.infos.terms_of_service = url,
            Annotation::Contact(email) => {
                doc.infos.contact.get_or_insert_with(Contact::default).e_mail = email;
            }
            Annotation::ContactName(name) => {
                doc.infos.contact.get_or_insert_with(Contact::default).name = name;
            }
            Annotation::ContactUrl(url) => {
                doc.infos.contact.get_or_insert_with(Contact::default).url = url;
            }
            Annotation::License(name) => {
                doc.infos.license.get_or_insert_with(License::default).name = name;
            }
            Annotation::LicenseUrl(url) => {
                doc.infos.license.get_or_insert_with(License::default).url = url;
            }
            Annotation::Schemes(schemes) => doc.schemes = schemes,
            Annotation::Host(host) => doc.host = host,
            _ => {}
        }
    }
}

/// Rewrite internal `:x` (and the optional `?:x`) path parameters to the
/// external `{x}` form.
pub fn url_replace(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let bytes = segment.as_bytes();
            if !bytes.is_empty() && bytes[0] == b':' {
                format!("{{{}}}", &segment[1..])
            } else if bytes.len() > 1 && bytes[0] == b'?' && bytes[1] == b':' {
                format!("{{{}}}", &segment[2..])
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Move the definition table into the document and run post-build checks.
pub fn finalize(doc: &mut Swagger, collector: &Collector) {
    doc.definitions = collector.definitions.clone();
    validate(doc);
}

/// Post-build validation. Everything here is a warning; the document is
/// emitted regardless.
fn validate(doc: &Swagger) {
    for (path, item) in &doc.paths {
        for (method, op) in item.operations() {
            validate_operation(path, method, op);
        }
    }

    // every $ref must land in definitions after the transitive close
    let mut refs = HashSet::new();
    collect_refs(doc, &mut refs);
    for reference in refs {
        let name = reference.trim_start_matches("#/definitions/");
        if !doc.definitions.contains_key(name) {
            warn!("dangling reference: {} has no definition", reference);
        }
    }
}

fn validate_operation(path: &str, method: &str, op: &Operation) {
    if op.responses.is_empty() {
        warn!("missing response [@Success, @Failure] for route {} '{}'", method, path);
    }

    for (status, response) in &op.responses {
        if response.description.is_empty() {
            warn!("missing description from '{}' response for route {} '{}'", status, method, path);
        }
    }

    for param in &op.parameters {
        if param.enum_values.is_empty() || param.default.is_empty() {
            continue;
        }
        if !param.enum_values.contains(&param.default) {
            warn!(
                "default value must be present in enum parameter for route {} '{}'",
                method, path
            );
        }
    }
}

/// Gather every `$ref` string in the document.
fn collect_refs(doc: &Swagger, refs: &mut HashSet<String>) {
    fn from_schema(schema: &crate::swagger::Schema, refs: &mut HashSet<String>) {
        if !schema.reference.is_empty() {
            refs.insert(schema.reference.clone());
        }
        if let Some(items) = &schema.items {
            from_schema(items, refs);
        }
        if let Some(props) = &schema.properties {
            for prop in props.values() {
                from_property(prop, refs);
            }
        }
    }

    fn from_property(prop: &crate::swagger::Property, refs: &mut HashSet<String>) {
        if !prop.reference.is_empty() {
            refs.insert(prop.reference.clone());
        }
        if let Some(items) = &prop.items {
            from_property(items, refs);
        }
        if let Some(props) = &prop.properties {
            for p in props.values() {
                from_property(p, refs);
            }
        }
        if let Some(additional) = &prop.additional_properties {
            from_property(additional, refs);
        }
    }

    for item in doc.paths.values() {
        for (_, op) in item.operations() {
            for param in &op.parameters {
                if let Some(schema) = &param.schema {
                    from_schema(schema, refs);
                }
            }
            for response in op.responses.values() {
                if let Some(schema) = &response.schema {
                    from_schema(schema, refs);
                }
            }
        }
    }
    for schema in doc.definitions.values() {
        from_schema(schema, refs);
    }

    debug!("document references {} definitions", refs.len());
}
