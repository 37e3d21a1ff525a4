//! Serialization module: JSON/YAML output and the `swagger/` emission layout.

use crate::error::{Error, Result};
use crate::postman::Collection;
use crate::swagger::Swagger;
use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::Path;

/// Serializes the document to YAML.
pub fn serialize_yaml(doc: &Swagger) -> Result<String> {
    debug!("Serializing document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes the document to pretty-printed JSON, indented with four spaces.
pub fn serialize_json(doc: &Swagger) -> Result<String> {
    debug!("Serializing document to JSON");
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut serializer)?;
    String::from_utf8(buf)
        .map_err(|e| Error::SerializationError(format!("JSON output is not UTF-8: {}", e)))
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing {} bytes to {}", content.len(), path.display());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Emits `swagger.json` and `swagger.yml` side by side, plus the Postman
/// collection, under `output_dir`.
pub fn emit(output_dir: &Path, doc: &Swagger, collection: Option<&Collection>) -> Result<()> {
    let json = serialize_json(doc)?;
    write_to_file(&json, &output_dir.join("swagger.json"))?;
    info!("Wrote {}", output_dir.join("swagger.json").display());

    let yaml = serialize_yaml(doc)?;
    write_to_file(&yaml, &output_dir.join("swagger.yml"))?;
    info!("Wrote {}", output_dir.join("swagger.yml").display());

    if let Some(collection) = collection {
        let postman = serde_json::to_string_pretty(collection)
            .map_err(crate::error::Error::from)?;
        write_to_file(&postman, &output_dir.join("postman-collection.json"))?;
        info!("Wrote {}", output_dir.join("postman-collection.json").display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::new_document;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_contains_swagger_version() {
        let doc = new_document();
        let yaml = serialize_yaml(&doc).unwrap();
        assert!(yaml.contains("swagger: '2.0'") || yaml.contains("swagger: \"2.0\""));
    }

    #[test]
    fn test_json_contains_swagger_version() {
        let doc = new_document();
        let json = serialize_json(&doc).unwrap();
        assert!(json.contains("\"swagger\": \"2.0\""));
    }

    #[test]
    fn test_json_is_indented_with_four_spaces() {
        let doc = new_document();
        let json = serialize_json(&doc).unwrap();
        assert!(json.contains("\n    \"swagger\""), "top-level keys must use a 4-space indent");
        assert!(!json.contains("\n  \"swagger\""), "2-space indent is the wrong formatter");
    }

    #[test]
    fn test_emit_writes_files_side_by_side() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("swagger");
        let doc = new_document();

        emit(&out, &doc, None).unwrap();

        assert!(out.join("swagger.json").is_file());
        assert!(out.join("swagger.yml").is_file());
        assert!(!out.join("postman-collection.json").exists());
    }

    #[test]
    fn test_emit_writes_postman_collection() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("swagger");
        let doc = new_document();
        let collection = crate::postman::translate(&doc, None);

        emit(&out, &doc, Some(&collection)).unwrap();

        assert!(out.join("postman-collection.json").is_file());
    }
}
