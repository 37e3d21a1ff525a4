//! Annotation lexer.
//!
//! Classifies one trimmed comment line into a typed [`Annotation`] record.
//! Only lines whose body starts with `@` are annotations; everything else is
//! silently skipped by returning `None`. Parsing is a pure function of the
//! line text — no state is carried between lines.

use crate::error::{Error, Result};

pub const MIME_JSON: &str = "application/json";
pub const MIME_XML: &str = "application/xml";
pub const MIME_PLAIN: &str = "text/plain";
pub const MIME_HTML: &str = "text/html";
pub const MIME_FORM: &str = "multipart/form-data";

pub const MIME_THRIFT_BINARY_WEBCONTENT_V1: &str =
    "application/vnd.zalora.webcontent.v1+thrift.binary";
pub const MIME_THRIFT_JSON_WEBCONTENT_V1: &str =
    "application/vnd.zalora.webcontent.v1+thrift.json";
pub const MIME_THRIFT_BINARY: &str = "application/vnd.apache.thrift.binary";
pub const MIME_THRIFT_JSON: &str = "application/vnd.apache.thrift.json";

/// Media type for an `@Accept` value, `None` when the value is unknown.
pub fn media_type(value: &str) -> Option<&'static str> {
    match value {
        "json" => Some(MIME_JSON),
        "xml" => Some(MIME_XML),
        "plain" => Some(MIME_PLAIN),
        "html" => Some(MIME_HTML),
        "form" => Some(MIME_FORM),
        "thrift_binary" => Some(MIME_THRIFT_BINARY),
        "thrift_json" => Some(MIME_THRIFT_JSON),
        "thrift_webcontent_binary" => Some(MIME_THRIFT_BINARY_WEBCONTENT_V1),
        "thrift_webcontent_json" => Some(MIME_THRIFT_JSON_WEBCONTENT_V1),
        _ => None,
    }
}

/// Schema part of an `@Success` annotation
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessSchema {
    /// True for `{array}` or a `[]`-prefixed schema name
    pub is_array: bool,
    /// Schema reference: a basic type name or `pkg.Type`
    pub type_name: String,
}

/// One classified annotation line
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    // file-level info block
    ApiVersion(String),
    TermsOfServiceUrl(String),
    Contact(String),
    ContactName(String),
    ContactUrl(String),
    LicenseUrl(String),
    License(String),
    Schemes(Vec<String>),
    Host(String),

    // shared between file level and operations
    Title(String),
    Description(String),

    // operation level
    Router { path: String, method: String },
    Summary(String),
    Success { code: String, schema: Option<SuccessSchema>, description: String },
    Param(Vec<String>),
    Failure { code: String, description: String },
    Deprecated(bool),
    Accept(Vec<String>),
}

/// Classify one comment line.
///
/// `line` is the comment text with the `//` marker already stripped. Returns
/// `Ok(None)` for lines that are not annotations. Errors are the fatal tier of
/// the annotation grammar: a malformed `@Success` schema or an `@Param` with
/// too few fields.
pub fn parse_line(line: &str) -> Result<Option<Annotation>> {
    let t = line.trim_start_matches('/').trim();
    if !t.starts_with('@') {
        return Ok(None);
    }

    // keyword matching is by prefix, longest keyword first where they share
    // one; `@router` alone is case-insensitive
    if let Some(prefix) = t.get(..7) {
        if prefix.eq_ignore_ascii_case("@router") {
            return parse_router(t[7..].trim()).map(Some);
        }
    }

    let (keyword, rest) = split_keyword(t);
    let annotation = match keyword {
        "@APIVersion" => Annotation::ApiVersion(rest.to_string()),
        "@Title" => Annotation::Title(rest.to_string()),
        "@Description" => Annotation::Description(rest.to_string()),
        "@TermsOfServiceUrl" => Annotation::TermsOfServiceUrl(rest.to_string()),
        "@Contact" => Annotation::Contact(rest.to_string()),
        "@Name" => Annotation::ContactName(rest.to_string()),
        "@URL" => Annotation::ContactUrl(rest.to_string()),
        "@LicenseUrl" => Annotation::LicenseUrl(rest.to_string()),
        "@License" => Annotation::License(rest.to_string()),
        "@Schemes" => {
            Annotation::Schemes(rest.split(',').map(|s| s.trim().to_string()).collect())
        }
        "@Host" => Annotation::Host(rest.to_string()),
        "@Summary" => Annotation::Summary(rest.to_string()),
        "@Success" => return parse_success(rest).map(Some),
        "@Param" => return parse_param(rest).map(Some),
        "@Failure" => {
            let (code, pos) = peek_next_split(rest);
            Annotation::Failure {
                code: code.to_string(),
                description: rest[pos..].trim().to_string(),
            }
        }
        "@Deprecated" => Annotation::Deprecated(rest.trim().parse().unwrap_or(false)),
        "@Accept" => {
            Annotation::Accept(rest.split(',').map(|s| s.trim().to_string()).collect())
        }
        _ => return Ok(None),
    };
    Ok(Some(annotation))
}

/// Split the leading `@Keyword` off the line. The remainder is trimmed.
fn split_keyword(t: &str) -> (&str, &str) {
    // prefix semantics: the known keyword list, longest first, so that
    // `@LicenseUrl` is not swallowed by `@License`
    const KEYWORDS: &[&str] = &[
        "@TermsOfServiceUrl",
        "@APIVersion",
        "@Deprecated",
        "@LicenseUrl",
        "@Description",
        "@License",
        "@Schemes",
        "@Success",
        "@Summary",
        "@Failure",
        "@Contact",
        "@Accept",
        "@Param",
        "@Title",
        "@Host",
        "@Name",
        "@URL",
    ];
    for keyword in KEYWORDS {
        if let Some(rest) = t.strip_prefix(keyword) {
            return (keyword, rest.trim());
        }
    }
    (t, "")
}

/// First whitespace-delimited word and the byte position right after it.
fn peek_next_split(s: &str) -> (&str, usize) {
    match s.find(char::is_whitespace) {
        Some(pos) => (s[..pos].trim(), pos),
        None => (s, s.len()),
    }
}

fn parse_router(rest: &str) -> Result<Annotation> {
    let mut parts = rest.splitn(2, char::is_whitespace);
    let path = match parts.next() {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(Error::InvalidAnnotation("@router needs a path".to_string())),
    };
    let method = match parts.next().map(str::trim) {
        Some(m) if !m.is_empty() => {
            let m = m.split_whitespace().next().unwrap_or("");
            m.trim_matches(|c| c == '[' || c == ']').to_uppercase()
        }
        _ => "GET".to_string(),
    };
    Ok(Annotation::Router { path, method })
}

fn parse_success(rest: &str) -> Result<Annotation> {
    let (code, pos) = peek_next_split(rest);
    let code = code.to_string();
    let rest = rest[pos..].trim();
    let (resp_type, pos) = peek_next_split(rest);

    if resp_type == "{object}" || resp_type == "{array}" {
        let mut is_array = resp_type == "{array}";
        let rest = rest[pos..].trim();
        let (mut schema_name, pos) = peek_next_split(rest);
        if schema_name.is_empty() {
            return Err(Error::InvalidAnnotation(
                "schema must follow {object} or {array}".to_string(),
            ));
        }
        if let Some(stripped) = schema_name.strip_prefix("[]") {
            schema_name = stripped;
            is_array = true;
        }
        Ok(Annotation::Success {
            code,
            schema: Some(SuccessSchema { is_array, type_name: schema_name.to_string() }),
            description: rest[pos..].trim().trim_matches('"').to_string(),
        })
    } else {
        Ok(Annotation::Success { code, schema: None, description: rest.to_string() })
    }
}

fn parse_param(rest: &str) -> Result<Annotation> {
    let fields = split_param_fields(rest);
    if fields.len() < 4 {
        return Err(Error::InvalidAnnotation(format!(
            "@Param needs at least 4 fields, got {:?}",
            fields
        )));
    }
    Ok(Annotation::Param(fields))
}

/// Split an `@Param` payload into fields: whitespace-delimited words up to the
/// first `"`, then the quoted remainder verbatim as one final field.
///
/// `limit query integer true "max items"` ->
/// `["limit", "query", "integer", "true", "\"max items\""]`
pub fn split_param_fields(s: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut word = String::new();
    for (i, c) in s.char_indices() {
        if c == '"' {
            if !word.is_empty() {
                fields.push(std::mem::take(&mut word));
            }
            fields.push(s[i..].trim().to_string());
            return fields;
        }
        if c.is_whitespace() {
            if !word.is_empty() {
                fields.push(std::mem::take(&mut word));
            }
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        fields.push(word);
    }
    fields
}
