//! Struct-tag handling.
//!
//! A Go struct tag is a space-separated list of `key:"value"` pairs. The
//! resolver consults the `json`, `thrift`, `ignore`, `required` and
//! `description` keys. Field-name selection follows a total precedence:
//! ignore > `json:"-"` > thrift first value > json first value (unless it is
//! the literal `omitempty`) > source name. The thrift/json order is
//! configurable because historical annotated projects disagree on it.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z0-9_]+):"([^"]*)""#).unwrap());

/// Which codec tag wins when both `thrift` and `json` name a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagPrecedence {
    #[default]
    ThriftFirst,
    JsonFirst,
}

/// Outcome of field-name selection from a tag
#[derive(Debug, Clone, PartialEq)]
pub enum FieldName {
    /// The field is excluded from the schema
    Dropped,
    /// A tag supplied the wire name
    FromTag(String),
    /// No tag named the field; the source name applies
    FromSource,
}

/// Parsed struct tag
#[derive(Debug, Clone, Default)]
pub struct StructTag {
    pairs: Vec<(String, String)>,
}

impl StructTag {
    /// Parse the raw tag content (backticks already stripped).
    pub fn parse(raw: &str) -> Self {
        let pairs = TAG_PAIR
            .captures_iter(raw)
            .map(|cap| (cap[1].to_string(), cap[2].to_string()))
            .collect();
        StructTag { pairs }
    }

    /// Value for `key`, empty string when absent (reflect.StructTag.Get
    /// semantics).
    pub fn get(&self, key: &str) -> &str {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// First comma-separated value of `key`.
    fn first_value(&self, key: &str) -> &str {
        self.get(key).split(',').next().unwrap_or("")
    }

    /// Select the wire name for a field carrying this tag.
    pub fn field_name(&self, precedence: TagPrecedence) -> FieldName {
        if !self.get("ignore").is_empty() {
            return FieldName::Dropped;
        }
        if self.first_value("json") == "-" {
            return FieldName::Dropped;
        }

        let thrift = self.first_value("thrift");
        let json = self.first_value("json");
        let json_usable = !json.is_empty() && json != "omitempty";

        let chosen = match precedence {
            TagPrecedence::ThriftFirst => {
                if !thrift.is_empty() {
                    thrift
                } else if json_usable {
                    json
                } else {
                    ""
                }
            }
            TagPrecedence::JsonFirst => {
                if json_usable {
                    json
                } else if !thrift.is_empty() {
                    thrift
                } else {
                    ""
                }
            }
        };

        if chosen.is_empty() {
            FieldName::FromSource
        } else {
            FieldName::FromTag(chosen.to_string())
        }
    }

    /// Whether a `required:"..."` marker is present.
    pub fn required(&self) -> bool {
        !self.get("required").is_empty()
    }

    /// The `description:"..."` override, if any.
    pub fn description(&self) -> Option<&str> {
        let desc = self.get("description");
        if desc.is_empty() {
            None
        } else {
            Some(desc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let tag = StructTag::parse(r#"json:"id,omitempty" thrift:"t,1,required""#);
        assert_eq!(tag.get("json"), "id,omitempty");
        assert_eq!(tag.get("thrift"), "t,1,required");
        assert_eq!(tag.get("xml"), "");
    }

    #[test]
    fn test_thrift_wins_over_json() {
        let tag = StructTag::parse(r#"json:"j,omitempty" thrift:"t,1,required""#);
        assert_eq!(
            tag.field_name(TagPrecedence::ThriftFirst),
            FieldName::FromTag("t".to_string())
        );
    }

    #[test]
    fn test_json_first_mode_flips_the_order() {
        let tag = StructTag::parse(r#"json:"j" thrift:"t,1""#);
        assert_eq!(tag.field_name(TagPrecedence::JsonFirst), FieldName::FromTag("j".to_string()));
    }

    #[test]
    fn test_ignore_drops_the_field() {
        let tag = StructTag::parse(r#"ignore:"true" json:"j""#);
        assert_eq!(tag.field_name(TagPrecedence::ThriftFirst), FieldName::Dropped);
    }

    #[test]
    fn test_json_dash_drops_even_with_thrift() {
        let tag = StructTag::parse(r#"json:"-" thrift:"t""#);
        assert_eq!(tag.field_name(TagPrecedence::ThriftFirst), FieldName::Dropped);
    }

    #[test]
    fn test_bare_omitempty_falls_back_to_source() {
        let tag = StructTag::parse(r#"json:"omitempty""#);
        assert_eq!(tag.field_name(TagPrecedence::ThriftFirst), FieldName::FromSource);
    }

    #[test]
    fn test_empty_json_value_falls_back_to_source() {
        let tag = StructTag::parse(r#"json:",omitempty""#);
        assert_eq!(tag.field_name(TagPrecedence::ThriftFirst), FieldName::FromSource);
    }

    #[test]
    fn test_required_and_description() {
        let tag = StructTag::parse(r#"json:"j" required:"true" description:"catalog id""#);
        assert!(tag.required());
        assert_eq!(tag.description(), Some("catalog id"));
    }

    #[test]
    fn test_selection_is_deterministic() {
        let raw = r#"json:"j,omitempty" thrift:"t,1,required""#;
        let a = StructTag::parse(raw).field_name(TagPrecedence::ThriftFirst);
        let b = StructTag::parse(raw).field_name(TagPrecedence::ThriftFirst);
        assert_eq!(a, b);
    }
}
