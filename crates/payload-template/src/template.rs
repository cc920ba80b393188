//! Template definition and format-aware loading.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Serialization format of a template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    /// Try YAML first, then JSON.
    Auto,
}

impl Format {
    /// Pick the format from a file extension (`.json`, `.yaml`, `.yml`).
    ///
    /// Unknown or missing extensions fall back to [`Format::Auto`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("json") => Format::Json,
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Auto,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Yaml => write!(f, "yaml"),
            Format::Auto => write!(f, "auto"),
        }
    }
}

/// A message template: substitution definitions plus the message body.
///
/// `substitution` maps names to literal values or strings carrying a single
/// `{{@function}}` call. `template` is the message body; its strings may
/// reference substitutions as `{{.name}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub substitution: Map<String, Value>,
    #[serde(default)]
    pub template: Map<String, Value>,
}

impl Template {
    /// Load a template file, choosing the parser from its extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&data, Format::from_path(path))
    }

    /// Parse template bytes in the given format.
    pub fn from_slice(data: &[u8], format: Format) -> Result<Self, LoadError> {
        match format {
            Format::Json => serde_json::from_slice(data).map_err(LoadError::Json),
            Format::Yaml => serde_yaml::from_slice(data).map_err(LoadError::Yaml),
            Format::Auto => match serde_yaml::from_slice(data) {
                Ok(template) => Ok(template),
                Err(yaml) => {
                    serde_json::from_slice(data).map_err(|json| LoadError::Undetected { yaml, json })
                }
            },
        }
    }

    /// Parse a YAML template string.
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        Self::from_slice(yaml.as_bytes(), Format::Yaml)
    }

    /// Parse a JSON template string.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Self::from_slice(json.as_bytes(), Format::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path("payload.json"), Format::Json);
        assert_eq!(Format::from_path("payload.JSON"), Format::Json);
        assert_eq!(Format::from_path("payload.yaml"), Format::Yaml);
        assert_eq!(Format::from_path("payload.yml"), Format::Yaml);
        assert_eq!(Format::from_path("payload.tmpl"), Format::Auto);
        assert_eq!(Format::from_path("payload"), Format::Auto);
    }

    #[test]
    fn test_parse_yaml() {
        let template = Template::from_yaml(
            r#"
substitution:
  id: "{{@guid}}"
  count: 3
template:
  message: "{{.id}}"
  nested:
    list: [1, "two"]
"#,
        )
        .unwrap();

        assert_eq!(template.substitution["id"], json!("{{@guid}}"));
        assert_eq!(template.substitution["count"], json!(3));
        assert_eq!(template.template["nested"], json!({"list": [1, "two"]}));
    }

    #[test]
    fn test_parse_json() {
        let template = Template::from_json(
            r#"{"substitution": {"id": "static"}, "template": {"x": "{{.id}}"}}"#,
        )
        .unwrap();

        assert_eq!(template.substitution["id"], json!("static"));
        assert_eq!(template.template["x"], json!("{{.id}}"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let template = Template::from_yaml("template:\n  a: 1\n").unwrap();
        assert!(template.substitution.is_empty());
        assert_eq!(template.template["a"], json!(1));
    }

    #[test]
    fn test_explicit_json_rejects_yaml() {
        let result = Template::from_slice(b"template:\n  a: 1\n", Format::Json);
        assert!(matches!(result, Err(LoadError::Json(_))));
    }

    #[test]
    fn test_auto_accepts_json() {
        let template = Template::from_slice(
            br#"{"substitution": {}, "template": {"a": true}}"#,
            Format::Auto,
        )
        .unwrap();
        assert_eq!(template.template["a"], json!(true));
    }

    #[test]
    fn test_auto_reports_both_errors() {
        let err = Template::from_slice(b"template: [unclosed", Format::Auto).unwrap_err();
        assert!(matches!(err, LoadError::Undetected { .. }));

        let message = err.to_string();
        assert!(message.contains("YAML error"));
        assert!(message.contains("JSON error"));
    }

    #[test]
    fn test_missing_file() {
        let result = Template::from_path("/definitely/not/here/payload.yaml");
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
