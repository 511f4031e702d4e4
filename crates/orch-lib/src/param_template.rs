//! Profile parameter templates
//!
//! A template declares a chart value that deployments may override. On the
//! command line it is written as
//! `<name>=<type>[:<display-name>[:<default>]]`, for example
//! `image.tag=string:Image tag:1.0`.

use crate::error::{OrchError, Result};
use crate::overrides::Scalar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Declared type of a template parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
}

impl FromStr for ParameterType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            other => Err(format!(
                "unknown type '{}', expected string, number or boolean",
                other
            )),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        };
        f.write_str(s)
    }
}

/// A parameter template attached to a catalog profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterTemplate {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParameterTemplate {
    /// Parse one `--parameter-template` flag value
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| OrchError::InvalidParameterTemplate {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let (name, rest) = spec
            .split_once('=')
            .ok_or_else(|| invalid("expected <name>=<type>[:<display-name>[:<default>]]"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("name is empty"));
        }

        let mut parts = rest.splitn(3, ':');
        let param_type: ParameterType = parts
            .next()
            .unwrap_or_default()
            .trim()
            .parse()
            .map_err(|e: String| invalid(&e))?;
        let display_name = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
        let default = parts.next().filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(default) = &default {
            let fits = match (param_type, Scalar::coerce(default)) {
                (ParameterType::String, _) => true,
                (ParameterType::Number, Scalar::Int(_) | Scalar::Float(_)) => true,
                (ParameterType::Boolean, Scalar::Bool(_)) => true,
                _ => false,
            };
            if !fits {
                return Err(invalid(&format!(
                    "default '{}' is not a {}",
                    default, param_type
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            param_type,
            display_name,
            default,
        })
    }
}

/// Parse every template flag; a repeated name keeps the last one.
pub fn parse_templates(specs: &[String]) -> Result<Vec<ParameterTemplate>> {
    let mut by_name = BTreeMap::new();
    for spec in specs {
        let template = ParameterTemplate::parse(spec)?;
        by_name.insert(template.name.clone(), template);
    }
    Ok(by_name.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_spec() {
        let t = ParameterTemplate::parse("a.b=number:Port:8080").unwrap();
        assert_eq!(t.name, "a.b");
        assert_eq!(t.param_type, ParameterType::Number);
        assert_eq!(t.display_name.as_deref(), Some("Port"));
        assert_eq!(t.default.as_deref(), Some("8080"));
    }

    #[test]
    fn test_type_only() {
        let t = ParameterTemplate::parse("image.tag=STRING").unwrap();
        assert_eq!(t.param_type, ParameterType::String);
        assert_eq!(t.display_name, None);
        assert_eq!(t.default, None);
    }

    #[test]
    fn test_default_may_contain_colons() {
        let t = ParameterTemplate::parse("url=string:Endpoint:http://host:80").unwrap();
        assert_eq!(t.default.as_deref(), Some("http://host:80"));
    }

    #[test]
    fn test_bad_default_for_number() {
        let err = ParameterTemplate::parse("x=number::abc").unwrap_err();
        assert!(matches!(err, OrchError::InvalidParameterTemplate { .. }));
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_bad_default_for_boolean() {
        assert!(ParameterTemplate::parse("x=boolean::1").is_err());
        assert!(ParameterTemplate::parse("x=boolean::True").is_ok());
    }

    #[test]
    fn test_malformed_specs() {
        assert!(ParameterTemplate::parse("noequals").is_err());
        assert!(ParameterTemplate::parse("=string").is_err());
        assert!(ParameterTemplate::parse("x=").is_err());
        assert!(ParameterTemplate::parse("x=integer").is_err());
    }

    #[test]
    fn test_last_duplicate_wins() {
        let specs = vec![
            "port=number:Port:80".to_string(),
            "tag=string".to_string(),
            "port=number:Port:443".to_string(),
        ];
        let templates = parse_templates(&specs).unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "port");
        assert_eq!(templates[0].default.as_deref(), Some("443"));
    }

    #[test]
    fn test_json_shape() {
        let t = ParameterTemplate::parse("tag=string:Tag").unwrap();
        assert_eq!(
            serde_json::to_value(&t).unwrap(),
            serde_json::json!({"name": "tag", "type": "string", "displayName": "Tag"})
        );
    }
}
