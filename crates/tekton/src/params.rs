//! Param declarations, values and default resolution.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declared type of a param.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Array,
    Object,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamType::String => "string",
            ParamType::Array => "array",
            ParamType::Object => "object",
        })
    }
}

/// Value of a param. Serialized as the bare JSON string, array or object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Array(Vec<String>),
    Object(BTreeMap<String, String>),
}

impl ParamValue {
    /// Type of this value.
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::String(_) => ParamType::String,
            ParamValue::Array(_) => ParamType::Array,
            ParamValue::Object(_) => ParamType::Object,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::Array(value)
    }
}

impl From<BTreeMap<String, String>> for ParamValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        ParamValue::Object(value)
    }
}

/// A named param value, as provided by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A param declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    /// A declaration without default.
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: None,
            default: None,
        }
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<ParamValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Failure to resolve or substitute params.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionError {
    #[error("param '{0}' is required but was not provided and has no default")]
    MissingParam(String),

    #[error("param '{name}' is declared as {expected} but got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        actual: ParamType,
    },

    #[error("param '{0}' is declared more than once")]
    DuplicateParam(String),

    #[error("references to undeclared params: {}", .0.join(", "))]
    UnknownReferences(Vec<String>),
}

/// Resolves the final value of every declared param.
///
/// Provided values win over defaults. The result follows the order of
/// `specs`; provided params without a declaration are dropped.
pub fn resolve_params(
    specs: &[ParamSpec],
    provided: &[Param],
) -> Result<Vec<Param>, SubstitutionError> {
    let mut resolved = Vec::with_capacity(specs.len());

    for (i, spec) in specs.iter().enumerate() {
        if specs[..i].iter().any(|s| s.name == spec.name) {
            return Err(SubstitutionError::DuplicateParam(spec.name.clone()));
        }

        let value = provided
            .iter()
            .find(|p| p.name == spec.name)
            .map(|p| &p.value)
            .or(spec.default.as_ref())
            .ok_or_else(|| SubstitutionError::MissingParam(spec.name.clone()))?;

        let actual = value.param_type();
        if actual != spec.param_type {
            return Err(SubstitutionError::TypeMismatch {
                name: spec.name.clone(),
                expected: spec.param_type,
                actual,
            });
        }
        resolved.push(Param {
            name: spec.name.clone(),
            value: value.clone(),
        });
    }

    for extra in provided
        .iter()
        .filter(|p| !specs.iter().any(|s| s.name == p.name))
    {
        tracing::debug!(param = %extra.name, "ignoring undeclared param");
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_deserialize_from_bare_json() {
        let params: Vec<Param> = serde_json::from_value(serde_json::json!([
            {"name": "image", "value": "alpine"},
            {"name": "flags", "value": ["-v", "-x"]},
            {"name": "git", "value": {"url": "https://x", "revision": "main"}},
        ]))
        .unwrap();
        assert_eq!(params[0].value.param_type(), ParamType::String);
        assert_eq!(params[1].value, ParamValue::Array(vec!["-v".into(), "-x".into()]));
        assert_eq!(params[2].value.param_type(), ParamType::Object);

        let spec: ParamSpec = serde_json::from_str(r#"{"name": "image"}"#).unwrap();
        assert_eq!(spec.param_type, ParamType::String);
    }

    #[test]
    fn provided_values_override_defaults() {
        let specs = vec![
            ParamSpec::new("image", ParamType::String).with_default("alpine"),
            ParamSpec::new("tag", ParamType::String).with_default("latest"),
        ];
        let resolved = resolve_params(&specs, &[Param::new("tag", "3.19")]).unwrap();
        assert_eq!(
            resolved,
            vec![Param::new("image", "alpine"), Param::new("tag", "3.19")]
        );
    }

    #[test]
    fn missing_params_without_default_are_rejected() {
        let specs = vec![ParamSpec::new("url", ParamType::String)];
        assert_eq!(
            resolve_params(&specs, &[]),
            Err(SubstitutionError::MissingParam("url".into()))
        );
    }

    #[test]
    fn type_mismatches_are_rejected() {
        let specs = vec![ParamSpec::new("flags", ParamType::Array)];
        let err = resolve_params(&specs, &[Param::new("flags", "-v")]).unwrap_err();
        assert_eq!(
            err,
            SubstitutionError::TypeMismatch {
                name: "flags".into(),
                expected: ParamType::Array,
                actual: ParamType::String,
            }
        );

        // defaults are checked too
        let specs = vec![ParamSpec::new("flags", ParamType::Array).with_default("-v")];
        assert!(resolve_params(&specs, &[]).is_err());
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let specs = vec![
            ParamSpec::new("a", ParamType::String).with_default("1"),
            ParamSpec::new("a", ParamType::String).with_default("2"),
        ];
        assert_eq!(
            resolve_params(&specs, &[]),
            Err(SubstitutionError::DuplicateParam("a".into()))
        );
    }
}
