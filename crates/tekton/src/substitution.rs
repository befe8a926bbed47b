//! `$(params.*)` replacement.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::params::{Param, ParamSpec, ParamValue, SubstitutionError};

/// Any `$(...)` expression; group 1 is the key.
static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(([^()]+)\)").expect("variable pattern is valid"));

/// A param reference in one of the three accepted forms.
static PARAM_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\$\(params(?:\.([A-Za-z0-9_-]+)|\["([^"\]]+)"\]|\['([^'\]]+)'\])"#)
        .expect("param reference pattern is valid")
});

/// Replacement values keyed by the expression inside `$(...)`.
///
/// String params are reachable as `params.n`, `params["n"]` and
/// `params['n']`. Array params add an indexed key per element
/// (`params.n[0]`, ...) and a whole-array key `params.n[*]`, which only
/// [`apply_array_replacements`] expands. Object params add `params.n.key`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements {
    strings: HashMap<String, String>,
    arrays: HashMap<String, Vec<String>>,
}

fn name_forms(name: &str) -> [String; 3] {
    [
        format!("params.{name}"),
        format!("params[\"{name}\"]"),
        format!("params['{name}']"),
    ]
}

impl Replacements {
    /// Builds the replacement table for resolved params.
    pub fn from_params(params: &[Param]) -> Self {
        let mut replacements = Self::default();
        for param in params {
            for prefix in name_forms(&param.name) {
                match &param.value {
                    ParamValue::String(value) => {
                        replacements.strings.insert(prefix, value.clone());
                    }
                    ParamValue::Array(values) => {
                        for (i, value) in values.iter().enumerate() {
                            replacements
                                .strings
                                .insert(format!("{prefix}[{i}]"), value.clone());
                        }
                        replacements
                            .arrays
                            .insert(format!("{prefix}[*]"), values.clone());
                    }
                    ParamValue::Object(fields) => {
                        for (key, value) in fields {
                            replacements
                                .strings
                                .insert(format!("{prefix}.{key}"), value.clone());
                        }
                    }
                }
            }
        }
        replacements
    }

    /// Adds a string replacement under `key` (without the `$( )`).
    pub fn insert_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    /// String replacements.
    pub fn strings(&self) -> &HashMap<String, String> {
        &self.strings
    }

    /// Whole-array replacements.
    pub fn arrays(&self) -> &HashMap<String, Vec<String>> {
        &self.arrays
    }
}

/// Replaces every `$(key)` in `input` whose key is in `strings`.
///
/// Unknown expressions are left untouched. Substituted text is not scanned
/// again.
pub fn apply_replacements(input: &str, strings: &HashMap<String, String>) -> String {
    VARIABLE
        .replace_all(input, |caps: &Captures<'_>| match strings.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Expands one field that may hold a whole-array reference.
///
/// A field consisting of exactly `$(params.n[*])` becomes the elements of
/// `n`; any other field becomes a single string-replaced element.
pub fn apply_array_replacements(input: &str, replacements: &Replacements) -> Vec<String> {
    let whole = input
        .strip_prefix("$(")
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|key| replacements.arrays.get(key));

    match whole {
        Some(values) => values.clone(),
        None => vec![apply_replacements(input, &replacements.strings)],
    }
}

/// Applies [`apply_array_replacements`] to every argument and flattens.
pub fn apply_to_args(args: &[String], replacements: &Replacements) -> Vec<String> {
    args.iter()
        .flat_map(|arg| apply_array_replacements(arg, replacements))
        .collect()
}

/// Names of the params referenced in `input`, in order of first use.
pub fn param_references(input: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    PARAM_REFERENCE
        .captures_iter(input)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Checks that every param referenced in `input` is declared in `specs`.
pub fn validate_references(input: &str, specs: &[ParamSpec]) -> Result<(), SubstitutionError> {
    let unknown: Vec<String> = param_references(input)
        .into_iter()
        .filter(|name| !specs.iter().any(|spec| &spec.name == name))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(SubstitutionError::UnknownReferences(unknown))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::params::ParamType;

    fn params() -> Vec<Param> {
        vec![
            Param::new("image", "alpine"),
            Param::new("flags", vec!["-v".to_string(), "--color".to_string()]),
            Param::new(
                "git",
                BTreeMap::from([
                    ("url".to_string(), "https://github.com/katanomi/pkg".to_string()),
                    ("revision".to_string(), "main".to_string()),
                ]),
            ),
        ]
    }

    #[test]
    fn replaces_every_string_form() {
        let r = Replacements::from_params(&params());
        let out = apply_replacements(
            r#"$(params.image) $(params["image"]) $(params['image']):$(params.git.revision)"#,
            r.strings(),
        );
        assert_eq!(out, "alpine alpine alpine:main");
    }

    #[test]
    fn indexes_arrays_and_leaves_unknown_expressions() {
        let r = Replacements::from_params(&params());
        let out = apply_replacements(
            "$(params.flags[1]) $(params.missing) $(context.taskRun.name)",
            r.strings(),
        );
        assert_eq!(out, "--color $(params.missing) $(context.taskRun.name)");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let r = Replacements::from_params(&[Param::new("a", "$(params.b)"), Param::new("b", "x")]);
        assert_eq!(apply_replacements("$(params.a)", r.strings()), "$(params.b)");
    }

    #[test]
    fn whole_array_references_expand_into_arguments() {
        let r = Replacements::from_params(&params());
        let args = vec![
            "build".to_string(),
            "$(params.flags[*])".to_string(),
            "--image=$(params.image)".to_string(),
            "$(params['flags'][*])".to_string(),
        ];
        assert_eq!(
            apply_to_args(&args, &r),
            vec!["build", "-v", "--color", "--image=alpine", "-v", "--color"]
        );

        // embedded whole-array references are not expanded
        assert_eq!(
            apply_array_replacements("x$(params.flags[*])", &r),
            vec!["x$(params.flags[*])"]
        );
    }

    #[test]
    fn collects_references_once_in_order() {
        let input = r#"$(params.b) $(params["a"].key) $(params.b) $(params['c'][0]) $(tasks.x.results.y)"#;
        assert_eq!(param_references(input), vec!["b", "a", "c"]);
    }

    #[test]
    fn validates_references_against_declarations() {
        let specs = vec![ParamSpec::new("image", ParamType::String)];
        assert!(validate_references("$(params.image)", &specs).is_ok());
        assert_eq!(
            validate_references("$(params.image) $(params.tag) $(params.os)", &specs),
            Err(SubstitutionError::UnknownReferences(vec![
                "tag".into(),
                "os".into()
            ]))
        );
    }
}
