use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::{
    document::{DocumentSource, ResolvedType},
    naming::css_identifier,
};

pub const ALIAS_TYPE: &str = "VARIABLE_ALIAS";
pub const COLOR_FALLBACK: &str = "rgba(0, 0, 0, 1)";

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
});

/// Turns raw variable values into their canonical string form.
///
/// Never fails: anything it cannot interpret becomes a fallback string and a
/// warning. Alias lookups go through the document source.
pub struct Resolver<'a> {
    pub source: &'a dyn DocumentSource,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn DocumentSource) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, raw: Option<&Value>, ty: ResolvedType) -> String {
        let value = match raw {
            None | Some(Value::Null) => {
                warn!("null/undefined value during variable resolution");
                return "undefined".to_string();
            }
            Some(v) => v,
        };

        if is_alias(value) {
            return self.resolve_alias(value).await;
        }

        resolve_literal(value, ty)
    }

    async fn resolve_alias(&self, value: &Value) -> String {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());

        let Some(id) = id else {
            warn!("variable alias is missing its id");
            return "var(--missing-alias-id)".to_string();
        };

        match self.source.get_variable_by_id(id).await {
            Ok(Some(target)) => match target.name.as_deref().filter(|n| !n.is_empty()) {
                Some(name) => format!("var(--{})", css_identifier(name)),
                None => {
                    warn!(alias = id, "referenced variable has no name");
                    format!("var(--unresolved-{id})")
                }
            },
            Ok(None) => {
                warn!(alias = id, "referenced variable not found");
                format!("var(--unresolved-{id})")
            }
            Err(e) => {
                warn!(alias = id, error = %e, "failed to resolve variable alias");
                format!("var(--error-{id})")
            }
        }
    }
}

pub fn is_alias(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some(ALIAS_TYPE)
}

/// Resolve a non-alias value by its declared type.
pub fn resolve_literal(value: &Value, ty: ResolvedType) -> String {
    match ty {
        ResolvedType::Color => match color_string(value) {
            Some(s) => s,
            None => {
                warn!(value = %value, "invalid color value format");
                COLOR_FALLBACK.to_string()
            }
        },
        ResolvedType::Float => float_string(value),
        ResolvedType::Boolean => truthy(value).to_string(),
        ResolvedType::String | ResolvedType::Unknown => text_or_empty(value),
    }
}

/// `rgb(r, g, b)` when opaque, `rgba(r, g, b, a)` otherwise. `None` when the
/// value is not an object with numeric `r`, `g`, `b`.
pub fn color_string(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    let r = obj.get("r")?.as_f64()?;
    let g = obj.get("g")?.as_f64()?;
    let b = obj.get("b")?.as_f64()?;
    let a = match obj.get("a") {
        None | Some(Value::Null) => None,
        Some(a) => Some(a.as_f64()?),
    };

    Some(format_rgba(r, g, b, a))
}

pub fn format_rgba(r: f64, g: f64, b: f64, a: Option<f64>) -> String {
    let a = a.map(|a| a.clamp(0.0, 1.0)).unwrap_or(1.0);
    let (r, g, b) = (channel(r), channel(g), channel(b));

    if a == 1.0 {
        format!("rgb({r}, {g}, {b})")
    } else {
        format!("rgba({r}, {g}, {b}, {a})")
    }
}

fn channel(c: f64) -> u8 {
    // NaN saturates to 0 on the cast
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

fn float_string(value: &Value) -> String {
    if let Some(n) = value.as_f64().filter(|n| n.is_finite()) {
        return n.to_string();
    }

    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    LEADING_FLOAT
        .find(&text)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .map(|n| n.to_string())
        .unwrap_or_else(|| "0".to_string())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_or_empty(value: &Value) -> String {
    if !truthy(value) {
        return String::new();
    }
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.to_string())
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocument, Variable};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"r": 1, "g": 0, "b": 0, "a": 1}), "rgb(255, 0, 0)")]
    #[case(json!({"r": 0, "g": 0, "b": 1, "a": 0.5}), "rgba(0, 0, 255, 0.5)")]
    #[case(json!({"r": 0.5, "g": 0.5, "b": 0.5}), "rgb(128, 128, 128)")]
    #[case(json!({"r": 2, "g": -1, "b": 0, "a": 7}), "rgb(255, 0, 0)")]
    #[case(json!({"r": 0, "g": 0, "b": 0, "a": -3}), "rgba(0, 0, 0, 0)")]
    #[case(json!({"r": 1, "g": 1}), COLOR_FALLBACK)]
    #[case(json!("#ff0000"), COLOR_FALLBACK)]
    #[case(json!({"r": "x", "g": 0, "b": 0}), COLOR_FALLBACK)]
    fn colors(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(resolve_literal(&value, ResolvedType::Color), expected);
    }

    #[rstest]
    #[case(json!(16), "16")]
    #[case(json!(0.25), "0.25")]
    #[case(json!(-4.5), "-4.5")]
    #[case(json!("12px"), "12")]
    #[case(json!(" 3.5rem"), "3.5")]
    #[case(json!(".5"), "0.5")]
    #[case(json!("wide"), "0")]
    #[case(json!(true), "0")]
    fn floats(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(resolve_literal(&value, ResolvedType::Float), expected);
    }

    #[rstest]
    #[case(json!("Inter"), ResolvedType::String, "Inter")]
    #[case(json!(""), ResolvedType::String, "")]
    #[case(json!(0), ResolvedType::String, "")]
    #[case(json!(12), ResolvedType::Unknown, "12")]
    #[case(json!(4.0), ResolvedType::String, "4")]
    #[case(json!(1.5), ResolvedType::Unknown, "1.5")]
    #[case(json!(true), ResolvedType::Boolean, "true")]
    #[case(json!(false), ResolvedType::Boolean, "false")]
    #[case(json!(0), ResolvedType::Boolean, "false")]
    #[case(json!("yes"), ResolvedType::Boolean, "true")]
    fn scalars(#[case] value: Value, #[case] ty: ResolvedType, #[case] expected: &str) {
        assert_eq!(resolve_literal(&value, ty), expected);
    }

    fn doc_with(vars: Vec<Variable>) -> MemoryDocument {
        MemoryDocument {
            variables: vars,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn null_and_missing_are_undefined() {
        let doc = MemoryDocument::default();
        let r = Resolver::new(&doc);
        assert_eq!(r.resolve(None, ResolvedType::Float).await, "undefined");
        assert_eq!(r.resolve(Some(&Value::Null), ResolvedType::Color).await, "undefined");
    }

    #[tokio::test]
    async fn aliases_resolve_to_custom_property_references() {
        let doc = doc_with(vec![
            Variable {
                id: "V:1".into(),
                name: Some("Color/Blue 500".into()),
                ..Default::default()
            },
            Variable {
                id: "V:2".into(),
                name: None,
                ..Default::default()
            },
        ]);
        let r = Resolver::new(&doc);

        let alias = json!({"type": "VARIABLE_ALIAS", "id": "V:1"});
        assert_eq!(r.resolve(Some(&alias), ResolvedType::Color).await, "var(--color-blue-500)");

        let nameless = json!({"type": "VARIABLE_ALIAS", "id": "V:2"});
        assert_eq!(r.resolve(Some(&nameless), ResolvedType::Color).await, "var(--unresolved-V:2)");

        let unknown = json!({"type": "VARIABLE_ALIAS", "id": "V:9"});
        assert_eq!(r.resolve(Some(&unknown), ResolvedType::Color).await, "var(--unresolved-V:9)");

        let missing = json!({"type": "VARIABLE_ALIAS"});
        assert_eq!(r.resolve(Some(&missing), ResolvedType::Color).await, "var(--missing-alias-id)");
    }
}
