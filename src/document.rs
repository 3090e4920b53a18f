//! Records read from the host design document, and the query interface the
//! pipeline uses to reach them.
//!
//! Every field the host may omit is optional here; the collector decides what
//! counts as malformed rather than deserialization.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResolvedType {
    Color,
    Float,
    String,
    Boolean,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResolvedType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolvedType::Color => "COLOR",
            ResolvedType::Float => "FLOAT",
            ResolvedType::String => "STRING",
            ResolvedType::Boolean => "BOOLEAN",
            ResolvedType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub variable_collection_id: String,

    #[serde(default)]
    pub resolved_type: ResolvedType,

    /// mode id → raw value. A missing key means the variable has no value in
    /// that mode; a JSON `null` is a present-but-null value.
    #[serde(default)]
    pub values_by_mode: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCollection {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub modes: Option<Vec<Mode>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    #[serde(default)]
    pub mode_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

// -------------------- styles --------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rgba {
    #[serde(default)]
    pub r: f64,
    #[serde(default)]
    pub g: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub a: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintStyle {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub paints: Vec<Paint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub color: Option<Rgba>,

    #[serde(default)]
    pub opacity: Option<f64>,

    #[serde(default)]
    pub gradient_stops: Vec<GradientStop>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradientStop {
    #[serde(default)]
    pub color: Option<Rgba>,

    #[serde(default)]
    pub position: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub font_size: Option<f64>,

    #[serde(default)]
    pub font_name: Option<FontName>,

    #[serde(default)]
    pub line_height: Option<LineHeight>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontName {
    #[serde(default)]
    pub family: String,

    #[serde(default)]
    pub style: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineHeight {
    #[serde(default)]
    pub unit: String,

    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectStyle {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub effects: Option<Vec<Effect>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub offset: Option<Offset>,

    #[serde(default)]
    pub radius: f64,

    #[serde(default)]
    pub spread: f64,

    #[serde(default)]
    pub color: Option<Rgba>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Offset {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

// -------------------- query interface --------------------

/// Read-only view of the host document.
///
/// The pipeline only ever reads through this trait, so tests and the CLI can
/// supply documents without a live host.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn list_variables(&self) -> Result<Vec<Variable>>;
    async fn list_variable_collections(&self) -> Result<Vec<VariableCollection>>;

    /// Look up one variable for alias resolution. `Ok(None)` when the id is unknown.
    async fn get_variable_by_id(&self, id: &str) -> Result<Option<Variable>>;

    async fn list_paint_styles(&self) -> Result<Vec<PaintStyle>>;
    async fn list_text_styles(&self) -> Result<Vec<TextStyle>>;
    async fn list_effect_styles(&self) -> Result<Vec<EffectStyle>>;
}

/// A document snapshot held in memory, usually loaded from a JSON export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDocument {
    #[serde(default)]
    pub variables: Vec<Variable>,

    #[serde(default)]
    pub variable_collections: Vec<VariableCollection>,

    #[serde(default)]
    pub paint_styles: Vec<PaintStyle>,

    #[serde(default)]
    pub text_styles: Vec<TextStyle>,

    #[serde(default)]
    pub effect_styles: Vec<EffectStyle>,
}

impl MemoryDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(text).context("invalid document JSON")?;
        Ok(doc)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read document: {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("failed to parse document: {}", path.display()))
    }
}

#[async_trait]
impl DocumentSource for MemoryDocument {
    async fn list_variables(&self) -> Result<Vec<Variable>> {
        Ok(self.variables.clone())
    }

    async fn list_variable_collections(&self) -> Result<Vec<VariableCollection>> {
        Ok(self.variable_collections.clone())
    }

    async fn get_variable_by_id(&self, id: &str) -> Result<Option<Variable>> {
        Ok(self.variables.iter().find(|v| v.id == id).cloned())
    }

    async fn list_paint_styles(&self) -> Result<Vec<PaintStyle>> {
        Ok(self.paint_styles.clone())
    }

    async fn list_text_styles(&self) -> Result<Vec<TextStyle>> {
        Ok(self.text_styles.clone())
    }

    async fn list_effect_styles(&self) -> Result<Vec<EffectStyle>> {
        Ok(self.effect_styles.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_host_field_names() {
        let doc = MemoryDocument::from_json(
            r#"{
                "variables": [{
                    "id": "VariableID:1",
                    "name": "color-primary",
                    "variableCollectionId": "C1",
                    "resolvedType": "COLOR",
                    "valuesByMode": { "m1": { "r": 1, "g": 0, "b": 0, "a": 1 }, "m2": null }
                }],
                "variableCollections": [{
                    "id": "C1",
                    "name": "Brand",
                    "modes": [{ "modeId": "m1", "name": "Light" }]
                }]
            }"#,
        )
        .unwrap();

        let v = &doc.variables[0];
        assert_eq!(v.resolved_type, ResolvedType::Color);
        assert_eq!(v.variable_collection_id, "C1");
        let values = v.values_by_mode.as_ref().unwrap();
        assert!(values["m2"].is_null());
        assert!(!values.contains_key("m3"));

        let modes = doc.variable_collections[0].modes.as_ref().unwrap();
        assert_eq!(modes[0].mode_id.as_deref(), Some("m1"));
    }

    #[test]
    fn unknown_resolved_type_maps_to_unknown() {
        let v: Variable = serde_json::from_str(r#"{ "resolvedType": "GRADIENT" }"#).unwrap();
        assert_eq!(v.resolved_type, ResolvedType::Unknown);
        assert!(v.name.is_none());
        assert!(v.values_by_mode.is_none());
    }
}
