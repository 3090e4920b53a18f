use serde::{ser::SerializeMap, Serialize, Serializer};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::{
    analyze::{CollectionGroup, ModeGroup, TokenAnalysis},
    collect::Token,
    document::ResolvedType,
    emit::{Emitter, Format},
    error::ExportError,
    naming::{camel_case, js_identifier, pascal_case, slugify},
    templates::RenderContext,
};

// -------------------- registry --------------------

/// Format ids (and aliases) the exporter accepts.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    entries: Vec<(String, Format)>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormatRegistry {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        reg.register("css", Format::Css);
        reg.register("scss", Format::Scss);
        reg.register("sass", Format::Scss);
        reg.register("js", Format::Js);
        reg.register("javascript", Format::Js);
        reg.register("tailwind", Format::Tailwind);
        reg
    }

    /// Add or replace a format id. Ids are case-insensitive.
    pub fn register(&mut self, id: &str, format: Format) {
        let id = id.trim().to_ascii_lowercase();
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some((_, f)) => *f = format,
            None => self.entries.push((id, format)),
        }
    }

    pub fn remove(&mut self, id: &str) {
        let id = id.trim().to_ascii_lowercase();
        self.entries.retain(|(k, _)| *k != id);
    }

    pub fn lookup(&self, id: &str) -> Result<Format, ExportError> {
        let key = id.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, f)| *f)
            .ok_or_else(|| ExportError::UnsupportedFormat {
                format: id.to_string(),
            })
    }
}

// -------------------- generated files --------------------

/// Filename → content, in generation order. Filenames are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFiles {
    files: Vec<(String, String)>,
}

impl GeneratedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `name`, or under a `-2`, `-3`, ... variant when taken.
    /// Returns the name actually used.
    pub fn insert_unique(&mut self, name: &str, content: String) -> String {
        let mut names = FileNames::default();
        for (existing, _) in &self.files {
            names.reserve(existing);
        }
        let final_name = names.allocate_name(name);
        self.files.push((final_name.clone(), content));
        final_name
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.files.retain(|(n, _)| keep(n));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_single(mut self) -> Option<(String, String)> {
        if self.files.len() == 1 {
            self.files.pop()
        } else {
            None
        }
    }
}

impl Serialize for GeneratedFiles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.files.len()))?;
        for (name, content) in &self.files {
            map.serialize_entry(name, content)?;
        }
        map.end()
    }
}

/// Hands out unique filenames, suffixing the stem on collision.
#[derive(Debug, Clone, Default)]
pub struct FileNames {
    taken: BTreeSet<String>,
}

impl FileNames {
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    pub fn allocate(&mut self, stem: &str, extension: &str) -> String {
        let mut candidate = format!("{stem}.{extension}");
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{stem}-{n}.{extension}");
            n += 1;
        }
        if n > 2 {
            debug!(stem, chosen = %candidate, "filename collision resolved");
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    /// Like [`FileNames::allocate`] for a full `stem.ext` name.
    pub fn allocate_name(&mut self, name: &str) -> String {
        match name.rsplit_once('.') {
            Some((stem, ext)) => self.allocate(stem, ext),
            None => {
                let mut candidate = name.to_string();
                let mut n = 2;
                while self.taken.contains(&candidate) {
                    candidate = format!("{name}-{n}");
                    n += 1;
                }
                self.taken.insert(candidate.clone());
                candidate
            }
        }
    }
}

pub fn file_stem(collection: &str, mode: &str) -> String {
    format!("{}-{}", slugify(collection), slugify(mode))
}

// -------------------- planning + generation --------------------

/// One output file before rendering.
#[derive(Debug, Clone)]
pub struct PlannedFile<'a> {
    pub filename: String,
    pub collection: &'a CollectionGroup,
    pub mode: &'a ModeGroup,
}

/// Filenames for every (collection, mode) pair, in analysis order.
///
/// Generation and previews both go through here so they agree on names.
pub fn plan_files(format: Format, analysis: &TokenAnalysis) -> Vec<PlannedFile<'_>> {
    let mut names = FileNames::default();
    let mut out = Vec::new();
    for collection in &analysis.collections {
        for mode in &collection.modes {
            let stem = file_stem(&collection.name, &mode.name);
            out.push(PlannedFile {
                filename: names.allocate(&stem, format.extension()),
                collection,
                mode,
            });
        }
    }
    out
}

/// Render every collection/mode of the analysis in one format.
pub fn generate_files(
    format: Format,
    ctx: &RenderContext,
    analysis: &TokenAnalysis,
) -> Result<GeneratedFiles, ExportError> {
    let mut files = GeneratedFiles::new();
    for planned in plan_files(format, analysis) {
        let content = render_mode(format, ctx, &planned.collection.name, planned.mode)?;
        files.insert_unique(&planned.filename, content);
    }
    info!(format = ?format, files = files.len(), "generated files");
    Ok(files)
}

/// Render one collection on its own: one file per mode.
pub fn generate_collection(
    format: Format,
    ctx: &RenderContext,
    collection: &CollectionGroup,
) -> Result<GeneratedFiles, ExportError> {
    let mut names = FileNames::default();
    let mut files = GeneratedFiles::new();
    for mode in &collection.modes {
        let filename = names.allocate(&file_stem(&collection.name, &mode.name), format.extension());
        files.insert_unique(&filename, render_mode(format, ctx, &collection.name, mode)?);
    }
    Ok(files)
}

/// Render one mode's tokens. Tokens are written in the order given.
pub fn render_mode(
    format: Format,
    ctx: &RenderContext,
    collection: &str,
    mode: &ModeGroup,
) -> Result<String, ExportError> {
    let em = Emitter::new(format);
    let mut out = String::new();
    em.header(&mut out, &ctx.header(collection, &mode.name)?);

    let export_name = module_export_name(collection, &mode.name);
    em.open(&mut out, &export_name);

    match format {
        Format::Tailwind => {
            em.section_comment(&mut out, &format!("{} - {}", collection, mode.name));
            for (section, tokens) in tailwind_sections(&mode.tokens) {
                em.open_section(&mut out, section);
                for t in tokens {
                    em.declare(&mut out, &t.name, &t.value);
                }
                em.close_section(&mut out);
            }
        }
        Format::Css | Format::Scss | Format::Js => {
            for t in &mode.tokens {
                em.declare(&mut out, &t.name, &t.value);
            }
        }
    }

    em.close(&mut out, &export_name);
    Ok(out)
}

/// `Brand Colors` + `Dark` → `brandColorsDark`.
pub fn module_export_name(collection: &str, mode: &str) -> String {
    js_identifier(&format!("{}{}", camel_case(collection), pascal_case(mode)))
}

const SPACING_HINTS: [&str; 4] = ["spacing", "gap", "margin", "padding"];

fn tailwind_section(token: &Token) -> &'static str {
    match token.resolved_type {
        ResolvedType::Color => "colors",
        ResolvedType::Float => {
            let name = token.name.to_ascii_lowercase();
            if SPACING_HINTS.iter().any(|h| name.contains(h)) {
                "spacing"
            } else {
                "variables"
            }
        }
        _ => "variables",
    }
}

/// Partition into theme sections, in order of first appearance, keeping the
/// given token order inside each section.
fn tailwind_sections(tokens: &[Token]) -> Vec<(&'static str, Vec<&Token>)> {
    let mut sections: Vec<(&'static str, Vec<&Token>)> = Vec::new();
    for t in tokens {
        let section = tailwind_section(t);
        match sections.iter_mut().find(|(s, _)| *s == section) {
            Some((_, list)) => list.push(t),
            None => sections.push((section, vec![t])),
        }
    }
    sections
}

/// Preview size estimate: per-token bytes plus fixed boilerplate.
pub fn estimate_size(format: Format, token_count: usize) -> String {
    if token_count == 0 {
        return "0B".to_string();
    }
    let bytes = token_count * format.bytes_per_token() + 200;
    if bytes < 1024 {
        format!("{bytes}B")
    } else if bytes < 1024 * 1024 {
        format!("{}KB", (bytes as f64 / 1024.0).round())
    } else {
        format!("{}MB", (bytes as f64 / (1024.0 * 1024.0)).round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn ctx() -> RenderContext {
        RenderContext::new("ExportEase Plugin", Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    fn token(name: &str, value: &str, ty: ResolvedType) -> Token {
        Token {
            name: name.into(),
            value: value.into(),
            collection: "Brand".into(),
            mode: "Light".into(),
            resolved_type: ty,
            original_value: serde_json::Value::Null,
        }
    }

    fn mode(name: &str, tokens: Vec<Token>) -> ModeGroup {
        ModeGroup {
            name: name.into(),
            tokens,
        }
    }

    #[test]
    fn registry_lookup_is_case_insensitive_and_strict() {
        let reg = FormatRegistry::builtin();
        assert_eq!(reg.lookup("CSS").unwrap(), Format::Css);
        assert_eq!(reg.lookup("javascript").unwrap(), Format::Js);
        assert_eq!(reg.lookup("sass").unwrap(), Format::Scss);
        assert!(matches!(
            reg.lookup("dart"),
            Err(ExportError::UnsupportedFormat { format }) if format == "dart"
        ));

        let mut reg = reg;
        reg.remove("scss");
        assert!(reg.lookup("scss").is_err());
        assert!(reg.lookup("sass").is_ok());
    }

    #[test]
    fn css_file_layout() {
        let m = mode(
            "Light",
            vec![
                token("color-primary", "rgb(255, 0, 0)", ResolvedType::Color),
                token("spacing-100", "8", ResolvedType::Float),
            ],
        );
        let out = render_mode(Format::Css, &ctx(), "Brand", &m).unwrap();
        assert_eq!(
            out,
            "/* Generated by ExportEase Plugin\nCollection: Brand\nMode: Light\nGenerated: 2024-05-01T12:00:00.000Z */\n\n\
:root {\n  --color-primary: rgb(255, 0, 0);\n  --spacing-100: 8;\n}\n"
        );
    }

    #[test]
    fn js_module_layout() {
        let m = mode("Dark Mode", vec![token("spacing-100", "8", ResolvedType::Float)]);
        let out = render_mode(Format::Js, &ctx(), "Brand Colors", &m).unwrap();
        assert!(out.starts_with("// Generated by ExportEase Plugin\n// Collection: Brand Colors\n"));
        assert!(out.contains("export const brandColorsDarkMode = {\n  spacing_100: '8',\n};\n"));
        assert!(out.ends_with("export default brandColorsDarkMode;\n"));
    }

    #[test]
    fn tailwind_sections_appear_once_in_order() {
        let m = mode(
            "Light",
            vec![
                token("color-a", "rgb(0, 0, 0)", ResolvedType::Color),
                token("opacity-50", "0.5", ResolvedType::Float),
                token("color-b", "rgb(1, 1, 1)", ResolvedType::Color),
                token("font-body", "Inter", ResolvedType::String),
                token("spacing-4", "16", ResolvedType::Float),
            ],
        );
        let out = render_mode(Format::Tailwind, &ctx(), "Brand", &m).unwrap();
        let expected_body = "\
module.exports = {
  theme: {
    extend: {
      // Brand - Light
      colors: {
        'color-a': 'rgb(0, 0, 0)',
        'color-b': 'rgb(1, 1, 1)',
      },
      variables: {
        'opacity-50': '0.5',
        'font-body': 'Inter',
      },
      spacing: {
        'spacing-4': '16',
      },
    },
  },
};
";
        assert!(out.contains("// Tailwind CSS configuration\n\n"));
        assert!(out.ends_with(expected_body), "{out}");
    }

    #[test]
    fn scss_variables() {
        let m = mode("Light", vec![token("Radius/Small", "4", ResolvedType::Float)]);
        let out = render_mode(Format::Scss, &ctx(), "Brand", &m).unwrap();
        assert!(out.ends_with("\n$radius-small: 4;\n"));
    }

    #[test]
    fn colliding_mode_names_get_distinct_files() {
        let analysis = TokenAnalysis {
            collections: vec![CollectionGroup {
                name: "Brand".into(),
                modes: vec![
                    mode("Light", vec![token("a", "1", ResolvedType::Float)]),
                    mode("LIGHT", vec![token("a", "2", ResolvedType::Float)]),
                    mode("light!", vec![token("a", "3", ResolvedType::Float)]),
                ],
            }],
            ..Default::default()
        };

        let files = generate_files(Format::Css, &ctx(), &analysis).unwrap();
        let names: Vec<&str> = files.names().collect();
        assert_eq!(names, vec!["brand-light.css", "brand-light-2.css", "brand-light-3.css"]);
        assert!(files.get("brand-light-2.css").unwrap().contains("--a: 2;"));

        let single = generate_collection(Format::Css, &ctx(), &analysis.collections[0]).unwrap();
        assert_eq!(single.len(), 3);
    }

    #[test]
    fn size_estimates() {
        assert_eq!(estimate_size(Format::Css, 0), "0B");
        assert_eq!(estimate_size(Format::Css, 10), "650B");
        assert_eq!(estimate_size(Format::Js, 100), "4KB");
        assert_eq!(estimate_size(Format::Tailwind, 30000), "1MB");
    }
}
