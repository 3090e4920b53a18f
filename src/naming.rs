use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static NON_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());
static REPEATED_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").unwrap());

/// Lowercase, collapse every run of non `[a-z0-9]` into one dash, trim edge dashes.
///
/// Used for filenames, CSS custom properties, SCSS variables and Tailwind keys.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_SLUG.replace_all(&lower, "-").trim_matches('-').to_string()
}

/// Custom-property name for a variable (`color/Primary 500` → `color-primary-500`).
pub fn css_identifier(name: &str) -> String {
    slugify(name)
}

/// Identifier safe for a JS object key or binding.
///
/// Non `[A-Za-z0-9]` runs become `_`, repeated underscores collapse, edge
/// underscores are trimmed, and a leading digit gets a `_` prefix.
pub fn js_identifier(name: &str) -> String {
    let replaced = NON_IDENT.replace_all(name, "_");
    let collapsed = REPEATED_UNDERSCORE.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');

    match trimmed.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{trimmed}"),
        Some(_) => trimmed.to_string(),
    }
}

pub fn pascal_case(text: &str) -> String {
    NON_IDENT
        .split(text)
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut word = first.to_uppercase().to_string();
                    word.push_str(&chars.as_str().to_lowercase());
                    word
                }
                None => String::new(),
            }
        })
        .collect()
}

pub fn camel_case(text: &str) -> String {
    let pascal = pascal_case(text);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => {
            let mut out = first.to_lowercase().to_string();
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Human-readable usage notes for a set of generated files.
pub fn import_instructions<'a, I>(filenames: I, format_id: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = filenames.into_iter().collect();

    let mut out = String::new();
    out.push_str(&format!("Generated {} files:\n\n", names.len()));
    for name in &names {
        out.push_str(&format!("  - {name}\n"));
    }

    out.push_str("\nImport instructions:\n");
    match format_id.to_ascii_lowercase().as_str() {
        "css" => {
            out.push_str("Import in HTML:\n");
            for name in &names {
                out.push_str(&format!("<link rel=\"stylesheet\" href=\"{name}\">\n"));
            }
        }
        "scss" | "sass" => {
            out.push_str("Import in SCSS:\n");
            for name in &names {
                let stem = name.strip_suffix(".scss").unwrap_or(name);
                out.push_str(&format!("@import '{stem}';\n"));
            }
        }
        "js" | "javascript" => {
            out.push_str("Import in JavaScript:\n");
            for name in &names {
                let stem = name.strip_suffix(".js").unwrap_or(name);
                out.push_str(&format!("import {} from './{name}';\n", js_identifier(&camel_case(stem))));
            }
        }
        other => {
            out.push_str(&format!("Use the files as appropriate for your {other} setup.\n"));
        }
    }

    out
}
