use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{
    emit::Format,
    generate::FormatRegistry,
    templates::{RenderContext, DEFAULT_HEADER_TEMPLATE, DEFAULT_PLUGIN_NAME},
};

pub const CONFIG_ENV: &str = "VARSMITH_CONFIG";

/// `$XDG_CONFIG_HOME/varsmith/config.toml`, falling back to `~/.config`.
pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return PathBuf::from(xdg).join("varsmith").join("config.toml");
        }
    }
    match dirs::home_dir() {
        Some(home) => home.join(".config").join("varsmith").join("config.toml"),
        None => PathBuf::from("varsmith/config.toml"),
    }
}

/// Config path precedence:
/// 1) CLI --config (must exist)
/// 2) VARSMITH_CONFIG (must exist)
/// 3) default XDG path, only when present
pub fn locate_config(cli_config: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(p) = cli_config {
        if !p.exists() {
            bail!("--config was provided but file does not exist: {}", p.display());
        }
        return Ok(Some(p.to_path_buf()));
    }

    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        let p = PathBuf::from(p);
        if !p.exists() {
            bail!("{CONFIG_ENV} is set but file does not exist: {}", p.display());
        }
        return Ok(Some(p));
    }

    let p = default_config_path();
    Ok(p.exists().then_some(p))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub formats: FormatsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default = "default_plugin_name")]
    pub plugin_name: String,

    #[serde(default = "default_format")]
    pub default_format: String,

    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// minijinja template for the header comment of every generated file.
    #[serde(default)]
    pub header_template: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            plugin_name: default_plugin_name(),
            default_format: default_format(),
            out_dir: default_out_dir(),
            header_template: None,
        }
    }
}

fn default_plugin_name() -> String {
    DEFAULT_PLUGIN_NAME.to_string()
}

fn default_format() -> String {
    Format::Css.name().to_string()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("tokens")
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatsConfig {
    /// Format ids (or aliases) to remove from the registry.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Config {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(cfg)
    }

    /// Load the located config, or defaults when there is none.
    pub fn load(cli_config: Option<&Path>) -> Result<Self> {
        match locate_config(cli_config)? {
            Some(p) => Self::load_from_path(&p),
            None => Ok(Self::default()),
        }
    }

    pub fn registry(&self) -> FormatRegistry {
        let mut registry = FormatRegistry::builtin();
        for id in &self.formats.disabled {
            registry.remove(id);
        }
        registry
    }

    pub fn render_context(&self, generated_at: chrono::DateTime<chrono::Utc>) -> Result<RenderContext> {
        let ctx = RenderContext::new(&self.export.plugin_name, generated_at).with_header_template(
            self.export
                .header_template
                .as_deref()
                .unwrap_or(DEFAULT_HEADER_TEMPLATE),
        );
        ctx.validate().context("invalid [export] header_template")?;
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.export.plugin_name, DEFAULT_PLUGIN_NAME);
        assert_eq!(cfg.export.default_format, "css");
        assert_eq!(cfg.export.out_dir, PathBuf::from("tokens"));
        assert!(cfg.formats.disabled.is_empty());
    }

    #[test]
    fn disabled_formats_leave_the_registry() {
        let cfg: Config = toml::from_str(
            r#"
            [export]
            plugin_name = "Tokens Bot"

            [formats]
            disabled = ["Tailwind", "sass"]
            "#,
        )
        .unwrap();

        let reg = cfg.registry();
        assert!(reg.lookup("tailwind").is_err());
        assert!(reg.lookup("sass").is_err());
        assert!(reg.lookup("scss").is_ok());
        assert_eq!(cfg.export.plugin_name, "Tokens Bot");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[export]\nplugin = \"x\"\n").is_err());
    }

    #[test]
    fn broken_header_template_fails_to_load() {
        let cfg: Config = toml::from_str("[export]\nheader_template = \"{% if %}\"\n").unwrap();
        assert!(cfg.render_context(Utc::now()).is_err());

        let cfg: Config = toml::from_str("[export]\nheader_template = \"{{ collection }}\"\n").unwrap();
        let ctx = cfg.render_context(Utc::now()).unwrap();
        assert_eq!(ctx.header("Brand", "Light").unwrap(), "Brand");
    }

    #[test]
    fn explicit_config_must_exist() {
        let missing = Path::new("/definitely/not/here/varsmith.toml");
        assert!(locate_config(Some(missing)).is_err());
    }
}
