use chrono::{DateTime, SecondsFormat, Utc};
use minijinja::Environment;
use serde_json::json;

pub const DEFAULT_PLUGIN_NAME: &str = "ExportEase Plugin";

pub const DEFAULT_HEADER_TEMPLATE: &str = "Generated by {{ plugin }}\n\
Collection: {{ collection }}\n\
Mode: {{ mode }}\n\
Generated: {{ generated }}";

/// Everything a generator needs besides the tokens themselves.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub plugin_name: String,
    pub header_template: String,
    pub generated_at: DateTime<Utc>,
}

impl RenderContext {
    pub fn new(plugin_name: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            header_template: DEFAULT_HEADER_TEMPLATE.to_string(),
            generated_at,
        }
    }

    pub fn with_header_template(mut self, template: impl Into<String>) -> Self {
        self.header_template = template.into();
        self
    }

    /// Timestamp in the `2024-01-31T09:30:00.000Z` shape.
    pub fn timestamp(&self) -> String {
        self.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Header text for one generated file (not yet wrapped in comment syntax).
    pub fn header(&self, collection: &str, mode: &str) -> Result<String, minijinja::Error> {
        let ctx = json!({
            "plugin": self.plugin_name,
            "collection": collection,
            "mode": mode,
            "generated": self.timestamp(),
        });
        render_minijinja(&self.header_template, &ctx)
    }

    /// Fail early on a template that does not parse.
    pub fn validate(&self) -> Result<(), minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("header", &self.header_template)?;
        Ok(())
    }
}

fn render_minijinja(source: &str, ctx_json: &serde_json::Value) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();

    // JSON string literal of a value, e.g. for embedding names in generated code.
    env.add_filter("tojson", |s: String| -> Result<String, minijinja::Error> {
        serde_json::to_string(&s).map_err(|e| {
            minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, e.to_string())
        })
    });

    env.add_template("header", source)?;
    let tpl = env.get_template("header")?;
    let v = minijinja::value::Value::from_serialize(ctx_json);
    tpl.render(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn ctx() -> RenderContext {
        let at = Utc.with_ymd_and_hms(2024, 1, 31, 9, 30, 0).unwrap();
        RenderContext::new("ExportEase Plugin", at)
    }

    #[test]
    fn default_header() {
        assert_eq!(
            ctx().header("Brand", "Light").unwrap(),
            "Generated by ExportEase Plugin\nCollection: Brand\nMode: Light\nGenerated: 2024-01-31T09:30:00.000Z"
        );
    }

    #[test]
    fn custom_header_with_filter() {
        let c = ctx().with_header_template("{{ collection | upper }}/{{ mode | tojson }}");
        assert_eq!(c.header("Brand", "Dark").unwrap(), "BRAND/\"Dark\"");
    }

    #[test]
    fn broken_template_is_rejected() {
        let c = ctx().with_header_template("{{ collection ");
        assert!(c.validate().is_err());
    }
}
