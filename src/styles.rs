use tracing::{debug, warn};

use crate::{
    document::{DocumentSource, EffectStyle, Paint, PaintStyle, Rgba, TextStyle},
    emit::{Emitter, Format},
    error::ExportError,
    resolve::{format_rgba, COLOR_FALLBACK},
    templates::RenderContext,
};

const SHADOW_FALLBACK: &str = "rgba(0, 0, 0, 0.25)";

/// Local paint, text and effect styles of a document.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub paints: Vec<PaintStyle>,
    pub texts: Vec<TextStyle>,
    pub effects: Vec<EffectStyle>,
}

impl StyleSheet {
    pub async fn load(source: &dyn DocumentSource) -> Result<Self, ExportError> {
        Ok(Self {
            paints: source
                .list_paint_styles()
                .await
                .map_err(ExportError::document("paint styles"))?,
            texts: source
                .list_text_styles()
                .await
                .map_err(ExportError::document("text styles"))?,
            effects: source
                .list_effect_styles()
                .await
                .map_err(ExportError::document("effect styles"))?,
        })
    }

    pub fn len(&self) -> usize {
        self.paints.len() + self.texts.len() + self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render every style into a single `styles.<ext>` file.
    pub fn render(&self, format: Format, ctx: &RenderContext) -> Result<(String, String), ExportError> {
        if self.is_empty() {
            return Err(ExportError::NoStyles);
        }

        let content = match format {
            Format::Css => self.render_css(ctx),
            Format::Js => self.render_js(ctx),
            Format::Scss | Format::Tailwind => {
                return Err(ExportError::StylesFormatUnsupported {
                    format: format.to_string(),
                })
            }
        };

        debug!(
            paints = self.paints.len(),
            texts = self.texts.len(),
            effects = self.effects.len(),
            "rendered styles"
        );
        Ok((format!("styles.{}", format.extension()), content))
    }

    fn render_css(&self, ctx: &RenderContext) -> String {
        let em = Emitter::new(Format::Css);
        let mut out = String::new();
        em.header(&mut out, &styles_header(ctx));
        em.open(&mut out, "");

        if !self.paints.is_empty() {
            out.push_str("  /* Paint Styles */\n");
            for style in &self.paints {
                let Some(name) = style_name(&style.name) else { continue };
                em.declare(&mut out, name, &paint_color(style));
            }
        }

        if !self.texts.is_empty() {
            out.push_str("\n  /* Text Styles */\n");
            for style in &self.texts {
                let Some(name) = style_name(&style.name) else { continue };
                for (suffix, value) in text_properties(style) {
                    em.declare(&mut out, &format!("{name}-{suffix}"), &value);
                }
            }
        }

        if !self.effects.is_empty() {
            out.push_str("\n  /* Effect Styles */\n");
            for style in &self.effects {
                let Some(name) = style_name(&style.name) else { continue };
                for (prop, value) in shadows(style) {
                    em.declare(&mut out, &format!("{name}-{prop}"), &value);
                }
            }
        }

        em.close(&mut out, "");
        out
    }

    fn render_js(&self, ctx: &RenderContext) -> String {
        let em = Emitter::new(Format::Js);
        let mut out = String::new();
        em.header(&mut out, &styles_header(ctx));
        em.open(&mut out, "styles");
        for style in &self.paints {
            let Some(name) = style_name(&style.name) else { continue };
            em.declare(&mut out, name, &paint_color(style));
        }
        em.close(&mut out, "styles");
        out
    }
}

fn styles_header(ctx: &RenderContext) -> String {
    format!(
        "Generated by {}\nLocal styles\nGenerated: {}",
        ctx.plugin_name,
        ctx.timestamp()
    )
}

fn style_name(name: &Option<String>) -> Option<&str> {
    match name.as_deref() {
        Some(n) if !n.is_empty() => Some(n),
        _ => {
            warn!("skipping unnamed style");
            None
        }
    }
}

/// Color of the first paint; black when it has none we can express.
pub fn paint_color(style: &PaintStyle) -> String {
    match style.paints.first() {
        Some(paint) => match paint.kind.as_str() {
            "SOLID" => solid_color(paint),
            "GRADIENT_LINEAR" | "GRADIENT_RADIAL" => paint
                .gradient_stops
                .first()
                .and_then(|stop| stop.color)
                .map(rgba)
                .unwrap_or_else(|| COLOR_FALLBACK.to_string()),
            other => {
                debug!(kind = other, "paint kind has no single color");
                COLOR_FALLBACK.to_string()
            }
        },
        None => COLOR_FALLBACK.to_string(),
    }
}

fn solid_color(paint: &Paint) -> String {
    match paint.color {
        Some(c) => format_rgba(c.r, c.g, c.b, Some(paint.opacity.unwrap_or(1.0))),
        None => COLOR_FALLBACK.to_string(),
    }
}

/// Always the four-channel form, alpha defaulting to 1.
fn rgba(c: Rgba) -> String {
    let channel = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(c.r),
        channel(c.g),
        channel(c.b),
        c.a.unwrap_or(1.0)
    )
}

/// `(suffix, value)` pairs for the typography of one text style.
pub fn text_properties(style: &TextStyle) -> Vec<(&'static str, String)> {
    let mut props = Vec::new();
    if let Some(size) = style.font_size.filter(|s| *s != 0.0) {
        props.push(("font-size", format!("{size}px")));
    }
    if let Some(font) = &style.font_name {
        if !font.family.is_empty() {
            props.push(("font-family", format!("\"{}\"", font.family)));
        }
        if !font.style.is_empty() {
            props.push(("font-style", font.style.to_lowercase()));
        }
    }
    if let Some(lh) = &style.line_height {
        if let Some(value) = lh.value {
            match lh.unit.as_str() {
                "PIXELS" => props.push(("line-height", format!("{value}px"))),
                "PERCENT" => props.push(("line-height", format!("{value}%"))),
                _ => {}
            }
        }
    }
    props
}

/// Drop shadows as `(property, value)`; the n-th effect gets a `-n` suffix.
pub fn shadows(style: &EffectStyle) -> Vec<(String, String)> {
    let Some(effects) = &style.effects else {
        return Vec::new();
    };

    effects
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == "DROP_SHADOW")
        .map(|(i, e)| {
            let prop = if i == 0 {
                "shadow".to_string()
            } else {
                format!("shadow-{}", i + 1)
            };
            let offset = e.offset.unwrap_or_default();
            let color = e.color.map(rgba).unwrap_or_else(|| SHADOW_FALLBACK.to_string());
            let value = format!(
                "{}px {}px {}px {}px {}",
                offset.x, offset.y, e.radius, e.spread, color
            );
            (prop, value)
        })
        .collect()
}
