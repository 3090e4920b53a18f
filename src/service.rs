//! Request surface: one request in, at most one payload out.

use serde::{Deserialize, Serialize};
use std::{error::Error as _, fmt, str::FromStr};
use tracing::{debug, error, info, warn};

use crate::{
    analyze::{analyze_tokens, TokenAnalysis},
    collect::{collect_tokens, expected_token_count},
    document::DocumentSource,
    emit::Format,
    error::ExportError,
    generate::{estimate_size, generate_files, plan_files, FormatRegistry, GeneratedFiles},
    naming::import_instructions,
    styles::StyleSheet,
    templates::RenderContext,
};

// -------------------- requests --------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportSource {
    #[default]
    Variables,
    Styles,
}

impl ExportSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportSource::Variables => "variables",
            ExportSource::Styles => "styles",
        }
    }
}

impl fmt::Display for ExportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportSource {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "variables" => Ok(ExportSource::Variables),
            "styles" => Ok(ExportSource::Styles),
            other => Err(ExportError::UnknownSource {
                source_name: other.to_string(),
            }),
        }
    }
}

fn default_source() -> String {
    ExportSource::Variables.as_str().to_string()
}

/// Incoming message. `source` stays a string so an unknown value becomes an
/// error payload rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    CheckExports,
    Export {
        format: String,
        #[serde(default = "default_source")]
        source: String,
    },
    ExportSelected {
        format: String,
        #[serde(default = "default_source")]
        source: String,
        #[serde(rename = "selectedFiles", default)]
        selected_files: Vec<String>,
    },
    PreviewFiles {
        format: String,
    },
    CancelExport,
}

impl Request {
    fn failure_prefix(&self) -> &'static str {
        match self {
            Request::CheckExports => "Failed to analyze exports",
            Request::Export { source, .. } if source == "styles" => "Styles export failed",
            Request::Export { .. } => "Variable export failed",
            Request::ExportSelected { .. } => "Selected files export failed",
            Request::PreviewFiles { .. } => "File preview failed",
            Request::CancelExport => "Export cancel failed",
        }
    }
}

// -------------------- responses --------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub paint_styles: usize,
    pub text_styles: usize,
    pub effect_styles: usize,
    pub variables: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePreviewEntry {
    pub filename: String,
    pub collection: String,
    pub mode: String,
    pub estimated_size: String,
    pub tokens_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilePreview {
    pub format: String,
    pub source: String,
    pub files: Vec<FilePreviewEntry>,
    pub total_collections: usize,
    pub total_modes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    #[serde(rename_all = "camelCase")]
    ExportStatus {
        has_exports: bool,
        styles_count: usize,
        variables_count: usize,
        breakdown: Breakdown,
    },
    ExportReady {
        format: String,
        filename: String,
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    ExportMultiFile {
        format: String,
        file_count: usize,
        files: GeneratedFiles,
        instructions: String,
    },
    FilePreview(FilePreview),
    Error {
        message: String,
    },
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Every file carried by the payload, in order.
    pub fn files(&self) -> Vec<(&str, &str)> {
        match self {
            Response::ExportReady {
                filename, content, ..
            } => vec![(filename.as_str(), content.as_str())],
            Response::ExportMultiFile { files, .. } => files.iter().collect(),
            _ => Vec::new(),
        }
    }

    fn from_files(format_id: &str, format: Format, files: GeneratedFiles) -> Result<Self, ExportError> {
        if files.len() > 1 {
            return Ok(Response::ExportMultiFile {
                format: format_id.to_string(),
                file_count: files.len(),
                instructions: import_instructions(files.names(), format.name()),
                files,
            });
        }
        match files.into_single() {
            Some((filename, content)) => Ok(Response::ExportReady {
                format: format_id.to_string(),
                filename,
                content,
            }),
            None => Err(ExportError::NoFilesGenerated {
                format: format_id.to_string(),
            }),
        }
    }
}

// -------------------- exporter --------------------

/// Runs export requests against one document.
pub struct Exporter<'a> {
    source: &'a dyn DocumentSource,
    registry: FormatRegistry,
    ctx: RenderContext,
}

impl<'a> Exporter<'a> {
    pub fn new(source: &'a dyn DocumentSource, ctx: RenderContext) -> Self {
        Self {
            source,
            registry: FormatRegistry::builtin(),
            ctx,
        }
    }

    pub fn with_registry(mut self, registry: FormatRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Answer a request. Failures become the single error payload.
    /// Cancellation is only logged and yields no payload.
    pub async fn handle(&self, request: Request) -> Option<Response> {
        let prefix = request.failure_prefix();
        let result = match &request {
            Request::CancelExport => {
                info!("export cancelled by caller");
                return None;
            }
            Request::CheckExports => self.status().await,
            Request::Export { format, source } => self.export(format, source).await,
            Request::ExportSelected {
                format,
                source,
                selected_files,
            } => self.export_selected(format, source, selected_files).await,
            Request::PreviewFiles { format } => self.preview_files(format).await.map(Response::FilePreview),
        };

        Some(result.unwrap_or_else(|e| {
            error!(chain = %error_chain(&e), "{prefix}");
            Response::Error {
                message: format!("{prefix}: {e}"),
            }
        }))
    }

    pub async fn status(&self) -> Result<Response, ExportError> {
        let paints = self
            .source
            .list_paint_styles()
            .await
            .map_err(ExportError::document("paint styles"))?;
        let texts = self
            .source
            .list_text_styles()
            .await
            .map_err(ExportError::document("text styles"))?;
        let effects = self
            .source
            .list_effect_styles()
            .await
            .map_err(ExportError::document("effect styles"))?;
        let variables = self
            .source
            .list_variables()
            .await
            .map_err(ExportError::document("variables"))?;

        let breakdown = Breakdown {
            paint_styles: paints.len(),
            text_styles: texts.len(),
            effect_styles: effects.len(),
            variables: variables.len(),
        };
        let styles_count = paints.len() + texts.len() + effects.len();
        let has_exports = styles_count > 0 || !variables.is_empty();
        if !has_exports {
            warn!("document has neither variables nor styles");
        }
        info!(styles = styles_count, variables = variables.len(), "export status");

        Ok(Response::ExportStatus {
            has_exports,
            styles_count,
            variables_count: variables.len(),
            breakdown,
        })
    }

    /// Query, collect and group the document's variables.
    pub async fn analyze(&self) -> Result<TokenAnalysis, ExportError> {
        let variables = self
            .source
            .list_variables()
            .await
            .map_err(ExportError::document("variables"))?;
        if variables.is_empty() {
            return Err(ExportError::NoVariables);
        }

        let collections = self
            .source
            .list_variable_collections()
            .await
            .map_err(ExportError::document("variable collections"))?;
        if collections.is_empty() {
            return Err(ExportError::NoCollections);
        }
        debug!(variables = variables.len(), collections = collections.len(), "document loaded");

        let expected = expected_token_count(&variables, &collections);
        let tokens = collect_tokens(self.source, &variables, &collections).await;
        if tokens.is_empty() {
            return Err(ExportError::NoTokens {
                variables: variables.len(),
                expected,
            });
        }
        if tokens.len() * 10 < expected * 9 {
            warn!(
                collected = tokens.len(),
                expected,
                "collected fewer tokens than expected; some may be missing"
            );
        }

        let analysis = analyze_tokens(&tokens);
        if analysis.collections.is_empty() {
            return Err(ExportError::NoValidCollections { tokens: tokens.len() });
        }
        for (collection, count) in analysis.by_collection.iter() {
            debug!(collection, tokens = count, "collection analyzed");
        }
        Ok(analysis)
    }

    /// Every file the request would produce, before any selection.
    pub async fn render(&self, format_id: &str, source: &str) -> Result<(Format, GeneratedFiles), ExportError> {
        let source: ExportSource = source.parse()?;
        let format = self.registry.lookup(format_id)?;

        let files = match source {
            ExportSource::Variables => {
                let analysis = self.analyze().await?;
                generate_files(format, &self.ctx, &analysis)?
            }
            ExportSource::Styles => {
                let sheet = StyleSheet::load(self.source).await?;
                let (filename, content) = sheet.render(format, &self.ctx)?;
                let mut files = GeneratedFiles::new();
                files.insert_unique(&filename, content);
                files
            }
        };
        Ok((format, files))
    }

    pub async fn export(&self, format_id: &str, source: &str) -> Result<Response, ExportError> {
        let (format, files) = self.render(format_id, source).await?;
        info!(format = format_id, source, files = files.len(), "export complete");
        Response::from_files(format_id, format, files)
    }

    /// Export only the files whose final name matches one of `patterns`.
    pub async fn export_selected(
        &self,
        format_id: &str,
        source: &str,
        patterns: &[String],
    ) -> Result<Response, ExportError> {
        let matchers = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|source| ExportError::InvalidSelection {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (format, mut files) = self.render(format_id, source).await?;
        let generated = files.len();
        files.retain(|name| matchers.iter().any(|m| m.matches(name)));
        debug!(generated, selected = files.len(), "applied file selection");

        if files.is_empty() {
            return Err(ExportError::NothingSelected {
                format: format_id.to_string(),
                patterns: patterns.to_vec(),
            });
        }
        Response::from_files(format_id, format, files)
    }

    /// Filenames and size estimates without rendering any content.
    pub async fn preview_files(&self, format_id: &str) -> Result<FilePreview, ExportError> {
        let format = self.registry.lookup(format_id)?;
        let analysis = self.analyze().await?;

        let files: Vec<FilePreviewEntry> = plan_files(format, &analysis)
            .into_iter()
            .map(|planned| FilePreviewEntry {
                estimated_size: estimate_size(format, planned.mode.tokens.len()),
                tokens_count: planned.mode.tokens.len(),
                collection: planned.collection.name.clone(),
                mode: planned.mode.name.clone(),
                filename: planned.filename,
            })
            .collect();
        info!(files = files.len(), "file preview generated");

        Ok(FilePreview {
            format: format_id.to_string(),
            source: ExportSource::Variables.as_str().to_string(),
            files,
            total_collections: analysis.collections.len(),
            total_modes: analysis.mode_count(),
        })
    }
}

fn error_chain(e: &ExportError) -> String {
    let mut out = e.to_string();
    let mut cur = e.source();
    while let Some(cause) = cur {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        cur = cause.source();
    }
    out
}
