use anyhow::{Context as _, Result};
use clap::Parser;
use std::{fs, path::Path, process::ExitCode};

use varsmith::{
    cli::{Args, Command, ReportMode},
    report::build_report,
    Config, Exporter, MemoryDocument, Request, Response,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    varsmith::init_tracing(args.verbose);

    let cfg = Config::load(args.config.as_deref())?;
    let ctx = cfg.render_context(chrono::Utc::now())?;

    match args.command {
        Command::Status(doc) => {
            let document = load_document(&doc.document)?;
            let exporter = Exporter::new(&document, ctx).with_registry(cfg.registry());
            print_payload(exporter.handle(Request::CheckExports).await)
        }

        Command::Preview(p) => {
            let document = load_document(&p.doc.document)?;
            let exporter = Exporter::new(&document, ctx).with_registry(cfg.registry());
            let format = p.format.unwrap_or_else(|| cfg.export.default_format.clone());
            print_payload(exporter.handle(Request::PreviewFiles { format }).await)
        }

        Command::Export(e) => {
            let document = load_document(&e.doc.document)?;
            let exporter = Exporter::new(&document, ctx).with_registry(cfg.registry());
            let format = e.format.unwrap_or_else(|| cfg.export.default_format.clone());
            let source = e.source.as_str().to_string();

            if e.report != ReportMode::Off {
                match exporter.analyze().await {
                    Ok(analysis) => eprint!("{}", build_report(&analysis, e.report)),
                    Err(err) => tracing::warn!(error = %err, "no analysis to report"),
                }
            }

            let request = if e.select.is_empty() {
                Request::Export { format, source }
            } else {
                Request::ExportSelected {
                    format,
                    source,
                    selected_files: e.select,
                }
            };
            let Some(response) = exporter.handle(request).await else {
                return Ok(ExitCode::SUCCESS);
            };

            if e.json || response.is_error() {
                return print_payload(Some(response));
            }

            let out_dir = e.out.unwrap_or_else(|| cfg.export.out_dir.clone());
            write_files(&out_dir, &response)?;
            if let Response::ExportMultiFile { instructions, .. } = &response {
                eprintln!("{instructions}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_document(path: &Path) -> Result<MemoryDocument> {
    MemoryDocument::load_from_path(path)
        .with_context(|| format!("failed to load document {}", path.display()))
}

fn print_payload(response: Option<Response>) -> Result<ExitCode> {
    let Some(response) = response else {
        return Ok(ExitCode::SUCCESS);
    };
    let json = serde_json::to_string_pretty(&response).context("failed to serialize payload")?;
    println!("{json}");
    Ok(if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn write_files(out_dir: &Path, response: &Response) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    for (name, content) in response.files() {
        let path = out_dir.join(name);
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}
