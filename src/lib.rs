pub mod analyze;
pub mod cli;
pub mod collect;
pub mod config;
pub mod document;
pub mod emit;
pub mod error;
pub mod generate;
pub mod naming;
pub mod report;
pub mod resolve;
pub mod service;
pub mod sort;
pub mod styles;
pub mod templates;

pub use analyze::{analyze_tokens, TokenAnalysis};
pub use collect::{collect_tokens, Token};
pub use config::Config;
pub use document::{DocumentSource, MemoryDocument, ResolvedType};
pub use emit::{Emitter, Format};
pub use error::ExportError;
pub use generate::{FormatRegistry, GeneratedFiles};
pub use resolve::Resolver;
pub use service::{ExportSource, Exporter, Request, Response};
pub use sort::sort_names;
pub use templates::RenderContext;

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbosity`.
pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // a second init (tests, embedding) is not an error worth surfacing
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .try_init();
}
