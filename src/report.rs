use crate::{analyze::TokenAnalysis, cli::ReportMode};

pub fn build_report(analysis: &TokenAnalysis, mode: ReportMode) -> String {
    match mode {
        ReportMode::Off => String::new(),
        ReportMode::Summary => summary(analysis),
        ReportMode::Full => full(analysis),
    }
}

fn summary(analysis: &TokenAnalysis) -> String {
    let mut out = String::new();

    out.push_str("varsmith report (summary)\n");
    out.push_str("=========================\n");
    out.push_str(&format!("tokens: {}\n", analysis.token_count()));
    out.push_str(&format!(
        "collections: {}  modes: {}\n",
        analysis.collections.len(),
        analysis.mode_count()
    ));

    out.push_str("\nby collection\n");
    for (name, n) in analysis.by_collection.iter() {
        out.push_str(&format!("  - {name}: {n}\n"));
    }

    out.push_str("\nby type\n");
    for (name, n) in analysis.by_type.iter() {
        out.push_str(&format!("  - {name}: {n}\n"));
    }

    out.push_str("\nby mode\n");
    for (name, n) in analysis.by_mode.iter() {
        out.push_str(&format!("  - {name}: {n}\n"));
    }

    out
}

fn full(analysis: &TokenAnalysis) -> String {
    let mut out = summary(analysis);

    out.push_str("\ntokens\n");
    for collection in &analysis.collections {
        out.push_str(&format!("  {}\n", collection.name));
        for mode in &collection.modes {
            out.push_str(&format!("    {} ({})\n", mode.name, mode.tokens.len()));
            for t in &mode.tokens {
                out.push_str(&format!("      {} [{}] = {}\n", t.name, t.type_name(), t.value));
            }
        }
    }

    out
}
