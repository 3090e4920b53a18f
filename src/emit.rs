use crate::naming::{js_identifier, slugify};

/// Output syntaxes the generators can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Css,
    Scss,
    Js,
    Tailwind,
}

impl Format {
    /// Canonical registry id.
    pub fn name(self) -> &'static str {
        match self {
            Format::Css => "css",
            Format::Scss => "scss",
            Format::Js => "js",
            Format::Tailwind => "tailwind",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Css => "css",
            Format::Scss => "scss",
            Format::Js | Format::Tailwind => "js",
        }
    }

    /// Rough output size per declaration, used by file previews.
    pub fn bytes_per_token(self) -> usize {
        match self {
            Format::Css => 45,
            Format::Scss => 40,
            Format::Js => 35,
            Format::Tailwind => 50,
        }
    }

    /// Identifier transform for a token name in this syntax.
    pub fn key(self, name: &str) -> String {
        match self {
            Format::Js => js_identifier(name),
            Format::Css | Format::Scss | Format::Tailwind => slugify(name),
        }
    }
}

/// Line writer for one output syntax.
#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    format: Format,
}

impl Emitter {
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    /// Multi-line comment block followed by a blank line.
    pub fn header(&self, out: &mut String, text: &str) {
        let text = text.trim_end();
        match self.format {
            Format::Css => {
                out.push_str("/* ");
                out.push_str(&text.replace("*/", "* /"));
                out.push_str(" */\n");
            }
            Format::Scss | Format::Js | Format::Tailwind => {
                for line in text.lines() {
                    self.comment(out, line);
                }
            }
        }
        if self.format == Format::Tailwind {
            self.comment(out, "Tailwind CSS configuration");
        }
        self.blank(out);
    }

    pub fn comment(&self, out: &mut String, text: &str) {
        match self.format {
            Format::Css => {
                out.push_str("/* ");
                out.push_str(&text.replace("*/", "* /"));
                out.push_str(" */\n");
            }
            Format::Scss | Format::Js | Format::Tailwind => {
                out.push_str("// ");
                out.push_str(text);
                out.push('\n');
            }
        }
    }

    pub fn blank(&self, out: &mut String) {
        out.push('\n');
    }

    /// Opening wrapper. `export_name` is only used by the JS module syntax.
    pub fn open(&self, out: &mut String, export_name: &str) {
        match self.format {
            Format::Css => out.push_str(":root {\n"),
            Format::Scss => {}
            Format::Js => {
                out.push_str("export const ");
                out.push_str(export_name);
                out.push_str(" = {\n");
            }
            Format::Tailwind => {
                out.push_str("module.exports = {\n");
                out.push_str("  theme: {\n");
                out.push_str("    extend: {\n");
            }
        }
    }

    pub fn close(&self, out: &mut String, export_name: &str) {
        match self.format {
            Format::Css => out.push_str("}\n"),
            Format::Scss => {}
            Format::Js => {
                out.push_str("};\n\nexport default ");
                out.push_str(export_name);
                out.push_str(";\n");
            }
            Format::Tailwind => {
                out.push_str("    },\n");
                out.push_str("  },\n");
                out.push_str("};\n");
            }
        }
    }

    /// Tailwind theme section (`colors: {`); no-op for the other syntaxes.
    pub fn open_section(&self, out: &mut String, section: &str) {
        if self.format == Format::Tailwind {
            out.push_str("      ");
            out.push_str(section);
            out.push_str(": {\n");
        }
    }

    pub fn close_section(&self, out: &mut String) {
        if self.format == Format::Tailwind {
            out.push_str("      },\n");
        }
    }

    /// Comment line inside the Tailwind `extend` block.
    pub fn section_comment(&self, out: &mut String, text: &str) {
        if self.format == Format::Tailwind {
            out.push_str("      // ");
            out.push_str(text);
            out.push('\n');
        }
    }

    /// One token declaration.
    pub fn declare(&self, out: &mut String, name: &str, value: &str) {
        let key = self.format.key(name);
        match self.format {
            Format::Css => {
                out.push_str("  --");
                out.push_str(&key);
                out.push_str(": ");
                out.push_str(value);
                out.push_str(";\n");
            }
            Format::Scss => {
                out.push('$');
                out.push_str(&key);
                out.push_str(": ");
                out.push_str(value);
                out.push_str(";\n");
            }
            Format::Js => {
                out.push_str("  ");
                out.push_str(&key);
                out.push_str(": ");
                out.push_str(&quote_js_single(value));
                out.push_str(",\n");
            }
            Format::Tailwind => {
                out.push_str("        ");
                out.push_str(&quote_js_single(&key));
                out.push_str(": ");
                out.push_str(&quote_js_single(value));
                out.push_str(",\n");
            }
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// -------------------- quoting helpers --------------------

pub fn quote_js_single(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}
