//! Indentation-aware text builder shared by every emitter.

/// First line of every emitted source file.
pub const GENERATED_HEADER: &str = "// @generated by schemagen";

const INDENT: &str = "    ";

/// Builds emitted source text line by line.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    indent: usize,
}

impl CodeWriter {
    /// Empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer that already holds the `@generated` header and a blank line.
    pub fn generated() -> Self {
        let mut writer = Self::new();
        writer.line(GENERATED_HEADER);
        writer.blank();
        writer
    }

    /// Write `text` at the current indentation. Embedded newlines start new
    /// indented lines.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        for line in text.as_ref().split('\n') {
            if !line.is_empty() {
                for _ in 0..self.indent {
                    self.out.push_str(INDENT);
                }
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
        self
    }

    /// Write an empty line.
    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    /// Write `text` and indent what follows.
    pub fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.indent += 1;
        self
    }

    /// Dedent and write `text`.
    pub fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self.line(text)
    }

    /// Write `text` as `///` doc comment lines.
    pub fn doc(&mut self, text: &str) -> &mut Self {
        for line in text.trim().lines() {
            // A fence would turn the description into a doctest.
            let line = line.trim_end().replace("```", "'''");
            if line.is_empty() {
                self.line("///");
            } else {
                self.line(format!("/// {line}"));
            }
        }
        self
    }

    /// The finished text.
    pub fn into_string(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_blocks_are_indented() {
        let mut w = CodeWriter::generated();
        w.open("pub struct A {");
        w.line("pub b: i64,");
        w.close("}");
        assert_eq!(
            w.into_string(),
            "// @generated by schemagen\n\npub struct A {\n    pub b: i64,\n}\n"
        );
    }

    #[test]
    fn doc_lines_are_prefixed() {
        let mut w = CodeWriter::new();
        w.doc("First line.\n\n```json\n{}\n```");
        assert_eq!(
            w.into_string(),
            "/// First line.\n///\n/// '''json\n/// {}\n/// '''\n"
        );
    }

    #[test]
    fn multi_line_text_keeps_indentation() {
        let mut w = CodeWriter::new();
        w.open("mod a {");
        w.line("#[path = \"x.rs\"]\npub mod x;");
        w.close("}");
        assert_eq!(
            w.into_string(),
            "mod a {\n    #[path = \"x.rs\"]\n    pub mod x;\n}\n"
        );
    }
}
