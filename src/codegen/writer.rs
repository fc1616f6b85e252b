// src/codegen/writer.rs

//! Line-oriented Go source writer
//!
//! Generated files are built line by line; indentation is tracked from
//! brace and parenthesis structure so callers emit logical lines only.

/// Accumulates generated Go source text
#[derive(Debug, Default)]
pub struct GoWriter {
    buf: String,
    indent: usize,
}

impl GoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one logical line at the current indentation
    pub fn p(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if line.is_empty() {
            self.buf.push('\n');
            return;
        }
        if line.starts_with('}') || line.starts_with(')') {
            self.indent = self.indent.saturating_sub(1);
        }
        for _ in 0..self.indent {
            self.buf.push('\t');
        }
        self.buf.push_str(line);
        self.buf.push('\n');
        if line.ends_with('{') || line.ends_with('(') {
            self.indent += 1;
        }
    }

    /// Emit a blank separator line
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_follows_braces() {
        let mut w = GoWriter::new();
        w.p("func f() {");
        w.p("if ok {");
        w.p("return");
        w.p("}");
        w.p("}");
        assert_eq!(w.finish(), "func f() {\n\tif ok {\n\t\treturn\n\t}\n}\n");
    }

    #[test]
    fn test_paren_blocks() {
        let mut w = GoWriter::new();
        w.p("import (");
        w.p("\"context\"");
        w.p(")");
        assert_eq!(w.finish(), "import (\n\t\"context\"\n)\n");
    }
}
