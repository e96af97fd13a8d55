//! Text emission
//! Indentation, braces and blank line handling for generated source


/// Where generated code goes. The compiler only ever uses these primitives.
pub trait CodeSink {
    /// Append text to the current line, starting (and indenting) a new one if needed
    fn append(&mut self, text: &str);

    /// Append a whole line. An empty string writes a blank line.
    fn append_line(&mut self, line: &str);

    /// Append multi-line text, removing its common indentation
    fn append_lines(&mut self, text: &str);

    /// Append text then end the current line
    fn finish_line(&mut self, text: &str);

    /// Open a `{` block, on the current line if one is in progress
    fn start_code_block(&mut self);

    /// Close the innermost block, writing `}` followed by `trailing`
    fn finish_code_block(&mut self, trailing: &str);

    /// Ask for a blank line before whatever is written next.
    /// Ignored if nothing follows in the same block or a blank line was just written.
    fn request_new_line_before_more_code(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeStyle {
    pub indent: String,
    pub newline: String,
}

impl Default for CodeStyle {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            newline: "\n".to_string(),
        }
    }
}

/// In-memory [`CodeSink`]
#[derive(Debug, Clone, Default)]
pub struct OutputFile {
    style: CodeStyle,
    text: String,
    indent_level: usize,
    line_started: bool,
    blank_line_requested: bool,
}

impl OutputFile {
    pub fn new(style: CodeStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    fn ends_with_blank_line(&self) -> bool {
        let nl = &self.style.newline;
        self.text.is_empty() || self.text.ends_with(&format!("{nl}{nl}"))
    }

    fn flush_blank_line_request(&mut self) {
        if self.blank_line_requested {
            self.blank_line_requested = false;
            if !self.ends_with_blank_line() {
                self.text.push_str(&self.style.newline);
            }
        }
    }

    fn end_line(&mut self) {
        self.text.push_str(&self.style.newline);
        self.line_started = false;
    }
}

impl CodeSink for OutputFile {
    fn append(&mut self, text: &str) {
        if !self.line_started {
            self.flush_blank_line_request();
            for _ in 0..self.indent_level {
                self.text.push_str(&self.style.indent);
            }
            self.line_started = true;
        }
        self.text.push_str(text);
    }

    fn append_line(&mut self, line: &str) {
        if line.is_empty() && !self.line_started {
            self.blank_line_requested = false;
            self.end_line();
            return;
        }
        self.append(line);
        self.end_line();
    }

    fn append_lines(&mut self, text: &str) {
        let lines: Vec<&str> = text.trim_matches(|c| c == '\n' || c == '\r').lines().collect();
        let common_indent = lines
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.len() - l.trim_start().len())
            .min()
            .unwrap_or(0);

        for line in lines {
            if line.trim().is_empty() {
                self.append_line("");
            } else {
                self.append_line(line[common_indent..].trim_end());
            }
        }
    }

    fn finish_line(&mut self, text: &str) {
        if !text.is_empty() {
            self.append(text);
        }
        if self.line_started {
            self.end_line();
        }
    }

    fn start_code_block(&mut self) {
        if self.line_started {
            self.text.push_str(" {");
            self.end_line();
        } else {
            self.append_line("{");
        }
        self.indent_level += 1;
        self.blank_line_requested = false;
    }

    fn finish_code_block(&mut self, trailing: &str) {
        if self.line_started {
            self.end_line();
        }
        self.indent_level = self.indent_level.saturating_sub(1);
        self.blank_line_requested = false;
        self.append("}");
        self.append(trailing);
        self.end_line();
    }

    fn request_new_line_before_more_code(&mut self) {
        self.blank_line_requested = true;
    }
}
