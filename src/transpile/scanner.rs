//! Char-level scanner shared by the type-erasure and JSX passes.
//!
//! The scanner knows just enough JavaScript lexical structure to move over
//! strings, template literals, comments, and regex literals without being
//! fooled by their contents. It is not a tokenizer; both passes drive it
//! directly and copy text through as they go.

use super::TranspileError;

/// Cursor over source text with line tracking.
pub(crate) struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

/// Saved cursor position for lookahead.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mark {
    pos: usize,
    line: usize,
}

impl Cursor {
    pub fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if let Some(c) = c {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
            }
        }
        c
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
    }

    /// Text between two marks.
    pub fn slice(&self, from: Mark, to: Mark) -> String {
        self.chars[from.pos..to.pos].iter().collect()
    }

    pub fn error(&self, message: impl Into<String>) -> TranspileError {
        TranspileError {
            message: message.into(),
            line: self.line,
        }
    }

    /// Check whether the upcoming text starts with `s` (no whitespace skip).
    pub fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Consume `s` if it is next; returns whether it was consumed.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            for _ in s.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    /// Skip whitespace without copying it anywhere.
    pub fn skip_ws(&mut self) {
        while self.peek().map(|c| c.is_whitespace()).unwrap_or(false) {
            self.bump();
        }
    }

    /// Copy whitespace into `out`.
    pub fn copy_ws(&mut self, out: &mut String) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            out.push(c);
            self.bump();
        }
    }

    /// Read an identifier starting at the cursor. Caller checks ident-start.
    pub fn read_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }
        ident
    }

    /// Copy a string literal (cursor on the opening quote) into `out`.
    pub fn copy_string(&mut self, out: &mut String) -> Result<(), TranspileError> {
        let quote = self.bump().expect("caller checked quote");
        out.push(quote);
        while let Some(c) = self.bump() {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = self.bump() {
                    out.push(escaped);
                }
                continue;
            }
            if c == quote {
                return Ok(());
            }
        }
        Err(self.error("unterminated string literal"))
    }

    /// Skip a string literal without copying.
    pub fn skip_string(&mut self) -> Result<(), TranspileError> {
        let mut sink = String::new();
        self.copy_string(&mut sink)
    }

    /// Copy a template literal (cursor on the backtick) into `out`.
    ///
    /// Interpolation bodies are copied verbatim; JSX or annotations inside
    /// `${...}` are left alone, which is the documented limit of the pass.
    pub fn copy_template(&mut self, out: &mut String) -> Result<(), TranspileError> {
        let tick = self.bump().expect("caller checked backtick");
        out.push(tick);
        while let Some(c) = self.bump() {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = self.bump() {
                        out.push(escaped);
                    }
                }
                '`' => return Ok(()),
                '$' if self.peek() == Some('{') => {
                    out.push(self.bump().expect("checked brace"));
                    self.copy_balanced_braces(out)?;
                }
                _ => {}
            }
        }
        Err(self.error("unterminated template literal"))
    }

    /// Copy up to and including the `}` matching an already-consumed `{`.
    fn copy_balanced_braces(&mut self, out: &mut String) -> Result<(), TranspileError> {
        let mut depth = 1usize;
        while let Some(c) = self.peek() {
            match c {
                '"' | '\'' => {
                    self.copy_string(out)?;
                    continue;
                }
                '`' => {
                    self.copy_template(out)?;
                    continue;
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        out.push(c);
                        self.bump();
                        return Ok(());
                    }
                }
                _ => {}
            }
            out.push(c);
            self.bump();
        }
        Err(self.error("unterminated template interpolation"))
    }

    /// Copy a `//` or `/*` comment (cursor on the first `/`) into `out`.
    /// Caller has confirmed the second char.
    pub fn copy_comment(&mut self, out: &mut String) -> Result<(), TranspileError> {
        out.push(self.bump().expect("caller checked slash"));
        match self.peek() {
            Some('/') => {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    out.push(c);
                    self.bump();
                }
                Ok(())
            }
            Some('*') => {
                out.push(self.bump().expect("checked star"));
                while let Some(c) = self.bump() {
                    out.push(c);
                    if c == '*' && self.peek() == Some('/') {
                        out.push(self.bump().expect("checked slash"));
                        return Ok(());
                    }
                }
                Err(self.error("unterminated block comment"))
            }
            _ => Ok(()),
        }
    }

    /// Copy a regex literal (cursor on the `/`, already known to be in value
    /// position) into `out`.
    pub fn copy_regex(&mut self, out: &mut String) -> Result<(), TranspileError> {
        out.push(self.bump().expect("caller checked slash"));
        let mut in_class = false;
        while let Some(c) = self.bump() {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = self.bump() {
                        out.push(escaped);
                    }
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    // Trailing flags.
                    while self.peek().map(is_ident_char).unwrap_or(false) {
                        out.push(self.bump().expect("checked flag"));
                    }
                    return Ok(());
                }
                '\n' => return Err(self.error("unterminated regex literal")),
                _ => {}
            }
        }
        Err(self.error("unterminated regex literal"))
    }

    /// Skip a balanced bracket pair, string/comment aware. Cursor is on the
    /// opening bracket.
    pub fn skip_balanced(&mut self, open: char, close: char) -> Result<(), TranspileError> {
        let start_line = self.line;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            if c == '"' || c == '\'' {
                self.skip_string()?;
                continue;
            }
            if c == '`' {
                let mut sink = String::new();
                self.copy_template(&mut sink)?;
                continue;
            }
            if c == '/' && (self.peek_at(1) == Some('/') || self.peek_at(1) == Some('*')) {
                let mut sink = String::new();
                self.copy_comment(&mut sink)?;
                continue;
            }
            self.bump();
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(TranspileError {
            message: format!("unbalanced '{}'", open),
            line: start_line,
        })
    }
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Keywords after which a `<` or `/` begins an expression, not an operator.
pub(crate) fn is_expr_keyword(word: &str) -> bool {
    matches!(
        word,
        "return"
            | "typeof"
            | "case"
            | "in"
            | "of"
            | "new"
            | "delete"
            | "void"
            | "instanceof"
            | "do"
            | "else"
            | "yield"
            | "await"
            | "throw"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_string_handles_escapes() {
        let mut cur = Cursor::new(r#""a\"b" rest"#);
        let mut out = String::new();
        cur.copy_string(&mut out).unwrap();
        assert_eq!(out, r#""a\"b""#);
        assert_eq!(cur.peek(), Some(' '));
    }

    #[test]
    fn test_unterminated_string_errors() {
        let mut cur = Cursor::new("\"oops");
        let mut out = String::new();
        assert!(cur.copy_string(&mut out).is_err());
    }

    #[test]
    fn test_template_with_interpolation() {
        let mut cur = Cursor::new("`a ${f({b: 1})} c`!");
        let mut out = String::new();
        cur.copy_template(&mut out).unwrap();
        assert_eq!(out, "`a ${f({b: 1})} c`");
        assert_eq!(cur.peek(), Some('!'));
    }

    #[test]
    fn test_line_tracking() {
        let mut cur = Cursor::new("a\nb\nc");
        while cur.bump().is_some() {}
        assert_eq!(cur.line(), 3);
    }

    #[test]
    fn test_skip_balanced_ignores_brackets_in_strings() {
        let mut cur = Cursor::new("(a, \")\", b)x");
        cur.skip_balanced('(', ')').unwrap();
        assert_eq!(cur.peek(), Some('x'));
    }

    #[test]
    fn test_copy_regex() {
        let mut cur = Cursor::new("/[/]+/gi;");
        let mut out = String::new();
        cur.copy_regex(&mut out).unwrap();
        assert_eq!(out, "/[/]+/gi");
        assert_eq!(cur.peek(), Some(';'));
    }
}
