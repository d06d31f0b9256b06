//! JSX lowering: markup expressions become nested factory calls.
//!
//! A `<` in expression position opens a real recursive-descent parse of the
//! element (attributes, spreads, children, fragments); everything else is
//! copied through untouched. The parse is strict on purpose: an unterminated
//! or mismatched tag is a structured failure with a line number, never a
//! best-effort emit, because half-lowered markup would otherwise reach the
//! engine and produce a baffling runtime error instead.

use super::scanner::{is_expr_keyword, is_ident_char, is_ident_start, Cursor};
use super::{TranspileError, FACTORY, FRAGMENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    None,
    Value,
    Punct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Eof,
    /// Stop (without consuming) at a `}` at curly depth zero.
    Brace,
}

pub(crate) fn lower(src: &str) -> Result<String, TranspileError> {
    let mut cur = Cursor::new(src);
    let mut out = String::new();
    transform(&mut cur, &mut out, Stop::Eof)?;
    Ok(out)
}

/// Copy JavaScript through, lowering JSX wherever it appears in expression
/// position.
fn transform(cur: &mut Cursor, out: &mut String, stop: Stop) -> Result<(), TranspileError> {
    let mut prev = Prev::None;
    let mut brace_depth = 0usize;

    while let Some(c) = cur.peek() {
        if c.is_whitespace() {
            out.push(c);
            cur.bump();
            continue;
        }
        match c {
            '"' | '\'' => {
                cur.copy_string(out)?;
                prev = Prev::Value;
            }
            '`' => {
                cur.copy_template(out)?;
                prev = Prev::Value;
            }
            '/' if matches!(cur.peek_at(1), Some('/') | Some('*')) => {
                cur.copy_comment(out)?;
            }
            '/' if prev != Prev::Value => {
                cur.copy_regex(out)?;
                prev = Prev::Value;
            }
            '<' if prev != Prev::Value
                && (cur.peek_at(1).map(is_ident_start).unwrap_or(false)
                    || cur.peek_at(1) == Some('>')) =>
            {
                let lowered = parse_element(cur)?;
                out.push_str(&lowered);
                prev = Prev::Value;
            }
            '{' => {
                brace_depth += 1;
                out.push(c);
                cur.bump();
                prev = Prev::Punct;
            }
            '}' => {
                if stop == Stop::Brace && brace_depth == 0 {
                    return Ok(());
                }
                brace_depth = brace_depth.saturating_sub(1);
                out.push(c);
                cur.bump();
                prev = Prev::Punct;
            }
            _ if is_ident_start(c) => {
                let word = cur.read_ident();
                out.push_str(&word);
                prev = if is_expr_keyword(&word) {
                    Prev::Punct
                } else {
                    Prev::Value
                };
            }
            _ if c.is_ascii_digit() => {
                while cur
                    .peek()
                    .map(|c| is_ident_char(c) || c == '.')
                    .unwrap_or(false)
                {
                    out.push(cur.bump().expect("checked digit"));
                }
                prev = Prev::Value;
            }
            _ => {
                out.push(c);
                cur.bump();
                prev = match c {
                    ')' | ']' => Prev::Value,
                    _ => Prev::Punct,
                };
            }
        }
    }

    match stop {
        Stop::Eof => Ok(()),
        Stop::Brace => Err(cur.error("unterminated JSX expression")),
    }
}

/// Parse one JSX element or fragment (cursor on `<`) and return the
/// lowered factory call.
fn parse_element(cur: &mut Cursor) -> Result<String, TranspileError> {
    let open_line = cur.line();
    cur.bump(); // '<'

    // Fragment: <>...</>
    if cur.peek() == Some('>') {
        cur.bump();
        let children = parse_children(cur, None, open_line)?;
        return Ok(emit_call(FRAGMENT, "null", &children));
    }

    let tag = read_tag_name(cur)?;
    let tag_expr = tag_expression(&tag);
    let mut props: Vec<String> = Vec::new();

    loop {
        cur.skip_ws();
        match cur.peek() {
            None => {
                return Err(unterminated(&tag, open_line));
            }
            Some('/') if cur.peek_at(1) == Some('>') => {
                cur.eat_str("/>");
                return Ok(emit_call(&tag_expr, &props_expression(&props), &[]));
            }
            Some('>') => {
                cur.bump();
                let children = parse_children(cur, Some(&tag), open_line)?;
                return Ok(emit_call(&tag_expr, &props_expression(&props), &children));
            }
            Some('{') => {
                cur.bump();
                cur.skip_ws();
                if !cur.eat_str("...") {
                    return Err(cur.error("expected '...' in JSX spread attribute"));
                }
                let expr = braced_expression(cur)?;
                if expr.is_empty() {
                    return Err(cur.error("empty JSX spread attribute"));
                }
                props.push(format!("...{}", expr));
            }
            Some(c) if is_ident_start(c) => {
                let name = read_attr_name(cur);
                cur.skip_ws();
                let value = if cur.peek() == Some('=') {
                    cur.bump();
                    cur.skip_ws();
                    match cur.peek() {
                        Some('"') | Some('\'') => {
                            let mut literal = String::new();
                            cur.copy_string(&mut literal)?;
                            literal
                        }
                        Some('{') => {
                            cur.bump();
                            let expr = braced_expression(cur)?;
                            if expr.is_empty() {
                                return Err(cur.error("empty JSX attribute expression"));
                            }
                            expr
                        }
                        _ => return Err(cur.error("expected JSX attribute value")),
                    }
                } else {
                    "true".to_string()
                };
                props.push(format!("{}: {}", prop_key(&name), value));
            }
            Some(other) => {
                return Err(cur.error(format!("unexpected '{}' in JSX tag <{}>", other, tag)));
            }
        }
    }
}

/// Parse children up to the matching close tag. `expected` is `None` for
/// fragments.
fn parse_children(
    cur: &mut Cursor,
    expected: Option<&str>,
    open_line: usize,
) -> Result<Vec<String>, TranspileError> {
    let mut children = Vec::new();
    loop {
        match cur.peek() {
            None => {
                return Err(unterminated(expected.unwrap_or(""), open_line));
            }
            Some('<') if cur.peek_at(1) == Some('/') => {
                cur.eat_str("</");
                cur.skip_ws();
                let close = if cur.peek() == Some('>') {
                    String::new()
                } else {
                    read_tag_name(cur)?
                };
                cur.skip_ws();
                if !cur.eat_str(">") {
                    return Err(cur.error(format!("malformed closing tag </{}", close)));
                }
                let open_name = expected.unwrap_or("");
                if close != open_name {
                    return Err(TranspileError {
                        message: format!(
                            "mismatched JSX closing tag: expected </{}>, found </{}>",
                            open_name, close
                        ),
                        line: cur.line(),
                    });
                }
                return Ok(children);
            }
            Some('<') => {
                if !(cur.peek_at(1).map(is_ident_start).unwrap_or(false)
                    || cur.peek_at(1) == Some('>'))
                {
                    return Err(cur.error("invalid JSX tag name"));
                }
                children.push(parse_element(cur)?);
            }
            Some('{') => {
                cur.bump();
                let expr = braced_expression(cur)?;
                if !expr.is_empty() {
                    children.push(expr);
                }
            }
            Some(_) => {
                let mut raw = String::new();
                while let Some(c) = cur.peek() {
                    if c == '<' || c == '{' {
                        break;
                    }
                    raw.push(c);
                    cur.bump();
                }
                if let Some(literal) = text_literal(&raw) {
                    children.push(literal);
                }
            }
        }
    }
}

/// Transform a `{...}` expression body (opening brace already consumed) and
/// consume the closing brace. Comments-only bodies come back empty.
fn braced_expression(cur: &mut Cursor) -> Result<String, TranspileError> {
    let mut buf = String::new();
    transform(cur, &mut buf, Stop::Brace)?;
    if !cur.eat_str("}") {
        return Err(cur.error("unterminated JSX expression"));
    }
    let body = buf.trim();
    if comments_only(body) {
        return Ok(String::new());
    }
    Ok(body.to_string())
}

/// True when the text is nothing but whitespace and comments. Comments in
/// the input are already well-formed here; `transform` copied them whole.
fn comments_only(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
        } else if chars[i] == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                i += 1;
            }
            i = (i + 2).min(chars.len());
        } else {
            return false;
        }
    }
    true
}

fn read_tag_name(cur: &mut Cursor) -> Result<String, TranspileError> {
    if !cur.peek().map(is_ident_start).unwrap_or(false) {
        return Err(cur.error("invalid JSX tag name"));
    }
    let mut name = String::new();
    while let Some(c) = cur.peek() {
        if is_ident_char(c) || c == '.' || c == '-' || c == ':' {
            name.push(c);
            cur.bump();
        } else {
            break;
        }
    }
    Ok(name)
}

fn read_attr_name(cur: &mut Cursor) -> String {
    let mut name = String::new();
    while let Some(c) = cur.peek() {
        if is_ident_char(c) || c == '-' || c == ':' {
            name.push(c);
            cur.bump();
        } else {
            break;
        }
    }
    name
}

/// Lowercase and hyphenated tags are intrinsic elements (string literals);
/// capitalized and dotted tags are component references.
fn tag_expression(tag: &str) -> String {
    let intrinsic = tag
        .chars()
        .next()
        .map(|c| c.is_ascii_lowercase())
        .unwrap_or(true)
        && !tag.contains('.');
    if intrinsic {
        format!("\"{}\"", tag)
    } else {
        tag.to_string()
    }
}

fn prop_key(name: &str) -> String {
    if name.contains('-') || name.contains(':') {
        format!("\"{}\"", name)
    } else {
        name.to_string()
    }
}

fn props_expression(props: &[String]) -> String {
    if props.is_empty() {
        "null".to_string()
    } else {
        format!("{{{}}}", props.join(", "))
    }
}

fn emit_call(tag_expr: &str, props_expr: &str, children: &[String]) -> String {
    let mut args = vec![tag_expr.to_string(), props_expr.to_string()];
    args.extend(children.iter().cloned());
    format!("{}({})", FACTORY, args.join(", "))
}

fn unterminated(tag: &str, line: usize) -> TranspileError {
    let what = if tag.is_empty() {
        "unterminated JSX fragment".to_string()
    } else {
        format!("unterminated JSX element <{}>", tag)
    };
    TranspileError {
        message: what,
        line,
    }
}

/// Convert raw JSX text into a JS string literal, applying JSX whitespace
/// rules: edge whitespace containing a newline is dropped, interior runs
/// containing a newline collapse to a single space. Returns `None` when
/// nothing renderable remains.
fn text_literal(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        if raw.contains('\n') || raw.is_empty() {
            return None;
        }
        return Some(quote_js_string(raw));
    }

    let mut text = raw;
    let leading_ws: String = text.chars().take_while(|c| c.is_whitespace()).collect();
    if leading_ws.contains('\n') {
        text = text.trim_start();
    }
    let trailing_ws: String = text
        .chars()
        .rev()
        .take_while(|c| c.is_whitespace())
        .collect();
    if trailing_ws.contains('\n') {
        text = text.trim_end();
    }

    let mut collapsed = String::new();
    let mut run = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            run.push(c);
        } else {
            if !run.is_empty() {
                collapsed.push_str(if run.contains('\n') { " " } else { &run });
                run.clear();
            }
            collapsed.push(c);
        }
    }
    if !run.is_empty() {
        collapsed.push_str(if run.contains('\n') { " " } else { &run });
    }

    Some(quote_js_string(&collapsed))
}

fn quote_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
