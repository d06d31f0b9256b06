//! Type-annotation erasure.
//!
//! A deliberately shallow pass: it recognizes the annotation positions that
//! show up in real snippets (parameter lists, variable declarations, return
//! types, `interface`/`type` statements, `as` casts, generic call arguments,
//! postfix `!`) and erases them. It does not attempt to be a TypeScript
//! parser; anything it cannot place it copies through untouched, and the
//! engine reports whatever is genuinely malformed at run time.

use super::scanner::{is_expr_keyword, is_ident_char, is_ident_start, Cursor};
use super::TranspileError;

/// Token class of the last significant thing emitted; decides whether `<`,
/// `as`, and `!` are operators or annotation syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    None,
    Value,
    Punct,
}

/// Identifiers that look like a method head but are control flow.
fn is_control_keyword(word: &str) -> bool {
    matches!(
        word,
        "if" | "for" | "while" | "switch" | "catch" | "return" | "do" | "else" | "with"
    )
}

pub(crate) fn strip_types(source: &str) -> Result<String, TranspileError> {
    let mut cur = Cursor::new(source);
    let mut out = String::new();
    let mut prev = Prev::None;
    let mut last_word: Option<String> = None;
    let mut at_statement_start = true;

    while let Some(c) = cur.peek() {
        if c.is_whitespace() {
            if c == '\n' {
                at_statement_start = true;
            }
            out.push(c);
            cur.bump();
            continue;
        }
        if c == '"' || c == '\'' {
            cur.copy_string(&mut out)?;
            prev = Prev::Value;
            last_word = None;
            at_statement_start = false;
            continue;
        }
        if c == '`' {
            cur.copy_template(&mut out)?;
            prev = Prev::Value;
            last_word = None;
            at_statement_start = false;
            continue;
        }
        if c == '/' {
            match cur.peek_at(1) {
                Some('/') | Some('*') => {
                    cur.copy_comment(&mut out)?;
                    continue;
                }
                _ if prev != Prev::Value => {
                    cur.copy_regex(&mut out)?;
                    prev = Prev::Value;
                    last_word = None;
                    continue;
                }
                _ => {}
            }
        }
        if c.is_ascii_digit() {
            while cur.peek().map(|c| is_ident_char(c) || c == '.').unwrap_or(false) {
                out.push(cur.bump().expect("checked digit"));
            }
            prev = Prev::Value;
            last_word = None;
            at_statement_start = false;
            continue;
        }

        if is_ident_start(c) {
            let word = cur.read_ident();
            match word.as_str() {
                "interface" if at_statement_start => {
                    skip_interface(&mut cur)?;
                    at_statement_start = true;
                    continue;
                }
                "type" if at_statement_start && is_type_alias(&mut cur) => {
                    skip_type_alias(&mut cur)?;
                    at_statement_start = true;
                    continue;
                }
                "export" if at_statement_start => {
                    // `export interface` / `export type X =` vanish wholesale;
                    // other exports keep the keyword.
                    let save = cur.mark();
                    cur.skip_ws();
                    if cur.eat_str("interface")
                        && !cur.peek().map(is_ident_char).unwrap_or(false)
                    {
                        skip_interface(&mut cur)?;
                        at_statement_start = true;
                        continue;
                    }
                    cur.reset(save);
                    cur.skip_ws();
                    if cur.eat_str("type")
                        && !cur.peek().map(is_ident_char).unwrap_or(false)
                        && is_type_alias(&mut cur)
                    {
                        skip_type_alias(&mut cur)?;
                        at_statement_start = true;
                        continue;
                    }
                    cur.reset(save);
                    out.push_str("export");
                    prev = Prev::Punct;
                    last_word = None;
                    continue;
                }
                "as" if prev == Prev::Value => {
                    skip_as_cast(&mut cur)?;
                    continue;
                }
                "function" => {
                    out.push_str("function");
                    emit_function_head(&mut cur, &mut out)?;
                    prev = Prev::Punct;
                    last_word = None;
                    at_statement_start = false;
                    continue;
                }
                "const" | "let" | "var" => {
                    out.push_str(&word);
                    emit_declaration_head(&mut cur, &mut out)?;
                    prev = Prev::Punct;
                    last_word = None;
                    at_statement_start = false;
                    continue;
                }
                _ => {
                    // Generic call arguments: `ident<...>(` loses the `<...>`.
                    if cur.peek() == Some('<') && skip_generic_call_args(&mut cur) {
                        out.push_str(&word);
                        prev = Prev::Value;
                        last_word = None;
                        at_statement_start = false;
                        continue;
                    }
                    out.push_str(&word);
                    prev = if is_expr_keyword(&word) {
                        Prev::Punct
                    } else {
                        Prev::Value
                    };
                    last_word = Some(word);
                    at_statement_start = false;
                    continue;
                }
            }
        }

        // Parameter lists get annotation stripping; ordinary parens copy
        // through. A paren group is a parameter list when it is followed by
        // `=>` (arrow) or when it reads as a method head (`name(...) {`).
        if c == '(' {
            let method_head_ok = prev == Prev::Value
                && last_word
                    .as_deref()
                    .map(|w| !is_control_keyword(w) && !is_expr_keyword(w))
                    .unwrap_or(false);
            if is_param_list(&mut cur, method_head_ok) {
                emit_param_list(&mut cur, &mut out)?;
                emit_return_annotation(&mut cur, &mut out)?;
                prev = Prev::Punct;
                last_word = None;
                at_statement_start = false;
                continue;
            }
        }

        // Postfix non-null assertion.
        if c == '!'
            && prev == Prev::Value
            && matches!(
                cur.peek_at(1),
                Some('.') | Some(')') | Some(']') | Some(';') | Some(',')
            )
        {
            cur.bump();
            continue;
        }

        cur.bump();
        out.push(c);
        prev = match c {
            ')' | ']' => Prev::Value,
            _ => Prev::Punct,
        };
        last_word = None;
        at_statement_start = matches!(c, ';' | '{' | '}');
    }

    Ok(out)
}

/// Skip `interface Name extends ... { ... }` (keyword already consumed).
fn skip_interface(cur: &mut Cursor) -> Result<(), TranspileError> {
    while let Some(c) = cur.peek() {
        if c == '{' {
            return cur.skip_balanced('{', '}');
        }
        cur.bump();
        if c == ';' {
            return Ok(());
        }
    }
    Ok(())
}

/// Lookahead after the `type` keyword: is this a type alias statement
/// (`type Name = ...`) or just an identifier named "type"?
fn is_type_alias(cur: &mut Cursor) -> bool {
    let save = cur.mark();
    cur.skip_ws();
    let mut looks = false;
    if cur.peek().map(is_ident_start).unwrap_or(false) {
        cur.read_ident();
        cur.skip_ws();
        let generics_ok = if cur.peek() == Some('<') {
            cur.skip_balanced('<', '>').is_ok()
        } else {
            true
        };
        if generics_ok {
            cur.skip_ws();
            looks = cur.peek() == Some('=') && cur.peek_at(1) != Some('=');
        }
    }
    cur.reset(save);
    looks
}

/// Skip a `type Name = ...;` statement (keyword already consumed). The body
/// runs to the first `;` or newline at bracket depth zero.
fn skip_type_alias(cur: &mut Cursor) -> Result<(), TranspileError> {
    while let Some(c) = cur.peek() {
        match c {
            '{' => cur.skip_balanced('{', '}')?,
            '(' => cur.skip_balanced('(', ')')?,
            '<' => cur.skip_balanced('<', '>')?,
            '"' | '\'' => cur.skip_string()?,
            ';' => {
                cur.bump();
                return Ok(());
            }
            '\n' => return Ok(()),
            _ => {
                cur.bump();
            }
        }
    }
    Ok(())
}

/// Skip an `as` cast target: `as const`, `as Some.Type<...>[]`.
fn skip_as_cast(cur: &mut Cursor) -> Result<(), TranspileError> {
    cur.skip_ws();
    if !cur.peek().map(is_ident_start).unwrap_or(false) {
        return Ok(());
    }
    loop {
        cur.read_ident();
        if cur.peek() == Some('.') && cur.peek_at(1).map(is_ident_start).unwrap_or(false) {
            cur.bump();
            continue;
        }
        break;
    }
    if cur.peek() == Some('<') {
        cur.skip_balanced('<', '>')?;
    }
    while cur.starts_with("[]") {
        cur.eat_str("[]");
    }
    Ok(())
}

/// After `function`: copy optional name, drop generic parameters, rewrite
/// the parameter list, drop any return annotation.
fn emit_function_head(cur: &mut Cursor, out: &mut String) -> Result<(), TranspileError> {
    cur.copy_ws(out);
    if cur.peek() == Some('*') {
        out.push('*');
        cur.bump();
        cur.copy_ws(out);
    }
    if cur.peek().map(is_ident_start).unwrap_or(false) {
        out.push_str(&cur.read_ident());
        cur.copy_ws(out);
    }
    if cur.peek() == Some('<') {
        cur.skip_balanced('<', '>')?;
        cur.skip_ws();
    }
    if cur.peek() == Some('(') {
        emit_param_list(cur, out)?;
        emit_return_annotation(cur, out)?;
    }
    Ok(())
}

/// After `const`/`let`/`var`: copy the binding pattern and drop a `: Type`
/// annotation if one follows it.
fn emit_declaration_head(cur: &mut Cursor, out: &mut String) -> Result<(), TranspileError> {
    cur.copy_ws(out);
    match cur.peek() {
        Some('[') => copy_balanced(cur, out, '[', ']')?,
        Some('{') => copy_balanced(cur, out, '{', '}')?,
        Some(c) if is_ident_start(c) => out.push_str(&cur.read_ident()),
        _ => return Ok(()),
    }
    let save = cur.mark();
    cur.skip_ws();
    if cur.peek() == Some(':') {
        cur.bump();
        skip_type_expr(cur)?;
    } else {
        cur.reset(save);
    }
    Ok(())
}

/// Copy a balanced bracket pair verbatim (string-aware).
fn copy_balanced(
    cur: &mut Cursor,
    out: &mut String,
    open: char,
    close: char,
) -> Result<(), TranspileError> {
    let mut depth = 0usize;
    while let Some(c) = cur.peek() {
        match c {
            '"' | '\'' => {
                cur.copy_string(out)?;
                continue;
            }
            '`' => {
                cur.copy_template(out)?;
                continue;
            }
            _ => {}
        }
        out.push(c);
        cur.bump();
        if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Ok(());
            }
        }
    }
    Err(cur.error(format!("unbalanced '{}'", open)))
}

/// Lookahead from a `(`: does this paren group read as a parameter list?
fn is_param_list(cur: &mut Cursor, method_head_ok: bool) -> bool {
    let save = cur.mark();
    if cur.skip_balanced('(', ')').is_err() {
        cur.reset(save);
        return false;
    }
    cur.skip_ws();
    let verdict = if cur.starts_with("=>") {
        true
    } else if cur.peek() == Some(':') {
        // `(...): T =>` return-annotated arrow.
        cur.bump();
        skip_type_expr(cur).is_ok() && {
            cur.skip_ws();
            cur.starts_with("=>")
        }
    } else {
        cur.peek() == Some('{') && method_head_ok
    };
    cur.reset(save);
    verdict
}

/// Copy a parameter list, erasing `?` optional markers and `: Type`
/// annotations at the top level of the list. Once a default value (or a
/// ternary) starts, colons are plain syntax again until the next comma.
fn emit_param_list(cur: &mut Cursor, out: &mut String) -> Result<(), TranspileError> {
    out.push('(');
    cur.bump();
    let mut depth = 0usize;
    let mut in_value = false;
    while let Some(c) = cur.peek() {
        match c {
            '"' | '\'' => {
                cur.copy_string(out)?;
                continue;
            }
            '`' => {
                cur.copy_template(out)?;
                continue;
            }
            '/' if matches!(cur.peek_at(1), Some('/') | Some('*')) => {
                cur.copy_comment(out)?;
                continue;
            }
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if c == ')' && depth == 0 {
                    out.push(')');
                    cur.bump();
                    return Ok(());
                }
                depth = depth.saturating_sub(1);
            }
            ',' if depth == 0 => in_value = false,
            '=' if depth == 0 && cur.peek_at(1) != Some('>') => in_value = true,
            '?' if depth == 0 && !in_value => {
                // Optional parameter marker, not a ternary: `x?: T` / `x?,`.
                let save = cur.mark();
                cur.bump();
                cur.skip_ws();
                if matches!(cur.peek(), Some(':') | Some(',') | Some(')')) {
                    continue;
                }
                cur.reset(save);
                in_value = true;
            }
            ':' if depth == 0 && !in_value => {
                cur.bump();
                skip_type_expr(cur)?;
                continue;
            }
            _ => {}
        }
        out.push(c);
        cur.bump();
    }
    Err(cur.error("unbalanced '(' in parameter list"))
}

/// Drop a `: Type` return annotation after a parameter list, if present.
/// The whitespace that follows the annotation is still in the source and
/// gets copied by the caller, so nothing is emitted here.
fn emit_return_annotation(cur: &mut Cursor, _out: &mut String) -> Result<(), TranspileError> {
    let save = cur.mark();
    cur.skip_ws();
    if cur.peek() == Some(':') {
        cur.bump();
        skip_type_expr(cur)?;
    } else {
        cur.reset(save);
    }
    Ok(())
}

/// Skip exactly one type expression: identifier paths with generics,
/// parenthesized/function types, object and tuple literals, literal types,
/// unions and intersections, array suffixes.
fn skip_type_expr(cur: &mut Cursor) -> Result<(), TranspileError> {
    cur.skip_ws();
    match cur.peek() {
        Some('{') => cur.skip_balanced('{', '}')?,
        Some('[') => cur.skip_balanced('[', ']')?,
        Some('(') => {
            cur.skip_balanced('(', ')')?;
            let save = cur.mark();
            cur.skip_ws();
            if cur.eat_str("=>") {
                skip_type_expr(cur)?;
            } else {
                cur.reset(save);
            }
        }
        Some('"') | Some('\'') => cur.skip_string()?,
        Some(c) if c == '-' || c.is_ascii_digit() => {
            cur.bump();
            while cur
                .peek()
                .map(|c| c.is_ascii_digit() || c == '.')
                .unwrap_or(false)
            {
                cur.bump();
            }
        }
        Some(c) if is_ident_start(c) => {
            loop {
                cur.read_ident();
                if cur.peek() == Some('.') && cur.peek_at(1).map(is_ident_start).unwrap_or(false) {
                    cur.bump();
                    continue;
                }
                break;
            }
            if cur.peek() == Some('<') {
                cur.skip_balanced('<', '>')?;
            }
        }
        _ => return Ok(()),
    }
    // Postfix pieces: arrays, unions, intersections.
    loop {
        let save = cur.mark();
        cur.skip_ws();
        if cur.starts_with("[]") {
            cur.eat_str("[]");
            continue;
        }
        if (cur.peek() == Some('|') && cur.peek_at(1) != Some('|'))
            || (cur.peek() == Some('&') && cur.peek_at(1) != Some('&'))
        {
            cur.bump();
            skip_type_expr(cur)?;
            continue;
        }
        cur.reset(save);
        break;
    }
    Ok(())
}

/// Attempt to consume `<...>` as generic call arguments; true only when the
/// span is followed by `(` and looks type-like (no arithmetic, no logical
/// operators), so comparisons are never eaten.
fn skip_generic_call_args(cur: &mut Cursor) -> bool {
    let save = cur.mark();
    if cur.skip_balanced('<', '>').is_err() {
        cur.reset(save);
        return false;
    }
    let end = cur.mark();
    if cur.peek() != Some('(') {
        cur.reset(save);
        return false;
    }
    let span = cur.slice(save, end);
    let mut chars = span.chars().peekable();
    while let Some(c) = chars.next() {
        let type_like = match c {
            '+' | '-' | '*' | '/' | '!' | '=' | ';' | '%' | '?' => false,
            '&' => chars.peek() != Some(&'&'),
            '|' => chars.peek() != Some(&'|'),
            _ => true,
        };
        if !type_like {
            cur.reset(save);
            return false;
        }
    }
    cur.reset(end);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(src: &str) -> String {
        strip_types(src).unwrap()
    }

    #[test]
    fn test_param_annotations() {
        assert_eq!(
            strip("function add(a: number, b: number) { return a + b }"),
            "function add(a, b) { return a + b }"
        );
    }

    #[test]
    fn test_return_annotation() {
        assert_eq!(
            strip("function f(): string { return \"x\" }"),
            "function f() { return \"x\" }"
        );
    }

    #[test]
    fn test_arrow_annotations() {
        assert_eq!(
            strip("const f = (x: number): number => x * 2;"),
            "const f = (x) => x * 2;"
        );
    }

    #[test]
    fn test_optional_param() {
        assert_eq!(strip("function f(x?: string) {}"), "function f(x) {}");
    }

    #[test]
    fn test_variable_annotation() {
        assert_eq!(strip("const n: number = 1;"), "const n = 1;");
        assert_eq!(strip("let items: string[] = [];"), "let items = [];");
    }

    #[test]
    fn test_interface_removed() {
        let out = strip("interface Props { label: string }\nconst a = 1;");
        assert!(!out.contains("Props"));
        assert!(out.contains("const a = 1;"));
    }

    #[test]
    fn test_type_alias_removed() {
        let out = strip("type Id = string | number;\nconst a = 1;");
        assert!(!out.contains("Id"));
        assert!(out.contains("const a = 1;"));
    }

    #[test]
    fn test_type_as_identifier_kept() {
        assert_eq!(strip("const type = 1;"), "const type = 1;");
    }

    #[test]
    fn test_as_cast_removed() {
        assert_eq!(strip("const el = node as HTMLElement;"), "const el = node ;");
        assert_eq!(strip("const xs = [] as const;"), "const xs = [] ;");
    }

    #[test]
    fn test_generic_call_args_removed() {
        assert_eq!(strip("useState<number>(0)"), "useState(0)");
        assert_eq!(strip("useRef<HTMLDivElement | null>(null)"), "useRef(null)");
    }

    #[test]
    fn test_generic_declaration_params_removed() {
        assert_eq!(
            strip("function id<T>(x: T) { return x }"),
            "function id(x) { return x }"
        );
    }

    #[test]
    fn test_comparison_not_eaten() {
        assert_eq!(strip("a < b && c > (d)"), "a < b && c > (d)");
        assert_eq!(strip("if (x < 10) { f(); }"), "if (x < 10) { f(); }");
    }

    #[test]
    fn test_ternary_in_condition_untouched() {
        assert_eq!(strip("if (x ? a : b) { f(); }"), "if (x ? a : b) { f(); }");
    }

    #[test]
    fn test_non_null_assertion() {
        assert_eq!(strip("ref.current!.focus();"), "ref.current.focus();");
    }

    #[test]
    fn test_not_equals_untouched() {
        assert_eq!(strip("if (a !== b) {}"), "if (a !== b) {}");
    }

    #[test]
    fn test_object_literal_colon_untouched() {
        assert_eq!(strip("f({a: 1, b: 2})"), "f({a: 1, b: 2})");
    }

    #[test]
    fn test_ternary_untouched() {
        assert_eq!(strip("const x = a ? b : c;"), "const x = a ? b : c;");
    }

    #[test]
    fn test_default_param_value_kept() {
        assert_eq!(
            strip("function f(x: number = 3) { return x }"),
            "function f(x = 3) { return x }"
        );
    }

    #[test]
    fn test_ternary_in_default_value_kept() {
        assert_eq!(strip("(x = a ? b : c) => x"), "(x = a ? b : c) => x");
    }

    #[test]
    fn test_export_type_statements_removed() {
        let out = strip("export interface P { a: string }\nexport type Q = number;\nexport const z = 1;");
        assert!(!out.contains("interface"));
        assert!(!out.contains("Q"));
        assert!(out.contains("export const z = 1;"));
    }

    #[test]
    fn test_number_then_keyword() {
        // `as` after a numeric literal is a cast, not an identifier.
        assert_eq!(strip("const n = 5 as number;"), "const n = 5 ;");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(strip(""), "");
    }
}
