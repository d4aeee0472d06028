//! Serialization (`spec.md` §4.6).
//!
//! Grounded on `original_source/src/parser.cpp::dumpElement`: an unmodified
//! subtree is re-emitted byte-for-byte from its original token span (the
//! whole point of the lazy design — untouched parts of a huge document
//! never get re-stringified). A modified element is regenerated from its
//! typed value; a modified container recurses, re-emitting each child
//! either from its original span (if still unmaterialized and untouched)
//! or recursively (if materialized).

use crate::arena::Arena;
use crate::element::{Element, ElementId, ElementStore, ElementType, Materialized};
use crate::error::DocumentError;
use crate::parser::key_text;
use crate::tokenizer::Token;

/// Render `id` (and everything beneath it) to `out`.
pub fn write_element(
    out: &mut String,
    id: ElementId,
    source: &str,
    tokens: &[Token],
    arena: &Arena,
    store: &ElementStore,
) -> Result<(), DocumentError> {
    let element = store.get(id);

    // Whether `get` has materialized this element along the way is
    // irrelevant here: only `set` (`is_modified`) should change how a
    // subtree serializes. A read-only traversal must leave `dump()` output
    // byte-identical to before it ran.
    if !element.is_modified {
        let start_tok = tokens
            .get(element.token_start)
            .ok_or(DocumentError::OutOfRangeTokenIndex { index: element.token_start })?;
        let end_tok = tokens
            .get(element.token_end)
            .filter(|_| element.is_container())
            .unwrap_or(start_tok);
        let (from, to) = if element.is_container() {
            (start_tok.start, end_tok.end)
        } else {
            (start_tok.start, start_tok.end)
        };
        if element.ty == ElementType::String {
            out.push('"');
            out.push_str(&source[from..to]);
            out.push('"');
        } else {
            out.push_str(&source[from..to]);
        }
        return Ok(());
    }

    if element.is_primitive() {
        write_primitive(out, element);
        return Ok(());
    }

    write_container(out, element, source, tokens, arena, store)?;
    Ok(())
}

fn write_primitive(out: &mut String, element: &Element) {
    match &element.value {
        Materialized::Undecoded => unreachable!("materialized primitive always has a value"),
        Materialized::Null => out.push_str("null"),
        Materialized::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Materialized::Number(n) => out.push_str(&format_number(*n)),
        Materialized::String(s) => write_quoted_string(out, s),
    }
}

/// Rust's shortest-round-trip `f64` formatting already matches `spec.md`
/// SPEC_FULL §F's requirement; integral values print without a trailing
/// `.0` suffix's worth of noise beyond what JSON numbers allow.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn write_quoted_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_container(
    out: &mut String,
    element: &Element,
    source: &str,
    tokens: &[Token],
    arena: &Arena,
    store: &ElementStore,
) -> Result<(), DocumentError> {
    let (open, close) = match element.ty {
        ElementType::Object => ('{', '}'),
        ElementType::Array => ('[', ']'),
        _ => return Err(DocumentError::UnsupportedType),
    };
    out.push(open);
    for (i, key) in element.keys.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let key_str = key_text(source.as_bytes(), arena, *key);
        if element.ty == ElementType::Object {
            write_quoted_string(out, &key_str);
            out.push_str(": ");
        }

        if let Some(&child_id) = element.children.get(key_str.as_ref()) {
            write_element(out, child_id, source, tokens, arena, store)?;
        } else {
            let token_index = element.token_index[key_str.as_ref()];
            write_span_at(out, token_index, source, tokens)?;
        }
    }
    out.push(close);
    Ok(())
}

/// Emit the value starting at `token_index` verbatim, without a full
/// skeleton parse — used for container members that were never
/// materialized at all. Mirrors `parser::skip_value`'s traversal but copies
/// text instead of discarding it.
fn write_span_at(
    out: &mut String,
    token_index: usize,
    source: &str,
    tokens: &[Token],
) -> Result<(), DocumentError> {
    use crate::tokenizer::Kind;

    let tok = tokens
        .get(token_index)
        .ok_or(DocumentError::OutOfRangeTokenIndex { index: token_index })?;

    match tok.kind {
        Kind::String => {
            out.push('"');
            out.push_str(&source[tok.start..tok.end]);
            out.push('"');
            Ok(())
        }
        Kind::ObjectStart | Kind::ArrayStart => {
            let closing = if tok.kind == Kind::ObjectStart { Kind::ObjectEnd } else { Kind::ArrayEnd };
            let mut depth = 1i32;
            let mut i = token_index + 1;
            while depth > 0 {
                let t = tokens
                    .get(i)
                    .ok_or(DocumentError::OutOfRangeTokenIndex { index: i })?;
                if t.kind == tok.kind {
                    depth += 1;
                } else if t.kind == closing {
                    depth -= 1;
                }
                i += 1;
            }
            let end_tok = tokens[i - 1];
            out.push_str(&source[tok.start..end_tok.end]);
            Ok(())
        }
        _ => {
            out.push_str(&source[tok.start..tok.end]);
            Ok(())
        }
    }
}
