//! Skeleton construction (`spec.md` §4.3).
//!
//! Grounded on `original_source/src/parser.cpp`'s `parseElement`/`skipValue`:
//! walk the token stream once, and for every container member record where
//! its value *starts* without descending into it. `materialize_container`
//! (`crate::materializer`) is what actually runs this same routine again,
//! one level at a time, on demand.

use crate::arena::Arena;
use crate::element::{Element, ElementType, KeySource};
use crate::error::DocumentError;
use crate::position::LineIndex;
use crate::tokenizer::{Kind, Token};

/// Build a [`DocumentError::Structural`] with its byte offset resolved to a
/// line/column (`spec.md` SPEC_FULL §A: position tracking feeds error
/// messages). A fresh [`LineIndex`] is cheap here — it only runs on the
/// parse-failure path, never during a successful parse.
fn structural_at(source: &[u8], byte: usize, message: impl Into<String>) -> DocumentError {
    let position = LineIndex::new().position_at(source, byte);
    DocumentError::Structural { message: message.into(), at: Some(position) }
}

/// Build one element starting at `tokens[*index]`, advancing `*index` past
/// it. For a container this registers each direct member's key and the
/// token index where its value begins, but does not parse those values
/// (skip-over).
pub fn parse_element(
    source: &[u8],
    tokens: &[Token],
    index: &mut usize,
    arena: &mut Arena,
) -> Result<Element, DocumentError> {
    let start = *index;
    let Some(tok) = tokens.get(start) else {
        return Err(structural_at(source, source.len(), "unexpected end of tokens"));
    };

    match tok.kind {
        Kind::Null => {
            *index += 1;
            Ok(Element::primitive(ElementType::Null, start))
        }
        Kind::Boolean => {
            *index += 1;
            Ok(Element::primitive(ElementType::Boolean, start))
        }
        Kind::Number => {
            *index += 1;
            Ok(Element::primitive(ElementType::Number, start))
        }
        Kind::String => {
            *index += 1;
            Ok(Element::primitive(ElementType::String, start))
        }
        Kind::ObjectStart => {
            let mut element = Element::container(ElementType::Object, start);
            *index += 1; // consume '{'
            let mut depth = 1i32;
            while depth > 0 && *index < tokens.len() {
                match tokens[*index].kind {
                    Kind::ObjectStart => {
                        depth += 1;
                    }
                    Kind::ObjectEnd => {
                        depth -= 1;
                    }
                    Kind::Comma => {
                        *index += 1;
                        continue;
                    }
                    _ => {}
                }
                if depth <= 0 {
                    break;
                }

                let key_tok = tokens[*index];
                if key_tok.kind != Kind::String {
                    return Err(structural_at(source, key_tok.start, "expected a string object key"));
                }
                *index += 1; // consume key

                if tokens.get(*index).map(|t| t.kind) != Some(Kind::Colon) {
                    let at = tokens.get(*index).map(|t| t.start).unwrap_or(source.len());
                    return Err(structural_at(source, at, "expected ':' after object key"));
                }
                *index += 1; // consume ':'

                let key = KeySource::Source { start: key_tok.start, end: key_tok.end };
                register_member(source, &mut element, arena, key, *index);
                skip_value(source, tokens, index)?;
            }
            element.token_end = *index;
            Ok(element)
        }
        Kind::ArrayStart => {
            let mut element = Element::container(ElementType::Array, start);
            *index += 1; // consume '['
            let mut depth = 1i32;
            let mut array_index: u64 = 0;
            while depth > 0 && *index < tokens.len() {
                match tokens[*index].kind {
                    Kind::ArrayStart => {
                        depth += 1;
                    }
                    Kind::ArrayEnd => {
                        depth -= 1;
                    }
                    Kind::Comma => {
                        *index += 1;
                        continue;
                    }
                    _ => {}
                }
                if depth <= 0 {
                    break;
                }

                let span = arena.add(&array_index.to_string());
                array_index += 1;
                register_member(source, &mut element, arena, KeySource::Arena(span), *index);
                skip_value(source, tokens, index)?;
            }
            element.token_end = *index;
            Ok(element)
        }
        _ => Err(structural_at(source, tok.start, "expected a value, '{' or '['")),
    }
}

/// Register a container member's key and value token index, honoring
/// "first key wins" for duplicates (`spec.md` §9 / SPEC_FULL §F).
fn register_member(
    source: &[u8],
    element: &mut Element,
    arena: &Arena,
    key: KeySource,
    token_index: usize,
) {
    let text = key_text(source, arena, key);
    if element.token_index.contains_key(text.as_ref()) {
        return;
    }
    element.token_index.insert(text.into_owned(), token_index);
    element.keys.push(key);
}

pub fn key_text<'a>(source: &'a [u8], arena: &'a Arena, key: KeySource) -> std::borrow::Cow<'a, str> {
    match key {
        KeySource::Source { start, end } => {
            std::str::from_utf8(&source[start..end])
                .expect("token spans always fall on UTF-8 boundaries")
                .into()
        }
        KeySource::Arena(span) => std::borrow::Cow::Borrowed(arena.resolve(span)),
    }
}

/// Advance `*index` past exactly one JSON value, without recording anything.
pub fn skip_value(source: &[u8], tokens: &[Token], index: &mut usize) -> Result<(), DocumentError> {
    let Some(tok) = tokens.get(*index) else {
        return Err(structural_at(source, source.len(), "unexpected end of tokens"));
    };
    *index += 1;

    match tok.kind {
        Kind::ObjectStart => {
            let mut depth = 1i32;
            while depth > 0 {
                let Some(t) = tokens.get(*index) else {
                    return Err(structural_at(source, source.len(), "unexpected end of tokens"));
                };
                *index += 1;
                match t.kind {
                    Kind::ObjectStart => depth += 1,
                    Kind::ObjectEnd => depth -= 1,
                    _ => {}
                }
            }
            Ok(())
        }
        Kind::ArrayStart => {
            let mut depth = 1i32;
            while depth > 0 {
                let Some(t) = tokens.get(*index) else {
                    return Err(structural_at(source, source.len(), "unexpected end of tokens"));
                };
                *index += 1;
                match t.kind {
                    Kind::ArrayStart => depth += 1,
                    Kind::ArrayEnd => depth -= 1,
                    _ => {}
                }
            }
            Ok(())
        }
        Kind::String | Kind::Number | Kind::Boolean | Kind::Null => Ok(()),
        _ => Err(structural_at(source, tok.start, "unexpected token")),
    }
}
