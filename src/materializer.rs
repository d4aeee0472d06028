//! On-demand materialization (`spec.md` §4.4).
//!
//! Grounded on `original_source/src/parser.cpp`'s `getElement`: a container's
//! members are registered (key → token index) during skeleton parsing but
//! left unparsed. Materializing a container means, for each registered
//! member not already in `children`, running `parser::parse_element` once
//! starting at that token index and attaching the result. Materializing a
//! primitive means decoding its source span into a typed [`Materialized`]
//! value. Both are idempotent: an already-materialized element is a no-op.

use crate::arena::Arena;
use crate::element::{Element, ElementType, Materialized};
use crate::error::DocumentError;
use crate::parser::{key_text, parse_element};
use crate::position::LineIndex;
use crate::tokenizer::Token;

/// Decode a primitive element's source span into its typed value.
///
/// No escape processing happens here for strings (`spec.md` §4.4: "no escape
/// decoding at this layer") — the raw slice between the quotes is copied
/// verbatim unescaped. Escapes are only interpreted by consumers that need
/// typed equality, never by this crate.
pub fn materialize_primitive(
    element: &mut Element,
    source: &[u8],
    tokens: &[Token],
) -> Result<(), DocumentError> {
    if element.is_materialized {
        return Ok(());
    }
    let tok = tokens
        .get(element.token_start)
        .ok_or(DocumentError::OutOfRangeTokenIndex { index: element.token_start })?;
    let text = std::str::from_utf8(&source[tok.start..tok.end])
        .expect("token spans always fall on UTF-8 boundaries");

    element.value = match element.ty {
        ElementType::Null => Materialized::Null,
        ElementType::Boolean => Materialized::Boolean(text == "true"),
        ElementType::Number => {
            let n: f64 = text.parse().map_err(|_| DocumentError::Structural {
                message: format!("'{text}' is not a valid number"),
                at: Some(LineIndex::new().position_at(source, tok.start)),
            })?;
            Materialized::Number(n)
        }
        ElementType::String => Materialized::String(text.to_owned()),
        ElementType::Object | ElementType::Array | ElementType::Undefined => {
            return Err(DocumentError::UnsupportedType)
        }
    };
    element.is_materialized = true;
    Ok(())
}

/// Ensure every member already registered on `container` (by an earlier
/// skeleton parse) has a materialized child, parsing only those not yet
/// present. One call materializes exactly one level — nested containers
/// stay as fresh skeleton stubs until they are themselves materialized.
pub fn materialize_container(
    container: &mut Element,
    source: &[u8],
    tokens: &[Token],
    arena: &mut Arena,
    store: &mut crate::element::ElementStore,
) -> Result<(), DocumentError> {
    if container.is_materialized {
        return Ok(());
    }
    for key in container.keys.clone() {
        let text = key_text(source, arena, key).into_owned();
        if container.children.contains_key(&text) {
            continue;
        }
        let token_index = container.token_index[&text];
        let mut idx = token_index;
        let child = parse_element(source, tokens, &mut idx, arena)?;
        let child_id = store.insert(child);
        container.children.insert(text, child_id);
    }
    container.is_materialized = true;
    Ok(())
}
