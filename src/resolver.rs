//! Path resolution (`spec.md` §4.7 / §4.8).
//!
//! Grounded on `original_source/src/parser.cpp::get`: walk path components
//! one at a time, materializing each container just enough to look up the
//! next component's key, and stop descending (returning whatever element is
//! currently sitting there) once a component lands on a primitive. A
//! missing key on the way down is `KeyNotFound`; there is no
//! autovivification for `set`, so the same walk is reused there too — it
//! is the parent lookup that `set` needs before it can replace a child.

use crate::arena::Arena;
use crate::element::{ElementId, ElementStore, ROOT};
use crate::error::DocumentError;
use crate::materializer::materialize_container;
use crate::tokenizer::Token;
use log::debug;

/// Resolve `components` starting at `root`, materializing containers along
/// the way. Per `spec.md` §9, a path that runs past a primitive simply
/// yields that primitive rather than erroring — only a genuinely absent key
/// on a container is a [`DocumentError::KeyNotFound`].
pub fn resolve(
    components: &[String],
    root: ElementId,
    source: &[u8],
    tokens: &[Token],
    arena: &mut Arena,
    store: &mut ElementStore,
) -> Result<ElementId, DocumentError> {
    let mut current = root;
    for component in components {
        let element = store.get(current);
        if element.is_primitive() {
            // Trailing path components past a primitive are silently
            // absorbed: the primitive itself is the answer.
            return Ok(current);
        }

        {
            let mut container = store.get(current).clone();
            materialize_container(&mut container, source, tokens, arena, store)?;
            *store.get_mut(current) = container;
        }

        let element = store.get(current);
        match element.children.get(component.as_str()) {
            Some(&child_id) => current = child_id,
            None => {
                debug!("path resolution missed key '{component}'");
                return Err(DocumentError::KeyNotFound { component: component.clone() });
            }
        }
    }
    Ok(current)
}

/// Resolve all but the last component of `components`, returning the
/// parent's id and the final component's text. Used by `set`, which never
/// autovivifies a missing parent (`spec.md` SPEC_FULL §F).
pub fn resolve_parent(
    components: &[String],
    root: ElementId,
    source: &[u8],
    tokens: &[Token],
    arena: &mut Arena,
    store: &mut ElementStore,
) -> Result<(ElementId, String), DocumentError> {
    let Some((last, init)) = components.split_last() else {
        return Err(DocumentError::KeyNotFound { component: String::new() });
    };
    let parent = resolve(init, root, source, tokens, arena, store)?;
    Ok((parent, last.clone()))
}
