//! Public document API (`spec.md` §2, §4).
//!
//! Grounded on `original_source/src/parser.cpp`'s `Parser` class: a document
//! owns its source text, its token stream, its string arena, and its
//! element store, and exposes `get`/`set`/`dump` over them. Everything
//! upstream of this module (tokenizer, parser, materializer, resolver,
//! serializer) is plumbing; `Document` is where they're wired together.

use crate::arena::{Arena, DEFAULT_BLOCK_SIZE};
use crate::cache::PathCache;
use crate::element::{Element, ElementId, ElementStore, ElementType, Materialized, ROOT};
use crate::error::DocumentError;
use crate::materializer::materialize_container;
use crate::parser::parse_element;
use crate::path;
use crate::resolver::{resolve, resolve_parent};
use crate::serializer::write_element;
use crate::tokenizer::{tokenize, Token};
use crate::value::Value;
use log::{debug, warn};
use std::num::NonZeroUsize;

/// Default path-cache capacity, used by [`Document::parse`].
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// A parsed JSON document: source text, token stream, string arena and
/// element tree, plus an optional path cache.
pub struct Document {
    source: String,
    tokens: Vec<Token>,
    arena: Arena,
    store: ElementStore,
    cache: Option<PathCache>,
}

impl Document {
    /// Parse `source` with default arena block size and path-cache capacity.
    pub fn parse(source: impl Into<String>) -> Result<Self, DocumentError> {
        Self::parse_with(
            source,
            DEFAULT_BLOCK_SIZE,
            NonZeroUsize::new(DEFAULT_CACHE_CAPACITY),
        )
    }

    /// Parse `source`, using `block_size` for the string arena and, if
    /// `cache_capacity` is `Some`, enabling the path cache at that capacity.
    /// `None` disables the cache entirely (every `get`/`set` re-walks the
    /// path from the root).
    pub fn parse_with(
        source: impl Into<String>,
        block_size: usize,
        cache_capacity: Option<NonZeroUsize>,
    ) -> Result<Self, DocumentError> {
        let source = source.into();
        let tokens = tokenize(&source).map_err(|e| {
            warn!("tokenize failed: {e}");
            DocumentError::from(e)
        })?;
        let mut arena = Arena::new(block_size);
        let mut index = 1; // skip Sof
        let root = parse_element(source.as_bytes(), &tokens, &mut index, &mut arena).map_err(|e| {
            warn!("parse failed: {e}");
            e
        })?;

        // `parse_element` stops right past the root value (at the closer
        // itself for a container, one past the token for a primitive); the
        // only token left before `Eof` must be that closer/value and
        // nothing else, or there's trailing content the parser silently
        // dropped.
        let value_end = if root.is_container() { index + 1 } else { index };
        if value_end != tokens.len() - 1 {
            warn!("trailing content after root value");
            let at = tokens.get(value_end).map(|t| t.start).unwrap_or(source.len());
            return Err(DocumentError::Structural {
                message: "trailing content after root value".into(),
                at: Some(crate::position::LineIndex::new().position_at(source.as_bytes(), at)),
            });
        }

        debug!("parsed root element spanning tokens [{}, {})", root.token_start, root.token_end);

        let root_is_container = root.is_container();
        let mut store = ElementStore::new();
        let root_id = store.insert(root);

        // spec §4.3: the root is eagerly materialized.
        if root_is_container {
            let mut root = store.get(root_id).clone();
            materialize_container(&mut root, source.as_bytes(), &tokens, &mut arena, &mut store)?;
            *store.get_mut(root_id) = root;
        }

        Ok(Self {
            source,
            tokens,
            arena,
            store,
            cache: cache_capacity.map(PathCache::new),
        })
    }

    /// Resolve `path` (`spec.md` §4.7 grammar) to its element, materializing
    /// containers along the way as needed. Repeated calls with the same
    /// path are idempotent and, when the cache is enabled, served from it
    /// after the first resolution.
    pub fn get(&mut self, path: &str) -> Result<ElementView<'_>, DocumentError> {
        let id = self.resolve_cached(path)?;
        Ok(ElementView { document: self, id })
    }

    /// Replace the value at `path` with `value`. The parent container must
    /// already exist and already have `path`'s last component registered
    /// (`spec.md` SPEC_FULL §F: no autovivification, matching
    /// `original_source/src/parser.cpp`). Every container from the root
    /// down to the parent is marked modified, not just the parent itself,
    /// so `dump` recurses through all of them instead of reusing a now-stale
    /// verbatim span higher up the tree.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), DocumentError> {
        let components = path::split(path)?;
        let (parent_id, key) = resolve_parent(
            &components,
            ROOT,
            self.source.as_bytes(),
            &self.tokens,
            &mut self.arena,
            &mut self.store,
        )?;

        {
            let mut parent = self.store.get(parent_id).clone();
            materialize_container(&mut parent, self.source.as_bytes(), &self.tokens, &mut self.arena, &mut self.store)?;
            *self.store.get_mut(parent_id) = parent;
        }

        let parent = self.store.get(parent_id);
        if !parent.is_container() {
            return Err(DocumentError::KeyNotFound { component: key });
        }
        if !parent.token_index.contains_key(&key) {
            return Err(DocumentError::KeyNotFound { component: key });
        }

        let new_child = build_value(&value, &mut self.arena, &mut self.store);
        let parent = self.store.get_mut(parent_id);
        parent.children.insert(key, new_child);
        parent.is_modified = true;
        self.mark_ancestors_modified(&components[..components.len() - 1]);

        // A cached entry for any path reaching *into* the replaced subtree
        // (not just `path` itself) would now point at an orphaned element,
        // so the whole cache is cleared rather than just this one entry.
        if let Some(cache) = &mut self.cache {
            cache.clear();
        }
        Ok(())
    }

    /// `dump` takes the verbatim-span shortcut for any element whose own
    /// `is_modified` flag is false — so every container between the root
    /// and a `set` target must be marked too, not just the immediate
    /// parent, or the change would never surface in a serialized ancestor
    /// that still thinks it's untouched.
    fn mark_ancestors_modified(&mut self, components_to_parent: &[String]) {
        let mut current = ROOT;
        for component in components_to_parent {
            self.store.get_mut(current).is_modified = true;
            current = self.store.get(current).children[component.as_str()];
        }
    }

    /// Serialize the whole document, blending original spans for untouched
    /// subtrees with regenerated text for anything reachable from a `set`.
    pub fn dump(&self) -> Result<String, DocumentError> {
        let mut out = String::new();
        write_element(&mut out, ROOT, &self.source, &self.tokens, &self.arena, &self.store)?;
        Ok(out)
    }

    fn resolve_cached(&mut self, path: &str) -> Result<ElementId, DocumentError> {
        if let Some(cache) = &mut self.cache {
            if let Some(id) = cache.get(path) {
                return Ok(id);
            }
        }
        let components = path::split(path)?;
        let id = resolve(
            &components,
            ROOT,
            self.source.as_bytes(),
            &self.tokens,
            &mut self.arena,
            &mut self.store,
        )?;
        if let Some(cache) = &mut self.cache {
            cache.set(path, id);
        }
        Ok(id)
    }
}

/// Build a fresh, fully-materialized, already-modified subtree from an
/// owned [`Value`], registering array-index keys in the arena the same way
/// the parser does for parsed arrays.
fn build_value(value: &Value, arena: &mut Arena, store: &mut ElementStore) -> ElementId {
    let element = match value {
        Value::Null => primitive(ElementType::Null, Materialized::Null),
        Value::Bool(b) => primitive(ElementType::Boolean, Materialized::Boolean(*b)),
        Value::Number(n) => primitive(ElementType::Number, Materialized::Number(*n)),
        Value::String(s) => primitive(ElementType::String, Materialized::String(s.clone())),
        Value::Array(items) => {
            let mut element = Element::container(ElementType::Array, 0);
            element.is_materialized = true;
            element.is_modified = true;
            for (i, item) in items.iter().enumerate() {
                let span = arena.add(&i.to_string());
                let key_text = i.to_string();
                let child = build_value(item, arena, store);
                element.keys.push(crate::element::KeySource::Arena(span));
                element.token_index.insert(key_text.clone(), 0);
                element.children.insert(key_text, child);
            }
            element
        }
        Value::Object(members) => {
            let mut element = Element::container(ElementType::Object, 0);
            element.is_materialized = true;
            element.is_modified = true;
            for (key, item) in members {
                if element.children.contains_key(key) {
                    continue; // first-key-wins, consistent with parsed objects
                }
                let span = arena.add(key);
                let child = build_value(item, arena, store);
                element.keys.push(crate::element::KeySource::Arena(span));
                element.token_index.insert(key.clone(), 0);
                element.children.insert(key.clone(), child);
            }
            element
        }
    };
    store.insert(element)
}

fn primitive(ty: ElementType, value: Materialized) -> Element {
    let mut element = Element::primitive(ty, 0);
    element.is_materialized = true;
    element.is_modified = true;
    element.value = value;
    element
}

/// A resolved element, borrowed from the [`Document`] that owns it.
///
/// Exposing a view instead of a bare [`ElementId`] keeps callers from
/// needing to thread `source`/`tokens`/`arena` through every read.
pub struct ElementView<'doc> {
    document: &'doc mut Document,
    id: ElementId,
}

impl<'doc> ElementView<'doc> {
    pub fn element_type(&self) -> ElementType {
        self.document.store.get(self.id).ty
    }

    /// Materialize (if needed) and return the typed value, for primitives.
    /// Returns `UnsupportedType` for containers — use [`Self::get`] to
    /// descend into those instead.
    pub fn value(&mut self) -> Result<&Materialized, DocumentError> {
        let needs_materializing = {
            let element = self.document.store.get(self.id);
            if !element.is_primitive() {
                return Err(DocumentError::UnsupportedType);
            }
            !element.is_materialized
        };
        if needs_materializing {
            let mut element = self.document.store.get(self.id).clone();
            crate::materializer::materialize_primitive(&mut element, self.document.source.as_bytes(), &self.document.tokens)?;
            *self.document.store.get_mut(self.id) = element;
        }
        Ok(&self.document.store.get(self.id).value)
    }

    /// Re-serialize just this element's subtree.
    pub fn to_string(&self) -> Result<String, DocumentError> {
        let mut out = String::new();
        write_element(
            &mut out,
            self.id,
            &self.document.source,
            &self.document.tokens,
            &self.document.arena,
            &self.document.store,
        )?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_object_and_array_lookup() {
        let mut doc = Document::parse(r#"{"a": {"b": [10, 20, 30]}}"#).unwrap();
        let mut view = doc.get("a.b[2]").unwrap();
        assert_eq!(*view.value().unwrap(), Materialized::Number(30.0));
    }

    #[test]
    fn repeated_get_is_idempotent() {
        let mut doc = Document::parse(r#"{"a": 1}"#).unwrap();
        let first = doc.get("a").unwrap().element_type();
        let second = doc.get("a").unwrap().element_type();
        assert_eq!(first, second);
    }

    #[test]
    fn deeply_nested_array_resolves() {
        let mut doc = Document::parse("[[[[1]]]]").unwrap();
        let mut view = doc.get("0[0][0][0]").unwrap();
        assert_eq!(*view.value().unwrap(), Materialized::Number(1.0));
    }

    #[test]
    fn raw_string_is_unescaped_at_materialization_only() {
        let mut doc = Document::parse(r#"{"a": "he said \"hi\""}"#).unwrap();
        let mut view = doc.get("a").unwrap();
        match view.value().unwrap() {
            Materialized::String(s) => assert_eq!(s, r#"he said \"hi\""#),
            other => panic!("expected a string, got {other:?}"),
        }
    }

    #[test]
    fn missing_key_in_empty_object_is_key_not_found() {
        let mut doc = Document::parse("{}").unwrap();
        let err = doc.get("missing").unwrap_err();
        assert_eq!(err, DocumentError::KeyNotFound { component: "missing".to_string() });
    }

    #[test]
    fn malformed_input_fails_to_parse() {
        let err = Document::parse("{").unwrap_err();
        assert!(matches!(err, DocumentError::Structural { .. }));
    }

    #[test]
    fn set_replaces_existing_key_and_dump_reflects_it() {
        let mut doc = Document::parse(r#"{"a": 1, "b": 2}"#).unwrap();
        doc.set("a", Value::Number(99.0)).unwrap();
        let dumped = doc.dump().unwrap();
        assert!(dumped.contains("99"));
        assert!(dumped.contains("\"b\""));
    }

    #[test]
    fn set_on_missing_key_is_key_not_found_no_autovivification() {
        let mut doc = Document::parse(r#"{"a": 1}"#).unwrap();
        let err = doc.set("missing", Value::Bool(true)).unwrap_err();
        assert_eq!(err, DocumentError::KeyNotFound { component: "missing".to_string() });
    }

    #[test]
    fn set_nested_value_then_get_it_back() {
        let mut doc = Document::parse(r#"{"a": {"b": 1}}"#).unwrap();
        doc.set(
            "a.b",
            Value::Object(vec![("x".to_string(), Value::Number(5.0))]),
        )
        .unwrap();
        let mut view = doc.get("a.b.x").unwrap();
        assert_eq!(*view.value().unwrap(), Materialized::Number(5.0));
    }

    #[test]
    fn cache_is_transparent_to_callers() {
        let mut doc = Document::parse(r#"{"a": {"b": 1}}"#).unwrap();
        let first = doc.get("a.b").unwrap().element_type();
        // Second call hits the cache; result must be indistinguishable.
        let second = doc.get("a.b").unwrap().element_type();
        assert_eq!(first, second);
    }
}
