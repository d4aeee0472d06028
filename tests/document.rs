//! Integration tests for the public `Document` API: the six concrete
//! scenarios and negative tests from `spec.md` §8, plus property-based
//! invariants from the same section.

use jsondoc::document::Document;
use jsondoc::error::{DocumentError, PathSyntaxError, TokenizeError};
use jsondoc::{Materialized, Value};
use std::num::NonZeroUsize;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn scenario_1_mixed_object_round_trips_and_resolves() {
    init_logging();
    let src = r#"{"bool_1":true,"arr_1":[123,1.020304,3.00],"obj_2":{"obj_nested":{"a":3}}}"#;
    let mut doc = Document::parse(src).unwrap();

    assert_eq!(*doc.get("bool_1").unwrap().value().unwrap(), Materialized::Boolean(true));
    assert_eq!(*doc.get("arr_1[1]").unwrap().value().unwrap(), Materialized::Number(1.020304));
    assert_eq!(*doc.get("obj_2.obj_nested.a").unwrap().value().unwrap(), Materialized::Number(3.0));
    assert_eq!(doc.dump().unwrap(), src);
}

#[test]
fn scenario_2_repeated_get_is_structurally_inert() {
    let src = r#"{"a":{"b":{"c":42}}}"#;
    let mut doc = Document::parse(src).unwrap();

    doc.get("a.b.c").unwrap();
    let before = doc.dump().unwrap();
    let mut view = doc.get("a.b.c").unwrap();
    assert_eq!(*view.value().unwrap(), Materialized::Number(42.0));
    let after = doc.dump().unwrap();
    assert_eq!(before, after);
}

#[test]
fn scenario_3_deeply_nested_array_resolves() {
    let mut doc = Document::parse("[[[[1]]]]").unwrap();
    let mut view = doc.get("0.0.0.0").unwrap();
    assert_eq!(*view.value().unwrap(), Materialized::Number(1.0));
}

#[test]
fn scenario_4_string_materializes_raw_and_dumps_verbatim() {
    let src = r#"{"x":"he said \"hi\""}"#;
    let mut doc = Document::parse(src).unwrap();
    match doc.get("x").unwrap().value().unwrap() {
        Materialized::String(s) => assert_eq!(s, r#"he said \"hi\""#),
        other => panic!("expected a string, got {other:?}"),
    }
    assert_eq!(doc.dump().unwrap(), src);
}

#[test]
fn scenario_5_empty_object_key_not_found() {
    let mut doc = Document::parse("{}").unwrap();
    let err = doc.get("missing").unwrap_err();
    assert_eq!(err, DocumentError::KeyNotFound { component: "missing".to_string() });
    assert_eq!(doc.dump().unwrap(), "{}");
}

#[test]
fn scenario_6_malformed_input_fails_to_parse() {
    let err = Document::parse(r#"{"a":1"#).unwrap_err();
    assert!(matches!(err, DocumentError::Structural { .. }));
}

#[test]
fn empty_array_dumps_back_and_has_no_keys() {
    let mut doc = Document::parse("[]").unwrap();
    assert!(doc.get("0").is_err());
    assert_eq!(doc.dump().unwrap(), "[]");
}

#[test]
fn array_of_mixed_primitives_has_decimal_string_keys() {
    let mut doc = Document::parse(r#"[ true, false, null, 1, "x" ]"#).unwrap();
    assert_eq!(*doc.get("0").unwrap().value().unwrap(), Materialized::Boolean(true));
    assert_eq!(*doc.get("1").unwrap().value().unwrap(), Materialized::Boolean(false));
    assert_eq!(*doc.get("2").unwrap().value().unwrap(), Materialized::Null);
    assert_eq!(*doc.get("3").unwrap().value().unwrap(), Materialized::Number(1.0));
    match doc.get("4").unwrap().value().unwrap() {
        Materialized::String(s) => assert_eq!(s, "x"),
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn trailing_separator_drops_empty_component() {
    let mut doc = Document::parse(r#"{"a": 1}"#).unwrap();
    // "a." splits to ["a"], same as "a".
    assert_eq!(*doc.get("a.").unwrap().value().unwrap(), Materialized::Number(1.0));
}

#[test]
fn deeply_nested_32_levels_parses_and_drops_without_overflow() {
    let mut src = String::new();
    for _ in 0..32 {
        src.push('[');
    }
    src.push('1');
    for _ in 0..32 {
        src.push(']');
    }
    let doc = Document::parse(src.as_str()).unwrap();
    drop(doc); // flat Vec<Element> drop, not a recursive one
}

#[test]
fn path_cache_is_transparent_across_capacities() {
    let src = r#"{"a":{"b":[1,2,3]},"c":"d"}"#;
    let paths = ["a.b[0]", "a.b[1]", "c", "a.b[2]", "a.b[1]"];

    let mut small = Document::parse_with(src, 4096, NonZeroUsize::new(1)).unwrap();
    let mut large = Document::parse_with(src, 4096, NonZeroUsize::new(1024)).unwrap();

    for path in paths {
        let a = small.get(path).unwrap().value().unwrap().clone();
        let b = large.get(path).unwrap().value().unwrap().clone();
        assert_eq!(a, b);
    }
}

#[test]
fn set_replaces_a_leaf_and_dump_reflects_the_change() {
    let mut doc = Document::parse(r#"{"bool_1":true,"arr_1":[123,1.020304,3.00]}"#).unwrap();
    doc.set("bool_1", Value::Bool(false)).unwrap();
    let dumped = doc.dump().unwrap();
    assert!(dumped.contains("false"));
    assert!(dumped.contains("123"));
}

#[test]
fn set_missing_key_is_key_not_found() {
    let mut doc = Document::parse("{}").unwrap();
    let err = doc.set("missing", Value::Null).unwrap_err();
    assert_eq!(err, DocumentError::KeyNotFound { component: "missing".to_string() });
}

#[test]
fn cross_check_materialized_leaves_against_serde_json() {
    let src = r#"{"a":1,"b":[true,false,null],"c":"hi"}"#;
    let mut doc = Document::parse(src).unwrap();
    let expected: serde_json::Value = serde_json::from_str(src).unwrap();

    assert_eq!(*doc.get("a").unwrap().value().unwrap(), Materialized::Number(expected["a"].as_f64().unwrap()));
    assert_eq!(*doc.get("b[0]").unwrap().value().unwrap(), Materialized::Boolean(expected["b"][0].as_bool().unwrap()));
    match doc.get("c").unwrap().value().unwrap() {
        Materialized::String(s) => assert_eq!(s, expected["c"].as_str().unwrap()),
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn negative_unterminated_string() {
    let err = Document::parse("\"foo").unwrap_err();
    assert_eq!(err, DocumentError::Tokenize(TokenizeError::UnterminatedString { at: 0 }));
}

#[test]
fn negative_unexpected_character() {
    let err = Document::parse("{&}").unwrap_err();
    assert_eq!(
        err,
        DocumentError::Tokenize(TokenizeError::UnexpectedCharacter { byte: b'&', at: 1 })
    );
}

#[test]
fn negative_unterminated_bracket_in_path() {
    let mut doc = Document::parse(r#"{"a": 1}"#).unwrap();
    let err = doc.get("a[0").unwrap_err();
    assert_eq!(err, DocumentError::PathSyntax(PathSyntaxError::UnterminatedBracket { at: 1 }));
}
