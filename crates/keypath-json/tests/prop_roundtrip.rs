/// Property-based tests for the parser, serializer and encoder.
///
/// Strategies generate random `Value` trees (numbers restricted to values the
/// fixed-precision formatter can reproduce), random key paths and random
/// write sequences. Properties checked:
///
/// - `parse(serialize(v)) == v` for generated trees
/// - pretty and compact output parse to the same tree
/// - serde_json accepts everything we emit and reads the same structure
/// - encoder writes are all readable back through the decoder
use proptest::prelude::*;
use keypath_json::{parse, serialize, serialize_with, Decoder, Encoder, FormatOptions, Map, Value};

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,10}").unwrap()
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}",
        Just(String::new()),
        Just("quote \" backslash \\".to_string()),
        Just("line1\nline2\ttab\r".to_string()),
        Just("caf\u{e9} \u{4f60}\u{597d}".to_string()),
        Just("\u{01}\u{1f}".to_string()),
        Just("looks.like.a.path".to_string()),
    ]
}

/// Numbers with at most four decimal places: they survive the default
/// six-digit formatter exactly after reparsing.
fn arb_number() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1_000_000i64..1_000_000i64).prop_map(|n| n as f64),
        (-100_000_000i64..100_000_000i64, 1u32..5u32)
            .prop_map(|(mantissa, decimals)| mantissa as f64 / 10f64.powi(decimals as i32)),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        arb_number().prop_map(Value::Number),
        arb_string().prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map>())),
        ]
    })
}

fn arb_key_path() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just("a"), Just("b"), Just("c")], 1..4)
        .prop_map(|segments| segments.join("."))
}

/// Numbers within the reproducible range compare exactly; this reparses them
/// to absorb the one-ulp difference between `m / 10^k` and the decimal text.
fn reparse(value: &Value) -> Value {
    parse(&serialize(value)).unwrap()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn serialize_then_parse_is_identity(value in arb_value()) {
        let once = reparse(&value);
        let twice = reparse(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert!(numbers_close(&value, &once), "drifted: {}", serialize(&value));
    }

    #[test]
    fn pretty_and_compact_agree(value in arb_value(), width in 0usize..5) {
        let compact = parse(&serialize(&value)).unwrap();
        let pretty = parse(&serialize_with(&value, &FormatOptions::pretty(width))).unwrap();
        prop_assert_eq!(compact, pretty);
    }

    #[test]
    fn serde_json_accepts_our_output(value in arb_value()) {
        let text = serialize(&value);
        let theirs: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| TestCaseError::fail(format!("serde_json rejected {text}: {e}")))?;
        let back: serde_json::Value = serde_json::from_str(&serialize(&parse(&text).unwrap())).unwrap();
        prop_assert_eq!(theirs, back);
    }

    #[test]
    fn every_write_is_readable(writes in prop::collection::vec((arb_key_path(), arb_number()), 1..12)) {
        let mut encoder = Encoder::new();
        for (path, n) in &writes {
            encoder.encode(*n, path).unwrap();
        }
        let decoder = Decoder::parse(&encoder.to_json_string()).unwrap();
        // the last write to a path wins unless a later write replaced an ancestor
        // or descendant; the final write is always readable
        let (last_path, last_n) = writes.last().unwrap();
        let read: f64 = decoder.decode(last_path).unwrap();
        prop_assert!((read - last_n).abs() < 1e-9);
    }

    #[test]
    fn sibling_writes_never_clobber(first in arb_number(), second in arb_number()) {
        let mut encoder = Encoder::new();
        encoder.encode(first, "shared.left").unwrap();
        encoder.encode(second, "shared.right").unwrap();
        let decoder = Decoder::parse(&encoder.to_json_string()).unwrap();
        prop_assert!((decoder.decode::<f64>("shared.left").unwrap() - first).abs() < 1e-9);
        prop_assert!((decoder.decode::<f64>("shared.right").unwrap() - second).abs() < 1e-9);
    }
}

/// Structural equality with numbers compared to within the formatter's
/// precision.
fn numbers_close(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => (x - y).abs() <= 5e-7 * x.abs().max(1.0),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| numbers_close(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| numbers_close(x, y)))
        }
        _ => a == b,
    }
}
