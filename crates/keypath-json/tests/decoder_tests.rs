use keypath_json::{
    parse, Decodable, DecodeError, DecodeResult, Decoder, SyntaxErrorKind, Value,
};

const DOC: &str = r#"{
    "a": {"b": {"x": 1, "y": 2}, "c": 3},
    "device": {"name": "porch-light", "enabled": true, "mode": "blink", "level": 2},
    "wifi.ssid": "literal-dotted-key",
    "limits": {"neg": -40, "big": 300, "frac": 2.5, "huge": 1e20},
    "list": [1, 2, 3]
}"#;

fn decoder() -> Decoder {
    Decoder::parse(DOC).unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn root_must_be_an_object() {
    for text in ["[1,2]", "42", "\"s\"", "null"] {
        match Decoder::parse(text) {
            Err(DecodeError::InvalidFormat(err)) => {
                assert_eq!(err.kind, SyntaxErrorKind::NotAnObject)
            }
            other => panic!("expected NotAnObject for {text}, got {other:?}"),
        }
    }
    assert!(Decoder::new(parse("{}").unwrap()).is_ok());
}

#[test]
fn malformed_text_is_invalid_format() {
    assert!(matches!(
        Decoder::parse(r#"{"a":"#),
        Err(DecodeError::InvalidFormat(_))
    ));
}

// ============================================================================
// Key path lookup
// ============================================================================

#[test]
fn lookup_nested_values() {
    let d = decoder();
    assert_eq!(d.lookup_value("a.b.x").unwrap(), &Value::from(1));
    assert_eq!(d.lookup_value("a.c").unwrap(), &Value::from(3));
    assert!(d.lookup_value("a.b").unwrap().is_object());
}

#[test]
fn missing_leaf_key() {
    assert_eq!(
        decoder().decode::<f64>("a.b.z").unwrap_err(),
        DecodeError::MissingKey("a.b.z".to_string())
    );
}

#[test]
fn missing_intermediate_key() {
    assert_eq!(
        decoder().lookup_value("a.q.x").unwrap_err(),
        DecodeError::MissingKey("a.q".to_string())
    );
}

#[test]
fn walking_through_a_scalar_is_missing_key() {
    assert_eq!(
        decoder().lookup_value("a.c.deeper").unwrap_err(),
        DecodeError::MissingKey("a.c.deeper".to_string())
    );
}

#[test]
fn invalid_key_paths() {
    let d = decoder();
    for path in ["", "a.", ".a", "a..b"] {
        assert!(
            matches!(d.lookup_value(path), Err(DecodeError::InvalidKeyPath(_))),
            "{path:?} should be an invalid key path"
        );
    }
}

// ============================================================================
// Typed accessors
// ============================================================================

#[test]
fn decode_each_primitive_type() {
    let d = decoder();
    let name: String = d.decode("device.name").unwrap();
    let enabled: bool = d.decode("device.enabled").unwrap();
    let frac: f64 = d.decode("limits.frac").unwrap();
    let frac32: f32 = d.decode("limits.frac").unwrap();
    assert_eq!(name, "porch-light");
    assert!(enabled);
    assert_eq!(frac, 2.5);
    assert_eq!(frac32, 2.5);
}

#[test]
fn decode_integers_of_every_width() {
    let d = decoder();
    assert_eq!(d.decode::<i8>("limits.neg").unwrap(), -40);
    assert_eq!(d.decode::<i16>("limits.big").unwrap(), 300);
    assert_eq!(d.decode::<i32>("limits.big").unwrap(), 300);
    assert_eq!(d.decode::<i64>("limits.neg").unwrap(), -40);
    assert_eq!(d.decode::<isize>("limits.neg").unwrap(), -40);
    assert_eq!(d.decode::<u8>("device.level").unwrap(), 2);
    assert_eq!(d.decode::<u16>("limits.big").unwrap(), 300);
    assert_eq!(d.decode::<u32>("limits.big").unwrap(), 300);
    assert_eq!(d.decode::<u64>("limits.big").unwrap(), 300);
    assert_eq!(d.decode::<usize>("a.c").unwrap(), 3);
}

#[test]
fn type_mismatch_reports_expected_and_found() {
    assert_eq!(
        decoder().decode::<String>("a.b.x").unwrap_err(),
        DecodeError::TypeMismatch {
            expected: "string".to_string(),
            found: "number 1".to_string(),
        }
    );
    assert_eq!(
        decoder().decode::<bool>("device.name").unwrap_err(),
        DecodeError::TypeMismatch {
            expected: "bool".to_string(),
            found: "string".to_string(),
        }
    );
    assert!(matches!(
        decoder().decode::<f64>("list"),
        Err(DecodeError::TypeMismatch { .. })
    ));
}

#[test]
fn integer_narrowing_is_checked() {
    let d = decoder();
    assert_eq!(
        d.decode::<u8>("limits.big").unwrap_err(),
        DecodeError::TypeMismatch {
            expected: "u8".to_string(),
            found: "number 300".to_string(),
        }
    );
    assert!(matches!(d.decode::<u32>("limits.neg"), Err(DecodeError::TypeMismatch { .. })));
    assert!(matches!(d.decode::<i32>("limits.frac"), Err(DecodeError::TypeMismatch { .. })));
    assert!(matches!(d.decode::<i64>("limits.huge"), Err(DecodeError::TypeMismatch { .. })));
}

#[test]
fn integer_bounds_are_exact() {
    let d = Decoder::parse(r#"{"max8":255,"over8":256,"min8":-128,"under8":-129}"#).unwrap();
    assert_eq!(d.decode::<u8>("max8").unwrap(), 255);
    assert!(d.decode::<u8>("over8").is_err());
    assert_eq!(d.decode::<i8>("min8").unwrap(), -128);
    assert!(d.decode::<i8>("under8").is_err());
}

#[test]
fn decode_whole_value() {
    let list: Value = decoder().decode("list").unwrap();
    assert_eq!(list.as_array().map(|items| items.len()), Some(3));
}

// ============================================================================
// Single keys, optional fields, enums, nesting
// ============================================================================

#[test]
fn decode_key_matches_decode() {
    let d = decoder();
    assert_eq!(d.decode_key::<f64>("a.c").unwrap(), 3.0);
    assert_eq!(d.decode_key::<String>("device.name").unwrap(), "porch-light");
    assert_eq!(
        d.decode_key::<i32>("a.b.x").unwrap(),
        d.decode::<i32>("a.b.x").unwrap()
    );
    // a key containing a dot is split like any other key path
    assert_eq!(
        d.decode_key::<String>("wifi.ssid").unwrap_err(),
        DecodeError::MissingKey("wifi".to_string())
    );
    assert!(matches!(d.decode_key::<String>(""), Err(DecodeError::InvalidKeyPath(_))));
}

#[test]
fn decode_optional_maps_missing_to_none() {
    let d = decoder();
    assert_eq!(d.decode_optional::<f64>("a.c").unwrap(), Some(3.0));
    assert_eq!(d.decode_optional::<f64>("a.nope").unwrap(), None);
    assert!(d.decode_optional::<String>("a.c").is_err());
}

#[derive(Debug, PartialEq)]
enum Mode {
    Steady,
    Blink,
}

impl TryFrom<String> for Mode {
    type Error = ();

    fn try_from(raw: String) -> Result<Self, ()> {
        match raw.as_str() {
            "steady" => Ok(Mode::Steady),
            "blink" => Ok(Mode::Blink),
            _ => Err(()),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Level {
    Low,
    High,
}

impl TryFrom<u8> for Level {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            1 => Ok(Level::Low),
            2 => Ok(Level::High),
            other => Err(other),
        }
    }
}

#[test]
fn decode_enum_from_raw_values() {
    let d = decoder();
    assert_eq!(d.decode_enum::<Mode, String>("device.mode").unwrap(), Mode::Blink);
    assert_eq!(d.decode_enum::<Level, u8>("device.level").unwrap(), Level::High);
    assert_eq!(
        d.decode_enum::<Level, u8>("a.c").unwrap_err(),
        DecodeError::InvalidEnumValue("a.c: 3".to_string())
    );
    assert_eq!(
        d.decode_enum::<Mode, String>("device.name").unwrap_err(),
        DecodeError::InvalidEnumValue("device.name: \"porch-light\"".to_string())
    );
}

#[derive(Debug, PartialEq)]
struct Device {
    name: String,
    enabled: bool,
    level: u8,
}

impl Decodable for Device {
    fn decode(decoder: &Decoder) -> DecodeResult<Self> {
        Ok(Self {
            name: decoder.decode("name")?,
            enabled: decoder.decode("enabled")?,
            level: decoder.decode("level")?,
        })
    }
}

#[test]
fn decode_nested_decodable() {
    let device: Device = decoder().decode_nested("device").unwrap();
    assert_eq!(
        device,
        Device {
            name: "porch-light".to_string(),
            enabled: true,
            level: 2,
        }
    );
}

#[test]
fn scoped_requires_an_object() {
    assert!(matches!(
        decoder().scoped("list"),
        Err(DecodeError::TypeMismatch { .. })
    ));
}

#[test]
fn from_str_decodes_root() {
    let device: Device =
        keypath_json::from_str(r#"{"name":"n","enabled":false,"level":1}"#).unwrap();
    assert_eq!(device.level, 1);
    assert!(!device.enabled);
}

#[test]
fn decoder_does_not_mutate_its_tree() {
    let d = decoder();
    let before = d.root().clone();
    let _ = d.decode::<String>("a.b.x");
    let _ = d.decode_optional::<u8>("missing");
    assert_eq!(d.root(), &before);
}
