#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn sample() -> Settings {
    Settings::new()
        .with("text", SettingValue::extended("hi", true))
        .with("size", SettingValue::Number(12.0))
        .with("on", SettingValue::Bool(false))
        .with("color", SettingValue::Text("#fff".into()))
        .with("align", SettingValue::choice(&["left", "center", "right"], "center"))
        .with("logo", SettingValue::Image(None))
}

// =============================================================
// Construction
// =============================================================

#[test]
fn with_preserves_declaration_order() {
    let settings = sample();
    let json = serde_json::to_value(&settings).unwrap();
    let keys: Vec<&str> = json["entries"].as_array().unwrap().iter().map(|e| e[0].as_str().unwrap()).collect();
    assert_eq!(keys, ["text", "size", "on", "color", "align", "logo"]);
}

#[test]
fn with_same_key_replaces() {
    let s = Settings::new()
        .with("a", SettingValue::Number(1.0))
        .with("a", SettingValue::Number(2.0));
    assert_eq!(s.len(), 1);
    assert_eq!(s.f64("a"), 2.0);
}

#[test]
fn choice_falls_back_to_first_option() {
    let v = SettingValue::choice(&["top", "bottom"], "middle");
    assert_eq!(v.as_str(), Some("top"));
}

// =============================================================
// Typed set
// =============================================================

#[test]
fn set_number_ok() {
    let mut s = sample();
    s.set("size", SettingValue::Number(40.0)).unwrap();
    assert_eq!(s.f64("size"), 40.0);
}

#[test]
fn set_extended_keeps_multiline_flag() {
    let mut s = sample();
    s.set("text", SettingValue::Text("new".into())).unwrap();
    assert_eq!(
        s.get("text"),
        Some(&SettingValue::ExtendedText { value: "new".into(), multiline: true })
    );
}

#[test]
fn set_wrong_shape_is_rejected_and_unchanged() {
    let mut s = sample();
    let err = s.set("on", SettingValue::Number(1.0)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidValue { .. }));
    assert!(!s.bool("on"));
}

#[test]
fn set_non_finite_number_is_rejected() {
    let mut s = sample();
    assert!(s.set("size", SettingValue::Number(f64::NAN)).is_err());
    assert_eq!(s.f64("size"), 12.0);
}

#[test]
fn set_choice_outside_options_is_rejected() {
    let mut s = sample();
    assert!(s.set("align", SettingValue::Text("justify".into())).is_err());
    assert_eq!(s.str("align"), "center");
    s.set("align", SettingValue::Text("right".into())).unwrap();
    assert_eq!(s.str("align"), "right");
}

#[test]
fn set_unknown_key_is_unknown_property() {
    let mut s = sample();
    let err = s.set("nope", SettingValue::Bool(true)).unwrap_err();
    assert!(matches!(err, EngineError::UnknownProperty(k) if k == "nope"));
}

// =============================================================
// JSON set
// =============================================================

#[test]
fn set_json_coerces_to_entry_shape() {
    let mut s = sample();
    s.set_json("size", &json!(48)).unwrap();
    s.set_json("on", &json!(true)).unwrap();
    s.set_json("text", &json!("top\nbottom")).unwrap();
    s.set_json("align", &json!("left")).unwrap();
    assert_eq!(s.f64("size"), 48.0);
    assert!(s.bool("on"));
    assert_eq!(s.str("text"), "top\nbottom");
    assert_eq!(s.str("align"), "left");
}

#[test]
fn set_json_type_mismatch_is_invalid() {
    let mut s = sample();
    assert!(matches!(s.set_json("size", &json!("big")), Err(EngineError::InvalidValue { .. })));
    assert!(matches!(s.set_json("color", &json!(3)), Err(EngineError::InvalidValue { .. })));
}

#[test]
fn set_json_image_and_null() {
    let mut s = sample();
    s.set_json("logo", &json!({"src": "a.png", "width": 10.0, "height": 20.0}))
        .unwrap();
    assert_eq!(
        s.get("logo"),
        Some(&SettingValue::Image(Some(ImageRef { src: "a.png".into(), width: 10.0, height: 20.0 })))
    );
    s.set_json("logo", &serde_json::Value::Null).unwrap();
    assert_eq!(s.get("logo"), Some(&SettingValue::Image(None)));
}

// =============================================================
// Accessors
// =============================================================

#[test]
fn accessors_default_for_missing_or_mismatched() {
    let s = sample();
    assert_eq!(s.str("missing"), "");
    assert_eq!(s.f64("color"), 0.0);
    assert!(!s.bool("size"));
}

#[test]
fn settings_serialize_with_type_tags() {
    let s = Settings::new().with("on", SettingValue::Bool(true));
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["entries"][0][0], "on");
    assert_eq!(v["entries"][0][1]["type"], "bool");
}
