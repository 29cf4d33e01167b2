//! Tests for provider and preset types

use super::*;

#[test]
fn test_derive_preset_id() {
    assert_eq!(derive_preset_id("My Preset"), "my-preset");
    assert_eq!(derive_preset_id("Low  Temp"), "low--temp");
    assert_eq!(derive_preset_id("tab\there"), "tab-here");
    assert_eq!(derive_preset_id("already-ok"), "already-ok");
}

#[test]
fn test_preset_named() {
    let preset = Preset::named("Creative Writing");
    assert_eq!(preset.id, "creative-writing");
    assert_eq!(preset.name, "Creative Writing");
    assert!(preset.overrides.is_empty());
}

#[test]
fn test_coerce_numbers() {
    assert_eq!(
        OverrideValue::coerce("42"),
        OverrideValue::Number(serde_json::Number::from(42))
    );
    assert_eq!(
        OverrideValue::coerce("4.5"),
        OverrideValue::Number(serde_json::Number::from_f64(4.5).unwrap())
    );
    assert_eq!(
        OverrideValue::coerce("-3"),
        OverrideValue::Number(serde_json::Number::from(-3))
    );
    assert_eq!(
        OverrideValue::coerce(" 7 "),
        OverrideValue::Number(serde_json::Number::from(7))
    );
}

#[test]
fn test_coerce_strings() {
    assert_eq!(
        OverrideValue::coerce("abc"),
        OverrideValue::Text("abc".to_string())
    );
    assert_eq!(OverrideValue::coerce(""), OverrideValue::Text(String::new()));
    assert_eq!(
        OverrideValue::coerce("NaN"),
        OverrideValue::Text("NaN".to_string())
    );
    assert_eq!(
        OverrideValue::coerce("inf"),
        OverrideValue::Text("inf".to_string())
    );
}

#[test]
fn test_coerced_values_serialize_as_json_scalars() {
    let overrides: Overrides = vec![
        ("temperature".to_string(), OverrideValue::coerce("0.7")),
        ("max_tokens".to_string(), OverrideValue::coerce("256")),
        ("stop".to_string(), OverrideValue::coerce("###")),
    ]
    .into_iter()
    .collect();

    let json = serde_json::to_string(&overrides).unwrap();
    assert_eq!(json, r####"{"temperature":0.7,"max_tokens":256,"stop":"###"}"####);
}

#[test]
fn test_overrides_preserve_order() {
    let json = r#"{"zeta": 1, "alpha": "a", "mid": 2.5}"#;
    let overrides: Overrides = serde_json::from_str(json).unwrap();

    let keys: Vec<&str> = overrides.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    assert_eq!(overrides.get("alpha"), Some(&OverrideValue::Text("a".into())));
}

#[test]
fn test_overrides_keep_non_scalar_values() {
    let json = r#"{"stop": ["a", "b"], "echo": true}"#;
    let overrides: Overrides = serde_json::from_str(json).unwrap();

    assert_eq!(
        overrides.get("stop"),
        Some(&OverrideValue::Other(serde_json::json!(["a", "b"])))
    );
    assert_eq!(overrides.get("echo").unwrap().edit_text(), "true");
}

#[test]
fn test_provider_deserialize_without_active_preset() {
    let json = r#"{
        "id": "local",
        "name": "Local",
        "api_url": "http://localhost:5000/v1",
        "api_key": "none",
        "presets": [{"id": "a", "name": "A", "overrides": {"top_k": 40}}]
    }"#;

    let provider: Provider = serde_json::from_str(json).unwrap();
    assert_eq!(provider.id, "local");
    assert!(provider.preset.is_none());
    assert!(provider.has_preset("a"));
    assert!(!provider.has_preset("b"));
    assert!(provider.active_preset().is_none());

    let back = serde_json::to_value(&provider).unwrap();
    assert!(back.get("preset").is_none());
}

#[test]
fn test_active_preset_lookup() {
    let mut provider = Provider::new("p", "P", "http://x", "k");
    provider.presets.push(Preset::named("Fast"));
    provider.preset = Some("fast".to_string());

    assert_eq!(provider.active_preset().map(|p| p.name.as_str()), Some("Fast"));

    provider.preset = Some("missing".to_string());
    assert!(provider.active_preset().is_none());
}

#[test]
fn test_provider_patch_has_no_id() {
    let patch = ProviderPatch {
        name: "New".to_string(),
        api_url: "http://y".to_string(),
        api_key: "k2".to_string(),
    };
    let value = serde_json::to_value(&patch).unwrap();
    assert!(value.get("id").is_none());
    assert_eq!(value["name"], "New");
}

#[test]
fn test_backend_config() {
    let json = r#"{"providers": [], "provider": null, "db_path": "/data/db.sqlite"}"#;
    let config: BackendConfig = serde_json::from_str(json).unwrap();
    assert!(config.providers.is_empty());
    assert!(config.provider.is_none());
    assert_eq!(config.db_path.as_deref(), Some("/data/db.sqlite"));
}
