//! Provider and preset configuration types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A configured upstream API endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    /// Identity key, used in REST paths. Never changes after creation.
    pub id: String,

    /// Display name
    pub name: String,

    /// Base URL of the upstream API
    pub api_url: String,

    /// Credential sent to the upstream API
    pub api_key: String,

    /// Parameter presets, ids unique within this provider
    #[serde(default)]
    pub presets: Vec<Preset>,

    /// Id of the active preset, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

impl Provider {
    /// Create a provider with no presets
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            presets: Vec::new(),
            preset: None,
        }
    }

    pub fn has_preset(&self, preset_id: &str) -> bool {
        self.presets.iter().any(|p| p.id == preset_id)
    }

    pub fn find_preset(&self, preset_id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == preset_id)
    }

    /// The active preset, when `preset` names one that exists
    pub fn active_preset(&self) -> Option<&Preset> {
        self.preset.as_deref().and_then(|id| self.find_preset(id))
    }

    pub fn preset_ids(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.id.as_str())
    }
}

/// Partial provider update. `id` is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPatch {
    pub name: String,
    pub api_url: String,
    pub api_key: String,
}

/// A named set of parameter overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub overrides: Overrides,
}

impl Preset {
    /// Create an empty preset whose id is derived from `name`
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: derive_preset_id(&name),
            name,
            overrides: Overrides::new(),
        }
    }
}

/// Default preset id for a display name: lower-cased, each whitespace
/// character replaced with `-`.
pub fn derive_preset_id(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Value of a single override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Number(serde_json::Number),
    Text(String),
    /// Any other JSON value the backend holds; never produced by coercion
    Other(serde_json::Value),
}

impl OverrideValue {
    /// Coerce editor text into a value.
    ///
    /// Text that parses as a finite float becomes a number (integral values
    /// are kept as integers); anything else, including the empty string, is
    /// kept as the original text.
    pub fn coerce(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => number_from_f64(n)
                .map(OverrideValue::Number)
                .unwrap_or_else(|| OverrideValue::Text(text.to_string())),
            _ => OverrideValue::Text(text.to_string()),
        }
    }

    /// Text shown in the editor for this value
    pub fn edit_text(&self) -> String {
        match self {
            OverrideValue::Number(n) => n.to_string(),
            OverrideValue::Text(s) => s.clone(),
            OverrideValue::Other(v) => v.to_string(),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, OverrideValue::Number(_))
    }
}

impl fmt::Display for OverrideValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideValue::Text(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.edit_text()),
        }
    }
}

// Largest magnitude where every integer is exactly representable in f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn number_from_f64(n: f64) -> Option<serde_json::Number> {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Some(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
    }
}

/// Override map, serialized as a JSON object in insertion order
pub type Overrides = IndexMap<String, OverrideValue>;

/// Full backend configuration as served by `GET config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub providers: Vec<Provider>,

    /// Active provider id
    #[serde(default)]
    pub provider: Option<String>,

    /// Location of the backend's request log database
    #[serde(default)]
    pub db_path: Option<String>,
}

#[cfg(test)]
mod tests;
