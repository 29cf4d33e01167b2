//! Transient editing state for presets and their overrides
//!
//! Edits never fail. Key problems (empty or duplicated keys) are accepted into
//! the editor and only reported when the editor is turned into a [`Preset`].

use crate::error::{FieldError, Result, ValidationErrors};
use crate::provider::{OverrideValue, Overrides, Preset, Provider, derive_preset_id};

/// One row of the override editor. The value is raw text until submission.
///
/// A row seeded from an existing override keeps that value verbatim until its
/// text is edited, so arrays and booleans survive an unrelated edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverridePair {
    pub key: String,
    pub value: String,
    seed: Option<OverrideValue>,
}

impl OverridePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            seed: None,
        }
    }

    fn seeded(key: &str, value: &OverrideValue) -> Self {
        Self {
            key: key.to_string(),
            value: value.edit_text(),
            seed: Some(value.clone()),
        }
    }

    /// True while the row still holds the value it was loaded with
    pub fn is_unedited(&self) -> bool {
        self.seed.is_some()
    }

    fn set_text(&mut self, value: String) {
        self.value = value;
        self.seed = None;
    }

    /// Value submitted for this row: the loaded value, or the coerced text
    pub fn to_value(&self) -> OverrideValue {
        match &self.seed {
            Some(seed) => seed.clone(),
            None => OverrideValue::coerce(&self.value),
        }
    }
}

/// Ordered list of override rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideEditor {
    pairs: Vec<OverridePair>,
}

impl OverrideEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the editor from existing overrides, keeping their order
    pub fn from_overrides(overrides: &Overrides) -> Self {
        Self {
            pairs: overrides
                .iter()
                .map(|(key, value)| OverridePair::seeded(key, value))
                .collect(),
        }
    }

    pub fn pairs(&self) -> &[OverridePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append an empty row
    pub fn push_blank(&mut self) {
        self.pairs.push(OverridePair::default());
    }

    /// Remove the row at `index`; out-of-range indices are ignored
    pub fn remove(&mut self, index: usize) {
        if index < self.pairs.len() {
            self.pairs.remove(index);
        }
    }

    pub fn set_key(&mut self, index: usize, key: impl Into<String>) {
        if let Some(pair) = self.pairs.get_mut(index) {
            pair.key = key.into();
        }
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(pair) = self.pairs.get_mut(index) {
            pair.set_text(value.into());
        }
    }

    /// Set the value of the first row with `key`, or append a new row
    pub fn upsert(&mut self, key: &str, value: impl Into<String>) {
        match self.pairs.iter().position(|p| p.key == key) {
            Some(index) => self.set_value(index, value),
            None => self.pairs.push(OverridePair::new(key, value)),
        }
    }

    /// Remove every row with `key`, returning how many were removed
    pub fn remove_key(&mut self, key: &str) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|p| p.key != key);
        before - self.pairs.len()
    }

    pub fn has_empty_key(&self, index: usize) -> bool {
        self.pairs.get(index).is_some_and(|p| p.key.is_empty())
    }

    /// Case-sensitive exact match against every other row
    pub fn has_duplicate_key(&self, index: usize) -> bool {
        let Some(pair) = self.pairs.get(index) else {
            return false;
        };
        self.pairs
            .iter()
            .enumerate()
            .any(|(other, p)| other != index && p.key == pair.key)
    }

    /// The problem reported for a row. An empty key wins over a duplicate one.
    pub fn issue(&self, index: usize) -> Option<FieldError> {
        if self.has_empty_key(index) {
            Some(FieldError::EmptyKey { index })
        } else if self.has_duplicate_key(index) {
            Some(FieldError::DuplicateKey {
                index,
                key: self.pairs[index].key.clone(),
            })
        } else {
            None
        }
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for index in 0..self.pairs.len() {
            if let Some(issue) = self.issue(index) {
                errors.push(issue);
            }
        }
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validate, then coerce every edited value into an [`OverrideValue`]
    pub fn to_overrides(&self) -> Result<Overrides> {
        self.validate().into_result()?;
        Ok(self.coerced())
    }

    fn coerced(&self) -> Overrides {
        self.pairs
            .iter()
            .map(|p| (p.key.clone(), p.to_value()))
            .collect()
    }
}

/// Editing surface for one preset of a provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetEditor {
    pub id: String,
    pub name: String,
    pub overrides: OverrideEditor,
}

impl PresetEditor {
    /// Derive editor state from the selected preset.
    ///
    /// Call again whenever the selection changes. An unknown or absent
    /// selection yields an empty editor.
    pub fn load(provider: &Provider, selected: Option<&str>) -> Self {
        match selected.and_then(|id| provider.find_preset(id)) {
            Some(preset) => Self {
                id: preset.id.clone(),
                name: preset.name.clone(),
                overrides: OverrideEditor::from_overrides(&preset.overrides),
            },
            None => Self::default(),
        }
    }

    /// Start a new preset; the id is derived from the name
    pub fn create(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: derive_preset_id(&name),
            name,
            overrides: OverrideEditor::new(),
        }
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.id.is_empty() {
            errors.push(FieldError::MissingField("preset id"));
        }
        for error in self.overrides.validate().errors() {
            errors.push(error.clone());
        }
        errors
    }

    /// The full preset object this editor would submit
    pub fn build(&self) -> Result<Preset> {
        self.validate().into_result()?;
        Ok(Preset {
            id: self.id.clone(),
            name: self.name.clone(),
            overrides: self.overrides.coerced(),
        })
    }
}
