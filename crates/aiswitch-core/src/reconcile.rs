//! Turning submitted forms into mutations
//!
//! Each submit function validates locally first. Nothing that fails here is
//! ever sent to the backend.

use crate::editor::PresetEditor;
use crate::error::{Error, FieldError, Result, ValidationErrors};
use crate::mutation::Mutation;
use crate::provider::{Provider, ProviderPatch};
use tracing::debug;

/// Decide between update and create for the edited preset.
///
/// The preset is an update when its id already exists on the provider, a
/// create otherwise. The whole preset object is sent either way.
pub fn submit_preset(provider: &Provider, editor: &PresetEditor) -> Result<Mutation> {
    let preset = editor.build()?;

    let mutation = if provider.has_preset(&preset.id) {
        Mutation::UpdatePreset {
            provider_id: provider.id.clone(),
            preset_id: preset.id.clone(),
            preset,
        }
    } else {
        Mutation::AddPreset {
            provider_id: provider.id.clone(),
            preset,
        }
    };

    debug!(provider = %provider.id, kind = mutation.kind(), "Preset submission reconciled");
    Ok(mutation)
}

/// Select or clear the active preset of a provider
pub fn select_preset(provider: &Provider, preset_id: Option<&str>) -> Result<Mutation> {
    if let Some(id) = preset_id
        && !provider.has_preset(id)
    {
        return Err(Error::Validation(
            FieldError::UnknownPreset(id.to_string()).into(),
        ));
    }

    Ok(Mutation::SetActivePreset {
        provider_id: provider.id.clone(),
        preset_id: preset_id.map(str::to_string),
    })
}

/// Whether the provider form creates a provider or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { original_id: String },
}

/// Provider create/edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderForm {
    pub mode: FormMode,
    pub id: String,
    pub name: String,
    pub api_url: String,
    pub api_key: String,
}

impl ProviderForm {
    /// Empty form for a new provider
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            id: String::new(),
            name: String::new(),
            api_url: String::new(),
            api_key: String::new(),
        }
    }

    /// Form pre-filled from an existing provider
    pub fn edit(provider: &Provider) -> Self {
        Self {
            mode: FormMode::Edit {
                original_id: provider.id.clone(),
            },
            id: provider.id.clone(),
            name: provider.name.clone(),
            api_url: provider.api_url.clone(),
            api_key: provider.api_key.clone(),
        }
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let required = [
            ("id", &self.id),
            ("name", &self.name),
            ("api_url", &self.api_url),
            ("api_key", &self.api_key),
        ];
        for (field, value) in required {
            if value.is_empty() {
                errors.push(FieldError::MissingField(field));
            }
        }

        if let FormMode::Edit { original_id } = &self.mode
            && !self.id.is_empty()
            && self.id != *original_id
        {
            errors.push(FieldError::IdentityChange {
                original: original_id.clone(),
                attempted: self.id.clone(),
            });
        }

        errors
    }

    /// Create carries the full provider with no presets; edit carries only
    /// name, api_url and api_key for the original id.
    pub fn submit(&self) -> Result<Mutation> {
        self.validate().into_result()?;

        Ok(match &self.mode {
            FormMode::Create => Mutation::AddProvider {
                id: self.id.clone(),
                provider: Provider::new(
                    self.id.clone(),
                    self.name.clone(),
                    self.api_url.clone(),
                    self.api_key.clone(),
                ),
            },
            FormMode::Edit { original_id } => Mutation::UpdateProvider {
                id: original_id.clone(),
                patch: ProviderPatch {
                    name: self.name.clone(),
                    api_url: self.api_url.clone(),
                    api_key: self.api_key.clone(),
                },
            },
        })
    }
}

/// A delete that has been requested but not yet confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending delete does nothing until confirmed"]
pub struct PendingDelete {
    provider_id: String,
}

impl PendingDelete {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
        }
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// The only way to obtain a delete mutation
    pub fn confirm(self) -> Mutation {
        Mutation::DeleteProvider {
            id: self.provider_id,
        }
    }

    /// Dropping the request has no side effect
    pub fn cancel(self) {}
}
