//! Mutation payloads issued by the console and the cached reads they invalidate

use crate::provider::{Preset, Provider, ProviderPatch};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cached read that a mutation can make stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Providers,
    ActiveProvider,
}

/// Global active-provider selection change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveProviderAction {
    Set(String),
    Clear,
}

impl ActiveProviderAction {
    /// Action for the power control of `clicked`: clear when it is already
    /// the active provider, otherwise make it active.
    pub fn toggle(active: Option<&str>, clicked: &str) -> Self {
        if active == Some(clicked) {
            ActiveProviderAction::Clear
        } else {
            ActiveProviderAction::Set(clicked.to_string())
        }
    }

    /// Selected provider id, `None` for clear
    pub fn provider_id(&self) -> Option<&str> {
        match self {
            ActiveProviderAction::Set(id) => Some(id),
            ActiveProviderAction::Clear => None,
        }
    }

    /// Raw request body: the id, or the empty string to clear
    pub fn body(&self) -> String {
        self.provider_id().unwrap_or_default().to_string()
    }
}

/// Every change the console can ask the backend to make
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddProvider {
        id: String,
        provider: Provider,
    },
    UpdateProvider {
        id: String,
        patch: ProviderPatch,
    },
    DeleteProvider {
        id: String,
    },
    SetActiveProvider(ActiveProviderAction),
    AddPreset {
        provider_id: String,
        preset: Preset,
    },
    UpdatePreset {
        provider_id: String,
        preset_id: String,
        preset: Preset,
    },
    SetActivePreset {
        provider_id: String,
        preset_id: Option<String>,
    },
}

impl Mutation {
    /// Cached reads to drop once this mutation has been sent
    pub fn invalidates(&self) -> &'static [CacheTag] {
        match self {
            Mutation::AddProvider { .. }
            | Mutation::UpdateProvider { .. }
            | Mutation::AddPreset { .. }
            | Mutation::UpdatePreset { .. }
            | Mutation::SetActivePreset { .. } => &[CacheTag::Providers],
            Mutation::SetActiveProvider(_) => &[CacheTag::ActiveProvider],
            // Deleting the active provider also clears the selection
            Mutation::DeleteProvider { .. } => &[CacheTag::Providers, CacheTag::ActiveProvider],
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::AddProvider { .. } => "add_provider",
            Mutation::UpdateProvider { .. } => "update_provider",
            Mutation::DeleteProvider { .. } => "delete_provider",
            Mutation::SetActiveProvider(_) => "set_active_provider",
            Mutation::AddPreset { .. } => "add_preset",
            Mutation::UpdatePreset { .. } => "update_preset",
            Mutation::SetActivePreset { .. } => "set_active_preset",
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::AddProvider { id, .. } => write!(f, "create provider '{}'", id),
            Mutation::UpdateProvider { id, .. } => write!(f, "update provider '{}'", id),
            Mutation::DeleteProvider { id } => write!(f, "delete provider '{}'", id),
            Mutation::SetActiveProvider(ActiveProviderAction::Set(id)) => {
                write!(f, "activate provider '{}'", id)
            }
            Mutation::SetActiveProvider(ActiveProviderAction::Clear) => {
                write!(f, "clear active provider")
            }
            Mutation::AddPreset {
                provider_id,
                preset,
            } => write!(f, "create preset '{}' on '{}'", preset.id, provider_id),
            Mutation::UpdatePreset {
                provider_id,
                preset_id,
                ..
            } => write!(f, "update preset '{}' on '{}'", preset_id, provider_id),
            Mutation::SetActivePreset {
                provider_id,
                preset_id: Some(preset_id),
            } => write!(f, "select preset '{}' on '{}'", preset_id, provider_id),
            Mutation::SetActivePreset {
                provider_id,
                preset_id: None,
            } => write!(f, "clear preset on '{}'", provider_id),
        }
    }
}

/// Acknowledgement body returned by every mutation endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub message: String,
}

impl MutationAck {
    /// The backend answers 200 for rejections too; only its success messages
    /// say "successfully".
    pub fn is_success(&self) -> bool {
        self.message.is_empty() || self.message.contains("successfully")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_active_provider() {
        assert_eq!(
            ActiveProviderAction::toggle(Some("a"), "a"),
            ActiveProviderAction::Clear
        );
        assert_eq!(
            ActiveProviderAction::toggle(Some("a"), "b"),
            ActiveProviderAction::Set("b".to_string())
        );
        assert_eq!(
            ActiveProviderAction::toggle(None, "b"),
            ActiveProviderAction::Set("b".to_string())
        );
    }

    #[test]
    fn test_active_provider_body() {
        assert_eq!(ActiveProviderAction::Set("x".into()).body(), "x");
        assert_eq!(ActiveProviderAction::Clear.body(), "");
        assert_eq!(ActiveProviderAction::Clear.provider_id(), None);
    }

    #[test]
    fn test_invalidation_tags() {
        let delete = Mutation::DeleteProvider { id: "a".into() };
        assert_eq!(
            delete.invalidates(),
            &[CacheTag::Providers, CacheTag::ActiveProvider]
        );

        let activate = Mutation::SetActiveProvider(ActiveProviderAction::Clear);
        assert_eq!(activate.invalidates(), &[CacheTag::ActiveProvider]);

        let preset = Mutation::AddPreset {
            provider_id: "a".into(),
            preset: Preset::named("x"),
        };
        assert_eq!(preset.invalidates(), &[CacheTag::Providers]);
    }

    #[test]
    fn test_mutation_display() {
        let m = Mutation::UpdatePreset {
            provider_id: "local".into(),
            preset_id: "fast".into(),
            preset: Preset::named("Fast"),
        };
        assert_eq!(m.to_string(), "update preset 'fast' on 'local'");
        assert_eq!(m.kind(), "update_preset");
    }

    #[test]
    fn test_mutation_ack() {
        let ok: MutationAck =
            serde_json::from_str(r#"{"message": "Service added successfully"}"#).unwrap();
        assert!(ok.is_success());

        let rejected: MutationAck =
            serde_json::from_str(r#"{"message": "Service already exists"}"#).unwrap();
        assert!(!rejected.is_success());

        assert!(MutationAck::default().is_success());
    }
}
