//! Command execution against the console store

use crate::cli::{Commands, ConfigCommand, LogCommand, PresetCommand, ProviderCommand};
use crate::render;
use aiswitch_client::ConsoleStore;
use aiswitch_core::editor::PresetEditor;
use aiswitch_core::log::{LogColumn, LogId, LogQuery, LogSort};
use aiswitch_core::mutation::{ActiveProviderAction, Mutation};
use aiswitch_core::provider::Provider;
use aiswitch_core::reconcile::{PendingDelete, ProviderForm, select_preset, submit_preset};
use anyhow::{Context, anyhow, bail};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, warn};

pub async fn run(
    command: Commands,
    store: &Arc<ConsoleStore>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Commands::Providers(command) => providers(command, store, input, out).await,
        Commands::Presets(command) => presets(command, store, out).await,
        Commands::Logs(command) => logs(command, store, out).await,
        Commands::Config(ConfigCommand::Show { reveal }) => {
            let config = store.api().config().await?;
            serde_json::to_writer_pretty(&mut *out, &render::masked_config(&config, reveal))?;
            writeln!(out)?;
            Ok(())
        }
    }
}

async fn require_provider(store: &ConsoleStore, id: &str) -> anyhow::Result<Provider> {
    store
        .provider(id)
        .await?
        .ok_or_else(|| anyhow!("Unknown provider '{}'", id))
}

async fn send(
    store: &ConsoleStore,
    mutation: Mutation,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let description = mutation.to_string();
    let ack = store
        .submit(mutation)
        .await
        .with_context(|| format!("Failed to {}", description))?;
    writeln!(out, "{}", ack.message)?;
    Ok(())
}

/// Ask a y/N question; anything but "y" or "yes" is a no
pub fn confirm(
    input: &mut impl BufRead,
    out: &mut impl Write,
    question: &str,
) -> std::io::Result<bool> {
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn providers(
    command: ProviderCommand,
    store: &Arc<ConsoleStore>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        ProviderCommand::List { reveal } => {
            let (providers, active) = store.overview().await?;
            render::write_providers(out, &providers, active.as_deref(), reveal)?;
        }
        ProviderCommand::Add { id, name, url, key } => {
            let mut form = ProviderForm::create();
            form.id = id;
            form.name = name;
            form.api_url = url;
            form.api_key = key;
            send(store, form.submit()?, out).await?;
        }
        ProviderCommand::Edit {
            provider,
            id,
            name,
            url,
            key,
        } => {
            let provider = require_provider(store, &provider).await?;
            let mut form = ProviderForm::edit(&provider);
            if let Some(id) = id {
                form.id = id;
            }
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(url) = url {
                form.api_url = url;
            }
            if let Some(key) = key {
                form.api_key = key;
            }
            send(store, form.submit()?, out).await?;
        }
        ProviderCommand::Delete { provider, yes } => {
            let pending = PendingDelete::new(provider);
            let question = format!("Delete provider '{}'?", pending.provider_id());
            if !yes && !confirm(input, out, &question)? {
                pending.cancel();
                writeln!(out, "Cancelled.")?;
                return Ok(());
            }
            send(store, pending.confirm(), out).await?;
        }
        ProviderCommand::Toggle { provider } => {
            let active = store.active_provider().await?;
            let action = ActiveProviderAction::toggle(active.as_deref(), &provider);
            send(store, Mutation::SetActiveProvider(action), out).await?;
        }
        ProviderCommand::Activate { provider } => {
            let action = ActiveProviderAction::Set(provider);
            send(store, Mutation::SetActiveProvider(action), out).await?;
        }
        ProviderCommand::Deactivate => {
            let action = ActiveProviderAction::Clear;
            send(store, Mutation::SetActiveProvider(action), out).await?;
        }
    }
    Ok(())
}

async fn presets(
    command: PresetCommand,
    store: &Arc<ConsoleStore>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        PresetCommand::List { provider } => {
            let provider = require_provider(store, &provider).await?;
            render::write_presets(out, &provider)?;
        }
        PresetCommand::Edit {
            provider,
            preset,
            create,
            id,
            name,
            set,
            unset,
        } => {
            let provider = require_provider(store, &provider).await?;

            let mut editor = match (create, preset) {
                (Some(name), _) => PresetEditor::create(name),
                (None, Some(preset_id)) => {
                    if !provider.has_preset(&preset_id) {
                        bail!("Provider '{}' has no preset '{}'", provider.id, preset_id);
                    }
                    PresetEditor::load(&provider, Some(&preset_id))
                }
                (None, None) => PresetEditor::load(&provider, provider.preset.as_deref()),
            };

            if let Some(id) = id {
                editor.id = id;
            }
            if let Some(name) = name {
                editor.name = name;
            }
            let mut removed = Vec::new();
            for key in &unset {
                if editor.overrides.remove_key(key) > 0 {
                    removed.push(key.as_str());
                }
            }
            for (key, value) in set {
                editor.overrides.upsert(&key, value);
            }

            let mutation = submit_preset(&provider, &editor)?;
            let updating = matches!(mutation, Mutation::UpdatePreset { .. });
            debug!("Submitting preset mutation: {}", mutation);
            let ack = store
                .submit(mutation)
                .await
                .context("Failed to save preset")?;
            writeln!(out, "{}", ack.message)?;

            // Preset updates merge into the stored overrides
            if updating && !removed.is_empty() {
                warn!("Unset keys are kept by the backend: {}", removed.join(", "));
                writeln!(
                    out,
                    "Note: the backend keeps overrides missing from an update; still stored: {}",
                    removed.join(", ")
                )?;
            }
        }
        PresetCommand::Use { provider, preset } => {
            let provider = require_provider(store, &provider).await?;
            send(store, select_preset(&provider, preset.as_deref())?, out).await?;
        }
    }
    Ok(())
}

/// Build the listing query from 1-based page number and sort flags.
/// `--desc` alone sorts by timestamp.
pub fn log_query(page: u32, size: u32, sort: Option<&str>, desc: bool) -> anyhow::Result<LogQuery> {
    if page == 0 {
        bail!("Pages start at 1");
    }
    if size == 0 {
        bail!("Page size must be at least 1");
    }

    let sort = match sort {
        Some(column) => Some(LogSort {
            column: column.parse::<LogColumn>()?,
            descending: desc,
        }),
        None if desc => Some(LogSort {
            column: LogColumn::Timestamp,
            descending: true,
        }),
        None => None,
    };

    Ok(LogQuery {
        page: page - 1,
        size,
        sort,
    })
}

async fn logs(
    command: LogCommand,
    store: &Arc<ConsoleStore>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        LogCommand::List {
            page,
            size,
            sort,
            desc,
        } => {
            let query = log_query(page, size, sort.as_deref(), desc)?;
            let result = store.logs(&query).await?;
            render::write_log_page(out, &result, query.page, query.size)?;
        }
        LogCommand::Show { id, json } => {
            let id = LogId::new(id);
            if json {
                let entry = store
                    .api()
                    .log(&id)
                    .await?
                    .ok_or(aiswitch_core::Error::NoData)?;
                serde_json::to_writer_pretty(&mut *out, &entry)?;
                writeln!(out)?;
            } else {
                let transcript = store
                    .transcript(&id)
                    .await
                    .with_context(|| format!("Failed to load log entry {}", id))?;
                render::write_transcript(out, &transcript)?;
            }
        }
    }
    Ok(())
}
