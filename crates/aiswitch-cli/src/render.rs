//! Human-readable output

use aiswitch_core::log::LogPage;
use aiswitch_core::provider::{BackendConfig, Provider};
use aiswitch_core::transcript::{Transcript, TranscriptStatus};
use aiswitch_core::ValidationErrors;
use std::io::{self, Write};

/// Hide all but the last four characters of a credential
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        0 => String::new(),
        n if n <= 8 => "*".repeat(8),
        n => format!("{}{}", "*".repeat(8), chars[n - 4..].iter().collect::<String>()),
    }
}

fn shown_key(key: &str, reveal: bool) -> String {
    if reveal { key.to_string() } else { mask_key(key) }
}

pub fn write_providers(
    out: &mut impl Write,
    providers: &[Provider],
    active: Option<&str>,
    reveal: bool,
) -> io::Result<()> {
    if providers.is_empty() {
        return writeln!(out, "No providers configured.");
    }

    for provider in providers {
        let marker = if active == Some(provider.id.as_str()) { "*" } else { " " };
        writeln!(out, "{} {} ({})", marker, provider.id, provider.name)?;
        writeln!(out, "    url:     {}", provider.api_url)?;
        writeln!(out, "    key:     {}", shown_key(&provider.api_key, reveal))?;
        let presets: Vec<&str> = provider.preset_ids().collect();
        if !presets.is_empty() {
            writeln!(out, "    presets: {}", presets.join(", "))?;
        }
        if let Some(preset) = provider.active_preset() {
            writeln!(out, "    preset:  {}", preset.id)?;
        }
    }
    Ok(())
}

pub fn write_presets(out: &mut impl Write, provider: &Provider) -> io::Result<()> {
    if provider.presets.is_empty() {
        return writeln!(out, "Provider '{}' has no presets.", provider.id);
    }

    for preset in &provider.presets {
        let marker = if provider.preset.as_deref() == Some(preset.id.as_str()) {
            "*"
        } else {
            " "
        };
        writeln!(out, "{} {} ({})", marker, preset.id, preset.name)?;
        for (key, value) in preset.overrides.iter() {
            writeln!(out, "    {} = {}", key, value)?;
        }
    }
    Ok(())
}

pub fn write_log_page(
    out: &mut impl Write,
    page: &LogPage,
    page_index: u32,
    page_size: u32,
) -> io::Result<()> {
    writeln!(
        out,
        "{:>6}  {:<19}  {:<12}  {:<20}  {:<10}  {:>7}  {:>7}  {:>8}  {:>6}",
        "ID", "REQUESTED", "PROVIDER", "MODEL", "KIND", "PROMPT", "COMPL", "LATENCY", "TOK/S"
    )?;

    for row in &page.logs {
        let latency = row
            .latency()
            .map(|d| format!("{}s", d.num_seconds()))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:>6}  {:<19}  {:<12}  {:<20}  {:<10}  {:>7}  {:>7}  {:>8}  {:>6}",
            row.id,
            row.request_time,
            row.provider_id,
            row.model,
            row.kind(),
            optional(row.prompt_tokens),
            optional(row.completion_tokens),
            latency,
            optional(row.speed),
        )?;
    }

    writeln!(
        out,
        "Page {} of {} ({} entries)",
        page_index + 1,
        page.page_count(page_size).max(1),
        page.row_count
    )
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn write_transcript(out: &mut impl Write, transcript: &Transcript) -> io::Result<()> {
    for message in &transcript.messages {
        writeln!(out, "[{}]", transcript.speaker(&message.role))?;
        writeln!(out, "{}", message.content)?;
        writeln!(out)?;
    }

    match &transcript.status {
        TranscriptStatus::Complete => Ok(()),
        TranscriptStatus::Pending => writeln!(out, "(no response recorded)"),
        TranscriptStatus::UpstreamError(message) => {
            writeln!(out, "(upstream error: {})", message)
        }
    }
}

/// Copy of the backend configuration with every API key masked
pub fn masked_config(config: &BackendConfig, reveal: bool) -> BackendConfig {
    let mut config = config.clone();
    if !reveal {
        for provider in &mut config.providers {
            provider.api_key = mask_key(&provider.api_key);
        }
    }
    config
}

pub fn write_validation(out: &mut impl Write, errors: &ValidationErrors) -> io::Result<()> {
    for error in errors.errors() {
        writeln!(out, "  - {}", error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiswitch_core::transcript::{ChatMessage, Role};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "");
        assert_eq!(mask_key("short"), "********");
        assert_eq!(mask_key("sk-abcdefghijkl"), "********ijkl");
    }

    #[test]
    fn test_providers_mark_active_and_mask() {
        let providers = vec![
            Provider::new("a", "Alpha", "http://a", "sk-secret-value"),
            Provider::new("b", "Beta", "http://b", "none"),
        ];

        let text = render(|out| write_providers(out, &providers, Some("b"), false));
        assert!(text.contains("  a (Alpha)"));
        assert!(text.contains("* b (Beta)"));
        assert!(!text.contains("sk-secret-value"));
        assert!(text.contains("********alue"));

        let revealed = render(|out| write_providers(out, &providers, None, true));
        assert!(revealed.contains("sk-secret-value"));
    }

    #[test]
    fn test_transcript_speakers() {
        let transcript = Transcript {
            model: "llama".to_string(),
            messages: vec![
                ChatMessage::new(Role::System, "be brief"),
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
            ],
            status: TranscriptStatus::Complete,
        };

        let text = render(|out| write_transcript(out, &transcript));
        assert_eq!(
            text,
            "[System]\nbe brief\n\n[You]\nhi\n\n[llama]\nhello\n\n"
        );
    }

    #[test]
    fn test_pending_transcript_notice() {
        let transcript = Transcript {
            model: String::new(),
            messages: vec![ChatMessage::user("hi")],
            status: TranscriptStatus::Pending,
        };
        let text = render(|out| write_transcript(out, &transcript));
        assert!(text.ends_with("(no response recorded)\n"));
    }

    #[test]
    fn test_masked_config() {
        let config = BackendConfig {
            providers: vec![Provider::new("a", "A", "http://a", "sk-0123456789")],
            provider: Some("a".to_string()),
            db_path: None,
        };

        assert_eq!(masked_config(&config, false).providers[0].api_key, "********6789");
        assert_eq!(masked_config(&config, true).providers[0].api_key, "sk-0123456789");
    }

    #[test]
    fn test_log_page_footer() {
        let page: LogPage = serde_json::from_value(serde_json::json!({
            "rowCount": 0,
            "logs": []
        }))
        .unwrap();
        let text = render(|out| write_log_page(out, &page, 0, 50));
        assert!(text.ends_with("Page 1 of 1 (0 entries)\n"));
    }
}
