//! Key List Configuration
//!
//! Reads the initial key pool from the `LLM_KEYS` environment variable and
//! writes it back to an env file.

use crate::error::{GatewayError, Result};
use crate::router::Credential;
use std::path::Path;

/// Environment variable holding the JSON key list
pub const LLM_KEYS_ENV: &str = "LLM_KEYS";

/// Parse a JSON array of `{provider, model, api_key}` objects
pub fn parse_credentials(json: &str) -> Result<Vec<Credential>> {
    let credentials: Vec<Credential> = serde_json::from_str(json)
        .map_err(|e| GatewayError::Config(format!("Failed to parse {}: {}", LLM_KEYS_ENV, e)))?;

    for (idx, credential) in credentials.iter().enumerate() {
        credential.validate().map_err(|e| {
            GatewayError::Config(format!("Invalid entry {} in {}: {}", idx, LLM_KEYS_ENV, e))
        })?;
    }

    Ok(credentials)
}

/// Load credentials from `LLM_KEYS`; an unset variable yields an empty pool
pub fn load_credentials_from_env() -> Result<Vec<Credential>> {
    match std::env::var(LLM_KEYS_ENV) {
        Ok(json) if !json.trim().is_empty() => parse_credentials(&json),
        Ok(_) | Err(std::env::VarError::NotPresent) => Ok(Vec::new()),
        Err(e) => Err(GatewayError::Config(format!(
            "Failed to read {}: {}",
            LLM_KEYS_ENV, e
        ))),
    }
}

/// Persist credentials as a single `LLM_KEYS=` line in an env file
///
/// Other lines are preserved in order; any previous `LLM_KEYS=` line is
/// dropped and the new one is appended at the end.
pub fn save_credentials(path: impl AsRef<Path>, credentials: &[Credential]) -> Result<()> {
    let path = path.as_ref();
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(GatewayError::Persist(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    let prefix = format!("{}=", LLM_KEYS_ENV);
    let mut content: String = existing
        .lines()
        .filter(|line| !line.trim_start().starts_with(&prefix))
        .map(|line| format!("{}\n", line))
        .collect();

    let json = serde_json::to_string(credentials)
        .map_err(|e| GatewayError::Persist(format!("Failed to serialize keys: {}", e)))?;
    content.push_str(&prefix);
    content.push_str(&json);
    content.push('\n');

    std::fs::write(path, content).map_err(|e| {
        GatewayError::Persist(format!("Failed to write {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_credentials() {
        let json = r#"[
            {"provider": "openai", "model": "gpt-3.5-turbo", "api_key": "sk-1"},
            {"provider": "anthropic", "model": "claude-3-opus-20240229", "api_key": "sk-ant-1"}
        ]"#;

        let credentials = parse_credentials(json).unwrap();
        assert_eq!(credentials.len(), 2);
        assert_eq!(credentials[1].provider, "anthropic");
        assert_eq!(credentials[1].secret, "sk-ant-1");
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(matches!(
            parse_credentials(r#"{"provider": "openai"}"#),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(
            parse_credentials(r#"[{"provider": "openai", "model": "gpt-4o"}]"#),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(
            parse_credentials("not json"),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_fields() {
        let json = r#"[{"provider": "openai", "model": "", "api_key": "sk-1"}]"#;
        assert!(matches!(parse_credentials(json), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_parse_rejects_secret_unusable_as_header() {
        let json = r#"[{"provider": "openai", "model": "gpt-4o", "api_key": "sk-1\r\nx: y"}]"#;
        let err = parse_credentials(json).unwrap_err();
        assert!(err.to_string().contains("entry 0"));
    }

    #[test]
    fn test_save_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        let credentials = vec![Credential::new("openai", "gpt-4o", "k1").unwrap()];

        save_credentials(&path, &credentials).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "LLM_KEYS=[{\"provider\":\"openai\",\"model\":\"gpt-4o\",\"api_key\":\"k1\"}]\n"
        );
    }

    #[test]
    fn test_save_replaces_previous_line_and_keeps_others() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "FOO=bar\nLLM_KEYS=[]\nBAZ=qux\n").unwrap();

        let credentials = vec![
            Credential::new("openai", "gpt-4o", "k1").unwrap(),
            Credential::new("openai", "gpt-4o", "k2").unwrap(),
        ];
        save_credentials(&path, &credentials).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "FOO=bar");
        assert_eq!(lines[1], "BAZ=qux");
        assert!(lines[2].starts_with("LLM_KEYS="));

        let saved = parse_credentials(lines[2].trim_start_matches("LLM_KEYS=")).unwrap();
        assert_eq!(saved, credentials);
    }
}
