use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful enterprise assistant.";
pub const DEFAULT_TOKEN_ENV: &str = "KAIWA_TOKEN";

fn default_models() -> Vec<String> {
    vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()]
}

fn default_temperature() -> f64 {
    0.2
}

fn default_stream() -> bool {
    true
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

/// Credential and authorization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token for the gateway. The environment variable named by
    /// `token_env` takes precedence when set.
    #[serde(default)]
    pub token: Option<String>,
    /// Environment variable consulted for the token before the file value.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Directory group ids whose members may use the gateway. Empty means
    /// nobody is authorized until IT fills it in.
    #[serde(default)]
    pub allowed_groups: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: default_token_env(),
            allowed_groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway base URL, e.g. `https://apim.example.com/openai/v1`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Models offered by the gateway; the first entry is the default.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Stream responses incrementally (default) or wait for the full body.
    #[serde(default = "default_stream")]
    pub stream: bool,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            models: default_models(),
            temperature: default_temperature(),
            stream: default_stream(),
            system_prompt: default_system_prompt(),
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Load from `~/.kaiwa/config.toml`. A missing file yields defaults;
    /// the error for an unset base_url or token comes later, when a send
    /// actually needs them.
    pub fn load() -> io::Result<Self> {
        Self::load_from(config_dir()?.join("config.toml"))
    }

    pub fn load_from(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| {
            io::Error::new(
                ErrorKind::InvalidData,
                format!("Invalid config {}: {}", path.display(), e),
            )
        })
    }

    /// The chat-completions endpoint derived from `base_url`.
    pub fn api_url(&self) -> io::Result<String> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            io::Error::new(
                ErrorKind::NotFound,
                "No base_url configured; set base_url in config.toml",
            )
        })?;
        let url = Url::parse(base).map_err(|e| {
            io::Error::new(
                ErrorKind::InvalidInput,
                format!("Invalid base_url '{}': {}", base, e),
            )
        })?;
        Ok(format!("{}/chat/completions", url.as_str().trim_end_matches('/')))
    }

    /// Resolve the bearer token: environment first, then the file value.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(&self.auth.token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.auth.token.clone())
    }
}

pub fn config_dir() -> io::Result<PathBuf> {
    dirs_next::home_dir()
        .map(|home| home.join(".kaiwa"))
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not determine home directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn defaults_match_the_documented_session() {
        let config = Config::default();
        assert_eq!(config.models, vec!["gpt-4o-mini", "gpt-4o"]);
        assert_eq!(config.temperature, 0.2);
        assert!(config.stream);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(config.auth.allowed_groups.is_empty());
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let config: Config = toml::from_str(
            r#"
            base_url = "https://gw.example.com/v1"
            models = ["gpt-4o"]

            [auth]
            token = "file-token"
            allowed_groups = ["11111111-aaaa"]
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://gw.example.com/v1"));
        assert_eq!(config.models, vec!["gpt-4o"]);
        assert_eq!(config.temperature, 0.2);
        assert!(config.stream);
        assert_eq!(config.auth.token.as_deref(), Some("file-token"));
        assert_eq!(config.auth.allowed_groups, vec!["11111111-aaaa"]);
    }

    #[test]
    fn api_url_joins_without_doubling_slashes() {
        let mut config = Config::default();
        config.base_url = Some("https://gw.example.com/v1/".to_string());
        assert_eq!(
            config.api_url().unwrap(),
            "https://gw.example.com/v1/chat/completions"
        );

        config.base_url = Some("https://gw.example.com/v1".to_string());
        assert_eq!(
            config.api_url().unwrap(),
            "https://gw.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn api_url_requires_a_valid_base() {
        let config = Config::default();
        assert_eq!(config.api_url().unwrap_err().kind(), ErrorKind::NotFound);

        let mut config = Config::default();
        config.base_url = Some("not a url".to_string());
        assert_eq!(config.api_url().unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn load_from_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("config.toml")).unwrap();
        assert_eq!(config.models, vec!["gpt-4o-mini", "gpt-4o"]);
    }

    #[test]
    fn load_from_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "models = 3").unwrap();
        assert_eq!(
            Config::load_from(&path).unwrap_err().kind(),
            ErrorKind::InvalidData
        );
    }

    #[test]
    #[serial]
    fn resolve_token_prefers_environment() {
        let mut config = Config::default();
        config.auth.token = Some("file-token".to_string());
        config.auth.token_env = "KAIWA_TEST_TOKEN".to_string();

        unsafe { std::env::remove_var("KAIWA_TEST_TOKEN") };
        assert_eq!(config.resolve_token().as_deref(), Some("file-token"));

        unsafe { std::env::set_var("KAIWA_TEST_TOKEN", "env-token") };
        assert_eq!(config.resolve_token().as_deref(), Some("env-token"));

        unsafe { std::env::set_var("KAIWA_TEST_TOKEN", "") };
        assert_eq!(config.resolve_token().as_deref(), Some("file-token"));

        unsafe { std::env::remove_var("KAIWA_TEST_TOKEN") };
    }
}
