use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;

/// Configuration file looked up when `CONFIG_PATH` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config.ini";

/// Prefix of environment variables overriding file values,
/// e.g. `DEEZER_SKILL_MQTT__HOST=192.168.1.20`
pub const ENV_PREFIX: &str = "DEEZER_SKILL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub deezer: DeezerConfig,
    pub skill: SkillConfig,
}

/// Broker connection settings.
///
/// The broker always runs on the master device, so a skill installed on a
/// satellite has to point `host` at the master.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub keep_alive_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeezerConfig {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

/// Intent wiring and the phrases spoken back to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    pub intent_name: String,
    pub slot_name: String,
    pub default_track: String,
    pub not_found_phrase: String,
    pub no_identifier_phrase: String,
    pub malformed_phrase: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            username: None,
            password: None,
            client_id: None,
            keep_alive_secs: 30,
        }
    }
}

impl Default for DeezerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deezer.com".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            intent_name: "fabio35:playSong".to_string(),
            slot_name: "musicTrack".to_string(),
            default_track: "obladi oblada".to_string(),
            not_found_phrase: "je n'ai pas trouvé de chanson portant ce titre".to_string(),
            no_identifier_phrase: "pas d'identifiant".to_string(),
            malformed_phrase: "arg".to_string(),
        }
    }
}

impl MqttConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configured client id, or a fresh random one
    pub fn client_id(&self) -> String {
        match self.client_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("deezer-skill-{}", Uuid::new_v4()),
        }
    }

    /// Username/password pair, only when a non-empty username is set
    pub fn credentials(&self) -> Option<(String, String)> {
        match self.username.as_deref() {
            Some(user) if !user.is_empty() => Some((
                user.to_string(),
                self.password.clone().unwrap_or_default(),
            )),
            _ => None,
        }
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.max(5))
    }
}

impl DeezerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from an INI file layered under `DEEZER_SKILL_*`
    /// environment overrides. A missing file is not an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut builder = ::config::Config::builder();

        if path.exists() {
            let content = read_ini(path)?;
            builder = builder.add_source(::config::File::from_str(
                &content,
                ::config::FileFormat::Ini,
            ));
        } else {
            debug!("Configuration file not found: {}", path.display());
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Like [`Config::load`], but any failure falls back to the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

/// Read the INI text, dropping a UTF-8 BOM and expanding `${VAR}` references
/// from the environment. Unknown variables are left as written.
fn read_ini(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let (content, _, _) = encoding_rs::UTF_8.decode(&bytes);
    Ok(substitute_env(&content))
}

fn substitute_env(content: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\$\{(\w+)\}").unwrap())
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_ini(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn missing_file_gives_defaults() {
        let config = Config::load("/nonexistent/deezer-skill/config.ini").unwrap();
        assert_eq!(config.mqtt.address(), "localhost:1883");
        assert_eq!(config.deezer.base_url, "https://api.deezer.com");
        assert_eq!(config.skill.intent_name, "fabio35:playSong");
        assert_eq!(config.skill.slot_name, "musicTrack");
    }

    #[test]
    #[serial]
    fn reads_sections_and_keeps_defaults_for_the_rest() {
        let file = write_ini(
            "[secret]\n\n[global]\n\n[mqtt]\nhost = 192.168.1.20\nport = 1884\n\n[deezer]\ntimeout_secs = 7\n",
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.mqtt.address(), "192.168.1.20:1884");
        assert_eq!(config.deezer.timeout(), Some(Duration::from_secs(7)));
        assert_eq!(config.deezer.base_url, "https://api.deezer.com");
        assert_eq!(config.skill.default_track, "obladi oblada");
    }

    #[test]
    #[serial]
    fn expands_environment_variables() {
        std::env::set_var("DEEZER_SKILL_TEST_BROKER", "master.local");
        let file = write_ini("[mqtt]\nhost = ${DEEZER_SKILL_TEST_BROKER}\n");
        let config = Config::load(file.path()).unwrap();
        std::env::remove_var("DEEZER_SKILL_TEST_BROKER");
        assert_eq!(config.mqtt.host, "master.local");
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        let file = write_ini("[mqtt]\nhost = from-file\n");
        std::env::set_var("DEEZER_SKILL_MQTT__HOST", "from-env");
        let config = Config::load(file.path());
        std::env::remove_var("DEEZER_SKILL_MQTT__HOST");
        assert_eq!(config.unwrap().mqtt.host, "from-env");
    }

    #[test]
    #[serial]
    fn unparsable_file_falls_back_to_defaults() {
        let file = write_ini("[mqtt]\nport = not-a-port\n");
        assert!(Config::load(file.path()).is_err());
        let config = Config::load_or_default(file.path());
        assert_eq!(config.mqtt.port, 1883);
    }

    #[test]
    #[serial]
    fn substitution_is_repeatable() {
        std::env::set_var("DEEZER_SKILL_TEST_PORT", "1885");
        let first = substitute_env("port = ${DEEZER_SKILL_TEST_PORT}");
        let second = substitute_env("[mqtt]\nport=${DEEZER_SKILL_TEST_PORT}");
        std::env::remove_var("DEEZER_SKILL_TEST_PORT");
        assert_eq!(first, "port = 1885");
        assert_eq!(second, "[mqtt]\nport=1885");
    }

    #[test]
    fn unknown_variables_are_left_untouched() {
        assert_eq!(
            substitute_env("host = ${DEEZER_SKILL_SURELY_UNSET_VAR}"),
            "host = ${DEEZER_SKILL_SURELY_UNSET_VAR}"
        );
    }

    #[test]
    fn credentials_require_a_username() {
        let mut mqtt = MqttConfig::default();
        assert!(mqtt.credentials().is_none());
        mqtt.username = Some("snips".to_string());
        assert_eq!(
            mqtt.credentials(),
            Some(("snips".to_string(), String::new()))
        );
    }

    #[test]
    fn generated_client_ids_are_unique() {
        let mqtt = MqttConfig::default();
        assert_ne!(mqtt.client_id(), mqtt.client_id());
        assert!(mqtt.client_id().starts_with("deezer-skill-"));
    }
}
