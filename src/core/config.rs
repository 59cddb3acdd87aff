/// Configuration Loading and Environment Management
///
/// Server configuration is resolved in three layers: built-in profile
/// defaults, an optional YAML file, and environment variables (highest
/// precedence). The YAML file may also carry a `tools` section with
/// tool-specific settings:
///
/// ```yaml
/// server:
///   profile: directory
///   transport: stdio
///   port: 8000
/// tools:
///   echo:
///     prefix: "Echo: "
/// ```

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::ServerError;

/// Config file picked up from the working directory when `MCP_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "mcpdemo.yaml";

/// A named tool set with its own server defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// File operations, current directory and echo
    Directory,
    /// Four arithmetic operations
    Math,
    /// Static weather lookup
    Weather,
    /// Greeting, addition and word counting
    Minimal,
    /// Every tool set at once
    All,
}

impl Profile {
    pub const ALL: [Profile; 5] = [
        Profile::Directory,
        Profile::Math,
        Profile::Weather,
        Profile::Minimal,
        Profile::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Directory => "directory",
            Profile::Math => "math",
            Profile::Weather => "weather",
            Profile::Minimal => "minimal",
            Profile::All => "all",
        }
    }

    pub fn default_name(&self) -> &'static str {
        match self {
            Profile::Directory => "Zee MCP Directory Server",
            Profile::Math => "Math MCP Server",
            Profile::Weather => "Weather MCP Server",
            Profile::Minimal => "Minimal Demo Server",
            Profile::All => "mcpdemo",
        }
    }

    pub fn default_transport(&self) -> Transport {
        match self {
            Profile::Directory | Profile::Minimal => Transport::Stdio,
            Profile::Math | Profile::Weather => Transport::Http,
            Profile::All => Transport::Both,
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Profile::Weather => 8001,
            _ => 8000,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ServerError::InvalidSetting {
                name: "profile",
                value: s.to_string(),
                reason: "expected one of directory, math, weather, minimal, all".to_string(),
            })
    }
}

/// How the server talks to its clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Line-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
    /// STDIO and HTTP concurrently
    Both,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Http => "http",
            Transport::Both => "both",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" | "streamable-http" => Ok(Transport::Http),
            "both" => Ok(Transport::Both),
            _ => Err(ServerError::InvalidSetting {
                name: "transport",
                value: s.to_string(),
                reason: "expected stdio, http, streamable-http or both".to_string(),
            }),
        }
    }
}

/// Raw `server` section of the YAML file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub name: Option<String>,
    pub version: Option<String>,
    pub profile: Option<String>,
    pub transport: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub workers: Option<usize>,
}

/// Parsed YAML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerSection,
    /// Tool name -> tool-specific settings
    pub tools: HashMap<String, Value>,
}

impl FileConfig {
    pub fn from_yaml(text: &str, origin: &Path) -> Result<Self, ServerError> {
        serde_yaml::from_str(text).map_err(|source| ServerError::ConfigParse {
            path: origin.display().to_string(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text, path)
    }
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub version: String,
    pub profile: Profile,
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Tool name -> tool-specific settings from the config file
    pub tools: HashMap<String, Value>,
    /// Config file the settings came from, if any
    pub source: Option<PathBuf>,
}

impl Config {
    /// Built-in defaults for a profile, without consulting files or environment.
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            name: profile.default_name().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            profile,
            transport: profile.default_transport(),
            host: "0.0.0.0".to_string(),
            port: profile.default_port(),
            workers: default_workers(),
            tools: HashMap::new(),
            source: None,
        }
    }

    /// Load configuration from the process environment and the config file.
    pub fn load() -> Result<Self, ServerError> {
        Self::load_with_profile(None)
    }

    /// Like [`Config::load`], but `profile` (when given) takes precedence
    /// over `MCP_PROFILE` and the file, so the profile's own defaults apply.
    pub fn load_with_profile(profile: Option<Profile>) -> Result<Self, ServerError> {
        let env = profile_override(|key: &str| std::env::var(key).ok(), profile);
        Self::load_from(env, Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Locate and read the config file, then resolve against `env`.
    ///
    /// `MCP_CONFIG` names the YAML file explicitly and it must exist;
    /// otherwise `default_file` is used when present.
    ///
    /// # Arguments
    /// * `env` - Environment lookup, highest precedence
    /// * `default_file` - File to try when `MCP_CONFIG` is unset
    pub fn load_from(
        env: impl Fn(&str) -> Option<String>,
        default_file: &Path,
    ) -> Result<Self, ServerError> {
        let (file, source) = match env("MCP_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                (FileConfig::read(&path)?, Some(path))
            }
            None if default_file.is_file() => {
                (FileConfig::read(default_file)?, Some(default_file.to_path_buf()))
            }
            None => (FileConfig::default(), None),
        };
        Self::resolve(file, source, env)
    }

    /// Merge a parsed config file with environment lookups.
    ///
    /// The profile is resolved first because it supplies the defaults for
    /// name, transport and port.
    pub fn resolve(
        file: FileConfig,
        source: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ServerError> {
        let server = file.server;

        let profile = match env("MCP_PROFILE").or(server.profile) {
            Some(p) => p.parse()?,
            None => Profile::Directory,
        };
        let mut config = Self::for_profile(profile);
        config.tools = file.tools;
        config.source = source;

        if let Some(name) = env("SERVER_NAME").or(server.name) {
            config.name = name;
        }
        if let Some(version) = env("SERVER_VERSION").or(server.version) {
            config.version = version;
        }
        if let Some(transport) = env("TRANSPORT")
            .or_else(|| env("MCP_TRANSPORT_MODE"))
            .or(server.transport)
        {
            config.transport = transport.parse()?;
        }
        if let Some(host) = env("HOST").or(server.host) {
            config.host = host;
        }

        config.port = match env("PORT") {
            Some(raw) => parse_setting("port", &raw)?,
            None => server.port.unwrap_or(config.port),
        };

        config.workers = match env("WORKER_THREADS") {
            Some(raw) => parse_setting("worker count", &raw)?,
            None => server.workers.unwrap_or(config.workers),
        };
        if config.workers == 0 {
            return Err(ServerError::InvalidSetting {
                name: "worker count",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }

    /// Get tool-specific configuration.
    ///
    /// Returns the `tools.<tool_name>` object as a map, or an empty map if the
    /// tool has no configuration or the entry is not an object.
    pub fn get_tool_config(&self, tool_name: &str) -> HashMap<String, Value> {
        self.tools
            .get(tool_name)
            .and_then(|v| v.as_object())
            .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Defaults to the CPU count, capped at 16 to avoid excessive context switching.
fn default_workers() -> usize {
    num_cpus::get().clamp(1, 16)
}

fn parse_setting<T>(name: &'static str, raw: &str) -> Result<T, ServerError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ServerError::InvalidSetting {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Environment lookup with `MCP_PROFILE` pinned to `profile` when one is given.
pub fn profile_override(
    env: impl Fn(&str) -> Option<String>,
    profile: Option<Profile>,
) -> impl Fn(&str) -> Option<String> {
    move |key: &str| match profile {
        Some(p) if key == "MCP_PROFILE" => Some(p.as_str().to_string()),
        _ => env(key),
    }
}

/// Azure OpenAI settings consumed by the operator tooling only.
#[derive(Debug, Clone)]
pub struct AzureOpenAiSettings {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub api_version: String,
    pub gpt4_deployment: String,
    pub gpt35_deployment: String,
    pub embedding_deployment: String,
}

impl AzureOpenAiSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        Self {
            api_key: non_empty("AZURE_OPENAI_API_KEY"),
            endpoint: non_empty("AZURE_OPENAI_ENDPOINT"),
            api_version: non_empty("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| "2024-02-01".to_string()),
            gpt4_deployment: non_empty("AZURE_OPENAI_GPT4_DEPLOYMENT")
                .unwrap_or_else(|| "gpt-4".to_string()),
            gpt35_deployment: non_empty("AZURE_OPENAI_GPT35_DEPLOYMENT")
                .unwrap_or_else(|| "gpt-35-turbo".to_string()),
            embedding_deployment: non_empty("AZURE_OPENAI_EMBEDDING_DEPLOYMENT")
                .unwrap_or_else(|| "text-embedding-ada-002".to_string()),
        }
    }

    /// API key with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            let chars: Vec<char> = key.chars().collect();
            let visible: String = chars[chars.len().saturating_sub(4)..].iter().collect();
            format!("{}{}", "*".repeat(20), visible)
        })
    }

    /// An endpoint is usable when set and not left at the template placeholder.
    pub fn endpoint_is_configured(&self) -> bool {
        self.endpoint
            .as_deref()
            .is_some_and(|e| !e.contains("your-resource-name"))
    }

    pub fn is_complete(&self) -> bool {
        self.api_key.is_some() && self.endpoint_is_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn env_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults_follow_profile() {
        let config = Config::resolve(FileConfig::default(), None, env_from(&[])).unwrap();
        assert_eq!(config.profile, Profile::Directory);
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.port, 8000);
        assert_eq!(config.name, "Zee MCP Directory Server");

        let weather =
            Config::resolve(FileConfig::default(), None, env_from(&[("MCP_PROFILE", "weather")]))
                .unwrap();
        assert_eq!(weather.port, 8001);
        assert_eq!(weather.transport, Transport::Http);
    }

    #[test]
    fn test_env_overrides_file() {
        let yaml = "server:\n  profile: math\n  port: 9000\n  host: 127.0.0.1\n";
        let file = FileConfig::from_yaml(yaml, Path::new("test.yaml")).unwrap();
        let config = Config::resolve(file, None, env_from(&[("PORT", "9100")])).unwrap();

        assert_eq!(config.profile, Profile::Math);
        assert_eq!(config.port, 9100);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.bind_addr(), "127.0.0.1:9100");
    }

    #[test]
    fn test_transport_aliases() {
        assert_eq!("streamable-http".parse::<Transport>().unwrap(), Transport::Http);
        assert_eq!("STDIO".parse::<Transport>().unwrap(), Transport::Stdio);
        assert!("carrier-pigeon".parse::<Transport>().is_err());

        let config = Config::resolve(
            FileConfig::default(),
            None,
            env_from(&[("MCP_TRANSPORT_MODE", "both")]),
        )
        .unwrap();
        assert_eq!(config.transport, Transport::Both);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::resolve(FileConfig::default(), None, env_from(&[("PORT", "eighty")]));
        assert!(matches!(
            result,
            Err(ServerError::InvalidSetting { name: "port", .. })
        ));
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let result =
            Config::resolve(FileConfig::default(), None, env_from(&[("WORKER_THREADS", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        let result =
            Config::resolve(FileConfig::default(), None, env_from(&[("MCP_PROFILE", "chess")]));
        assert!(matches!(
            result,
            Err(ServerError::InvalidSetting { name: "profile", .. })
        ));
    }

    #[test]
    fn test_get_tool_config() {
        let yaml = "tools:\n  echo:\n    prefix: \"Echo: \"\n  weather: plain\n";
        let file = FileConfig::from_yaml(yaml, Path::new("test.yaml")).unwrap();
        let config = Config::resolve(file, None, env_from(&[])).unwrap();

        let echo = config.get_tool_config("echo");
        assert_eq!(echo.get("prefix").and_then(|v| v.as_str()), Some("Echo: "));
        assert!(config.get_tool_config("weather").is_empty());
        assert!(config.get_tool_config("missing").is_empty());
    }

    #[test]
    fn test_bad_yaml_reports_path() {
        let err = FileConfig::from_yaml("server: [", Path::new("broken.yaml")).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_profile_override_applies_profile_defaults() {
        let env = profile_override(env_from(&[("MCP_PROFILE", "chess")]), Some(Profile::Weather));
        let config = Config::resolve(FileConfig::default(), None, env).unwrap();

        assert_eq!(config.profile, Profile::Weather);
        assert_eq!(config.name, "Weather MCP Server");
        assert_eq!(config.bind_addr(), "0.0.0.0:8001");
        assert_eq!(config.transport, Transport::Http);

        let passthrough = profile_override(env_from(&[("MCP_PROFILE", "math")]), None);
        assert_eq!(passthrough("MCP_PROFILE").as_deref(), Some("math"));
    }

    #[test]
    fn test_load_from_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.yaml");
        let missing_str = missing.to_str().unwrap();

        let result = Config::load_from(
            env_from(&[("MCP_CONFIG", missing_str)]),
            &dir.path().join(DEFAULT_CONFIG_FILE),
        );
        assert!(matches!(result, Err(ServerError::ConfigRead { .. })));
    }

    #[test]
    fn test_load_from_without_any_file() {
        let dir = TempDir::new().unwrap();

        let config =
            Config::load_from(env_from(&[]), &dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert!(config.source.is_none());
        assert_eq!(config.profile, Profile::Directory);
        assert!(config.tools.is_empty());
    }

    #[test]
    fn test_load_from_reads_files_then_env() {
        let dir = TempDir::new().unwrap();
        let yaml = "server:\n  profile: math\n  port: 9000\ntools:\n  echo:\n    prefix: \">> \"\n";

        let explicit = dir.path().join("custom.yaml");
        fs::write(&explicit, yaml).unwrap();
        let explicit_str = explicit.to_str().unwrap();
        let config = Config::load_from(
            env_from(&[("MCP_CONFIG", explicit_str), ("PORT", "9100")]),
            &dir.path().join(DEFAULT_CONFIG_FILE),
        )
        .unwrap();
        assert_eq!(config.source.as_deref(), Some(explicit.as_path()));
        assert_eq!(config.profile, Profile::Math);
        assert_eq!(config.port, 9100);
        assert_eq!(
            config.get_tool_config("echo").get("prefix").and_then(|v| v.as_str()),
            Some(">> ")
        );

        let default_file = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&default_file, "server:\n  profile: weather\n").unwrap();
        let config = Config::load_from(env_from(&[]), &default_file).unwrap();
        assert_eq!(config.source.as_deref(), Some(default_file.as_path()));
        assert_eq!(config.profile, Profile::Weather);
        assert_eq!(config.port, 8001);
    }

    #[test]
    fn test_azure_settings_masking_and_placeholder() {
        let settings = AzureOpenAiSettings::from_lookup(env_from(&[
            ("AZURE_OPENAI_API_KEY", "sk-1234567890abcd"),
            ("AZURE_OPENAI_ENDPOINT", "https://your-resource-name.openai.azure.com/"),
        ]));
        assert_eq!(
            settings.masked_api_key().as_deref(),
            Some("********************abcd")
        );
        assert!(!settings.endpoint_is_configured());
        assert!(!settings.is_complete());
        assert_eq!(settings.api_version, "2024-02-01");

        let good = AzureOpenAiSettings::from_lookup(env_from(&[
            ("AZURE_OPENAI_API_KEY", "key"),
            ("AZURE_OPENAI_ENDPOINT", "https://demo.openai.azure.com/"),
        ]));
        assert!(good.is_complete());
    }
}
