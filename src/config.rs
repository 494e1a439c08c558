//! Configuration for wordlens.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (WORDLENS_HOME, WORDLENS_API_KEY, WORDLENS_API_URL, WORDLENS_MODEL)
//! 2. Config file (.wordlens/config.yaml)
//! 3. Defaults (~/.wordlens)
//!
//! Config file discovery:
//! - Searches current directory and parents for .wordlens/config.yaml
//! - `paths.home` in the config file is relative to the .wordlens/ directory

pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::speech::DEFAULT_TTS_ENDPOINT;
use crate::adapters::translate::{DEFAULT_LLM_ENDPOINT, DEFAULT_LLM_MODEL, DEFAULT_QUICK_ENDPOINT};
use crate::audio::DEFAULT_MAX_CHARS;
use crate::core::{DEFAULT_AUTO_PLAY_PAUSE, DEFAULT_DEDUPE_WINDOW, DEFAULT_HISTORY_CAPACITY, DEFAULT_REQUEST_TIMEOUT};
use crate::popover::PlacementConfig;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub translation: Option<TranslationConfig>,
    #[serde(default)]
    pub speech: Option<SpeechConfig>,
    #[serde(default)]
    pub popover: Option<PlacementConfig>,
    #[serde(default)]
    pub lookup: Option<LookupConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .wordlens/)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub quick_endpoint: Option<String>,
    /// Try the quick translator first for plain lookups
    pub quick_first: Option<bool>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    pub endpoint: Option<String>,
    /// Player command line; `{rate}` is replaced by the playback rate
    pub player: Option<String>,
    pub espeak_binary: Option<String>,
    pub max_chars: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    pub auto_play_pause_ms: Option<u64>,
    pub history_capacity: Option<usize>,
    pub dedupe_window_seconds: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to wordlens home (session state)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub translation: TranslationSettings,
    pub speech: SpeechSettings,
    pub popover: PlacementConfig,
    pub lookup: LookupTuning,
}

#[derive(Debug, Clone)]
pub struct TranslationSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub quick_endpoint: String,
    pub quick_first: bool,
    pub timeout: Duration,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: None,
            quick_endpoint: DEFAULT_QUICK_ENDPOINT.to_string(),
            quick_first: true,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub endpoint: String,
    /// `None` means the built-in player command
    pub player: Option<String>,
    pub espeak_binary: String,
    pub max_chars: usize,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TTS_ENDPOINT.to_string(),
            player: None,
            espeak_binary: "espeak-ng".to_string(),
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupTuning {
    pub auto_play_pause: Duration,
    pub history_capacity: usize,
    pub dedupe_window: Duration,
}

impl Default for LookupTuning {
    fn default() -> Self {
        Self {
            auto_play_pause: DEFAULT_AUTO_PLAY_PAUSE,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            dedupe_window: DEFAULT_DEDUPE_WINDOW,
        }
    }
}

impl ResolvedConfig {
    /// Session store file
    pub fn session_path(&self) -> PathBuf {
        self.home.join(paths::SESSION_FILE)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(paths::CONFIG_DIR).join(paths::CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge the file sections over the defaults
fn apply_file(config: ConfigFile, config_path: &Path, resolved: &mut ResolvedConfig) {
    if let Some(ref home_path) = config.paths.home {
        let dir = config_path.parent().unwrap_or(Path::new("."));
        resolved.home = resolve_path(dir, home_path);
    }

    if let Some(t) = config.translation {
        let s = &mut resolved.translation;
        if let Some(endpoint) = t.endpoint {
            s.endpoint = endpoint;
        }
        if let Some(model) = t.model {
            s.model = model;
        }
        if t.api_key.is_some() {
            s.api_key = t.api_key;
        }
        if let Some(quick) = t.quick_endpoint {
            s.quick_endpoint = quick;
        }
        s.quick_first = t.quick_first.unwrap_or(s.quick_first);
        if let Some(secs) = t.timeout_seconds {
            s.timeout = Duration::from_secs(secs);
        }
    }

    if let Some(sp) = config.speech {
        let s = &mut resolved.speech;
        if let Some(endpoint) = sp.endpoint {
            s.endpoint = endpoint;
        }
        if sp.player.is_some() {
            s.player = sp.player;
        }
        if let Some(binary) = sp.espeak_binary {
            s.espeak_binary = binary;
        }
        s.max_chars = sp.max_chars.unwrap_or(s.max_chars);
    }

    if let Some(popover) = config.popover {
        resolved.popover = popover;
    }

    if let Some(l) = config.lookup {
        let s = &mut resolved.lookup;
        if let Some(ms) = l.auto_play_pause_ms {
            s.auto_play_pause = Duration::from_millis(ms);
        }
        s.history_capacity = l.history_capacity.unwrap_or(s.history_capacity);
        if let Some(secs) = l.dedupe_window_seconds {
            s.dedupe_window = Duration::from_secs(secs);
        }
    }
}

/// Environment variables win over everything else
fn apply_env(resolved: &mut ResolvedConfig) {
    if let Ok(home) = std::env::var("WORDLENS_HOME") {
        resolved.home = PathBuf::from(home);
    }
    if let Ok(key) = std::env::var("WORDLENS_API_KEY") {
        if !key.trim().is_empty() {
            resolved.translation.api_key = Some(key);
        }
    }
    if let Ok(url) = std::env::var("WORDLENS_API_URL") {
        resolved.translation.endpoint = url;
    }
    if let Ok(model) = std::env::var("WORDLENS_MODEL") {
        resolved.translation.model = model;
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(paths::CONFIG_DIR);

    let config_file = find_config_file();

    let mut resolved = ResolvedConfig {
        home: default_home,
        config_file: config_file.clone(),
        translation: TranslationSettings::default(),
        speech: SpeechSettings::default(),
        popover: PlacementConfig::default(),
        lookup: LookupTuning::default(),
    };

    if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;
        apply_file(config, config_path, &mut resolved);
    }

    apply_env(&mut resolved);
    Ok(resolved)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the wordlens home directory (session state).
pub fn wordlens_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}
