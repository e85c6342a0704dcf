use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "docsync";

/// Cross-platform configuration directory manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the main configuration directory path following platform conventions:
    /// - Linux: $XDG_CONFIG_HOME/docsync or ~/.config/docsync
    /// - macOS: ~/Library/Application Support/docsync
    /// - Windows: %APPDATA%\docsync
    pub fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
                Ok(PathBuf::from(xdg_config).join(APP_DIR))
            } else {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                Ok(home.join(".config").join(APP_DIR))
            }
        }

        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join("Library").join("Application Support").join(APP_DIR))
        }

        #[cfg(target_os = "windows")]
        {
            Ok(dirs::config_dir()
                .context("Failed to get Windows config directory")?
                .join(APP_DIR))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join(".docsync"))
        }
    }

    /// Get the settings file path (config.toml)
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the log file path
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("docsync.log"))
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;
        Ok(config_dir)
    }
}

/// Where the remote document store lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub organization: String,

    #[serde(default)]
    pub project: String,

    /// Extra headers sent with every request (e.g. a session cookie)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    "https://claude.ai".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: default_base_url(),
            organization: String::new(),
            project: String::new(),
            headers: BTreeMap::new(),
        }
    }
}

/// Which local files are candidates for syncing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// File name suffixes to include, e.g. ".py"
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// File names included regardless of extension
    #[serde(default = "default_include_files")]
    pub include_files: Vec<String>,

    /// Directory names pruned from the walk wherever they appear
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    [".js", ".ts", ".tsx", ".py"].map(String::from).to_vec()
}

fn default_include_files() -> Vec<String> {
    vec![crate::manifest::DEFAULT_MANIFEST_FILE.to_string()]
}

fn default_exclude_dirs() -> Vec<String> {
    ["node_modules", "build", ".git"].map(String::from).to_vec()
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            extensions: default_extensions(),
            include_files: default_include_files(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

/// Settings loaded from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Manifest location, relative to the synced root unless absolute
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub remote: RemoteConfig,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from(crate::manifest::DEFAULT_MANIFEST_FILE)
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            manifest_path: default_manifest_path(),
            scan: ScanConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from the default location, then apply
    /// `DOCSYNC_BASE_URL`, `DOCSYNC_ORGANIZATION` and `DOCSYNC_PROJECT`
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&ConfigManager::config_file_path()?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from `path`, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&ConfigManager::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DOCSYNC_BASE_URL") {
            self.remote.base_url = url;
        }
        if let Ok(org) = std::env::var("DOCSYNC_ORGANIZATION") {
            self.remote.organization = org;
        }
        if let Ok(project) = std::env::var("DOCSYNC_PROJECT") {
            self.remote.project = project;
        }
    }

    /// Manifest path resolved against the synced root
    pub fn manifest_path_in(&self, root: &Path) -> PathBuf {
        if self.manifest_path.is_absolute() {
            self.manifest_path.clone()
        } else {
            root.join(&self.manifest_path)
        }
    }
}

/// Changes requested through `docsync config`
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub base_url: Option<String>,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub extensions: Option<String>,
    pub exclude_dirs: Option<String>,
    pub manifest_path: Option<PathBuf>,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ConfigUpdate {
    /// Apply the requested changes, returning a line per change
    pub fn apply(self, config: &mut SyncConfig) -> Vec<String> {
        let mut changes = Vec::new();

        if let Some(url) = self.base_url {
            changes.push(format!("Set base URL to {url}"));
            config.remote.base_url = url;
        }
        if let Some(org) = self.organization {
            changes.push(format!("Set organization to {org}"));
            config.remote.organization = org;
        }
        if let Some(project) = self.project {
            changes.push(format!("Set project to {project}"));
            config.remote.project = project;
        }
        if let Some(extensions) = self.extensions {
            config.scan.extensions = split_list(&extensions);
            changes.push(format!("Set extensions: {:?}", config.scan.extensions));
        }
        if let Some(dirs) = self.exclude_dirs {
            config.scan.exclude_dirs = split_list(&dirs);
            changes.push(format!("Set excluded directories: {:?}", config.scan.exclude_dirs));
        }
        if let Some(path) = self.manifest_path {
            changes.push(format!("Set manifest path to {}", path.display()));
            config.manifest_path = path;
        }

        changes
    }
}

/// Update the stored configuration
pub fn update_config(update: ConfigUpdate) -> Result<()> {
    let path = ConfigManager::config_file_path()?;
    let mut config = SyncConfig::load_from(&path)?;

    let changes = update.apply(&mut config);
    if changes.is_empty() {
        println!("{}", "Nothing to change.".yellow());
        return Ok(());
    }
    for change in &changes {
        println!("{}", change.green());
    }

    config.save_to(&path)?;
    println!("{}", "Configuration saved successfully!".green().bold());

    Ok(())
}

/// Show the effective configuration
pub fn show_config() -> Result<()> {
    let config = SyncConfig::load()?;

    println!("{}", "Current Configuration:".bold());
    println!(
        "  {}: {}",
        "Config file".cyan(),
        ConfigManager::config_file_path()?.display()
    );
    println!("  {}: {}", "Base URL".cyan(), config.remote.base_url);
    println!(
        "  {}: {}",
        "Organization".cyan(),
        if config.remote.organization.is_empty() {
            "Not set".yellow().to_string()
        } else {
            config.remote.organization.clone()
        }
    );
    println!(
        "  {}: {}",
        "Project".cyan(),
        if config.remote.project.is_empty() {
            "Not set".yellow().to_string()
        } else {
            config.remote.project.clone()
        }
    );
    println!(
        "  {}: {}",
        "Extra headers".cyan(),
        if config.remote.headers.is_empty() {
            "None".to_string()
        } else {
            config
                .remote
                .headers
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
    println!("  {}: {}", "Extensions".cyan(), config.scan.extensions.join(", "));
    println!("  {}: {}", "Always included".cyan(), config.scan.include_files.join(", "));
    println!("  {}: {}", "Excluded directories".cyan(), config.scan.exclude_dirs.join(", "));
    println!("  {}: {}", "Manifest".cyan(), config.manifest_path.display());

    Ok(())
}
