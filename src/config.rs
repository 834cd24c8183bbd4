use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Files or directories scanned when none are given on the command line.
    #[serde(default = "default_paths")]
    pub paths: Vec<PathBuf>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Runs of this many spaces after a line's indentation are reported.
    #[serde(default = "default_min_space_run")]
    pub min_space_run: usize,

    #[serde(default = "default_indent_step")]
    pub indent_step: usize,

    #[serde(default = "default_preview_len")]
    pub preview_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            extensions: default_extensions(),
            min_space_run: default_min_space_run(),
            indent_step: default_indent_step(),
            preview_len: default_preview_len(),
        }
    }
}

fn default_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("app")]
}

fn default_extensions() -> Vec<String> {
    vec!["tsx".into(), "jsx".into(), "mdx".into()]
}

fn default_min_space_run() -> usize {
    3
}

fn default_indent_step() -> usize {
    2
}

fn default_preview_len() -> usize {
    100
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    default: ConfigProfile,

    #[serde(flatten)]
    profiles: HashMap<String, ConfigProfile>,
}

// Every field optional so a layer only overrides what it sets.
#[derive(Debug, Default, Clone, Deserialize)]
struct ConfigProfile {
    #[serde(default)]
    scan: ScanProfile,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ScanProfile {
    paths: Option<Vec<PathBuf>>,
    extensions: Option<Vec<String>>,
    min_space_run: Option<usize>,
    indent_step: Option<usize>,
    preview_len: Option<usize>,
}

impl Config {
    pub fn load(config_path: Option<&PathBuf>, profile: Option<&String>) -> Result<Self> {
        Self::load_with_validation(config_path, profile, true)
    }

    pub fn load_without_validation(
        config_path: Option<&PathBuf>,
        profile: Option<&String>,
    ) -> Result<Self> {
        Self::load_with_validation(config_path, profile, false)
    }

    fn load_with_validation(
        config_path: Option<&PathBuf>,
        profile: Option<&String>,
        validate: bool,
    ) -> Result<Self> {
        let mut config = Self::default();

        // 1. Global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            tracing::debug!("Loading global config: {:?}", global_path);
            config.merge(Self::load_from_file(&global_path, profile)?);
        }

        // 2. Project config
        if let Some(project_path) = Self::project_config_path() {
            tracing::debug!("Loading project config: {:?}", project_path);
            config.merge(Self::load_from_file(&project_path, profile)?);
        }

        // 3. Custom config file
        if let Some(path) = config_path {
            tracing::debug!("Loading custom config: {:?}", path);
            config.merge(Self::load_from_file(path, profile)?);
        }

        // 4. Environment variables override
        config.apply_env(|key| std::env::var(key).ok())?;

        if validate {
            config.validate()?;
        }

        Ok(config)
    }

    fn load_from_file(path: &Path, profile: Option<&String>) -> Result<ConfigProfile> {
        #[cfg(unix)]
        Self::check_permissions(path)?;

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse_profile(&content, profile).with_context(|| format!("In config file: {:?}", path))
    }

    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mode = fs::metadata(path)
            .with_context(|| format!("Failed to stat config file: {:?}", path))?
            .permissions()
            .mode();

        // Group or world access
        if mode & 0o077 != 0 {
            tracing::warn!(
                "Config file {:?} has too permissive permissions: {:o}. \
                 Recommend: chmod 600 {:?}",
                path,
                mode,
                path
            );
        }

        Ok(())
    }

    fn parse_profile(content: &str, profile: Option<&String>) -> Result<ConfigProfile> {
        let config_file: ConfigFile =
            toml::from_str(content).context("Failed to parse config file")?;

        if let Some(profile_name) = profile {
            config_file
                .profiles
                .get(profile_name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Profile '{}' not found", profile_name))
        } else {
            Ok(config_file.default)
        }
    }

    fn merge(&mut self, other: ConfigProfile) {
        let scan = other.scan;
        if let Some(paths) = scan.paths {
            self.scan.paths = paths;
        }
        if let Some(extensions) = scan.extensions {
            self.scan.extensions = extensions;
        }
        if let Some(run) = scan.min_space_run {
            self.scan.min_space_run = run;
        }
        if let Some(step) = scan.indent_step {
            self.scan.indent_step = step;
        }
        if let Some(len) = scan.preview_len {
            self.scan.preview_len = len;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(val) = var("CODEBLOCK_SCAN_PATHS") {
            self.scan.paths = split_list(&val).map(PathBuf::from).collect();
        }

        if let Some(val) = var("CODEBLOCK_EXTENSIONS") {
            self.scan.extensions = split_list(&val)
                .map(|s| s.trim_start_matches('.').to_string())
                .collect();
        }

        if let Some(val) = var("CODEBLOCK_MIN_SPACE_RUN") {
            self.scan.min_space_run = val
                .trim()
                .parse()
                .context("Invalid CODEBLOCK_MIN_SPACE_RUN")?;
        }

        if let Some(val) = var("CODEBLOCK_INDENT_STEP") {
            self.scan.indent_step = val.trim().parse().context("Invalid CODEBLOCK_INDENT_STEP")?;
        }

        if let Some(val) = var("CODEBLOCK_PREVIEW_LEN") {
            self.scan.preview_len = val.trim().parse().context("Invalid CODEBLOCK_PREVIEW_LEN")?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.is_empty() {
            anyhow::bail!(
                "No source extensions configured. Set via:\n\
                 1. CODEBLOCK_EXTENSIONS env var\n\
                 2. Config file: [default.scan] extensions"
            );
        }

        if self.scan.min_space_run < 2 {
            anyhow::bail!(
                "min_space_run must be at least 2, got {}",
                self.scan.min_space_run
            );
        }

        if self.scan.indent_step == 0 {
            anyhow::bail!("indent_step must be greater than 0");
        }

        Ok(())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config/codeblock/config.toml"))
    }

    pub fn project_config_path() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        let mut dir = current.as_path();

        loop {
            let candidate = dir.join(".codeblock.toml");
            if candidate.exists() {
                return Some(candidate);
            }

            let alt = dir.join(".codeblock/config.toml");
            if alt.exists() {
                return Some(alt);
            }

            dir = dir.parent()?;
        }
    }

    pub fn init_config(global: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().context("Failed to determine global config path")?
        } else {
            PathBuf::from(".codeblock.toml")
        };

        if path.exists() {
            anyhow::bail!("Config file already exists: {:?}", path);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, TEMPLATE)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(path)
    }
}

const TEMPLATE: &str = r#"[default.scan]
paths = ["app"]
extensions = ["tsx", "jsx", "mdx"]
min_space_run = 3
indent_step = 2
preview_len = 100

# Additional profiles
# [strict.scan]
# indent_step = 4
"#;

fn split_list(val: &str) -> impl Iterator<Item = &str> {
    val.split(',').map(str::trim).filter(|s| !s.is_empty())
}
