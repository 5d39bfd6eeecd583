use crate::schema::HeraldConfig;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Jsonc,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "jsonc" => Some(Self::Jsonc),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }

    fn parse(self, content: &str) -> Result<HeraldConfig> {
        match self {
            Self::Jsonc => json5::from_str(content).context("Failed to parse JSONC"),
            Self::Json => serde_json::from_str(content).context("Failed to parse JSON"),
            Self::Yaml => serde_yaml_ng::from_str(content).context("Failed to parse YAML"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: HeraldConfig,
    pub path: PathBuf,
    pub format: ConfigFormat,
}

/// Loads `config_path`, or the first candidate file found.
///
/// Falls back to [`HeraldConfig::default`] when no path is given and no
/// candidate exists.
pub fn load_config(config_path: Option<&Path>) -> Result<HeraldConfig> {
    match config_path {
        Some(path) => load_config_from_file(path).map(|r| r.config),
        None => match find_config_file() {
            Some(path) => load_config_from_file(&path).map(|r| r.config),
            None => Ok(HeraldConfig::default()),
        },
    }
}

pub fn resolve_config(config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let path = config_path
        .map(|p| p.to_path_buf())
        .or_else(find_config_file)
        .ok_or_else(|| anyhow!("No configuration file found"))?;

    load_config_from_file(&path)
}

pub fn load_config_from_file(path: &Path) -> Result<ResolvedConfig> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| anyhow!("Unknown config format for: {}", path.display()))?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = format
        .parse(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(ResolvedConfig {
        config,
        path: path.to_path_buf(),
        format,
    })
}

const CONFIG_CANDIDATES: &[&str] = &[
    "herald.jsonc",
    "herald.json",
    "herald.yml",
    "herald.yaml",
    ".herald.jsonc",
    ".herald.json",
    ".herald.yml",
    ".herald.yaml",
];

fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::new()];
    if let Ok(home) = env::var("HOME") {
        dirs.push(PathBuf::from(home).join(".config").join("herald"));
    }
    dirs
}

fn candidates_in(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    CONFIG_CANDIDATES.iter().map(move |name| dir.join(name))
}

fn find_config_file() -> Option<PathBuf> {
    candidate_dirs()
        .iter()
        .flat_map(|dir| candidates_in(dir).collect::<Vec<_>>())
        .find(|path| path.exists())
}

/// Every existing candidate, in lookup order.
pub fn find_all_config_files() -> Vec<PathBuf> {
    candidate_dirs()
        .iter()
        .flat_map(|dir| candidates_in(dir).collect::<Vec<_>>())
        .filter(|path| path.exists())
        .collect()
}
