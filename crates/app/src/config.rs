use std::time::Duration;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::session::DEFAULT_PASSWORD;

pub const APP_NAME: &str = "study-planner-smoke";
pub const ENV_PREFIX: &str = "STUDY_SMOKE_";

static DEFAULT_CONFIG: Lazy<HarnessConfig> = Lazy::new(HarnessConfig::default);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub report_path: Option<Utf8PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            password: default_password(),
            timeout_secs: None,
            report_path: None,
        }
    }
}

impl HarnessConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_base_url() -> String {
    "https://studysmartly.preview.emergentagent.com/api".into()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.into()
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<Utf8PathBuf>,
}

/// Layering: defaults < TOML file < `STUDY_SMOKE_*` env < CLI overrides.
pub fn load_config(
    explicit_path: Option<&Utf8Path>,
    overrides: ConfigOverrides,
) -> Result<HarnessConfig> {
    let mut figment = Figment::from(Serialized::defaults(DEFAULT_CONFIG.clone()));

    if let Some(path) = explicit_path {
        if !path.exists() {
            bail!("config file {path} does not exist");
        }
        figment = figment.merge(Toml::file(path));
    } else if let Some(path) = resolve_default_config_path() {
        figment = figment.merge(Toml::file(path));
    } else {
        warn!("no config file found; relying on defaults + env overrides");
    }

    figment = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(overrides));

    figment
        .extract()
        .context("failed to load study-planner-smoke configuration")
}

fn workspace_root() -> &'static Utf8Path {
    static ROOT: Lazy<Utf8PathBuf> = Lazy::new(|| {
        let manifest_dir = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        manifest_dir
            .parent()
            .and_then(|p| p.parent())
            .map(Utf8PathBuf::from)
            .unwrap_or(manifest_dir)
    });
    ROOT.as_path()
}

fn resolve_default_config_path() -> Option<Utf8PathBuf> {
    let repo_relative = workspace_root().join("config/smoke.toml");
    if repo_relative.exists() {
        return Some(repo_relative);
    }

    if let Some(dirs) = ProjectDirs::from("app", "StudyPlanner", APP_NAME)
        && let Ok(path) = Utf8PathBuf::from_path_buf(dirs.config_dir().join("config.toml"))
        && path.exists()
    {
        return Some(path);
    }

    None
}
