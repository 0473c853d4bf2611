use std::path::{Path, PathBuf};

use compact_str::CompactString;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::{
    client::ClientConfig,
    result::{AppError, Result},
};

/// Settings persisted between runs of the command-line tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub gitlab_url: CompactString,
    pub gitlab_token: CompactString,
    /// `trace`, `debug`, `info`, `warn`, `error` or `off`
    pub log_level: Option<CompactString>,
    /// Directory for a daily log file; stderr only when unset
    pub log_directory: Option<PathBuf>,
}

impl AppConfig {
    /// Overlay values given on the command line
    pub fn with_overrides(
        mut self,
        gitlab_url: Option<CompactString>,
        gitlab_token: Option<CompactString>,
    ) -> Self {
        if let Some(url) = gitlab_url {
            self.gitlab_url = url;
        }
        if let Some(token) = gitlab_token {
            self.gitlab_token = token;
        }
        self
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        if self.gitlab_url.is_empty() {
            return Err(AppError::config_validation_error(
                "gitlab_url",
                "no GitLab URL configured; pass --url or run `config`",
            ));
        }
        if self.gitlab_token.is_empty() {
            return Err(AppError::config_validation_error(
                "gitlab_token",
                "no access token configured; pass --token or run `config`",
            ));
        }

        let config = ClientConfig::new(self.gitlab_url.clone(), self.gitlab_token.clone());
        config.validate()?;
        Ok(config)
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = BaseDirs::new() {
        dirs.config_dir().join("gitlab-rest.toml")
    } else {
        PathBuf::from("gitlab-rest.toml")
    }
}

/// Load the configuration file, or defaults when it does not exist yet
pub fn load_config(config_file: &Path) -> Result<AppConfig> {
    confy::load_path(config_file)
        .map_err(|e| AppError::config_load_error(config_file.to_path_buf(), e))
}

pub fn save_config(config_file: &Path, config: &AppConfig) -> Result<()> {
    confy::store_path(config_file, config)
        .map_err(|e| AppError::config_save_error(config_file.to_path_buf(), e))?;

    Ok(())
}
