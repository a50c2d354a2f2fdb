//! Layered config resolution
//!
//! Later layers win: built-in defaults, the user file
//! (`~/.config/agentx/config.toml`), the project file (`.agentx/config.toml`),
//! then `AGENTX_*` variables such as `AGENTX_LLM_PROVIDER`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{AgentxError, Result};

const FILE_NAME: &str = "config.toml";

const TEMPLATE: &str = r#"# agentx configuration
# .agentx/config.toml overrides ~/.config/agentx/config.toml.

version = "1.0"

[llm]
provider = "openai"
# model = "gpt-4"            # replaces every agent's model
timeout_secs = 120
max_tokens = 1000
max_retries = 3

# [[llm.fallbacks]]
# provider = "ollama"
# api_base = "http://localhost:11434"

[routing]
# classifier_model = "gpt-3.5-turbo"   # defaults to llm.model when set
classifier_temperature = 0.0

[report]
title = "AI Consultancy Report"
output_path = "final_report.md"
polish_with_output_agent = false
save_transcripts = false
transcripts_dir = "conversations"

# [agents.tech_lead]
# model = "gpt-4"
# temperature = 0.5
"#;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load() -> Result<Config> {
        let global = Self::global_config_path();
        Self::load_layers(global.as_deref(), &Self::project_config_path())
    }

    /// Defaults, then whichever of the two files exist, then the environment
    pub fn load_layers(global: Option<&Path>, project: &Path) -> Result<Config> {
        let figment = global
            .into_iter()
            .chain(std::iter::once(project))
            .filter(|path| path.exists())
            .fold(Self::defaults(), |figment, path| {
                debug!(path = %path.display(), "Merging config file");
                figment.merge(Toml::file(path))
            })
            .merge(Env::prefixed("AGENTX_").split('_').lowercase(true));
        Self::extract(figment)
    }

    /// Defaults plus one file, ignoring the environment
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Self::extract(Self::defaults().merge(Toml::file(path)))
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| AgentxError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/agentx`, else `~/.config/agentx`
    pub fn global_dir() -> Option<PathBuf> {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .map(|base| base.join("agentx"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(FILE_NAME))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".agentx")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join(FILE_NAME)
    }

    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            return Ok(serde_json::to_string_pretty(config)?);
        }
        toml::to_string_pretty(config).map_err(|e| AgentxError::Config(e.to_string()))
    }

    pub fn init_global(force: bool) -> Result<PathBuf> {
        let path = Self::global_config_path().ok_or_else(|| {
            AgentxError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_template(&path, force)
    }

    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::write_template(&Self::project_config_path(), force)
    }

    /// Existing files are left alone unless `force` is set
    pub fn write_template(path: &Path, force: bool) -> Result<PathBuf> {
        if path.exists() && !force {
            info!(path = %path.display(), "Config already exists");
            return Ok(path.to_path_buf());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, TEMPLATE)?;
        info!(path = %path.display(), "Wrote config template");
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        ConfigLoader::write_template(&path, false).unwrap();
        let config = ConfigLoader::load_from_file(&path).unwrap();

        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.report.title, "AI Consultancy Report");
    }

    #[test]
    fn test_write_template_respects_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "version = \"custom\"\n").unwrap();

        ConfigLoader::write_template(&path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

        ConfigLoader::write_template(&path, true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[routing]"));
    }

    #[test]
    fn test_project_layer_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(&global, "[report]\ntitle = \"Global\"\npolish_with_output_agent = true\n")
            .unwrap();
        fs::write(&project, "[report]\ntitle = \"Project\"\n").unwrap();

        let config = ConfigLoader::load_layers(Some(&global), &project).unwrap();

        assert_eq!(config.report.title, "Project");
        assert!(config.report.polish_with_output_agent);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[llm]\ntimeout_secs = 0\n").unwrap();

        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(AgentxError::Config(_))
        ));
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let json = ConfigLoader::render(&config, true).unwrap();
        let toml_text = ConfigLoader::render(&config, false).unwrap();

        assert!(json.contains("\"classifier_model\""));
        assert!(toml_text.contains("[report]"));
    }
}
