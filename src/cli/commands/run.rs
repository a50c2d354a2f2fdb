//! Run Command
//!
//! Execute a full consultation and write the report.
//!
//! Usage:
//!   agentx run [--input TEXT | --input-file PATH] [--output PATH]
//!              [--provider NAME] [--model NAME] [--polish] [--save-transcripts]

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::ai::provider::{ChainConfig, ProviderChain, SharedProvider};
use crate::cli::Output;
use crate::config::{Config, ConfigLoader};
use crate::consultation::{
    Consultation, ConsultationOutcome, DEFAULT_CLIENT_INPUT, export_transcripts, write_report,
};
use crate::types::{AgentxError, Result};

/// Command-line overrides for a consultation run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub input: Option<String>,
    pub input_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub polish: bool,
    pub save_transcripts: bool,
    pub quiet: bool,
}

pub fn run(options: RunOptions) -> Result<()> {
    let out = Output::quiet(options.quiet);

    let mut config = ConfigLoader::load()?;
    apply_overrides(&mut config, &options);
    config.validate()?;

    let client_input = resolve_input(&options)?;
    let provider = create_provider_chain(&config)?;
    let mut consultation = Consultation::from_config(&config, provider.clone())?;

    out.header("AI Consultancy");
    out.field("Session", consultation.session_id());
    out.field("Provider", &config.llm.provider);
    out.field("Client input", &client_input);

    let rt = Runtime::new()?;
    let outcome = rt.block_on(async {
        match provider.health_check().await {
            Ok(true) => info!("Provider '{}' is healthy", provider.name()),
            Ok(false) | Err(_) => warn!(
                "Provider '{}' health check inconclusive",
                provider.name()
            ),
        }
        consultation.run(&client_input).await
    })?;

    write_report(&config.report.output_path, &outcome.report)?;

    if config.report.save_transcripts {
        let paths = export_transcripts(&config.report.transcripts_dir, consultation.manager())?;
        out.info(&format!(
            "Saved {} transcripts to {}",
            paths.len(),
            config.report.transcripts_dir.display()
        ));
    }

    print_summary(&out, &outcome, &config);
    Ok(())
}

/// Apply CLI flags on top of the loaded configuration
pub fn apply_overrides(config: &mut Config, options: &RunOptions) {
    if let Some(provider) = &options.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &options.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(output) = &options.output {
        config.report.output_path = output.clone();
    }
    if options.polish {
        config.report.polish_with_output_agent = true;
    }
    if options.save_transcripts {
        config.report.save_transcripts = true;
    }
}

/// Client input from `--input`, `--input-file`, or the built-in example
pub fn resolve_input(options: &RunOptions) -> Result<String> {
    if let Some(input) = &options.input {
        return Ok(input.clone());
    }
    if let Some(path) = &options.input_file {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentxError::Config(format!("Cannot read input file {}: {}", path.display(), e))
        })?;
        return Ok(content);
    }
    info!("No client input given, using the built-in example request");
    Ok(DEFAULT_CLIENT_INPUT.to_string())
}

/// Primary provider plus configured fallbacks, with retries
fn create_provider_chain(config: &Config) -> Result<SharedProvider> {
    let configs = config.llm.provider_configs();
    let chain = ProviderChain::from_configs(&configs, config.llm.max_retries, ChainConfig::default())?;
    Ok(Arc::new(chain))
}

fn print_summary(out: &Output, outcome: &ConsultationOutcome, config: &Config) {
    out.section("Summary");
    out.field("Completed", &outcome.completed.len().to_string());
    out.field("Tokens", &outcome.usage.total().to_string());
    out.field("Duration", &format!("{}s", outcome.duration_secs));
    if outcome.polished {
        out.field("Formatting", "output agent");
    }

    for (kind, reason) in &outcome.failed {
        out.warning(&format!("{} did not respond: {}", kind, reason));
    }

    out.success(&format!(
        "Report written to {}",
        config.report.output_path.display()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::default();
        let options = RunOptions {
            provider: Some("ollama".to_string()),
            model: Some("llama3".to_string()),
            output: Some(PathBuf::from("out/report.md")),
            polish: true,
            ..Default::default()
        };

        apply_overrides(&mut config, &options);

        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model.as_deref(), Some("llama3"));
        assert_eq!(config.classifier_model(), "llama3");
        assert_eq!(config.report.output_path, PathBuf::from("out/report.md"));
        assert!(config.report.polish_with_output_agent);
        assert!(!config.report.save_transcripts);
    }

    #[test]
    fn test_unset_flags_keep_config_values() {
        let mut config = Config::default();
        config.report.polish_with_output_agent = true;

        apply_overrides(&mut config, &RunOptions::default());

        assert!(config.report.polish_with_output_agent);
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_resolve_input_sources() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("request.txt");
        std::fs::write(&path, "Migrate billing to the cloud").unwrap();

        let from_file = RunOptions {
            input_file: Some(path),
            ..Default::default()
        };
        assert_eq!(
            resolve_input(&from_file).unwrap(),
            "Migrate billing to the cloud"
        );

        let inline = RunOptions {
            input: Some("Inline request".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_input(&inline).unwrap(), "Inline request");

        assert_eq!(
            resolve_input(&RunOptions::default()).unwrap(),
            DEFAULT_CLIENT_INPUT
        );
    }

    #[test]
    fn test_missing_input_file_is_config_error() {
        let options = RunOptions {
            input_file: Some(PathBuf::from("/nonexistent/request.txt")),
            ..Default::default()
        };
        assert!(matches!(
            resolve_input(&options),
            Err(AgentxError::Config(_))
        ));
    }
}
