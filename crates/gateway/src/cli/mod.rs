pub mod config;
pub mod generate;
pub mod roster;

use clap::{Parser, Subcommand};

/// PlanForge: resilient multi-model generation for product planning.
#[derive(Debug, Parser)]
#[command(name = "planforge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Run one generation task and print the result.
    Generate {
        /// Task kind: blueprint, execution-plan, daily-tasks or chat.
        task: String,
        /// The user prompt.
        prompt: String,
        /// Print the full result (source, model, data) as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the provider roster in trial order.
    Roster,
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `PF_CONFIG` (or
/// `config.toml` by default). Returns the parsed [`Config`] and the
/// path that was used. A missing file yields the defaults.
///
/// [`Config`]: pf_domain::config::Config
pub fn load_config() -> anyhow::Result<(pf_domain::config::Config, String)> {
    let config_path = std::env::var("PF_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(config_path: &str) -> anyhow::Result<pf_domain::config::Config> {
    if !std::path::Path::new(config_path).exists() {
        return Ok(pf_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = load_config_from("/nonexistent/planforge-test.toml").unwrap();
        assert_eq!(cfg.server.port, 3210);
        assert!(cfg.llm.roster.is_empty());
    }

    #[test]
    fn generate_subcommand_parses() {
        let cli = Cli::try_parse_from(["planforge", "generate", "execution-plan", "A CRM for plumbers", "--json"]).unwrap();
        match cli.command {
            Some(Command::Generate { task, prompt, json }) => {
                assert_eq!(task, "execution-plan");
                assert_eq!(prompt, "A CRM for plumbers");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
