//! envconf command-line tool
//!
//! Loads a configuration file, resolves it for the requested environments
//! and prints values, groups or the whole resolved configuration.

use anyhow::{Result, bail};
use clap::Parser;
use envconf::cli::{Cli, Command};
use envconf::config::{Config, ConfigStore, FileSource};
use envconf::error::ErrorReport;
use envconf::format::{
    OutputFormat, explain, render_config, render_explanation, render_groups, render_value,
};
use envconf::logging::{LogTarget, init_logging};
use serde_json::json;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let path = cli.config_path();
    let environments = cli.environments();
    debug!(path = %path.display(), environments = ?environments, "Loading configuration");

    let mut store = ConfigStore::new(FileSource::new(&path));
    let config = match store.load(&environments, false) {
        Ok(config) => config,
        Err(err) if cli.format != OutputFormat::Text => {
            print!("{}", render_error(&ErrorReport::from(&err), cli.format)?);
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    print!("{}", run_command(&cli.command, config, cli.format)?);
    Ok(())
}

fn run_command(command: &Command, config: &Config, format: OutputFormat) -> Result<String> {
    match command {
        Command::Get { group, param } => match config.get(group, param) {
            Some(value) => render_value(value, format),
            None => bail!("{}.{} is not set", group, param),
        },
        Command::Groups => render_groups(config, format),
        Command::Dump => render_config(config, format),
        Command::Explain { group, param } => match explain(config, group, param) {
            Some(explanation) => render_explanation(&explanation, format),
            None => bail!("{}.{} is not defined in any environment", group, param),
        },
        Command::Check => {
            let groups = config.groups().count();
            let parameters = config.document().parameter_count();
            match format {
                OutputFormat::Text => Ok(format!(
                    "ok: {} groups, {} parameters ({})\n",
                    groups,
                    parameters,
                    config.environment_priority()
                )),
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                    "ok": true,
                    "groups": groups,
                    "parameters": parameters,
                }))? + "\n"),
                OutputFormat::Yaml => Ok(serde_yaml::to_string(&json!({
                    "ok": true,
                    "groups": groups,
                    "parameters": parameters,
                }))?),
            }
        }
    }
}

fn render_error(report: &ErrorReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(report)?,
        _ => serde_json::to_string_pretty(report)? + "\n",
    })
}
