use std::path::PathBuf;
use clap::{Parser, Subcommand, Args};
use crate::config::{load_settings, validate_settings, Settings};
use crate::errors::XaiError;

#[derive(Parser)]
#[command(name = "pneumo-xai", version, about = "Pneumonia X-ray prediction and explanation backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Print stored reports, most recent first
    History(HistoryArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Config file plus per-field overrides shared by every command that
/// needs resolved settings.
#[derive(Args, Clone, Debug, Default)]
pub struct SettingsArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory served under /static (uploads and explanations)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Directory holding <reportId>.json records
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,

    /// Base URL clients use to reach this server
    #[arg(long)]
    pub public_url: Option<String>,
}

impl SettingsArgs {
    pub async fn resolve(&self) -> Result<Settings, XaiError> {
        let mut settings = load_settings(self.config.as_deref()).await?;
        if let Some(dir) = &self.static_dir {
            settings.static_dir = dir.clone();
        }
        if let Some(dir) = &self.reports_dir {
            settings.reports_dir = dir.clone();
        }
        if let Some(url) = &self.public_url {
            settings.public_url = url.trim_end_matches('/').to_string();
        }
        Ok(settings)
    }
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Listen address
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(long)]
    pub port: Option<u16>,

    /// Inference sidecar base URL, used for both classifier and explainer
    #[arg(long)]
    pub model_url: Option<String>,
}

impl ServeArgs {
    pub async fn resolve(&self) -> Result<Settings, XaiError> {
        let mut settings = self.settings.resolve().await?;
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(url) = &self.model_url {
            settings.classifier_url = url.clone();
            settings.explainer_url = url.clone();
        }
        validate_settings(&settings)?;
        Ok(settings)
    }
}

#[derive(Args, Clone, Debug)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Only show reports for this patient
    #[arg(long)]
    pub patient_id: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PORT;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "pneumo-xai", "-vv", "serve", "--port", "8080", "--model-url", "http://sidecar:9000",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.model_url.as_deref(), Some("http://sidecar:9000"));
                assert!(args.settings.config.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[tokio::test]
    async fn test_serve_resolve_applies_overrides() {
        let args = ServeArgs {
            settings: SettingsArgs { reports_dir: Some("/tmp/r".into()), ..Default::default() },
            host: Some("127.0.0.1".into()),
            port: None,
            model_url: Some("http://sidecar:9000".into()),
        };
        let settings = args.resolve().await.unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.reports_dir, PathBuf::from("/tmp/r"));
        assert_eq!(settings.explainer_url, "http://sidecar:9000");
    }

    #[tokio::test]
    async fn test_serve_resolve_rejects_port_zero() {
        let args = ServeArgs {
            settings: SettingsArgs::default(),
            host: None,
            port: Some(0),
            model_url: None,
        };
        assert!(matches!(args.resolve().await, Err(XaiError::Config(_))));
    }

    #[test]
    fn test_parse_history_flags() {
        let cli = Cli::try_parse_from(["pneumo-xai", "history", "--patient-id", "P1", "--json"]).unwrap();
        match cli.command {
            Commands::History(args) => {
                assert_eq!(args.patient_id.as_deref(), Some("P1"));
                assert!(args.json);
            }
            _ => panic!("expected history"),
        }
    }
}
