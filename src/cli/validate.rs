use console::style;
use crate::cli::commands::ValidateArgs;
use crate::config::{parse_config, Settings};
use crate::errors::XaiError;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), XaiError> {
    let config = parse_config(&args.config).await?;
    let settings = Settings::from_config(&config);

    println!("{} Configuration is valid: {}", style("✓").green(), args.config.display());
    println!("  listen      {}:{}", settings.host, settings.port);
    println!("  public url  {}", settings.public_url);
    println!("  static dir  {}", settings.static_dir.display());
    println!("  reports dir {}", settings.reports_dir.display());
    println!("  classifier  {}", settings.classifier_url);
    println!("  explainer   {}", settings.explainer_url);
    Ok(())
}
