use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Secrets are never printed: they are skipped on serialization and the
/// database URL has its password masked.
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    config.database.url = config
        .database
        .url
        .as_deref()
        .map(|url| DatabaseManager::redacted_url(url).unwrap_or_else(|_| "(invalid)".to_string()));

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => {
            println!("environment:  {:?}", config.environment);
            println!("store:        {:?}", config.database.backend);
            println!("database url: {}", config.database.url.as_deref().unwrap_or("(unset)"));
            println!("port:         {}", config.api.port);
            println!("cors:         {}", config.security.enable_cors);
            println!("media cloud:  {}", display_or_unset(&config.media.cloud_name));
            println!("media temp:   {}", config.media.temp_dir.display());
        }
    }
    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}
