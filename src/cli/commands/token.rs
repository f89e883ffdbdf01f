use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, validate_jwt, Claims};
use crate::cli::{output_success, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint an access token for a known user id")]
    Issue {
        #[arg(long, help = "User id (UUID) the token acts as")]
        user_id: Uuid,

        #[arg(long, default_value = "operator", help = "Username claim")]
        username: String,
    },

    #[command(about = "Verify a token against the configured secret")]
    Verify {
        #[arg(help = "Access token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    match cmd {
        TokenCommands::Issue { user_id, username } => {
            let claims = Claims::new(user_id, username, &config.security);
            let token = generate_jwt(&claims, &config.security)?;
            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    "Token issued",
                    json!({ "token": token, "expires_at": claims.exp }),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Verify { token } => {
            let claims = validate_jwt(&token, &config.security)?;
            output_success(
                output_format,
                &format!("Token valid for {} ({})", claims.username, claims.user_id),
                json!({ "user_id": claims.user_id, "username": claims.username, "exp": claims.exp }),
            )
        }
    }
}
