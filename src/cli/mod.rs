use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "projectctl")]
#[command(about = "Administrative commands for the Project API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Mint a bearer token for a user id (local development)")]
    Token {
        #[arg(help = "User id to put in the token subject")]
        user_id: String,
        #[arg(long, help = "Token lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::config();

    match cli.command {
        Commands::Migrate => {
            let mut db = config.database.clone();
            db.run_migrations = false;
            let pool = DatabaseManager::connect(&db)
                .await
                .context("failed to connect to database")?;
            DatabaseManager::migrate(&pool).await?;
            pool.close().await;
            println!("Migrations applied");
            Ok(())
        }
        Commands::Token { user_id, hours } => {
            let hours = hours.unwrap_or(config.security.jwt_expiry_hours);
            let token = mint_token(&user_id, hours, &config.security.jwt_secret)?;
            println!("{}", token);
            Ok(())
        }
    }
}

fn mint_token(user_id: &str, hours: u64, secret: &str) -> anyhow::Result<String> {
    if user_id.trim().is_empty() {
        anyhow::bail!("user id must not be empty");
    }
    let claims = Claims::new(user_id, hours)?;
    generate_jwt(&claims, secret).context("set AUTH_SECRET to mint tokens")
}
