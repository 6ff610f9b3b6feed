use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use project_api::auth::{generate_jwt, Claims, JwtSessionProvider};
use project_api::config::{AppConfig, DatabaseConfig};
use project_api::database::{DatabaseManager, PgProjectStore};
use project_api::server::{app, AppState};
use reqwest::StatusCode;
use sqlx::PgPool;

pub const SECRET: &str = "integration-secret";

pub struct TestServer {
    pub base_url: String,
    pub pool: PgPool,
}

impl TestServer {
    pub fn token(&self, user: &str) -> String {
        let claims = Claims::new(user, 1).expect("claims");
        generate_jwt(&claims, SECRET).expect("token")
    }

    pub async fn insert_project(&self, owner: &str, name: &str) -> Result<i64> {
        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO projects (name, owner_id) VALUES ($1, $2) RETURNING id")
                .bind(name)
                .bind(owner)
                .fetch_one(&self.pool)
                .await?;
        Ok(id)
    }

    pub async fn insert_document(&self, project_id: i64, title: &str) -> Result<i64> {
        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO documents (project_id, title) VALUES ($1, $2) RETURNING id")
                .bind(project_id)
                .bind(title)
                .fetch_one(&self.pool)
                .await?;
        Ok(id)
    }

    pub async fn document_exists(&self, id: i64) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Start the API against `TEST_DATABASE_URL` on a free port.
/// Returns `None` (test skipped) when no database is configured.
pub async fn start_server() -> Result<Option<TestServer>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping Postgres-backed test");
        return Ok(None);
    };

    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    config.database = DatabaseConfig {
        url: Some(url),
        max_connections: 5,
        connection_timeout: 10,
        run_migrations: true,
    };

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to TEST_DATABASE_URL")?;
    let state = AppState::new(
        Arc::new(PgProjectStore::new(pool.clone())),
        Arc::new(JwtSessionProvider::new(SECRET)?),
    );

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let router = app(state, &config);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        pool,
    };
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

/// Fresh owner id so tests never collide on (owner, name).
pub fn unique_user() -> String {
    format!("user_{}", uuid::Uuid::new_v4().simple())
}
