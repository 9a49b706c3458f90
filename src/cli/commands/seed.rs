use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::store::{PgStore, UserStore};

const DEMO_PASSWORD: &str = "demo-password-123";

pub async fn handle(
    count: u32,
    url: &str,
    direct: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if direct {
        seed_direct(count, output_format).await
    } else {
        seed_via_api(count, url, output_format).await
    }
}

/// Create demo users straight in the database.
async fn seed_direct(count: u32, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let Some(database_url) = &config.store.database_url else {
        anyhow::bail!("seed --direct requires DATABASE_URL");
    };

    let store = PgStore::connect(database_url, config.store.max_connections).await?;
    let run = run_tag();
    let mut created = Vec::new();

    for i in 1..=count {
        let email = demo_email(&run, i);
        let hash = password::hash_password(DEMO_PASSWORD)
            .map_err(|e| anyhow::anyhow!("hashing demo password: {}", e))?;
        let user = store.create(&email, &hash).await?;
        created.push(json!({ "userId": user.id, "email": user.email }));
    }

    report(created, output_format)
}

/// Create demo users through the running server.
///
/// A throwaway operator account bootstraps a session first, so the demo
/// users go through `POST /api/user` under the roomier default rate
/// limit instead of burning the strict signup budget.
async fn seed_via_api(count: u32, url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = url.trim_end_matches('/');
    let client = reqwest::Client::new();
    let run = run_tag();

    let operator = json!({
        "email": format!("seed.operator.{}@example.com", run),
        "password": DEMO_PASSWORD,
    });

    let signup = client
        .post(format!("{}/api/auth/signup", base))
        .json(&operator)
        .send()
        .await?;
    if !signup.status().is_success() {
        anyhow::bail!("operator signup failed: {}", error_message(signup).await);
    }

    let login: Value = client
        .post(format!("{}/api/auth/login", base))
        .json(&operator)
        .send()
        .await?
        .json()
        .await?;
    let Some(token) = login.pointer("/data/token").and_then(Value::as_str) else {
        anyhow::bail!("operator login did not return a token");
    };

    let mut created = Vec::new();
    for i in 1..=count {
        let email = demo_email(&run, i);
        let response = client
            .post(format!("{}/api/user", base))
            .bearer_auth(token)
            .json(&json!({ "email": email, "password": DEMO_PASSWORD }))
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("creating {} failed: {}", email, error_message(response).await);
        }

        let body: Value = response.json().await?;
        created.push(json!({
            "userId": body.pointer("/data/userId").cloned().unwrap_or(Value::Null),
            "email": email,
        }));
    }

    report(created, output_format)
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<Value>().await {
        Ok(body) => body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string()),
        Err(_) => status.to_string(),
    }
}

fn report(created: Vec<Value>, output_format: OutputFormat) -> anyhow::Result<()> {
    if matches!(output_format, OutputFormat::Text) {
        for user in &created {
            println!("  {} ({})", user["email"].as_str().unwrap_or("?"), user["userId"]);
        }
    }

    output_success(
        &output_format,
        &format!("Created {} demo users", created.len()),
        Some(json!({ "users": created })),
    )
}

/// Short per-run tag so repeated seeds never collide on email.
fn run_tag() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

fn demo_email(run: &str, i: u32) -> String {
    format!("demo.{}.{}@example.com", run, i)
}
