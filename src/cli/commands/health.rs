use serde_json::Value;

use crate::cli::OutputFormat;

/// GET /api/health against a running server and report the result.
pub async fn handle(url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let endpoint = format!("{}/api/health", url.trim_end_matches('/'));
    let response = reqwest::get(&endpoint).await?;
    let healthy = response.status().is_success();
    let body: Value = response.json().await?;

    // The same report rides under `data` on 200 and `error.details` on 503.
    let report = if healthy {
        body.get("data").cloned()
    } else {
        body.pointer("/error/details").cloned()
    }
    .unwrap_or(Value::Null);

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
        OutputFormat::Text => {
            println!("Status: {}", report["status"].as_str().unwrap_or("unknown"));
            if let Some(ms) = report["database"]["responseTimeMs"].as_u64() {
                println!("Database response time: {}ms", ms);
            }
            if let Some(error) = report["database"]["error"].as_str() {
                println!("Database error: {}", error);
            }
            if let Some(total) = report["queries"]["totalOperations"].as_u64() {
                println!("Operations recorded: {}", total);
            }
        }
    }

    if !healthy {
        std::process::exit(1);
    }
    Ok(())
}
