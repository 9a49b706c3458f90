use crate::cli::OutputFormat;
use crate::config;
use crate::docs;

/// Print the API documentation without needing a running server.
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let registry = docs::register_all(config::config());

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&registry.to_json())?),
        OutputFormat::Text => println!("{}", registry.to_markdown()),
    }
    Ok(())
}
