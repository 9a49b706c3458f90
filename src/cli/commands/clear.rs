use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::store::{PgStore, UserStore};

/// Soft-delete every live user in the configured database.
pub async fn handle(yes: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("clear soft-deletes every user; pass --yes to confirm");
    }

    let config = config::config();
    let Some(database_url) = &config.store.database_url else {
        anyhow::bail!("clear requires DATABASE_URL");
    };

    let store = PgStore::connect(database_url, config.store.max_connections).await?;
    let mut cleared = 0u64;

    // Soft-deleting shrinks the live list, so keep taking the first page
    // until nothing is left.
    loop {
        let (users, _) = store.list(1, 100).await?;
        if users.is_empty() {
            break;
        }
        for user in users {
            store.soft_delete(user.id).await?;
            cleared += 1;
        }
    }

    output_success(
        &output_format,
        &format!("Soft-deleted {} users", cleared),
        Some(json!({ "cleared": cleared })),
    )
}
