//! JSON dataset loading for the demo.

use anyhow::Context;
use tokio::fs;

use crate::records::CustomerAccount;

/// Reads a JSON array of account objects.
pub async fn load_accounts(path: &str) -> anyhow::Result<Vec<CustomerAccount>> {
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let accounts: Vec<CustomerAccount> =
        serde_json::from_str(&contents).with_context(|| format!("parsing {path}"))?;
    Ok(accounts)
}
