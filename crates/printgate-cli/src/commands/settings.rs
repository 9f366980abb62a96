use anyhow::Result;

use crate::cli::OutputFormat;
use crate::client::PrintgateClient;
use crate::output::{print_fields, print_success};

pub async fn read_config(client: &PrintgateClient, key: &str, format: OutputFormat) -> Result<()> {
    let setting = client.read_config(key).await?;
    print_fields(&setting, format)
}

pub async fn set_config(client: &PrintgateClient, key: &str, value: &str) -> Result<()> {
    client.set_config(key, value).await?;
    print_success(&format!("Set {key} = {value}"));
    Ok(())
}
