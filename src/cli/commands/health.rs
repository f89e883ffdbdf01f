use serde_json::{json, Value};
use std::time::Duration;

use crate::cli::{output_success, OutputFormat};

pub async fn handle(base_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;

    let response = client.get(&url).send().await?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        anyhow::bail!("{} answered {}: {}", url, status, body["message"].as_str().unwrap_or("no details"));
    }

    output_success(
        output_format,
        &format!("{} is healthy", base_url),
        json!({ "status": status.as_u16(), "data": body["data"] }),
    )
}
