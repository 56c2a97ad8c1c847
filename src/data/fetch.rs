//! HTTP download of the source CSV.

use reqwest::blocking::Client;
use tracing::info;

use crate::error::AppError;

/// Our World in Data full COVID-19 export.
pub const DEFAULT_DATA_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

/// Environment variable naming a local CSV.
pub const ENV_DATA_PATH: &str = "COVID_DATA_PATH";
/// Environment variable naming a CSV URL.
pub const ENV_DATA_URL: &str = "COVID_DATA_URL";

/// Download a CSV body in one blocking request.
pub fn fetch_csv(url: &str) -> Result<String, AppError> {
    let client = Client::builder()
        .user_agent(concat!("covid-insights/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;

    info!(url, "downloading dataset");
    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::runtime(format!("Download of '{url}' failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::runtime(format!(
            "Download of '{url}' failed with status {}.",
            resp.status()
        )));
    }

    let body = resp
        .text()
        .map_err(|e| AppError::runtime(format!("Failed to read response body from '{url}': {e}")))?;
    info!(bytes = body.len(), "download complete");
    Ok(body)
}
