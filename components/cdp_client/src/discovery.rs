//! WebSocket debugger URL discovery
//!
//! Debugging endpoints advertise their WebSocket URLs over HTTP. The
//! browser-wide target lives at `/json/version`; endpoints predating it only
//! expose per-target URLs through `/json/list`.

use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{CdpClientError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfo {
    #[serde(default)]
    web_socket_debugger_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetInfo {
    #[serde(default)]
    web_socket_debugger_url: Option<String>,
}

/// Discover the WebSocket debugger URL for the configured endpoint
pub async fn discover_ws_url(config: &ClientConfig) -> Result<String> {
    let http = reqwest::Client::builder().build()?;
    let base = config.http_base();

    let version_url = format!("{}/json/version", base);
    match http.get(&version_url).send().await {
        Ok(response) if response.status().is_success() => {
            if let Ok(info) = response.json::<VersionInfo>().await {
                if let Some(url) = info.web_socket_debugger_url {
                    debug!("Discovered browser target: {}", url);
                    return Ok(url);
                }
            }
        }
        Ok(response) => {
            debug!("{} returned {}", version_url, response.status());
        }
        Err(e) => {
            debug!("{} failed: {}", version_url, e);
        }
    }

    let list_url = format!("{}/json/list", base);
    let targets: Vec<TargetInfo> = http
        .get(&list_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    targets
        .into_iter()
        .find_map(|target| target.web_socket_debugger_url)
        .map(|url| {
            debug!("Discovered page target: {}", url);
            url
        })
        .ok_or_else(|| {
            CdpClientError::Discovery(format!("No debuggable target advertised at {}", base))
        })
}
