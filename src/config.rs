use dioxus::prelude::*;
use serde::Deserialize;

pub const DEFAULT_WRITEUPS_INDEX_URL: &str = "/writeups/index.json";
pub const DEFAULT_CONFETTI_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/canvas-confetti@1.9.3/dist/confetti.browser.min.js";

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_writeups_index_url")]
    pub writeups_index_url: String,
    #[serde(default = "default_confetti_script_url")]
    pub confetti_script_url: String,
}

fn default_writeups_index_url() -> String {
    DEFAULT_WRITEUPS_INDEX_URL.to_string()
}

fn default_confetti_script_url() -> String {
    DEFAULT_CONFETTI_SCRIPT_URL.to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            writeups_index_url: default_writeups_index_url(),
            confetti_script_url: default_confetti_script_url(),
        }
    }
}

/// Resolves to the deployed config, or the defaults when none is served.
pub fn use_runtime_config() -> Resource<RuntimeConfig> {
    use_resource(|| async move {
        match fetch_runtime_config().await {
            Ok(config) => config,
            Err(message) => {
                tracing::warn!("config: {message}, using defaults");
                RuntimeConfig::default()
            }
        }
    })
}

#[cfg(target_arch = "wasm32")]
async fn fetch_runtime_config() -> Result<RuntimeConfig, String> {
    match fetch_config_from("/config.json").await {
        Ok(config) => Ok(config),
        Err(_) => fetch_config_from("/assets/config.json").await,
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_config_from(path: &str) -> Result<RuntimeConfig, String> {
    let response = gloo_net::http::Request::get(path)
        .send()
        .await
        .map_err(|err| format!("config fetch failed: {err}"))?;
    if !response.ok() {
        return Err(format!("config fetch failed: status {}", response.status()));
    }
    response
        .json::<RuntimeConfig>()
        .await
        .map_err(|err| format!("config decode failed: {err}"))
}

#[cfg(not(target_arch = "wasm32"))]
async fn fetch_runtime_config() -> Result<RuntimeConfig, String> {
    let writeups_index_url =
        std::env::var("WRITEUPS_INDEX_URL").unwrap_or_else(|_| default_writeups_index_url());
    let confetti_script_url =
        std::env::var("CONFETTI_SCRIPT_URL").unwrap_or_else(|_| default_confetti_script_url());
    Ok(RuntimeConfig {
        writeups_index_url,
        confetti_script_url,
    })
}
