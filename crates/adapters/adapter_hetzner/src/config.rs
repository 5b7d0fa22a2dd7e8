//! Hetzner firewall adapter configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Where the firewall API lives and which rule sets switch a service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HetznerConfig {
    /// Base URL of the Hetzner Cloud API, without the `/v1` suffix.
    pub api_base_url: String,
    /// JSON rule set applied when a service is switched on.
    pub enable_rules_path: PathBuf,
    /// JSON rule set applied when a service is switched off.
    pub disable_rules_path: PathBuf,
    /// Upper bound for one API call, in seconds.
    pub timeout_secs: u64,
}

impl Default for HetznerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.hetzner.cloud".to_string(),
            enable_rules_path: PathBuf::from("./hetznerFirewall/enable-fw.json"),
            disable_rules_path: PathBuf::from("./hetznerFirewall/disable-fw.json"),
            timeout_secs: 10,
        }
    }
}
