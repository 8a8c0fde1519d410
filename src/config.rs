use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Remote collaborators
    pub registry_base_url: String,
    pub transliterator_url: Option<String>,
    pub request_timeout: Duration,

    // Validation switches
    pub skip_remote_checks: bool,
    pub relaxed_normalization: bool,

    // Derivation passes run by the batch driver
    pub romanize: bool,
    pub sluggify: bool,
    pub summarize: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Place registry
            registry_base_url: std::env::var("REGISTRY_BASE_URL")
                .unwrap_or_else(|_| "https://pleiades.stoa.org".to_string()),

            // Transliteration service; unset means romanization falls
            // back to locally derived forms only.
            transliterator_url: std::env::var("TRANSLITERATOR_URL").ok(),

            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),

            skip_remote_checks: env_flag("SKIP_REMOTE_CHECKS"),
            relaxed_normalization: env_flag("RELAXED_NORMALIZATION"),

            romanize: env_flag_default("ROMANIZE", true),
            sluggify: env_flag_default("SLUGGIFY", true),
            summarize: env_flag_default("SUMMARIZE", true),
        })
    }
}

fn env_flag(name: &str) -> bool {
    env_flag_default(name, false)
}

fn env_flag_default(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        std::env::set_var("TEST_CONFIG_FLAG_A", "true");
        std::env::set_var("TEST_CONFIG_FLAG_B", "0");
        assert!(env_flag("TEST_CONFIG_FLAG_A"));
        assert!(!env_flag("TEST_CONFIG_FLAG_B"));
        assert!(!env_flag("TEST_CONFIG_FLAG_UNSET"));
        assert!(env_flag_default("TEST_CONFIG_FLAG_UNSET", true));
    }
}
