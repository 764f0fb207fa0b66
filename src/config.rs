use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the catalog JSON comes from. Exactly one of `url` / `path`.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Reload the catalog after this many seconds. Unset = load once.
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_min_query_len() -> usize {
    2
}
fn default_debounce_ms() -> u64 {
    800
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    // Validate source
    match (&config.source.url, &config.source.path) {
        (Some(_), Some(_)) => anyhow::bail!("source.url and source.path are mutually exclusive"),
        (None, None) => anyhow::bail!("one of source.url or source.path must be set"),
        (Some(url), None) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            anyhow::bail!("source.url must be an http(s) URL, got '{}'", url)
        }
        _ => {}
    }
    if config.source.timeout_secs == 0 {
        anyhow::bail!("source.timeout_secs must be > 0");
    }

    // Validate search
    if config.search.min_query_len == 0 {
        anyhow::bail!("search.min_query_len must be >= 1");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in() {
        let cfg = parse_config(
            r#"
[source]
url = "https://pixeltrace.me/matched_photos.json"
"#,
        )
        .unwrap();
        assert_eq!(cfg.source.timeout_secs, 30);
        assert_eq!(cfg.source.cache_ttl_secs, None);
        assert_eq!(cfg.search.min_query_len, 2);
        assert_eq!(cfg.search.debounce_ms, 800);
        assert_eq!(cfg.server.bind, "127.0.0.1:8000");
    }

    #[test]
    fn rejects_both_or_neither_source() {
        let both = r#"
[source]
url = "https://example.com/a.json"
path = "a.json"
"#;
        assert!(parse_config(both).is_err());

        let neither = "[source]\n";
        assert!(parse_config(neither).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_config("[source]\nurl = \"ftp://x\"\n").is_err());
        assert!(parse_config("[source]\npath = \"a.json\"\ntimeout_secs = 0\n").is_err());
        assert!(
            parse_config("[source]\npath = \"a.json\"\n[search]\nmin_query_len = 0\n").is_err()
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
