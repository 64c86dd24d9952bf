use serde::Deserialize;

/// Main configuration structure for spindex
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub spider: SpiderConfig,
    pub searcher: SearcherConfig,
}

/// Relational store connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database server host
    pub host: String,

    /// Database server port
    pub port: u16,

    /// Database name
    pub name: String,

    /// Database user
    pub user: String,

    /// Database password
    pub password: String,
}

/// Spider behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SpiderConfig {
    /// Seed URL the crawl starts from
    #[serde(rename = "startUrl")]
    pub start_url: String,

    /// Maximum hop count from the seed
    #[serde(rename = "maxDepth")]
    pub max_depth: u32,

    /// Whether to run the spider at all (the frontend runs either way)
    #[serde(rename = "runSpider", default = "default_run_spider")]
    pub run_spider: bool,

    /// Wipe all indexed data before crawling
    #[serde(rename = "wipeOnStart", default)]
    pub wipe_on_start: bool,

    /// Verify TLS certificates when fetching
    #[serde(rename = "verifyTls", default = "default_verify_tls")]
    pub verify_tls: bool,
}

/// Search frontend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearcherConfig {
    /// TCP port the HTTP frontend listens on
    pub port: u16,
}

fn default_run_spider() -> bool {
    true
}

fn default_verify_tls() -> bool {
    true
}
