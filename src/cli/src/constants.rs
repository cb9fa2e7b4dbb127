pub const ENV_PREFIX: &str = "PSTREE";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_CONFIG_FILE: &str = "pstree.toml";
