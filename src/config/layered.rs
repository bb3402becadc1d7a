//! File + environment configuration layers.
//!
//! Environment variables named `<PREFIX>__<KEY>__<FIELD>` override the file,
//! so `DBFACTORY__DB_MAIN__PATH=/tmp/main.db` sets `path` in `[db_main]`.
//! Values are parsed as booleans or numbers when they look like one.

use super::ConfigError;
use ::config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Environment prefix used by the CLI.
pub const ENV_PREFIX: &str = "DBFACTORY";

/// Merge an optional TOML file with `<env_prefix>__*` variables.
///
/// # Errors
///
/// - `ConfigError::NotFound` if `path` is given but does not exist
/// - `ConfigError::Layered` if a source fails to load or the result is not a table
pub fn load_layered(path: Option<&Path>, env_prefix: &str) -> Result<toml::Table, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(env_prefix)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let merged = builder
        .build()
        .map_err(|e| ConfigError::Layered(e.to_string()))?;

    merged
        .try_deserialize::<toml::Table>()
        .map_err(|e| ConfigError::Layered(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_only() {
        let temp = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(
            temp.path(),
            "[db_main]\ndbtype = \"sqlite\"\npath = \"a.db\"\n",
        )
        .unwrap();

        let table = load_layered(Some(temp.path()), "DBFACTORY_TEST_FILEONLY").unwrap();
        let main = table["db_main"].as_table().unwrap();
        assert_eq!(main["dbtype"].as_str(), Some("sqlite"));
        assert_eq!(main["path"].as_str(), Some("a.db"));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(
            temp.path(),
            "[db_main]\ndbtype = \"sqlite\"\npath = \"a.db\"\n",
        )
        .unwrap();

        std::env::set_var("DBFACTORY_TEST_OVERRIDE__DB_MAIN__PATH", "b.db");
        std::env::set_var("DBFACTORY_TEST_OVERRIDE__DB_CACHE__DBTYPE", "memkv");
        std::env::set_var("DBFACTORY_TEST_OVERRIDE__DB_CACHE__CAPACITY", "32");
        let table = load_layered(Some(temp.path()), "DBFACTORY_TEST_OVERRIDE");
        std::env::remove_var("DBFACTORY_TEST_OVERRIDE__DB_MAIN__PATH");
        std::env::remove_var("DBFACTORY_TEST_OVERRIDE__DB_CACHE__DBTYPE");
        std::env::remove_var("DBFACTORY_TEST_OVERRIDE__DB_CACHE__CAPACITY");

        let table = table.unwrap();
        let main = table["db_main"].as_table().unwrap();
        assert_eq!(main["path"].as_str(), Some("b.db"));
        assert_eq!(main["dbtype"].as_str(), Some("sqlite"));

        let cache = table["db_cache"].as_table().unwrap();
        assert_eq!(cache["dbtype"].as_str(), Some("memkv"));
        assert_eq!(cache["capacity"].as_integer(), Some(32));
    }

    #[test]
    fn test_missing_file() {
        let result = load_layered(Some(Path::new("/nonexistent/dbs.toml")), ENV_PREFIX);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
