use anyhow::{Context, Result};
use std::env;

/// Connection string scheme that selects the in-memory backend.
pub const MEMORY_SCHEME: &str = "memory://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    MongoDb,
}

impl BackendKind {
    /// Name used in connection log lines.
    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Memory => "In-memory store",
            BackendKind::MongoDb => "MongoDB",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_uri: String,
    /// Overrides the database named in `mongo_uri`.
    pub database: Option<String>,
}

impl Config {
    /// Reads `MONGO_URI` and `MONGO_DATABASE`, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mongo_uri = lookup("MONGO_URI")
            .filter(|uri| !uri.trim().is_empty())
            .context("MONGO_URI must be set")?;

        Ok(Config {
            mongo_uri,
            database: lookup("MONGO_DATABASE").filter(|db| !db.trim().is_empty()),
        })
    }

    pub fn backend_kind(&self) -> BackendKind {
        if self.mongo_uri.starts_with(MEMORY_SCHEME) {
            BackendKind::Memory
        } else {
            BackendKind::MongoDb
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn mongo_uri_is_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("MONGO_URI", "  ")]).is_err());
    }

    #[test]
    fn scheme_selects_backend() {
        let memory = config(&[("MONGO_URI", "memory://")]).unwrap();
        assert_eq!(memory.backend_kind(), BackendKind::Memory);
        assert_eq!(memory.backend_kind().label(), "In-memory store");

        let mongo = config(&[
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("MONGO_DATABASE", "fcc"),
        ])
        .unwrap();
        assert_eq!(mongo.backend_kind(), BackendKind::MongoDb);
        assert_eq!(mongo.backend_kind().label(), "MongoDB");
        assert_eq!(mongo.database.as_deref(), Some("fcc"));
    }
}
