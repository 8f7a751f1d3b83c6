/// Database location handling
use anyhow::Context;
use mlc_storage::SqlitePool;
use std::path::Path;

/// Open the database, creating the directory of a file-backed one first
pub async fn open_database(database_url: &str) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = database_file(database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }

    mlc_storage::open(database_url)
        .await
        .with_context(|| format!("Failed to open database {}", database_url))
}

/// File path of a `sqlite:` URL, or `None` for in-memory databases
pub fn database_file(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Some(Path::new(path))
}
