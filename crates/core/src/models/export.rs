use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A downloadable JSON document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub contents: Vec<u8>,
}

impl ExportedFile {
    /// Pretty-print `value` into `<prefix>-<YYYY-MM-DD>.json` dated today
    pub fn json<T: Serialize>(prefix: &str, value: &T) -> serde_json::Result<Self> {
        Self::json_dated(prefix, Utc::now().date_naive(), value)
    }

    pub fn json_dated<T: Serialize>(
        prefix: &str,
        date: NaiveDate,
        value: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            filename: format!("{prefix}-{}.json", date.format("%Y-%m-%d")),
            contents: serde_json::to_vec_pretty(value)?,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }

    /// Write into `dir` under `filename`, returning the full path
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        tokio::fs::write(&path, &self.contents).await?;
        Ok(path)
    }
}
