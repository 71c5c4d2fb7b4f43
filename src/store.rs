use async_trait::async_trait;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::error::StoreError;

/// Durable best (lowest) value per task name.
#[async_trait]
pub trait BestValueStore: Send + Sync {
    /// Missing or unreadable records read as `None`.
    async fn read(&self, key: &str) -> Option<Decimal>;

    async fn write(&self, key: &str, value: Decimal) -> Result<(), StoreError>;
}

/// `candidate` improves on `best` when nothing is stored yet or it is strictly lower.
pub fn improves(candidate: Decimal, best: Option<Decimal>) -> bool {
    match best {
        None => true,
        Some(best) => candidate < best,
    }
}

/// Text written to the store and rendered in notifications.
pub fn format_value(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// One file per task under `root`, holding the value with two decimals.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BestValueStore for FileStore {
    async fn read(&self, key: &str) -> Option<Decimal> {
        let path = self.path_for(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read stored value: {}", e);
                return None;
            }
        };

        match Decimal::from_str(content.trim()) {
            Ok(value) if value > Decimal::ZERO => Some(value),
            _ => {
                tracing::warn!(
                    path = %path.display(),
                    content = %content.trim(),
                    "ignoring unusable stored value"
                );
                None
            }
        }
    }

    async fn write(&self, key: &str, value: Decimal) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let io_err = |source| StoreError::Write {
            path: path.display().to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.root).await.map_err(io_err)?;

        // Write aside then rename so a crash never leaves a half-written record.
        let tmp = self.root.join(format!(".{}.tmp", key));
        tokio::fs::write(&tmp, format_value(value)).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;

        tracing::debug!(path = %path.display(), value = %format_value(value), "stored best value");
        Ok(())
    }
}
