use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};

use crate::captions::{CaptionStore, SetCaption};
use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// File-backed caption store.
/// Keeps a map of `caption key -> caption` persisted as one JSON document.
pub struct FileCaptionStore {
    store: JsonMapStore<String, String>,
}

impl FileCaptionStore {
    /// Bind the store to a file path. The file is created on first write.
    pub fn new<P: Into<PathBuf>>(path: P) -> Arc<Self> {
        Arc::new(Self { store: JsonMapStore::new(path) })
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }
}

#[async_trait::async_trait]
impl CaptionStore for FileCaptionStore {
    async fn all(&self) -> Result<HashMap<String, String>, ServiceError> {
        self.store.load().await
    }

    async fn set(&self, entry: SetCaption) -> Result<(), ServiceError> {
        self.store.insert(entry.key, entry.caption).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn tmp_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("svc_captions_{}", Uuid::new_v4()))
            .join("captions.json")
    }

    #[tokio::test]
    async fn caption_store_basic_flow() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let store = FileCaptionStore::new(&path);

        // initially empty
        assert!(store.all().await?.is_empty());

        store.set(SetCaption::from_json(json!({"key": "a.jpg", "caption": "first"}))?).await?;
        store.set(SetCaption::from_json(json!({"key": "b.jpg", "caption": "second"}))?).await?;
        store.set(SetCaption::from_json(json!({"key": "a.jpg", "caption": "again"}))?).await?;

        let all = store.all().await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all["a.jpg"], "again");

        // a fresh store over the same file sees the same data
        let reopened = FileCaptionStore::new(&path);
        assert_eq!(reopened.all().await?, all);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn repeated_write_is_idempotent() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let store = FileCaptionStore::new(&path);
        let entry = SetCaption { key: "k".into(), caption: "same".into() };

        store.set(entry.clone()).await?;
        let once = tokio::fs::read(&path).await?;
        store.set(entry).await?;
        let twice = tokio::fs::read(&path).await?;
        assert_eq!(once, twice);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}
