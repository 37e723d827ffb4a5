use std::{
    collections::HashMap,
    hash::Hash,
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

use crate::errors::ServiceError;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// What the read path found at the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// No file yet.
    Missing,
    /// A JSON object; `skipped` entries had keys or values of the wrong type.
    Loaded { skipped: usize },
    /// Unparsable JSON, or JSON that is not an object.
    Corrupt,
}

/// Generic JSON file-backed key-value map store.
///
/// The whole map is the unit of persistence: every read parses the full file and
/// every write replaces it. Nothing is cached in memory, so several processes
/// reading the same file always see the last completed write.
///
/// Writers going through [`JsonMapStore::update`] are serialized by a mutex owned
/// by the store, so create exactly one store per backing file.
pub struct JsonMapStore<K, V> {
    file_path: PathBuf,
    write_lock: Mutex<()>,
    _entries: PhantomData<fn() -> (K, V)>,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    /// Point a store at `path`. Does not touch the filesystem.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), write_lock: Mutex::new(()), _entries: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read the whole map. Missing or malformed content yields an empty map;
    /// only real I/O failures are errors. Never writes.
    pub async fn load(&self) -> Result<HashMap<K, V>, ServiceError> {
        let (map, state) = self.read_document().await?;
        match state {
            DocumentState::Corrupt => {
                warn!(path = %self.file_path.display(), "stored document is not a JSON object; treating as empty");
            }
            DocumentState::Loaded { skipped } if skipped > 0 => {
                warn!(path = %self.file_path.display(), skipped, "ignored entries with unexpected types");
            }
            _ => {}
        }
        Ok(map)
    }

    /// Like [`load`](Self::load) but also reports what was found on disk.
    pub async fn read_document(&self) -> Result<(HashMap<K, V>, DocumentState), ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok((HashMap::new(), DocumentState::Missing));
            }
            Err(e) => return Err(ServiceError::storage(&self.file_path, e)),
        };

        let object = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(object)) => object,
            _ => return Ok((HashMap::new(), DocumentState::Corrupt)),
        };

        let mut map = HashMap::with_capacity(object.len());
        let mut skipped = 0;
        for (k, v) in object {
            let key = serde_json::from_value::<K>(Value::String(k));
            let value = serde_json::from_value::<V>(v);
            match (key, value) {
                (Ok(key), Ok(value)) => {
                    map.insert(key, value);
                }
                _ => skipped += 1,
            }
        }
        Ok((map, DocumentState::Loaded { skipped }))
    }

    /// Replace the file with `map`, creating parent directories as needed.
    ///
    /// Content goes to a sibling temp file first and is renamed over the target,
    /// so readers never observe a half-written document.
    pub async fn save(&self, map: &HashMap<K, V>) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::storage(parent, e))?;
        }

        let data = serde_json::to_vec_pretty(map)?;
        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, &data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage(&self.file_path, e));
        }
        debug!(path = %self.file_path.display(), entries = map.len(), bytes = data.len(), "document saved");
        Ok(())
    }

    /// Load, mutate and save while holding the store's write lock.
    ///
    /// If `f` or the save fails the file is left as it was.
    pub async fn update_map<F>(&self, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<(), ServiceError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await?;
        f(&mut map)?;
        self.save(&map).await
    }

    /// Insert or overwrite one entry and persist the whole map.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        self.update_map(|m| {
            m.insert(key, value);
            Ok(())
        })
        .await
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.file_path
            .with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn tmp_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("json_map_store_{tag}_{}", uuid::Uuid::new_v4()))
            .join("store.json")
    }

    async fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty_without_creating_it() -> Result<(), anyhow::Error> {
        let path = tmp_path("missing");
        let store = JsonMapStore::<String, String>::new(&path);

        let (map, state) = store.read_document().await?;
        assert!(map.is_empty());
        assert_eq!(state, DocumentState::Missing);
        assert!(fs::metadata(&path).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn save_creates_parents_and_load_reads_back() -> Result<(), anyhow::Error> {
        let path = tmp_path("save");
        let store = JsonMapStore::<String, String>::new(&path);

        let mut map = HashMap::new();
        map.insert("a.jpg".to_string(), "beach".to_string());
        store.save(&map).await?;

        let raw = fs::read_to_string(&path).await?;
        assert!(raw.contains('\n'), "expected pretty printed output: {raw}");
        assert_eq!(store.load().await?, map);

        // no temp files left next to the document
        let mut entries = fs::read_dir(path.parent().unwrap()).await?;
        let mut names = Vec::new();
        while let Some(e) = entries.next_entry().await? {
            names.push(e.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["store.json".to_string()]);

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_content_is_treated_as_empty() -> Result<(), anyhow::Error> {
        let path = tmp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).await?;
        let store = JsonMapStore::<String, String>::new(&path);

        for content in ["{not json", "[1,2,3]", "null", "42", "\"text\"", ""] {
            fs::write(&path, content).await?;
            let (map, state) = store.read_document().await?;
            assert!(map.is_empty(), "content {content:?}");
            assert_eq!(state, DocumentState::Corrupt, "content {content:?}");
            // load never rewrites the file
            store.load().await?;
            assert_eq!(fs::read_to_string(&path).await?, content);
        }

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn wrongly_typed_entries_are_skipped() -> Result<(), anyhow::Error> {
        let path = tmp_path("mixed");
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(&path, r#"{"a": "ok", "b": 3, "c": null, "d": ""}"#).await?;
        let store = JsonMapStore::<String, String>::new(&path);

        let (map, state) = store.read_document().await?;
        assert_eq!(state, DocumentState::Loaded { skipped: 2 });
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a").map(String::as_str), Some("ok"));
        assert_eq!(map.get("d").map(String::as_str), Some(""));

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_path_is_a_storage_error() -> Result<(), anyhow::Error> {
        let path = tmp_path("dir");
        // a directory where the file should be
        fs::create_dir_all(&path).await?;
        let store = JsonMapStore::<String, String>::new(&path);

        assert!(matches!(store.load().await, Err(ServiceError::Storage { .. })));
        assert!(matches!(store.insert("k".into(), "v".into()).await, Err(ServiceError::Storage { .. })));

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_leaves_file_untouched() -> Result<(), anyhow::Error> {
        let path = tmp_path("abort");
        let store = JsonMapStore::<String, String>::new(&path);
        store.insert("a".into(), "1".into()).await?;

        let res = store
            .update_map(|m| {
                m.insert("b".into(), "2".into());
                Err(ServiceError::validation("nope"))
            })
            .await;
        assert!(res.is_err());
        let map = store.load().await?;
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("b"));

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_inserts_are_all_persisted() -> Result<(), anyhow::Error> {
        let path = tmp_path("concurrent");
        let store = Arc::new(JsonMapStore::<String, String>::new(&path));

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.insert(format!("k{i}"), format!("v{i}")).await
            }));
        }
        for h in handles {
            h.await??;
        }

        let map = store.load().await?;
        assert_eq!(map.len(), 32);
        assert_eq!(map.get("k17").map(String::as_str), Some("v17"));

        cleanup(&path).await;
        Ok(())
    }
}
