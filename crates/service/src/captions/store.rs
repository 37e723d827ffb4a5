use std::collections::HashMap;

use async_trait::async_trait;

use super::SetCaption;
use crate::errors::ServiceError;

/// Trait abstraction for caption storage.
/// The HTTP layer only talks to this; the file-backed implementation lives in
/// `crate::file::caption_store`.
#[async_trait]
pub trait CaptionStore: Send + Sync {
    /// Every caption currently stored, keyed by caption key.
    async fn all(&self) -> Result<HashMap<String, String>, ServiceError>;

    /// Overwrite the caption for one key and persist.
    async fn set(&self, entry: SetCaption) -> Result<(), ServiceError>;
}
