//! Service layer for the caption store.
//! - `storage`: whole-document JSON file persistence.
//! - `captions`: request schema, normalization and the store trait used by the HTTP layer.
//! - `file`: file-backed implementation of that trait.

pub mod errors;
pub mod storage;
pub mod captions;
pub mod file;
