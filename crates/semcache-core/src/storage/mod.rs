use crate::errors::StoreError;
use crate::model::{Embedding, NearestMatch, NewRecord};

pub mod schema;
pub mod store;

pub use store::Store;

/// Persistence of cached query/response pairs.
pub trait SimilarityStore: Send + Sync {
    /// Closest successful record to `query`, or `None` when nothing
    /// comparable is stored. Ties go to the lowest id.
    fn find_nearest(&self, query: &Embedding) -> Result<Option<NearestMatch>, StoreError>;

    /// Persists a record and its embedding as one unit. Returns the new id.
    fn append(&self, record: &NewRecord<'_>) -> Result<i64, StoreError>;
}

/// Append-only sink for failed remote calls.
pub trait ErrorSink: Send + Sync {
    fn record_error(
        &self,
        inference_id: Option<i64>,
        error_type: &str,
        error_message: &str,
    ) -> Result<i64, StoreError>;
}
