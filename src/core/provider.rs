use crate::core::record::Record;
use crate::error::Error;
use async_trait::async_trait;

/// Lists all records in a zone.
#[async_trait]
pub trait RecordGetter: Send + Sync {
    async fn get_records(&self, zone: &str) -> Result<Vec<Record>, Error>;
}

/// Creates records in a zone without touching existing ones.
/// Returns the records that were added.
#[async_trait]
pub trait RecordAppender: Send + Sync {
    async fn append_records(&self, zone: &str, records: Vec<Record>)
    -> Result<Vec<Record>, Error>;
}

/// Replaces every record matching the inputs' (name, type) pairs with
/// exactly the input records, in one request. Returns the records now live.
#[async_trait]
pub trait RecordSetter: Send + Sync {
    async fn set_records(&self, zone: &str, records: Vec<Record>) -> Result<Vec<Record>, Error>;
}

/// Deletes records from a zone. Returns the records that were deleted;
/// a mid-list failure surfaces the already-deleted prefix inside the error.
#[async_trait]
pub trait RecordDeleter: Send + Sync {
    async fn delete_records(&self, zone: &str, records: Vec<Record>)
    -> Result<Vec<Record>, Error>;
}
