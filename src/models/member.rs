use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A household member whose medications are tracked.
/// `created_by` is the opaque id of the account that owns the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub created_by: Uuid,
}
