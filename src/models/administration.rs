use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One administration of one dose: append-only. Any row matching a dose
/// and a calendar day makes that dose DONE for the day, so duplicates are
/// harmless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrationLog {
    pub id: Uuid,
    pub dose_id: Uuid,
    pub administered_date: NaiveDate,
    pub administered_time: NaiveTime,
    pub note: Option<String>,
    pub administered_by: Uuid,
}

/// Input for recording an administration; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrationEntry {
    pub dose_id: Uuid,
    pub administered_date: NaiveDate,
    pub administered_time: NaiveTime,
    pub note: Option<String>,
    pub administered_by: Uuid,
}
