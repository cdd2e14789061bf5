use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled medication for one member.
///
/// `dose_ids` is the authoritative list of the medication's dose slots, in
/// display order. Dose rows carry `medication_id` too, but mutations keep
/// this list in step with the dose table: it never names a row that the
/// same update removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub member_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub route: String,
    pub note: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub dose_ids: Vec<Uuid>,
    pub created_by: Uuid,
}

impl Medication {
    /// Whether the schedule is active on the given calendar day.
    ///
    /// Date-only comparison: the start and end days are both included,
    /// and a missing end date means the schedule never expires.
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        if day < self.start_date {
            return false;
        }
        match self.end_date {
            Some(end) => day <= end,
            None => true,
        }
    }
}

/// Caller-supplied medication fields. Ids and the dose-reference list are
/// assigned by the mutation coordinator, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationDraft {
    pub member_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub route: String,
    pub note: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_by: Uuid,
}

/// One scheduled time-of-day slot for a medication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dose {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub time: NaiveTime,
}

/// One entry of an update payload's dose list. The payload presents the
/// full desired list; each entry says what happens to its slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DoseEntry {
    /// Add a slot at this time; the coordinator assigns its id.
    New { time: NaiveTime },
    /// Keep an existing slot, possibly at an edited time.
    Keep { id: Uuid, time: NaiveTime },
    /// Drop the slot. Its administration history is retained.
    Remove { id: Uuid },
}
