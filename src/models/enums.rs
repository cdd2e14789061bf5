use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Schedule status of a dose, a medication, or a member's whole day.
///
/// Always derived against a caller's clock at read time, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoseStatus {
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "COMING")]
    Coming,
    #[serde(rename = "PAST_DUE")]
    PastDue,
}

impl DoseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "DONE",
            Self::Coming => "COMING",
            Self::PastDue => "PAST_DUE",
        }
    }
}

impl std::str::FromStr for DoseStatus {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DONE" => Ok(Self::Done),
            "COMING" => Ok(Self::Coming),
            "PAST_DUE" => Ok(Self::PastDue),
            _ => Err(DatabaseError::Malformed {
                field: "DoseStatus".into(),
                value: s.into(),
            }),
        }
    }
}
