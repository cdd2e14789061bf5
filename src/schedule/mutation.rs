//! Schedule mutations: create, reconcile-update, cascade delete, logging.
//!
//! Writes go through the [`ScheduleStore`] seam so tests can inject
//! failures at any step. Create is the only atomic unit (one transaction);
//! update relies on ordering instead: dose rows are written first and the
//! medication row last, carrying exactly the ids that survived, so the
//! stored reference list never names a row the same update removed.

use chrono::NaiveTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{
    AdministrationEntry, AdministrationLog, Dose, DoseEntry, Medication, MedicationDraft,
};

use super::clock::LocalClock;
use super::dashboard::{medication_view, MedicationView};
use super::ScheduleError;

/// Write seam for the mutation coordinators. Implementations stay
/// transaction-agnostic: every method writes through the connection it is
/// handed, which may be a transaction deref.
pub trait ScheduleStore: Send + Sync {
    fn insert_medication(&self, conn: &Connection, med: &Medication) -> Result<(), DatabaseError>;
    fn insert_dose(&self, conn: &Connection, dose: &Dose) -> Result<(), DatabaseError>;
    fn update_medication(&self, conn: &Connection, med: &Medication) -> Result<(), DatabaseError>;
    fn update_dose_time(
        &self,
        conn: &Connection,
        dose_id: &Uuid,
        time: NaiveTime,
    ) -> Result<usize, DatabaseError>;
    fn delete_dose(&self, conn: &Connection, dose_id: &Uuid) -> Result<usize, DatabaseError>;
    fn delete_medication(&self, conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError>;
    fn delete_doses_for_medication(
        &self,
        conn: &Connection,
        medication_id: &Uuid,
    ) -> Result<usize, DatabaseError>;
    fn delete_logs_for_doses(
        &self,
        conn: &Connection,
        dose_ids: &[Uuid],
    ) -> Result<usize, DatabaseError>;
    fn delete_member(&self, conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError>;
    fn insert_log(&self, conn: &Connection, log: &AdministrationLog) -> Result<(), DatabaseError>;
}

/// Default store: straight delegation to the repository functions.
pub struct SqliteScheduleStore;

impl ScheduleStore for SqliteScheduleStore {
    fn insert_medication(&self, conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
        repository::insert_medication(conn, med)
    }

    fn insert_dose(&self, conn: &Connection, dose: &Dose) -> Result<(), DatabaseError> {
        repository::insert_dose(conn, dose)
    }

    fn update_medication(&self, conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
        repository::update_medication(conn, med)
    }

    fn update_dose_time(
        &self,
        conn: &Connection,
        dose_id: &Uuid,
        time: NaiveTime,
    ) -> Result<usize, DatabaseError> {
        repository::update_dose_time(conn, dose_id, time)
    }

    fn delete_dose(&self, conn: &Connection, dose_id: &Uuid) -> Result<usize, DatabaseError> {
        repository::delete_dose(conn, dose_id)
    }

    fn delete_medication(&self, conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
        repository::delete_medication(conn, id)
    }

    fn delete_doses_for_medication(
        &self,
        conn: &Connection,
        medication_id: &Uuid,
    ) -> Result<usize, DatabaseError> {
        repository::delete_doses_for_medication(conn, medication_id)
    }

    fn delete_logs_for_doses(
        &self,
        conn: &Connection,
        dose_ids: &[Uuid],
    ) -> Result<usize, DatabaseError> {
        repository::delete_logs_for_doses(conn, dose_ids)
    }

    fn delete_member(&self, conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
        repository::delete_member(conn, id)
    }

    fn insert_log(&self, conn: &Connection, log: &AdministrationLog) -> Result<(), DatabaseError> {
        repository::insert_administration_log(conn, log)
    }
}

/// Create a medication with its dose slots in one transaction and return
/// it classified against the caller's clock.
pub fn create_medication(
    conn: &Connection,
    draft: &MedicationDraft,
    dose_times: &[NaiveTime],
    clock: &LocalClock,
) -> Result<MedicationView, ScheduleError> {
    create_medication_with(conn, &SqliteScheduleStore, draft, dose_times, clock)
}

pub fn create_medication_with(
    conn: &Connection,
    store: &dyn ScheduleStore,
    draft: &MedicationDraft,
    dose_times: &[NaiveTime],
    clock: &LocalClock,
) -> Result<MedicationView, ScheduleError> {
    if dose_times.is_empty() {
        return Err(ScheduleError::Validation(
            "a medication needs at least one dose time".into(),
        ));
    }

    // Ids are assigned before any write so the medication row carries its
    // full dose-reference list from the first insert.
    let medication_id = Uuid::new_v4();
    let dose_ids: Vec<Uuid> = dose_times.iter().map(|_| Uuid::new_v4()).collect();

    let medication = Medication {
        id: medication_id,
        member_id: draft.member_id,
        name: draft.name.clone(),
        dosage: draft.dosage.clone(),
        route: draft.route.clone(),
        note: draft.note.clone(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        dose_ids: dose_ids.clone(),
        created_by: draft.created_by,
    };

    let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;

    store.insert_medication(&tx, &medication)?;
    for (dose_id, at) in dose_ids.iter().zip(dose_times) {
        store.insert_dose(&tx, &Dose {
            id: *dose_id,
            medication_id,
            time: *at,
        })?;
    }

    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        medication_id = %medication_id,
        member_id = %draft.member_id,
        doses = dose_ids.len(),
        "Medication created"
    );

    medication_view(conn, medication, clock)
}

/// Reconcile a medication against the full dose list the caller wants.
///
/// New slots are inserted with fresh ids, kept slots get their time
/// rewritten, removed slots lose their row but keep their administration
/// history. The medication row is written last with the survivor ids.
pub fn update_medication(
    conn: &Connection,
    id: &Uuid,
    draft: &MedicationDraft,
    entries: &[DoseEntry],
    clock: &LocalClock,
) -> Result<MedicationView, ScheduleError> {
    update_medication_with(conn, &SqliteScheduleStore, id, draft, entries, clock)
}

pub fn update_medication_with(
    conn: &Connection,
    store: &dyn ScheduleStore,
    id: &Uuid,
    draft: &MedicationDraft,
    entries: &[DoseEntry],
    clock: &LocalClock,
) -> Result<MedicationView, ScheduleError> {
    let existing = repository::get_medication(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Medication".into(),
        id: id.to_string(),
    })?;

    let surviving = entries
        .iter()
        .filter(|e| !matches!(e, DoseEntry::Remove { .. }))
        .count();
    if surviving == 0 {
        return Err(ScheduleError::Validation(
            "an update must leave at least one dose".into(),
        ));
    }

    let mut dose_ids = Vec::with_capacity(surviving);
    for entry in entries {
        match entry {
            DoseEntry::New { time } => {
                let dose = Dose {
                    id: Uuid::new_v4(),
                    medication_id: *id,
                    time: *time,
                };
                store.insert_dose(conn, &dose)?;
                dose_ids.push(dose.id);
            }
            DoseEntry::Keep { id: dose_id, time } => {
                let updated = store.update_dose_time(conn, dose_id, *time)?;
                if updated == 0 {
                    return Err(DatabaseError::NotFound {
                        entity_type: "Dose".into(),
                        id: dose_id.to_string(),
                    }
                    .into());
                }
                dose_ids.push(*dose_id);
            }
            DoseEntry::Remove { id: dose_id } => {
                let deleted = store.delete_dose(conn, dose_id)?;
                if deleted == 0 {
                    tracing::debug!(dose_id = %dose_id, "Remove entry for a dose already gone");
                }
            }
        }
    }

    let medication = Medication {
        id: *id,
        member_id: draft.member_id,
        name: draft.name.clone(),
        dosage: draft.dosage.clone(),
        route: draft.route.clone(),
        note: draft.note.clone(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        dose_ids,
        // Ownership never changes hands on update
        created_by: existing.created_by,
    };
    store.update_medication(conn, &medication)?;

    tracing::info!(
        medication_id = %id,
        doses = medication.dose_ids.len(),
        "Medication updated"
    );

    medication_view(conn, medication, clock)
}

/// Delete a medication, its dose slots, and their administration logs.
pub fn delete_medication(conn: &Connection, id: &Uuid) -> Result<(), ScheduleError> {
    delete_medication_with(conn, &SqliteScheduleStore, id)
}

pub fn delete_medication_with(
    conn: &Connection,
    store: &dyn ScheduleStore,
    id: &Uuid,
) -> Result<(), ScheduleError> {
    // Collect dose ids before the rows go away; log cleanup needs them.
    let dose_ids = repository::dose_ids_for_medication(conn, id)?;

    let deleted = store.delete_medication(conn, id)?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Medication".into(),
            id: id.to_string(),
        }
        .into());
    }

    // The medication row is the commitment; cleanup failures below are
    // logged and swallowed. Once the owning medication is gone, orphaned
    // dose and log rows are unreachable from reads.
    let doses_removed = match store.delete_doses_for_medication(conn, id) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(medication_id = %id, error = %e, "Dose cleanup failed after medication delete");
            0
        }
    };
    let logs_removed = match store.delete_logs_for_doses(conn, &dose_ids) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(medication_id = %id, error = %e, "Log cleanup failed after medication delete");
            0
        }
    };

    tracing::info!(
        medication_id = %id,
        doses = doses_removed,
        logs = logs_removed,
        "Medication cascade-deleted"
    );

    Ok(())
}

/// Delete a member and cascade through every medication they have.
pub fn delete_member(conn: &Connection, id: &Uuid) -> Result<(), ScheduleError> {
    delete_member_with(conn, &SqliteScheduleStore, id)
}

pub fn delete_member_with(
    conn: &Connection,
    store: &dyn ScheduleStore,
    id: &Uuid,
) -> Result<(), ScheduleError> {
    let medications = repository::medications_by_member(conn, id)?;

    // Each medication cascade settles on its own; one failing does not
    // stop the rest or the member removal.
    let mut failed = 0usize;
    for med in &medications {
        if let Err(e) = delete_medication_with(conn, store, &med.id) {
            failed += 1;
            tracing::warn!(
                member_id = %id,
                medication_id = %med.id,
                error = %e,
                "Medication cascade failed during member delete"
            );
        }
    }

    let deleted = store.delete_member(conn, id)?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Member".into(),
            id: id.to_string(),
        }
        .into());
    }

    tracing::info!(
        member_id = %id,
        medications = medications.len() - failed,
        "Member deleted with medication cascade"
    );

    Ok(())
}

/// Record that a dose was given. Pure append: duplicates for the same dose
/// and day are allowed and harmless.
pub fn log_dose_administered(
    conn: &Connection,
    entry: &AdministrationEntry,
) -> Result<AdministrationLog, ScheduleError> {
    log_dose_administered_with(conn, &SqliteScheduleStore, entry)
}

pub fn log_dose_administered_with(
    conn: &Connection,
    store: &dyn ScheduleStore,
    entry: &AdministrationEntry,
) -> Result<AdministrationLog, ScheduleError> {
    let log = AdministrationLog {
        id: Uuid::new_v4(),
        dose_id: entry.dose_id,
        administered_date: entry.administered_date,
        administered_time: entry.administered_time,
        note: entry.note.clone(),
        administered_by: entry.administered_by,
    };
    store.insert_log(conn, &log)?;

    tracing::info!(
        dose_id = %log.dose_id,
        administered_date = %log.administered_date,
        "Dose administration logged"
    );

    Ok(log)
}
