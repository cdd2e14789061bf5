//! Read path: classified medication views and the household dashboard.
//!
//! The pipeline per member: drop medications whose date window misses the
//! clock's day, fetch the day's administration logs for every surviving
//! dose in one query, classify each slot, roll up. Nothing is written.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::models::{Dose, DoseStatus, Medication};

use super::clock::LocalClock;
use super::status::{classify_dose, roll_up};
use super::ScheduleError;

/// One dose slot with its derived status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseView {
    pub id: Uuid,
    pub time: NaiveTime,
    pub status: DoseStatus,
}

/// A medication with every slot classified and the roll-up attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationView {
    pub id: Uuid,
    pub member_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub route: String,
    pub note: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub doses: Vec<DoseView>,
    pub status: DoseStatus,
    pub created_by: Uuid,
}

/// Dashboard line for one member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDayStatus {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub status: DoseStatus,
    pub created_by: Uuid,
}

/// Medications of one member active on the clock's day, classified.
pub fn medications_for_member(
    conn: &Connection,
    member_id: &Uuid,
    clock: &LocalClock,
) -> Result<Vec<MedicationView>, ScheduleError> {
    let meds: Vec<Medication> = repository::medications_by_member(conn, member_id)?
        .into_iter()
        .filter(|m| m.is_active_on(clock.day))
        .collect();

    let dose_ids: Vec<Uuid> = meds.iter().flat_map(|m| m.dose_ids.iter().copied()).collect();
    let doses = dose_map(conn, &dose_ids)?;
    let logged = repository::logged_dose_ids(conn, &dose_ids, clock.day)?;

    Ok(meds
        .into_iter()
        .map(|m| build_view(m, &doses, &logged, clock))
        .collect())
}

/// Every member's day at a glance, in dashboard name order.
pub fn member_dashboard(
    conn: &Connection,
    clock: &LocalClock,
) -> Result<Vec<MemberDayStatus>, ScheduleError> {
    let members = repository::list_members(conn)?;

    let mut rows = Vec::with_capacity(members.len());
    for member in members {
        let medications = medications_for_member(conn, &member.id, clock)?;
        let status = roll_up(medications.iter().map(|m| m.status));
        rows.push(MemberDayStatus {
            id: member.id,
            first_name: member.first_name,
            last_name: member.last_name,
            status,
            created_by: member.created_by,
        });
    }
    Ok(rows)
}

/// Classify a single medication; the return path of create and update.
/// No date-window filter here: the caller just wrote this medication and
/// gets it back classified whether or not it is active today.
pub(crate) fn medication_view(
    conn: &Connection,
    med: Medication,
    clock: &LocalClock,
) -> Result<MedicationView, ScheduleError> {
    let doses = dose_map(conn, &med.dose_ids)?;
    let logged = repository::logged_dose_ids(conn, &med.dose_ids, clock.day)?;
    Ok(build_view(med, &doses, &logged, clock))
}

fn dose_map(conn: &Connection, ids: &[Uuid]) -> Result<HashMap<Uuid, Dose>, ScheduleError> {
    let doses = repository::doses_by_ids(conn, ids)?;
    Ok(doses.into_iter().map(|d| (d.id, d)).collect())
}

fn build_view(
    med: Medication,
    doses: &HashMap<Uuid, Dose>,
    logged: &HashSet<Uuid>,
    clock: &LocalClock,
) -> MedicationView {
    let mut dose_views = Vec::with_capacity(med.dose_ids.len());
    for dose_id in &med.dose_ids {
        let dose = match doses.get(dose_id) {
            Some(d) => d,
            None => {
                tracing::warn!(
                    medication_id = %med.id,
                    dose_id = %dose_id,
                    "Dose referenced by medication has no row, skipping"
                );
                continue;
            }
        };
        dose_views.push(DoseView {
            id: dose.id,
            time: dose.time,
            status: classify_dose(dose.time, clock, logged.contains(&dose.id)),
        });
    }

    let status = roll_up(dose_views.iter().map(|d| d.status));

    MedicationView {
        id: med.id,
        member_id: med.member_id,
        name: med.name,
        dosage: med.dosage,
        route: med.route,
        note: med.note,
        start_date: med.start_date,
        end_date: med.end_date,
        doses: dose_views,
        status,
        created_by: med.created_by,
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::db::sqlite::open_memory_database;
    use crate::models::{AdministrationLog, Member};

    use super::*;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 11:00 on Christmas morning, caller-local
    fn christmas_eleven() -> LocalClock {
        LocalClock::fixed(day(2021, 12, 25).and_time(t(11, 0)))
    }

    fn seed_member(conn: &Connection, first_name: &str) -> Uuid {
        let id = Uuid::new_v4();
        repository::insert_member(conn, &Member {
            id,
            first_name: first_name.into(),
            last_name: None,
            created_by: Uuid::new_v4(),
        }).unwrap();
        id
    }

    fn seed_medication(
        conn: &Connection,
        member_id: &Uuid,
        start: NaiveDate,
        end: Option<NaiveDate>,
        times: &[NaiveTime],
    ) -> (Uuid, Vec<Uuid>) {
        let med_id = Uuid::new_v4();
        let dose_ids: Vec<Uuid> = times.iter().map(|_| Uuid::new_v4()).collect();
        for (dose_id, at) in dose_ids.iter().zip(times) {
            repository::insert_dose(conn, &Dose {
                id: *dose_id,
                medication_id: med_id,
                time: *at,
            }).unwrap();
        }
        repository::insert_medication(conn, &Medication {
            id: med_id,
            member_id: *member_id,
            name: "Amoxicillin".into(),
            dosage: "250 mg".into(),
            route: "Mouth".into(),
            note: None,
            start_date: start,
            end_date: end,
            dose_ids: dose_ids.clone(),
            created_by: Uuid::new_v4(),
        }).unwrap();
        (med_id, dose_ids)
    }

    fn seed_log(conn: &Connection, dose_id: &Uuid, on: NaiveDate) {
        repository::insert_administration_log(conn, &AdministrationLog {
            id: Uuid::new_v4(),
            dose_id: *dose_id,
            administered_date: on,
            administered_time: t(9, 0),
            note: None,
            administered_by: Uuid::new_v4(),
        }).unwrap();
    }

    #[test]
    fn classifies_each_dose_and_rolls_up() {
        let conn = test_db();
        let member = seed_member(&conn, "Astrid");
        let (_, dose_ids) = seed_medication(
            &conn,
            &member,
            day(2021, 10, 1),
            Some(day(2021, 12, 31)),
            &[t(17, 0), t(11, 45), t(9, 59)],
        );
        // 17:00 logged today: DONE despite being hours away
        seed_log(&conn, &dose_ids[0], day(2021, 12, 25));
        // 09:59 logged yesterday only: does not count today
        seed_log(&conn, &dose_ids[2], day(2021, 12, 24));

        let views = medications_for_member(&conn, &member, &christmas_eleven()).unwrap();
        assert_eq!(views.len(), 1);

        let statuses: Vec<DoseStatus> = views[0].doses.iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![DoseStatus::Done, DoseStatus::Coming, DoseStatus::PastDue]
        );
        assert_eq!(views[0].status, DoseStatus::PastDue);
    }

    #[test]
    fn date_window_excludes_expired_and_unstarted() {
        let conn = test_db();
        let member = seed_member(&conn, "Astrid");
        // ended yesterday
        seed_medication(&conn, &member, day(2021, 10, 1), Some(day(2021, 12, 24)), &[t(8, 0)]);
        // starts tomorrow
        seed_medication(&conn, &member, day(2021, 12, 26), None, &[t(8, 0)]);
        // open-ended, started long ago
        seed_medication(&conn, &member, day(2021, 10, 1), None, &[t(8, 0)]);
        // ends exactly today
        seed_medication(&conn, &member, day(2021, 10, 1), Some(day(2021, 12, 25)), &[t(8, 0)]);

        let views = medications_for_member(&conn, &member, &christmas_eleven()).unwrap();
        assert_eq!(views.len(), 2);
    }

    #[test]
    fn dose_views_follow_reference_order() {
        let conn = test_db();
        let member = seed_member(&conn, "Astrid");
        // deliberately unsorted times; display order is the stored list order
        let (_, dose_ids) = seed_medication(
            &conn,
            &member,
            day(2021, 10, 1),
            None,
            &[t(18, 0), t(8, 0), t(12, 30)],
        );

        let views = medications_for_member(&conn, &member, &christmas_eleven()).unwrap();
        let got: Vec<Uuid> = views[0].doses.iter().map(|d| d.id).collect();
        assert_eq!(got, dose_ids);
    }

    #[test]
    fn dangling_dose_reference_is_skipped_not_fatal() {
        let conn = test_db();
        let member = seed_member(&conn, "Astrid");
        let (med_id, _) = seed_medication(&conn, &member, day(2021, 10, 1), None, &[t(8, 0)]);

        let mut med = repository::get_medication(&conn, &med_id).unwrap().unwrap();
        med.dose_ids.push(Uuid::new_v4()); // row that does not exist
        repository::update_medication(&conn, &med).unwrap();

        let views = medications_for_member(&conn, &member, &christmas_eleven()).unwrap();
        assert_eq!(views[0].doses.len(), 1);
    }

    #[test]
    fn zero_dose_medication_reads_done() {
        let conn = test_db();
        let member = seed_member(&conn, "Astrid");
        seed_medication(&conn, &member, day(2021, 10, 1), None, &[]);

        let views = medications_for_member(&conn, &member, &christmas_eleven()).unwrap();
        assert_eq!(views[0].status, DoseStatus::Done);
    }

    #[test]
    fn dashboard_sorts_members_and_rolls_up() {
        let conn = test_db();
        let zoe = seed_member(&conn, "Zoe");
        let amy = seed_member(&conn, "Amy");
        let milo = seed_member(&conn, "Milo");

        // Zoe missed her 08:00 dose; Milo has one coming at 11:30; Amy has
        // no medications at all.
        seed_medication(&conn, &zoe, day(2021, 10, 1), None, &[t(8, 0), t(20, 0)]);
        seed_medication(&conn, &milo, day(2021, 10, 1), None, &[t(11, 30)]);

        let rows = member_dashboard(&conn, &christmas_eleven()).unwrap();
        let got: Vec<(String, DoseStatus)> = rows
            .into_iter()
            .map(|r| (r.first_name, r.status))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Amy".to_string(), DoseStatus::Done),
                ("Milo".to_string(), DoseStatus::Coming),
                ("Zoe".to_string(), DoseStatus::PastDue),
            ]
        );
    }

    #[test]
    fn dashboard_done_once_everything_is_logged() {
        let conn = test_db();
        let member = seed_member(&conn, "Astrid");
        let (_, dose_ids) =
            seed_medication(&conn, &member, day(2021, 10, 1), None, &[t(8, 0), t(20, 0)]);
        seed_log(&conn, &dose_ids[0], day(2021, 12, 25));
        seed_log(&conn, &dose_ids[1], day(2021, 12, 25));

        let rows = member_dashboard(&conn, &christmas_eleven()).unwrap();
        assert_eq!(rows[0].status, DoseStatus::Done);
    }
}
