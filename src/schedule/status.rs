//! Dose status classification and roll-up.

use chrono::{Duration, NaiveTime};

use crate::models::DoseStatus;

use super::clock::LocalClock;

/// Half-width of the "due now" window, in minutes. A dose exactly this far
/// from now, on either side, still counts as COMING; one second further on
/// the late side tips it to PAST_DUE.
pub const IMMINENT_WINDOW_MINUTES: i64 = 60;

/// Classify one dose slot against the caller's clock.
///
/// A log row for the dose on the clock's day wins outright. Otherwise the
/// dose instant is the clock's day combined with the slot's time: only
/// slots more than the window behind now are PAST_DUE; everything else,
/// far-future slots included, is COMING.
pub fn classify_dose(dose_time: NaiveTime, clock: &LocalClock, logged_today: bool) -> DoseStatus {
    if logged_today {
        return DoseStatus::Done;
    }

    let window = Duration::minutes(IMMINENT_WINDOW_MINUTES);
    let delta = clock.day.and_time(dose_time) - clock.now;

    if delta.abs() <= window {
        DoseStatus::Coming
    } else if delta < Duration::zero() {
        DoseStatus::PastDue
    } else {
        DoseStatus::Coming
    }
}

/// Fold statuses into one: PAST_DUE beats COMING beats DONE. An empty set
/// is DONE (nothing due means nothing missed), so a member without active
/// medications reads as all clear.
pub fn roll_up<I>(statuses: I) -> DoseStatus
where
    I: IntoIterator<Item = DoseStatus>,
{
    let mut rolled = DoseStatus::Done;
    for status in statuses {
        match status {
            DoseStatus::PastDue => return DoseStatus::PastDue,
            DoseStatus::Coming => rolled = DoseStatus::Coming,
            DoseStatus::Done => {}
        }
    }
    rolled
}
