use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// Source of wall-clock time, injectable so the daily trigger can be
/// tested without real waits.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Daily trigger: fires on the first poll at or after the configured
/// time of day, at most once per local calendar day.
pub struct DailySchedule {
    trigger: NaiveTime,
    tz: Tz,
    last_fired: Option<NaiveDate>,
}

impl DailySchedule {
    /// A trigger time already past at startup waits for the next day.
    pub fn new(trigger: NaiveTime, tz: Tz, now: DateTime<Utc>) -> Self {
        let local = now.with_timezone(&tz);
        let last_fired = (local.time() >= trigger).then(|| local.date_naive());

        Self {
            trigger,
            tz,
            last_fired,
        }
    }

    pub fn due(&mut self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.tz);
        let today = local.date_naive();

        if local.time() >= self.trigger && self.last_fired != Some(today) {
            self.last_fired = Some(today);
            true
        } else {
            false
        }
    }
}
