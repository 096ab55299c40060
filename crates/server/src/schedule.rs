//! Fixed daily recurrences: a set of UTC hours and a loop that fires a
//! fallible task at each one. Task failures are logged and absorbed; one
//! bad cycle never affects the next.

use std::future::Future;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailySchedule {
    hours: Vec<u32>,
}

impl DailySchedule {
    /// `None` when the hour list is empty; an empty recurrence never fires.
    pub fn new(mut hours: Vec<u32>) -> Option<Self> {
        hours.retain(|hour| *hour < 24);
        hours.sort_unstable();
        hours.dedup();
        if hours.is_empty() {
            None
        } else {
            Some(Self { hours })
        }
    }

    /// First scheduled instant strictly after `after`, rolling over to the
    /// earliest hour of the next day when today's hours are spent.
    pub fn next_occurrence(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let today = after.date_naive();
        for &hour in &self.hours {
            if let Some(candidate) = today.and_hms_opt(hour, 0, 0) {
                let candidate = candidate.and_utc();
                if candidate > after {
                    return candidate;
                }
            }
        }

        let tomorrow = today + ChronoDuration::days(1);
        tomorrow
            .and_hms_opt(self.hours[0], 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or(after + ChronoDuration::days(1))
    }
}

/// Spawns the recurrence loop. The handle is returned for completeness but
/// the loop is expected to run for the life of the process.
pub fn spawn_daily<F, Fut, E>(schedule: DailySchedule, task_name: &'static str, task: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send,
    E: std::fmt::Display,
{
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = schedule.next_occurrence(now);
            let wait = (next - now).to_std().unwrap_or_default();
            info!(task = task_name, next = %next, "next run scheduled");
            tokio::time::sleep(wait).await;

            if let Err(error) = task().await {
                warn!(task = task_name, error = %error, "scheduled task failed; next run unaffected");
            }
        }
    })
}
