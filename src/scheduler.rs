use crate::models::AlarmDraft;
use chrono::{Datelike, Duration, Local, NaiveDateTime, NaiveTime};
use std::{
    collections::{BTreeSet, HashMap},
    future::Future,
    sync::Arc,
};
use tokio::{
    sync::{Mutex, watch},
    task::AbortHandle,
};
use tracing::{debug, info, warn};

/// Earliest time strictly after `now` matching the schedule. An empty day
/// set matches any day.
pub fn next_occurrence(
    now: NaiveDateTime,
    hours: u8,
    minutes: u8,
    days: &BTreeSet<u8>,
) -> Option<NaiveDateTime> {
    let time = NaiveTime::from_hms_opt(u32::from(hours), u32::from(minutes), 0)?;
    (0..=7)
        .map(|offset| now.date() + Duration::days(offset))
        .map(|date| date.and_time(time))
        .filter(|candidate| *candidate > now)
        .find(|candidate| {
            let weekday = candidate.weekday().num_days_from_sunday() as u8;
            days.is_empty() || days.contains(&weekday)
        })
}

#[derive(Clone)]
pub struct AlarmBell {
    ringing: Arc<watch::Sender<Option<i64>>>,
}

impl Default for AlarmBell {
    fn default() -> Self {
        let (ringing, _) = watch::channel(None);
        Self {
            ringing: Arc::new(ringing),
        }
    }
}

impl AlarmBell {
    pub fn ring(&self, id: i64) {
        if self.ringing.send_replace(Some(id)).is_none() {
            warn!(alarm_id = id, "alarm ringing");
        }
    }

    pub fn stop(&self) -> Option<i64> {
        let previous = self.ringing.send_replace(None);
        if let Some(id) = previous {
            info!(alarm_id = id, "alarm stopped");
        }
        previous
    }

    pub fn ringing(&self) -> Option<i64> {
        *self.ringing.borrow()
    }
}

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Clone)]
pub struct Scheduler {
    tasks: Arc<Mutex<HashMap<i64, AbortHandle>>>,
    bell: AlarmBell,
    clock: Clock,
}

impl Scheduler {
    pub fn new(bell: AlarmBell) -> Self {
        Self::with_clock(bell, Arc::new(|| Local::now().naive_local()))
    }

    pub fn with_clock(bell: AlarmBell, clock: Clock) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            bell,
            clock,
        }
    }

    /// Replaces any existing task for `id`; disabled alarms are only
    /// cancelled. `after_one_shot` runs once a one-shot alarm has rung.
    pub async fn schedule<F, Fut>(&self, id: i64, alarm: &AlarmDraft, after_one_shot: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        if let Some(handle) = tasks.remove(&id) {
            handle.abort();
        }
        if !alarm.is_enabled {
            return;
        }

        let bell = self.bell.clone();
        let clock = self.clock.clone();
        let (hours, minutes, days) = (alarm.hours, alarm.minutes, alarm.days.clone());
        let one_shot = alarm.is_one_shot();
        let handle = tokio::spawn(async move {
            loop {
                let now = clock();
                let Some(next) = next_occurrence(now, hours, minutes, &days) else {
                    warn!(alarm_id = id, "alarm has no upcoming occurrence");
                    return;
                };
                debug!(alarm_id = id, %next, "alarm scheduled");
                tokio::time::sleep((next - now).to_std().unwrap_or_default()).await;
                bell.ring(id);
                if one_shot {
                    break;
                }
            }
            after_one_shot().await;
        });
        tasks.insert(id, handle.abort_handle());
    }

    pub async fn cancel(&self, id: i64) {
        if let Some(handle) = self.tasks.lock().await.remove(&id) {
            handle.abort();
        }
    }

    pub async fn is_scheduled(&self, id: i64) -> bool {
        self.tasks
            .lock()
            .await
            .get(&id)
            .is_some_and(|handle| !handle.is_finished())
    }
}
