use crate::models::{AlarmDraft, AppData};
use crate::scheduler::{AlarmBell, Clock, Scheduler};
use crate::storage::persist_data;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub scheduler: Scheduler,
    pub bell: AlarmBell,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        let bell = AlarmBell::default();
        Self::from_parts(data_path, data, Scheduler::new(bell.clone()), bell)
    }

    pub fn with_clock(data_path: PathBuf, data: AppData, clock: Clock) -> Self {
        let bell = AlarmBell::default();
        Self::from_parts(data_path, data, Scheduler::with_clock(bell.clone(), clock), bell)
    }

    fn from_parts(data_path: PathBuf, data: AppData, scheduler: Scheduler, bell: AlarmBell) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            scheduler,
            bell,
        }
    }

    /// (Re)schedules `alarm`. A one-shot alarm is switched off in storage
    /// after it rings.
    pub async fn arm(&self, id: i64, alarm: &AlarmDraft) {
        let state = self.clone();
        self.scheduler
            .schedule(id, alarm, move || async move { state.disable_fired(id).await })
            .await;
    }

    async fn disable_fired(&self, id: i64) {
        let mut data = self.data.lock().await;
        let Some(alarm) = data.alarms.get_mut(&id) else {
            return;
        };
        if !alarm.is_one_shot() || !alarm.is_enabled {
            return;
        }
        alarm.is_enabled = false;
        match persist_data(&self.data_path, &data).await {
            Ok(()) => info!(alarm_id = id, "one-shot alarm disabled after ringing"),
            Err(err) => error!(alarm_id = id, "failed to persist disabled alarm: {}", err.message),
        }
    }

    pub async fn schedule_stored(&self) {
        let data = self.data.lock().await;
        let mut enabled = 0usize;
        for (&id, alarm) in &data.alarms {
            if alarm.is_enabled {
                enabled += 1;
            }
            self.arm(id, alarm).await;
        }
        info!(total = data.alarms.len(), enabled, "scheduled stored alarms");
    }
}
