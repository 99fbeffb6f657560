use crate::client::{AlarmApi, ClientError};
use crate::models::{Alarm, AlarmDraft};
use crate::notify::{Notification, Notifier};
use std::future::Future;
use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const FETCH_FAILED: &str = "Error fetching alarm data. Please try again.";

#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Api(#[from] ClientError),
    #[error("no alarm with id {0}")]
    UnknownAlarm(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn success_message(self) -> &'static str {
        match self {
            Self::Create => "Alarm added successfully",
            Self::Update => "Alarm updated successfully",
            Self::Delete => "Alarm deleted successfully",
        }
    }

    fn failure_title(self) -> &'static str {
        match self {
            Self::Create => "Failed to add alarm",
            Self::Update => "Failed to update alarm",
            Self::Delete => "Failed to delete alarm",
        }
    }
}

#[derive(Debug, Default)]
struct Cache {
    alarms: Option<Vec<Alarm>>,
    stale: bool,
}

pub struct AlarmStore<A> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<Mutex<Cache>>,
    next_temp_id: Arc<AtomicI64>,
}

impl<A> Clone for AlarmStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            notifier: Arc::clone(&self.notifier),
            cache: Arc::clone(&self.cache),
            next_temp_id: Arc::clone(&self.next_temp_id),
        }
    }
}

impl<A: AlarmApi> AlarmStore<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            cache: Arc::new(Mutex::new(Cache::default())),
            next_temp_id: Arc::new(AtomicI64::new(-1)),
        }
    }

    pub async fn alarms(&self) -> Option<Vec<Alarm>> {
        self.cache.lock().await.alarms.clone()
    }

    pub async fn get(&self, id: i64) -> Option<Alarm> {
        let cache = self.cache.lock().await;
        cache
            .alarms
            .as_ref()
            .and_then(|alarms| alarms.iter().find(|alarm| alarm.id == id).cloned())
    }

    pub async fn is_stale(&self) -> bool {
        self.cache.lock().await.stale
    }

    pub async fn refresh(&self) -> Result<Vec<Alarm>, ClientError> {
        match self.api.list().await {
            Ok(alarms) => {
                let mut cache = self.cache.lock().await;
                cache.alarms = Some(alarms.clone());
                cache.stale = false;
                debug!(count = alarms.len(), "alarm cache refreshed");
                Ok(alarms)
            }
            Err(err) => {
                warn!("failed to fetch alarms: {err}");
                self.notifier
                    .notify(Notification::error(FETCH_FAILED, err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn ensure_loaded(&self) -> Result<Vec<Alarm>, ClientError> {
        {
            let cache = self.cache.lock().await;
            if let (Some(alarms), false) = (cache.alarms.as_ref(), cache.stale) {
                return Ok(alarms.clone());
            }
        }
        self.refresh().await
    }

    pub async fn create(&self, draft: AlarmDraft) -> Result<Alarm, MutationError> {
        // Placeholder ids are negative so they never collide with server ids.
        let temp_id = self.next_temp_id.fetch_sub(1, Ordering::Relaxed);
        let pending = draft.clone().with_id(temp_id);

        let result = self
            .optimistic(
                MutationKind::Create,
                |alarms| alarms.push(pending),
                self.api.create(&draft),
            )
            .await;

        if let Ok(id) = result {
            let mut cache = self.cache.lock().await;
            if let Some(alarm) = cache
                .alarms
                .as_mut()
                .and_then(|alarms| alarms.iter_mut().find(|alarm| alarm.id == temp_id))
            {
                alarm.id = id;
            }
        }

        self.settle().await;
        Ok(draft.with_id(result?))
    }

    pub async fn update(&self, alarm: Alarm) -> Result<(), MutationError> {
        let result = self
            .optimistic(
                MutationKind::Update,
                |alarms| {
                    for existing in alarms.iter_mut().filter(|a| a.id == alarm.id) {
                        *existing = alarm.clone();
                    }
                },
                self.api.update(&alarm),
            )
            .await;

        self.settle().await;
        Ok(result?)
    }

    pub async fn remove(&self, id: i64) -> Result<(), MutationError> {
        let result = self
            .optimistic(
                MutationKind::Delete,
                |alarms| alarms.retain(|alarm| alarm.id != id),
                self.api.remove(id),
            )
            .await;

        self.settle().await;
        Ok(result?)
    }

    /// Updates the cached alarm with only `isEnabled` changed.
    pub async fn set_enabled(&self, id: i64, enabled: bool) -> Result<(), MutationError> {
        let mut alarm = self.get(id).await.ok_or(MutationError::UnknownAlarm(id))?;
        alarm.is_enabled = enabled;
        self.update(alarm).await
    }

    pub async fn toggle(&self, id: i64) -> Result<bool, MutationError> {
        let alarm = self.get(id).await.ok_or(MutationError::UnknownAlarm(id))?;
        let enabled = !alarm.is_enabled;
        self.set_enabled(id, enabled).await?;
        Ok(enabled)
    }

    pub async fn stop(&self) -> Result<(), ClientError> {
        match self.api.stop().await {
            Ok(()) => {
                self.notifier.notify(Notification::success("Alarm stopped"));
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .notify(Notification::error("Failed to stop alarm", err.to_string()));
                Err(err)
            }
        }
    }

    async fn optimistic<T, F>(
        &self,
        kind: MutationKind,
        apply: impl FnOnce(&mut Vec<Alarm>),
        request: F,
    ) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let snapshot = {
            let mut cache = self.cache.lock().await;
            let snapshot = cache.alarms.clone();
            apply(cache.alarms.get_or_insert_with(Vec::new));
            snapshot
        };

        match request.await {
            Ok(value) => {
                self.notifier
                    .notify(Notification::success(kind.success_message()));
                Ok(value)
            }
            Err(err) => {
                warn!(?kind, "mutation rejected, restoring cache: {err}");
                self.cache.lock().await.alarms = snapshot;
                self.notifier
                    .notify(Notification::error(kind.failure_title(), err.to_string()));
                Err(err)
            }
        }
    }

    async fn settle(&self) {
        self.cache.lock().await.stale = true;
        if let Err(err) = self.refresh().await {
            debug!("refresh after mutation failed: {err}");
        }
    }
}
