use crate::errors::AppError;
use crate::models::{Alarm, AlarmDraft, AlarmIdBody};
use crate::state::AppState;
use crate::storage::persist_data;
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use tracing::info;

pub async fn list_alarms(State(state): State<AppState>) -> Json<Vec<Alarm>> {
    let data = state.data.lock().await;
    Json(data.list())
}

pub async fn create_alarm(
    State(state): State<AppState>,
    payload: Result<Json<AlarmDraft>, JsonRejection>,
) -> Result<Json<AlarmIdBody>, AppError> {
    let Json(draft) = payload?;
    draft.validate()?;

    let mut data = state.data.lock().await;
    let id = data.insert(draft.clone());
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.alarms.remove(&id);
        return Err(err);
    }
    state.arm(id, &draft).await;

    info!(alarm_id = id, hours = draft.hours, minutes = draft.minutes, "alarm created");
    Ok(Json(AlarmIdBody { id }))
}

pub async fn update_alarm(
    State(state): State<AppState>,
    payload: Result<Json<Alarm>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(alarm) = payload?;
    alarm.validate()?;

    let mut data = state.data.lock().await;
    let draft = alarm.draft();
    let Some(previous) = data.alarms.get(&alarm.id).cloned() else {
        return Err(AppError::not_found(alarm.id));
    };
    data.alarms.insert(alarm.id, draft.clone());
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.alarms.insert(alarm.id, previous);
        return Err(err);
    }
    state.arm(alarm.id, &draft).await;

    info!(alarm_id = alarm.id, enabled = alarm.is_enabled, "alarm updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_alarm(
    State(state): State<AppState>,
    payload: Result<Json<AlarmIdBody>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(AlarmIdBody { id }) = payload?;

    let mut data = state.data.lock().await;
    let removed = data.alarms.remove(&id).ok_or_else(|| AppError::not_found(id))?;
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.alarms.insert(id, removed);
        return Err(err);
    }
    state.scheduler.cancel(id).await;

    info!(alarm_id = id, "alarm deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stop_alarm(State(state): State<AppState>) -> StatusCode {
    state.bell.stop();
    StatusCode::NO_CONTENT
}
