//! Daily-schedule endpoints: time-block CRUD, the block stopwatch, task
//! sub-resources, and the weekly metrics read.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cadence_core::metrics::{weekly_metrics, WeeklyMetrics, WINDOW_DAYS};
use cadence_core::{
    BlockCategory, BlockTask, CoreError, DaySchedule, Event, LedgerEntry, PointsReason,
    TimeBlock, ValidationError, POINTS_PER_BLOCK,
};

use crate::auth::Owner;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub name: String,
    pub category: BlockCategory,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlockRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<BlockCategory>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AddTaskRequest {
    pub name: String,
    #[serde(default)]
    pub habit_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// A mutated block together with the events the mutation produced.
#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub block: TimeBlock,
    pub events: Vec<Event>,
}

/// Lazy-create read: a fresh day yields an empty-but-valid schedule.
pub async fn get_schedule(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<DaySchedule>, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let store = state.store.lock().await;
    let schedule = store
        .schedule_for_day(&owner, date)
        .map_err(CoreError::from)?;
    Ok(Json(schedule))
}

pub async fn create_block(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Json(req): Json<CreateBlockRequest>,
) -> Result<(StatusCode, Json<TimeBlock>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }
    let block = TimeBlock::new(req.name, req.category, req.start, req.end)?;

    let store = state.store.lock().await;
    let schedule = store
        .schedule_for_day(&owner, block.start.date_naive())
        .map_err(CoreError::from)?;
    store
        .insert_block(&schedule.id, &block)
        .map_err(CoreError::from)?;
    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn update_block(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(req): Json<UpdateBlockRequest>,
) -> Result<Json<BlockResponse>, ApiError> {
    let now = Utc::now();
    let store = state.store.lock().await;
    let mut block = store
        .get_block(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("time block", &id))?;

    if let Some(name) = req.name {
        block.name = name;
    }
    if let Some(category) = req.category {
        block.category = category;
    }
    if let Some(start) = req.start {
        block.start = start;
    }
    if let Some(end) = req.end {
        block.end = end;
    }
    if block.start >= block.end {
        return Err(ValidationError::InvalidTimeRange {
            start: block.start,
            end: block.end,
        }
        .into());
    }

    let mut events = Vec::new();
    if let Some(completed) = req.completed {
        if completed != block.completed {
            block.toggle_completed();
            events.push(Event::BlockCompletionToggled {
                block_id: block.id.clone(),
                completed: block.completed,
                at: now,
            });
            // Completion earns points; un-completing does not claw back.
            if block.completed {
                store
                    .append_points(&LedgerEntry {
                        owner: owner.clone(),
                        delta: POINTS_PER_BLOCK,
                        reason: PointsReason::BlockCompleted,
                        at: now,
                    })
                    .map_err(CoreError::from)?;
                let balance = store.points_balance(&owner).map_err(CoreError::from)?;
                events.push(Event::PointsAwarded {
                    reason: PointsReason::BlockCompleted,
                    delta: POINTS_PER_BLOCK,
                    balance,
                    at: now,
                });
            }
        }
    }

    store.update_block(&owner, &block).map_err(CoreError::from)?;
    Ok(Json(BlockResponse { block, events }))
}

pub async fn delete_block(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.lock().await;
    if store.delete_block(&owner, &id).map_err(CoreError::from)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("time block", &id))
    }
}

/// Start the block's stopwatch. Starting a running stopwatch is a no-op.
pub async fn start_timer(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<BlockResponse>, ApiError> {
    let store = state.store.lock().await;
    let mut block = store
        .get_block(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("time block", &id))?;

    let mut events = Vec::new();
    if block.timer.start() {
        events.push(Event::TimerStarted {
            block_id: block.id.clone(),
            at: Utc::now(),
        });
    }
    store.update_block(&owner, &block).map_err(CoreError::from)?;
    Ok(Json(BlockResponse { block, events }))
}

/// Stop the stopwatch and persist the accumulated duration. Restarting
/// later continues accumulation. Stopping an idle stopwatch is a no-op.
pub async fn stop_timer(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<BlockResponse>, ApiError> {
    let store = state.store.lock().await;
    let mut block = store
        .get_block(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("time block", &id))?;

    let mut events = Vec::new();
    if let Some(accumulated_ms) = block.timer.stop() {
        events.push(Event::TimerStopped {
            block_id: block.id.clone(),
            accumulated_ms,
            at: Utc::now(),
        });
    }
    store.update_block(&owner, &block).map_err(CoreError::from)?;
    Ok(Json(BlockResponse { block, events }))
}

pub async fn add_task(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(req): Json<AddTaskRequest>,
) -> Result<(StatusCode, Json<TimeBlock>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }
    let store = state.store.lock().await;
    let mut block = store
        .get_block(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("time block", &id))?;

    block.add_task(BlockTask::new(req.name, req.habit_id));
    store.update_block(&owner, &block).map_err(CoreError::from)?;
    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path((id, task_id)): Path<(String, String)>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<BlockResponse>, ApiError> {
    let store = state.store.lock().await;
    let mut block = store
        .get_block(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("time block", &id))?;
    if block.task(&task_id).is_none() {
        return Err(ApiError::not_found("task", &task_id));
    }

    if let Some(name) = req.name.as_deref() {
        block.rename_task(&task_id, name);
    }

    let mut events = Vec::new();
    if let Some(completed) = req.completed {
        let current = block.task(&task_id).map(|t| t.completed).unwrap_or(false);
        if completed != current {
            let new_state = block.toggle_task(&task_id).unwrap_or(current);
            events.push(Event::TaskCompletionToggled {
                block_id: block.id.clone(),
                task_id: task_id.clone(),
                completed: new_state,
                at: Utc::now(),
            });
        }
    }

    store.update_block(&owner, &block).map_err(CoreError::from)?;
    Ok(Json(BlockResponse { block, events }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path((id, task_id)): Path<(String, String)>,
) -> Result<Json<TimeBlock>, ApiError> {
    let store = state.store.lock().await;
    let mut block = store
        .get_block(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("time block", &id))?;
    if !block.remove_task(&task_id) {
        return Err(ApiError::not_found("task", &task_id));
    }
    store.update_block(&owner, &block).map_err(CoreError::from)?;
    Ok(Json(block))
}

/// Recompute the trailing week from raw persisted records.
pub async fn metrics(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<WeeklyMetrics>, ApiError> {
    let today = Utc::now().date_naive();
    let from = today - Duration::days(WINDOW_DAYS - 1);

    let store = state.store.lock().await;
    let blocks = store
        .blocks_in_window(&owner, from, today)
        .map_err(CoreError::from)?;
    let habits = store.habits_with_logs(&owner).map_err(CoreError::from)?;
    Ok(Json(weekly_metrics(&blocks, &habits, today)))
}
