//! Habit endpoints: CRUD, completion logging, and derived streak reads.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use cadence_core::habit::streak;
use cadence_core::{
    CoreError, Event, Habit, HabitPeriod, HabitReport, LedgerEntry, Occurrence, PointsReason,
    ValidationError, POINTS_PER_HABIT_COUNT,
};

use crate::auth::Owner;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(default)]
    pub period: Option<HabitPeriod>,
    #[serde(default)]
    pub goal: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHabitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub period: Option<HabitPeriod>,
    #[serde(default)]
    pub goal: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CompleteHabitRequest {
    /// Completion count to log; defaults to 1.
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CompleteHabitResponse {
    pub report: HabitReport,
    pub events: Vec<Event>,
}

pub async fn list(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<Vec<Habit>>, ApiError> {
    let store = state.store.lock().await;
    let habits = store.list_habits(&owner).map_err(CoreError::from)?;
    Ok(Json(habits))
}

pub async fn create(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Json(req): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }
    let habit = Habit::new(
        owner,
        req.name,
        req.period.unwrap_or(HabitPeriod::Daily),
        req.goal.unwrap_or(1),
    );
    let store = state.store.lock().await;
    store.create_habit(&habit).map_err(CoreError::from)?;
    Ok((StatusCode::CREATED, Json(habit)))
}

/// Log a completion occurrence, award points, and return the fresh report.
pub async fn complete(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    body: Option<Json<CompleteHabitRequest>>,
) -> Result<Json<CompleteHabitResponse>, ApiError> {
    let count = body.and_then(|Json(b)| b.count).unwrap_or(1);
    if count == 0 {
        return Err(ValidationError::InvalidValue {
            field: "count",
            message: "count must be at least 1".to_string(),
        }
        .into());
    }

    let now = Utc::now();
    let store = state.store.lock().await;
    let habit = store
        .get_habit(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("habit", &id))?;

    store
        .record_occurrence(&habit.id, &Occurrence { at: now, count })
        .map_err(CoreError::from)?;

    let delta = POINTS_PER_HABIT_COUNT * count as i64;
    store
        .append_points(&LedgerEntry {
            owner: owner.clone(),
            delta,
            reason: PointsReason::HabitCompleted,
            at: now,
        })
        .map_err(CoreError::from)?;
    let balance = store.points_balance(&owner).map_err(CoreError::from)?;

    let log = store.occurrences(&habit.id).map_err(CoreError::from)?;
    let report = streak::report(
        &habit,
        &log,
        streak::default_window(habit.period),
        now.date_naive(),
    );

    let events = vec![
        Event::HabitCompleted {
            habit_id: habit.id.clone(),
            count,
            current_streak: report.current_streak,
            at: now,
        },
        Event::PointsAwarded {
            reason: PointsReason::HabitCompleted,
            delta,
            balance,
            at: now,
        },
    ];
    Ok(Json(CompleteHabitResponse { report, events }))
}

pub async fn update(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(req): Json<UpdateHabitRequest>,
) -> Result<Json<Habit>, ApiError> {
    let store = state.store.lock().await;
    let mut habit = store
        .get_habit(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("habit", &id))?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        habit.name = name;
    }
    if let Some(period) = req.period {
        habit.period = period;
    }
    if let Some(goal) = req.goal {
        habit.goal = goal;
    }

    store.update_habit(&habit).map_err(CoreError::from)?;
    Ok(Json(habit))
}

pub async fn delete(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.lock().await;
    if store.delete_habit(&owner, &id).map_err(CoreError::from)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("habit", &id))
    }
}

pub async fn streak_report(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<HabitReport>, ApiError> {
    let store = state.store.lock().await;
    let habit = store
        .get_habit(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("habit", &id))?;
    let log = store.occurrences(&habit.id).map_err(CoreError::from)?;
    let report = streak::report(
        &habit,
        &log,
        streak::default_window(habit.period),
        Utc::now().date_naive(),
    );
    Ok(Json(report))
}
