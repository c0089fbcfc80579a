//! Goal endpoints, including milestone sub-resources.
//!
//! Milestones are mutated through their parent goal: every handler loads
//! the goal, applies the change, and persists the whole document.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cadence_core::{CoreError, Event, Goal, GoalPriority, Milestone, ValidationError};

use crate::auth::Owner;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<GoalPriority>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub priority: Option<GoalPriority>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMilestoneRequest {
    pub title: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMilestoneRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub deadline: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub goal: Goal,
    pub events: Vec<Event>,
}

pub async fn list(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<Vec<Goal>>, ApiError> {
    let store = state.store.lock().await;
    let goals = store.list_goals(&owner).map_err(CoreError::from)?;
    Ok(Json(goals))
}

pub async fn create(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Json(req): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<Goal>), ApiError> {
    let mut goal = Goal::new(
        owner,
        req.title,
        req.priority.unwrap_or(GoalPriority::Medium),
    )?;
    if let Some(description) = req.description {
        goal.description = description;
    }
    goal.deadline = req.deadline;
    if let Some(category) = req.category {
        goal.category = category;
    }

    let store = state.store.lock().await;
    store.create_goal(&goal).map_err(CoreError::from)?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<Json<Goal>, ApiError> {
    let store = state.store.lock().await;
    let mut goal = store
        .get_goal(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("goal", &id))?;

    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(ValidationError::MissingField("title").into());
        }
        goal.title = title;
    }
    if let Some(description) = req.description {
        goal.description = description;
    }
    if let Some(deadline) = req.deadline {
        goal.deadline = deadline;
    }
    if let Some(priority) = req.priority {
        goal.priority = priority;
    }
    if let Some(category) = req.category {
        goal.category = category;
    }
    goal.recompute();

    store.update_goal(&goal).map_err(CoreError::from)?;
    Ok(Json(goal))
}

pub async fn delete(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.lock().await;
    if store.delete_goal(&owner, &id).map_err(CoreError::from)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("goal", &id))
    }
}

pub async fn add_milestone(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(req): Json<CreateMilestoneRequest>,
) -> Result<(StatusCode, Json<Goal>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ValidationError::MissingField("title").into());
    }
    let store = state.store.lock().await;
    let mut goal = store
        .get_goal(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("goal", &id))?;

    goal.add_milestone(Milestone::new(req.title, req.deadline));
    store.update_goal(&goal).map_err(CoreError::from)?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update_milestone(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path((id, milestone_id)): Path<(String, String)>,
    Json(req): Json<UpdateMilestoneRequest>,
) -> Result<Json<GoalResponse>, ApiError> {
    let store = state.store.lock().await;
    let mut goal = store
        .get_goal(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("goal", &id))?;

    if req.title.is_some() || req.deadline.is_some() {
        if !goal.update_milestone(&milestone_id, req.title.as_deref(), req.deadline) {
            return Err(ApiError::not_found("milestone", &milestone_id));
        }
    }

    let mut events = Vec::new();
    if let Some(completed) = req.completed {
        if !goal.set_milestone_completed(&milestone_id, completed) {
            return Err(ApiError::not_found("milestone", &milestone_id));
        }
        if completed {
            events.push(Event::MilestoneCompleted {
                goal_id: goal.id.clone(),
                milestone_id: milestone_id.clone(),
                at: Utc::now(),
            });
        }
    } else if goal.milestone(&milestone_id).is_none() {
        return Err(ApiError::not_found("milestone", &milestone_id));
    }

    store.update_goal(&goal).map_err(CoreError::from)?;
    Ok(Json(GoalResponse { goal, events }))
}

pub async fn delete_milestone(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path((id, milestone_id)): Path<(String, String)>,
) -> Result<Json<Goal>, ApiError> {
    let store = state.store.lock().await;
    let mut goal = store
        .get_goal(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("goal", &id))?;

    if !goal.remove_milestone(&milestone_id) {
        return Err(ApiError::not_found("milestone", &milestone_id));
    }
    store.update_goal(&goal).map_err(CoreError::from)?;
    Ok(Json(goal))
}
