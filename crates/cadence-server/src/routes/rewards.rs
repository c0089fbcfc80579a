//! Reward endpoints and the checkout flow.
//!
//! Redemption spends points from the ledger; checkout delegates to the
//! external payment collaborator and returns its hosted session URL.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use cadence_core::{
    CheckoutRequest, CheckoutSession, CoreError, Event, LedgerEntry, PointsReason, Reward,
    ValidationError,
};

use crate::auth::Owner;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRewardRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost_points: i64,
}

#[derive(Debug, Serialize)]
pub struct RewardListResponse {
    pub rewards: Vec<Reward>,
    pub balance: i64,
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub reward: Reward,
    pub balance: i64,
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionRequest {
    /// Line-item name shown on the provider's hosted page.
    pub name: String,
    pub amount_cents: i64,
}

pub async fn list(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<RewardListResponse>, ApiError> {
    let store = state.store.lock().await;
    let rewards = store.list_rewards(&owner).map_err(CoreError::from)?;
    let balance = store.points_balance(&owner).map_err(CoreError::from)?;
    Ok(Json(RewardListResponse { rewards, balance }))
}

pub async fn create(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Json(req): Json<CreateRewardRequest>,
) -> Result<(StatusCode, Json<Reward>), ApiError> {
    let mut reward = Reward::new(owner, req.name, req.cost_points)?;
    if let Some(description) = req.description {
        reward.description = description;
    }
    let store = state.store.lock().await;
    store.create_reward(&reward).map_err(CoreError::from)?;
    Ok((StatusCode::CREATED, Json(reward)))
}

/// Spend points on a reward. Fails if the balance does not cover the cost.
pub async fn redeem(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<RedeemResponse>, ApiError> {
    let now = Utc::now();
    let store = state.store.lock().await;
    let mut reward = store
        .get_reward(&owner, &id)
        .map_err(CoreError::from)?
        .ok_or_else(|| ApiError::not_found("reward", &id))?;

    let balance = store.points_balance(&owner).map_err(CoreError::from)?;
    let delta = reward.redeem(balance)?;

    store.update_reward(&reward).map_err(CoreError::from)?;
    store
        .append_points(&LedgerEntry {
            owner: owner.clone(),
            delta,
            reason: PointsReason::RewardRedeemed,
            at: now,
        })
        .map_err(CoreError::from)?;
    let balance = store.points_balance(&owner).map_err(CoreError::from)?;

    let events = vec![Event::RewardRedeemed {
        reward_id: reward.id.clone(),
        balance,
        at: now,
    }];
    Ok(Json(RedeemResponse {
        reward,
        balance,
        events,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.lock().await;
    if store.delete_reward(&owner, &id).map_err(CoreError::from)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("reward", &id))
    }
}

/// Create a provider-hosted checkout session. The provider does the actual
/// payment processing; we only hand back its session URL.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Owner(_owner): Owner,
    Json(req): Json<CheckoutSessionRequest>,
) -> Result<Json<CheckoutSession>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }
    if req.amount_cents <= 0 {
        return Err(ValidationError::InvalidValue {
            field: "amount_cents",
            message: "amount must be positive".to_string(),
        }
        .into());
    }

    let request = CheckoutRequest {
        name: req.name,
        amount_cents: req.amount_cents,
        currency: state.payment_config.currency.clone(),
        success_url: state.payment_config.success_url.clone(),
        cancel_url: state.payment_config.cancel_url.clone(),
    };
    let session = state.payments.create_checkout_session(&request).await?;
    Ok(Json(session))
}
