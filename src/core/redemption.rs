//! Reward redemption business logic.
//!
//! Redemption exchanges accumulated XP for a catalog reward: the reward row
//! is deleted, a negative ledger transaction debits the cost, and an
//! immutable log entry records the redemption. All three effects run in one
//! database transaction, and the delete is conditional on affecting exactly
//! one row, so two concurrent attempts on the same reward cannot both
//! succeed.

use crate::{
    core::ledger,
    entities::{Reward, RewardLog, reward, reward_log},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Retrieves the reward catalog ordered by required XP, cheapest first.
pub async fn list_rewards(db: &DatabaseConnection) -> Result<Vec<reward::Model>> {
    Reward::find()
        .order_by_asc(reward::Column::RequiredXp)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new catalog reward, performing input validation.
pub async fn create_reward(
    db: &DatabaseConnection,
    title: String,
    required_xp: i64,
) -> Result<reward::Model> {
    if title.trim().is_empty() {
        return Err(Error::Validation {
            message: "Reward title cannot be empty".to_string(),
        });
    }

    if required_xp < 0 {
        return Err(Error::Validation {
            message: format!("Reward cost cannot be negative: {required_xp}"),
        });
    }

    reward::ActiveModel {
        title: Set(title.trim().to_string()),
        required_xp: Set(required_xp),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Retrieves the redemption history, newest first.
pub async fn redemption_history(db: &DatabaseConnection) -> Result<Vec<reward_log::Model>> {
    RewardLog::find()
        .order_by_desc(reward_log::Column::RedeemedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Redeems a reward for the given user.
///
/// Succeeds only when the user's balance covers the cost (equality is
/// enough). On success the reward row is gone, the ledger holds a
/// `-required_xp` transaction attributed to the redeeming user, and a log
/// entry records the redemption. On any failure no partial state is visible:
/// the balance check happens before any mutation, and the three writes share
/// one database transaction.
///
/// The delete is conditional: if it affects zero rows, a concurrent
/// redemption already consumed the reward and this attempt aborts with
/// [`Error::RewardNotFound`].
pub async fn redeem(
    db: &DatabaseConnection,
    user_id: &str,
    role: &str,
    reward_id: i64,
) -> Result<reward_log::Model> {
    let reward = Reward::find_by_id(reward_id)
        .one(db)
        .await?
        .ok_or(Error::RewardNotFound { id: reward_id })?;

    let balance = ledger::balance_for_user(db, user_id).await?;
    if balance < reward.required_xp {
        return Err(Error::InsufficientXp {
            current: balance,
            required: reward.required_xp,
        });
    }

    let txn = db.begin().await?;

    // Conditional delete: exactly one affected row proves this attempt won
    // the race for the reward.
    let deleted = Reward::delete_many()
        .filter(reward::Column::Id.eq(reward_id))
        .exec(&txn)
        .await?;
    if deleted.rows_affected != 1 {
        return Err(Error::RewardNotFound { id: reward_id });
    }

    ledger::record_transaction(
        &txn,
        user_id,
        role,
        -reward.required_xp,
        format!("redeem_reward: {}", reward.title),
    )
    .await?;

    let log_entry = reward_log::ActiveModel {
        title: Set(reward.title.clone()),
        required_xp: Set(reward.required_xp),
        redeemed_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        user_id,
        reward = %reward.title,
        cost = reward.required_xp,
        "Reward redeemed"
    );
    Ok(log_entry)
}
