//! XP ledger business logic - balances, levels, and awards.
//!
//! The ledger is append-only: a balance is always the sum of `change` over a
//! user's transactions, so insertion order never affects it. Awards go
//! through the rule table; a missing rule makes the award a logged no-op so
//! the triggering user action (quiz submission, fantasy creation) is never
//! blocked by a misconfigured rule.

use crate::{
    core::settings::{self, Lookup},
    entities::{XpRule, XpTransaction, xp_rule, xp_transaction},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use tracing::warn;

/// A user's current position in the level progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStatus {
    /// Sum of `change` over the user's transactions
    pub balance: i64,
    /// `floor(balance / level_length)`
    pub level: i64,
    /// Progress within the current level, always in `[0, level_length)`
    pub progress: i64,
    /// The level length in effect, configured or defaulted
    pub level_length: Lookup<i64>,
}

/// Outcome of an award attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwardOutcome {
    /// A unique rule matched and the transaction was written
    Awarded(xp_transaction::Model),
    /// No rule matched `(action, effort, role)`; nothing was written
    RuleMissing,
}

/// Computes a user's XP balance as the sum of their transaction deltas.
/// A user with no transactions has balance 0.
pub async fn balance_for_user(db: &DatabaseConnection, user_id: &str) -> Result<i64> {
    let transactions = XpTransaction::find()
        .filter(xp_transaction::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    Ok(transactions.iter().map(|t| t.change).sum())
}

/// Computes the household-wide balance (sum over all members' transactions).
pub async fn household_balance(db: &DatabaseConnection) -> Result<i64> {
    let transactions = XpTransaction::find().all(db).await?;
    Ok(transactions.iter().map(|t| t.change).sum())
}

/// Retrieves a user's transactions, newest first, for display.
pub async fn transactions_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<xp_transaction::Model>> {
    XpTransaction::find()
        .filter(xp_transaction::Column::UserId.eq(user_id))
        .order_by_desc(xp_transaction::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Derives level and within-level progress from a balance.
///
/// Uses Euclidean division so a negative balance (possible via offsetting
/// corrections) still yields a progress value in `[0, level_length)`.
#[must_use]
pub const fn compute_level(balance: i64, level_length: i64) -> (i64, i64) {
    (balance.div_euclid(level_length), balance.rem_euclid(level_length))
}

/// Computes a user's balance, level, and progress in one call.
///
/// The level length comes from settings, falling back to the documented
/// default when absent or non-numeric; the lookup tag is passed through so
/// callers can tell which applied.
pub async fn level_status(db: &DatabaseConnection, user_id: &str) -> Result<LevelStatus> {
    let balance = balance_for_user(db, user_id).await?;
    let level_length = settings::level_length(db).await?;
    let (level, progress) = compute_level(balance, *level_length.value());

    Ok(LevelStatus {
        balance,
        level,
        progress,
        level_length,
    })
}

/// Inserts a ledger row. Shared by awards and redemption debits; callers
/// inside a database transaction pass the transaction handle.
pub async fn record_transaction<C>(
    db: &C,
    user_id: &str,
    role: &str,
    change: i64,
    description: String,
) -> Result<xp_transaction::Model>
where
    C: ConnectionTrait,
{
    xp_transaction::ActiveModel {
        user_id: Set(user_id.to_string()),
        role: Set(role.to_string()),
        change: Set(change),
        description: Set(description),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Awards XP for an action by looking up the unique rule for
/// `(action, effort, role)`.
///
/// Fail-soft: the lookup must resolve to exactly one rule. When zero or
/// multiple rules match, the outcome is [`AwardOutcome::RuleMissing`] and
/// nothing is written - the caller's primary flow proceeds either way.
/// Duplicate rule keys cannot be ruled out by the schema (effort is
/// nullable), so ambiguity is detected here. The transaction description is
/// `"<action>: <context> (<effort>)"`, with the effort part omitted for
/// effort-less rules.
pub async fn award_xp(
    db: &DatabaseConnection,
    user_id: &str,
    action: &str,
    effort: Option<&str>,
    role: &str,
    context: &str,
) -> Result<AwardOutcome> {
    let mut query = XpRule::find()
        .filter(xp_rule::Column::Action.eq(action))
        .filter(xp_rule::Column::Role.eq(role));
    query = match effort {
        Some(effort) => query.filter(xp_rule::Column::Effort.eq(effort)),
        None => query.filter(xp_rule::Column::Effort.is_null()),
    };

    // Fetching two rows is enough to tell "exactly one" from "ambiguous".
    let mut rules = query.limit(2).all(db).await?;
    let rule = match rules.len() {
        1 => rules.remove(0),
        0 => {
            warn!(action, ?effort, role, "No XP rule matches, skipping award");
            return Ok(AwardOutcome::RuleMissing);
        }
        _ => {
            warn!(action, ?effort, role, "Ambiguous XP rules, skipping award");
            return Ok(AwardOutcome::RuleMissing);
        }
    };

    let description = match &rule.effort {
        Some(effort) => format!("{action}: {context} ({effort})"),
        None => format!("{action}: {context}"),
    };

    let transaction = record_transaction(db, user_id, role, rule.xp, description).await?;
    Ok(AwardOutcome::Awarded(transaction))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_compute_level_boundaries() {
        assert_eq!(compute_level(0, 100), (0, 0));
        assert_eq!(compute_level(99, 100), (0, 99));
        assert_eq!(compute_level(100, 100), (1, 0));
        assert_eq!(compute_level(250, 100), (2, 50));
    }

    #[test]
    fn test_compute_level_negative_balance() {
        // Euclidean division keeps progress in [0, level_length)
        assert_eq!(compute_level(-30, 100), (-1, 70));
        assert_eq!(compute_level(-100, 100), (-1, 0));
    }

    #[tokio::test]
    async fn test_balance_empty_ledger() -> Result<()> {
        let db = setup_test_db().await?;

        assert_eq!(balance_for_user(&db, "mads").await?, 0);

        let status = level_status(&db, "mads").await?;
        assert_eq!(status.balance, 0);
        assert_eq!(status.level, 0);
        assert_eq!(status.progress, 0);
        assert!(status.level_length.is_defaulted());

        Ok(())
    }

    #[tokio::test]
    async fn test_balance_is_sum_of_changes() -> Result<()> {
        let db = setup_test_db().await?;

        record_transaction(&db, "mads", "mads", 40, "quiz".to_string()).await?;
        record_transaction(&db, "mads", "mads", -15, "correction".to_string()).await?;
        record_transaction(&db, "mads", "mads", 25, "fantasy".to_string()).await?;
        // The partner's transactions must not leak in
        record_transaction(&db, "sofie", "sofie", 500, "quiz".to_string()).await?;

        assert_eq!(balance_for_user(&db, "mads").await?, 50);
        assert_eq!(balance_for_user(&db, "sofie").await?, 500);
        assert_eq!(household_balance(&db).await?, 550);

        // Re-reading without intervening writes is idempotent
        assert_eq!(balance_for_user(&db, "mads").await?, 50);

        Ok(())
    }

    #[tokio::test]
    async fn test_level_status_with_configured_length() -> Result<()> {
        let db = setup_test_db().await?;
        set_setting(&db, "level_length", "50").await?;

        record_transaction(&db, "mads", "mads", 120, "quiz".to_string()).await?;

        let status = level_status(&db, "mads").await?;
        assert_eq!(status.balance, 120);
        assert_eq!(status.level, 2);
        assert_eq!(status.progress, 20);
        assert!(!status.level_length.is_defaulted());

        Ok(())
    }

    #[tokio::test]
    async fn test_award_xp_with_matching_rule() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_rule(&db, "mads", "complete_parquiz", Some("low"), 10).await?;

        let outcome = award_xp(
            &db,
            "mads",
            "complete_parquiz",
            Some("low"),
            "mads",
            "Love languages",
        )
        .await?;

        let AwardOutcome::Awarded(transaction) = outcome else {
            panic!("expected an award");
        };
        assert_eq!(transaction.change, 10);
        assert_eq!(transaction.description, "complete_parquiz: Love languages (low)");
        assert_eq!(balance_for_user(&db, "mads").await?, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_award_xp_effortless_rule() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_rule(&db, "sofie", "create_fantasy", None, 25).await?;

        let outcome = award_xp(&db, "sofie", "create_fantasy", None, "sofie", "Surprise trip").await?;

        let AwardOutcome::Awarded(transaction) = outcome else {
            panic!("expected an award");
        };
        assert_eq!(transaction.description, "create_fantasy: Surprise trip");

        Ok(())
    }

    #[tokio::test]
    async fn test_award_xp_missing_rule_is_noop() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_rule(&db, "mads", "complete_parquiz", Some("low"), 10).await?;

        // Effort mismatch: no rule for "high"
        let outcome = award_xp(
            &db,
            "mads",
            "complete_parquiz",
            Some("high"),
            "mads",
            "Love languages",
        )
        .await?;

        assert_eq!(outcome, AwardOutcome::RuleMissing);
        assert_eq!(balance_for_user(&db, "mads").await?, 0);
        assert!(transactions_for_user(&db, "mads").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_award_xp_ambiguous_rules_is_noop() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_rule(&db, "mads", "complete_parquiz", Some("low"), 10).await?;
        create_test_rule(&db, "mads", "complete_parquiz", Some("low"), 9999).await?;

        // Duplicate keys in the rule table: neither row may be picked
        let outcome = award_xp(
            &db,
            "mads",
            "complete_parquiz",
            Some("low"),
            "mads",
            "Love languages",
        )
        .await?;

        assert_eq!(outcome, AwardOutcome::RuleMissing);
        assert_eq!(balance_for_user(&db, "mads").await?, 0);
        assert!(transactions_for_user(&db, "mads").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_award_xp_role_mismatch_is_noop() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_rule(&db, "mads", "complete_parquiz", Some("low"), 10).await?;

        let outcome = award_xp(
            &db,
            "sofie",
            "complete_parquiz",
            Some("low"),
            "sofie",
            "Love languages",
        )
        .await?;

        assert_eq!(outcome, AwardOutcome::RuleMissing);

        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_for_user_newest_first() -> Result<()> {
        let db = setup_test_db().await?;

        record_transaction(&db, "mads", "mads", 10, "first".to_string()).await?;
        record_transaction(&db, "mads", "mads", 20, "second".to_string()).await?;

        let transactions = transactions_for_user(&db, "mads").await?;
        assert_eq!(transactions.len(), 2);
        assert!(transactions[0].created_at >= transactions[1].created_at);

        Ok(())
    }
}
