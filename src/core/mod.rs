//! Core business logic - framework-agnostic XP ledger, redemption, context
//! gathering, and recommendation generation. The API layer is a thin
//! transport over these functions; everything here is testable against an
//! in-memory database with explicit `user_id`/`role` context.

/// Context gathering for LLM prompts
pub mod gather;
/// XP ledger: balances, levels, and award rules
pub mod ledger;
/// Recommendation generation and audit logging
pub mod recommend;
/// Reward catalog and redemption engine
pub mod redemption;
/// Fail-soft settings lookups
pub mod settings;
