//! Recommendation generation - prompt assembly, completion calls, and the
//! audit trail.
//!
//! Both prompt flavors follow the same shape: gather labeled context, add a
//! tone, instruct the model to answer with the recommendation text only,
//! send one completion call, then persist. The user-visible recommendation
//! row is written before the audit log row, so a crash between the two loses
//! only audit, never the displayed result.

use crate::{
    core::{
        gather::{self, GatheredContext},
        settings,
    },
    entities::{Recommendation, gpt_log, profile, recommendation},
    errors::Result,
    llm::{LlmClient, TokenUsage},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, warn};

/// Default cap on how much of the prompt is stored in the GPT log
pub const DEFAULT_LOG_TRUNCATION_LIMIT: usize = 2000;

const RECOMMENDATION_ONLY_INSTRUCTION: &str =
    "Answer with only the recommendation text, nothing else.";

/// Widget identifier logged for the quiz-scoped path
pub const QUIZ_WIDGET: &str = "quiz-recommendation";
/// Widget identifier logged for the overall path
pub const OVERALL_WIDGET: &str = "overall-recommendation";

/// Summarizes a profile's personality colors and keywords for the
/// quiz-scoped prompt. Empty when the profile carries neither.
#[must_use]
pub fn color_profile_summary(profile: &profile::Model) -> String {
    let mut parts = Vec::new();
    if let Some(colors) = profile
        .color_profile
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        parts.push(format!("Personality colors, most dominant first: {colors}"));
    }
    if let Some(keywords) = profile.keywords.as_deref().filter(|k| !k.trim().is_empty()) {
        parts.push(format!("Keywords: {keywords}"));
    }
    parts.join("\n")
}

/// Builds the quiz-scoped prompt from the color summary, relationship
/// background, the quiz's free-text summary, and a tone.
#[must_use]
pub fn build_quiz_prompt(
    color_summary: &str,
    background: &str,
    quiz_summary: &str,
    tone: &str,
) -> String {
    let mut prompt = String::from(
        "You are a relationship coach for a couple. Based on the information \
         below, give one concrete recommendation for them.\n",
    );
    if !color_summary.is_empty() {
        prompt.push_str(&format!("\nColor profile:\n{color_summary}\n"));
    }
    if !background.is_empty() {
        prompt.push_str(&format!("\nRelationship background:\n{background}\n"));
    }
    prompt.push_str(&format!("\nQuiz summary:\n{quiz_summary}\n"));
    prompt.push_str(&format!("\nTone: {tone}\n\n{RECOMMENDATION_ONLY_INSTRUCTION}"));
    prompt
}

/// Builds the overall prompt from the profile block and the gatherer's
/// multi-table dump.
#[must_use]
pub fn build_overall_prompt(context: &GatheredContext, tone: &str) -> String {
    let mut prompt = String::from(
        "You are a relationship coach for a couple. Based on their profile \
         and the data below, give one concrete recommendation for them.\n",
    );
    if !context.profile_block.is_empty() {
        prompt.push_str(&format!("\nProfile:\n{}\n", context.profile_block));
    }
    if !context.data_block.is_empty() {
        prompt.push_str(&format!("\nData:\n{}\n", context.data_block));
    }
    prompt.push_str(&format!("\nTone: {tone}\n\n{RECOMMENDATION_ONLY_INSTRUCTION}"));
    prompt
}

/// Truncates a prompt to `limit` characters for logging.
#[must_use]
pub fn truncate_for_log(prompt: &str, limit: usize) -> String {
    prompt.chars().take(limit).collect()
}

/// Retrieves the latest recommendation for a user, optionally scoped to a
/// quiz. "Latest" is `generated_at` descending; history accumulates.
pub async fn latest_recommendation(
    db: &DatabaseConnection,
    user_id: &str,
    quiz_key: Option<&str>,
) -> Result<Option<recommendation::Model>> {
    let mut query = Recommendation::find()
        .filter(recommendation::Column::UserId.eq(user_id));
    query = match quiz_key {
        Some(key) => query.filter(recommendation::Column::QuizKey.eq(key)),
        None => query.filter(recommendation::Column::QuizKey.is_null()),
    };

    query
        .order_by_desc(recommendation::Column::GeneratedAt)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Recommendation generation service: wraps the completion client and the
/// single prompt-log truncation limit.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    llm: LlmClient,
    log_truncation_limit: usize,
}

impl RecommendationService {
    /// Creates a service with the default log truncation limit.
    #[must_use]
    pub const fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            log_truncation_limit: DEFAULT_LOG_TRUNCATION_LIMIT,
        }
    }

    /// Overrides the prompt-log truncation limit.
    #[must_use]
    pub const fn with_log_truncation_limit(mut self, limit: usize) -> Self {
        self.log_truncation_limit = limit;
        self
    }

    /// Generates a quiz-scoped recommendation and persists it.
    pub async fn quiz_recommendation(
        &self,
        db: &DatabaseConnection,
        user_id: &str,
        quiz_key: Option<&str>,
        quiz_summary: &str,
        background: &str,
        tone: &str,
    ) -> Result<String> {
        let color_summary = gather::fetch_profile(db, user_id)
            .await?
            .map(|p| color_profile_summary(&p))
            .unwrap_or_default();

        let prompt = build_quiz_prompt(&color_summary, background, quiz_summary, tone);
        let context = GatheredContext::default();

        self.generate_and_persist(db, user_id, QUIZ_WIDGET, quiz_key, &prompt, &context)
            .await
    }

    /// Generates an overall recommendation from the gatherer's full context
    /// and persists it with provenance counts.
    pub async fn overall_recommendation(
        &self,
        db: &DatabaseConnection,
        user_id: &str,
        tone: &str,
    ) -> Result<String> {
        let context = gather::gather(db, user_id).await?;
        let prompt = build_overall_prompt(&context, tone);

        self.generate_and_persist(db, user_id, OVERALL_WIDGET, None, &prompt, &context)
            .await
    }

    async fn generate_and_persist(
        &self,
        db: &DatabaseConnection,
        user_id: &str,
        widget: &str,
        quiz_key: Option<&str>,
        prompt: &str,
        context: &GatheredContext,
    ) -> Result<String> {
        let model = settings::default_model(db).await?.into_value();

        let completion = match self.llm.complete(&model, prompt).await {
            Ok(completion) => completion,
            Err(err) => {
                // Best-effort audit of the failed attempt; the original
                // error is what the caller sees either way.
                let failure = format!("generation failed: {err}");
                if let Err(log_err) = self
                    .log_attempt(db, user_id, widget, prompt, &failure, &model, None, context)
                    .await
                {
                    warn!("Could not log failed generation attempt: {log_err}");
                }
                return Err(err.into());
            }
        };

        self.persist_generation(
            db,
            user_id,
            widget,
            quiz_key,
            prompt,
            &completion.text,
            &model,
            completion.usage,
            context,
        )
        .await?;

        Ok(completion.text)
    }

    /// Persists a successful generation: the recommendation record first
    /// (user-visible state), then the audit log row.
    #[allow(clippy::too_many_arguments)]
    pub async fn persist_generation(
        &self,
        db: &DatabaseConnection,
        user_id: &str,
        widget: &str,
        quiz_key: Option<&str>,
        prompt: &str,
        response: &str,
        model: &str,
        usage: TokenUsage,
        context: &GatheredContext,
    ) -> Result<recommendation::Model> {
        let record = recommendation::ActiveModel {
            user_id: Set(user_id.to_string()),
            quiz_key: Set(quiz_key.map(ToString::to_string)),
            recommendation: Set(response.to_string()),
            generated_at: Set(chrono::Utc::now()),
            table_count: Set(context.table_count),
            row_count: Set(context.row_count),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.log_attempt(db, user_id, widget, prompt, response, model, Some(usage), context)
            .await?;

        info!(
            user_id,
            widget,
            tables = context.table_count,
            rows = context.row_count,
            "Recommendation generated"
        );
        Ok(record)
    }

    #[allow(clippy::too_many_arguments)]
    async fn log_attempt(
        &self,
        db: &DatabaseConnection,
        user_id: &str,
        widget: &str,
        prompt: &str,
        response: &str,
        model: &str,
        usage: Option<TokenUsage>,
        context: &GatheredContext,
    ) -> Result<()> {
        let usage = usage.unwrap_or_else(|| TokenUsage {
            total_tokens: crate::llm::estimate_tokens(prompt.len()),
            prompt_tokens: 0,
            completion_tokens: 0,
        });

        gpt_log::ActiveModel {
            user_id: Set(user_id.to_string()),
            widget: Set(widget.to_string()),
            prompt: Set(truncate_for_log(prompt, self.log_truncation_limit)),
            response: Set(response.to_string()),
            model: Set(model.to_string()),
            total_tokens: Set(usage.total_tokens),
            prompt_tokens: Set(usage.prompt_tokens),
            completion_tokens: Set(usage.completion_tokens),
            tables_used: Set(context.tables_used.join(",")),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(())
    }
}
