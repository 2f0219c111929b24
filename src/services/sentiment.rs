//! Maps free-text admin reviews onto the ranking catalog.
//!
//! The prompt lists every selectable category name, the completion provider
//! answers with one of them, and the answer is looked up in the catalog by
//! exact name. Answers that match nothing are kept as-is with rank 0 so the
//! admin always gets a label back.

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Ranking, UNMATCHED_RANK},
    services::providers::CompletionProvider,
};

/// Placeholder in the prompt template that receives the category list
pub const RANKINGS_PLACEHOLDER: &str = "{rankings}";

/// Builds the classification prompt.
///
/// Sentinel categories are left out of the comma-separated list, which
/// replaces the first `{rankings}` in `template`; the review text is appended
/// verbatim. An empty catalog still yields a prompt.
pub fn build_prompt(categories: &[Ranking], template: &str, review_text: &str) -> String {
    let selectable = categories
        .iter()
        .filter(|c| !c.is_sentinel())
        .map(|c| c.ranking_name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let mut prompt = template.replacen(RANKINGS_PLACEHOLDER, &selectable, 1);
    prompt.push_str(review_text);
    prompt
}

pub struct SentimentClassifier {
    provider: Arc<dyn CompletionProvider>,
    template: String,
}

impl SentimentClassifier {
    pub fn new(provider: Arc<dyn CompletionProvider>, template: String) -> Self {
        Self { provider, template }
    }

    /// Classifies `review_text` into one of `categories`.
    ///
    /// Provider failures propagate; an unrecognised answer does not.
    #[tracing::instrument(skip_all, fields(categories = categories.len()))]
    pub async fn classify(&self, review_text: &str, categories: &[Ranking]) -> AppResult<Ranking> {
        let prompt = build_prompt(categories, &self.template, review_text);
        let response = self.provider.complete(&prompt).await?;
        let ranking = match categories.iter().find(|c| c.ranking_name == response) {
            Some(category) => {
                tracing::info!(
                    provider = self.provider.name(),
                    ranking_name = %category.ranking_name,
                    ranking_value = category.ranking_value,
                    "Review classified"
                );
                category.clone()
            }
            None => {
                tracing::warn!(
                    provider = self.provider.name(),
                    response = %response,
                    "Classifier answered outside the ranking catalog"
                );
                Ranking::new(response, UNMATCHED_RANK)
            }
        };

        Ok(ranking)
    }
}
