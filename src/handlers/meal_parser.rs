use std::sync::Arc;

use crate::error::ParseError;
use crate::models::{FoodItem, MealSummary};
use crate::parsing::{build_request, extract_food_items};
use crate::services::CompletionBackend;

/// Turns a meal description into food items: prompt, one backend call,
/// tolerant extraction. Holds no per-request state.
pub struct MealParser {
    backend: Arc<dyn CompletionBackend>,
}

impl MealParser {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn parse(&self, utterance: &str) -> Result<Vec<FoodItem>, ParseError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            log::warn!("⚠️ Rejected empty meal description");
            return Err(ParseError::InvalidInput("input must be a non-empty string".to_string()));
        }

        let request = build_request(utterance);
        log::debug!("📝 Prompt built for: '{}'", utterance);

        let reply = self.backend.complete(request).await.map_err(|e| {
            log::error!("❌ Backend call failed: {}", e);
            ParseError::from(e)
        })?;
        log::debug!("💬 Backend responded ({} bytes): {}", reply.len(), reply);

        let extraction = extract_food_items(&reply).map_err(|e| {
            log::error!("❌ Extraction failed: {}", e);
            log::debug!("📄 Unparseable reply: {}", reply);
            ParseError::from(e)
        })?;
        log::debug!("🧩 Extraction strategy: {}", extraction.strategy);

        if extraction.items.is_empty() {
            log::warn!("⚠️ No foods found for: '{}'", utterance);
            return Err(ParseError::NoFoodsFound);
        }

        log::info!("✅ {}", MealSummary::from_items(&extraction.items).headline());
        Ok(extraction.items)
    }
}
