//! API pricing per million tokens, by model.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Per-MTok prices in USD.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
    pub cache_input: f64,
    pub cache_output: f64,
}

/// Fallback for unknown models (Sonnet pricing).
pub const DEFAULT_PRICING: ModelPricing = ModelPricing {
    input: 1.50,
    output: 7.50,
    cache_input: 0.15,
    cache_output: 1.875,
};

/// Monthly subscription price in USD, used for the savings projection.
pub const SUBSCRIPTION_PRICE: f64 = 200.0;

lazy_static! {
    static ref MODEL_PRICING: HashMap<&'static str, ModelPricing> = {
        let mut map = HashMap::new();
        map.insert(
            "claude-sonnet-4-5-20250929",
            ModelPricing {
                input: 1.50,
                output: 7.50,
                cache_input: 0.15,
                cache_output: 1.875,
            },
        );
        map.insert(
            "claude-haiku-4-5-20251001",
            ModelPricing {
                input: 0.50,
                output: 2.50,
                cache_input: 0.05,
                cache_output: 0.625,
            },
        );
        map.insert(
            "claude-opus-4-5-20251101",
            ModelPricing {
                input: 2.50,
                output: 12.50,
                cache_input: 0.25,
                cache_output: 3.125,
            },
        );
        map
    };
}

pub fn pricing_for(model: &str) -> ModelPricing {
    MODEL_PRICING.get(model).copied().unwrap_or(DEFAULT_PRICING)
}
