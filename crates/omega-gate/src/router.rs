//! Signal router — assigns an execution tier by cheap heuristics

use crate::config::RouterConfig;
use omega_core::Tier;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct SignalRouter {
    verified: HashSet<String>,
    strategic_length: usize,
    keywords: Vec<String>,
}

impl Default for SignalRouter {
    fn default() -> Self {
        Self::from_config(&RouterConfig::default())
    }
}

impl SignalRouter {
    pub fn new(
        patterns: impl IntoIterator<Item = impl AsRef<str>>,
        strategic_length: usize,
        keywords: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        Self {
            verified: patterns.into_iter().map(|p| normalize(p.as_ref())).collect(),
            strategic_length,
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(
            &config.verified_patterns,
            config.strategic_length,
            &config.strategic_keywords,
        )
    }

    /// Classify an arbitrary payload. Total: anything that is not text
    /// is treated as an empty string.
    pub fn classify(&self, content: &Value) -> Tier {
        self.classify_text(&coerce_text(content))
    }

    pub fn classify_text(&self, text: &str) -> Tier {
        if self.verified.contains(&normalize(text)) {
            return Tier::Reflex;
        }
        let lowered = text.to_lowercase();
        if text.chars().count() > self.strategic_length
            || self.keywords.iter().any(|k| lowered.contains(k.as_str()))
        {
            return Tier::Strategic;
        }
        Tier::Tactical
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Text view of a payload. Strings as-is, scalars by display form,
/// everything else empty.
pub fn coerce_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
