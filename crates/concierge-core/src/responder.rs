//! Keyword responder — ordered rule table with substring matching.
//!
//! Matching is plain substring containment on the normalized transcript, not
//! token-bounded: `"pool"` also matches inside `"carpool"`. Rules are tried in
//! declaration order and the first hit wins.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};
use crate::text_prep::normalize;

/// Reply used when no rule matches.
pub const FALLBACK_RESPONSE: &str =
    "I’m sorry, I didn’t understand that. Could you please rephrase?";

static BUILTIN: LazyLock<RuleTable> = LazyLock::new(RuleTable::builtin);

/// A static keyword-set-to-response mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub keywords: Vec<String>,
    pub response: String,
}

impl Rule {
    fn new(keywords: &[&str], response: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            response: response.to_string(),
        }
    }

    /// True if any keyword occurs in the already-normalized `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Immutable, ordered rule table plus fallback reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    rules: Vec<Rule>,
    fallback: String,
}

#[derive(Deserialize)]
struct RawTable {
    rules: Vec<Rule>,
    #[serde(default)]
    fallback: Option<String>,
}

impl RuleTable {
    /// The hotel concierge rules.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                Rule::new(
                    &["food", "breakfast", "menu", "order"],
                    "Our restaurant is open 24/7. You can order food from the in-room tablet or by calling extension 9.",
                ),
                Rule::new(
                    &["water", "bottle", "drinking water"],
                    "Sure! Housekeeping will deliver two bottles of drinking water shortly.",
                ),
                Rule::new(
                    &["clean room", "housekeeping", "towel", "linen"],
                    "Housekeeping has been notified. They will attend to your room in 10–15 minutes.",
                ),
                Rule::new(&["wifi", "internet"], "The WiFi password is: ROOM1234."),
                Rule::new(
                    &["swimming pool", "pool"],
                    "The swimming pool is open from 6 AM to 8 PM.",
                ),
                Rule::new(
                    &["gym", "fitness"],
                    "Our gym is open 24 hours and accessible using your room card.",
                ),
                Rule::new(
                    &["check out", "checkout"],
                    "Standard checkout time is 11 AM. You can request late checkout based on availability.",
                ),
                Rule::new(
                    &["location", "address"],
                    "We are located at 12th Cross, MG Road, Bangalore.",
                ),
            ],
            fallback: FALLBACK_RESPONSE.to_string(),
        }
    }

    /// Load a table from JSON:
    /// `{"rules": [{"keywords": [...], "response": "..."}], "fallback": "..."}`.
    ///
    /// Keywords are normalized the same way transcripts are, so `"Wi-Fi"`
    /// matches a spoken "wifi". A rule without any usable keyword is rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTable = serde_json::from_str(json)?;
        if raw.rules.is_empty() {
            return Err(ConciergeError::Config("rule table has no rules".into()));
        }

        let mut rules = Vec::with_capacity(raw.rules.len());
        for (i, rule) in raw.rules.into_iter().enumerate() {
            let keywords: Vec<String> = rule
                .keywords
                .iter()
                .map(|k| normalize(k))
                .filter(|k| !k.trim().is_empty())
                .collect();
            if keywords.is_empty() {
                return Err(ConciergeError::Config(format!("rule {i} has no keywords")));
            }
            if rule.response.trim().is_empty() {
                return Err(ConciergeError::Config(format!("rule {i} has an empty response")));
            }
            rules.push(Rule {
                keywords,
                response: rule.response,
            });
        }

        Ok(Self {
            rules,
            fallback: raw.fallback.unwrap_or_else(|| FALLBACK_RESPONSE.to_string()),
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// First rule matching `input`, if any.
    pub fn find(&self, input: &str) -> Option<&Rule> {
        let text = normalize(input);
        self.rules.iter().find(|rule| rule.matches(&text))
    }

    /// Reply for `input`: the first matching rule's response, else the fallback.
    pub fn respond(&self, input: &str) -> &str {
        self.find(input)
            .map(|rule| rule.response.as_str())
            .unwrap_or(self.fallback.as_str())
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Reply for `input` from the built-in table.
pub fn respond(input: &str) -> &'static str {
    BUILTIN.respond(input)
}
