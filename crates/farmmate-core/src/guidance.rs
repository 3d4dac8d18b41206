//! Cultivation guidance for a crop thread.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `recommendedActions` arrives either as a list or as an object keyed by
/// index (`{"0": "...", "1": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecommendedActions {
    List(Vec<String>),
    Indexed(BTreeMap<String, String>),
}

impl Default for RecommendedActions {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// Response of `GET /members/{id}/threads/{threadId}/status?cropId=`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guidance {
    #[serde(default)]
    pub recommended_actions: RecommendedActions,
}

impl Guidance {
    /// Recommended actions in index order.
    pub fn actions(&self) -> Vec<String> {
        match &self.recommended_actions {
            RecommendedActions::List(list) => list.clone(),
            RecommendedActions::Indexed(map) => {
                let mut entries: Vec<(&String, &String)> = map.iter().collect();
                // numeric keys sort numerically, anything else after them
                entries.sort_by_key(|(key, _)| (key.parse::<u64>().unwrap_or(u64::MAX), *key));
                entries.into_iter().map(|(_, action)| action.clone()).collect()
            }
        }
    }
}
