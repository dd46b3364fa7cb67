use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Loosely typed vendor `output` field: a single URL, a list, or anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskOutput {
    One(String),
    Many(Vec<Value>),
    Other(Value),
}

impl TaskOutput {
    /// String entries in vendor order. Non-string list items and other shapes are ignored.
    pub fn urls(&self) -> Vec<String> {
        match self {
            TaskOutput::One(url) => vec![url.clone()],
            TaskOutput::Many(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            TaskOutput::Other(_) => Vec::new(),
        }
    }
}

/// Drops empty candidates and duplicates, keeping first-seen order.
/// Returns `None` rather than an empty list when nothing usable remains.
pub fn collect_urls<I, S>(candidates: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let urls: Vec<String> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let url = candidate.as_ref().trim();
            if url.is_empty() || !seen.insert(url.to_string()) {
                return None;
            }
            Some(url.to_string())
        })
        .collect();

    if urls.is_empty() {
        None
    } else {
        Some(urls)
    }
}
