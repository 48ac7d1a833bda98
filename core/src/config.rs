use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_RELEVANCE_EPSILON: f64 = 1e-6;

/// Engine construction parameters. Limits are fixed for the lifetime of a
/// server, never per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub stop_words: Vec<String>,
    pub max_results: usize,
    /// Relevances closer than this are ranked by rating instead.
    pub relevance_epsilon: f64,
    /// Shards in the parallel score map; defaults to the CPU count.
    pub shard_count: Option<usize>,
    /// Threads in the scoring pool; defaults to the CPU count.
    pub worker_threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            stop_words: Vec::new(),
            max_results: DEFAULT_MAX_RESULTS,
            relevance_epsilon: DEFAULT_RELEVANCE_EPSILON,
            shard_count: None,
            worker_threads: None,
        }
    }
}

impl SearchConfig {
    pub fn from_json(json: &str) -> Result<Self> { Ok(serde_json::from_str(json)?) }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn shard_count(&self) -> usize { self.shard_count.unwrap_or_else(num_cpus::get).max(1) }

    pub fn worker_threads(&self) -> usize { self.worker_threads.unwrap_or_else(num_cpus::get).max(1) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SearchConfig::from_json(r#"{"stop_words": ["и", "в"], "worker_threads": 2}"#).unwrap();
        assert_eq!(cfg.stop_words, vec!["и", "в"]);
        assert_eq!(cfg.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(cfg.relevance_epsilon, DEFAULT_RELEVANCE_EPSILON);
        assert_eq!(cfg.worker_threads(), 2);
        assert!(cfg.shard_count() >= 1);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(SearchConfig::from_json("{"), Err(crate::SearchError::Config(_))));
    }
}
