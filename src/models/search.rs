use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Grouped search results from `GET /search?q=`.
///
/// Result entries are heterogeneous projections chosen by the server, so
/// they stay raw values grouped into the two buckets the view renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub tags: Vec<Value>,
    #[serde(default)]
    pub users: Vec<Value>,
}

/// Wire envelope: `{ "results": { "tags": [...], "users": [...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub results: SearchResults,
}
