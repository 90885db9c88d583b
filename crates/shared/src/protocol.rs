use serde::{Deserialize, Serialize};

/// Route answering live tag searches with an HTML fragment.
pub const FIND_TAGS_PATH: &str = "/edit/find_tags";
/// Query parameter carrying the search text.
pub const FIND_TAGS_PARAM: &str = "name";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindTagsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FindTagsQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}
