use serde::{Deserialize, Serialize};

use crate::domain::meta::MetaCollection;

/// Комментарий к записи (`wp_comments`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,

    #[serde(rename = "postId")]
    pub post_id: i64,

    pub author: String,
    pub content: String,
    pub approved: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<MetaCollection>,
}

impl Comment {
    pub fn new_for_insert(post_id: i64, author: String, content: String) -> Self {
        Self {
            id: 0,
            post_id,
            author,
            content,
            approved: "1".to_string(),
            meta: None,
        }
    }
}
