use serde::{Deserialize, Serialize};

use crate::domain::meta::MetaCollection;

/// Термин таксономии (`wp_terms`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub name: String,
    pub slug: String,

    #[serde(rename = "termGroup")]
    pub term_group: i64,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<MetaCollection>,
}

impl Term {
    pub fn new_for_insert(name: String, slug: String) -> Self {
        Self {
            id: 0,
            name,
            slug,
            term_group: 0,
            meta: None,
        }
    }
}
