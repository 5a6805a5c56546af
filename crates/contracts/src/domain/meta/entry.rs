use serde::{Deserialize, Serialize};

/// Строка meta-таблицы (`wp_postmeta`, `wp_usermeta`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub id: i64,
    /// Значение внешнего ключа владельца (`post_id`, `user_id`, ...)
    #[serde(rename = "ownerId")]
    pub owner_id: i64,
    #[serde(rename = "metaKey")]
    pub meta_key: String,
    #[serde(rename = "metaValue")]
    pub meta_value: Option<String>,
}

/// Загруженное отношение host -> meta rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaCollection(Vec<MetaEntry>);

impl MetaCollection {
    pub fn new(entries: Vec<MetaEntry>) -> Self {
        Self(entries)
    }

    /// Первая строка с ключом `key`
    pub fn find(&self, key: &str) -> Option<&MetaEntry> {
        self.0.iter().find(|e| e.meta_key == key)
    }

    /// Значение первой строки с ключом `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.find(key).and_then(|e| e.meta_value.as_deref())
    }

    pub fn count_key(&self, key: &str) -> usize {
        self.0.iter().filter(|e| e.meta_key == key).count()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.meta_key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetaEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<MetaEntry> {
        self.0
    }
}

impl From<Vec<MetaEntry>> for MetaCollection {
    fn from(entries: Vec<MetaEntry>) -> Self {
        Self(entries)
    }
}

impl IntoIterator for MetaCollection {
    type Item = MetaEntry;
    type IntoIter = std::vec::IntoIter<MetaEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MetaCollection {
    type Item = &'a MetaEntry;
    type IntoIter = std::slice::Iter<'a, MetaEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
