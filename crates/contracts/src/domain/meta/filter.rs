use std::collections::BTreeMap;

use super::map::MetaMap;
use super::value::MetaValue;

/// Одно условие фильтра `has_meta`
///
/// `value == None` означает проверку только наличия ключа.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaCondition {
    pub key: String,
    pub value: Option<String>,
}

impl MetaCondition {
    pub fn exists(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn equals(key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into().into_inner(),
        }
    }
}

/// Фильтр по meta-полям: набор условий, объединяемых через AND
///
/// Строится из одного ключа (с значением или без), из набора
/// ключ -> значение либо из списка ключей.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaFilter(Vec<MetaCondition>);

impl MetaFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Один ключ с необязательным значением; NULL проверяет только наличие
    pub fn key(key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        Self(vec![MetaCondition::equals(key, value)])
    }

    /// Наличие каждого из ключей, значения не проверяются
    pub fn keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self(keys.into_iter().map(MetaCondition::exists).collect())
    }

    pub fn and(mut self, condition: MetaCondition) -> Self {
        self.0.push(condition);
        self
    }

    pub fn conditions(&self) -> &[MetaCondition] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for MetaFilter {
    type Item = MetaCondition;
    type IntoIter = std::vec::IntoIter<MetaCondition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<MetaCondition> for MetaFilter {
    fn from_iter<I: IntoIterator<Item = MetaCondition>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&str> for MetaFilter {
    fn from(key: &str) -> Self {
        Self(vec![MetaCondition::exists(key)])
    }
}

impl From<String> for MetaFilter {
    fn from(key: String) -> Self {
        Self(vec![MetaCondition::exists(key)])
    }
}

impl<V: Into<MetaValue>> From<(&str, V)> for MetaFilter {
    fn from((key, value): (&str, V)) -> Self {
        Self::key(key, value)
    }
}

impl From<Vec<&str>> for MetaFilter {
    fn from(keys: Vec<&str>) -> Self {
        Self::keys(keys)
    }
}

impl<const N: usize> From<[&str; N]> for MetaFilter {
    fn from(keys: [&str; N]) -> Self {
        Self::keys(keys)
    }
}

impl From<MetaMap> for MetaFilter {
    fn from(map: MetaMap) -> Self {
        map.into_iter()
            .map(|(key, value)| MetaCondition::equals(key, value))
            .collect()
    }
}

impl<K: Into<String>, V: Into<MetaValue>> From<BTreeMap<K, V>> for MetaFilter {
    fn from(pairs: BTreeMap<K, V>) -> Self {
        MetaMap::from(pairs).into()
    }
}
