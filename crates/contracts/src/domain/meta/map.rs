use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::value::MetaValue;

/// Упорядоченный набор пар ключ -> значение для массовых операций
///
/// Порядок вставки сохраняется: `create_meta_map` возвращает созданные
/// строки в том же порядке. Повторяющиеся ключи не схлопываются.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaMap(Vec<(String, MetaValue)>);

impl MetaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, MetaValue)> {
        self.0.iter()
    }
}

impl IntoIterator for MetaMap {
    type Item = (String, MetaValue);
    type IntoIter = std::vec::IntoIter<(String, MetaValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<MetaValue>> FromIterator<(K, V)> for MetaMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<MetaValue>, const N: usize> From<[(K, V); N]> for MetaMap {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<MetaValue>> From<Vec<(K, V)>> for MetaMap {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<MetaValue>> From<BTreeMap<K, V>> for MetaMap {
    fn from(pairs: BTreeMap<K, V>) -> Self {
        pairs.into_iter().collect()
    }
}

/// Одно поле в теле запроса записи meta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFieldDto {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// Тело PUT/POST `/api/posts/:id/meta`: JSON-объект `{key: value|null, ...}`
///
/// Поля хранятся в порядке следования в документе, повторяющиеся ключи
/// сохраняются. Строки, числа и bool приводятся к строке как в `MetaValue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaWriteDto {
    pub fields: Vec<MetaFieldDto>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarDto {
    Text(String),
    Flag(bool),
    Int(i64),
    Float(f64),
}

impl From<ScalarDto> for MetaValue {
    fn from(value: ScalarDto) -> Self {
        match value {
            ScalarDto::Text(v) => v.into(),
            ScalarDto::Flag(v) => v.into(),
            ScalarDto::Int(v) => v.into(),
            ScalarDto::Float(v) => v.into(),
        }
    }
}

impl Serialize for MetaWriteDto {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MetaWriteDto {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = MetaWriteDto;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of meta keys to string, number, bool or null")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, Option<ScalarDto>>()? {
                    fields.push(MetaFieldDto {
                        key,
                        value: MetaValue::from(value).into_inner(),
                    });
                }
                Ok(MetaWriteDto { fields })
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

impl From<MetaWriteDto> for MetaMap {
    fn from(dto: MetaWriteDto) -> Self {
        dto.fields.into_iter().map(|f| (f.key, f.value)).collect()
    }
}
