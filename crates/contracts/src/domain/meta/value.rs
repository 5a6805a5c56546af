use serde::{Deserialize, Serialize};

/// Значение meta-поля (`meta_value`), возможно NULL
///
/// Скалярные значения приводятся к строке так же, как их хранит
/// WordPress: `true` -> `"1"`, `false` -> `""`, числа в десятичной записи.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaValue(Option<String>);

impl MetaValue {
    pub fn null() -> Self {
        Self(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self(Some(value))
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self(Some(value.to_string()))
    }
}

impl From<&String> for MetaValue {
    fn from(value: &String) -> Self {
        Self(Some(value.clone()))
    }
}

impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self(Some(if value { "1" } else { "" }.to_string()))
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self(Some(value.to_string()))
    }
}

macro_rules! meta_value_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for MetaValue {
                fn from(value: $t) -> Self {
                    Self(Some(value.to_string()))
                }
            }
        )*
    };
}

meta_value_from_integer!(i32, i64, u32, u64, usize);
