//! Structured options and their per-platform expansion into argument tokens.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::{CommandLineError, Platform};

/// One option occurrence: nothing, a switch, or a stringified value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionItem {
    Null,
    Switch(bool),
    Value(String),
}

/// Value attached to an option name.
///
/// `Repeated` holds plain items only, so a sequence of sequences cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Single(OptionItem),
    Repeated(Vec<OptionItem>),
}

impl From<bool> for OptionItem {
    fn from(value: bool) -> Self {
        OptionItem::Switch(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Single(OptionItem::Switch(value))
    }
}

macro_rules! stringified_option {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for OptionItem {
                fn from(value: $ty) -> Self {
                    OptionItem::Value(value.to_string())
                }
            }

            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    OptionValue::Single(OptionItem::from(value))
                }
            }
        )*
    };
}

stringified_option!(
    &str, String, &String, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
);

impl<T: Into<OptionItem>> From<Option<T>> for OptionItem {
    fn from(value: Option<T>) -> Self {
        value.map_or(OptionItem::Null, Into::into)
    }
}

impl<T: Into<OptionItem>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        OptionValue::Single(value.into())
    }
}

impl From<OptionItem> for OptionValue {
    fn from(item: OptionItem) -> Self {
        OptionValue::Single(item)
    }
}

impl<T: Into<OptionItem>> From<Vec<T>> for OptionValue {
    fn from(items: Vec<T>) -> Self {
        OptionValue::Repeated(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<OptionItem>, const N: usize> From<[T; N]> for OptionValue {
    fn from(items: [T; N]) -> Self {
        OptionValue::Repeated(items.into_iter().map(Into::into).collect())
    }
}

impl OptionValue {
    /// Converts a JSON value, rejecting objects and nested arrays.
    pub fn from_json(name: &str, value: Value) -> Result<Self, CommandLineError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| item_from_json(name, item))
                .collect::<Result<Vec<_>, _>>()
                .map(OptionValue::Repeated),
            other => item_from_json(name, other).map(OptionValue::Single),
        }
    }
}

fn item_from_json(name: &str, value: Value) -> Result<OptionItem, CommandLineError> {
    match value {
        Value::Null => Ok(OptionItem::Null),
        Value::Bool(flag) => Ok(OptionItem::Switch(flag)),
        Value::Number(number) => Ok(OptionItem::Value(number.to_string())),
        Value::String(text) => Ok(OptionItem::Value(text)),
        Value::Array(_) => Err(CommandLineError::InvalidOptionValue {
            name: name.to_string(),
            reason: "nested sequences are not supported".to_string(),
        }),
        Value::Object(_) => Err(CommandLineError::InvalidOptionValue {
            name: name.to_string(),
            reason: "objects cannot be rendered as option values".to_string(),
        }),
    }
}

impl Platform {
    /// Tokens for a single occurrence of `name`. Never expands sequences.
    pub fn emit_option(self, name: &str, item: &OptionItem) -> Vec<String> {
        match item {
            OptionItem::Null | OptionItem::Switch(false) => Vec::new(),
            OptionItem::Switch(true) => vec![self.flag(name)],
            OptionItem::Value(value) => match self {
                Platform::Posix => vec![self.flag(name), value.clone()],
                Platform::Windows => vec![format!("/{name}:{value}")],
            },
        }
    }

    /// Tokens for `name`, emitting once per element of a repeated value.
    pub fn expand_option(self, name: &str, value: &OptionValue) -> Vec<String> {
        match value {
            OptionValue::Single(item) => self.emit_option(name, item),
            OptionValue::Repeated(items) => items
                .iter()
                .flat_map(|item| self.emit_option(name, item))
                .collect(),
        }
    }

    fn flag(self, name: &str) -> String {
        match self {
            Platform::Posix if name.chars().count() == 1 => format!("-{name}"),
            Platform::Posix => format!("--{name}"),
            Platform::Windows => format!("/{name}"),
        }
    }
}

/// Options in caller insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: Vec<(String, OptionValue)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name`, keeping its original position when it was already present.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Expands every option in order using `platform`'s syntax.
    pub fn to_args(&self, platform: Platform) -> Vec<String> {
        self.iter()
            .flat_map(|(name, value)| platform.expand_option(name, value))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Options
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Options::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Options
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for Options {
    type Item = (String, OptionValue);
    type IntoIter = std::vec::IntoIter<(String, OptionValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl TryFrom<Map<String, Value>> for Options {
    type Error = CommandLineError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut options = Options::new();
        for (name, value) in map {
            let value = OptionValue::from_json(&name, value)?;
            options.insert(name, value);
        }
        Ok(options)
    }
}

impl<'de> Deserialize<'de> for Options {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Options::try_from(map).map_err(serde::de::Error::custom)
    }
}
