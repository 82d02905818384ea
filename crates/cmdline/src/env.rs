/// Environment value before coercion to the string the child process sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    /// Dropped from the overlay instead of being passed as an empty string.
    Unset,
    /// Rendered as `"1"` or `"0"`.
    Flag(bool),
    Text(String),
}

impl EnvValue {
    pub fn coerce(self) -> Option<String> {
        match self {
            EnvValue::Unset => None,
            EnvValue::Flag(true) => Some("1".to_string()),
            EnvValue::Flag(false) => Some("0".to_string()),
            EnvValue::Text(text) => Some(text),
        }
    }
}

impl From<bool> for EnvValue {
    fn from(value: bool) -> Self {
        EnvValue::Flag(value)
    }
}

macro_rules! stringified_env {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for EnvValue {
                fn from(value: $ty) -> Self {
                    EnvValue::Text(value.to_string())
                }
            }
        )*
    };
}

stringified_env!(
    &str, String, &String, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
);

impl<T: Into<EnvValue>> From<Option<T>> for EnvValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(EnvValue::Unset, Into::into)
    }
}
