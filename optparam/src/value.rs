//! Dynamically typed values.
//!
//! [`Value`] is what an untyped [`AnyParam`](crate::AnyParam) resolves to.
//! An unconfigured parameter resolves to [`Value::Nil`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    Uint,
    Float,
    String,
}

/// A value of any supported kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(std::string::String),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Nil => ValueKind::Nil,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Uint(_) => ValueKind::Uint,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Infer a value from its textual form.
    ///
    /// Inference order:
    /// - `true` / `false` (also `True`, `TRUE`, `False`, `FALSE`) → Bool
    /// - fits `i64` → Int
    /// - fits `u64` → Uint
    /// - finite `f64` → Float
    /// - anything else → String
    pub fn infer(raw: &str) -> Self {
        if let Some(b) = parse_bool(raw) {
            return Self::Bool(b);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(u) = raw.parse::<u64>() {
            return Self::Uint(u);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::String(raw.to_string()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; a `Uint` converts when it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Uint(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Unsigned view; a non-negative `Int` converts.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(u) => Some(*u),
            Self::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Uint(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Boolean spellings shared by [`Value::infer`] and `bool` flags.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("<nil>"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_from_primitive {
    ($variant:ident($target:ty): $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant(v as $target)
                }
            }
        )+
    };
}

impl_from_primitive!(Int(i64): i8, i16, i32, i64, isize);
impl_from_primitive!(Uint(u64): u8, u16, u32, u64, usize);
impl_from_primitive!(Float(f64): f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<std::string::String> for Value {
    fn from(v: std::string::String) -> Self {
        Self::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Nil, Into::into)
    }
}

// Comparisons with primitives are numeric: `Int` and `Uint` both compare
// equal to an integer of the same magnitude, unlike `Value == Value`,
// which also compares the variant.
impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.as_i64() == Some(*other)
    }
}

impl PartialEq<u64> for Value {
    fn eq(&self, other: &u64) -> bool {
        self.as_u64() == Some(*other)
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Self::Float(f) if f == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}
