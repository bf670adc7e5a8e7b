//! Value types for cmdroute
//!
//! This crate holds the data that crosses the boundary between the text
//! pipeline and handler code:
//!
//! - [`ArgType`] - the declared type of a handler parameter
//! - [`Value`] - a dynamically typed, already-parsed argument
//! - [`FromValue`] - typed extraction of a [`Value`] inside a handler
//! - [`TypeParseError`] - conversion failure reported by a type parser
//!
//! ## Rules
//!
//! 1. No parsing or dispatch logic lives here
//! 2. Every `ArgType` has a zero value (`ArgType::zero_value`)
//! 3. Custom types are identified by name and carry opaque shared payloads

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ARGUMENT TYPES
// ============================================================================

/// Declared type of a handler parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// Application-defined type, looked up by name in the parser registry
    Custom(Cow<'static, str>),
}

impl ArgType {
    /// All built-in types, in the order the default parser set registers them
    pub const BUILTIN: [ArgType; 13] = [
        ArgType::Bool,
        ArgType::Char,
        ArgType::I8,
        ArgType::I16,
        ArgType::I32,
        ArgType::I64,
        ArgType::U8,
        ArgType::U16,
        ArgType::U32,
        ArgType::U64,
        ArgType::F32,
        ArgType::F64,
        ArgType::String,
    ];

    /// Named custom type
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        ArgType::Custom(name.into())
    }

    /// Value bound when an optional parameter is not supplied
    pub fn zero_value(&self) -> Value {
        match self {
            ArgType::Bool => Value::Bool(false),
            ArgType::Char => Value::Char('\0'),
            ArgType::I8 => Value::I8(0),
            ArgType::I16 => Value::I16(0),
            ArgType::I32 => Value::I32(0),
            ArgType::I64 => Value::I64(0),
            ArgType::U8 => Value::U8(0),
            ArgType::U16 => Value::U16(0),
            ArgType::U32 => Value::U32(0),
            ArgType::U64 => Value::U64(0),
            ArgType::F32 => Value::F32(0.0),
            ArgType::F64 => Value::F64(0.0),
            ArgType::String => Value::String(String::new()),
            ArgType::Custom(_) => Value::None,
        }
    }

    /// Name shown to end users in help and error text
    pub fn friendly_name(&self) -> &str {
        match self {
            ArgType::Bool => "bool",
            ArgType::Char => "char",
            ArgType::I8 | ArgType::I16 | ArgType::I32 | ArgType::I64 => "integer",
            ArgType::U8 | ArgType::U16 | ArgType::U32 | ArgType::U64 => "unsigned integer",
            ArgType::F32 | ArgType::F64 => "floating point number",
            ArgType::String => "string",
            ArgType::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ArgType::Custom(_))
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgType::Bool => "bool",
            ArgType::Char => "char",
            ArgType::I8 => "i8",
            ArgType::I16 => "i16",
            ArgType::I32 => "i32",
            ArgType::I64 => "i64",
            ArgType::U8 => "u8",
            ArgType::U16 => "u16",
            ArgType::U32 => "u32",
            ArgType::U64 => "u64",
            ArgType::F32 => "f32",
            ArgType::F64 => "f64",
            ArgType::String => "string",
            ArgType::Custom(name) => name,
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// Opaque payload produced by a custom type parser
///
/// Compared by identity: two custom values are equal only if they share the
/// same allocation.
#[derive(Clone)]
pub struct CustomValue(Arc<dyn Any + Send + Sync>);

impl CustomValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).downcast::<T>().ok()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.as_ref().is::<T>()
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomValue(..)")
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A parsed argument value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    #[serde(skip)]
    Custom(CustomValue),
    /// Zero value of a custom type
    None,
}

impl Value {
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Value::Custom(CustomValue::new(value))
    }

    /// Short name of the variant, used in mismatch messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Custom(_) => "custom",
            Value::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Custom(_) => write!(f, "<custom>"),
            Value::None => write!(f, "<none>"),
        }
    }
}

impl From<CustomValue> for Value {
    fn from(value: CustomValue) -> Self {
        Value::Custom(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

// ============================================================================
// TYPED EXTRACTION
// ============================================================================

/// Conversion from a bound [`Value`] into a concrete Rust type
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;

    /// Type name used when reporting a mismatch
    fn expected() -> &'static str {
        std::any::type_name::<Self>()
    }
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

value_conversions! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::None => Some(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn expected() -> &'static str {
        T::expected()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Text could not be converted into the requested type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot parse '{input}' as {expected}: {reason}")]
pub struct TypeParseError {
    pub input: String,
    pub expected: String,
    pub reason: String,
}

impl TypeParseError {
    pub fn new(input: impl Into<String>, expected: &ArgType, reason: impl fmt::Display) -> Self {
        Self {
            input: input.into(),
            expected: expected.friendly_name().to_string(),
            reason: reason.to_string(),
        }
    }
}
