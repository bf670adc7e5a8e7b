//! Type-parser registry
//!
//! Maps an [`ArgType`] to the converter that turns argument text into a
//! [`Value`]. A registry is an ordinary owned value: each service is handed
//! its own (or a shared `Arc`) so differently configured services can coexist.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use cmdroute_types::{ArgType, TypeParseError, Value};

use crate::error::ConversionError;

/// Converts argument text into a value of one type
pub trait TypeParser: Send + Sync {
    fn parse(&self, input: &str) -> Result<Value, TypeParseError>;

    fn try_parse(&self, input: &str) -> Option<Value> {
        self.parse(input).ok()
    }
}

/// Parser for any built-in type implementing `FromStr`
pub struct FromStrParser<T> {
    ty: ArgType,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FromStrParser<T> {
    pub fn new(ty: ArgType) -> Self {
        Self {
            ty,
            _marker: PhantomData,
        }
    }
}

impl<T> TypeParser for FromStrParser<T>
where
    T: FromStr + Into<Value>,
    T::Err: fmt::Display,
{
    fn parse(&self, input: &str) -> Result<Value, TypeParseError> {
        input
            .parse::<T>()
            .map(Into::into)
            .map_err(|e| TypeParseError::new(input, &self.ty, e))
    }
}

/// `true` / `false`, case-insensitive
pub struct BoolParser;

impl TypeParser for BoolParser {
    fn parse(&self, input: &str) -> Result<Value, TypeParseError> {
        if input.eq_ignore_ascii_case("true") {
            Ok(Value::Bool(true))
        } else if input.eq_ignore_ascii_case("false") {
            Ok(Value::Bool(false))
        } else {
            Err(TypeParseError::new(input, &ArgType::Bool, "expected true or false"))
        }
    }
}

/// Exactly one character
pub struct CharParser;

impl TypeParser for CharParser {
    fn parse(&self, input: &str) -> Result<Value, TypeParseError> {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Value::Char(c)),
            _ => Err(TypeParseError::new(input, &ArgType::Char, "expected a single character")),
        }
    }
}

/// Identity conversion
pub struct StringParser;

impl TypeParser for StringParser {
    fn parse(&self, input: &str) -> Result<Value, TypeParseError> {
        Ok(Value::String(input.to_string()))
    }
}

/// Adapts a closure into a [`TypeParser`]
pub struct FnParser<F>(pub F);

impl<F> TypeParser for FnParser<F>
where
    F: Fn(&str) -> Result<Value, TypeParseError> + Send + Sync,
{
    fn parse(&self, input: &str) -> Result<Value, TypeParseError> {
        (self.0)(input)
    }
}

/// Registry of parsers keyed by argument type
#[derive(Default)]
pub struct TypeParsers {
    parsers: HashMap<ArgType, Box<dyn TypeParser>>,
}

impl TypeParsers {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a parser for every built-in type
    pub fn with_defaults() -> Self {
        let mut parsers = Self::new();
        parsers
            .insert(ArgType::Bool, BoolParser)
            .insert(ArgType::Char, CharParser)
            .insert(ArgType::I8, FromStrParser::<i8>::new(ArgType::I8))
            .insert(ArgType::I16, FromStrParser::<i16>::new(ArgType::I16))
            .insert(ArgType::I32, FromStrParser::<i32>::new(ArgType::I32))
            .insert(ArgType::I64, FromStrParser::<i64>::new(ArgType::I64))
            .insert(ArgType::U8, FromStrParser::<u8>::new(ArgType::U8))
            .insert(ArgType::U16, FromStrParser::<u16>::new(ArgType::U16))
            .insert(ArgType::U32, FromStrParser::<u32>::new(ArgType::U32))
            .insert(ArgType::U64, FromStrParser::<u64>::new(ArgType::U64))
            .insert(ArgType::F32, FromStrParser::<f32>::new(ArgType::F32))
            .insert(ArgType::F64, FromStrParser::<f64>::new(ArgType::F64))
            .insert(ArgType::String, StringParser);
        parsers
    }

    /// Register (or replace) the parser for `ty`
    pub fn insert(&mut self, ty: ArgType, parser: impl TypeParser + 'static) -> &mut Self {
        self.parsers.insert(ty, Box::new(parser));
        self
    }

    /// Register a closure as the parser for `ty`
    pub fn insert_fn<F>(&mut self, ty: ArgType, parser: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Value, TypeParseError> + Send + Sync + 'static,
    {
        self.insert(ty, FnParser(parser))
    }

    pub fn remove(&mut self, ty: &ArgType) -> bool {
        self.parsers.remove(ty).is_some()
    }

    pub fn get(&self, ty: &ArgType) -> Option<&dyn TypeParser> {
        self.parsers.get(ty).map(|p| p.as_ref())
    }

    pub fn contains(&self, ty: &ArgType) -> bool {
        self.parsers.contains_key(ty)
    }

    /// Parse `input` as `ty`
    pub fn parse(&self, ty: &ArgType, input: &str) -> Result<Value, ConversionError> {
        let parser = self
            .get(ty)
            .ok_or_else(|| ConversionError::MissingTypeParser(ty.clone()))?;
        Ok(parser.parse(input)?)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl fmt::Debug for TypeParsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<String> = self.parsers.keys().map(ToString::to_string).collect();
        types.sort();
        f.debug_struct("TypeParsers").field("types", &types).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_builtins() {
        let parsers = TypeParsers::with_defaults();
        for ty in ArgType::BUILTIN.iter() {
            assert!(parsers.contains(ty), "missing default parser for {}", ty);
        }
        assert_eq!(parsers.len(), ArgType::BUILTIN.len());
    }

    #[test]
    fn test_numeric_parsing() {
        let parsers = TypeParsers::with_defaults();
        assert_eq!(parsers.parse(&ArgType::I32, "2048"), Ok(Value::I32(2048)));
        assert_eq!(parsers.parse(&ArgType::I8, "-7"), Ok(Value::I8(-7)));
        assert_eq!(parsers.parse(&ArgType::F64, "2.5"), Ok(Value::F64(2.5)));
        assert!(matches!(
            parsers.parse(&ArgType::U8, "256"),
            Err(ConversionError::Invalid(_))
        ));
        assert!(matches!(
            parsers.parse(&ArgType::I32, "str"),
            Err(ConversionError::Invalid(_))
        ));
    }

    #[test]
    fn test_bool_and_char() {
        let parsers = TypeParsers::with_defaults();
        assert_eq!(parsers.parse(&ArgType::Bool, "TRUE"), Ok(Value::Bool(true)));
        assert_eq!(parsers.parse(&ArgType::Bool, "false"), Ok(Value::Bool(false)));
        assert!(parsers.parse(&ArgType::Bool, "yes").is_err());
        assert_eq!(parsers.parse(&ArgType::Char, "é"), Ok(Value::Char('é')));
        assert!(parsers.parse(&ArgType::Char, "ab").is_err());
        assert!(parsers.parse(&ArgType::Char, "").is_err());
    }

    #[test]
    fn test_try_parse() {
        let parsers = TypeParsers::with_defaults();
        let int = parsers.get(&ArgType::I64).unwrap();
        assert_eq!(int.try_parse("12"), Some(Value::I64(12)));
        assert_eq!(int.try_parse("twelve"), None);
    }

    #[test]
    fn test_missing_parser() {
        let parsers = TypeParsers::new();
        assert_eq!(
            parsers.parse(&ArgType::I32, "1"),
            Err(ConversionError::MissingTypeParser(ArgType::I32))
        );
    }

    #[test]
    fn test_custom_parser() {
        let mut parsers = TypeParsers::new();
        let port = ArgType::custom("port");
        parsers.insert_fn(port.clone(), |input: &str| {
            input
                .strip_prefix(':')
                .and_then(|p| p.parse::<u16>().ok())
                .map(Value::U16)
                .ok_or_else(|| TypeParseError::new(input, &ArgType::custom("port"), "expected :<number>"))
        });
        assert_eq!(parsers.parse(&port, ":8080"), Ok(Value::U16(8080)));
        assert!(parsers.parse(&port, "8080").is_err());
        assert!(parsers.remove(&port));
        assert!(!parsers.contains(&port));
    }

    #[test]
    fn test_error_message_uses_friendly_name() {
        let parsers = TypeParsers::with_defaults();
        let err = parsers.parse(&ArgType::I32, "abc").unwrap_err();
        assert!(err.to_string().starts_with("cannot parse 'abc' as integer"));
    }
}
