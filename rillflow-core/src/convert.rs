//! String conversion registry for typed option values.
//!
//! Readers turn strings into [`OptionValue`]s, writers turn them back.
//! Resolution scans entries in registration order and caches the outcome
//! per [`TypeTag`], so more specific converters must be registered before
//! more general ones. A cached resolution is final: converters registered
//! after a tag has been resolved are never picked up for that tag.

use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, RwLock},
};

use serde_json::Value;

use crate::error::{FlowError, Result};

/// Semantic type of an option slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Literal text.
    String,
    /// Boolean, serialized as `"True"`/`"False"`.
    Bool,
    /// Signed base-10 integer.
    Int,
    /// Decimal floating-point.
    Float,
    /// Extension point for converters registered by callers.
    Custom(&'static str),
}

/// A typed option value.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Payload for [`TypeTag::Custom`] slots.
    Other(Value),
}

impl OptionValue {
    /// Whether this value is a valid instance of the given tag.
    pub fn matches(&self, tag: &TypeTag) -> bool {
        matches!(
            (self, tag),
            (OptionValue::Str(_), TypeTag::String)
                | (OptionValue::Bool(_), TypeTag::Bool)
                | (OptionValue::Int(_), TypeTag::Int)
                | (OptionValue::Float(_), TypeTag::Float)
                | (OptionValue::Other(_), TypeTag::Custom(_))
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

/// Converts strings into option values for the tags it handles.
pub trait StringReader: Send + Sync {
    /// Whether this reader can produce values of the given tag.
    fn handles(&self, tag: &TypeTag) -> bool;

    /// Parse the text into a value.
    fn read(&self, text: &str) -> Result<OptionValue>;
}

/// Converts option values into strings for the tags it handles.
pub trait StringWriter: Send + Sync {
    /// Whether this writer can serialize values of the given tag.
    fn handles(&self, tag: &TypeTag) -> bool;

    /// Serialize the value.
    fn write(&self, value: &OptionValue) -> Result<String>;
}

#[derive(Debug)]
struct StrReader;

impl StringReader for StrReader {
    fn handles(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::String
    }

    fn read(&self, text: &str) -> Result<OptionValue> {
        Ok(OptionValue::Str(text.to_string()))
    }
}

#[derive(Debug)]
struct BoolReader;

impl StringReader for BoolReader {
    fn handles(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::Bool
    }

    fn read(&self, text: &str) -> Result<OptionValue> {
        match text {
            "True" | "true" => Ok(OptionValue::Bool(true)),
            "False" | "false" => Ok(OptionValue::Bool(false)),
            other => Err(FlowError::conversion(format!(
                "not a boolean: {other:?}"
            ))),
        }
    }
}

#[derive(Debug)]
struct IntReader;

impl StringReader for IntReader {
    fn handles(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::Int
    }

    fn read(&self, text: &str) -> Result<OptionValue> {
        text.parse::<i64>()
            .map(OptionValue::Int)
            .map_err(|e| FlowError::conversion(format!("not an integer: {text:?} ({e})")))
    }
}

#[derive(Debug)]
struct FloatReader;

impl StringReader for FloatReader {
    fn handles(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::Float
    }

    fn read(&self, text: &str) -> Result<OptionValue> {
        text.parse::<f64>()
            .map(OptionValue::Float)
            .map_err(|e| FlowError::conversion(format!("not a float: {text:?} ({e})")))
    }
}

#[derive(Debug)]
struct StrWriter;

impl StringWriter for StrWriter {
    fn handles(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::String
    }

    fn write(&self, value: &OptionValue) -> Result<String> {
        match value {
            OptionValue::Str(s) => Ok(s.clone()),
            other => Err(FlowError::conversion(format!("not a string: {other:?}"))),
        }
    }
}

#[derive(Debug)]
struct BoolWriter;

impl StringWriter for BoolWriter {
    fn handles(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::Bool
    }

    fn write(&self, value: &OptionValue) -> Result<String> {
        match value {
            OptionValue::Bool(true) => Ok("True".to_string()),
            OptionValue::Bool(false) => Ok("False".to_string()),
            other => Err(FlowError::conversion(format!("not a boolean: {other:?}"))),
        }
    }
}

#[derive(Debug)]
struct IntWriter;

impl StringWriter for IntWriter {
    fn handles(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::Int
    }

    fn write(&self, value: &OptionValue) -> Result<String> {
        match value {
            OptionValue::Int(i) => Ok(i.to_string()),
            other => Err(FlowError::conversion(format!("not an integer: {other:?}"))),
        }
    }
}

#[derive(Debug)]
struct FloatWriter;

impl StringWriter for FloatWriter {
    fn handles(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::Float
    }

    fn write(&self, value: &OptionValue) -> Result<String> {
        match value {
            // Display of f64 round-trips through parse
            OptionValue::Float(f) => Ok(f.to_string()),
            other => Err(FlowError::conversion(format!("not a float: {other:?}"))),
        }
    }
}

/// Outcome of a resolution scan. Absence from the cache means the tag has
/// not been looked up yet; `NotFound` is a sticky negative hit.
#[derive(Clone)]
enum Resolution<T> {
    Found(T),
    NotFound,
}

struct RegistryInner {
    readers: RwLock<Vec<Arc<dyn StringReader>>>,
    writers: RwLock<Vec<Arc<dyn StringWriter>>>,
    reader_cache: RwLock<HashMap<TypeTag, Resolution<Arc<dyn StringReader>>>>,
    writer_cache: RwLock<HashMap<TypeTag, Resolution<Arc<dyn StringWriter>>>>,
}

/// Registry of string readers and writers with per-tag resolution caching.
///
/// Cloning is cheap; clones share entries and caches. Extension entries
/// should be registered before the first resolution of the tags they
/// handle, since cached resolutions are never re-scanned.
#[derive(Clone)]
pub struct ConverterRegistry {
    inner: Arc<RegistryInner>,
}

impl Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry").finish_non_exhaustive()
    }
}

impl ConverterRegistry {
    /// Create an empty registry without any converters.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                readers: RwLock::new(Vec::new()),
                writers: RwLock::new(Vec::new()),
                reader_cache: RwLock::new(HashMap::new()),
                writer_cache: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a registry seeded with the built-in converters for
    /// string, boolean, integer and floating-point values.
    pub fn builtin() -> Self {
        let registry = Self::empty();
        registry.register_reader(Arc::new(StrReader));
        registry.register_reader(Arc::new(BoolReader));
        registry.register_reader(Arc::new(IntReader));
        registry.register_reader(Arc::new(FloatReader));
        registry.register_writer(Arc::new(StrWriter));
        registry.register_writer(Arc::new(BoolWriter));
        registry.register_writer(Arc::new(IntWriter));
        registry.register_writer(Arc::new(FloatWriter));
        registry
    }

    /// Append a reader. Order matters: the first reader whose `handles`
    /// accepts a tag wins.
    pub fn register_reader(&self, reader: Arc<dyn StringReader>) {
        self.inner
            .readers
            .write()
            .expect("converter registry lock poisoned")
            .push(reader);
    }

    /// Append a writer. Order matters as for readers.
    pub fn register_writer(&self, writer: Arc<dyn StringWriter>) {
        self.inner
            .writers
            .write()
            .expect("converter registry lock poisoned")
            .push(writer);
    }

    /// Resolve a reader for the tag, or `None` if no registered reader
    /// handles it. Both outcomes are cached.
    pub fn reader_for(&self, tag: &TypeTag) -> Option<Arc<dyn StringReader>> {
        {
            let cache = self
                .inner
                .reader_cache
                .read()
                .expect("converter registry lock poisoned");
            if let Some(resolution) = cache.get(tag) {
                return match resolution {
                    Resolution::Found(reader) => Some(Arc::clone(reader)),
                    Resolution::NotFound => None,
                };
            }
        }

        let resolved = self
            .inner
            .readers
            .read()
            .expect("converter registry lock poisoned")
            .iter()
            .find(|reader| reader.handles(tag))
            .cloned();

        let mut cache = self
            .inner
            .reader_cache
            .write()
            .expect("converter registry lock poisoned");
        match resolved {
            Some(reader) => {
                cache.insert(tag.clone(), Resolution::Found(Arc::clone(&reader)));
                Some(reader)
            }
            None => {
                cache.insert(tag.clone(), Resolution::NotFound);
                None
            }
        }
    }

    /// Resolve a writer for the tag, or `None` if no registered writer
    /// handles it. Both outcomes are cached.
    pub fn writer_for(&self, tag: &TypeTag) -> Option<Arc<dyn StringWriter>> {
        {
            let cache = self
                .inner
                .writer_cache
                .read()
                .expect("converter registry lock poisoned");
            if let Some(resolution) = cache.get(tag) {
                return match resolution {
                    Resolution::Found(writer) => Some(Arc::clone(writer)),
                    Resolution::NotFound => None,
                };
            }
        }

        let resolved = self
            .inner
            .writers
            .read()
            .expect("converter registry lock poisoned")
            .iter()
            .find(|writer| writer.handles(tag))
            .cloned();

        let mut cache = self
            .inner
            .writer_cache
            .write()
            .expect("converter registry lock poisoned");
        match resolved {
            Some(writer) => {
                cache.insert(tag.clone(), Resolution::Found(Arc::clone(&writer)));
                Some(writer)
            }
            None => {
                cache.insert(tag.clone(), Resolution::NotFound);
                None
            }
        }
    }

    /// Whether a reader is registered for the tag.
    pub fn has_reader(&self, tag: &TypeTag) -> bool {
        self.reader_for(tag).is_some()
    }

    /// Whether a writer is registered for the tag.
    pub fn has_writer(&self, tag: &TypeTag) -> bool {
        self.writer_for(tag).is_some()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(tag: TypeTag, value: OptionValue) -> OptionValue {
        let registry = ConverterRegistry::builtin();
        let writer = registry.writer_for(&tag).unwrap();
        let reader = registry.reader_for(&tag).unwrap();
        reader.read(&writer.write(&value).unwrap()).unwrap()
    }

    #[test]
    fn builtin_round_trips() {
        assert_eq!(
            round_trip(TypeTag::String, OptionValue::Str("hello world".into())),
            OptionValue::Str("hello world".into())
        );
        assert_eq!(
            round_trip(TypeTag::Bool, OptionValue::Bool(true)),
            OptionValue::Bool(true)
        );
        assert_eq!(
            round_trip(TypeTag::Bool, OptionValue::Bool(false)),
            OptionValue::Bool(false)
        );
        assert_eq!(
            round_trip(TypeTag::Int, OptionValue::Int(-42)),
            OptionValue::Int(-42)
        );
        assert_eq!(
            round_trip(TypeTag::Float, OptionValue::Float(3.25)),
            OptionValue::Float(3.25)
        );
    }

    #[test]
    fn bool_text_format() {
        let registry = ConverterRegistry::builtin();
        let writer = registry.writer_for(&TypeTag::Bool).unwrap();
        assert_eq!(writer.write(&OptionValue::Bool(true)).unwrap(), "True");
        assert_eq!(writer.write(&OptionValue::Bool(false)).unwrap(), "False");

        let reader = registry.reader_for(&TypeTag::Bool).unwrap();
        assert_eq!(reader.read("true").unwrap(), OptionValue::Bool(true));
        assert!(reader.read("yes").is_err());
    }

    #[test]
    fn resolution_is_stable() {
        let registry = ConverterRegistry::builtin();
        let first = registry.reader_for(&TypeTag::Int).unwrap();
        let second = registry.reader_for(&TypeTag::Int).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn negative_resolution_is_sticky() {
        let registry = ConverterRegistry::builtin();
        let tag = TypeTag::Custom("color");
        assert!(registry.reader_for(&tag).is_none());

        // Unrelated lookups must not disturb the cached negative.
        assert!(registry.reader_for(&TypeTag::Int).is_some());
        assert!(registry.reader_for(&tag).is_none());
    }

    #[derive(Debug)]
    struct ColorReader;

    impl StringReader for ColorReader {
        fn handles(&self, tag: &TypeTag) -> bool {
            *tag == TypeTag::Custom("color")
        }

        fn read(&self, text: &str) -> Result<OptionValue> {
            Ok(OptionValue::Other(serde_json::json!({ "color": text })))
        }
    }

    #[test]
    fn late_registration_does_not_affect_cached_tags() {
        let registry = ConverterRegistry::builtin();
        let tag = TypeTag::Custom("color");
        assert!(registry.reader_for(&tag).is_none());

        registry.register_reader(Arc::new(ColorReader));

        // The negative resolution was cached before registration.
        assert!(registry.reader_for(&tag).is_none());
    }

    #[test]
    fn custom_reader_resolves_when_registered_before_first_lookup() {
        let registry = ConverterRegistry::builtin();
        registry.register_reader(Arc::new(ColorReader));

        let tag = TypeTag::Custom("color");
        let reader = registry.reader_for(&tag).unwrap();
        let value = reader.read("red").unwrap();
        assert!(value.matches(&tag));
    }
}
