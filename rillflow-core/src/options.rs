//! Typed, string-convertible configuration options for actors.

use std::collections::HashMap;

use crate::{
    convert::{ConverterRegistry, OptionValue, TypeTag},
    error::{FlowError, Result},
};

/// Definition of a single option slot.
#[derive(Clone, Debug)]
pub struct OptionDef {
    name: String,
    tag: TypeTag,
    default: OptionValue,
    help: String,
}

impl OptionDef {
    /// Create an option definition. The default must be a valid instance
    /// of the declared tag; this is verified when the definition is added
    /// to an [`OptionSet`].
    pub fn new(
        name: impl Into<String>,
        tag: TypeTag,
        default: impl Into<OptionValue>,
        help: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tag,
            default: default.into(),
            help: help.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub fn default(&self) -> &OptionValue {
        &self.default
    }

    pub fn help(&self) -> &str {
        &self.help
    }
}

/// The named option slots of one actor, with their current values.
///
/// Setting a slot from text goes through the registry's reader for the
/// declared tag; writing a slot back to text goes through its writer.
#[derive(Clone, Debug, Default)]
pub struct OptionSet {
    registry: ConverterRegistry,
    defs: Vec<OptionDef>,
    values: HashMap<String, OptionValue>,
}

impl OptionSet {
    /// Create an option set backed by the built-in converter registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an option set backed by a shared registry, so that custom
    /// converters are visible to every actor using it.
    pub fn with_registry(registry: ConverterRegistry) -> Self {
        Self {
            registry,
            defs: Vec::new(),
            values: HashMap::new(),
        }
    }

    /// Register a typed slot. Duplicate names and defaults that do not
    /// match the declared tag are configuration errors.
    pub fn add(&mut self, def: OptionDef) -> Result<()> {
        if self.defs.iter().any(|d| d.name == def.name) {
            return Err(FlowError::configuration(format!(
                "duplicate option name: {}",
                def.name
            )));
        }
        if !def.default.matches(&def.tag) {
            return Err(FlowError::configuration(format!(
                "default for option '{}' does not match its declared type {:?}",
                def.name, def.tag
            )));
        }
        self.defs.push(def);
        Ok(())
    }

    fn def(&self, name: &str) -> Result<&OptionDef> {
        self.defs
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| FlowError::configuration(format!("unknown option: {name}")))
    }

    /// Whether a slot with this name is defined.
    pub fn has(&self, name: &str) -> bool {
        self.defs.iter().any(|d| d.name == name)
    }

    /// Current value of the slot, falling back to the default when the
    /// slot was never set.
    pub fn get(&self, name: &str) -> Result<&OptionValue> {
        let def = self.def(name)?;
        Ok(self.values.get(name).unwrap_or(def.default()))
    }

    /// Current value as a string slot.
    pub fn get_str(&self, name: &str) -> Result<&str> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| FlowError::configuration(format!("option '{name}' is not a string")))
    }

    /// Current value as a boolean slot.
    pub fn get_bool(&self, name: &str) -> Result<bool> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| FlowError::configuration(format!("option '{name}' is not a boolean")))
    }

    /// Current value as an integer slot.
    pub fn get_int(&self, name: &str) -> Result<i64> {
        self.get(name)?
            .as_int()
            .ok_or_else(|| FlowError::configuration(format!("option '{name}' is not an integer")))
    }

    /// Current value as a float slot.
    pub fn get_float(&self, name: &str) -> Result<f64> {
        self.get(name)?
            .as_float()
            .ok_or_else(|| FlowError::configuration(format!("option '{name}' is not a float")))
    }

    /// Set a slot. A native value of the declared tag is stored directly;
    /// a string against a non-string tag is parsed through the registered
    /// reader. On a conversion failure the slot keeps its previous value.
    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        let def = self.def(name)?;
        let tag = def.tag().clone();

        if value.matches(&tag) {
            self.values.insert(name.to_string(), value);
            return Ok(());
        }

        match value {
            OptionValue::Str(text) => self.set_text(name, &text),
            other => Err(FlowError::conversion(format!(
                "option '{name}' expects {tag:?}, got {other:?}"
            ))),
        }
    }

    /// Set a slot from its text representation, always going through the
    /// reader registered for the declared tag.
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<()> {
        let def = self.def(name)?;
        let tag = def.tag().clone();

        let reader = self.registry.reader_for(&tag).ok_or_else(|| {
            FlowError::conversion(format!("no string reader registered for {tag:?}"))
        })?;
        let parsed = reader.read(text)?;
        if !parsed.matches(&tag) {
            return Err(FlowError::conversion(format!(
                "reader for {tag:?} produced a mismatched value: {parsed:?}"
            )));
        }
        self.values.insert(name.to_string(), parsed);
        Ok(())
    }

    /// Serialize the slot's current value to text through the registered
    /// writer.
    pub fn write(&self, name: &str) -> Result<String> {
        let def = self.def(name)?;
        let writer = self.registry.writer_for(def.tag()).ok_or_else(|| {
            FlowError::conversion(format!("no string writer registered for {:?}", def.tag()))
        })?;
        writer.write(self.get(name)?)
    }

    /// Reset every slot to its default.
    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// The registered definitions, in registration order.
    pub fn defs(&self) -> &[OptionDef] {
        &self.defs
    }

    /// The registry backing this option set.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }
}
