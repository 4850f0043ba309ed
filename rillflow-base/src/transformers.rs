//! Standard transformer actors.

use std::collections::VecDeque;

use async_trait::async_trait;
use rillflow_core::prelude::*;
use serde_json::json;
use tracing::debug;

/// Forwards the incoming token unchanged.
#[derive(Debug)]
pub struct PassThrough {
    base: ActorBase,
    input: Option<Token>,
    outputs: VecDeque<Token>,
}

impl PassThrough {
    pub fn new() -> Self {
        let mut base = ActorBase::new("passthrough");
        base.set_phase(Phase::OptionsDefined);
        Self {
            base,
            input: None,
            outputs: VecDeque::new(),
        }
    }
}

impl Default for PassThrough {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Actor for PassThrough {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn description(&self) -> String {
        "Forwards the incoming data unchanged.".to_string()
    }

    fn accepts_input(&self) -> bool {
        true
    }

    fn input(&mut self, token: Token) {
        self.input = Some(token);
    }

    fn produces_output(&self) -> bool {
        true
    }

    fn has_output(&self) -> bool {
        !self.outputs.is_empty()
    }

    fn output(&mut self) -> Option<Token> {
        self.outputs.pop_front()
    }

    fn reset(&mut self) {
        self.input = None;
        self.outputs.clear();
        self.base.set_phase(Phase::OptionsDefined);
    }

    async fn pre_execute(&mut self) -> Result<()> {
        if self.input.is_none() {
            return Err(FlowError::execution("passthrough: no input staged"));
        }
        Ok(())
    }

    async fn do_execute(&mut self) -> Result<()> {
        if let Some(token) = self.input.clone() {
            self.outputs.push_back(token);
        }
        Ok(())
    }

    async fn post_execute(&mut self) -> Result<()> {
        self.input = None;
        Ok(())
    }

    async fn wrap_up(&mut self) {
        self.input = None;
        self.outputs.clear();
        self.base.set_phase(Phase::WrappedUp);
    }
}

/// Stores the incoming token under a storage name and forwards it.
#[derive(Debug)]
pub struct SetStorage {
    base: ActorBase,
    input: Option<Token>,
    outputs: VecDeque<Token>,
}

impl SetStorage {
    pub fn new() -> Result<Self> {
        let mut base = ActorBase::new("setstorage");
        base.options_mut().add(OptionDef::new(
            "storage_name",
            TypeTag::String,
            "var",
            "The name to store the incoming data under",
        ))?;
        base.set_phase(Phase::OptionsDefined);
        Ok(Self {
            base,
            input: None,
            outputs: VecDeque::new(),
        })
    }

    /// Convenience constructor configuring the storage name.
    pub fn with_name(name: &str) -> Result<Self> {
        let mut actor = Self::new()?;
        actor.base.options_mut().set("storage_name", name)?;
        Ok(actor)
    }
}

#[async_trait]
impl Actor for SetStorage {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn description(&self) -> String {
        "Stores the incoming data under the configured storage name.".to_string()
    }

    fn accepts_input(&self) -> bool {
        true
    }

    fn input(&mut self, token: Token) {
        self.input = Some(token);
    }

    fn produces_output(&self) -> bool {
        true
    }

    fn has_output(&self) -> bool {
        !self.outputs.is_empty()
    }

    fn output(&mut self) -> Option<Token> {
        self.outputs.pop_front()
    }

    fn reset(&mut self) {
        self.input = None;
        self.outputs.clear();
        self.base.set_phase(Phase::OptionsDefined);
    }

    async fn setup(&mut self) -> Result<()> {
        self.base.require_storage()?;
        let name = self.base.options().get_str("storage_name")?;
        if name.is_empty() {
            return Err(FlowError::configuration("setstorage: no storage name provided"));
        }
        if !is_valid_name(name) {
            return Err(FlowError::configuration(format!(
                "setstorage: not a valid storage name: {name:?}"
            )));
        }
        self.base.set_phase(Phase::SetUp);
        Ok(())
    }

    async fn pre_execute(&mut self) -> Result<()> {
        if self.input.is_none() {
            return Err(FlowError::execution("setstorage: no input staged"));
        }
        Ok(())
    }

    async fn do_execute(&mut self) -> Result<()> {
        let token = match self.input.clone() {
            Some(token) => token,
            None => return Ok(()),
        };
        let name = self.base.options().get_str("storage_name")?.to_string();
        let handle = self.base.require_storage()?;
        handle.write().await.set(&name, token.clone())?;
        self.outputs.push_back(token);
        Ok(())
    }

    async fn post_execute(&mut self) -> Result<()> {
        self.input = None;
        Ok(())
    }

    async fn wrap_up(&mut self) {
        self.input = None;
        self.outputs.clear();
        self.base.set_phase(Phase::WrappedUp);
    }
}

/// Increments the value of a storage item by the configured amount and
/// forwards the incoming token unchanged.
///
/// A missing item is seeded with an integer or floating-point zero,
/// depending on how the increment text parses.
#[derive(Debug)]
pub struct IncStorage {
    base: ActorBase,
    input: Option<Token>,
    outputs: VecDeque<Token>,
}

impl IncStorage {
    pub fn new() -> Result<Self> {
        let mut base = ActorBase::new("incstorage");
        base.options_mut().add(OptionDef::new(
            "storage_name",
            TypeTag::String,
            "var",
            "The name of the storage item to increment",
        ))?;
        base.options_mut().add(OptionDef::new(
            "inc_value",
            TypeTag::String,
            "1",
            "The value to increment the storage item by",
        ))?;
        base.set_phase(Phase::OptionsDefined);
        Ok(Self {
            base,
            input: None,
            outputs: VecDeque::new(),
        })
    }

    /// Convenience constructor configuring name and increment at once.
    pub fn with_options(name: &str, inc_value: &str) -> Result<Self> {
        let mut actor = Self::new()?;
        actor.base.options_mut().set("storage_name", name)?;
        actor.base.options_mut().set("inc_value", inc_value)?;
        Ok(actor)
    }
}

#[async_trait]
impl Actor for IncStorage {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn description(&self) -> String {
        "Increments the value of a storage item by the specified value.".to_string()
    }

    fn accepts_input(&self) -> bool {
        true
    }

    fn input(&mut self, token: Token) {
        self.input = Some(token);
    }

    fn produces_output(&self) -> bool {
        true
    }

    fn has_output(&self) -> bool {
        !self.outputs.is_empty()
    }

    fn output(&mut self) -> Option<Token> {
        self.outputs.pop_front()
    }

    fn reset(&mut self) {
        self.input = None;
        self.outputs.clear();
        self.base.set_phase(Phase::OptionsDefined);
    }

    async fn setup(&mut self) -> Result<()> {
        self.base.require_storage()?;
        let name = self.base.options().get_str("storage_name")?;
        let inc_value = self.base.options().get_str("inc_value")?;
        if name.is_empty() {
            return Err(FlowError::configuration("incstorage: no storage name provided"));
        }
        if !is_valid_name(name) {
            return Err(FlowError::configuration(format!(
                "incstorage: not a valid storage name: {name:?}"
            )));
        }
        if inc_value.is_empty() {
            return Err(FlowError::configuration(
                "incstorage: no increment value provided",
            ));
        }
        self.base.set_phase(Phase::SetUp);
        Ok(())
    }

    async fn pre_execute(&mut self) -> Result<()> {
        if self.input.is_none() {
            return Err(FlowError::execution("incstorage: no input staged"));
        }
        Ok(())
    }

    async fn do_execute(&mut self) -> Result<()> {
        let name = self.base.options().get_str("storage_name")?.to_string();
        let inc_text = self.base.options().get_str("inc_value")?.to_string();
        let handle = self.base.require_storage()?;

        let mut storage = handle.write().await;
        let current = match storage.get(&name) {
            Some(value) => value.clone(),
            // seed kind follows how the increment parses
            None if inc_text.parse::<i64>().is_ok() => json!(0),
            None => json!(0.0),
        };

        let updated = if let Some(i) = current.as_i64() {
            let inc = inc_text.parse::<i64>().map_err(|e| {
                FlowError::execution(format!("incstorage: not an integer increment: {inc_text:?} ({e})"))
            })?;
            json!(i + inc)
        } else if let Some(f) = current.as_f64() {
            let inc = inc_text.parse::<f64>().map_err(|e| {
                FlowError::execution(format!("incstorage: not a numeric increment: {inc_text:?} ({e})"))
            })?;
            json!(f + inc)
        } else {
            return Err(FlowError::execution(format!(
                "incstorage: storage item '{name}' is not numeric: {current}"
            )));
        };

        debug!(name = %name, old = %current, new = %updated, "incremented storage");
        storage.set(&name, updated)?;
        drop(storage);

        if let Some(token) = self.input.clone() {
            self.outputs.push_back(token);
        }
        Ok(())
    }

    async fn post_execute(&mut self) -> Result<()> {
        self.input = None;
        Ok(())
    }

    async fn wrap_up(&mut self) {
        self.input = None;
        self.outputs.clear();
        self.base.set_phase(Phase::WrappedUp);
    }
}
