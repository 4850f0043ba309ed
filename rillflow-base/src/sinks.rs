//! Standard sink actors.

use async_trait::async_trait;
use rillflow_core::prelude::*;

/// Consumes and discards every incoming token.
#[derive(Debug)]
pub struct Null {
    base: ActorBase,
    input: Option<Token>,
}

impl Null {
    pub fn new() -> Self {
        let mut base = ActorBase::new("null");
        base.set_phase(Phase::OptionsDefined);
        Self { base, input: None }
    }
}

impl Default for Null {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Actor for Null {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn description(&self) -> String {
        "Consumes and discards the incoming data.".to_string()
    }

    fn accepts_input(&self) -> bool {
        true
    }

    fn input(&mut self, token: Token) {
        self.input = Some(token);
    }

    fn reset(&mut self) {
        self.input = None;
        self.base.set_phase(Phase::OptionsDefined);
    }

    async fn do_execute(&mut self) -> Result<()> {
        Ok(())
    }

    async fn post_execute(&mut self) -> Result<()> {
        self.input = None;
        Ok(())
    }

    async fn wrap_up(&mut self) {
        self.input = None;
        self.base.set_phase(Phase::WrappedUp);
    }
}

/// Prints the incoming token to stdout, optionally prefixed.
///
/// The prefix option is variable-expanded before printing.
#[derive(Debug)]
pub struct ConsoleOutput {
    base: ActorBase,
    input: Option<Token>,
}

impl ConsoleOutput {
    pub fn new() -> Result<Self> {
        let mut base = ActorBase::new("consoleoutput");
        base.options_mut().add(OptionDef::new(
            "prefix",
            TypeTag::String,
            "",
            "The text to print before the data",
        ))?;
        base.set_phase(Phase::OptionsDefined);
        Ok(Self { base, input: None })
    }
}

#[async_trait]
impl Actor for ConsoleOutput {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn description(&self) -> String {
        "Prints the incoming data to stdout.".to_string()
    }

    fn accepts_input(&self) -> bool {
        true
    }

    fn input(&mut self, token: Token) {
        self.input = Some(token);
    }

    fn reset(&mut self) {
        self.input = None;
        self.base.set_phase(Phase::OptionsDefined);
    }

    async fn pre_execute(&mut self) -> Result<()> {
        if self.input.is_none() {
            return Err(FlowError::execution("consoleoutput: no input staged"));
        }
        Ok(())
    }

    async fn do_execute(&mut self) -> Result<()> {
        let prefix = self
            .base
            .variables()
            .expand(self.base.options().get_str("prefix")?);
        match &self.input {
            Some(Value::String(text)) => println!("{prefix}{text}"),
            Some(other) => println!("{prefix}{other}"),
            None => {}
        }
        Ok(())
    }

    async fn post_execute(&mut self) -> Result<()> {
        self.input = None;
        Ok(())
    }

    async fn wrap_up(&mut self) {
        self.input = None;
        self.base.set_phase(Phase::WrappedUp);
    }
}
