//! Standard source actors.

use std::collections::VecDeque;

use async_trait::async_trait;
use rillflow_core::prelude::*;
use serde_json::json;

/// Emits the integers of an inclusive range, like a classic for-loop.
#[derive(Debug)]
pub struct ForLoop {
    base: ActorBase,
    outputs: VecDeque<Token>,
}

impl ForLoop {
    pub fn new() -> Result<Self> {
        let mut base = ActorBase::new("forloop");
        base.options_mut().add(OptionDef::new(
            "start",
            TypeTag::Int,
            1i64,
            "The first value of the loop",
        ))?;
        base.options_mut().add(OptionDef::new(
            "end",
            TypeTag::Int,
            10i64,
            "The last value of the loop (inclusive)",
        ))?;
        base.options_mut().add(OptionDef::new(
            "step",
            TypeTag::Int,
            1i64,
            "The increment between values",
        ))?;
        base.set_phase(Phase::OptionsDefined);
        Ok(Self {
            base,
            outputs: VecDeque::new(),
        })
    }

    /// Convenience constructor configuring the full range at once.
    pub fn with_range(start: i64, end: i64, step: i64) -> Result<Self> {
        let mut actor = Self::new()?;
        actor.base.options_mut().set("start", start)?;
        actor.base.options_mut().set("end", end)?;
        actor.base.options_mut().set("step", step)?;
        Ok(actor)
    }
}

#[async_trait]
impl Actor for ForLoop {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn description(&self) -> String {
        "Emits the integers of the configured range, like a for-loop.".to_string()
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
        self.outputs.clear();
        self.base.set_phase(Phase::OptionsDefined);
    }

    async fn setup(&mut self) -> Result<()> {
        if self.base.options().get_int("step")? == 0 {
            return Err(FlowError::configuration("forloop: step must not be zero"));
        }
        self.base.set_phase(Phase::SetUp);
        Ok(())
    }

    async fn do_execute(&mut self) -> Result<()> {
        let start = self.base.options().get_int("start")?;
        let end = self.base.options().get_int("end")?;
        let step = self.base.options().get_int("step")?;

        let mut current = start;
        while (step > 0 && current <= end) || (step < 0 && current >= end) {
            self.outputs.push_back(json!(current));
            current += step;
        }
        Ok(())
    }

    async fn wrap_up(&mut self) {
        self.outputs.clear();
        self.base.set_phase(Phase::WrappedUp);
    }
}
