//! The actor contract: configurable, lifecycle-managed processing units.

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::trace;

use crate::{
    error::{FlowError, Result},
    options::OptionSet,
    storage::StorageHandle,
    token::Token,
    vars::Variables,
};

/// Lifecycle phase of an actor.
///
/// One pass per execution run: `Initialized` → `OptionsDefined` → `SetUp`
/// → per-token `{PreExecute → Execute → PostExecute}` cycles →
/// `WrappedUp`. `reset` returns a configured actor to `OptionsDefined`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initialized,
    OptionsDefined,
    SetUp,
    PreExecute,
    Execute,
    PostExecute,
    WrappedUp,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Initialized
    }
}

/// Common state embedded by every actor: its option set, variable
/// context, shared storage handle and lifecycle phase.
#[derive(Debug, Default)]
pub struct ActorBase {
    name: String,
    options: OptionSet,
    variables: Variables,
    storage: Option<StorageHandle>,
    phase: Phase,
}

impl ActorBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionSet {
        &mut self.options
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn set_variables(&mut self, variables: Variables) {
        self.variables = variables;
    }

    pub fn storage(&self) -> Option<&StorageHandle> {
        self.storage.as_ref()
    }

    pub fn set_storage(&mut self, handle: StorageHandle) {
        self.storage = Some(handle);
    }

    /// The storage handle, or a configuration error naming the actor.
    pub fn require_storage(&self) -> Result<StorageHandle> {
        self.storage.clone().ok_or_else(|| {
            FlowError::configuration(format!("{}: no storage handle available", self.name))
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

/// A processing unit in a flow.
///
/// Concrete actors embed an [`ActorBase`], define their option slots at
/// construction and implement `do_execute`. The consumer and producer
/// contracts are opt-in capability methods; the director uses them to
/// wire chains together.
#[async_trait]
pub trait Actor: Send + Sync + Debug {
    /// The embedded common state.
    fn base(&self) -> &ActorBase;

    /// The embedded common state, mutable.
    fn base_mut(&mut self) -> &mut ActorBase;

    /// A description of what the actor does.
    fn description(&self) -> String;

    /// The actor's name.
    fn name(&self) -> String {
        self.base().name().to_string()
    }

    /// Whether this actor consumes input tokens.
    fn accepts_input(&self) -> bool {
        false
    }

    /// Stage the next input token. Only meaningful for consumers; at most
    /// one token is buffered between cycles.
    fn input(&mut self, token: Token) {
        let _ = token;
    }

    /// Whether this actor produces output tokens.
    fn produces_output(&self) -> bool {
        false
    }

    /// Whether output is currently available.
    fn has_output(&self) -> bool {
        false
    }

    /// Take the next output token. Returns `None` once drained.
    fn output(&mut self) -> Option<Token> {
        None
    }

    /// Inject the shared storage handle. Control actors override this to
    /// propagate the handle to their children.
    fn set_storage(&mut self, handle: StorageHandle) {
        self.base_mut().set_storage(handle);
    }

    /// Inject the variable context. Control actors override this to
    /// propagate it to their children.
    fn set_variables(&mut self, variables: Variables) {
        self.base_mut().set_variables(variables);
    }

    /// Clear transient state without destroying configuration. May be
    /// invoked before a re-setup. Overriders must clear their buffered
    /// tokens and end with the base transition.
    fn reset(&mut self) {
        self.base_mut().set_phase(Phase::OptionsDefined);
    }

    /// Validate configuration before the first token. Fails fast with a
    /// configuration error when invariants are unmet; never touches data.
    async fn setup(&mut self) -> Result<()> {
        self.base_mut().set_phase(Phase::SetUp);
        Ok(())
    }

    /// Validate readiness and stage input for this cycle.
    async fn pre_execute(&mut self) -> Result<()> {
        Ok(())
    }

    /// The actor's effect for one token.
    async fn do_execute(&mut self) -> Result<()>;

    /// Clear the consumed input after the effect ran.
    async fn post_execute(&mut self) -> Result<()> {
        Ok(())
    }

    /// Run one full per-token cycle.
    async fn execute_cycle(&mut self) -> Result<()> {
        match self.base().phase() {
            Phase::SetUp | Phase::PreExecute | Phase::Execute | Phase::PostExecute => {}
            phase => {
                return Err(FlowError::execution(format!(
                    "{}: cannot execute in phase {phase:?}",
                    self.name()
                )));
            }
        }

        trace!(actor = %self.name(), "pre-execute");
        self.base_mut().set_phase(Phase::PreExecute);
        self.pre_execute().await?;

        trace!(actor = %self.name(), "execute");
        self.base_mut().set_phase(Phase::Execute);
        self.do_execute().await?;

        trace!(actor = %self.name(), "post-execute");
        self.base_mut().set_phase(Phase::PostExecute);
        self.post_execute().await
    }

    /// Finish up after a run. Always invoked, including after errors, and
    /// safe to call more than once.
    async fn wrap_up(&mut self) {
        self.base_mut().set_phase(Phase::WrappedUp);
    }
}
