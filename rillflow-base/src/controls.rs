//! Control actors: actors that own and drive nested sub-flows.

use async_trait::async_trait;
use rillflow_core::prelude::*;
use tracing::debug;

use crate::conditions::AlwaysTrue;

fn check_first_accepts_input(actors: &[Box<dyn Actor>]) -> Result<()> {
    if let Some(first) = actors.first()
        && !first.accepts_input()
    {
        return Err(FlowError::configuration(format!(
            "first sub-actor '{}' does not accept input",
            first.name()
        )));
    }
    Ok(())
}

/// Forwards the incoming token to the defined sub-flow before forwarding
/// it unchanged.
///
/// The sub-flow's own outputs are discarded: a tee is an observer fork,
/// not a transform. A sub-flow error propagates as this actor's execution
/// error and suppresses the pass-through output for that cycle.
#[derive(Debug)]
pub struct Tee {
    base: ActorBase,
    actors: Vec<Box<dyn Actor>>,
    director: SequentialDirector,
    input: Option<Token>,
    output: Option<Token>,
}

impl Tee {
    pub fn new(actors: Vec<Box<dyn Actor>>) -> Self {
        let mut base = ActorBase::new("tee");
        base.set_phase(Phase::OptionsDefined);
        Self {
            base,
            actors,
            director: SequentialDirector::new(),
            input: None,
            output: None,
        }
    }

    pub fn actors(&self) -> &[Box<dyn Actor>] {
        &self.actors
    }
}

#[async_trait]
impl Actor for Tee {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn description(&self) -> String {
        "Forwards the incoming data to the defined sub-flow before forwarding it.".to_string()
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
        self.output.is_some()
    }

    fn output(&mut self) -> Option<Token> {
        self.output.take()
    }

    fn set_storage(&mut self, handle: StorageHandle) {
        self.base.set_storage(handle.clone());
        for actor in &mut self.actors {
            actor.set_storage(handle.clone());
        }
    }

    fn set_variables(&mut self, variables: Variables) {
        for actor in &mut self.actors {
            actor.set_variables(variables.clone());
        }
        self.base.set_variables(variables);
    }

    fn reset(&mut self) {
        self.input = None;
        self.output = None;
        for actor in &mut self.actors {
            actor.reset();
        }
        self.base.set_phase(Phase::OptionsDefined);
    }

    async fn setup(&mut self) -> Result<()> {
        check_first_accepts_input(&self.actors)?;
        self.director.check(&self.actors)?;
        for actor in &mut self.actors {
            actor.setup().await?;
        }
        self.base.set_phase(Phase::SetUp);
        Ok(())
    }

    async fn pre_execute(&mut self) -> Result<()> {
        self.output = None;
        let Some(token) = self.input.clone() else {
            return Err(FlowError::execution("tee: no input staged"));
        };
        if let Some(first) = self.actors.first_mut() {
            first.input(token);
        }
        Ok(())
    }

    async fn do_execute(&mut self) -> Result<()> {
        if !self.actors.is_empty() {
            self.director.execute(&mut self.actors).await?;
        }
        self.output = self.input.clone();
        Ok(())
    }

    async fn post_execute(&mut self) -> Result<()> {
        self.input = None;
        Ok(())
    }

    async fn wrap_up(&mut self) {
        for actor in &mut self.actors {
            actor.wrap_up().await;
        }
        self.input = None;
        self.output = None;
        self.base.set_phase(Phase::WrappedUp);
    }
}

/// Forwards the incoming token to the defined sub-flow only when the
/// bound condition evaluates to true, then forwards the token unchanged
/// either way.
///
/// A false condition silences the side-flow for that token; it never
/// drops the token and is not an error.
#[derive(Debug)]
pub struct ConditionalTee {
    base: ActorBase,
    actors: Vec<Box<dyn Actor>>,
    condition: Box<dyn Condition>,
    director: SequentialDirector,
    input: Option<Token>,
    output: Option<Token>,
}

impl ConditionalTee {
    /// A conditional tee gated by [`AlwaysTrue`].
    pub fn new(actors: Vec<Box<dyn Actor>>) -> Self {
        Self::with_condition(actors, Box::new(AlwaysTrue))
    }

    /// A conditional tee gated by the given condition.
    pub fn with_condition(actors: Vec<Box<dyn Actor>>, condition: Box<dyn Condition>) -> Self {
        let mut base = ActorBase::new("conditionaltee");
        base.set_phase(Phase::OptionsDefined);
        Self {
            base,
            actors,
            condition,
            director: SequentialDirector::new(),
            input: None,
            output: None,
        }
    }

    pub fn actors(&self) -> &[Box<dyn Actor>] {
        &self.actors
    }

    pub fn condition(&self) -> &dyn Condition {
        self.condition.as_ref()
    }
}

#[async_trait]
impl Actor for ConditionalTee {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn description(&self) -> String {
        "Forwards the incoming data to the defined sub-flow before forwarding it, \
         only if the boolean condition evaluates to 'True'."
            .to_string()
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
        self.output.is_some()
    }

    fn output(&mut self) -> Option<Token> {
        self.output.take()
    }

    fn set_storage(&mut self, handle: StorageHandle) {
        self.base.set_storage(handle.clone());
        for actor in &mut self.actors {
            actor.set_storage(handle.clone());
        }
    }

    fn set_variables(&mut self, variables: Variables) {
        for actor in &mut self.actors {
            actor.set_variables(variables.clone());
        }
        self.base.set_variables(variables);
    }

    fn reset(&mut self) {
        self.input = None;
        self.output = None;
        for actor in &mut self.actors {
            actor.reset();
        }
        self.base.set_phase(Phase::OptionsDefined);
    }

    async fn setup(&mut self) -> Result<()> {
        check_first_accepts_input(&self.actors)?;
        self.director.check(&self.actors)?;
        self.condition
            .bind(self.base.storage().cloned(), self.base.variables());
        self.condition.setup().await?;
        for actor in &mut self.actors {
            actor.setup().await?;
        }
        self.base.set_phase(Phase::SetUp);
        Ok(())
    }

    async fn pre_execute(&mut self) -> Result<()> {
        self.output = None;
        let Some(token) = self.input.clone() else {
            return Err(FlowError::execution("conditionaltee: no input staged"));
        };
        if let Some(first) = self.actors.first_mut() {
            first.input(token);
        }
        Ok(())
    }

    async fn do_execute(&mut self) -> Result<()> {
        let Some(token) = self.input.clone() else {
            return Err(FlowError::execution("conditionaltee: no input staged"));
        };
        if !self.actors.is_empty() && self.condition.evaluate(&token).await? {
            self.director.execute(&mut self.actors).await?;
        }
        self.output = Some(token);
        Ok(())
    }

    async fn post_execute(&mut self) -> Result<()> {
        self.input = None;
        Ok(())
    }

    async fn wrap_up(&mut self) {
        for actor in &mut self.actors {
            actor.wrap_up().await;
        }
        self.input = None;
        self.output = None;
        self.base.set_phase(Phase::WrappedUp);
    }
}

/// The root control actor: owns the whole chain, the run's storage, and a
/// director requiring a source at the head and a sink at the tail.
#[derive(Debug)]
pub struct Flow {
    base: ActorBase,
    actors: Vec<Box<dyn Actor>>,
    director: SequentialDirector,
    storage: StorageHandle,
}

impl Flow {
    pub fn new(actors: Vec<Box<dyn Actor>>) -> Self {
        let mut base = ActorBase::new("flow");
        base.set_phase(Phase::OptionsDefined);
        Self {
            base,
            actors,
            director: SequentialDirector::new()
                .requires_source(true)
                .requires_sink(true),
            storage: new_handle(),
        }
    }

    /// The run's shared storage.
    pub fn storage(&self) -> StorageHandle {
        self.storage.clone()
    }

    pub fn actors(&self) -> &[Box<dyn Actor>] {
        &self.actors
    }

    /// Set up, execute and wrap up the flow. Wrap-up runs on every exit
    /// path, including configuration and execution errors.
    pub async fn run(&mut self) -> Result<()> {
        debug!(flow = %self.name(), "run start");
        let result = match self.setup().await {
            Ok(()) => self.execute_cycle().await,
            Err(err) => Err(err),
        };
        self.wrap_up().await;
        debug!(flow = %self.name(), success = result.is_ok(), "run finished");
        result
    }
}

#[async_trait]
impl Actor for Flow {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn description(&self) -> String {
        "Executes the defined actors sequentially as the root of a flow.".to_string()
    }

    fn set_variables(&mut self, variables: Variables) {
        for actor in &mut self.actors {
            actor.set_variables(variables.clone());
        }
        self.base.set_variables(variables);
    }

    fn reset(&mut self) {
        for actor in &mut self.actors {
            actor.reset();
        }
        self.base.set_phase(Phase::OptionsDefined);
    }

    async fn setup(&mut self) -> Result<()> {
        self.director.check(&self.actors)?;
        let variables = self.base.variables().clone();
        for actor in &mut self.actors {
            actor.set_storage(self.storage.clone());
            actor.set_variables(variables.clone());
            actor.setup().await?;
        }
        self.base.set_phase(Phase::SetUp);
        Ok(())
    }

    async fn do_execute(&mut self) -> Result<()> {
        self.director.execute(&mut self.actors).await
    }

    async fn wrap_up(&mut self) {
        for actor in &mut self.actors {
            actor.wrap_up().await;
        }
        self.base.set_phase(Phase::WrappedUp);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{conditions::AlwaysFalse, transformers::IncStorage};

    /// Sub-flow sink that records and transforms what it sees, to prove
    /// the tee discards sub-flow results.
    #[derive(Debug)]
    struct Mangler {
        base: ActorBase,
        input: Option<Token>,
        output: Option<Token>,
        seen: Arc<Mutex<Vec<Token>>>,
    }

    impl Mangler {
        fn new(seen: Arc<Mutex<Vec<Token>>>) -> Self {
            let mut base = ActorBase::new("mangler");
            base.set_phase(Phase::OptionsDefined);
            Self {
                base,
                input: None,
                output: None,
                seen,
            }
        }
    }

    #[async_trait]
    impl Actor for Mangler {
        fn base(&self) -> &ActorBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ActorBase {
            &mut self.base
        }

        fn description(&self) -> String {
            "Records its input and emits a mangled copy.".to_string()
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
            self.output.is_some()
        }

        fn output(&mut self) -> Option<Token> {
            self.output.take()
        }

        async fn do_execute(&mut self) -> Result<()> {
            let token = self
                .input
                .take()
                .ok_or_else(|| FlowError::execution("mangler: no input staged"))?;
            self.seen.lock().unwrap().push(token.clone());
            self.output = Some(json!({ "mangled": token }));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Failing {
        base: ActorBase,
    }

    impl Failing {
        fn new() -> Self {
            let mut base = ActorBase::new("failing");
            base.set_phase(Phase::OptionsDefined);
            Self { base }
        }
    }

    #[async_trait]
    impl Actor for Failing {
        fn base(&self) -> &ActorBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ActorBase {
            &mut self.base
        }

        fn description(&self) -> String {
            "Fails on every token.".to_string()
        }

        fn accepts_input(&self) -> bool {
            true
        }

        async fn do_execute(&mut self) -> Result<()> {
            Err(FlowError::execution("failing: intentional failure"))
        }
    }

    async fn cycle(tee: &mut impl Actor, token: Token) -> Result<Option<Token>> {
        tee.input(token);
        tee.execute_cycle().await?;
        Ok(tee.output())
    }

    #[tokio::test]
    async fn empty_sub_flow_passes_the_input_through() {
        let mut tee = Tee::new(Vec::new());
        tee.setup().await.unwrap();

        let token = json!({ "payload": [1, 2, 3] });
        let out = cycle(&mut tee, token.clone()).await.unwrap();
        assert_eq!(out, Some(token));
        assert_eq!(tee.output(), None);
    }

    #[tokio::test]
    async fn sub_flow_results_are_discarded() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut tee = Tee::new(vec![Box::new(Mangler::new(seen.clone()))]);
        tee.setup().await.unwrap();

        let out = cycle(&mut tee, json!("original")).await.unwrap();

        // The sub-flow saw the token, but the tee's own output is the
        // unmodified original.
        assert_eq!(*seen.lock().unwrap(), vec![json!("original")]);
        assert_eq!(out, Some(json!("original")));
    }

    #[tokio::test]
    async fn sub_flow_storage_mutations_are_visible() {
        let handle = new_handle();
        let mut tee = Tee::new(vec![Box::new(IncStorage::with_options("hits", "1").unwrap())]);
        tee.set_storage(handle.clone());
        tee.setup().await.unwrap();

        let out = cycle(&mut tee, json!(99)).await.unwrap();
        assert_eq!(out, Some(json!(99)));
        assert_eq!(handle.read().await.get("hits"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn non_consumer_first_sub_actor_fails_setup() {
        let mut tee = Tee::new(vec![Box::new(crate::sources::ForLoop::new().unwrap())]);
        let err = tee.setup().await.unwrap_err();
        assert!(matches!(err, FlowError::Configuration(_)));
    }

    #[tokio::test]
    async fn sub_flow_error_suppresses_the_output() {
        let mut tee = Tee::new(vec![Box::new(Failing::new())]);
        tee.setup().await.unwrap();

        tee.input(json!(1));
        let err = tee.execute_cycle().await.unwrap_err();
        assert!(matches!(err, FlowError::Execution(_)));
        assert_eq!(tee.output(), None);
    }

    #[tokio::test]
    async fn false_condition_skips_the_sub_flow() {
        let handle = new_handle();
        let mut tee = ConditionalTee::with_condition(
            vec![Box::new(IncStorage::with_options("hits", "1").unwrap())],
            Box::new(AlwaysFalse),
        );
        tee.set_storage(handle.clone());
        tee.setup().await.unwrap();

        let out = cycle(&mut tee, json!("gated")).await.unwrap();

        // No side effects, but the token still passes through.
        assert_eq!(out, Some(json!("gated")));
        assert!(!handle.read().await.has("hits"));
    }

    #[tokio::test]
    async fn true_condition_runs_the_sub_flow_once_per_token() {
        let handle = new_handle();
        let mut tee = ConditionalTee::new(vec![Box::new(
            IncStorage::with_options("hits", "1").unwrap(),
        )]);
        tee.set_storage(handle.clone());
        tee.setup().await.unwrap();

        cycle(&mut tee, json!(1)).await.unwrap();
        cycle(&mut tee, json!(2)).await.unwrap();
        assert_eq!(handle.read().await.get("hits"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn flow_requires_a_source_at_the_head() {
        let mut flow = Flow::new(vec![
            Box::new(crate::sinks::Null::new()),
            Box::new(crate::sinks::Null::new()),
        ]);
        let err = flow.run().await.unwrap_err();
        assert!(matches!(err, FlowError::Configuration(_)));
        // Wrap-up ran despite the failed setup.
        assert_eq!(flow.base().phase(), Phase::WrappedUp);
    }
}
