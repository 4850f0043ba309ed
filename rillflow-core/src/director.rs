//! Sequential orchestration of an actor chain.

use futures::future::BoxFuture;
use tracing::debug;

use crate::{
    actor::Actor,
    error::{FlowError, Result},
    token::Token,
};

/// Drives an ordered, straight-line chain of actors, wiring each
/// producer's output to the next consumer's input.
///
/// Tokens are pushed depth-first: every output a producer emits is fed
/// through the entire remaining chain before its next output is taken, so
/// downstream actors observe tokens strictly in emission order. The first
/// error aborts the chain; no producer is polled after an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialDirector {
    requires_source: bool,
    requires_sink: bool,
}

impl SequentialDirector {
    /// A director without source/sink requirements, as used for embedded
    /// sub-flows whose first actor is fed by the owning control actor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the chain's first actor to originate data on its own.
    pub fn requires_source(mut self, required: bool) -> Self {
        self.requires_source = required;
        self
    }

    /// Require the chain's last actor to terminate the chain.
    pub fn requires_sink(mut self, required: bool) -> Self {
        self.requires_sink = required;
        self
    }

    /// Validate the chain's wiring. Called once at setup, never per token.
    pub fn check(&self, actors: &[Box<dyn Actor>]) -> Result<()> {
        if actors.is_empty() {
            if self.requires_source {
                return Err(FlowError::configuration("chain contains no actors"));
            }
            return Ok(());
        }

        if self.requires_source {
            let first = &actors[0];
            if first.accepts_input() || !first.produces_output() {
                return Err(FlowError::configuration(format!(
                    "first actor '{}' cannot originate data",
                    first.name()
                )));
            }
        }

        if self.requires_sink
            && let Some(last) = actors.last()
            && last.produces_output()
        {
            return Err(FlowError::configuration(format!(
                "last actor '{}' requires a consumer downstream",
                last.name()
            )));
        }

        for pair in actors.windows(2) {
            let (upstream, downstream) = (&pair[0], &pair[1]);
            if !upstream.produces_output() {
                return Err(FlowError::configuration(format!(
                    "actor '{}' does not produce output for '{}'",
                    upstream.name(),
                    downstream.name()
                )));
            }
            if !downstream.accepts_input() {
                return Err(FlowError::configuration(format!(
                    "actor '{}' does not accept input from '{}'",
                    downstream.name(),
                    upstream.name()
                )));
            }
        }

        Ok(())
    }

    /// Execute the chain. The first actor's input, if it is a consumer,
    /// must have been staged by the caller before this is invoked.
    pub async fn execute(&self, actors: &mut [Box<dyn Actor>]) -> Result<()> {
        let Some((first, rest)) = actors.split_first_mut() else {
            return Ok(());
        };

        debug!(actor = %first.name(), "chain start");
        first.execute_cycle().await?;
        while let Some(token) = first.output() {
            self.feed(rest, token).await?;
        }
        Ok(())
    }

    /// Feed one token into the head of the remaining chain and push every
    /// resulting output further down before returning.
    fn feed<'a>(
        &'a self,
        actors: &'a mut [Box<dyn Actor>],
        token: Token,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let Some((next, rest)) = actors.split_first_mut() else {
                return Ok(());
            };

            if !next.accepts_input() {
                return Err(FlowError::execution(format!(
                    "actor '{}' does not accept input",
                    next.name()
                )));
            }
            next.input(token);
            next.execute_cycle().await?;
            while let Some(output) = next.output() {
                self.feed(rest, output).await?;
            }
            Ok(())
        })
    }
}
