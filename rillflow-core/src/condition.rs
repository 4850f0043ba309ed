//! Boolean conditions used to gate conditional control actors.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{error::Result, storage::StorageHandle, token::Token, vars::Variables};

/// A swappable boolean predicate over the current token.
///
/// Conditions are bound to their owning actor's storage and variables at
/// setup time, so concrete implementations can consult shared state while
/// evaluating. Evaluation itself must not keep per-token state unless the
/// implementation deliberately chooses to.
#[async_trait]
pub trait Condition: Send + Sync + Debug {
    /// A description of what the condition checks.
    fn description(&self) -> String;

    /// Bind the owning actor's storage and variables. Default: no-op.
    fn bind(&mut self, storage: Option<StorageHandle>, variables: &Variables) {
        let _ = (storage, variables);
    }

    /// Validate configuration before the first evaluation. Default: Ok.
    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Evaluate the condition against the current token.
    async fn evaluate(&self, token: &Token) -> Result<bool>;
}
