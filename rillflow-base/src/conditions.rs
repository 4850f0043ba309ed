//! Standard boolean conditions.

use async_trait::async_trait;
use rillflow_core::prelude::*;

/// Always evaluates to true. The default condition of a
/// [`ConditionalTee`](crate::controls::ConditionalTee).
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysTrue;

#[async_trait]
impl Condition for AlwaysTrue {
    fn description(&self) -> String {
        "Always evaluates to 'True'.".to_string()
    }

    async fn evaluate(&self, _token: &Token) -> Result<bool> {
        Ok(true)
    }
}

/// Always evaluates to false.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysFalse;

#[async_trait]
impl Condition for AlwaysFalse {
    fn description(&self) -> String {
        "Always evaluates to 'False'.".to_string()
    }

    async fn evaluate(&self, _token: &Token) -> Result<bool> {
        Ok(false)
    }
}
