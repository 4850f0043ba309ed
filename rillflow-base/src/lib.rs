//! # rillflow-base
//!
//! Standard actor library for the rillflow pipeline engine: sources,
//! transformers, sinks, boolean conditions and the control actors that
//! embed nested sub-flows.
//!
//! ## Quick Start
//!
//! ```rust
//! use rillflow_base::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let mut flow = Flow::new(vec![
//!     Box::new(ForLoop::with_range(1, 3, 1)?),
//!     Box::new(Tee::new(vec![Box::new(IncStorage::with_options("count", "1")?)])),
//!     Box::new(Null::new()),
//! ]);
//! flow.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod conditions;
pub mod controls;
pub mod sinks;
pub mod sources;
pub mod transformers;

/// Convenient re-exports for common use.
pub mod prelude {
    pub use rillflow_core::prelude::*;

    pub use crate::{
        conditions::{AlwaysFalse, AlwaysTrue},
        controls::{ConditionalTee, Flow, Tee},
        sinks::{ConsoleOutput, Null},
        sources::ForLoop,
        transformers::{IncStorage, PassThrough, SetStorage},
    };
}
