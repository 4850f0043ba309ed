//! # rillflow-core
//!
//! Core contracts of the rillflow pipeline engine: processing units
//! ("actors") are composed into trees and executed by a director that
//! pushes data tokens from producers to consumers, including nested
//! sub-flows gated by boolean conditions.
//!
//! ## Core Concepts
//!
//! - **Actor**: a configurable, lifecycle-managed processing unit; may
//!   consume input, produce output, or both
//! - **Director**: sequences a chain of actors, wiring outputs to inputs
//!   and propagating the first error
//! - **Option**: a named, typed, string-convertible configuration value
//!   owned by an actor
//! - **Storage**: shared named value store accessible across actors
//!   within one run
//! - **Condition**: a boolean predicate over the current token, used to
//!   gate conditional execution
//!
//! ## Quick Start
//!
//! ```rust
//! use rillflow_core::prelude::*;
//!
//! let mut options = OptionSet::new();
//! options
//!     .add(OptionDef::new("threshold", TypeTag::Int, 5i64, "Cutoff value"))
//!     .unwrap();
//! options.set("threshold", "42").unwrap();
//! assert_eq!(options.get_int("threshold").unwrap(), 42);
//! ```

pub mod actor;
pub mod condition;
pub mod convert;
pub mod director;
pub mod error;
pub mod options;
pub mod storage;
pub mod token;
pub mod vars;

/// Convenient re-exports for common use.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};

    pub use crate::{
        actor::{Actor, ActorBase, Phase},
        condition::Condition,
        convert::{ConverterRegistry, OptionValue, StringReader, StringWriter, TypeTag},
        director::SequentialDirector,
        error::{FlowError, Result},
        options::{OptionDef, OptionSet},
        storage::{Storage, StorageHandle, is_valid_name, new_handle},
        token::Token,
        vars::Variables,
    };
}
