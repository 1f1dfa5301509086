//! Draft publishing engine.
//!
//! Layers, bottom up: `waiter` (polling), `resolver` (strategy lists to
//! elements), `actions` (settling clicks), `item` (one draft), `pagination`,
//! `batch` (the run). Everything talks to the page through [`Surface`].

pub mod actions;
pub mod batch;
pub mod error;
pub mod item;
pub mod lookup;
pub mod pagination;
pub mod prompt;
pub mod resolver;
pub mod surface;
pub mod waiter;

pub use batch::{BatchRunner, RunReport, RunStatistics};
pub use error::RunError;
pub use item::ItemOutcome;
pub use lookup::{Element, ElementHandle, Lookup, Target};
pub use prompt::{AlwaysContinue, Decision, FailurePrompt, StdinPrompt};
pub use surface::Surface;
