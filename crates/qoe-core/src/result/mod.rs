//! Measurement results.
//!
//! - `model`: the serializable `MeasurementResult` and its `TaskProgress`
//! - `builder`: `ResultBuilder`, which turns a run outcome into a result

mod builder;
mod model;

pub use builder::{ERROR_KEY, ProbeOutcome, ResultBuilder, TIMEOUT_ERROR_MESSAGE};
pub use model::{MeasurementResult, TaskProgress};
