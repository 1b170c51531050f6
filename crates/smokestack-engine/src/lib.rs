//! Container engine plumbing for smokestack.
//!
//! - [`EngineClient`] drives the engine CLI through a [`ContainerExecutor`]
//! - [`Reaper`] stops and removes containers idempotently
//! - [`SmokeTester`] starts a container, probes it over HTTP, and reaps it

pub mod client;
pub mod engine;
pub mod executor;
pub mod probe;
pub mod reaper;
pub mod smoke;
pub mod status;

pub use client::{EngineClient, RunError};
pub use engine::EngineError;
pub use executor::{CommandOutput, ContainerExecutor, ProcessExecutor};
pub use probe::{HttpProbe, ProbeError, ProbeResponse, ReqwestProbe};
pub use reaper::{ReapError, ReapMode, ReapOutcome, Reaper};
pub use smoke::{SmokeError, SmokeReport, SmokeTester};
pub use status::{NO_SUCH_CONTAINER, StopOutcome};
