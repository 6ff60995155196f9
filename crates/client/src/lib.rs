//! Client code for the Krishi offline client.
//!
//! This crate provides the HTTP plumbing, the cache strategy worker, and the
//! analysis and authentication clients shared by the server.

pub mod analysis;
pub mod auth;
pub mod diagnosis;
pub mod fetch;
pub mod worker;

pub use analysis::{AnalysisClient, Analyzer};
pub use auth::{AuthResponse, LoginRequest, SignupRequest};
pub use diagnosis::DiagnosisSession;
pub use fetch::{FetchConfig, HttpNetwork, Network, Request, RequestMode};
pub use worker::{ActivationReport, CacheWorker, ResponseSource, Served, WorkerConfig, WorkerRegistry, WorkerState};

#[cfg(test)]
pub(crate) mod test_support;
