//! Query-resolution pipeline for the Rota scheduling assistant.
//!
//! A manager message enters through [`Assistant::handle_query`], gets
//! classified into an intent, has its entities resolved against the thread's
//! authorized scope, is routed to the metric catalog, the ad-hoc executor or
//! the suggestion engine, and comes back as rendered text with mandatory
//! scope and source bands. The pipeline never answers from thin air: any
//! result that claims to be data-backed but read nothing is rejected before
//! formatting.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod orchestrator;
pub mod outcome;
pub mod query;
pub mod resolve;
pub mod scope;
pub mod store;
pub mod suggest;
pub mod text;

pub use config::AssistantConfig;
pub use error::AssistantError;
pub use orchestrator::{classifier_from_config, Assistant};
