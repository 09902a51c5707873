//! Inbox triage — classifies tagged inbox records and files them by type.

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod store;
