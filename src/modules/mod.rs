//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients for the object store and the generative model.

pub mod llm;
pub mod storage;
