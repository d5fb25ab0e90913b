//! Core data model types for parsed and normalized messages.

pub mod message;
