//! Observability for parlo: tracing setup and OTel GenAI attribute constants.

pub mod genai_attrs;
pub mod tracing_setup;
