//! Tools the model can call
//!
//! A [`Tool`] pairs a [`ToolSchema`] with a [`ToolExecutor`]. The [`ToolRegistry`]
//! validates arguments before dispatch and turns every failure into a
//! [`ToolCallResult`] the model can read.

pub mod builtin;
mod registry;
mod schema;

pub use registry::{Tool, ToolCallResult, ToolExecutor, ToolRegistry};
pub use schema::{ParameterSpec, ParameterType, ToolSchema};
