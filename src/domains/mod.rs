//! Domains module containing business logic organized by bounded contexts.
//!
//! - **records**: entity models and the `Database` of entity stores
//! - **tools**: the tool registry and the portmanteau tool definitions

pub mod records;
pub mod tools;
