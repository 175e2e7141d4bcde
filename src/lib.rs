//! # SQL Review Library
//!
//! Rule-based review of MySQL and PostgreSQL text: statement parsing,
//! review advisors, referenced-table extraction and read-only validation.

pub mod advisor;
pub mod app;
pub mod ast;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod resource;
pub mod validate;
