//! Type conversion functions for CLI to internal types.

use crate::{
    cli::{EngineArg, Format},
    output::OutputFormat,
    parser::Engine
};

/// Converts a CLI engine value to the parser engine.
///
/// # Example
///
/// ```
/// use sql_review::{app::convert_engine, cli::EngineArg, parser::Engine};
///
/// assert_eq!(convert_engine(EngineArg::Postgres), Engine::Postgres);
/// ```
pub fn convert_engine(engine: EngineArg) -> Engine {
    match engine {
        EngineArg::Mysql => Engine::MySql,
        EngineArg::Postgres => Engine::Postgres
    }
}

/// Converts a CLI format enum to the internal output format type.
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}
