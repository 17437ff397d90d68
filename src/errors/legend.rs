//! Legend parsing errors

use thiserror::Error;

/// Errors raised while parsing a user-supplied legend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LegendError {
    /// A legend line was not of the form `label: #RRGGBB`
    #[error("Invalid legend line: '{0}'")]
    Parse(String),
}
