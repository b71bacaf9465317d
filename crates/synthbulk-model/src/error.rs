//! Model errors

/// Errors raised while interpreting model identifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Field group name not recognised
    #[error("unknown field group: '{0}'")]
    UnknownFieldGroup(String),

    /// Monitor type name not recognised
    #[error("unknown monitor type: '{0}'")]
    UnknownMonitorType(String),
}
