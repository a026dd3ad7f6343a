//! Error definitions for the input pipeline

use thiserror::Error;

/// Contract violations raised by registries, devices and the action factory.
///
/// Every variant is raised synchronously by the call that detects it and is
/// never retried. The registry or manager that raised it stays untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// A device or adapter is already registered for this device type
    #[error("Already registered: {0}")]
    DuplicateRegistration(String),

    /// Unregister or lookup of something that is not registered
    #[error("Not found: {0}")]
    NotFound(String),

    /// A raw input subtype the devices do not know how to capture
    #[error("Unsupported input kind: {0}")]
    UnsupportedInputKind(String),

    /// A control type name outside Discrete/Continuous/Axis/Vector2/Vector3
    #[error("Unsupported control type: {0}")]
    UnsupportedControlType(String),
}

pub type Result<T, E = InputError> = std::result::Result<T, E>;
