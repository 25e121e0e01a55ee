//! OF-DPA error types and status handling.
//!
//! This module provides safe error handling for OF-DPA client operations,
//! converting raw `OFDPA_ERROR_t` return codes into Rust's Result type.

use std::fmt;
use thiserror::Error;

/// OF-DPA return codes matching the client API.
///
/// These values correspond to `OFDPA_ERROR_t` in `ofdpa_datatypes.h`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfdpaStatus {
    None = 0,
    Rpc = -20,
    Internal = -21,
    Param = -22,
    Error = -23,
    Full = -24,
    Exists = -25,
    Timeout = -26,
    Fail = -27,
    Disabled = -28,
    Unavail = -29,
    NotFound = -30,
    Empty = -31,
}

impl OfdpaStatus {
    /// Creates an OfdpaStatus from a raw i32 value.
    ///
    /// Unknown codes map to [`OfdpaStatus::Fail`].
    pub fn from_raw(status: i32) -> Self {
        match status {
            0 => OfdpaStatus::None,
            -20 => OfdpaStatus::Rpc,
            -21 => OfdpaStatus::Internal,
            -22 => OfdpaStatus::Param,
            -23 => OfdpaStatus::Error,
            -24 => OfdpaStatus::Full,
            -25 => OfdpaStatus::Exists,
            -26 => OfdpaStatus::Timeout,
            -27 => OfdpaStatus::Fail,
            -28 => OfdpaStatus::Disabled,
            -29 => OfdpaStatus::Unavail,
            -30 => OfdpaStatus::NotFound,
            -31 => OfdpaStatus::Empty,
            _ => OfdpaStatus::Fail,
        }
    }

    /// Returns the raw return code.
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Returns true if the status indicates success.
    pub fn is_success(&self) -> bool {
        *self == OfdpaStatus::None
    }

    /// Converts to a Result, returning Ok(()) for `OFDPA_E_NONE`.
    pub fn into_result(self) -> OfdpaResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(OfdpaError::from_status(self))
        }
    }
}

impl fmt::Display for OfdpaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OfdpaStatus::None => "OFDPA_E_NONE",
            OfdpaStatus::Rpc => "OFDPA_E_RPC",
            OfdpaStatus::Internal => "OFDPA_E_INTERNAL",
            OfdpaStatus::Param => "OFDPA_E_PARAM",
            OfdpaStatus::Error => "OFDPA_E_ERROR",
            OfdpaStatus::Full => "OFDPA_E_FULL",
            OfdpaStatus::Exists => "OFDPA_E_EXISTS",
            OfdpaStatus::Timeout => "OFDPA_E_TIMEOUT",
            OfdpaStatus::Fail => "OFDPA_E_FAIL",
            OfdpaStatus::Disabled => "OFDPA_E_DISABLED",
            OfdpaStatus::Unavail => "OFDPA_E_UNAVAIL",
            OfdpaStatus::NotFound => "OFDPA_E_NOT_FOUND",
            OfdpaStatus::Empty => "OFDPA_E_EMPTY",
        };
        write!(f, "{}", s)
    }
}

/// Error type for OF-DPA operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfdpaError {
    /// The client API returned an error status.
    #[error("OF-DPA operation failed: {status}")]
    Status { status: OfdpaStatus },

    /// Invalid parameter passed to the client API.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The referenced table entry or group does not exist.
    #[error("Item not found: {item}")]
    NotFound { item: String },

    /// An entry with the same key is already installed.
    #[error("Item already exists: {item}")]
    AlreadyExists { item: String },

    /// Hardware table is full.
    #[error("Table full: {table}")]
    TableFull { table: String },

    /// The RPC session to the switch agent is not usable.
    #[error("OF-DPA session unavailable: {message}")]
    Session { message: String },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl OfdpaError {
    /// Creates an error from an OF-DPA return code.
    pub fn from_status(status: OfdpaStatus) -> Self {
        match status {
            OfdpaStatus::None => OfdpaError::Internal {
                message: "from_status called with success status".to_string(),
            },
            OfdpaStatus::Param => OfdpaError::InvalidParameter {
                message: format!("OF-DPA returned {}", status),
            },
            OfdpaStatus::NotFound => OfdpaError::NotFound {
                item: "unknown".to_string(),
            },
            OfdpaStatus::Exists => OfdpaError::AlreadyExists {
                item: "unknown".to_string(),
            },
            OfdpaStatus::Full => OfdpaError::TableFull {
                table: "unknown".to_string(),
            },
            OfdpaStatus::Rpc | OfdpaStatus::Unavail | OfdpaStatus::Disabled => {
                OfdpaError::Session {
                    message: format!("OF-DPA returned {}", status),
                }
            }
            _ => OfdpaError::Status { status },
        }
    }

    /// Creates an invalid parameter error with a message.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        OfdpaError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates a not found error with an item description.
    pub fn not_found(item: impl Into<String>) -> Self {
        OfdpaError::NotFound { item: item.into() }
    }

    /// Creates an already exists error.
    pub fn already_exists(item: impl Into<String>) -> Self {
        OfdpaError::AlreadyExists { item: item.into() }
    }

    /// Creates a table full error.
    pub fn table_full(table: impl Into<String>) -> Self {
        OfdpaError::TableFull {
            table: table.into(),
        }
    }

    /// Creates a session error.
    pub fn session(message: impl Into<String>) -> Self {
        OfdpaError::Session {
            message: message.into(),
        }
    }

    /// Returns the closest OF-DPA return code for this error.
    pub fn status(&self) -> OfdpaStatus {
        match self {
            OfdpaError::Status { status } => *status,
            OfdpaError::InvalidParameter { .. } => OfdpaStatus::Param,
            OfdpaError::NotFound { .. } => OfdpaStatus::NotFound,
            OfdpaError::AlreadyExists { .. } => OfdpaStatus::Exists,
            OfdpaError::TableFull { .. } => OfdpaStatus::Full,
            OfdpaError::Session { .. } => OfdpaStatus::Unavail,
            OfdpaError::Internal { .. } => OfdpaStatus::Internal,
        }
    }

    /// Returns true if the error means the session itself is unusable.
    pub fn is_session(&self) -> bool {
        matches!(self, OfdpaError::Session { .. })
    }
}

/// Result type for OF-DPA operations.
pub type OfdpaResult<T> = Result<T, OfdpaError>;

/// Extension trait for converting raw OF-DPA return codes.
pub trait OfdpaStatusExt {
    /// Converts a raw return code to a Result.
    fn to_result(self) -> OfdpaResult<()>;
}

impl OfdpaStatusExt for i32 {
    fn to_result(self) -> OfdpaResult<()> {
        OfdpaStatus::from_raw(self).into_result()
    }
}
