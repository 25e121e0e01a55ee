//! Error types for snake wiring.
//!
//! Validation errors are raised before any switch interaction. Install
//! errors carry the underlying [`OfdpaError`] and stop the run where it
//! failed; entries installed earlier stay on the switch.

use std::fmt;
use std::io;
use std::path::PathBuf;

use ofdpa::OfdpaError;
use thiserror::Error;

use crate::types::PortId;

/// Result type alias for snake operations.
pub type SnakeResult<T> = Result<T, SnakeError>;

/// Step of a forwarding install that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForwardingStage {
    /// Creating the L2 interface group.
    Group,
    /// Attaching the group's bucket.
    Bucket,
    /// Installing the ACL redirect entry.
    Acl,
}

impl fmt::Display for ForwardingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ForwardingStage::Group => "group",
            ForwardingStage::Bucket => "bucket",
            ForwardingStage::Acl => "acl",
        };
        write!(f, "{}", s)
    }
}

/// Errors that can occur while planning or wiring a snake.
#[derive(Debug, Error)]
pub enum SnakeError {
    /// The end port does not come after the start port.
    #[error("The start port {start} must be less than the end port {end}")]
    InvalidRange { start: PortId, end: PortId },

    /// The port range cannot be split into pairs.
    #[error("Must have an even number of ports: {start}..={end} has {count} ports")]
    OddPortCount {
        start: PortId,
        end: PortId,
        count: u32,
    },

    /// The VLAN id is outside 0-4095.
    #[error("Invalid VLAN {vlan_id} (use 1-4095, or 0 for untagged)")]
    InvalidVlan { vlan_id: u32 },

    /// A port lies outside the switch's port numbering.
    #[error("Port {port} is outside the valid range {min}..={max}")]
    PortOutOfRange { port: PortId, min: PortId, max: PortId },

    /// The switch rejected a VLAN table entry.
    #[error("Failed to install VLAN classification on port {port}: {source}")]
    ClassificationInstall {
        port: PortId,
        #[source]
        source: OfdpaError,
    },

    /// The switch rejected a group, bucket or ACL entry.
    #[error("Failed to install forwarding {in_port} -> {out_port} ({stage}): {source}")]
    ForwardingInstall {
        in_port: PortId,
        out_port: PortId,
        stage: ForwardingStage,
        #[source]
        source: OfdpaError,
    },

    /// The control plane session is not usable.
    #[error("OF-DPA session error: {source}")]
    Session {
        #[source]
        source: OfdpaError,
    },

    /// Failed to read a configuration file.
    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl SnakeError {
    /// Wraps a VLAN table failure, promoting session failures.
    pub fn classification(port: PortId, source: OfdpaError) -> Self {
        if source.is_session() {
            return Self::Session { source };
        }
        Self::ClassificationInstall { port, source }
    }

    /// Wraps a forwarding failure, promoting session failures.
    pub fn forwarding(
        in_port: PortId,
        out_port: PortId,
        stage: ForwardingStage,
        source: OfdpaError,
    ) -> Self {
        if source.is_session() {
            return Self::Session { source };
        }
        Self::ForwardingInstall {
            in_port,
            out_port,
            stage,
            source,
        }
    }

    /// Creates a session error.
    pub fn session(source: OfdpaError) -> Self {
        Self::Session { source }
    }

    /// Returns true for errors raised before touching the switch.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. }
                | Self::OddPortCount { .. }
                | Self::InvalidVlan { .. }
                | Self::PortOutOfRange { .. }
        )
    }

    /// Returns true for errors reported by the switch for a specific entry.
    pub fn is_install(&self) -> bool {
        matches!(
            self,
            Self::ClassificationInstall { .. } | Self::ForwardingInstall { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofdpa::OfdpaStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_messages() {
        let err = SnakeError::InvalidRange { start: 5, end: 4 };
        assert_eq!(
            err.to_string(),
            "The start port 5 must be less than the end port 4"
        );
        assert!(err.is_validation());

        let err = SnakeError::OddPortCount {
            start: 1,
            end: 3,
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "Must have an even number of ports: 1..=3 has 3 ports"
        );
    }

    #[test]
    fn test_install_error_keeps_source() {
        let err = SnakeError::forwarding(
            1,
            2,
            ForwardingStage::Bucket,
            OfdpaError::from_status(OfdpaStatus::Full),
        );
        assert!(err.is_install());
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(
            err.to_string(),
            "Failed to install forwarding 1 -> 2 (bucket): Table full: unknown"
        );
    }

    #[test]
    fn test_session_failures_are_promoted() {
        let err = SnakeError::classification(7, OfdpaError::from_status(OfdpaStatus::Rpc));
        assert!(matches!(err, SnakeError::Session { .. }));
        assert!(!err.is_install());
    }
}
