//! Command gateway - translates one request into exactly one transport call

use serde::{Deserialize, Serialize};

use super::LedState;
use crate::serial::{SerialChannel, TransportError};

/// Request payload for a state change, as received from the HTTP boundary.
/// The range is deliberately unbounded; normalization collapses it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeviceCommand {
    pub state: i64,
}

/// Reported back to the caller after a verified flush
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Acknowledgement {
    pub status: String,
    /// The wire line that was sent, minus the trailing terminator
    pub sent: String,
}

/// Stateless translation over the one shared transport resource
#[derive(Clone)]
pub struct CommandGateway {
    channel: SerialChannel,
}

impl CommandGateway {
    pub fn new(channel: SerialChannel) -> Self {
        Self { channel }
    }

    /// Normalize, format, send, acknowledge.
    ///
    /// Transport errors propagate unchanged; no recovery happens here. The
    /// acknowledgement is only built after the flush completed, so a failed
    /// actuation is never reported as success.
    pub async fn apply(&self, cmd: DeviceCommand) -> Result<Acknowledgement, TransportError> {
        let line = LedState::from_raw(cmd.state).wire_line();
        self.channel.send_line(line.clone()).await?;

        Ok(Acknowledgement {
            status: "ok".into(),
            sent: line.trim_end().into(),
        })
    }
}
