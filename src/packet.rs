//! Packets exchanged with the logging backend.
//!
//! Client packets either expect no answer (writes, clears, process watches)
//! or carry a `request_id` that the backend echoes in its reply.

use serde::{Deserialize, Serialize};

use crate::session::SessionHandle;

/// Packet sent from the client to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientPacket {
    /// Ask the backend to open (or reuse) a log target at `path`.
    CreateLogger { request_id: u64, path: String },
    /// Append `text` to the target behind `handle`.
    WriteMessage { handle: SessionHandle, text: String },
    /// Truncate the target behind `handle`.
    ClearLogger { handle: SessionHandle },
    /// Ask the backend to log when process `pid` exits.
    WatchProcess { handle: SessionHandle, pid: u32 },
}

impl ClientPacket {
    /// Session the packet addresses, if any.
    pub fn handle(&self) -> Option<SessionHandle> {
        match self {
            Self::CreateLogger { .. } => None,
            Self::WriteMessage { handle, .. }
            | Self::ClearLogger { handle }
            | Self::WatchProcess { handle, .. } => Some(*handle),
        }
    }
}

/// Packet sent from the backend to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerPacket {
    /// Reply to [`ClientPacket::CreateLogger`].
    LoggerCreated {
        request_id: u64,
        handle: SessionHandle,
    },
}

impl ServerPacket {
    /// Request identifier this packet answers.
    pub fn request_id(&self) -> u64 {
        match self {
            Self::LoggerCreated { request_id, .. } => *request_id,
        }
    }
}
