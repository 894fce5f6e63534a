// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed worker-protocol messages over the multipart frame codec.

use crate::command::{Command, WORKER_HEADER};
use crate::error::ProtocolError;

/// A message received from a worker: `[WORKER_HEADER, command, ...data]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerFrame {
    /// `READY(service_name, worker_id)`.
    Ready { service_name: String, worker_id: String },
    Heartbeat,
    Disconnect,
}

impl WorkerFrame {
    /// Parse a multipart message received from a worker connection.
    ///
    /// Validates frame count, header byte, and command byte.
    /// Header/command mismatches are protocol violations the caller should
    /// log and drop rather than propagate further up.
    pub fn parse(parts: &[Vec<u8>]) -> Result<Self, ProtocolError> {
        if parts.len() < 2 {
            return Err(ProtocolError::Malformed { expected: 2, actual: parts.len() });
        }
        if parts[0].first().copied() != Some(WORKER_HEADER) {
            return Err(ProtocolError::UnknownHeader(parts[0].first().copied().unwrap_or(0)));
        }
        let command_byte = parts[1].first().copied().ok_or(ProtocolError::Malformed {
            expected: 1,
            actual: 0,
        })?;
        match Command::from_byte(command_byte)? {
            Command::Ready => {
                if parts.len() != 4 {
                    return Err(ProtocolError::Malformed { expected: 4, actual: parts.len() });
                }
                let service_name = String::from_utf8_lossy(&parts[2]).into_owned();
                let worker_id = String::from_utf8_lossy(&parts[3]).into_owned();
                Ok(WorkerFrame::Ready { service_name, worker_id })
            }
            Command::Heartbeat => Ok(WorkerFrame::Heartbeat),
            Command::Disconnect => Ok(WorkerFrame::Disconnect),
            Command::Request => Err(ProtocolError::UnknownCommand(command_byte)),
        }
    }

    /// Encode this frame as the broker would receive it (used by test
    /// harnesses simulating a worker).
    pub fn encode(&self) -> Vec<Vec<u8>> {
        let header = vec![WORKER_HEADER];
        match self {
            WorkerFrame::Ready { service_name, worker_id } => vec![
                header,
                vec![Command::Ready.as_byte()],
                service_name.clone().into_bytes(),
                worker_id.clone().into_bytes(),
            ],
            WorkerFrame::Heartbeat => vec![header, vec![Command::Heartbeat.as_byte()]],
            WorkerFrame::Disconnect => vec![header, vec![Command::Disconnect.as_byte()]],
        }
    }
}

/// A message sent to a worker: `[WORKER_HEADER, command, ...data]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerFrame {
    Request { payload: Vec<u8> },
    Heartbeat,
    Disconnect,
}

impl BrokerFrame {
    pub fn encode(&self) -> Vec<Vec<u8>> {
        let header = vec![WORKER_HEADER];
        match self {
            BrokerFrame::Request { payload } => {
                vec![header, vec![Command::Request.as_byte()], payload.clone()]
            }
            BrokerFrame::Heartbeat => vec![header, vec![Command::Heartbeat.as_byte()]],
            BrokerFrame::Disconnect => vec![header, vec![Command::Disconnect.as_byte()]],
        }
    }

    /// Parse a multipart message as a worker would receive it (used by test
    /// harnesses simulating a worker).
    pub fn parse(parts: &[Vec<u8>]) -> Result<Self, ProtocolError> {
        if parts.len() < 2 {
            return Err(ProtocolError::Malformed { expected: 2, actual: parts.len() });
        }
        if parts[0].first().copied() != Some(WORKER_HEADER) {
            return Err(ProtocolError::UnknownHeader(parts[0].first().copied().unwrap_or(0)));
        }
        let command_byte = parts[1].first().copied().ok_or(ProtocolError::Malformed {
            expected: 1,
            actual: 0,
        })?;
        match Command::from_byte(command_byte)? {
            Command::Request => {
                if parts.len() != 3 {
                    return Err(ProtocolError::Malformed { expected: 3, actual: parts.len() });
                }
                Ok(BrokerFrame::Request { payload: parts[2].clone() })
            }
            Command::Heartbeat => Ok(BrokerFrame::Heartbeat),
            Command::Disconnect => Ok(BrokerFrame::Disconnect),
            Command::Ready => Err(ProtocolError::UnknownCommand(command_byte)),
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
