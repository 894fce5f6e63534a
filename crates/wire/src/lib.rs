// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Wire format for the broker's duplex worker protocol.
//!
//! Every message is a multipart frame: a fixed header byte, a single command
//! byte, then zero or more payload frames. Framing on the wire is a 4-byte
//! big-endian length prefix per frame, the same discipline used by the rest
//! of this workspace's IPC protocols, over a plain TCP stream per connected
//! worker. There is no ZeroMQ-style ROUTER socket available in this
//! workspace's dependency stack; the broker substitutes a connection table
//! keyed by [`WorkerIdentity`] (see `dispatch-broker::router`) for the
//! address-frame prepend/strip a ROUTER socket would otherwise perform
//! automatically.

pub mod codec;
pub mod command;
pub mod error;
pub mod message;

pub use codec::{read_message, read_multipart, write_message, write_multipart};
pub use command::{Command, WORKER_HEADER};
pub use error::ProtocolError;
pub use message::{BrokerFrame, WorkerFrame};
