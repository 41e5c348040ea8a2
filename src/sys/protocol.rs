//! Wire protocol for the network handler.
//!
//! A record travels as one flat JSON object per socket write, with no
//! length prefix or delimiter. Message boundaries rely entirely on the
//! strict lock-step exchange: the client performs exactly one write and
//! then one read per record, the server exactly one read and then one
//! acknowledgement write. Pipelining several records before draining an
//! acknowledgement would desynchronise the pairing; that is a known
//! limitation of the protocol, kept for compatibility rather than fixed
//! with framing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::LogRecord;

/// Fixed acknowledgement written by the TCP and UDP servers after each
/// forwarded record. Clients never parse it; only its receipt matters.
pub const ACK: &[u8] = b"message received";

/// Size of the single-read buffer on both sides of the exchange. An
/// encoded record must fit in one buffer under the lock-step protocol.
pub(crate) const MAX_PAYLOAD: usize = 1024;

/// Transport selection for a [`SysHandler`](super::SysHandler).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    /// Connection-oriented stream exchange with per-record acknowledgement.
    Tcp,
    /// Connectionless datagrams; the client does not await acknowledgement.
    Udp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transport::Tcp => "TCP",
            Transport::Udp => "UDP",
        })
    }
}

/// JSON shape of one record on the wire.
///
/// Field names are the wire contract. `client_name` carries the sending
/// handler's logical name; the receiving server separately observes the
/// peer address and exposes it to its format template as `client_addr`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecord {
    pub loggername: String,
    pub iso_8601_time: String,
    pub asctime: String,
    pub loglevel: String,
    pub message: String,
    #[serde(default)]
    pub client_name: String,
}

impl WireRecord {
    /// Capture a record's fields plus the sending handler's name.
    pub fn from_record(record: &LogRecord, client_name: &str) -> Self {
        Self {
            loggername: record.logger_name.clone(),
            iso_8601_time: record.iso_8601_time.clone(),
            asctime: record.asctime.clone(),
            loglevel: record.level.name().to_owned(),
            message: record.message.clone(),
            client_name: client_name.to_owned(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
