//! Network record-forwarding handler.
//!
//! [`SysHandler`] either ships records to a remote logging server (client
//! role) or receives records from remote clients and forwards them into a
//! locally owned [`Logger`](crate::logger::Logger) (server role), over TCP
//! or UDP. The wire format and its deliberate limitations are documented
//! in [`protocol`].

mod handler;
mod protocol;

#[cfg(test)]
mod tests;

pub use handler::{Role, ShutdownHandle, SysHandler, DEFAULT_SERVER_TEMPLATE};
pub use protocol::{Transport, WireRecord, ACK};
