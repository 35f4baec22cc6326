//! Connection ownership for the application session.

use tracing::{debug, error};

use crate::error::RemucoError;
use crate::network::Connection;

/// Owns the session's single active [`Connection`].
///
/// At most one connection is live at a time. `disconnect` is safe to
/// call at any point — with no connection, twice in a row, during
/// teardown — and never fails.
#[derive(Debug, Default)]
pub struct CommController {
    connection: Option<Connection>,
}

impl CommController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take exclusive ownership of a freshly negotiated connection.
    ///
    /// Attaching while a connection is already held is a wiring bug:
    /// it is logged and the previous connection is closed first, so
    /// the single-owner invariant holds and the session continues.
    pub fn attach(&mut self, connection: Connection) {
        if self.connection.is_some() {
            error!("{}", RemucoError::Bug {
                tag: "controller.attach: connection already held",
            });
            self.disconnect();
        }
        self.connection = Some(connection);
    }

    /// Whether a connection is currently held and still open.
    pub fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_open)
    }

    /// Borrow the held connection, if any.
    pub fn connection(&mut self) -> Option<&mut Connection> {
        self.connection.as_mut()
    }

    /// Release the held connection, if any.
    ///
    /// Best-effort: the close itself cannot fail, and dropping the
    /// connection releases the socket. A no-op when nothing is held.
    pub fn disconnect(&mut self) {
        match self.connection.take() {
            Some(mut conn) => {
                debug!("disconnecting");
                conn.close();
            }
            None => {
                // nothing to do
            }
        }
    }
}
