//! Startup orchestration.
//!
//! The session driver runs the one-time startup sequence: install the
//! user-facing log sink, negotiate a connection, and turn the outcome
//! into either a running main screen or a single failure string for
//! the UI to display. No structured error crosses this boundary.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use remuco_core::{
    CommController, ConnectOutcome, Connector, LogView, Logger, Player, RemucoError,
};

use crate::config::ClientConfig;
use crate::ui::{MainScreen, ScreenRegistry};

/// Failure string shown when there is no more specific diagnostic.
pub const GENERIC_FAILURE: &str =
    "Connecting failed. Please review the log messages to see what's wrong.";

/// Prefix for failures that carry a negotiation diagnostic.
pub const FAILURE_PREFIX: &str = "Connecting failed!\n";

/// Sentinel returned when the user cancelled: exit without an alert.
pub const EXIT_SILENTLY: &str = "x";

/// Drives the one-time startup sequence and owns the session's
/// connection for its lifetime.
pub struct SessionDriver {
    controller: CommController,
    logger: Logger,
    log_view: LogView,
    registry: ScreenRegistry,
    screen: Option<Box<dyn MainScreen>>,
    shutdown: CancellationToken,
    initialized: bool,
}

impl SessionDriver {
    pub fn new(registry: ScreenRegistry) -> Self {
        Self {
            controller: CommController::new(),
            logger: Logger::new(),
            log_view: LogView::new(),
            registry,
            screen: None,
            shutdown: CancellationToken::new(),
            initialized: false,
        }
    }

    /// The buffer behind the UI's log screen.
    pub fn log_view(&self) -> &LogView {
        &self.log_view
    }

    /// Cancelled when the session decides to shut the application down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the startup sequence against the configured host.
    ///
    /// Returns `""` on success, [`EXIT_SILENTLY`] when the user
    /// cancelled, and a displayable failure string otherwise. A second
    /// call is a no-op returning success.
    pub async fn init(&mut self, config: &ClientConfig) -> String {
        if self.initialized {
            return String::new();
        }

        // Log sink first, so everything after is visible on the UI's
        // log screen.
        self.logger.set_sink(Box::new(self.log_view.clone()));

        let client_info = config.client_info();
        self.logger
            .ln(&format!("Supported encodings: {}", client_info.encodings.join(", ")));

        let target = match config.connect_target() {
            Ok(target) => target,
            Err(e) => {
                self.logger.ln(&format!("Bad connection settings ({e})"));
                return GENERIC_FAILURE.to_string();
            }
        };
        self.logger.ln(&format!("Connecting to {target} ..."));

        let connector = Connector::spawn(target, client_info, config.connector_options());
        self.init_with(&config.ui.screen, connector.wait()).await
    }

    /// The outcome-mapping half of [`init`](Self::init).
    ///
    /// Separated so the mapping can be driven with any future that
    /// resolves to a [`ConnectOutcome`].
    pub async fn init_with(
        &mut self,
        screen_key: &str,
        outcome: impl Future<Output = ConnectOutcome>,
    ) -> String {
        if self.initialized {
            return String::new();
        }
        self.logger.set_sink(Box::new(self.log_view.clone()));

        match outcome.await {
            ConnectOutcome::Cancelled => {
                // An intentional exit, not an error.
                self.shut_down();
                EXIT_SILENTLY.to_string()
            }
            ConnectOutcome::Failed { message } => {
                self.logger.ln(&format!("Connecting failed ({message})"));
                format!("{FAILURE_PREFIX}{message}")
            }
            ConnectOutcome::Connected(mut connection) => {
                if !connection.is_open() {
                    // Negotiation claimed success but the channel is
                    // unusable. Should not occur.
                    let bug = RemucoError::Bug {
                        tag: "session.init: ok outcome with closed channel",
                    };
                    error!("{bug}");
                    self.logger.ln(&format!("{bug}"));
                    return GENERIC_FAILURE.to_string();
                }

                self.logger.ln("Connection to host established.");

                let player = match Player::bind(&mut connection) {
                    Ok(player) => player,
                    Err(e) => {
                        error!("{e}");
                        self.logger.ln(&format!("{e}"));
                        return GENERIC_FAILURE.to_string();
                    }
                };
                self.controller.attach(connection);

                let mut screen = self.registry.resolve(screen_key);
                screen.set_up(player, self.log_view.clone());
                screen.activate(true);
                self.screen = Some(screen);

                self.initialized = true;
                String::new()
            }
        }
    }

    /// Idempotent teardown of the session's connection.
    pub fn disconnect(&mut self) {
        self.controller.disconnect();
    }

    /// Tear the session down and ask the application to exit.
    pub fn shut_down(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            screen.activate(false);
        }
        self.disconnect();
        self.logger.ln("bye bye!");
        self.shutdown.cancel();
    }

    /// Whether a connection is currently held and open.
    pub fn is_connected(&self) -> bool {
        self.controller.is_connected()
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        // Shutdown must always complete; disconnect never fails.
        self.controller.disconnect();
        info!("session driver dropped");
    }
}
