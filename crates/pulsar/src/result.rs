//! Result and error types for Pulsar.

use thiserror::Error;

/// Result type for Pulsar operations
pub type PulsarResult<T> = Result<T, PulsarError>;

/// Errors that can occur in Pulsar
#[derive(Debug, Error)]
pub enum PulsarError {
    /// Browser kind string did not name a supported browser
    #[error("unsupported browser {value:?} (expected chrome, firefox, or edge)")]
    UnsupportedBrowser {
        /// The rejected configuration value
        value: String,
    },

    /// Driver binary could not be resolved or started
    #[error("failed to provision {binary}: {message}")]
    Provision {
        /// Driver binary name (chromedriver, geckodriver, msedgedriver)
        binary: String,
        /// Error message
        message: String,
    },

    /// Browser session could not be constructed
    #[error("failed to launch browser session: {message}")]
    Launch {
        /// Error message
        message: String,
    },

    /// No element matched the locator
    #[error("no element matching {locator}")]
    ElementNotFound {
        /// Rendered locator
        locator: String,
    },

    /// Element reference went stale between lookup and interaction
    #[error("stale element reference for {locator}")]
    Stale {
        /// Rendered locator
        locator: String,
    },

    /// Element was found but cannot receive the interaction
    #[error("element {locator} is not interactable")]
    NotInteractable {
        /// Rendered locator
        locator: String,
    },

    /// Bounded wait elapsed without the condition being met
    #[error("operation timed out after {ms}ms")]
    Timeout {
        /// Wait budget in milliseconds
        ms: u64,
    },

    /// Retried interaction never succeeded; the final failure is attached
    #[error("click did not succeed after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts performed
        attempts: u32,
        /// The failure from the final attempt
        #[source]
        source: Box<PulsarError>,
    },

    /// Selection control has no option with the requested visible text
    #[error("no option with visible text {label:?} in {locator}")]
    OptionNotFound {
        /// Rendered locator of the selection control
        locator: String,
        /// The visible text that was requested
        label: String,
    },

    /// Element is not a selection control
    #[error("element {locator} is not a select control")]
    NotASelect {
        /// Rendered locator
        locator: String,
    },

    /// Engine error that maps to no more specific kind
    #[error("engine error: {message}")]
    Engine {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PulsarError {
    /// Whether this error is a bounded-wait timeout.
    ///
    /// The interaction helpers use this to tell "condition never became
    /// true" apart from genuine engine failures.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error means the locator matched nothing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }
}
