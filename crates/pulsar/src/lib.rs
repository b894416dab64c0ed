//! Pulsar: WebDriver session bootstrap and flake-resistant interaction
//! helpers for browser test automation.
//!
//! Pulsar (Spanish: "to press/click") is a thin layer over a WebDriver
//! engine: it boots exactly one browser session per factory and wraps the
//! engine's interaction primitives with bounded polling and bounded retry,
//! so test code neither hangs on a slow render nor passes silently over a
//! failed interaction.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     PULSAR Architecture                        │
//! ├────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌─────────────┐    ┌──────────────────┐   │
//! │   │ Test code  │    │ Actions     │    │ Engine           │   │
//! │   │ (Rust)     │───►│ (bounded    │───►│ (WebDriver via   │   │
//! │   │            │    │  wait/retry)│    │  thirtyfour)     │   │
//! │   └────────────┘    └─────────────┘    └──────────────────┘   │
//! │         │                                      ▲              │
//! │         │          ┌─────────────────┐         │              │
//! │         └─────────►│ SessionFactory  │─────────┘              │
//! │                    │ (one session,   │                        │
//! │                    │  get-or-create) │                        │
//! │                    └─────────────────┘                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pulsar::{BrowserKind, Locator, SessionConfig, SessionFactory, WaitBudget};
//!
//! let factory = SessionFactory::new(
//!     SessionConfig::new(BrowserKind::Chrome).with_implicit_wait(WaitBudget::from_secs(10)),
//! );
//! let session = factory.session().await?;
//! session.goto("https://example.com/signup").await?;
//!
//! let actions = session.actions(WaitBudget::from_secs(10));
//! actions.update_field(&Locator::name("email"), "hello@example.com").await?;
//! actions.check_checkbox("Accept terms", &Locator::id("terms")).await?;
//! actions.click(&Locator::css("button[type='submit']")).await?;
//! assert!(actions.is_text_present(&Locator::id("status"), "Welcome").await?);
//!
//! factory.quit().await?;
//! ```

#![warn(missing_docs)]

mod actions;
mod browser;
mod engine;
mod locator;
mod result;
mod session;
mod wait;

/// Driver provisioning (locating and starting the native driver binary)
#[cfg(feature = "webdriver")]
pub mod provision;
/// WebDriver-backed engine implementation
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use actions::{Actions, CLICK_ATTEMPTS};
pub use browser::{
    default_headless, BrowserKind, CHROME_BASE_ARGS, CHROME_HEADLESS_ARG, FIREFOX_HEADLESS_ARG,
};
pub use engine::{Engine, MockElement, MockEngine};
pub use locator::{Locator, Strategy};
pub use result::{PulsarError, PulsarResult};
pub use session::{
    Session, SessionConfig, SessionFactory, BROWSER_ENV, HEADLESS_ENV, WEBDRIVER_URL_ENV,
};
pub use wait::{poll_until, WaitBudget, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_SECS};

#[cfg(feature = "webdriver")]
pub use provision::DriverServer;
#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverEngine;

// smoke check over the re-exported surface
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_surface_round_trip() {
        let locator = Locator::css("#main");
        assert_eq!(locator.to_string(), "css=#main");
        assert_eq!("chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!(WaitBudget::from_secs(DEFAULT_WAIT_SECS), WaitBudget::default());
    }
}
