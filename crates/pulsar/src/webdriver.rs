//! WebDriver-backed engine implementation.
//!
//! Wraps the `thirtyfour` WebDriver client. Construction goes through
//! [`launch`], which provisions the native driver binary (unless the
//! config points at an already-running endpoint), builds per-kind
//! capabilities, and connects the session.

use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::components::SelectElement;
use thirtyfour::error::{WebDriverError, WebDriverErrorInner};
use thirtyfour::prelude::*;
use tracing::debug;

use crate::browser::BrowserKind;
use crate::engine::Engine;
use crate::locator::{Locator, Strategy};
use crate::provision::{self, DriverServer};
use crate::result::{PulsarError, PulsarResult};
use crate::session::SessionConfig;

/// Engine backed by a live WebDriver session
pub struct WebDriverEngine {
    driver: WebDriver,
    /// Keeps the provisioned driver process alive for the session lifetime
    #[allow(dead_code)]
    server: Option<DriverServer>,
}

impl std::fmt::Debug for WebDriverEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDriverEngine").finish_non_exhaustive()
    }
}

/// Provision a driver (if needed), build capabilities for the configured
/// kind, and connect a WebDriver session.
///
/// # Errors
///
/// Provisioning failures surface as [`PulsarError::Provision`]; rejected
/// capabilities or a refused connection surface as [`PulsarError::Launch`].
/// Neither is retried.
pub async fn launch(config: &SessionConfig) -> PulsarResult<Box<dyn Engine>> {
    let (server, url) = match config.webdriver_url() {
        Some(url) => (None, url.to_string()),
        None => {
            let server = provision::ensure_driver(config.kind()).await?;
            let url = server.url().to_string();
            (Some(server), url)
        }
    };

    debug!(
        target: "pulsar",
        browser = %config.kind(),
        url = %url,
        headless = config.headless(),
        "connecting WebDriver session"
    );

    let caps = capabilities(config)?;
    let driver = WebDriver::new(&url, caps)
        .await
        .map_err(|e| PulsarError::Launch {
            message: e.to_string(),
        })?;

    Ok(Box::new(WebDriverEngine { driver, server }))
}

fn capabilities(config: &SessionConfig) -> PulsarResult<Capabilities> {
    let headless = config.headless();
    let launch_err = |e: WebDriverError| PulsarError::Launch {
        message: e.to_string(),
    };

    match config.kind() {
        BrowserKind::Chrome => {
            let mut caps = DesiredCapabilities::chrome();
            for arg in config.kind().launch_args(headless) {
                caps.add_arg(arg).map_err(launch_err)?;
            }
            for arg in config.extra_args() {
                caps.add_arg(arg).map_err(launch_err)?;
            }
            Ok(caps.into())
        }
        BrowserKind::Firefox => {
            let mut caps = DesiredCapabilities::firefox();
            for arg in config.kind().launch_args(headless) {
                caps.add_arg(arg).map_err(launch_err)?;
            }
            Ok(caps.into())
        }
        // default options, no custom flags
        BrowserKind::Edge => Ok(DesiredCapabilities::edge().into()),
    }
}

fn to_by(locator: &Locator) -> By {
    match locator.strategy() {
        Strategy::Css => By::Css(locator.selector()),
        Strategy::Id => By::Id(locator.selector()),
        Strategy::Name => By::Name(locator.selector()),
        Strategy::XPath => By::XPath(locator.selector()),
        Strategy::Tag => By::Tag(locator.selector()),
        Strategy::LinkText => By::LinkText(locator.selector()),
    }
}

/// Map engine errors onto the crate's typed kinds, keeping the locator
/// in the message.
fn classify(err: WebDriverError, locator: &Locator) -> PulsarError {
    match err.as_inner() {
        WebDriverErrorInner::NoSuchElement(_) => PulsarError::ElementNotFound {
            locator: locator.to_string(),
        },
        WebDriverErrorInner::StaleElementReference(_) => PulsarError::Stale {
            locator: locator.to_string(),
        },
        WebDriverErrorInner::ElementNotInteractable(_)
        | WebDriverErrorInner::ElementClickIntercepted(_) => PulsarError::NotInteractable {
            locator: locator.to_string(),
        },
        _ => PulsarError::Engine {
            message: err.to_string(),
        },
    }
}

impl WebDriverEngine {
    async fn element(&self, locator: &Locator) -> PulsarResult<WebElement> {
        self.driver
            .find(to_by(locator))
            .await
            .map_err(|e| classify(e, locator))
    }
}

#[async_trait]
impl Engine for WebDriverEngine {
    async fn find(&self, locator: &Locator) -> PulsarResult<()> {
        self.element(locator).await.map(|_| ())
    }

    async fn text(&self, locator: &Locator) -> PulsarResult<String> {
        let element = self.element(locator).await?;
        element.text().await.map_err(|e| classify(e, locator))
    }

    async fn is_selected(&self, locator: &Locator) -> PulsarResult<bool> {
        let element = self.element(locator).await?;
        element.is_selected().await.map_err(|e| classify(e, locator))
    }

    async fn is_displayed(&self, locator: &Locator) -> PulsarResult<bool> {
        let element = self.element(locator).await?;
        element
            .is_displayed()
            .await
            .map_err(|e| classify(e, locator))
    }

    async fn is_enabled(&self, locator: &Locator) -> PulsarResult<bool> {
        let element = self.element(locator).await?;
        element.is_enabled().await.map_err(|e| classify(e, locator))
    }

    async fn click(&self, locator: &Locator) -> PulsarResult<()> {
        let element = self.element(locator).await?;
        element.click().await.map_err(|e| classify(e, locator))
    }

    async fn clear(&self, locator: &Locator) -> PulsarResult<()> {
        let element = self.element(locator).await?;
        element.clear().await.map_err(|e| classify(e, locator))
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> PulsarResult<()> {
        let element = self.element(locator).await?;
        element
            .send_keys(text)
            .await
            .map_err(|e| classify(e, locator))
    }

    async fn scroll_into_view(&self, locator: &Locator) -> PulsarResult<()> {
        let element = self.element(locator).await?;
        element
            .scroll_into_view()
            .await
            .map_err(|e| classify(e, locator))
    }

    async fn hover(&self, locator: &Locator) -> PulsarResult<()> {
        let element = self.element(locator).await?;
        self.driver
            .action_chain()
            .move_to_element_center(&element)
            .perform()
            .await
            .map_err(|e| classify(e, locator))
    }

    async fn select_by_visible_text(&self, locator: &Locator, label: &str) -> PulsarResult<()> {
        let element = self.element(locator).await?;
        let select =
            SelectElement::new(&element)
                .await
                .map_err(|_| PulsarError::NotASelect {
                    locator: locator.to_string(),
                })?;
        select
            .select_by_exact_text(label)
            .await
            .map_err(|e| {
                if matches!(e.as_inner(), WebDriverErrorInner::NoSuchElement(_)) {
                    PulsarError::OptionNotFound {
                        locator: locator.to_string(),
                        label: label.to_string(),
                    }
                } else {
                    classify(e, locator)
                }
            })
    }

    async fn goto(&self, url: &str) -> PulsarResult<()> {
        self.driver.goto(url).await.map_err(PulsarError::from)
    }

    async fn current_url(&self) -> PulsarResult<String> {
        self.driver
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(PulsarError::from)
    }

    async fn maximize_window(&self) -> PulsarResult<()> {
        self.driver.maximize_window().await.map_err(PulsarError::from)
    }

    async fn set_implicit_wait(&self, timeout: Duration) -> PulsarResult<()> {
        self.driver
            .set_implicit_wait_timeout(timeout)
            .await
            .map_err(PulsarError::from)
    }

    async fn quit(&self) -> PulsarResult<()> {
        // WebDriver handles are reference-counted; quitting through a
        // clone ends the underlying session
        self.driver.clone().quit().await.map_err(PulsarError::from)
    }
}

impl From<WebDriverError> for PulsarError {
    fn from(err: WebDriverError) -> Self {
        Self::Engine {
            message: err.to_string(),
        }
    }
}
