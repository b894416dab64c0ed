//! Session configuration and memoized bootstrap.
//!
//! A [`SessionFactory`] constructs at most one browser session per factory
//! lifetime: the handle is created on first access and every later access
//! returns the same handle. The factory owns teardown exclusively — there
//! is no way to reach the engine handle except through the factory's
//! session.
//!
//! Bootstrap order: provision the native driver, build capabilities,
//! connect the session, maximize the viewport, apply the implicit-wait
//! budget. Provisioning and connection failures propagate to the caller
//! untouched; this component performs no retry and no recovery.

use std::future::Future;

use tokio::sync::OnceCell;
use tracing::info;

use crate::actions::Actions;
use crate::browser::{default_headless, BrowserKind};
use crate::engine::Engine;
use crate::result::PulsarResult;
use crate::wait::WaitBudget;

/// Environment variable naming the browser kind for [`SessionConfig::from_env`]
pub const BROWSER_ENV: &str = "PULSAR_BROWSER";

/// Environment variable overriding the headless default
pub const HEADLESS_ENV: &str = "PULSAR_HEADLESS";

/// Environment variable pointing at an already-running WebDriver endpoint
pub const WEBDRIVER_URL_ENV: &str = "PULSAR_WEBDRIVER_URL";

/// Configuration for a browser session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    kind: BrowserKind,
    implicit_wait: WaitBudget,
    headless: Option<bool>,
    webdriver_url: Option<String>,
    extra_args: Vec<String>,
}

impl SessionConfig {
    /// Configuration for the given browser kind with default settings
    #[must_use]
    pub fn new(kind: BrowserKind) -> Self {
        Self {
            kind,
            implicit_wait: WaitBudget::default(),
            headless: None,
            webdriver_url: None,
            extra_args: Vec::new(),
        }
    }

    /// Read configuration from the environment.
    ///
    /// `PULSAR_BROWSER` selects the kind (required; unknown or absent
    /// values are a typed error, never a null handle). `PULSAR_HEADLESS`
    /// and `PULSAR_WEBDRIVER_URL` are optional overrides.
    ///
    /// # Errors
    ///
    /// Returns [`PulsarError::UnsupportedBrowser`] when `PULSAR_BROWSER`
    /// is unset or names an unknown browser.
    pub fn from_env() -> PulsarResult<Self> {
        let raw = std::env::var(BROWSER_ENV).unwrap_or_default();
        let mut config = Self::new(raw.parse()?);

        if let Ok(value) = std::env::var(HEADLESS_ENV) {
            config.headless = Some(matches!(
                value.to_lowercase().as_str(),
                "1" | "true" | "yes"
            ));
        }
        if let Ok(url) = std::env::var(WEBDRIVER_URL_ENV) {
            if !url.is_empty() {
                config.webdriver_url = Some(url);
            }
        }
        Ok(config)
    }

    /// Set the implicit-wait budget applied to the engine at bootstrap
    #[must_use]
    pub const fn with_implicit_wait(mut self, budget: WaitBudget) -> Self {
        self.implicit_wait = budget;
        self
    }

    /// Force headless on or off, overriding the host-OS default
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    /// Connect to an already-running WebDriver endpoint instead of
    /// provisioning a driver binary
    #[must_use]
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = Some(url.into());
        self
    }

    /// Append an extra launch argument (Chrome path only)
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// The browser kind
    #[must_use]
    pub const fn kind(&self) -> BrowserKind {
        self.kind
    }

    /// The implicit-wait budget
    #[must_use]
    pub const fn implicit_wait(&self) -> WaitBudget {
        self.implicit_wait
    }

    /// Resolved headless decision: the explicit override when present,
    /// otherwise the host-OS default
    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless.unwrap_or(default_headless())
    }

    /// Configured WebDriver endpoint, if any
    #[must_use]
    pub fn webdriver_url(&self) -> Option<&str> {
        self.webdriver_url.as_deref()
    }

    /// Extra launch arguments
    #[must_use]
    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }
}

/// A live browser session: one engine handle plus its browser kind.
///
/// The session owns the handle; teardown happens exactly once, through
/// [`Session::quit`].
pub struct Session {
    kind: BrowserKind,
    engine: Box<dyn Engine>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("kind", &self.kind).finish()
    }
}

impl Session {
    /// Finish bootstrapping a freshly constructed engine handle:
    /// maximize the viewport unconditionally, then apply the
    /// implicit-wait budget.
    ///
    /// # Errors
    ///
    /// Propagates engine failures from either bootstrap step.
    pub async fn bootstrap(config: &SessionConfig, engine: Box<dyn Engine>) -> PulsarResult<Self> {
        engine.maximize_window().await?;
        engine
            .set_implicit_wait(config.implicit_wait().as_duration())
            .await?;
        info!(
            target: "pulsar",
            browser = %config.kind(),
            implicit_wait_secs = config.implicit_wait().as_secs(),
            "browser session ready"
        );
        Ok(Self {
            kind: config.kind(),
            engine,
        })
    }

    /// The browser kind this session drives
    #[must_use]
    pub const fn kind(&self) -> BrowserKind {
        self.kind
    }

    /// Borrow the engine handle
    #[must_use]
    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    /// Interaction helpers borrowing this session with the given wait budget
    #[must_use]
    pub fn actions(&self, budget: WaitBudget) -> Actions<'_> {
        Actions::new(self.engine.as_ref(), budget)
    }

    /// Navigate to a URL
    pub async fn goto(&self, url: &str) -> PulsarResult<()> {
        self.engine.goto(url).await
    }

    /// Current page URL
    pub async fn current_url(&self) -> PulsarResult<String> {
        self.engine.current_url().await
    }

    /// End the session and release the engine handle
    pub async fn quit(self) -> PulsarResult<()> {
        self.engine.quit().await
    }
}

/// Get-or-create factory for exactly one [`Session`].
#[derive(Debug)]
pub struct SessionFactory {
    config: SessionConfig,
    cell: OnceCell<Session>,
}

impl SessionFactory {
    /// Create a factory; no session is constructed until first access
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self {
            config,
            cell: OnceCell::const_new(),
        }
    }

    /// The factory's configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The session, constructing it on first call.
    ///
    /// Later calls return the already-constructed handle; no second
    /// construction occurs.
    ///
    /// # Errors
    ///
    /// Propagates provisioning and launch failures from the bootstrap.
    pub async fn session(&self) -> PulsarResult<&Session> {
        self.session_with(move || launch(&self.config)).await
    }

    /// The session, constructing it with a caller-supplied bootstrap on
    /// first call.
    ///
    /// This is the seam for driving the factory with a custom [`Engine`]
    /// (an in-memory mock, a remote grid adapter). `init` runs at most
    /// once per factory lifetime.
    ///
    /// # Errors
    ///
    /// Propagates the bootstrap's error; a failed bootstrap leaves the
    /// factory empty so a later call may try again.
    pub async fn session_with<F, Fut>(&self, init: F) -> PulsarResult<&Session>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PulsarResult<Session>>,
    {
        self.cell.get_or_try_init(init).await
    }

    /// Tear down the factory, quitting the session if one was constructed
    pub async fn quit(self) -> PulsarResult<()> {
        match self.cell.into_inner() {
            Some(session) => session.quit().await,
            None => Ok(()),
        }
    }
}

#[cfg(feature = "webdriver")]
async fn launch(config: &SessionConfig) -> PulsarResult<Session> {
    let engine = crate::webdriver::launch(config).await?;
    Session::bootstrap(config, engine).await
}

#[cfg(not(feature = "webdriver"))]
async fn launch(_config: &SessionConfig) -> PulsarResult<Session> {
    Err(crate::result::PulsarError::Launch {
        message: "pulsar was built without the `webdriver` feature; \
                  seed the factory through `session_with` instead"
            .to_string(),
    })
}
