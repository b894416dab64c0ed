//! Engine seam over the browser-automation engine.
//!
//! The automation engine is an external collaborator: it owns element
//! lookup, state queries, and interaction primitives. This crate talks to
//! it through the [`Engine`] trait so implementations can be swapped.
//!
//! # Implementations
//!
//! - `WebDriverEngine` — default, wraps the `thirtyfour` WebDriver client
//!   (requires the `webdriver` feature)
//! - [`MockEngine`] — scripted in-memory elements for unit testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::locator::Locator;
use crate::result::{PulsarError, PulsarResult};

/// Abstract engine trait for browser automation primitives.
///
/// Every element operation is keyed by a [`Locator`] and performs its own
/// lookup; there are no element handles to go stale between calls. A
/// lookup miss surfaces as [`PulsarError::ElementNotFound`].
#[async_trait]
pub trait Engine: Send + Sync {
    /// Probe that the locator matches an element
    async fn find(&self, locator: &Locator) -> PulsarResult<()>;

    /// Read the element's rendered text
    async fn text(&self, locator: &Locator) -> PulsarResult<String>;

    /// Whether the element is in the checked/selected state
    async fn is_selected(&self, locator: &Locator) -> PulsarResult<bool>;

    /// Whether the element is displayed (visible)
    async fn is_displayed(&self, locator: &Locator) -> PulsarResult<bool>;

    /// Whether the element is enabled
    async fn is_enabled(&self, locator: &Locator) -> PulsarResult<bool>;

    /// Click the element
    async fn click(&self, locator: &Locator) -> PulsarResult<()>;

    /// Clear the element's current value
    async fn clear(&self, locator: &Locator) -> PulsarResult<()>;

    /// Type text into the element
    async fn type_text(&self, locator: &Locator, text: &str) -> PulsarResult<()>;

    /// Scroll the element into the viewport
    async fn scroll_into_view(&self, locator: &Locator) -> PulsarResult<()>;

    /// Move the pointer over the element
    async fn hover(&self, locator: &Locator) -> PulsarResult<()>;

    /// Choose the option whose visible label matches `label` exactly
    async fn select_by_visible_text(&self, locator: &Locator, label: &str) -> PulsarResult<()>;

    /// Navigate to a URL
    async fn goto(&self, url: &str) -> PulsarResult<()>;

    /// Current page URL
    async fn current_url(&self) -> PulsarResult<String>;

    /// Maximize the browser viewport
    async fn maximize_window(&self) -> PulsarResult<()>;

    /// Apply the engine-level implicit wait
    async fn set_implicit_wait(&self, timeout: Duration) -> PulsarResult<()>;

    /// End the browser session
    async fn quit(&self) -> PulsarResult<()>;
}

#[async_trait]
impl<T: Engine + ?Sized> Engine for std::sync::Arc<T> {
    async fn find(&self, locator: &Locator) -> PulsarResult<()> {
        (**self).find(locator).await
    }
    async fn text(&self, locator: &Locator) -> PulsarResult<String> {
        (**self).text(locator).await
    }
    async fn is_selected(&self, locator: &Locator) -> PulsarResult<bool> {
        (**self).is_selected(locator).await
    }
    async fn is_displayed(&self, locator: &Locator) -> PulsarResult<bool> {
        (**self).is_displayed(locator).await
    }
    async fn is_enabled(&self, locator: &Locator) -> PulsarResult<bool> {
        (**self).is_enabled(locator).await
    }
    async fn click(&self, locator: &Locator) -> PulsarResult<()> {
        (**self).click(locator).await
    }
    async fn clear(&self, locator: &Locator) -> PulsarResult<()> {
        (**self).clear(locator).await
    }
    async fn type_text(&self, locator: &Locator, text: &str) -> PulsarResult<()> {
        (**self).type_text(locator, text).await
    }
    async fn scroll_into_view(&self, locator: &Locator) -> PulsarResult<()> {
        (**self).scroll_into_view(locator).await
    }
    async fn hover(&self, locator: &Locator) -> PulsarResult<()> {
        (**self).hover(locator).await
    }
    async fn select_by_visible_text(&self, locator: &Locator, label: &str) -> PulsarResult<()> {
        (**self).select_by_visible_text(locator, label).await
    }
    async fn goto(&self, url: &str) -> PulsarResult<()> {
        (**self).goto(url).await
    }
    async fn current_url(&self) -> PulsarResult<String> {
        (**self).current_url().await
    }
    async fn maximize_window(&self) -> PulsarResult<()> {
        (**self).maximize_window().await
    }
    async fn set_implicit_wait(&self, timeout: Duration) -> PulsarResult<()> {
        (**self).set_implicit_wait(timeout).await
    }
    async fn quit(&self) -> PulsarResult<()> {
        (**self).quit().await
    }
}

// ============================================================================
// Mock engine for unit testing
// ============================================================================

/// Successive values returned by repeated reads of the same property.
///
/// The last frame repeats forever, so a one-frame timeline is a constant.
#[derive(Debug, Clone)]
struct Timeline<T> {
    frames: Vec<T>,
    cursor: usize,
}

impl<T: Clone> Timeline<T> {
    fn fixed(value: T) -> Self {
        Self {
            frames: vec![value],
            cursor: 0,
        }
    }

    fn sequence(frames: Vec<T>, fallback: T) -> Self {
        let frames = if frames.is_empty() {
            vec![fallback]
        } else {
            frames
        };
        Self { frames, cursor: 0 }
    }

    fn next(&mut self) -> T {
        let idx = self.cursor.min(self.frames.len() - 1);
        self.cursor += 1;
        self.frames[idx].clone()
    }
}

/// A scripted element inside a [`MockEngine`].
///
/// Text, visibility, and enablement can be given as sequences of frames;
/// each read consumes a frame and the last frame then repeats. This models
/// pages whose state settles over time without any clocks in tests.
#[derive(Debug, Clone)]
pub struct MockElement {
    text: Timeline<String>,
    displayed: Timeline<bool>,
    enabled: Timeline<bool>,
    selected: bool,
    value: String,
    options: Option<Vec<String>>,
    selected_option: Option<String>,
    failing_clicks: u32,
    hover_fails: bool,
    text_fails: bool,
    text_tracks_value: bool,
}

impl Default for MockElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MockElement {
    /// A visible, enabled, unselected element with empty text
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: Timeline::fixed(String::new()),
            displayed: Timeline::fixed(true),
            enabled: Timeline::fixed(true),
            selected: false,
            value: String::new(),
            options: None,
            selected_option: None,
            failing_clicks: 0,
            hover_fails: false,
            text_fails: false,
            text_tracks_value: false,
        }
    }

    /// Constant text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Timeline::fixed(text.into());
        self
    }

    /// Text content that changes across successive reads
    #[must_use]
    pub fn with_text_sequence<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let frames: Vec<String> = frames.into_iter().map(Into::into).collect();
        self.text = Timeline::sequence(frames, String::new());
        self
    }

    /// Initial checked/selected state
    #[must_use]
    pub const fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Constant visibility
    #[must_use]
    pub fn with_displayed(mut self, displayed: bool) -> Self {
        self.displayed = Timeline::fixed(displayed);
        self
    }

    /// Visibility that changes across successive probes
    #[must_use]
    pub fn with_displayed_sequence(mut self, frames: Vec<bool>) -> Self {
        self.displayed = Timeline::sequence(frames, true);
        self
    }

    /// Constant enablement
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Timeline::fixed(enabled);
        self
    }

    /// Enablement that changes across successive probes
    #[must_use]
    pub fn with_enabled_sequence(mut self, frames: Vec<bool>) -> Self {
        self.enabled = Timeline::sequence(frames, true);
        self
    }

    /// Make the first `n` clicks fail as not-interactable
    #[must_use]
    pub const fn with_failing_clicks(mut self, n: u32) -> Self {
        self.failing_clicks = n;
        self
    }

    /// Make pointer hover fail with an engine error
    #[must_use]
    pub const fn with_failing_hover(mut self) -> Self {
        self.hover_fails = true;
        self
    }

    /// Make text reads fail with an engine error
    #[must_use]
    pub const fn with_failing_text(mut self) -> Self {
        self.text_fails = true;
        self
    }

    /// Turn the element into a selection control with these options
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Make text reads mirror the typed value (input-like element)
    #[must_use]
    pub const fn with_text_tracking_value(mut self) -> Self {
        self.text_tracks_value = true;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    elements: HashMap<String, MockElement>,
    history: Vec<String>,
    url: String,
}

/// Scripted engine for unit testing.
///
/// Elements are registered up front; every trait call is recorded in a
/// call history that tests can assert on.
#[derive(Debug, Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
}

impl MockEngine {
    /// Create an empty mock engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scripted element under a locator
    #[must_use]
    pub fn with_element(self, locator: &Locator, element: MockElement) -> Self {
        self.lock().elements.insert(locator.to_string(), element);
        self
    }

    /// Snapshot of the recorded call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Number of recorded calls whose entry starts with `prefix`
    #[must_use]
    pub fn calls(&self, prefix: &str) -> usize {
        self.lock()
            .history
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }

    /// Current checked/selected state of a registered element
    #[must_use]
    pub fn selected_state(&self, locator: &Locator) -> Option<bool> {
        self.lock()
            .elements
            .get(&locator.to_string())
            .map(|el| el.selected)
    }

    /// Current typed value of a registered element
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> Option<String> {
        self.lock()
            .elements
            .get(&locator.to_string())
            .map(|el| el.value.clone())
    }

    /// The option chosen on a registered selection control
    #[must_use]
    pub fn chosen_option(&self, locator: &Locator) -> Option<String> {
        self.lock()
            .elements
            .get(&locator.to_string())
            .and_then(|el| el.selected_option.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock")
    }

    fn with_element_mut<T>(
        &self,
        locator: &Locator,
        record: &str,
        f: impl FnOnce(&mut MockElement, &str) -> PulsarResult<T>,
    ) -> PulsarResult<T> {
        let mut state = self.lock();
        let key = locator.to_string();
        state.history.push(format!("{record}:{key}"));
        match state.elements.get_mut(&key) {
            Some(element) => f(element, &key),
            None => Err(PulsarError::ElementNotFound { locator: key }),
        }
    }

    fn record(&self, entry: impl Into<String>) {
        self.lock().history.push(entry.into());
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn find(&self, locator: &Locator) -> PulsarResult<()> {
        self.with_element_mut(locator, "find", |_, _| Ok(()))
    }

    async fn text(&self, locator: &Locator) -> PulsarResult<String> {
        self.with_element_mut(locator, "text", |el, _| {
            if el.text_fails {
                return Err(PulsarError::Engine {
                    message: "text read failed".to_string(),
                });
            }
            if el.text_tracks_value {
                Ok(el.value.clone())
            } else {
                Ok(el.text.next())
            }
        })
    }

    async fn is_selected(&self, locator: &Locator) -> PulsarResult<bool> {
        self.with_element_mut(locator, "is_selected", |el, _| Ok(el.selected))
    }

    async fn is_displayed(&self, locator: &Locator) -> PulsarResult<bool> {
        self.with_element_mut(locator, "is_displayed", |el, _| Ok(el.displayed.next()))
    }

    async fn is_enabled(&self, locator: &Locator) -> PulsarResult<bool> {
        self.with_element_mut(locator, "is_enabled", |el, _| Ok(el.enabled.next()))
    }

    async fn click(&self, locator: &Locator) -> PulsarResult<()> {
        self.with_element_mut(locator, "click", |el, key| {
            if el.failing_clicks > 0 {
                el.failing_clicks -= 1;
                return Err(PulsarError::NotInteractable {
                    locator: key.to_string(),
                });
            }
            // form controls toggle their checked state on click
            el.selected = !el.selected;
            Ok(())
        })
    }

    async fn clear(&self, locator: &Locator) -> PulsarResult<()> {
        self.with_element_mut(locator, "clear", |el, _| {
            el.value.clear();
            Ok(())
        })
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> PulsarResult<()> {
        self.with_element_mut(locator, "type", |el, _| {
            // appends, the way real keystrokes do; callers must clear first
            el.value.push_str(text);
            Ok(())
        })
    }

    async fn scroll_into_view(&self, locator: &Locator) -> PulsarResult<()> {
        self.with_element_mut(locator, "scroll_into_view", |_, _| Ok(()))
    }

    async fn hover(&self, locator: &Locator) -> PulsarResult<()> {
        self.with_element_mut(locator, "hover", |el, _| {
            if el.hover_fails {
                Err(PulsarError::Engine {
                    message: "pointer move rejected".to_string(),
                })
            } else {
                Ok(())
            }
        })
    }

    async fn select_by_visible_text(&self, locator: &Locator, label: &str) -> PulsarResult<()> {
        self.with_element_mut(locator, "select", |el, key| match &el.options {
            None => Err(PulsarError::NotASelect {
                locator: key.to_string(),
            }),
            Some(options) if !options.iter().any(|o| o == label) => {
                Err(PulsarError::OptionNotFound {
                    locator: key.to_string(),
                    label: label.to_string(),
                })
            }
            Some(_) => {
                el.selected_option = Some(label.to_string());
                Ok(())
            }
        })
    }

    async fn goto(&self, url: &str) -> PulsarResult<()> {
        let mut state = self.lock();
        state.history.push(format!("goto:{url}"));
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> PulsarResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn maximize_window(&self) -> PulsarResult<()> {
        self.record("maximize_window");
        Ok(())
    }

    async fn set_implicit_wait(&self, timeout: Duration) -> PulsarResult<()> {
        self.record(format!("set_implicit_wait:{}", timeout.as_millis()));
        Ok(())
    }

    async fn quit(&self) -> PulsarResult<()> {
        self.record("quit");
        Ok(())
    }
}
