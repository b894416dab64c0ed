//! Interaction helpers with bounded waiting and bounded retry.
//!
//! [`Actions`] borrows an already-constructed session handle and a fixed
//! [`WaitBudget`]; it never constructs or owns an engine. Each operation
//! is stateless beyond that pair, and each bounded wait measures its own
//! deadline from the start of the call.
//!
//! Error policy: failures surface as typed errors. The only two places an
//! error converts into a normal return are the ones the operations define
//! for themselves — a timeout on the boolean text check yields `false`,
//! and a timeout waiting for non-empty text falls back to one immediate
//! unwaited read.

use tracing::{debug, warn};

use crate::engine::Engine;
use crate::locator::Locator;
use crate::result::{PulsarError, PulsarResult};
use crate::wait::{poll_until, WaitBudget};

/// Number of attempts the retrying click performs
pub const CLICK_ATTEMPTS: u32 = 3;

/// Interaction helpers over a borrowed engine handle
pub struct Actions<'a> {
    engine: &'a dyn Engine,
    budget: WaitBudget,
}

impl std::fmt::Debug for Actions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actions")
            .field("budget", &self.budget)
            .finish()
    }
}

impl<'a> Actions<'a> {
    /// Create helpers over a borrowed engine with a fixed wait budget
    #[must_use]
    pub fn new(engine: &'a dyn Engine, budget: WaitBudget) -> Self {
        Self { engine, budget }
    }

    /// The wait budget applied to every explicit wait
    #[must_use]
    pub const fn budget(&self) -> WaitBudget {
        self.budget
    }

    /// Check a checkbox if it is not already checked.
    ///
    /// `label` is a diagnostic name for the control; lookup uses only the
    /// locator.
    ///
    /// # Errors
    ///
    /// Lookup and interaction failures propagate untouched.
    pub async fn check_checkbox(&self, label: &str, locator: &Locator) -> PulsarResult<()> {
        debug!(target: "pulsar", label, locator = %locator, "check checkbox");
        if !self.engine.is_selected(locator).await? {
            self.engine.click(locator).await?;
        }
        Ok(())
    }

    /// Select a radio button if it is not already selected.
    ///
    /// `label` is a diagnostic name for the control; lookup uses only the
    /// locator.
    ///
    /// # Errors
    ///
    /// Lookup and interaction failures propagate untouched.
    pub async fn select_radio(&self, label: &str, locator: &Locator) -> PulsarResult<()> {
        debug!(target: "pulsar", label, locator = %locator, "select radio button");
        if !self.engine.is_selected(locator).await? {
            self.engine.click(locator).await?;
        }
        Ok(())
    }

    /// Whether the element's text comes to contain `expected` within the
    /// wait budget.
    ///
    /// A locator that matches nothing counts as condition-not-yet and
    /// keeps polling; only the timeout outcome converts to `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Engine failures other than timeout propagate untouched.
    pub async fn is_text_present(&self, locator: &Locator, expected: &str) -> PulsarResult<bool> {
        debug!(target: "pulsar", locator = %locator, expected, "wait for text");
        let outcome = poll_until(self.budget, || async move {
            match self.engine.text(locator).await {
                Ok(text) if text.contains(expected) => Ok(Some(())),
                Ok(_) => Ok(None),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await;

        match outcome {
            Ok(()) => Ok(true),
            Err(e) if e.is_timeout() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// The element's text, waiting for it to become non-empty.
    ///
    /// When the text stays empty past the budget, falls back to one
    /// immediate unwaited read — which may legitimately return an empty
    /// string or fail.
    ///
    /// # Errors
    ///
    /// Engine failures other than timeout propagate untouched; the
    /// fallback read's failure propagates as-is.
    pub async fn element_text(&self, locator: &Locator) -> PulsarResult<String> {
        let outcome = poll_until(self.budget, || async move {
            match self.engine.text(locator).await {
                Ok(text) if !text.is_empty() => Ok(Some(text)),
                Ok(_) => Ok(None),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await;

        match outcome {
            Ok(text) => Ok(text),
            Err(e) if e.is_timeout() => {
                debug!(target: "pulsar", locator = %locator, "text stayed empty; immediate read");
                self.engine.text(locator).await
            }
            Err(e) => Err(e),
        }
    }

    /// Click the element, retrying transient failures.
    ///
    /// Each of the up-to-[`CLICK_ATTEMPTS`] attempts waits (bounded by the
    /// budget) for the element to be displayed and enabled, then clicks.
    /// There is no backoff between attempts; this absorbs transient
    /// staleness and overlay errors, nothing more.
    ///
    /// # Errors
    ///
    /// Returns [`PulsarError::RetriesExhausted`] carrying the final
    /// attempt's failure once every attempt has failed.
    pub async fn click(&self, locator: &Locator) -> PulsarResult<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_click(locator).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < CLICK_ATTEMPTS => {
                    warn!(
                        target: "pulsar",
                        locator = %locator,
                        attempt,
                        error = %e,
                        "click attempt failed; retrying"
                    );
                }
                Err(e) => {
                    return Err(PulsarError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(e),
                    })
                }
            }
        }
    }

    async fn try_click(&self, locator: &Locator) -> PulsarResult<()> {
        poll_until(self.budget, || async move {
            let displayed = match self.engine.is_displayed(locator).await {
                Ok(v) => v,
                Err(e) if e.is_not_found() => return Ok(None),
                Err(e) => return Err(e),
            };
            if !displayed {
                return Ok(None);
            }
            let enabled = self.engine.is_enabled(locator).await?;
            Ok(enabled.then_some(()))
        })
        .await?;
        self.engine.click(locator).await
    }

    /// Replace the field's content with `new_text`.
    ///
    /// Scrolls the element into view and moves the pointer over it
    /// (best-effort; a hover failure is logged and ignored), then clears
    /// the existing content and types the new text. No wait, no retry.
    ///
    /// # Errors
    ///
    /// Lookup, scroll, clear, and type failures propagate untouched.
    pub async fn update_field(&self, locator: &Locator, new_text: &str) -> PulsarResult<()> {
        debug!(target: "pulsar", locator = %locator, "update field");
        self.engine.scroll_into_view(locator).await?;
        if let Err(e) = self.engine.hover(locator).await {
            debug!(target: "pulsar", locator = %locator, error = %e, "hover failed; continuing");
        }
        self.engine.clear(locator).await?;
        self.engine.type_text(locator, new_text).await
    }

    /// Choose the option whose visible label matches `visible_text`
    /// exactly. No wait, no retry.
    ///
    /// # Errors
    ///
    /// [`PulsarError::OptionNotFound`] when no option carries that label,
    /// [`PulsarError::NotASelect`] when the element is not a selection
    /// control; lookup failures propagate untouched.
    pub async fn select_visible_text(
        &self,
        locator: &Locator,
        visible_text: &str,
    ) -> PulsarResult<()> {
        debug!(target: "pulsar", locator = %locator, option = visible_text, "select option");
        self.engine.select_by_visible_text(locator, visible_text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockElement, MockEngine};

    fn budget() -> WaitBudget {
        WaitBudget::from_secs(1)
    }

    fn zero_budget() -> WaitBudget {
        WaitBudget::from_secs(0)
    }

    mod checkbox_tests {
        use super::*;

        #[tokio::test]
        async fn test_unchecked_checkbox_is_clicked() {
            let terms = Locator::id("terms");
            let engine = MockEngine::new().with_element(&terms, MockElement::new());
            let actions = Actions::new(&engine, budget());

            actions.check_checkbox("Accept terms", &terms).await.unwrap();

            assert_eq!(engine.calls("click"), 1);
            assert_eq!(engine.selected_state(&terms), Some(true));
        }

        #[tokio::test]
        async fn test_checked_checkbox_is_left_alone() {
            let terms = Locator::id("terms");
            let engine = MockEngine::new()
                .with_element(&terms, MockElement::new().with_selected(true));
            let actions = Actions::new(&engine, budget());

            actions.check_checkbox("Accept terms", &terms).await.unwrap();

            assert_eq!(engine.calls("click"), 0);
            assert_eq!(engine.selected_state(&terms), Some(true));
        }

        #[tokio::test]
        async fn test_missing_checkbox_propagates() {
            let engine = MockEngine::new();
            let actions = Actions::new(&engine, budget());
            let err = actions
                .check_checkbox("Accept terms", &Locator::id("terms"))
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn test_unselected_radio_is_clicked() {
            let express = Locator::id("shipping-express");
            let engine = MockEngine::new().with_element(&express, MockElement::new());
            let actions = Actions::new(&engine, budget());

            actions.select_radio("Express", &express).await.unwrap();
            assert_eq!(engine.selected_state(&express), Some(true));
        }
    }

    mod text_presence_tests {
        use super::*;

        #[tokio::test]
        async fn test_text_arriving_within_budget_is_true() {
            let status = Locator::id("status");
            let engine = MockEngine::new().with_element(
                &status,
                MockElement::new().with_text_sequence(["Loading", "Ready"]),
            );
            let actions = Actions::new(&engine, WaitBudget::from_secs(2));

            assert!(actions.is_text_present(&status, "Ready").await.unwrap());
        }

        #[tokio::test]
        async fn test_contains_match_is_enough() {
            let status = Locator::id("status");
            let engine = MockEngine::new()
                .with_element(&status, MockElement::new().with_text("State: Ready."));
            let actions = Actions::new(&engine, budget());

            assert!(actions.is_text_present(&status, "Ready").await.unwrap());
        }

        #[tokio::test]
        async fn test_timeout_converts_to_false() {
            let status = Locator::id("status");
            let engine = MockEngine::new()
                .with_element(&status, MockElement::new().with_text("Loading"));
            let actions = Actions::new(&engine, zero_budget());

            assert!(!actions.is_text_present(&status, "Ready").await.unwrap());
        }

        #[tokio::test]
        async fn test_missing_element_polls_then_false() {
            let engine = MockEngine::new();
            let actions = Actions::new(&engine, zero_budget());
            // not-found counts as condition-not-yet, then the budget runs out
            assert!(!actions
                .is_text_present(&Locator::id("ghost"), "Ready")
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_engine_failure_propagates() {
            let status = Locator::id("status");
            let engine = MockEngine::new()
                .with_element(&status, MockElement::new().with_failing_text());
            // generous budget: a real failure must not wait out the budget
            let actions = Actions::new(&engine, WaitBudget::from_secs(30));

            let err = actions
                .is_text_present(&status, "Ready")
                .await
                .unwrap_err();
            assert!(matches!(err, PulsarError::Engine { .. }));
        }
    }

    mod element_text_tests {
        use super::*;

        #[tokio::test]
        async fn test_text_transition_is_returned() {
            let status = Locator::id("status");
            let engine = MockEngine::new().with_element(
                &status,
                MockElement::new().with_text_sequence(["", "Done"]),
            );
            let actions = Actions::new(&engine, WaitBudget::from_secs(2));

            assert_eq!(actions.element_text(&status).await.unwrap(), "Done");
        }

        #[tokio::test]
        async fn test_persistently_empty_text_falls_back_to_empty() {
            let status = Locator::id("status");
            let engine = MockEngine::new().with_element(&status, MockElement::new());
            let actions = Actions::new(&engine, zero_budget());

            assert_eq!(actions.element_text(&status).await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_missing_element_fallback_read_fails() {
            let engine = MockEngine::new();
            let actions = Actions::new(&engine, zero_budget());
            let err = actions
                .element_text(&Locator::id("ghost"))
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        }
    }

    mod click_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_succeeds_first_attempt() {
            let submit = Locator::css("button[type='submit']");
            let engine = MockEngine::new().with_element(&submit, MockElement::new());
            let actions = Actions::new(&engine, budget());

            actions.click(&submit).await.unwrap();
            assert_eq!(engine.calls("click"), 1);
        }

        #[tokio::test]
        async fn test_transient_click_failures_are_retried() {
            let submit = Locator::css("button[type='submit']");
            let engine = MockEngine::new()
                .with_element(&submit, MockElement::new().with_failing_clicks(2));
            let actions = Actions::new(&engine, budget());

            actions.click(&submit).await.unwrap();
            assert_eq!(engine.calls("click"), 3);
        }

        #[tokio::test]
        async fn test_never_clickable_exhausts_exactly_three_attempts() {
            let submit = Locator::css("button[type='submit']");
            let engine = MockEngine::new()
                .with_element(&submit, MockElement::new().with_displayed(false));
            let actions = Actions::new(&engine, zero_budget());

            let err = actions.click(&submit).await.unwrap_err();
            match err {
                PulsarError::RetriesExhausted { attempts, source } => {
                    assert_eq!(attempts, CLICK_ATTEMPTS);
                    assert!(source.is_timeout());
                }
                other => panic!("expected RetriesExhausted, got {other}"),
            }
            // element never became clickable, so no click was issued
            assert_eq!(engine.calls("click"), 0);
        }

        #[tokio::test]
        async fn test_element_becoming_clickable_is_clicked() {
            let submit = Locator::css("button[type='submit']");
            let engine = MockEngine::new().with_element(
                &submit,
                MockElement::new().with_enabled_sequence(vec![false, false, true]),
            );
            let actions = Actions::new(&engine, WaitBudget::from_secs(2));

            actions.click(&submit).await.unwrap();
            assert_eq!(engine.calls("click"), 1);
        }
    }

    mod update_field_tests {
        use super::*;

        #[tokio::test]
        async fn test_clear_then_type_replaces_content() {
            let email = Locator::name("email");
            let engine = MockEngine::new().with_element(
                &email,
                MockElement::new().with_text_tracking_value(),
            );
            // field already holds stale content
            engine.type_text(&email, "old@example.com").await.unwrap();

            let actions = Actions::new(&engine, budget());
            actions
                .update_field(&email, "hello@example.com")
                .await
                .unwrap();

            assert_eq!(engine.value_of(&email).unwrap(), "hello@example.com");
            // round trip: reading the element text yields exactly the new value
            assert_eq!(
                actions.element_text(&email).await.unwrap(),
                "hello@example.com"
            );
        }

        #[tokio::test]
        async fn test_hover_failure_does_not_abort_update() {
            let email = Locator::name("email");
            let engine = MockEngine::new().with_element(
                &email,
                MockElement::new().with_failing_hover(),
            );
            let actions = Actions::new(&engine, budget());

            actions.update_field(&email, "x").await.unwrap();
            assert_eq!(engine.value_of(&email).unwrap(), "x");
        }

        #[tokio::test]
        async fn test_missing_field_propagates() {
            let engine = MockEngine::new();
            let actions = Actions::new(&engine, budget());
            let err = actions
                .update_field(&Locator::name("ghost"), "x")
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        }
    }

    mod select_tests {
        use super::*;

        #[tokio::test]
        async fn test_select_by_visible_text() {
            let country = Locator::id("country");
            let engine = MockEngine::new().with_element(
                &country,
                MockElement::new().with_options(["South Africa", "United Kingdom"]),
            );
            let actions = Actions::new(&engine, budget());

            actions
                .select_visible_text(&country, "South Africa")
                .await
                .unwrap();
            assert_eq!(engine.chosen_option(&country).unwrap(), "South Africa");
        }

        #[tokio::test]
        async fn test_absent_option_is_typed_error() {
            let country = Locator::id("country");
            let engine = MockEngine::new().with_element(
                &country,
                MockElement::new().with_options(["South Africa"]),
            );
            let actions = Actions::new(&engine, budget());

            let err = actions
                .select_visible_text(&country, "Atlantis")
                .await
                .unwrap_err();
            assert!(matches!(err, PulsarError::OptionNotFound { .. }));
        }

        #[tokio::test]
        async fn test_non_select_control_is_typed_error() {
            let div = Locator::css("div.widget");
            let engine = MockEngine::new().with_element(&div, MockElement::new());
            let actions = Actions::new(&engine, budget());

            let err = actions
                .select_visible_text(&div, "anything")
                .await
                .unwrap_err();
            assert!(matches!(err, PulsarError::NotASelect { .. }));
        }
    }
}
