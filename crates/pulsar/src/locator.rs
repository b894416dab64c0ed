//! Locator value types for element selection.
//!
//! A [`Locator`] is an immutable description of how to find one page
//! element: a selection strategy plus a selector string. Locators are
//! values; nothing in the crate mutates one after construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selection strategy for locating elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// CSS selector
    Css,
    /// Element id attribute
    Id,
    /// Element name attribute
    Name,
    /// XPath expression
    XPath,
    /// Tag name
    Tag,
    /// Full link text
    LinkText,
}

impl Strategy {
    /// Short name used when rendering a locator
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Id => "id",
            Self::Name => "name",
            Self::XPath => "xpath",
            Self::Tag => "tag",
            Self::LinkText => "link-text",
        }
    }
}

/// An immutable description of how to find one page element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    selector: String,
}

impl Locator {
    /// Create a locator with an explicit strategy
    #[must_use]
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    /// CSS selector locator (e.g. `button.primary`)
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Css, selector)
    }

    /// Id attribute locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(Strategy::Id, id)
    }

    /// Name attribute locator
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(Strategy::Name, name)
    }

    /// XPath locator
    #[must_use]
    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, xpath)
    }

    /// Tag name locator
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::new(Strategy::Tag, tag)
    }

    /// Link text locator
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, text)
    }

    /// The selection strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The selector string
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod constructor_tests {
        use super::*;

        #[test]
        fn test_css_locator() {
            let locator = Locator::css("button.primary");
            assert_eq!(locator.strategy(), Strategy::Css);
            assert_eq!(locator.selector(), "button.primary");
        }

        #[test]
        fn test_id_locator() {
            let locator = Locator::id("submit");
            assert_eq!(locator.strategy(), Strategy::Id);
            assert_eq!(locator.selector(), "submit");
        }

        #[test]
        fn test_xpath_locator() {
            let locator = Locator::xpath("//input[@name='q']");
            assert_eq!(locator.strategy(), Strategy::XPath);
        }

        #[test]
        fn test_explicit_strategy() {
            let locator = Locator::new(Strategy::LinkText, "Sign out");
            assert_eq!(locator.strategy(), Strategy::LinkText);
            assert_eq!(locator.selector(), "Sign out");
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_display_rendering() {
            assert_eq!(Locator::css("#main").to_string(), "css=#main");
            assert_eq!(Locator::id("submit").to_string(), "id=submit");
            assert_eq!(
                Locator::link_text("Sign out").to_string(),
                "link-text=Sign out"
            );
        }
    }

    mod value_semantics_tests {
        use super::*;

        #[test]
        fn test_locators_are_comparable() {
            assert_eq!(Locator::css("#a"), Locator::css("#a"));
            assert_ne!(Locator::css("#a"), Locator::id("#a"));
            assert_ne!(Locator::css("#a"), Locator::css("#b"));
        }

        #[test]
        fn test_clone_is_identical() {
            let locator = Locator::name("email");
            assert_eq!(locator.clone(), locator);
        }
    }
}
