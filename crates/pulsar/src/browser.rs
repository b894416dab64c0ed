//! Browser kinds and launch options.
//!
//! The browser under automation is a closed set: Chrome, Firefox, Edge.
//! Each kind knows its native driver binary and the conventional port that
//! driver listens on. The Chrome path additionally carries a fixed set of
//! launch flags for CI/container environments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::{PulsarError, PulsarResult};

/// Chrome flags applied on every launch.
///
/// The sandbox and /dev/shm flags keep Chrome alive inside containers and
/// small VMs; remote-allow-origins is required by recent chromedriver
/// versions.
pub const CHROME_BASE_ARGS: &[&str] = &[
    "--remote-allow-origins=*",
    "--no-sandbox",
    "--disable-dev-shm-usage",
];

/// Chrome headless flag (the new headless mode).
pub const CHROME_HEADLESS_ARG: &str = "--headless=new";

/// Firefox headless flag.
pub const FIREFOX_HEADLESS_ARG: &str = "-headless";

/// Supported browser kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Google Chrome / Chromium
    Chrome,
    /// Mozilla Firefox
    Firefox,
    /// Microsoft Edge
    Edge,
}

impl BrowserKind {
    /// Canonical lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "edge",
        }
    }

    /// Native driver binary controlling this browser
    #[must_use]
    pub const fn driver_binary(&self) -> &'static str {
        match self {
            Self::Chrome => "chromedriver",
            Self::Firefox => "geckodriver",
            Self::Edge => "msedgedriver",
        }
    }

    /// Environment variable that overrides the driver binary location
    #[must_use]
    pub const fn driver_env_override(&self) -> &'static str {
        match self {
            Self::Chrome => "CHROMEDRIVER",
            Self::Firefox => "GECKODRIVER",
            Self::Edge => "MSEDGEDRIVER",
        }
    }

    /// Conventional port the driver binary listens on
    #[must_use]
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::Chrome => 9515,
            Self::Firefox => 4444,
            Self::Edge => 17556,
        }
    }

    /// Launch args for this kind.
    ///
    /// Chrome gets the fixed CI/container flag set plus the headless flag
    /// when asked. Firefox gets only its headless flag when asked. Edge
    /// launches with default options.
    #[must_use]
    pub fn launch_args(&self, headless: bool) -> Vec<&'static str> {
        match self {
            Self::Chrome => {
                let mut args = CHROME_BASE_ARGS.to_vec();
                if headless {
                    args.push(CHROME_HEADLESS_ARG);
                }
                args
            }
            Self::Firefox => {
                if headless {
                    vec![FIREFOX_HEADLESS_ARG]
                } else {
                    Vec::new()
                }
            }
            Self::Edge => Vec::new(),
        }
    }
}

impl FromStr for BrowserKind {
    type Err = PulsarError;

    fn from_str(s: &str) -> PulsarResult<Self> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            "edge" => Ok(Self::Edge),
            _ => Err(PulsarError::UnsupportedBrowser {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the host defaults to headless operation.
///
/// Mirrors the original environment probe: the desktop GUI OS (Windows)
/// runs headed, everything else headless. A `SessionConfig` headless
/// override takes precedence over this default.
#[must_use]
pub const fn default_headless() -> bool {
    !cfg!(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_all_kinds() {
            assert_eq!("chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
            assert_eq!(
                "firefox".parse::<BrowserKind>().unwrap(),
                BrowserKind::Firefox
            );
            assert_eq!("edge".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
        }

        #[test]
        fn test_parse_is_case_insensitive() {
            assert_eq!("Chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
            assert_eq!(
                "FIREFOX".parse::<BrowserKind>().unwrap(),
                BrowserKind::Firefox
            );
            assert_eq!("EdGe".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
        }

        #[test]
        fn test_parse_unknown_is_typed_error() {
            let err = "safari".parse::<BrowserKind>().unwrap_err();
            assert!(matches!(
                err,
                PulsarError::UnsupportedBrowser { value } if value == "safari"
            ));
        }

        #[test]
        fn test_parse_empty_is_typed_error() {
            assert!("".parse::<BrowserKind>().is_err());
        }

        #[test]
        fn test_display_round_trip() {
            for kind in [BrowserKind::Chrome, BrowserKind::Firefox, BrowserKind::Edge] {
                let round_tripped: BrowserKind = kind.to_string().parse().unwrap();
                assert_eq!(round_tripped, kind);
            }
        }
    }

    mod driver_tests {
        use super::*;

        #[test]
        fn test_driver_binaries() {
            assert_eq!(BrowserKind::Chrome.driver_binary(), "chromedriver");
            assert_eq!(BrowserKind::Firefox.driver_binary(), "geckodriver");
            assert_eq!(BrowserKind::Edge.driver_binary(), "msedgedriver");
        }

        #[test]
        fn test_ports_are_distinct() {
            let ports = [
                BrowserKind::Chrome.default_port(),
                BrowserKind::Firefox.default_port(),
                BrowserKind::Edge.default_port(),
            ];
            assert_ne!(ports[0], ports[1]);
            assert_ne!(ports[1], ports[2]);
            assert_ne!(ports[0], ports[2]);
        }

        #[test]
        fn test_env_overrides() {
            assert_eq!(BrowserKind::Chrome.driver_env_override(), "CHROMEDRIVER");
            assert_eq!(BrowserKind::Firefox.driver_env_override(), "GECKODRIVER");
            assert_eq!(BrowserKind::Edge.driver_env_override(), "MSEDGEDRIVER");
        }
    }

    mod launch_args_tests {
        use super::*;

        #[test]
        fn test_chrome_base_args_always_present() {
            let args = BrowserKind::Chrome.launch_args(false);
            assert!(args.contains(&"--no-sandbox"));
            assert!(args.contains(&"--disable-dev-shm-usage"));
            assert!(args.contains(&"--remote-allow-origins=*"));
            assert!(!args.contains(&CHROME_HEADLESS_ARG));
        }

        #[test]
        fn test_chrome_headless_appended() {
            let args = BrowserKind::Chrome.launch_args(true);
            assert!(args.contains(&CHROME_HEADLESS_ARG));
        }

        #[test]
        fn test_firefox_args() {
            assert!(BrowserKind::Firefox.launch_args(false).is_empty());
            assert_eq!(
                BrowserKind::Firefox.launch_args(true),
                vec![FIREFOX_HEADLESS_ARG]
            );
        }

        #[test]
        fn test_edge_has_no_custom_flags() {
            assert!(BrowserKind::Edge.launch_args(false).is_empty());
            assert!(BrowserKind::Edge.launch_args(true).is_empty());
        }
    }
}
