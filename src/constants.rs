//! Application-wide constants.
//!
//! This module defines the application name, configuration location, and
//! the default timings and thresholds of the page controllers.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Bistro UI";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "bistro-ui";

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "BistroUi";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "BISTRO_UI_CONFIG_DIR";

/// Scroll offset past which the bottom bar may appear.
pub const DEFAULT_BOTTOM_BAR_THRESHOLD: f64 = 120.0;

/// Delay between a navigation link click and the overlay closing.
pub const DEFAULT_LINK_CLOSE_DELAY_MS: u64 = 10;

/// Upper bound for any configured delay (one day).
pub const MAX_DELAY_MS: u64 = 86_400_000;

/// Lifetime of the confirmation notice.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3500;

/// Scroll offset past which the header hides while scrolling down.
pub const DEFAULT_HEADER_HIDE_AFTER_PX: f64 = 50.0;

/// Minimum horizontal swipe distance for the carousel.
pub const DEFAULT_SWIPE_THRESHOLD_PX: f64 = 40.0;

/// Confirmation notice text.
pub const DEFAULT_CONFIRMATION_MESSAGE: &str = "Thank you, we will call you back shortly";

/// Fallback label of the time picker.
pub const DEFAULT_TIME_PLACEHOLDER: &str = "Select time";

/// Fallback label of the party size picker.
pub const DEFAULT_PERSONS_PLACEHOLDER: &str = "Select persons";

/// `aria-label` of the menu toggle while the overlay is closed.
pub const OPEN_MENU_LABEL: &str = "Open menu";

/// `aria-label` of the menu toggle while the overlay is open.
pub const CLOSE_MENU_LABEL: &str = "Close menu";
