//! Configuration management for the page controllers.
//!
//! This module handles loading, validating, and saving configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_BOTTOM_BAR_THRESHOLD, DEFAULT_CONFIRMATION_MESSAGE,
    DEFAULT_HEADER_HIDE_AFTER_PX, DEFAULT_LINK_CLOSE_DELAY_MS, DEFAULT_PERSONS_PLACEHOLDER,
    DEFAULT_SWIPE_THRESHOLD_PX, DEFAULT_TIME_PLACEHOLDER, DEFAULT_TOAST_DURATION_MS, MAX_DELAY_MS,
};

/// Sticky bottom bar settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BottomBarConfig {
    /// Scroll offset (px) past which the bar may show. A `data-threshold`
    /// attribute on the bar overrides it.
    pub threshold: f64,
}

impl Default for BottomBarConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BOTTOM_BAR_THRESHOLD,
        }
    }
}

/// Motion preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MotionConfig {
    /// Mirrors `prefers-reduced-motion: reduce`; height animations snap
    pub reduced_motion: bool,
}

/// Navigation overlay settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Delay between a link click and the overlay closing, so the active
    /// state renders first
    pub link_close_delay_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            link_close_delay_ms: DEFAULT_LINK_CLOSE_DELAY_MS,
        }
    }
}

/// Reservation modal settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Text of the confirmation notice shown after a successful submit
    pub confirmation_message: String,
    /// How long the confirmation notice stays visible
    pub toast_duration_ms: u64,
    /// Label shown when the prefilled time matches no option
    pub time_placeholder: String,
    /// Label shown when the prefilled party size matches no option
    pub persons_placeholder: String,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            confirmation_message: DEFAULT_CONFIRMATION_MESSAGE.to_string(),
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            time_placeholder: DEFAULT_TIME_PLACEHOLDER.to_string(),
            persons_placeholder: DEFAULT_PERSONS_PLACEHOLDER.to_string(),
        }
    }
}

/// Sticky header settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// The header hides when scrolling down past this offset
    pub hide_after_px: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            hide_after_px: DEFAULT_HEADER_HIDE_AFTER_PX,
        }
    }
}

/// One testimonial slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    /// Quote text
    pub text: String,
    /// Author name (also the avatar alt text)
    pub name: String,
    /// Author role
    pub role: String,
    /// Avatar image URL
    pub avatar: String,
}

impl Testimonial {
    fn new(text: &str, name: &str, role: &str, avatar: &str) -> Self {
        Self {
            text: text.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            avatar: avatar.to_string(),
        }
    }
}

/// Testimonial carousel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Minimum horizontal travel (px) for a touch to count as a swipe
    pub swipe_threshold_px: f64,
    /// Slides in display order
    pub slides: Vec<Testimonial>,
}

/// Testimonials shipped with the site.
fn default_slides() -> Vec<Testimonial> {
    vec![
        Testimonial::new(
            "\u{201c} Lorem ipsum dolor sit amet, consectetur adipiscing elit. Purus lorem id penatibus imperdiet. Turpis egestas ultricies purus Lorem ipsum dolor sit amet.\u{201d}",
            "John Doe",
            "Blogger",
            "assets/img/avatar-1.png",
        ),
        Testimonial::new(
            "\u{201c} Tasty, seasonal and always fresh. Service was lovely and we will definitely come back again!\u{201d}",
            "Dianne Russell",
            "Food editor",
            "assets/img/avatar-dianne.png",
        ),
        Testimonial::new(
            "\u{201c} Simple menu, premium ingredients. Best salad and coffee combo I had this year.\u{201d}",
            "Julie Christie",
            "Photographer",
            "assets/img/avatar-julie.png",
        ),
    ]
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
            slides: default_slides(),
        }
    }
}

/// Page configuration.
///
/// # File Location
///
/// - Linux: `~/.config/BistroUi/config.toml`
/// - macOS: `~/Library/Application Support/BistroUi/config.toml`
/// - Windows: `%APPDATA%\BistroUi\config.toml`
///
/// `BISTRO_UI_CONFIG_DIR` overrides the directory.
///
/// # Validation
///
/// - `bottom_bar.threshold` and `header.hide_after_px` must be non-negative
/// - `overlay.link_close_delay_ms` and `modal.toast_duration_ms` must be
///   greater than zero and at most one day
/// - `carousel.swipe_threshold_px` must be positive
/// - every slide needs a name and a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Bottom bar settings
    #[serde(default)]
    pub bottom_bar: BottomBarConfig,
    /// Motion preferences
    #[serde(default)]
    pub motion: MotionConfig,
    /// Navigation overlay settings
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Reservation modal settings
    #[serde(default)]
    pub modal: ModalConfig,
    /// Header settings
    #[serde(default)]
    pub header: HeaderConfig,
    /// Carousel settings
    #[serde(default)]
    pub carousel: CarouselConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path, honouring `BISTRO_UI_CONFIG_DIR`.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Loads configuration from the default location.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .context(format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Saves configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .context(format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if !self.bottom_bar.threshold.is_finite() || self.bottom_bar.threshold < 0.0 {
            anyhow::bail!(
                "bottom_bar.threshold must be a non-negative number (got {})",
                self.bottom_bar.threshold
            );
        }

        if !self.header.hide_after_px.is_finite() || self.header.hide_after_px < 0.0 {
            anyhow::bail!(
                "header.hide_after_px must be a non-negative number (got {})",
                self.header.hide_after_px
            );
        }

        validate_delay("overlay.link_close_delay_ms", self.overlay.link_close_delay_ms)?;
        validate_delay("modal.toast_duration_ms", self.modal.toast_duration_ms)?;

        if !self.carousel.swipe_threshold_px.is_finite() || self.carousel.swipe_threshold_px <= 0.0
        {
            anyhow::bail!(
                "carousel.swipe_threshold_px must be positive (got {})",
                self.carousel.swipe_threshold_px
            );
        }

        for (index, slide) in self.carousel.slides.iter().enumerate() {
            if slide.name.trim().is_empty() {
                anyhow::bail!("carousel.slides[{}] has an empty name", index);
            }
            if slide.text.trim().is_empty() {
                anyhow::bail!("carousel.slides[{}] has an empty text", index);
            }
        }

        Ok(())
    }
}

fn validate_delay(name: &str, value: u64) -> Result<()> {
    if value == 0 {
        anyhow::bail!("{} must be greater than zero", name);
    }
    if value > MAX_DELAY_MS {
        anyhow::bail!("{} must be at most {} ms (got {})", name, MAX_DELAY_MS, value);
    }
    Ok(())
}
