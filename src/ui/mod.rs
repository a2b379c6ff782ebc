//! Page controllers and the event router that drives them.
//!
//! Each controller owns an explicit state enum and treats class and
//! attribute writes as rendering of that state. Controllers are discovered
//! from markup; a missing element disables its feature without error.

pub mod bottom_bar;
pub mod carousel;
pub mod custom_select;
pub mod focus;
pub mod header;
pub mod layers;
pub mod markup;
pub mod modal;
pub mod overlay;
pub mod page;
pub mod submenu;
pub mod toast;
pub mod validation;

use crate::config::Config;
use crate::dom::{Document, NodeId, Scheduler};

pub use bottom_bar::BottomBar;
pub use carousel::Carousel;
pub use custom_select::CustomSelects;
pub use header::SiteHeader;
pub use layers::{LayerKind, LayerRegistry};
pub use modal::{ModalState, ReservationField, ReservationModal, SubmitOutcome};
pub use overlay::{NavOverlay, OverlayState};
pub use page::{Page, PageSnapshot};
pub use submenu::{SubmenuState, Submenus};
pub use toast::Toast;

/// Deferred work queued on the page scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Close the navigation overlay after a link click
    CloseOverlay,
    /// Re-derive bottom bar visibility
    RecomputeBottomBar,
    /// Hide the confirmation notice
    DismissToast,
    /// Next frame of a submenu height animation
    SubmenuFrame(NodeId),
    /// Swap carousel content to the given slide
    CarouselContent(usize),
    /// End the carousel fade
    CarouselFadeIn,
    /// Apply header scroll state
    HeaderScroll,
}

/// Shared state a controller needs while handling one event.
pub struct Context<'a> {
    /// The document being rendered into
    pub doc: &'a mut Document,
    /// Timers and animation frames
    pub scheduler: &'a mut Scheduler<Task>,
    /// Open/closed state of the blocking layers
    pub layers: &'a mut LayerRegistry,
    /// Page configuration
    pub config: &'a Config,
}
