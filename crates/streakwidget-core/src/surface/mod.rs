//! Display surfaces showing the streak.
//!
//! A surface is one placed copy of the home-screen widget. The refresh path
//! collects the attached ids at run time and sends every one of them the
//! same [`RenderRequest`].

mod file;
mod memory;

pub use file::{FileSurfaceRenderer, RenderedSurface, SurfaceFile};
pub use memory::MemorySurfaceRenderer;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::streak::{DisplayState, VisualTier};

/// Identifier of one placed surface.
pub type SurfaceId = u32;

/// What a surface is asked to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub count_text: String,
    pub label_text: String,
    pub visual_tier: VisualTier,
}

impl From<&DisplayState> for RenderRequest {
    fn from(state: &DisplayState) -> Self {
        Self {
            count_text: state.count.to_string(),
            label_text: state.label.as_str().to_string(),
            visual_tier: state.visual_tier,
        }
    }
}

impl From<DisplayState> for RenderRequest {
    fn from(state: DisplayState) -> Self {
        Self::from(&state)
    }
}

/// Flame drawable chosen for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlameAsset {
    ArconOrange,
    ArconBlue,
    Deactive,
}

impl FlameAsset {
    pub fn for_tier(tier: VisualTier) -> Self {
        match tier {
            VisualTier::Active => FlameAsset::ArconOrange,
            VisualTier::Weak => FlameAsset::ArconBlue,
            VisualTier::Inactive | VisualTier::Lost => FlameAsset::Deactive,
        }
    }

    pub fn resource_name(&self) -> &'static str {
        match self {
            FlameAsset::ArconOrange => "arcon_orange",
            FlameAsset::ArconBlue => "arcon_blue",
            FlameAsset::Deactive => "deactive",
        }
    }
}

/// Write-only access to the placed surfaces.
pub trait SurfaceRenderer: Send + Sync {
    /// Ids of every currently attached surface, ascending.
    fn surface_ids(&self) -> Result<Vec<SurfaceId>, RenderError>;

    /// Replace what surface `id` shows.
    fn render(&self, id: SurfaceId, request: &RenderRequest) -> Result<(), RenderError>;
}

impl<T: SurfaceRenderer + ?Sized> SurfaceRenderer for std::sync::Arc<T> {
    fn surface_ids(&self) -> Result<Vec<SurfaceId>, RenderError> {
        (**self).surface_ids()
    }

    fn render(&self, id: SurfaceId, request: &RenderRequest) -> Result<(), RenderError> {
        (**self).render(id, request)
    }
}
