use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use super::{RenderRequest, SurfaceId, SurfaceRenderer};
use crate::error::RenderError;

#[derive(Debug, Default)]
struct Surfaces {
    attached: BTreeMap<SurfaceId, Option<RenderRequest>>,
    rejecting: BTreeSet<SurfaceId>,
    renders: usize,
}

/// In-memory surfaces with per-surface failure injection.
#[derive(Debug, Default)]
pub struct MemorySurfaceRenderer {
    inner: Mutex<Surfaces>,
}

impl MemorySurfaceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surfaces(ids: impl IntoIterator<Item = SurfaceId>) -> Self {
        let renderer = Self::new();
        for id in ids {
            renderer.attach(id);
        }
        renderer
    }

    pub fn attach(&self, id: SurfaceId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.attached.entry(id).or_insert(None);
        }
    }

    pub fn detach(&self, id: SurfaceId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.attached.remove(&id);
        }
    }

    /// Make renders to `id` fail until cleared.
    pub fn reject(&self, id: SurfaceId, rejecting: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            if rejecting {
                inner.rejecting.insert(id);
            } else {
                inner.rejecting.remove(&id);
            }
        }
    }

    /// The last request rendered to `id`.
    pub fn last_render(&self, id: SurfaceId) -> Option<RenderRequest> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.attached.get(&id).cloned().flatten())
    }

    /// Successful renders across all surfaces.
    pub fn render_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.renders).unwrap_or(0)
    }
}

impl SurfaceRenderer for MemorySurfaceRenderer {
    fn surface_ids(&self) -> Result<Vec<SurfaceId>, RenderError> {
        let inner = self.inner.lock().map_err(|_| RenderError::Rejected {
            id: 0,
            message: "surface registry lock poisoned".into(),
        })?;
        Ok(inner.attached.keys().copied().collect())
    }

    fn render(&self, id: SurfaceId, request: &RenderRequest) -> Result<(), RenderError> {
        let mut guard = self.inner.lock().map_err(|_| RenderError::Rejected {
            id,
            message: "surface registry lock poisoned".into(),
        })?;
        let inner = &mut *guard;
        if inner.rejecting.contains(&id) {
            return Err(RenderError::Rejected {
                id,
                message: "surface unavailable".into(),
            });
        }
        match inner.attached.get_mut(&id) {
            Some(slot) => {
                *slot = Some(request.clone());
                inner.renders += 1;
                Ok(())
            }
            None => Err(RenderError::Detached(id)),
        }
    }
}
