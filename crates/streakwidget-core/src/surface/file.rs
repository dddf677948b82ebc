//! File-backed surfaces: one JSON document per attached surface id.
//!
//! Layout is `<dir>/<id>.json`. Attaching creates the file, detaching
//! removes it, and a render replaces its contents through a temp file so a
//! reader never observes a half-written render. Each write gets its own temp
//! file, so concurrent renders of one surface never trip over each other.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FlameAsset, RenderRequest, SurfaceId, SurfaceRenderer};
use crate::error::RenderError;
use crate::storage::data_dir;

/// A render as persisted for one surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedSurface {
    pub request: RenderRequest,
    pub asset: FlameAsset,
    pub rendered_at: DateTime<Utc>,
}

/// Contents of one surface file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceFile {
    pub id: SurfaceId,
    #[serde(default)]
    pub render: Option<RenderedSurface>,
}

/// Surfaces stored as files in a directory.
#[derive(Debug, Clone)]
pub struct FileSurfaceRenderer {
    dir: PathBuf,
}

impl FileSurfaceRenderer {
    /// Surfaces under `<data_dir>/surfaces`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open_default() -> Result<Self, RenderError> {
        Self::open(data_dir()?.join("surfaces"))
    }

    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, id: SurfaceId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Attach a surface. Returns `false` if it was already attached.
    ///
    /// # Errors
    /// Returns an error if the surface file cannot be written.
    pub fn attach(&self, id: SurfaceId) -> Result<bool, RenderError> {
        let path = self.file_path(id);
        if path.exists() {
            return Ok(false);
        }
        self.write_atomic(id, &SurfaceFile { id, render: None })?;
        debug!(surface = id, "surface attached");
        Ok(true)
    }

    /// Detach a surface. Returns `false` if it was not attached.
    ///
    /// # Errors
    /// Returns an error if the surface file exists but cannot be removed.
    pub fn detach(&self, id: SurfaceId) -> Result<bool, RenderError> {
        match std::fs::remove_file(self.file_path(id)) {
            Ok(()) => {
                debug!(surface = id, "surface detached");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Current contents of a surface, `None` if not attached.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn read(&self, id: SurfaceId) -> Result<Option<SurfaceFile>, RenderError> {
        match std::fs::read_to_string(self.file_path(id)) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_atomic(&self, id: SurfaceId, file: &SurfaceFile) -> Result<(), RenderError> {
        let content = serde_json::to_string_pretty(file)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{id}."))
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(self.file_path(id)).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SurfaceRenderer for FileSurfaceRenderer {
    fn surface_ids(&self) -> Result<Vec<SurfaceId>, RenderError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Ok(id) = stem.parse::<SurfaceId>() {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    fn render(&self, id: SurfaceId, request: &RenderRequest) -> Result<(), RenderError> {
        if !self.file_path(id).exists() {
            return Err(RenderError::Detached(id));
        }
        let file = SurfaceFile {
            id,
            render: Some(RenderedSurface {
                request: request.clone(),
                asset: FlameAsset::for_tier(request.visual_tier),
                rendered_at: Utc::now(),
            }),
        };
        self.write_atomic(id, &file)
    }
}
