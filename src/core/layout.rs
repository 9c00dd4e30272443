// stage-overlay-rs/src/core/layout.rs

//! Configuração do layout da ROM.
//!
//! Os intervalos ROM/VRAM de cada segmento e overlay são fixados no link da
//! imagem, então vêm de fora: montados em código ou lidos de um TOML como
//!
//! ```toml
//! [[segment]]
//! name = "magikarp1"
//! rom_start = 0x7A0000
//! rom_end = 0x7B2000
//! vram = 0x80380000
//!
//! [[overlay]]
//! name = "stage0"
//! rom_start = 0x46270
//! rom_end = 0x48000
//! vram = 0x8009A8C0
//! text = { start = 0x8009A8C0, end = 0x8009B000 }
//! bss = { start = 0x8009B400, end = 0x8009B800 }
//! ```
//!
//! Cada [`SegmentId`] e [`OverlayId`] deve aparecer exatamente uma vez.

use crate::core::overlay::{Overlay, OverlayId, OverlayTable};
use crate::core::stage::segments::{SegmentDescriptor, SegmentId, SegmentTable};
use log::info;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read layout: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse layout: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("segment {0} missing from layout")]
    MissingSegment(SegmentId),
    #[error("segment {0} listed more than once")]
    DuplicateSegment(SegmentId),
    #[error("overlay {0} missing from layout")]
    MissingOverlay(OverlayId),
    #[error("overlay {0} listed more than once")]
    DuplicateOverlay(OverlayId),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RomLayout {
    #[serde(rename = "segment", default)]
    pub segments: Vec<SegmentDescriptor>,
    #[serde(rename = "overlay", default)]
    pub overlays: Vec<Overlay>,
}

impl RomLayout {
    pub fn new(segments: Vec<SegmentDescriptor>, overlays: Vec<Overlay>) -> Self {
        Self { segments, overlays }
    }

    pub fn from_toml(text: &str) -> LayoutResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> LayoutResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let layout = Self::from_toml(&text)?;
        info!(
            "layout {} loaded: {} segments, {} overlays",
            path.as_ref().display(),
            layout.segments.len(),
            layout.overlays.len()
        );
        Ok(layout)
    }

    /// Valida a completude e monta as tabelas de busca
    pub fn build(&self) -> LayoutResult<(SegmentTable, OverlayTable)> {
        let mut segments = SegmentId::ALL.map(|id| SegmentDescriptor {
            id,
            rom_start: 0,
            rom_end: 0,
            vram: 0,
        });
        let mut seen = [false; SegmentId::COUNT];
        for seg in &self.segments {
            let i = seg.id.index();
            if std::mem::replace(&mut seen[i], true) {
                return Err(LayoutError::DuplicateSegment(seg.id));
            }
            segments[i] = *seg;
        }
        if let Some(i) = seen.iter().position(|s| !s) {
            return Err(LayoutError::MissingSegment(SegmentId::ALL[i]));
        }

        let mut overlays = OverlayId::ALL.map(|id| Overlay::data_only(id, 0, 0, 0));
        let mut seen = [false; OverlayId::COUNT];
        for overlay in &self.overlays {
            let i = overlay.id.index();
            if std::mem::replace(&mut seen[i], true) {
                return Err(LayoutError::DuplicateOverlay(overlay.id));
            }
            overlays[i] = *overlay;
        }
        if let Some(i) = seen.iter().position(|s| !s) {
            return Err(LayoutError::MissingOverlay(OverlayId::ALL[i]));
        }

        Ok((
            SegmentTable::from_ordered(segments),
            OverlayTable::from_ordered(overlays),
        ))
    }
}
