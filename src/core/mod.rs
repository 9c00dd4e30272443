//! Núcleo do carregador de overlays.

pub mod dma;
pub mod layout;
pub mod memory;
pub mod overlay;
pub mod queue;
pub mod scene;
pub mod stage;
pub mod system;

use crate::core::dma::DmaError;
use crate::core::layout::LayoutError;
use crate::core::overlay::OverlayError;
use crate::core::stage::SegmentId;
use thiserror::Error;

/// Erros da ativação de estágio e do gerenciador de cena
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Tabela de descritores corrompida: `rom_end <= rom_start`
    #[error("segment {segment} has non-positive length ({rom_start:#X}..{rom_end:#X})")]
    InvalidSegmentLength {
        segment: SegmentId,
        rom_start: u32,
        rom_end: u32,
    },
    #[error("segment transfer failed: {0}")]
    Dma(#[from] DmaError),
    #[error("overlay activation failed: {0}")]
    Overlay(#[from] OverlayError),
    #[error("invalid ROM layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("failed to start loader worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("loader queue is closed")]
    QueueClosed,
    #[error("loader worker panicked")]
    WorkerPanicked,
}

pub type LoaderResult<T> = Result<T, LoaderError>;
