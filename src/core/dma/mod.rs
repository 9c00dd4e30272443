// stage-overlay-rs/src/core/dma/mod.rs

//! Primitiva de transferência DMA.
//!
//! O planejador só emite chamadas `rom_read` via [`DmaTransfer`]; como a cópia
//! acontece é problema de quem implementa. [`PiDma`] é o motor de referência,
//! que copia sobre um [`MemoryBus`](crate::core::memory::MemoryBus) do host.

pub mod cursor;
pub mod pi;

pub use cursor::DmaCursor;
pub use pi::{DmaStats, PiConfig, PiDma, DEFAULT_CHUNK_SIZE};

use crate::core::memory::MemoryError;
use thiserror::Error;

/// Direção da transferência, vista da RDRAM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaDirection {
    /// Cartucho -> RDRAM (`OS_READ`)
    Read,
    /// RDRAM -> domínio do cartucho (`OS_WRITE`)
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DmaError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("DMA chunk size must be non-zero")]
    InvalidChunkSize,
    #[error("DMA device failure: {0}")]
    Device(String),
}

pub type DmaResult<T> = Result<T, DmaError>;

/// Cópia bloqueante ROM -> VRAM
pub trait DmaTransfer {
    /// Copia `len` bytes do offset `rom_src` da ROM para o endereço virtual
    /// `ram_dst`. Só retorna quando a cópia terminou.
    fn rom_read(&mut self, rom_src: u32, ram_dst: u32, len: u32) -> DmaResult<()>;
}

impl<T: DmaTransfer + ?Sized> DmaTransfer for &mut T {
    fn rom_read(&mut self, rom_src: u32, ram_dst: u32, len: u32) -> DmaResult<()> {
        (**self).rom_read(rom_src, ram_dst, len)
    }
}

impl<T: DmaTransfer + ?Sized> DmaTransfer for Box<T> {
    fn rom_read(&mut self, rom_src: u32, ram_dst: u32, len: u32) -> DmaResult<()> {
        (**self).rom_read(rom_src, ram_dst, len)
    }
}
