//! Sistema de memória do host.
//! Modela a RDRAM (endereços virtuais KSEG0/KSEG1) e a imagem da ROM do
//! cartucho, origem e destino das transferências DMA do carregador de estágios.

pub mod bus;
pub mod cart;
pub mod map;

// Re-exportações para facilitar o uso
pub use bus::{CacheStats, MemoryBus};
pub use cart::{Cartridge, RomFormat};
pub use map::{MemRegion, MemoryMap, VramRange};

use thiserror::Error;

/// Base virtual da RDRAM em KSEG0 (cacheada)
pub const KSEG0_BASE: u32 = 0x8000_0000;

/// Base virtual da RDRAM em KSEG1 (sem cache)
pub const KSEG1_BASE: u32 = 0xA000_0000;

/// Tamanho padrão da RDRAM (4MB, sem Expansion Pak)
pub const RDRAM_SIZE: u32 = 4 * 1024 * 1024;

/// Tamanho máximo de ROM suportado (64MB)
pub const MAX_ROM_SIZE: usize = 64 * 1024 * 1024;

/// Erros do sistema de memória
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("invalid address {addr:#010X} (+{len:#X} bytes)")]
    InvalidAddress { addr: u32, len: u32 },
    #[error("ROM image too large: {0} bytes")]
    RomTooLarge(usize),
    #[error("invalid cartridge image")]
    InvalidCartridge,
}

/// Tipo de resultado para operações de memória
pub type MemoryResult<T> = Result<T, MemoryError>;
