//! Tradução de endereços virtuais para offsets da RDRAM.
//! Os segmentos KSEG0 e KSEG1 espelham a mesma memória física.

use crate::core::memory::{MemoryError, MemoryResult, KSEG0_BASE, KSEG1_BASE};

/// Região de memória
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemRegion {
    Physical, // Endereço físico direto
    Kseg0,    // RDRAM cacheada
    Kseg1,    // RDRAM sem cache
    Unmapped, // Nada mapeado (TLB, KSSEG, ...)
}

/// Intervalo de endereços virtuais `[start, end)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
pub struct VramRange {
    pub start: u32,
    pub end: u32,
}

impl VramRange {
    pub const EMPTY: VramRange = VramRange { start: 0, end: 0 };

    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Tamanho em bytes (zero se o intervalo estiver invertido)
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr < self.end
    }
}

/// Mapa de endereços da RDRAM
#[derive(Debug, Clone, Copy)]
pub struct MemoryMap {
    ram_size: u32,
}

impl MemoryMap {
    /// Cria um mapa para uma RDRAM de `ram_size` bytes
    pub fn new(ram_size: u32) -> Self {
        Self { ram_size }
    }

    pub fn ram_size(&self) -> u32 {
        self.ram_size
    }

    /// Classifica um endereço virtual
    pub fn region(&self, addr: u32) -> MemRegion {
        match addr {
            a if a < self.ram_size => MemRegion::Physical,
            a if (KSEG0_BASE..KSEG1_BASE).contains(&a) => MemRegion::Kseg0,
            a if (KSEG1_BASE..0xC000_0000).contains(&a) => MemRegion::Kseg1,
            _ => MemRegion::Unmapped,
        }
    }

    /// Converte `addr..addr+len` em um intervalo de offsets da RDRAM
    pub fn resolve(&self, addr: u32, len: u32) -> MemoryResult<std::ops::Range<usize>> {
        let invalid = MemoryError::InvalidAddress { addr, len };
        let phys = match self.region(addr) {
            MemRegion::Physical => addr,
            MemRegion::Kseg0 => addr - KSEG0_BASE,
            MemRegion::Kseg1 => addr - KSEG1_BASE,
            MemRegion::Unmapped => return Err(invalid),
        };

        let end = phys.checked_add(len).ok_or(invalid)?;
        if end > self.ram_size {
            return Err(invalid);
        }
        Ok(phys as usize..end as usize)
    }
}
