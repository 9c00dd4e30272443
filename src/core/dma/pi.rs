//! Motor DMA da interface de periféricos (PI).
//!
//! Copia entre a ROM do cartucho e a RDRAM em blocos de tamanho fixo, fazendo
//! a manutenção de cache que o hardware exige antes de cada transferência.

use super::{DmaDirection, DmaError, DmaResult, DmaTransfer};
use crate::core::memory::MemoryBus;
use log::warn;

cfg_if::cfg_if! {
    if #[cfg(feature = "trace-dma")] {
        fn log_block(direction: DmaDirection, dev_addr: u32, dram_addr: u32, size: u32) {
            log::trace!(
                "PI block {:?} dev={:#010X} dram={:#010X} size={:#X}",
                direction, dev_addr, dram_addr, size
            );
        }
    } else {
        #[inline(always)]
        fn log_block(_direction: DmaDirection, _dev_addr: u32, _dram_addr: u32, _size: u32) {}
    }
}

/// Maior bloco entregue à PI por requisição
pub const DEFAULT_CHUNK_SIZE: u32 = 0x10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiConfig {
    pub chunk_size: u32,
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Contadores do motor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DmaStats {
    pub transfers: u32,
    /// Mensagens de término recebidas (uma por bloco, suspenso ou não)
    pub handshakes: u32,
    pub bytes_copied: u64,
}

pub struct PiDma {
    bus: MemoryBus,
    config: PiConfig,
    suspended: bool,
    stats: DmaStats,
}

impl PiDma {
    pub fn new(bus: MemoryBus) -> Self {
        Self {
            bus,
            config: PiConfig::default(),
            suspended: false,
            stats: DmaStats::default(),
        }
    }

    pub fn with_config(bus: MemoryBus, config: PiConfig) -> DmaResult<Self> {
        if config.chunk_size == 0 {
            return Err(DmaError::InvalidChunkSize);
        }
        Ok(Self {
            config,
            ..Self::new(bus)
        })
    }

    pub fn reset(&mut self) {
        self.bus.reset();
        self.suspended = false;
        self.stats = DmaStats::default();
    }

    /// Suspenso, os blocos são confirmados sem serem iniciados
    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn stats(&self) -> DmaStats {
        self.stats
    }

    pub fn config(&self) -> PiConfig {
        self.config
    }

    pub fn bus(&self) -> &MemoryBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MemoryBus {
        &mut self.bus
    }

    pub fn into_bus(self) -> MemoryBus {
        self.bus
    }

    /// Move `len` bytes entre `dev_addr` (offset da ROM) e `dram_addr`
    pub fn transfer(
        &mut self,
        dev_addr: u32,
        dram_addr: u32,
        len: u32,
        direction: DmaDirection,
    ) -> DmaResult<()> {
        match direction {
            DmaDirection::Write => self.bus.writeback_dcache(dram_addr, len),
            DmaDirection::Read => self.bus.invalidate_dcache(dram_addr, len),
        }

        if self.suspended {
            warn!(
                "PI DMA suspended, skipping {:?} of {:#X} bytes at {:#010X}",
                direction, len, dev_addr
            );
        }

        let chunk = self.config.chunk_size;
        let mut dev_addr = dev_addr;
        let mut dram_addr = dram_addr;
        let mut remaining = len;

        while remaining > chunk {
            self.start_block(dev_addr, dram_addr, chunk, direction)?;
            dev_addr = dev_addr.wrapping_add(chunk);
            dram_addr = dram_addr.wrapping_add(chunk);
            remaining -= chunk;
        }

        if remaining != 0 {
            self.start_block(dev_addr, dram_addr, remaining, direction)?;
        }

        self.stats.transfers += 1;
        Ok(())
    }

    /// RDRAM -> domínio do cartucho
    pub fn ram_write(&mut self, dram_addr: u32, dev_addr: u32, len: u32) -> DmaResult<()> {
        self.transfer(dev_addr, dram_addr, len, DmaDirection::Write)
    }

    fn start_block(
        &mut self,
        dev_addr: u32,
        dram_addr: u32,
        size: u32,
        direction: DmaDirection,
    ) -> DmaResult<()> {
        log_block(direction, dev_addr, dram_addr, size);

        if !self.suspended {
            match direction {
                DmaDirection::Read => self.bus.copy_rom_to_ram(dev_addr, dram_addr, size)?,
                DmaDirection::Write => self.bus.copy_ram_to_rom(dram_addr, dev_addr, size)?,
            }
            self.stats.bytes_copied += u64::from(size);
        }

        // osRecvMesg: o término é consumido mesmo sem bloco iniciado
        self.stats.handshakes += 1;
        Ok(())
    }
}

impl DmaTransfer for PiDma {
    fn rom_read(&mut self, rom_src: u32, ram_dst: u32, len: u32) -> DmaResult<()> {
        self.transfer(rom_src, ram_dst, len, DmaDirection::Read)
    }
}
