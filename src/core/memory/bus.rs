//! Barramento de memória do host - RDRAM + ROM do cartucho.
//! Alvo das transferências DMA e da manutenção de cache dos overlays.

use crate::core::memory::cart::Cartridge;
use crate::core::memory::map::MemoryMap;
use crate::core::memory::{MemoryResult, RDRAM_SIZE};
use log::trace;

/// Contadores de manutenção de cache (o host não tem cache real)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub icache_invalidations: u32,
    pub dcache_invalidations: u32,
    pub dcache_writebacks: u32,
}

/// Barramento de memória principal
pub struct MemoryBus {
    pub cart: Cartridge,
    pub map: MemoryMap,
    pub rdram: Vec<u8>,
    pub cache: CacheStats,
}

impl MemoryBus {
    /// Cria um barramento com RDRAM padrão (4MB)
    pub fn new(cart: Cartridge) -> Self {
        Self::with_ram_size(cart, RDRAM_SIZE)
    }

    pub fn with_ram_size(cart: Cartridge, ram_size: u32) -> Self {
        Self {
            cart,
            map: MemoryMap::new(ram_size),
            rdram: vec![0; ram_size as usize],
            cache: CacheStats::default(),
        }
    }

    // --- Acesso à RDRAM (endereços virtuais) ---

    /// Lê um byte
    pub fn read_byte(&self, addr: u32) -> MemoryResult<u8> {
        let range = self.map.resolve(addr, 1)?;
        Ok(self.rdram[range.start])
    }

    /// Escreve um byte
    pub fn write_byte(&mut self, addr: u32, value: u8) -> MemoryResult<()> {
        let range = self.map.resolve(addr, 1)?;
        self.rdram[range.start] = value;
        Ok(())
    }

    /// Lê uma palavra de 32 bits (big-endian)
    pub fn read_word(&self, addr: u32) -> MemoryResult<u32> {
        let bytes = self.slice(addr, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Escreve uma palavra de 32 bits (big-endian)
    pub fn write_word(&mut self, addr: u32, value: u32) -> MemoryResult<()> {
        self.slice_mut(addr, 4)?.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    pub fn slice(&self, addr: u32, len: u32) -> MemoryResult<&[u8]> {
        let range = self.map.resolve(addr, len)?;
        Ok(&self.rdram[range])
    }

    pub fn slice_mut(&mut self, addr: u32, len: u32) -> MemoryResult<&mut [u8]> {
        let range = self.map.resolve(addr, len)?;
        Ok(&mut self.rdram[range])
    }

    /// Zera `addr..addr+len` (bss dos overlays)
    pub fn zero(&mut self, addr: u32, len: u32) -> MemoryResult<()> {
        self.slice_mut(addr, len)?.fill(0);
        Ok(())
    }

    // --- Cópias usadas pelo DMA ---

    /// ROM -> RDRAM
    pub fn copy_rom_to_ram(&mut self, rom_offset: u32, ram_addr: u32, len: u32) -> MemoryResult<()> {
        let src = self.cart.slice(rom_offset, len)?;
        let range = self.map.resolve(ram_addr, len)?;
        self.rdram[range].copy_from_slice(src);
        Ok(())
    }

    /// RDRAM -> domínio do cartucho
    pub fn copy_ram_to_rom(&mut self, ram_addr: u32, rom_offset: u32, len: u32) -> MemoryResult<()> {
        let range = self.map.resolve(ram_addr, len)?;
        self.cart
            .slice_mut(rom_offset, len)?
            .copy_from_slice(&self.rdram[range]);
        Ok(())
    }

    // --- Manutenção de cache ---

    pub fn invalidate_icache(&mut self, addr: u32, len: u32) {
        trace!("osInvalICache {:#010X} +{:#X}", addr, len);
        self.cache.icache_invalidations += 1;
    }

    pub fn invalidate_dcache(&mut self, addr: u32, len: u32) {
        trace!("osInvalDCache {:#010X} +{:#X}", addr, len);
        self.cache.dcache_invalidations += 1;
    }

    pub fn writeback_dcache(&mut self, addr: u32, len: u32) {
        trace!("osWritebackDCache {:#010X} +{:#X}", addr, len);
        self.cache.dcache_writebacks += 1;
    }

    /// Reseta a RDRAM (o carregador externo faz isso entre estágios)
    pub fn reset(&mut self) {
        self.rdram.fill(0);
        self.cache = CacheStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus_with_rom(rom: &[u8]) -> MemoryBus {
        let mut cart = Cartridge::new();
        cart.load_from_buffer(rom).unwrap();
        MemoryBus::with_ram_size(cart, 0x1000)
    }

    #[test]
    fn test_word_access_is_big_endian() {
        let mut bus = bus_with_rom(&[]);
        bus.write_word(0x8000_0010, 0x1234_5678).unwrap();
        assert_eq!(bus.read_byte(0x8000_0010).unwrap(), 0x12);
        assert_eq!(bus.read_byte(0xA000_0013).unwrap(), 0x78);
        assert_eq!(bus.read_word(0x10).unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_copy_both_directions() {
        let mut bus = bus_with_rom(&[9, 8, 7, 6, 5, 4]);
        bus.copy_rom_to_ram(2, 0x8000_0100, 3).unwrap();
        assert_eq!(bus.slice(0x8000_0100, 3).unwrap(), &[7, 6, 5]);

        bus.write_byte(0x8000_0200, 0xAA).unwrap();
        bus.copy_ram_to_rom(0x8000_0200, 0, 1).unwrap();
        assert_eq!(bus.cart.read_rom(0), 0xAA);
    }

    #[test]
    fn test_ram_size_matches_map() {
        let mut bus = MemoryBus::with_ram_size(Cartridge::new(), 0x2000);
        assert_eq!(bus.rdram.len(), 0x2000);
        assert_eq!(bus.map.ram_size(), 0x2000);
        bus.write_byte(0x8000_1FFF, 0x5A).unwrap();
        assert_eq!(bus.read_byte(0xA000_1FFF).unwrap(), 0x5A);
        assert!(bus.read_byte(0x8000_2000).is_err());

        let bus = MemoryBus::new(Cartridge::new());
        assert_eq!(bus.rdram.len(), RDRAM_SIZE as usize);
        assert_eq!(bus.map.ram_size(), RDRAM_SIZE);
    }

    #[test]
    fn test_reset_clears_ram_and_stats() {
        let mut bus = bus_with_rom(&[]);
        bus.write_byte(0x8000_0000, 1).unwrap();
        bus.invalidate_icache(0x8000_0000, 4);
        bus.reset();
        assert_eq!(bus.read_byte(0x8000_0000).unwrap(), 0);
        assert_eq!(bus.cache, CacheStats::default());
    }
}
