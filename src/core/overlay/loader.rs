//! Carregador de seções de overlay para o motor PI de referência.

use super::{Overlay, OverlayError, OverlayLoader, OverlayResult};
use crate::core::dma::{DmaError, DmaTransfer, PiDma};
use bitflags::bitflags;
use log::debug;

bitflags! {
    /// Seções tratadas ao carregar um overlay
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OverlaySections: u8 {
        const TEXT = 0b0001;
        const DATA = 0b0010;
        const ROM  = 0b0100;
        const BSS  = 0b1000;
    }
}

impl PiDma {
    /// Carrega `overlay` e informa quais seções não estavam vazias.
    ///
    /// Os caches são invalidados sobre text (I e D) e data (D) antes da cópia
    /// da imagem da ROM; o bss é zerado por último.
    pub fn load_overlay_sections(&mut self, overlay: &Overlay) -> OverlayResult<OverlaySections> {
        let rom_len = overlay.rom_len().ok_or(OverlayError::InvalidExtent {
            id: overlay.id,
            rom_start: overlay.rom_start,
            rom_end: overlay.rom_end,
        })?;
        let mut sections = OverlaySections::empty();

        if !overlay.text.is_empty() {
            let bus = self.bus_mut();
            bus.invalidate_icache(overlay.text.start, overlay.text.len());
            bus.invalidate_dcache(overlay.text.start, overlay.text.len());
            sections |= OverlaySections::TEXT;
        }

        if !overlay.data.is_empty() {
            self.bus_mut()
                .invalidate_dcache(overlay.data.start, overlay.data.len());
            sections |= OverlaySections::DATA;
        }

        if rom_len != 0 {
            self.rom_read(overlay.rom_start, overlay.vram, rom_len)?;
            sections |= OverlaySections::ROM;
        }

        if !overlay.bss.is_empty() {
            self.bus_mut()
                .zero(overlay.bss.start, overlay.bss.len())
                .map_err(DmaError::from)?;
            sections |= OverlaySections::BSS;
        }

        debug!("overlay {} loaded ({:?})", overlay.id, sections);
        Ok(sections)
    }
}

impl OverlayLoader for PiDma {
    fn load_overlay(&mut self, overlay: &Overlay) -> OverlayResult<()> {
        self.load_overlay_sections(overlay).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::{CacheStats, Cartridge, MemoryBus, VramRange};
    use crate::core::overlay::OverlayId;

    fn engine() -> PiDma {
        let rom: Vec<u8> = (1..=64u8).collect();
        let mut cart = Cartridge::new();
        cart.load_from_buffer(&rom).unwrap();
        PiDma::new(MemoryBus::with_ram_size(cart, 0x200))
    }

    #[test]
    fn test_full_overlay() {
        let mut dma = engine();
        dma.bus_mut().slice_mut(0x8000_0110, 0x10).unwrap().fill(0xEE);

        let overlay = Overlay {
            id: OverlayId::Stage0,
            rom_start: 0x10,
            rom_end: 0x20,
            vram: 0x8000_0100,
            text: VramRange::new(0x8000_0100, 0x8000_0108),
            data: VramRange::new(0x8000_0108, 0x8000_0110),
            bss: VramRange::new(0x8000_0110, 0x8000_0120),
        };
        let sections = dma.load_overlay_sections(&overlay).unwrap();

        assert_eq!(sections, OverlaySections::all());
        assert_eq!(dma.bus().slice(0x8000_0100, 0x10).unwrap(), &(17..=32u8).collect::<Vec<_>>()[..]);
        assert!(dma.bus().slice(0x8000_0110, 0x10).unwrap().iter().all(|&b| b == 0));

        let cache = dma.bus().cache;
        assert_eq!(cache.icache_invalidations, 1);
        // text + data + a própria leitura DMA
        assert_eq!(cache.dcache_invalidations, 3);
    }

    #[test]
    fn test_empty_sections_skipped() {
        let mut dma = engine();
        let overlay = Overlay::data_only(OverlayId::SceneAuxA, 0x8, 0x8, 0x8000_0000);
        let sections = dma.load_overlay_sections(&overlay).unwrap();
        assert!(sections.is_empty());
        assert_eq!(dma.stats().transfers, 0);
        assert_eq!(dma.bus().cache, CacheStats::default());
    }

    #[test]
    fn test_inverted_extent() {
        let mut dma = engine();
        let overlay = Overlay::data_only(OverlayId::Stage1, 0x20, 0x10, 0x8000_0000);
        assert!(matches!(
            dma.load_overlay(&overlay),
            Err(OverlayError::InvalidExtent { .. })
        ));
    }
}
