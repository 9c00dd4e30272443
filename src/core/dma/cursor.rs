//! Cursor de DMA em streaming.
//!
//! Puxa um fluxo da ROM através de um buffer fixo, um bloco por vez.
//! Cada [`DmaCursor::advance`] lê `chunk_len` bytes do endereço atual do
//! dispositivo para o mesmo buffer na RAM e então avança o endereço.

use super::{DmaResult, DmaTransfer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaCursor {
    dev_addr: u32,
    ram_addr: u32,
    chunk_len: u32,
}

impl DmaCursor {
    pub fn new(dev_addr: u32, ram_addr: u32, chunk_len: u32) -> Self {
        Self {
            dev_addr,
            ram_addr,
            chunk_len,
        }
    }

    /// Reaponta o cursor para um novo fluxo
    pub fn set(&mut self, dev_addr: u32, ram_addr: u32, chunk_len: u32) {
        *self = Self::new(dev_addr, ram_addr, chunk_len);
    }

    pub fn dev_addr(&self) -> u32 {
        self.dev_addr
    }

    pub fn ram_addr(&self) -> u32 {
        self.ram_addr
    }

    pub fn chunk_len(&self) -> u32 {
        self.chunk_len
    }

    /// Lê o próximo bloco para o buffer
    pub fn advance<D: DmaTransfer + ?Sized>(&mut self, dma: &mut D) -> DmaResult<()> {
        dma.rom_read(self.dev_addr, self.ram_addr, self.chunk_len)?;
        self.dev_addr = self.dev_addr.wrapping_add(self.chunk_len);
        Ok(())
    }
}
