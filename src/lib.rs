// Ponto de entrada da biblioteca do carregador de estágios.

// Módulos principais do projeto.
pub mod core;

// Re-exportações para facilitar o uso.
pub use core::dma::{DmaError, DmaTransfer, PiConfig, PiDma};
pub use core::layout::{LayoutError, RomLayout};
pub use core::memory::{Cartridge, MemoryBus};
pub use core::overlay::{Overlay, OverlayId, OverlayLoader, OverlayTable};
pub use core::queue::LoaderQueue;
pub use core::scene::{HaltCause, SceneOutcome, SlotInitializer, SLOT_COUNT};
pub use core::stage::{SegmentDescriptor, SegmentId, SegmentTable, StageActivation};
pub use core::system::StageLoader;
pub use core::{LoaderError, LoaderResult};

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Função conveniente: carrega a ROM e monta um carregador sobre o PI DMA.
pub fn create_loader(layout: &RomLayout, rom: &[u8]) -> LoaderResult<StageLoader<PiDma>> {
    let mut cart = Cartridge::new();
    cart.load_from_buffer(rom).map_err(DmaError::from)?;
    StageLoader::from_layout(layout, PiDma::new(MemoryBus::new(cart)))
}
