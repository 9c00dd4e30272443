// stage-overlay-rs/src/core/overlay/mod.rs

//! Descritores de overlay e o contrato do carregador de overlays.
//!
//! Um overlay é um bloco relocável de código/dados. Ao contrário de um
//! segmento passivo, tem seções text/data/bss que pedem manutenção de cache e
//! bss zerado antes de o código rodar, por isso passa por um
//! [`OverlayLoader`] em vez de uma cópia DMA crua.

pub mod loader;

pub use loader::OverlaySections;

use crate::core::dma::DmaError;
use crate::core::memory::VramRange;
use serde::Deserialize;
use thiserror::Error;

/// Todos os overlays conhecidos pelo subsistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayId {
    Stage0,
    Stage1,
    Stage2,
    Stage3,
    Stage4,
    Stage5,
    Stage6,
    /// Primeiro overlay recarregado pelo gerenciador de cena
    SceneAuxA,
    /// Segundo overlay recarregado pelo gerenciador de cena
    SceneAuxB,
}

impl OverlayId {
    pub const COUNT: usize = 9;

    pub const ALL: [OverlayId; Self::COUNT] = [
        OverlayId::Stage0,
        OverlayId::Stage1,
        OverlayId::Stage2,
        OverlayId::Stage3,
        OverlayId::Stage4,
        OverlayId::Stage5,
        OverlayId::Stage6,
        OverlayId::SceneAuxA,
        OverlayId::SceneAuxB,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            OverlayId::Stage0 => "stage0",
            OverlayId::Stage1 => "stage1",
            OverlayId::Stage2 => "stage2",
            OverlayId::Stage3 => "stage3",
            OverlayId::Stage4 => "stage4",
            OverlayId::Stage5 => "stage5",
            OverlayId::Stage6 => "stage6",
            OverlayId::SceneAuxA => "scene_aux_a",
            OverlayId::SceneAuxB => "scene_aux_b",
        }
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error(transparent)]
    Dma(#[from] DmaError),
    #[error("overlay {id} has inverted ROM extent {rom_start:#X}..{rom_end:#X}")]
    InvalidExtent {
        id: OverlayId,
        rom_start: u32,
        rom_end: u32,
    },
    #[error("overlay record needs {expected} bytes, got {actual}")]
    ShortRecord { expected: usize, actual: usize },
    #[error("overlay loader failure: {0}")]
    Loader(String),
}

pub type OverlayResult<T> = Result<T, OverlayError>;

/// Descritor de overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Overlay {
    #[serde(rename = "name")]
    pub id: OverlayId,
    pub rom_start: u32,
    pub rom_end: u32,
    /// Destino da imagem da ROM
    pub vram: u32,
    #[serde(default)]
    pub text: VramRange,
    #[serde(default)]
    pub data: VramRange,
    #[serde(default)]
    pub bss: VramRange,
}

/// Registro de overlay na ROM: nove palavras big-endian
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct RawOverlay {
    rom_start: u32,
    rom_end: u32,
    vram: u32,
    text_start: u32,
    text_end: u32,
    data_start: u32,
    data_end: u32,
    bss_start: u32,
    bss_end: u32,
}

impl Overlay {
    /// Tamanho de um registro empacotado
    pub const RECORD_SIZE: usize = std::mem::size_of::<RawOverlay>();

    /// Overlay só de dados: imagem da ROM, sem seções de código
    pub fn data_only(id: OverlayId, rom_start: u32, rom_end: u32, vram: u32) -> Self {
        Self {
            id,
            rom_start,
            rom_end,
            vram,
            text: VramRange::EMPTY,
            data: VramRange::EMPTY,
            bss: VramRange::EMPTY,
        }
    }

    /// Decodifica um registro no formato da ROM
    pub fn from_record(id: OverlayId, bytes: &[u8]) -> OverlayResult<Self> {
        let record = bytes
            .get(..Self::RECORD_SIZE)
            .ok_or(OverlayError::ShortRecord {
                expected: Self::RECORD_SIZE,
                actual: bytes.len(),
            })?;
        let raw: RawOverlay = bytemuck::pod_read_unaligned(record);

        Ok(Self {
            id,
            rom_start: u32::from_be(raw.rom_start),
            rom_end: u32::from_be(raw.rom_end),
            vram: u32::from_be(raw.vram),
            text: VramRange::new(u32::from_be(raw.text_start), u32::from_be(raw.text_end)),
            data: VramRange::new(u32::from_be(raw.data_start), u32::from_be(raw.data_end)),
            bss: VramRange::new(u32::from_be(raw.bss_start), u32::from_be(raw.bss_end)),
        })
    }

    /// Tamanho da imagem da ROM, `None` se o intervalo estiver invertido
    pub fn rom_len(&self) -> Option<u32> {
        self.rom_end.checked_sub(self.rom_start)
    }
}

/// Ativação bloqueante de overlay
pub trait OverlayLoader {
    /// Copia `overlay` para sua janela de VRAM e o deixa pronto para rodar.
    fn load_overlay(&mut self, overlay: &Overlay) -> OverlayResult<()>;
}

impl<T: OverlayLoader + ?Sized> OverlayLoader for &mut T {
    fn load_overlay(&mut self, overlay: &Overlay) -> OverlayResult<()> {
        (**self).load_overlay(overlay)
    }
}

impl<T: OverlayLoader + ?Sized> OverlayLoader for Box<T> {
    fn load_overlay(&mut self, overlay: &Overlay) -> OverlayResult<()> {
        (**self).load_overlay(overlay)
    }
}

/// Descritores de overlay indexados por [`OverlayId`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTable {
    entries: [Overlay; OverlayId::COUNT],
}

impl OverlayTable {
    /// Monta a tabela; `entries` deve estar na ordem de [`OverlayId::ALL`]
    pub(crate) fn from_ordered(entries: [Overlay; OverlayId::COUNT]) -> Self {
        debug_assert!(entries.iter().zip(OverlayId::ALL).all(|(o, id)| o.id == id));
        Self { entries }
    }

    pub fn get(&self, id: OverlayId) -> &Overlay {
        &self.entries[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.entries.iter()
    }
}
