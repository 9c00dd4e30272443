// stage-overlay-rs/src/core/stage/segments.rs

use serde::Deserialize;

/// Segmentos passivos de dados copiados pelo planejador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentId {
    /// Blocos de modelo/textura das criaturas e seus blocos companheiros
    Magikarp1,
    Magikarp2,
    Pikachu1,
    Pikachu2,
    Zubat1,
    Zubat2,
    Bulbasaur1,
    Bulbasaur2,
    /// Dados específicos de cada estágio
    Stage0Extra,
    Stage1Extra,
    Stage2Extra,
    Stage3Extra,
    Stage4Extra,
    Stage5Extra,
    Stage6Extra,
}

impl SegmentId {
    pub const COUNT: usize = 15;

    pub const ALL: [SegmentId; Self::COUNT] = [
        SegmentId::Magikarp1,
        SegmentId::Magikarp2,
        SegmentId::Pikachu1,
        SegmentId::Pikachu2,
        SegmentId::Zubat1,
        SegmentId::Zubat2,
        SegmentId::Bulbasaur1,
        SegmentId::Bulbasaur2,
        SegmentId::Stage0Extra,
        SegmentId::Stage1Extra,
        SegmentId::Stage2Extra,
        SegmentId::Stage3Extra,
        SegmentId::Stage4Extra,
        SegmentId::Stage5Extra,
        SegmentId::Stage6Extra,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SegmentId::Magikarp1 => "magikarp1",
            SegmentId::Magikarp2 => "magikarp2",
            SegmentId::Pikachu1 => "pikachu1",
            SegmentId::Pikachu2 => "pikachu2",
            SegmentId::Zubat1 => "zubat1",
            SegmentId::Zubat2 => "zubat2",
            SegmentId::Bulbasaur1 => "bulbasaur1",
            SegmentId::Bulbasaur2 => "bulbasaur2",
            SegmentId::Stage0Extra => "stage0_extra",
            SegmentId::Stage1Extra => "stage1_extra",
            SegmentId::Stage2Extra => "stage2_extra",
            SegmentId::Stage3Extra => "stage3_extra",
            SegmentId::Stage4Extra => "stage4_extra",
            SegmentId::Stage5Extra => "stage5_extra",
            SegmentId::Stage6Extra => "stage6_extra",
        }
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Intervalo na ROM e destino de um segmento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SegmentDescriptor {
    #[serde(rename = "name")]
    pub id: SegmentId,
    pub rom_start: u32,
    pub rom_end: u32,
    pub vram: u32,
}

impl SegmentDescriptor {
    /// Bytes a copiar; `None` a menos que `rom_end > rom_start`
    pub fn length(&self) -> Option<u32> {
        self.rom_end
            .checked_sub(self.rom_start)
            .filter(|&len| len > 0)
    }
}

/// Descritores de segmento indexados por [`SegmentId`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTable {
    entries: [SegmentDescriptor; SegmentId::COUNT],
}

impl SegmentTable {
    /// Monta a tabela; `entries` deve estar na ordem de [`SegmentId::ALL`]
    pub(crate) fn from_ordered(entries: [SegmentDescriptor; SegmentId::COUNT]) -> Self {
        debug_assert!(entries.iter().zip(SegmentId::ALL).all(|(s, id)| s.id == id));
        Self { entries }
    }

    pub fn get(&self, id: SegmentId) -> &SegmentDescriptor {
        &self.entries[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentDescriptor> {
        self.entries.iter()
    }
}
