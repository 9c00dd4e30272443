// stage-overlay-rs/src/core/stage/planner.rs

use super::segments::{SegmentId, SegmentTable};
use crate::core::dma::DmaTransfer;
use crate::core::overlay::{OverlayId, OverlayLoader, OverlayTable};
use crate::core::{LoaderError, LoaderResult};
use log::{debug, error, info, warn};

/// Uma ação de carga do plano de estágio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStep {
    LoadOverlay(OverlayId),
    LoadSegment(SegmentId),
}

/// O que o estágio precisa residente: seu overlay, seu segmento extra e
/// depois os segmentos compartilhados de criaturas, em ordem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    pub overlay: OverlayId,
    pub extra: SegmentId,
    pub shared: &'static [SegmentId],
}

impl StagePlan {
    /// Passos na ordem de emissão: overlay primeiro, depois segmentos
    pub fn steps(&self) -> impl Iterator<Item = StageStep> + '_ {
        std::iter::once(StageStep::LoadOverlay(self.overlay))
            .chain(std::iter::once(StageStep::LoadSegment(self.extra)))
            .chain(self.shared.iter().copied().map(StageStep::LoadSegment))
    }

    /// Número de transferências de segmento do plano
    pub fn transfer_count(&self) -> usize {
        1 + self.shared.len()
    }
}

use SegmentId::*;

/// Segmentos compartilhados se repetem por estágio: nada sobrevive à troca
static STAGE_PLANS: [StagePlan; 7] = [
    StagePlan {
        overlay: OverlayId::Stage0,
        extra: Stage0Extra,
        shared: &[Magikarp1, Magikarp2, Pikachu1, Pikachu2],
    },
    StagePlan {
        overlay: OverlayId::Stage1,
        extra: Stage1Extra,
        shared: &[Magikarp1, Magikarp2, Pikachu1, Pikachu2, Zubat1, Zubat2],
    },
    StagePlan {
        overlay: OverlayId::Stage2,
        extra: Stage2Extra,
        shared: &[Magikarp1, Magikarp2],
    },
    StagePlan {
        overlay: OverlayId::Stage3,
        extra: Stage3Extra,
        shared: &[Magikarp1, Magikarp2, Pikachu1, Pikachu2, Bulbasaur1, Bulbasaur2],
    },
    StagePlan {
        overlay: OverlayId::Stage4,
        extra: Stage4Extra,
        shared: &[
            Bulbasaur1, Bulbasaur2, Magikarp1, Magikarp2, Pikachu1, Pikachu2, Zubat1, Zubat2,
        ],
    },
    StagePlan {
        overlay: OverlayId::Stage5,
        extra: Stage5Extra,
        shared: &[Magikarp1, Magikarp2],
    },
    StagePlan {
        overlay: OverlayId::Stage6,
        extra: Stage6Extra,
        shared: &[],
    },
];

/// Busca o plano de `stage`; `None` fora de 0..=6
pub fn plan_for(stage: i32) -> Option<&'static StagePlan> {
    usize::try_from(stage).ok().and_then(|i| STAGE_PLANS.get(i))
}

/// Resultado de um pedido de ativação de estágio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageActivation {
    /// Overlay ativado e `transfers` segmentos copiados
    Activated { stage: i32, transfers: usize },
    /// Índice sem plano; nada foi emitido
    Unmapped { stage: i32 },
}

/// Executa planos de estágio sobre as tabelas de descritores
pub struct StagePlanner<'a> {
    segments: &'a SegmentTable,
    overlays: &'a OverlayTable,
}

impl<'a> StagePlanner<'a> {
    pub fn new(segments: &'a SegmentTable, overlays: &'a OverlayTable) -> Self {
        Self { segments, overlays }
    }

    /// Ativa `stage`: overlay primeiro, depois cada segmento do plano, cada
    /// transferência bloqueando antes da próxima.
    ///
    /// Para no primeiro passo que falhar; o que já foi copiado fica.
    pub fn activate_stage<B>(&self, stage: i32, backend: &mut B) -> LoaderResult<StageActivation>
    where
        B: DmaTransfer + OverlayLoader + ?Sized,
    {
        let Some(plan) = plan_for(stage) else {
            warn!("stage {} has no load plan, ignoring", stage);
            return Ok(StageActivation::Unmapped { stage });
        };

        info!("activating stage {} ({} segments)", stage, plan.transfer_count());

        let mut transfers = 0;
        for step in plan.steps() {
            debug!("stage {}: {:?}", stage, step);
            match step {
                StageStep::LoadOverlay(id) => backend.load_overlay(self.overlays.get(id))?,
                StageStep::LoadSegment(id) => {
                    self.load_segment(id, backend)?;
                    transfers += 1;
                }
            }
        }

        Ok(StageActivation::Activated { stage, transfers })
    }

    /// Copia um segmento; intervalo de ROM não positivo = tabela corrompida
    pub fn load_segment<D>(&self, id: SegmentId, dma: &mut D) -> LoaderResult<()>
    where
        D: DmaTransfer + ?Sized,
    {
        let seg = self.segments.get(id);
        let Some(len) = seg.length() else {
            error!(
                "segment {} has non-positive extent {:#X}..{:#X}",
                id, seg.rom_start, seg.rom_end
            );
            return Err(LoaderError::InvalidSegmentLength {
                segment: id,
                rom_start: seg.rom_start,
                rom_end: seg.rom_end,
            });
        };

        dma.rom_read(seg.rom_start, seg.vram, len)?;
        Ok(())
    }
}
