// stage-overlay-rs/src/core/system.rs

//! Contexto do carregador: tabelas de descritores, células persistentes e o
//! backend que faz as cópias.

use crate::core::dma::DmaTransfer;
use crate::core::layout::RomLayout;
use crate::core::overlay::{OverlayLoader, OverlayTable};
use crate::core::scene::{EngineState, SceneManager, SceneOutcome, SlotInitializer};
use crate::core::stage::{SegmentTable, StageActivation, StagePlanner};
use crate::core::LoaderResult;

/// Tudo que uma instância do carregador precisa. Instâncias independentes
/// não compartilham nada.
pub struct StageLoader<B> {
    segments: SegmentTable,
    overlays: OverlayTable,
    state: EngineState,
    backend: B,
}

impl<B> StageLoader<B>
where
    B: DmaTransfer + OverlayLoader,
{
    pub fn new(segments: SegmentTable, overlays: OverlayTable, backend: B) -> Self {
        Self {
            segments,
            overlays,
            state: EngineState::new(),
            backend,
        }
    }

    /// Valida `layout` e monta o carregador em volta de `backend`
    pub fn from_layout(layout: &RomLayout, backend: B) -> LoaderResult<Self> {
        let (segments, overlays) = layout.build()?;
        Ok(Self::new(segments, overlays, backend))
    }

    /// Carrega tudo que o estágio `stage` precisa. Índices fora de 0..=6 só
    /// geram log.
    pub fn activate_stage(&mut self, stage: i32) -> LoaderResult<StageActivation> {
        StagePlanner::new(&self.segments, &self.overlays).activate_stage(stage, &mut self.backend)
    }

    /// Roda o laço de slots a partir do slot 0 até parar
    pub fn run_scene_manager<I>(&mut self, initializer: &mut I) -> LoaderResult<SceneOutcome>
    where
        I: SlotInitializer + ?Sized,
    {
        SceneManager::new().run(&self.overlays, &mut self.backend, initializer)
    }

    pub fn selected_index(&self) -> i32 {
        self.state.selected_index()
    }

    pub fn set_selected_index(&mut self, value: i32) {
        self.state.set_selected_index(value);
    }

    pub fn selected_area(&self) -> i32 {
        self.state.selected_area()
    }

    pub fn set_selected_area(&mut self, value: i32) {
        self.state.set_selected_area(value);
    }

    pub fn segments(&self) -> &SegmentTable {
        &self.segments
    }

    pub fn overlays(&self) -> &OverlayTable {
        &self.overlays
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
