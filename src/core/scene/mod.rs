// stage-overlay-rs/src/core/scene/mod.rs

//! Laço de slots do gerenciador de cena.
//!
//! Cada iteração recarrega os dois overlays auxiliares e consulta o
//! inicializador do slot. O laço termina quando o inicializador responde
//! "pronto" ou depois do último slot; o resultado volta para quem chamou, que
//! decide o que "parar" significa na sua plataforma.

pub mod state;

pub use state::EngineState;

use crate::core::overlay::{OverlayId, OverlayLoader, OverlayTable};
use crate::core::LoaderResult;
use log::{debug, info};

/// Slots consultados antes de desistir (0..=16)
pub const SLOT_COUNT: i32 = 17;

/// Verificação externa por slot: 0 = não pronto, qualquer outro valor = pronto
pub trait SlotInitializer {
    fn init_slot(&mut self, slot: i32) -> i32;
}

impl<F: FnMut(i32) -> i32> SlotInitializer for F {
    fn init_slot(&mut self, slot: i32) -> i32 {
        self(slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltCause {
    /// O inicializador respondeu "pronto" em `slot`
    Success { slot: i32 },
    /// Todos os slots foram consultados sem sucesso
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Iterating { slot: i32 },
    Halted(HaltCause),
}

/// Resultado final de [`SceneManager::run`]
pub type SceneOutcome = HaltCause;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneManager {
    state: SceneState,
}

impl SceneManager {
    pub fn new() -> Self {
        Self {
            state: SceneState::Iterating { slot: 0 },
        }
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.state, SceneState::Halted(_))
    }

    /// Executa uma iteração. Parado, continua parado e não emite nada.
    pub fn step<L, I>(
        &mut self,
        overlays: &OverlayTable,
        loader: &mut L,
        initializer: &mut I,
    ) -> LoaderResult<SceneState>
    where
        L: OverlayLoader + ?Sized,
        I: SlotInitializer + ?Sized,
    {
        let SceneState::Iterating { slot } = self.state else {
            return Ok(self.state);
        };

        // Os dois overlays são recarregados sempre, residentes ou não
        loader.load_overlay(overlays.get(OverlayId::SceneAuxA))?;
        loader.load_overlay(overlays.get(OverlayId::SceneAuxB))?;

        self.state = if initializer.init_slot(slot) != 0 {
            SceneState::Halted(HaltCause::Success { slot })
        } else if slot + 1 == SLOT_COUNT {
            SceneState::Halted(HaltCause::Exhausted)
        } else {
            SceneState::Iterating { slot: slot + 1 }
        };

        debug!("scene slot {} -> {:?}", slot, self.state);
        Ok(self.state)
    }

    /// Itera até parar e devolve a causa
    pub fn run<L, I>(
        &mut self,
        overlays: &OverlayTable,
        loader: &mut L,
        initializer: &mut I,
    ) -> LoaderResult<SceneOutcome>
    where
        L: OverlayLoader + ?Sized,
        I: SlotInitializer + ?Sized,
    {
        loop {
            if let SceneState::Halted(cause) = self.step(overlays, loader, initializer)? {
                info!("scene manager halted: {:?}", cause);
                return Ok(cause);
            }
        }
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}
