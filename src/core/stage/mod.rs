//! Planejamento de segmentos por estágio.
//!
//! Associa o índice do estágio ao overlay e aos segmentos de dados que ele
//! precisa residentes e emite as cargas numa ordem fixa.

pub mod planner;
pub mod segments;

pub use planner::{plan_for, StageActivation, StagePlan, StagePlanner, StageStep};
pub use segments::{SegmentDescriptor, SegmentId, SegmentTable};
