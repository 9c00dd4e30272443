use pretty_assertions::assert_eq;
use stage_overlay::core::dma::DmaResult;
use stage_overlay::core::overlay::{OverlayError, OverlayResult};
use stage_overlay::{
    DmaError, DmaTransfer, HaltCause, LoaderError, Overlay, OverlayId, OverlayLoader, RomLayout,
    SegmentDescriptor, SegmentId, StageActivation, StageLoader, SLOT_COUNT,
};
use std::cell::RefCell;
use std::rc::Rc;

use SegmentId::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Overlay(OverlayId),
    Segment { rom: u32, vram: u32, len: u32 },
    Poll(i32),
}

type CallLog = Rc<RefCell<Vec<Call>>>;

/// Backend que registra cada chamada num log compartilhado
#[derive(Default)]
struct Recorder {
    log: CallLog,
    fail_rom: Option<u32>,
    fail_overlay: Option<OverlayId>,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }
}

impl DmaTransfer for Recorder {
    fn rom_read(&mut self, rom_src: u32, ram_dst: u32, len: u32) -> DmaResult<()> {
        if self.fail_rom == Some(rom_src) {
            return Err(DmaError::Device(format!("PI timeout at {:#X}", rom_src)));
        }
        self.log.borrow_mut().push(Call::Segment {
            rom: rom_src,
            vram: ram_dst,
            len,
        });
        Ok(())
    }
}

impl OverlayLoader for Recorder {
    fn load_overlay(&mut self, overlay: &Overlay) -> OverlayResult<()> {
        if self.fail_overlay == Some(overlay.id) {
            return Err(OverlayError::Loader(format!("{} relocation failed", overlay.id)));
        }
        self.log.borrow_mut().push(Call::Overlay(overlay.id));
        Ok(())
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn descriptor(id: SegmentId) -> SegmentDescriptor {
    let rom_start = 0x10_0000 + 0x1_0000 * id.index() as u32;
    SegmentDescriptor {
        id,
        rom_start,
        rom_end: rom_start + 0x800 + id.index() as u32,
        vram: 0x8030_0000,
    }
}

fn layout() -> RomLayout {
    let segments = SegmentId::ALL.iter().map(|&id| descriptor(id)).collect();
    let overlays = OverlayId::ALL
        .iter()
        .map(|&id| {
            let start = 0x80_0000 + 0x1_0000 * id.index() as u32;
            Overlay::data_only(id, start, start + 0x400, 0x8020_0000)
        })
        .collect();
    RomLayout::new(segments, overlays)
}

fn loader() -> StageLoader<Recorder> {
    StageLoader::from_layout(&layout(), Recorder::default()).unwrap()
}

fn expected(overlay: OverlayId, segments: &[SegmentId]) -> Vec<Call> {
    std::iter::once(Call::Overlay(overlay))
        .chain(segments.iter().map(|&id| {
            let d = descriptor(id);
            Call::Segment {
                rom: d.rom_start,
                vram: d.vram,
                len: d.rom_end - d.rom_start,
            }
        }))
        .collect()
}

#[test]
fn test_every_stage_sequence() {
    init_logger();

    let table: [(OverlayId, &[SegmentId]); 7] = [
        (
            OverlayId::Stage0,
            &[Stage0Extra, Magikarp1, Magikarp2, Pikachu1, Pikachu2],
        ),
        (
            OverlayId::Stage1,
            &[Stage1Extra, Magikarp1, Magikarp2, Pikachu1, Pikachu2, Zubat1, Zubat2],
        ),
        (OverlayId::Stage2, &[Stage2Extra, Magikarp1, Magikarp2]),
        (
            OverlayId::Stage3,
            &[Stage3Extra, Magikarp1, Magikarp2, Pikachu1, Pikachu2, Bulbasaur1, Bulbasaur2],
        ),
        (
            OverlayId::Stage4,
            &[
                Stage4Extra, Bulbasaur1, Bulbasaur2, Magikarp1, Magikarp2, Pikachu1, Pikachu2,
                Zubat1, Zubat2,
            ],
        ),
        (OverlayId::Stage5, &[Stage5Extra, Magikarp1, Magikarp2]),
        (OverlayId::Stage6, &[Stage6Extra]),
    ];

    for (stage, (overlay, segments)) in table.iter().enumerate() {
        let mut loader = loader();
        let activation = loader.activate_stage(stage as i32).unwrap();
        assert_eq!(
            activation,
            StageActivation::Activated {
                stage: stage as i32,
                transfers: segments.len(),
            }
        );
        assert_eq!(loader.backend().calls(), expected(*overlay, segments), "stage {}", stage);
    }
}

#[test]
fn test_unmapped_stages_issue_nothing() {
    init_logger();
    let mut loader = loader();
    for stage in [-1, 7, 100, i32::MIN, i32::MAX] {
        assert_eq!(
            loader.activate_stage(stage).unwrap(),
            StageActivation::Unmapped { stage }
        );
    }
    assert!(loader.backend().calls().is_empty());
}

#[test]
fn test_repeat_activation_reissues_everything() {
    let mut loader = loader();
    loader.activate_stage(5).unwrap();
    loader.activate_stage(5).unwrap();
    let once = expected(OverlayId::Stage5, &[Stage5Extra, Magikarp1, Magikarp2]);
    let twice: Vec<_> = once.iter().chain(once.iter()).copied().collect();
    assert_eq!(loader.backend().calls(), twice);
}

#[test]
fn test_corrupt_segment_aborts_before_transfer() {
    init_logger();
    let mut layout = layout();
    let pikachu1 = layout
        .segments
        .iter_mut()
        .find(|s| s.id == Pikachu1)
        .unwrap();
    pikachu1.rom_end = pikachu1.rom_start;

    let mut loader = StageLoader::from_layout(&layout, Recorder::default()).unwrap();
    let err = loader.activate_stage(0).unwrap_err();
    assert!(matches!(
        err,
        LoaderError::InvalidSegmentLength { segment: Pikachu1, .. }
    ));

    // Overlay, extra e os dois blocos magikarp saem antes da entrada corrompida
    assert_eq!(
        loader.backend().calls(),
        expected(OverlayId::Stage0, &[Stage0Extra, Magikarp1, Magikarp2])
    );
}

/// Sequência esperada do laço de cena até `last` (inclusive)
fn scene_sequence(last: i32) -> Vec<Call> {
    (0..=last)
        .flat_map(|slot| {
            [
                Call::Overlay(OverlayId::SceneAuxA),
                Call::Overlay(OverlayId::SceneAuxB),
                Call::Poll(slot),
            ]
        })
        .collect()
}

fn polling_initializer(log: CallLog, ready: Option<i32>) -> impl FnMut(i32) -> i32 {
    move |slot| {
        log.borrow_mut().push(Call::Poll(slot));
        (ready == Some(slot)) as i32
    }
}

#[test]
fn test_scene_manager_exhausts_all_slots() {
    init_logger();
    let mut loader = loader();
    let mut init = polling_initializer(loader.backend().log.clone(), None);

    let outcome = loader.run_scene_manager(&mut init).unwrap();
    assert_eq!(outcome, HaltCause::Exhausted);
    assert_eq!(loader.backend().calls(), scene_sequence(SLOT_COUNT - 1));
}

#[test]
fn test_scene_manager_stops_on_ready_slot() {
    let mut loader = loader();
    let mut init = polling_initializer(loader.backend().log.clone(), Some(5));

    let outcome = loader.run_scene_manager(&mut init).unwrap();
    assert_eq!(outcome, HaltCause::Success { slot: 5 });

    let calls = loader.backend().calls();
    assert_eq!(calls, scene_sequence(5));
    assert!(!calls.contains(&Call::Poll(6)));
}

#[test]
fn test_dma_failure_stops_activation() {
    init_logger();
    let backend = Recorder {
        fail_rom: Some(descriptor(Pikachu2).rom_start),
        ..Recorder::default()
    };
    let mut loader = StageLoader::from_layout(&layout(), backend).unwrap();

    let err = loader.activate_stage(1).unwrap_err();
    assert!(matches!(err, LoaderError::Dma(DmaError::Device(_))));
    // Nada depois de pikachu2 (zubat1/zubat2) é emitido
    assert_eq!(
        loader.backend().calls(),
        expected(OverlayId::Stage1, &[Stage1Extra, Magikarp1, Magikarp2, Pikachu1])
    );
}

#[test]
fn test_overlay_failure_issues_no_segments() {
    let backend = Recorder {
        fail_overlay: Some(OverlayId::Stage3),
        ..Recorder::default()
    };
    let mut loader = StageLoader::from_layout(&layout(), backend).unwrap();

    let err = loader.activate_stage(3).unwrap_err();
    assert!(matches!(err, LoaderError::Overlay(OverlayError::Loader(_))));
    assert!(loader.backend().calls().is_empty());
}

#[test]
fn test_overlay_failure_aborts_scene_loop() {
    let backend = Recorder {
        fail_overlay: Some(OverlayId::SceneAuxB),
        ..Recorder::default()
    };
    let mut loader = StageLoader::from_layout(&layout(), backend).unwrap();
    let mut init = polling_initializer(loader.backend().log.clone(), None);

    let err = loader.run_scene_manager(&mut init).unwrap_err();
    assert!(matches!(err, LoaderError::Overlay(OverlayError::Loader(_))));
    // O inicializador não chega a ser consultado
    assert_eq!(loader.backend().calls(), vec![Call::Overlay(OverlayId::SceneAuxA)]);
}

#[test]
fn test_accessors_survive_stage_switches() {
    let mut loader = loader();
    loader.set_selected_index(4);
    loader.set_selected_area(-2);
    loader.activate_stage(4).unwrap();
    loader.activate_stage(1).unwrap();
    assert_eq!(loader.selected_index(), 4);
    assert_eq!(loader.selected_area(), -2);
}
