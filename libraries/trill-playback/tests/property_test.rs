//! Property-based tests for transport, volume and engine invariants

mod common;

use common::Harness;
use proptest::prelude::*;
use trill_playback::{EngineState, Intent, PlayerConfig, TransportState, Volume, VolumeCurve};

#[derive(Debug, Clone)]
enum Op {
    Toggle,
    Seek(f64),
    Volume(i32),
    Mute,
    Loop,
    Frame(f64),
    Load,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Toggle),
        2 => (-0.5f64..1.5).prop_map(Op::Seek),
        1 => (-50i32..200).prop_map(Op::Volume),
        1 => Just(Op::Mute),
        1 => Just(Op::Loop),
        4 => (0.01f64..3.0).prop_map(Op::Frame),
        1 => Just(Op::Load),
    ]
}

proptest! {
    #[test]
    fn pause_resume_preserves_position(
        duration in 1.0f64..600.0,
        start in 0.0f64..10_000.0,
        play_for in 0.0f64..1.0,
        paused_for in 0.0f64..1_000.0,
    ) {
        let mut transport = TransportState::default();
        transport.load(duration, start);
        transport.play(start).unwrap();

        let pause_at = start + play_for * duration;
        transport.pause(pause_at);
        let frozen = transport.elapsed(pause_at);

        let resume_at = pause_at + paused_for;
        prop_assert!((transport.elapsed(resume_at) - frozen).abs() < 1e-9);

        transport.play(resume_at).unwrap();
        prop_assert!((transport.elapsed(resume_at) - frozen).abs() < 1e-6);
    }

    #[test]
    fn seek_lands_inside_track(duration in 0.5f64..600.0, fraction in -10.0f64..10.0) {
        let mut transport = TransportState::default();
        transport.load(duration, 0.0);

        let target = transport.seek(fraction, 5.0).unwrap();

        prop_assert!((0.0..=duration).contains(&target));
        prop_assert!(transport.is_paused());
        prop_assert_eq!(transport.elapsed(99.0), target);
    }

    #[test]
    fn double_mute_restores_level(level in 0u8..=100) {
        let mut volume = Volume::new(level, VolumeCurve::Linear);
        volume.toggle_mute();
        prop_assert_eq!(volume.level(), 0);
        volume.toggle_mute();
        prop_assert_eq!(volume.level(), level);
        prop_assert!(!volume.is_muted());
    }

    #[test]
    fn engine_volume_stays_in_range(level in any::<i32>()) {
        let mut h = Harness::new(PlayerConfig::default());
        h.engine.set_volume(level).unwrap();
        prop_assert!(h.engine.volume_level() <= 100);
        prop_assert_eq!(i32::from(h.engine.volume_level()), level.clamp(0, 100));
    }

    #[test]
    fn random_sessions_keep_invariants(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut h = Harness::playing(12.0);

        for op in ops {
            // Errors are fine here, only the invariants matter
            let _ = match op {
                Op::Toggle => h.engine.dispatch(Intent::PlayToggle),
                Op::Seek(f) => h.engine.dispatch(Intent::Seek(f)),
                Op::Volume(v) => h.engine.dispatch(Intent::SetVolume(v)),
                Op::Mute => h.engine.dispatch(Intent::Mute),
                Op::Loop => h.engine.dispatch(Intent::ToggleLoop),
                Op::Frame(dt) => {
                    h.frame_after(dt);
                    Ok(())
                }
                Op::Load => {
                    h.engine.load(b"again".to_vec());
                    Ok(())
                }
            };

            let playing = h.engine.state() == EngineState::Playing;

            // At most one live source, and only while playing
            prop_assert!(h.sink.live_sources().len() <= 1);
            prop_assert_eq!(h.engine.active_source().is_some(), playing);

            // A tick is pending exactly while playing
            prop_assert_eq!(h.engine.has_scheduled_tick(), playing);
            prop_assert!(h.scheduler.pending() <= 1);

            if let Some(duration) = h.engine.duration() {
                let sample = h.engine.position_sample();
                prop_assert!(sample.elapsed_seconds >= 0.0);
                prop_assert!(sample.elapsed_seconds <= duration);
                prop_assert!((0.0..=100.0).contains(&sample.percent));
            }
            prop_assert!(h.engine.volume_level() <= 100);
        }
    }
}
