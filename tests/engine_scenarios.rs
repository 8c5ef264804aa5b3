use approx::assert_abs_diff_eq;
use nalgebra as na;
use qcrowd::bbox::BBox;
use qcrowd::heatmap::Heatmap;
use qcrowd::error::Error;
use qcrowd::history::{MotionHistory, Trail};
use qcrowd::velocity::{instantaneous_speed, MIN_HISTORY_POINTS};
use qcrowd::{BehaviorEngine, EngineConfig, Track};

fn person(id: u64, l: f32, t: f32, r: f32, b: f32) -> Track {
    Track::new(id, BBox::ltrb(l, t, r, b))
}

/// Boxes whose centroids walk (110,120) -> (110,130) -> (110,145).
fn walking_boxes() -> [Track; 3] {
    [
        person(1, 100.0, 100.0, 120.0, 140.0),
        person(1, 100.0, 110.0, 120.0, 150.0),
        person(1, 100.0, 125.0, 120.0, 165.0),
    ]
}

fn run(threshold: f32) -> (bool, f32) {
    let mut engine = BehaviorEngine::with_dims(640, 480).unwrap();
    let mut last = (false, 0.0);

    for track in walking_boxes().iter() {
        last = engine.process(std::slice::from_ref(track), threshold);
    }

    assert_eq!(engine.occupancy(), 1);
    last
}

#[test]
fn sudden_step_above_threshold_is_panic() {
    let (panic, v) = run(5.0);

    assert!(panic);
    assert_abs_diff_eq!(v, 15.0, epsilon = 1e-4);
}

#[test]
fn same_step_below_high_threshold_is_calm() {
    let (panic, v) = run(20.0);

    assert!(!panic);
    assert_abs_diff_eq!(v, 15.0, epsilon = 1e-4);
}

#[test]
fn first_two_frames_have_no_velocity() {
    let mut engine = BehaviorEngine::with_dims(640, 480).unwrap();
    let boxes = walking_boxes();

    assert_eq!(engine.process(&boxes[..1], 0.0), (false, 0.0));
    assert_eq!(engine.process(&boxes[1..2], 0.0), (false, 0.0));
}

#[test]
fn empty_frame_regardless_of_threshold() {
    for threshold in [-10.0, 0.0, 5.0, 1000.0].iter() {
        let mut engine = BehaviorEngine::with_dims(640, 480).unwrap();

        assert_eq!(engine.process(&[], *threshold), (false, 0.0));
        assert_eq!(engine.occupancy(), 0);
    }
}

#[test]
fn threshold_equality_is_not_panic() {
    // steady 5 px steps along the x axis
    let feed = |threshold: f32| {
        let mut engine = BehaviorEngine::with_dims(640, 480).unwrap();
        let mut out = (false, 0.0);

        for i in 0..3 {
            let x = 100.0 + 5.0 * i as f32;
            out = engine.process(&[person(4, x - 10.0, 90.0, x + 10.0, 110.0)], threshold);
        }

        out
    };

    let (panic, v) = feed(5.0);
    assert_abs_diff_eq!(v, 5.0);
    assert!(!panic);

    let (panic, _) = feed(4.0);
    assert!(panic);
}

#[test]
fn history_keeps_last_ten_in_order() {
    let mut history = MotionHistory::new(10);

    for i in 0..15u64 {
        history.record(1, na::Point2::new(i as f32, 2.0 * i as f32), i);
    }

    let kept = history.history_of(1);
    assert_eq!(kept.len(), 10);
    for (offset, p) in kept.iter().enumerate() {
        let i = (offset + 5) as f32;
        assert_eq!(*p, na::Point2::new(i, 2.0 * i));
    }
}

#[test]
fn engine_history_is_bounded_by_window() {
    let mut engine = BehaviorEngine::with_dims(640, 480).unwrap();

    for i in 0..15 {
        let y = 100.0 + i as f32;
        engine.process(&[person(2, 10.0, y - 5.0, 20.0, y + 5.0)], 50.0);
    }

    let kept = engine.history().history_of(2);
    assert_eq!(kept.len(), 10);
    assert_abs_diff_eq!(kept[0].y, 105.0);
    assert_abs_diff_eq!(kept[9].y, 114.0);
}

#[test]
fn out_of_grid_deposit_changes_nothing() {
    let mut map = Heatmap::new(640, 480);
    let before = map.field().to_owned();

    assert!(!map.deposit(na::Point2::new(-10.0, -10.0)));
    assert_eq!(map.field(), before.view());
}

#[test]
fn deposits_never_decrease() {
    let mut engine = BehaviorEngine::with_dims(640, 480).unwrap();
    let mut prev = engine.heatmap().field().to_owned();

    for i in 0..5 {
        let x = 50.0 + 7.0 * i as f32;
        let tracks = [
            person(1, x, 50.0, x + 20.0, 90.0),
            person(2, 300.0, 300.0, 320.0, 340.0),
        ];
        engine.process(&tracks, 10.0);

        let curr = engine.heatmap().field().to_owned();
        assert!(prev.iter().zip(curr.iter()).all(|(a, b)| b >= a));
        prev = curr;
    }
}

#[test]
fn speed_from_a_caller_built_trail() {
    let mut trail = Trail::new(10);

    for (frame, y) in [120.0, 130.0, 145.0].iter().enumerate() {
        assert!(instantaneous_speed(&trail, MIN_HISTORY_POINTS).is_none());
        trail.push(na::Point2::new(110.0, *y), frame as u64);
    }

    assert_abs_diff_eq!(instantaneous_speed(&trail, MIN_HISTORY_POINTS).unwrap(), 15.0);
}

#[test]
fn window_shorter_than_minimum_is_rejected() {
    let config = EngineConfig {
        history_window: 2,
        ..EngineConfig::new(640, 480)
    };

    assert!(matches!(
        BehaviorEngine::new(config),
        Err(Error::InvalidConfig(_))
    ));
}
