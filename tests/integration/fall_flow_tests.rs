//! Fall detection scenarios at 50 Hz through the public detector API.

use vitalguard::config::MonitorConfig;
use vitalguard::fall::analysis::MovementPattern;
use vitalguard::fall::fsm::StateId;
use vitalguard::fall::{FallDetector, FallEvent};
use vitalguard::profile::{Condition, Gender, SubjectProfile};
use vitalguard::telemetry::AccelerometerSample;

const PERIOD_MS: u64 = 20;

struct Wearer {
    det: FallDetector,
    t: u64,
    falls: Vec<FallEvent>,
}

impl Wearer {
    fn new(config: &MonitorConfig, profile: &SubjectProfile) -> Self {
        Self {
            det: FallDetector::new(config, profile),
            t: 0,
            falls: Vec::new(),
        }
    }

    fn default_adult() -> Self {
        Self::new(&MonitorConfig::default(), &SubjectProfile::new(Some(60), Gender::Female))
    }

    fn hold(&mut self, magnitude: f32, ms: u64) {
        for _ in 0..ms / PERIOD_MS {
            self.push(magnitude);
        }
    }

    fn push(&mut self, magnitude: f32) {
        let s = AccelerometerSample::new(0.0, magnitude, 0.0, self.t);
        if let Some(e) = self.det.on_sample(s, self.t) {
            self.falls.push(e);
        }
        self.t += PERIOD_MS;
    }

    fn fall(&mut self) {
        self.hold(9.8, 1_000);
        self.hold(3.0, 200);
        self.hold(32.0, 60);
        self.hold(9.8, 3_200);
    }
}

#[test]
fn classic_fall_is_confirmed_once() {
    let mut w = Wearer::default_adult();
    w.fall();
    assert_eq!(w.falls.len(), 1);
    assert!(w.falls[0].sample.magnitude() > 25.0);
    assert!(w.det.is_cooling_down());
}

#[test]
fn fall_is_caught_whatever_the_standing_time() {
    let mut missed = Vec::new();
    for standing_ms in (1_000..11_000).step_by(20) {
        let mut w = Wearer::default_adult();
        w.hold(9.8, standing_ms);
        w.hold(5.0, 200);
        w.hold(30.0, 100);
        w.hold(9.8, 3_200);
        if w.falls.len() != 1 {
            missed.push(standing_ms);
        }
    }
    assert!(missed.is_empty(), "no single fall after standing {:?} ms", missed);
}

#[test]
fn slow_sink_without_impact_times_out() {
    let mut w = Wearer::default_adult();
    w.hold(9.8, 1_000);
    w.hold(5.0, 5_400);
    assert_eq!(w.det.state(), StateId::Idle);
    // a later impact alone is not a fall
    w.hold(30.0, 100);
    w.hold(9.8, 3_200);
    assert!(w.falls.is_empty());
}

#[test]
fn walking_never_confirms() {
    let mut w = Wearer::default_adult();
    for _ in 0..500 {
        w.push(8.0);
        w.push(12.0);
    }
    assert!(w.falls.is_empty());
    assert_eq!(w.det.movement_pattern(), MovementPattern::Normal);
}

#[test]
fn impact_then_getting_up_is_rejected() {
    let mut w = Wearer::default_adult();
    w.hold(9.8, 1_000);
    w.hold(32.0, 40);
    for _ in 0..100 {
        w.push(5.0);
        w.push(15.0);
    }
    assert!(w.falls.is_empty());
}

#[test]
fn second_fall_inside_cooldown_is_suppressed() {
    let mut w = Wearer::default_adult();
    w.fall();
    w.fall();
    assert_eq!(w.falls.len(), 1);

    // Past the 30 s cooldown a new fall counts again.
    w.hold(9.8, 30_000);
    assert!(!w.det.is_cooling_down());
    w.fall();
    assert_eq!(w.falls.len(), 2);
}

#[test]
fn sensor_dropout_after_impact_still_confirms_on_tick() {
    let mut w = Wearer::default_adult();
    w.hold(9.8, 1_000);
    w.hold(32.0, 20);
    w.hold(9.8, 200);
    assert_eq!(w.det.state(), StateId::ImpactWait);
    let deadline = w.det.next_deadline().unwrap();
    assert!(w.det.advance(deadline - 1).is_none());
    assert!(w.det.advance(deadline).is_some());
}

#[test]
fn upright_subject_stays_ready_for_a_drop() {
    let mut w = Wearer::default_adult();
    w.hold(9.8, 200);
    assert_eq!(w.det.state(), StateId::PotentialFall);
    w.hold(9.8, 5_200);
    assert!(w.falls.is_empty());
    assert_eq!(w.det.state(), StateId::PotentialFall);
}

#[test]
fn frail_profile_detects_with_lower_baseline() {
    let profile = SubjectProfile::new(Some(85), Gender::Male).with_condition(Condition::Osteoporosis);
    let mut w = Wearer::new(&MonitorConfig::default(), &profile);
    assert!((w.det.baseline() - 9.8 * 0.8 * 0.7).abs() < 1e-4);
    w.fall();
    assert_eq!(w.falls.len(), 1);
}

#[test]
fn custom_impact_threshold_is_honoured() {
    let config = MonitorConfig {
        impact_threshold: 40.0,
        ..MonitorConfig::default()
    };
    let mut w = Wearer::new(&config, &SubjectProfile::default());
    w.fall();
    assert!(w.falls.is_empty());
}
