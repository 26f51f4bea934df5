//! Hand input: where the hand is and what it is doing, once per frame.
//!
//! The public interface is a stream of [`HandUpdate`] snapshots delivered
//! over an `mpsc` channel. The render loop keeps whichever snapshot arrived
//! last, so a slow source simply means a stale hand, never a stalled frame.
//!
//! Two sources ship here:
//!
//! * [`SimHandSource`]: mouse/keyboard simulation fed from the window.
//! * [`ReplayHandSource`]: a JSON recording of tracker landmarks, classified
//!   with the same finger-fold test a live tracker would use.

use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use glam::Vec2;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use snow_field::{Gesture, HandState};

use crate::error::{AppError, Result};

/// One frame's worth of hand input. `None` means no hand in view.
pub type HandUpdate = Option<HandState>;

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait: unified interface for live and simulated input
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`HandUpdate`]s over a channel.
///
/// `run` should return once `tx.send` fails: the receiver is gone and the
/// render loop has shut down.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<HandUpdate>);
}

/// Spawn a hand source on its own thread and return the receiving end.
pub fn spawn_hand_source<H: HandSource>(source: H) -> Receiver<HandUpdate> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        Box::new(source).run(tx);
        debug!("hand source thread exiting");
    });
    rx
}

/// Drain everything pending and keep the newest snapshot in `hand`.
///
/// Returns `false` once the source has hung up; `hand` then keeps its last
/// value.
pub fn drain_latest(rx: &Receiver<HandUpdate>, hand: &mut HandUpdate) -> bool {
    loop {
        match rx.try_recv() {
            Ok(update)                      => *hand = update,
            Err(TryRecvError::Empty)        => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Viewport: canvas size shared with sources that work in normalized units
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Viewport(Arc<RwLock<Vec2>>);

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Viewport(Arc::new(RwLock::new(Vec2::new(width, height))))
    }

    pub fn set(&self, width: f32, height: f32) {
        if let Ok(mut size) = self.0.write() {
            *size = Vec2::new(width, height);
        }
    }

    pub fn size(&self) -> Vec2 {
        self.0.read().map(|s| *s).unwrap_or(Vec2::ONE)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource: mouse/keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw pointer state from the window, sent whenever it changes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimInput {
    /// Cursor position in canvas pixels; `None` when outside the window.
    pub pointer: Option<Vec2>,
    /// Left mouse button or `F`.
    pub attract: bool,
    /// Right mouse button or `O`.
    pub repel:   bool,
    /// `W` held.
    pub wave:    bool,
}

impl SimInput {
    /// Attract wins over repel, repel over wave.
    pub fn to_hand(&self) -> HandUpdate {
        let position = self.pointer?;
        let gesture = if self.attract {
            Gesture::Fist
        } else if self.repel {
            Gesture::OpenPalm
        } else if self.wave {
            Gesture::Wave
        } else {
            Gesture::None
        };
        Some(HandState::new(position, gesture))
    }
}

/// Translates [`SimInput`] from the visualizer into hand snapshots.
pub struct SimHandSource {
    pub rx: Receiver<SimInput>,
}

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<HandUpdate>) {
        for input in self.rx {
            if tx.send(input.to_hand()).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmarks: 21-point hand skeleton from an external tracker
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

const FINGER_TIPS:     [usize; 4] = [8, 12, 16, 20];
const FINGER_KNUCKLES: [usize; 4] = [6, 10, 14, 18];
/// Base of the middle finger; used as the hand's position.
const PALM_ANCHOR:     usize = 9;
/// Fingers that must agree before a pose counts.
const FINGER_QUORUM:   usize = 3;

/// Normalized image coordinates, `0.0..=1.0`, y down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// Fist when three or more fingertips sit below their middle knuckle,
/// open palm when three or more sit above, otherwise neutral.
pub fn classify_landmarks(landmarks: &[Landmark]) -> Gesture {
    if landmarks.len() < LANDMARK_COUNT {
        return Gesture::None;
    }
    let fingers = FINGER_TIPS.iter().zip(FINGER_KNUCKLES.iter())
        .map(|(&tip, &knuckle)| (landmarks[tip].y, landmarks[knuckle].y));

    let (mut bent, mut straight) = (0, 0);
    for (tip_y, knuckle_y) in fingers {
        if tip_y > knuckle_y { bent += 1; }
        if tip_y < knuckle_y { straight += 1; }
    }

    if bent >= FINGER_QUORUM {
        Gesture::Fist
    } else if straight >= FINGER_QUORUM {
        Gesture::OpenPalm
    } else {
        Gesture::None
    }
}

/// Hand snapshot for one tracker frame, mirrored horizontally so the
/// scene behaves like a mirror. Incomplete skeletons count as no hand.
pub fn hand_from_landmarks(landmarks: &[Landmark], width: f32, height: f32) -> HandUpdate {
    if landmarks.len() < LANDMARK_COUNT {
        return None;
    }
    let anchor = landmarks[PALM_ANCHOR];
    let position = Vec2::new((1.0 - anchor.x) * width, anchor.y * height);
    Some(HandState::new(position, classify_landmarks(landmarks)))
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayHandSource: recorded landmark frames
// ════════════════════════════════════════════════════════════════════════════

fn default_interval() -> u64 { 33 }

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Empty when the tracker saw no hand.
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

/// A landmark recording:
///
/// ```json
/// { "frame_interval_ms": 33,
///   "frames": [ { "landmarks": [ {"x": 0.5, "y": 0.4, "z": 0.0}, ... ] },
///               { "landmarks": [] } ] }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default = "default_interval")]
    pub frame_interval_ms: u64,
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    pub fn from_json(text: &str) -> Result<Self> {
        let rec: Recording = serde_json::from_str(text)?;
        if rec.frames.is_empty() {
            return Err(AppError::EmptyReplay);
        }
        Ok(rec)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let rec = Self::from_json(&fs::read_to_string(path)?)?;
        info!("loaded replay {} ({} frames @ {} ms)",
              path.display(), rec.frames.len(), rec.frame_interval_ms);
        Ok(rec)
    }

    /// Snapshots for every frame at a fixed canvas size.
    pub fn hands(&self, width: f32, height: f32) -> impl Iterator<Item = HandUpdate> + '_ {
        self.frames.iter().map(move |f| hand_from_landmarks(&f.landmarks, width, height))
    }
}

/// Plays a [`Recording`] on a loop, one frame per interval, scaled to the
/// current viewport.
pub struct ReplayHandSource {
    pub recording: Recording,
    pub viewport:  Viewport,
}

impl HandSource for ReplayHandSource {
    fn run(self: Box<Self>, tx: Sender<HandUpdate>) {
        let interval = Duration::from_millis(self.recording.frame_interval_ms.max(1));
        loop {
            for frame in &self.recording.frames {
                let size = self.viewport.size();
                let hand = hand_from_landmarks(&frame.landmarks, size.x, size.y);
                if tx.send(hand).is_err() {
                    return;
                }
                thread::sleep(interval);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// A flat hand at y = 0.5 with each finger's tip offset by `tip_dy`
    /// relative to its knuckle.
    fn skeleton(tip_dy: [f32; 4]) -> Vec<Landmark> {
        let mut l = vec![Landmark { x: 0.25, y: 0.5, z: 0.0 }; LANDMARK_COUNT];
        for (i, (&tip, &knuckle)) in FINGER_TIPS.iter().zip(FINGER_KNUCKLES.iter()).enumerate() {
            l[knuckle].y = 0.5;
            l[tip].y = 0.5 + tip_dy[i];
        }
        l
    }

    #[test]
    fn fist_when_tips_below_knuckles() {
        assert_eq!(classify_landmarks(&skeleton([0.1, 0.1, 0.1, 0.1])), Gesture::Fist);
        assert_eq!(classify_landmarks(&skeleton([0.1, 0.1, 0.1, -0.1])), Gesture::Fist);
    }

    #[test]
    fn open_palm_when_tips_above_knuckles() {
        assert_eq!(classify_landmarks(&skeleton([-0.1, -0.1, -0.1, -0.1])), Gesture::OpenPalm);
        assert_eq!(classify_landmarks(&skeleton([-0.1, 0.1, -0.1, -0.1])), Gesture::OpenPalm);
    }

    #[test]
    fn split_hand_is_neutral() {
        assert_eq!(classify_landmarks(&skeleton([0.1, 0.1, -0.1, -0.1])), Gesture::None);
        assert_eq!(classify_landmarks(&skeleton([0.0, 0.0, 0.0, 0.0])), Gesture::None);
    }

    #[test]
    fn short_skeleton_is_no_hand() {
        let l = vec![Landmark::default(); 5];
        assert_eq!(classify_landmarks(&l), Gesture::None);
        assert_eq!(hand_from_landmarks(&l, 100.0, 100.0), None);
    }

    #[test]
    fn hand_position_is_mirrored() {
        let l = skeleton([0.1; 4]);
        let hand = hand_from_landmarks(&l, 800.0, 600.0).unwrap();
        assert_eq!(hand.position, Vec2::new(600.0, 300.0));
        assert_eq!(hand.gesture, Gesture::Fist);
    }

    #[test]
    fn sim_input_priorities() {
        let at = Some(Vec2::new(10.0, 20.0));
        let all = SimInput { pointer: at, attract: true, repel: true, wave: true };
        assert_eq!(all.to_hand().unwrap().gesture, Gesture::Fist);
        let repel = SimInput { attract: false, ..all };
        assert_eq!(repel.to_hand().unwrap().gesture, Gesture::OpenPalm);
        let wave = SimInput { repel: false, ..repel };
        assert_eq!(wave.to_hand().unwrap().gesture, Gesture::Wave);
        let idle = SimInput { pointer: at, ..SimInput::default() };
        assert_eq!(idle.to_hand(), Some(HandState::new(Vec2::new(10.0, 20.0), Gesture::None)));
        assert_eq!(SimInput { pointer: None, ..all }.to_hand(), None);
    }

    #[test]
    fn sim_source_forwards_and_exits() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_hand_source(SimHandSource { rx: sim_rx });
        sim_tx.send(SimInput { pointer: Some(Vec2::new(1.0, 2.0)), wave: true, ..SimInput::default() }).unwrap();
        let got = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(got.unwrap().gesture, Gesture::Wave);
        drop(sim_tx);
        // The source hangs up once its input side is gone.
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }

    #[test]
    fn drain_keeps_newest() {
        let (tx, rx) = mpsc::channel();
        let a = HandState::new(Vec2::ZERO, Gesture::Fist);
        let b = HandState::new(Vec2::ONE,  Gesture::OpenPalm);
        tx.send(Some(a)).unwrap();
        tx.send(Some(b)).unwrap();
        let mut hand = None;
        assert!(drain_latest(&rx, &mut hand));
        assert_eq!(hand, Some(b));

        // Nothing pending: previous snapshot is kept.
        assert!(drain_latest(&rx, &mut hand));
        assert_eq!(hand, Some(b));

        drop(tx);
        assert!(!drain_latest(&rx, &mut hand));
        assert_eq!(hand, Some(b));
    }

    #[test]
    fn recording_parses_and_defaults_interval() {
        let json = r#"{ "frames": [ { "landmarks": [] }, {} ] }"#;
        let rec = Recording::from_json(json).unwrap();
        assert_eq!(rec.frame_interval_ms, 33);
        assert_eq!(rec.frames.len(), 2);
        assert!(rec.hands(100.0, 100.0).all(|h| h.is_none()));
    }

    #[test]
    fn recording_rejects_empty_and_garbage() {
        assert!(matches!(Recording::from_json(r#"{ "frames": [] }"#), Err(AppError::EmptyReplay)));
        assert!(matches!(Recording::from_json("not json"), Err(AppError::Replay(_))));
    }

    #[test]
    fn recording_round_trips_through_file() {
        let rec = Recording {
            frame_interval_ms: 10,
            frames: vec![RecordedFrame { landmarks: skeleton([-0.1; 4]) }],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hand.json");
        fs::write(&path, serde_json::to_string(&rec).unwrap()).unwrap();

        let loaded = Recording::load(&path).unwrap();
        let hands: Vec<_> = loaded.hands(200.0, 100.0).collect();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].unwrap().gesture, Gesture::OpenPalm);
    }

    #[test]
    fn replay_source_follows_viewport() {
        let rec = Recording {
            frame_interval_ms: 1,
            frames: vec![RecordedFrame { landmarks: skeleton([0.1; 4]) }],
        };
        let viewport = Viewport::new(400.0, 200.0);
        let rx = spawn_hand_source(ReplayHandSource { recording: rec, viewport: viewport.clone() });
        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!(first.position, Vec2::new(300.0, 100.0));

        viewport.set(800.0, 400.0);
        let mut later = first;
        for _ in 0..50 {
            later = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
            if later.position.x > 300.0 { break; }
        }
        assert_eq!(later.position, Vec2::new(600.0, 200.0));
        drop(rx);
    }
}
