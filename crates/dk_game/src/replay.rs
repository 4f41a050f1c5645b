use crate::gameplay::{GameSession, SceneRequest};
use dk_core::input::{InputState, Key};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt_us")]
    pub fixed_dt_us: u64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayFrame {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub jump: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One entry per fixed tick.
    pub fn expanded_frames(&self) -> Vec<ReplayFrame> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(ReplayFrame { repeat: 1, ..*frame });
            }
        }
        out
    }
}

/// Feeds scripted key state into a session the way the window loop does:
/// key transitions, one tick, then the end of the input frame.
#[derive(Default)]
pub struct ReplayDriver {
    input: InputState,
}

impl ReplayDriver {
    pub fn step(
        &mut self,
        session: &mut GameSession,
        frame: &ReplayFrame,
        dt_us: u64,
    ) -> Option<SceneRequest> {
        set_key(&mut self.input, Key::Left, frame.left);
        set_key(&mut self.input, Key::Right, frame.right);
        set_key(&mut self.input, Key::Space, frame.jump);
        let request = session.tick(Some(&self.input), dt_us);
        self.input.end_frame();
        request
    }
}

fn set_key(input: &mut InputState, key: Key, down: bool) {
    match (down, input.is_held(key)) {
        (true, false) => input.key_down(key),
        (false, true) => input.key_up(key),
        _ => {}
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt_us == 0 {
        return Err("Replay validation failed: fixed_dt_us must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt_us() -> u64 {
    dk_core::time::DEFAULT_FIXED_DT_US
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::gameplay::Outcome;
    use dk_level::{CellType, LevelCell, LevelData};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dk_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn sample_level() -> LevelData {
        let mut level = LevelData::empty(30, 15);
        for col in 0..30 {
            level.cells.push(LevelCell::new(col, 14, CellType::Platform));
        }
        for col in 8..12 {
            level.cells.push(LevelCell::new(col, 11, CellType::Platform));
        }
        level.cells.push(LevelCell::new(2, 13, CellType::PlayerStart));
        level.cells.push(LevelCell::new(20, 13, CellType::Spring));
        level.cells.push(LevelCell::new(28, 13, CellType::Goal));
        level
    }

    fn frames(list: &[(bool, bool, bool, u32)]) -> Vec<ReplayFrame> {
        list.iter()
            .map(|&(left, right, jump, repeat)| ReplayFrame {
                left,
                right,
                jump,
                repeat,
            })
            .collect()
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "right": true, "repeat": 3 },
                { "jump": true }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        assert_eq!(replay.fixed_dt_us, 16_667);
        let expanded = replay.expanded_frames();
        assert_eq!(expanded.len(), 4);
        assert!(expanded[0].right);
        assert!(expanded[3].jump);
        assert!(!expanded[3].right);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = ReplaySequence {
            fixed_dt_us: 16_667,
            frames: frames(&[
                (false, true, false, 40),
                (false, true, true, 1),
                (false, true, false, 30),
                (false, true, true, 1),
                (true, false, false, 60),
            ]),
        };
        let inputs = replay.expanded_frames();
        let config = GameConfig::default();

        let mut run_a = GameSession::new(sample_level(), false, &config);
        let mut run_b = GameSession::new(sample_level(), false, &config);
        let mut driver_a = ReplayDriver::default();
        let mut driver_b = ReplayDriver::default();
        for frame in &inputs {
            driver_a.step(&mut run_a, frame, replay.fixed_dt_us);
        }
        for frame in &inputs {
            driver_b.step(&mut run_b, frame, replay.fixed_dt_us);
        }

        let (a, b) = (run_a.player_aabb(), run_b.player_aabb());
        assert!((a.center_x - b.center_x).abs() < 0.0001);
        assert!((a.center_y - b.center_y).abs() < 0.0001);
        assert_eq!(run_a.player().jump_count(), run_b.player().jump_count());
        assert_eq!(run_a.player().angle(), run_b.player().angle());
        assert_eq!(run_a.outcome(), run_b.outcome());
    }

    #[test]
    fn scripted_double_jump_spins_then_lands_clean() {
        let config = GameConfig::default();
        let mut session = GameSession::new(sample_level(), false, &config);
        let mut driver = ReplayDriver::default();
        fn run(
            session: &mut GameSession,
            driver: &mut ReplayDriver,
            list: &[(bool, bool, bool, u32)],
        ) {
            let replay = ReplaySequence {
                fixed_dt_us: 16_667,
                frames: frames(list),
            };
            for frame in &replay.expanded_frames() {
                driver.step(session, frame, replay.fixed_dt_us);
            }
        }

        run(&mut session, &mut driver, &[(false, false, false, 10)]);
        assert_eq!(session.player().jump_count(), 0);

        // Held for 12 ticks: still one jump.
        run(&mut session, &mut driver, &[(false, false, true, 12)]);
        assert_eq!(session.player().jump_count(), 1);

        run(
            &mut session,
            &mut driver,
            &[(false, false, false, 1), (false, false, true, 1)],
        );
        assert_eq!(session.player().jump_count(), 2);
        assert!(session.player().is_spinning());

        run(&mut session, &mut driver, &[(false, false, false, 150)]);
        assert!(session.player().is_on_ground(session.physics()));
        assert_eq!(session.player().jump_count(), 0);
        assert!(!session.player().is_spinning());
        assert_eq!(session.player().angle(), 0.0);
        assert_eq!(session.outcome(), Outcome::Playing);
    }
}
