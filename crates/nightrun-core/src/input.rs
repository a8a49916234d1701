use serde::{Deserialize, Serialize};

/// Level-sensitive driving intents, sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveIntents {
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
}

impl DriveIntents {
    /// Hold the throttle and nothing else.
    pub fn throttle() -> Self {
        Self {
            accelerate: true,
            ..Default::default()
        }
    }

    /// Steering direction: -1 left, +1 right, 0 none. Left wins when both are held.
    pub fn steer(&self) -> i8 {
        if self.steer_left {
            -1
        } else if self.steer_right {
            1
        } else {
            0
        }
    }
}

/// Edge-triggered commands from the presentation shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Only meaningful in START.
    Start,
    /// Only meaningful in GAME_OVER.
    Restart,
    Pause,
    Resume,
}

/// Everything the engine consumes at the start of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInputs {
    pub drive: DriveIntents,
    pub command: Option<Command>,
}

impl FrameInputs {
    pub fn driving(drive: DriveIntents) -> Self {
        Self {
            drive,
            command: None,
        }
    }

    pub fn command(command: Command) -> Self {
        Self {
            drive: DriveIntents::default(),
            command: Some(command),
        }
    }
}
