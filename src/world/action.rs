//! Action intents and the execution boundary.
//!
//! Jobs decide, the cycle acts: `work()` returns [`Action`] values, the Mayor
//! hands them to an [`ActionSink`] in a fixed order, and interprets the numeric
//! [`ResultCode`] that comes back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::movement::MoveRequest;

/// One world action a worker should attempt this tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Harvest { target: String },
    Withdraw { target: String },
    Transfer { target: String },
    Build { target: String },
    Repair { target: String },
    Upgrade { target: String },
    Dismantle { target: String },
    Attack { target: String },
    Claim { target: String },
    Reserve { target: String },
    Sign { target: String, text: String },
    Recycle { spawn: String },
    Move(MoveRequest),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Harvest { .. } => "harvest",
            Action::Withdraw { .. } => "withdraw",
            Action::Transfer { .. } => "transfer",
            Action::Build { .. } => "build",
            Action::Repair { .. } => "repair",
            Action::Upgrade { .. } => "upgrade",
            Action::Dismantle { .. } => "dismantle",
            Action::Attack { .. } => "attack",
            Action::Claim { .. } => "claim",
            Action::Reserve { .. } => "reserve",
            Action::Sign { .. } => "sign",
            Action::Recycle { .. } => "recycle",
            Action::Move(_) => "move",
        }
    }
}

/// Numeric result codes returned by the action boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    Ok,
    NotOwner,
    NoPath,
    Busy,
    NotFound,
    NotEnoughResources,
    InvalidTarget,
    Full,
    NotInRange,
    InvalidArgs,
    Tired,
    NoBodypart,
    Unknown(i32),
}

impl ResultCode {
    pub fn code(&self) -> i32 {
        match self {
            ResultCode::Ok => 0,
            ResultCode::NotOwner => -1,
            ResultCode::NoPath => -2,
            ResultCode::Busy => -4,
            ResultCode::NotFound => -5,
            ResultCode::NotEnoughResources => -6,
            ResultCode::InvalidTarget => -7,
            ResultCode::Full => -8,
            ResultCode::NotInRange => -9,
            ResultCode::InvalidArgs => -10,
            ResultCode::Tired => -11,
            ResultCode::NoBodypart => -12,
            ResultCode::Unknown(code) => *code,
        }
    }

    /// How the caller should react to this result
    pub fn disposition(&self) -> Disposition {
        match self {
            ResultCode::Ok => Disposition::Done,
            ResultCode::NotInRange => Disposition::Approach,
            ResultCode::Busy | ResultCode::Tired | ResultCode::NoPath => Disposition::Retry,
            _ => Disposition::Informational,
        }
    }
}

impl From<i32> for ResultCode {
    fn from(code: i32) -> Self {
        match code {
            0 => ResultCode::Ok,
            -1 => ResultCode::NotOwner,
            -2 => ResultCode::NoPath,
            -4 => ResultCode::Busy,
            -5 => ResultCode::NotFound,
            -6 => ResultCode::NotEnoughResources,
            -7 => ResultCode::InvalidTarget,
            -8 => ResultCode::Full,
            -9 => ResultCode::NotInRange,
            -10 => ResultCode::InvalidArgs,
            -11 => ResultCode::Tired,
            -12 => ResultCode::NoBodypart,
            other => ResultCode::Unknown(other),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

/// Classification of a non-success result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Action succeeded
    Done,
    /// Worker is too far away; move toward the target
    Approach,
    /// Transient; the same action is attempted next cycle
    Retry,
    /// Nothing to do; the job will stop being generated on its own
    Informational,
}

/// The execution boundary consumed by the scheduler
pub trait ActionSink {
    /// Attempt `action` with the given worker and report the result
    fn perform(&mut self, worker: &str, action: &Action) -> ResultCode;
}

/// A sink that records every action and answers from a fixed script.
///
/// Actions not covered by the script succeed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub performed: Vec<(String, Action)>,
    script: Vec<(String, &'static str, ResultCode)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `code` whenever `worker` attempts an action named `action`
    pub fn respond(mut self, worker: &str, action: &'static str, code: ResultCode) -> Self {
        self.script.push((worker.to_string(), action, code));
        self
    }

    /// Actions performed by one worker, in order
    pub fn actions_of(&self, worker: &str) -> Vec<&Action> {
        self.performed
            .iter()
            .filter(|(w, _)| w == worker)
            .map(|(_, a)| a)
            .collect()
    }
}

impl ActionSink for RecordingSink {
    fn perform(&mut self, worker: &str, action: &Action) -> ResultCode {
        self.performed.push((worker.to_string(), action.clone()));
        self.script
            .iter()
            .find(|(w, name, _)| w == worker && *name == action.name())
            .map(|(_, _, code)| *code)
            .unwrap_or(ResultCode::Ok)
    }
}
