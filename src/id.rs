//! Job identity for Mayor
//!
//! Jobs are rebuilt from the world every cycle, so the only thing that
//! survives a cycle boundary is a job's identity. A [`JobId`] is a structured
//! record (kind + target entity + optional numeric parameter); it is encoded
//! as a dash-delimited string only when it is written to storage.
//!
//! Format: `{kind}-{target}` or `{kind}-{target}-{param}`
//! Example: `harvest-src1`, `repair-wall7-250000`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MayorError, Result};

/// Discriminator for the closed set of job variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Harvest,
    Pickup,
    Unload,
    Build,
    Repair,
    Upgrade,
    Dismantle,
    Attack,
    Claim,
    Reserve,
    Scout,
    Sign,
    Recycle,
}

impl JobKind {
    /// Every kind, in tag order
    pub const ALL: [JobKind; 13] = [
        JobKind::Harvest,
        JobKind::Pickup,
        JobKind::Unload,
        JobKind::Build,
        JobKind::Repair,
        JobKind::Upgrade,
        JobKind::Dismantle,
        JobKind::Attack,
        JobKind::Claim,
        JobKind::Reserve,
        JobKind::Scout,
        JobKind::Sign,
        JobKind::Recycle,
    ];

    /// Tag used as the leading segment of an encoded job id
    pub fn tag(&self) -> &'static str {
        match self {
            JobKind::Harvest => "harvest",
            JobKind::Pickup => "pickup",
            JobKind::Unload => "unload",
            JobKind::Build => "build",
            JobKind::Repair => "repair",
            JobKind::Upgrade => "upgrade",
            JobKind::Dismantle => "dismantle",
            JobKind::Attack => "attack",
            JobKind::Claim => "claim",
            JobKind::Reserve => "reserve",
            JobKind::Scout => "scout",
            JobKind::Sign => "sign",
            JobKind::Recycle => "recycle",
        }
    }

    /// Look up a kind by its tag
    pub fn from_tag(tag: &str) -> Option<JobKind> {
        JobKind::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Whether ids of this kind carry a trailing numeric parameter
    pub fn takes_param(&self) -> bool {
        matches!(self, JobKind::Repair | JobKind::Recycle)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Stable, reconstructable identity of a job
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId {
    pub kind: JobKind,
    /// World entity id (or room name for room-scoped jobs)
    pub target: String,
    pub param: Option<u32>,
}

impl JobId {
    /// Create an id without a numeric parameter
    pub fn new(kind: JobKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            param: None,
        }
    }

    /// Create an id with a numeric parameter
    pub fn with_param(kind: JobKind, target: impl Into<String>, param: u32) -> Self {
        Self {
            kind,
            target: target.into(),
            param: Some(param),
        }
    }

    /// Encode for storage
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parse an encoded id
    pub fn parse(encoded: &str) -> Result<Self> {
        let (tag, rest) = encoded
            .split_once('-')
            .ok_or_else(|| MayorError::MalformedJobId(encoded.to_string()))?;
        let kind = JobKind::from_tag(tag).ok_or_else(|| MayorError::UnknownJobKind(tag.to_string()))?;

        let (target, param) = if kind.takes_param() {
            let (target, param) = rest
                .rsplit_once('-')
                .ok_or_else(|| MayorError::MalformedJobId(encoded.to_string()))?;
            let param = param
                .parse::<u32>()
                .map_err(|_| MayorError::MalformedJobId(encoded.to_string()))?;
            (target, Some(param))
        } else {
            (rest, None)
        };

        if target.is_empty() {
            return Err(MayorError::MalformedJobId(encoded.to_string()));
        }

        Ok(Self {
            kind,
            target: target.to_string(),
            param,
        })
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param {
            Some(param) => write!(f, "{}-{}-{}", self.kind.tag(), self.target, param),
            None => write!(f, "{}-{}", self.kind.tag(), self.target),
        }
    }
}

impl FromStr for JobId {
    type Err = MayorError;

    fn from_str(s: &str) -> Result<Self> {
        JobId::parse(s)
    }
}

impl TryFrom<String> for JobId {
    type Error = MayorError;

    fn try_from(value: String) -> Result<Self> {
        JobId::parse(&value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> String {
        id.encode()
    }
}
