//! Remote targets and API generations.
//!
//! The service exposes two naming generations for the same functionality:
//! `prompt`/`agent` (current) and `portal`/`workflow` (legacy). They differ
//! only in the URL path segment and in whether user secrets are accepted.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Category of remote object being invoked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TargetKind {
    Prompt,
    Agent,
    Portal,
    Workflow,
}

impl TargetKind {
    /// URL path segment for this kind.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Agent => "agent",
            Self::Portal => "portal",
            Self::Workflow => "workflow",
        }
    }

    /// The generation this kind belongs to.
    pub fn generation(&self) -> ApiGeneration {
        match self {
            Self::Prompt | Self::Agent => ApiGeneration::Current,
            Self::Portal | Self::Workflow => ApiGeneration::Legacy,
        }
    }
}

/// API naming generation a client is configured for.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ApiGeneration {
    /// `prompt` / `agent`.
    #[default]
    Current,
    /// `portal` / `workflow`.
    Legacy,
}

impl ApiGeneration {
    /// Target kinds reachable in this generation.
    pub fn kinds(&self) -> [TargetKind; 2] {
        match self {
            Self::Current => [TargetKind::Prompt, TargetKind::Agent],
            Self::Legacy => [TargetKind::Portal, TargetKind::Workflow],
        }
    }

    pub fn accepts(&self, kind: TargetKind) -> bool {
        kind.generation() == *self
    }

    /// Only the current generation forwards user secrets.
    pub fn supports_user_secrets(&self) -> bool {
        matches!(self, Self::Current)
    }
}

/// A concrete remote object: kind plus identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub id: String,
}

impl Target {
    pub fn new(kind: TargetKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn prompt(id: impl Into<String>) -> Self {
        Self::new(TargetKind::Prompt, id)
    }

    pub fn agent(id: impl Into<String>) -> Self {
        Self::new(TargetKind::Agent, id)
    }

    /// Path relative to the service root, `<kind>/<id>`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.kind.path_segment(), self.id)
    }
}
