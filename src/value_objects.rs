// Copyright 2025 Cowboy AI, LLC.

//! Topology Domain Value Objects
//!
//! These are the building blocks of the Topology domain model.
//! All value objects are immutable and validated on construction.
//!
//! Identifiers are string-backed and scoped by type: a `LeafId` and a
//! `ClusterId` holding the same text are still different identifiers.
//! `generate()` yields a fresh collision-resistant value; `new()` accepts
//! a literal for well-known nodes (development presets reuse ids like
//! `dev-super` on purpose).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error types for Topology domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Topology already has a root super-cluster")]
    AlreadyInitialized,

    #[error("Builder is finalized; no further mutation is allowed")]
    AlreadyFinalized,

    #[error("Unknown parent {tier} '{id}'")]
    UnknownParent { tier: Tier, id: String },

    #[error("No leaves available for client assignment")]
    NoLeavesAvailable,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),

    #[error("Event chain integrity failure at position {position}: {reason}")]
    ChainIntegrity { position: usize, reason: String },

    #[error("No topology exists; create one first")]
    NoTopology,

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, TopologyError>;

// ============================================================================
// Identity Value Objects
// ============================================================================

/// Unique identifier for clients
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TopologyError::InvalidId(
                "Client ID cannot be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Unique identifier for leaf nodes
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeafId(String);

impl LeafId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TopologyError::InvalidId("Leaf ID cannot be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LeafId {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Unique identifier for clusters
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(String);

impl ClusterId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TopologyError::InvalidId(
                "Cluster ID cannot be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClusterId {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Unique identifier for super-clusters
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SuperClusterId(String);

impl SuperClusterId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TopologyError::InvalidId(
                "Super-cluster ID cannot be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SuperClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SuperClusterId {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Unique identifier for a topology aggregate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopologyId(String);

impl TopologyId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TopologyError::InvalidId(
                "Topology ID cannot be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation identifier - groups all events of one logical operation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TopologyError::InvalidId(
                "Correlation ID cannot be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Causation identifier - names the event that directly caused another
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CausationId(String);

impl CausationId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TopologyError::InvalidId(
                "Causation ID cannot be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CausationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content address of an event (hex-encoded SHA-256)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventCid(String);

impl EventCid {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TopologyError::InvalidId(
                "Event CID cannot be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    /// Compute a content address from canonical content bytes
    pub fn from_content(content: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventCid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tier and Client Kind
// ============================================================================

/// Hierarchy tiers, ordered bottom-up
///
/// The derived ordering follows variant order: `Client < Leaf < Cluster <
/// SuperCluster`. A child's tier is always exactly one level below its
/// parent's.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Client,
    Leaf,
    Cluster,
    SuperCluster,
}

impl Tier {
    /// The tier one level above, if any
    pub fn parent(&self) -> Option<Tier> {
        match self {
            Tier::Client => Some(Tier::Leaf),
            Tier::Leaf => Some(Tier::Cluster),
            Tier::Cluster => Some(Tier::SuperCluster),
            Tier::SuperCluster => None,
        }
    }

    /// The tier one level below, if any
    pub fn child(&self) -> Option<Tier> {
        match self {
            Tier::Client => None,
            Tier::Leaf => Some(Tier::Client),
            Tier::Cluster => Some(Tier::Leaf),
            Tier::SuperCluster => Some(Tier::Cluster),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Client => "client",
            Tier::Leaf => "leaf",
            Tier::Cluster => "cluster",
            Tier::SuperCluster => "super_cluster",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(Tier::Client),
            "leaf" => Ok(Tier::Leaf),
            "cluster" => Ok(Tier::Cluster),
            "super_cluster" => Ok(Tier::SuperCluster),
            other => Err(TopologyError::InvalidId(format!(
                "Unknown tier: {other}"
            ))),
        }
    }
}

/// Kinds of clients that attach at the lowest tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    Developer,
    Application,
    Service,
    Browser,
    Cli,
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientKind::Developer => write!(f, "developer"),
            ClientKind::Application => write!(f, "application"),
            ClientKind::Service => write!(f, "service"),
            ClientKind::Browser => write!(f, "browser"),
            ClientKind::Cli => write!(f, "cli"),
        }
    }
}

// ============================================================================
// Opaque Settings
// ============================================================================

/// Opaque key-value settings carried through the domain untouched
///
/// The core never interprets these values; they are pass-through
/// configuration for external renderers and consumers. The backing map is
/// ordered, so serialization is deterministic.
pub type Settings = serde_json::Map<String, serde_json::Value>;
