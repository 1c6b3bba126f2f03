// Copyright 2025 Cowboy AI, LLC.

//! Topology Session
//!
//! Application-layer state for one command-issuing session: the live
//! topology aggregate plus the append-only event chain recording every
//! state-changing command. This is the seam an external command dispatcher
//! (JSON-RPC tools, a CLI) talks to; the session owns the chain pointer so
//! event creation itself stays a pure function.
//!
//! A session is a single writer by construction: all mutating operations
//! take `&mut self`, so no internal locking is needed.

use crate::aggregate::{TierCounts, TierSummary, TopologyAggregate};
use crate::builder::{create_development_topology, create_production_topology, TopologyBuilder};
use crate::events::{verify_chain, TopologyEvent};
use crate::value_objects::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Preset shape used when creating a topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    Development,
    Production,
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyKind::Development => write!(f, "development"),
            TopologyKind::Production => write!(f, "production"),
        }
    }
}

impl FromStr for TopologyKind {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(TopologyKind::Development),
            "production" => Ok(TopologyKind::Production),
            other => Err(TopologyError::InvalidId(format!(
                "Unknown topology kind: {other}"
            ))),
        }
    }
}

/// Direction of a tier scaling request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleAction {
    Add,
    Remove,
}

impl fmt::Display for ScaleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleAction::Add => write!(f, "add"),
            ScaleAction::Remove => write!(f, "remove"),
        }
    }
}

/// Outcome of registering a client through the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRegistration {
    pub client_id: ClientId,
    pub assigned_leaf: LeafId,
    pub event_cid: EventCid,
    pub total_clients: usize,
}

/// Outcome of a (simulated) tier scaling request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleReport {
    pub tier: Tier,
    pub action: ScaleAction,
    pub count: usize,
    pub current_tiers: TierCounts,
    pub event_cid: EventCid,
}

/// Outcome of simulating an event flowing through the tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSimulation {
    pub event_cid: EventCid,
    pub correlation_id: CorrelationId,
    pub source_tier: Tier,
    pub flow_path: Vec<String>,
}

/// Session owning one topology and its event chain
#[derive(Debug, Default)]
pub struct TopologySession {
    topology: Option<TopologyAggregate>,
    chain: Vec<TopologyEvent>,
}

impl TopologySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live aggregate, if one has been created
    pub fn topology(&self) -> Option<&TopologyAggregate> {
        self.topology.as_ref()
    }

    /// The event chain recorded so far
    pub fn chain(&self) -> &[TopologyEvent] {
        &self.chain
    }

    /// Content address of the most recent event
    pub fn last_cid(&self) -> Option<&EventCid> {
        self.chain.last().map(|event| &event.cid)
    }

    fn append(&mut self, payload: Settings, source_tier: Tier, node_id: &str) -> TopologyEvent {
        let previous = self.last_cid().cloned();
        let event = TopologyEvent::record(payload, source_tier, node_id, previous, None, None);
        debug!(cid = %event.cid, tier = %source_tier, "appended topology event");
        self.chain.push(event.clone());
        event
    }

    fn require_topology(&self) -> Result<&TopologyAggregate> {
        self.topology.as_ref().ok_or(TopologyError::NoTopology)
    }

    /// Create a topology from a preset, replacing any existing one
    pub fn create_topology(
        &mut self,
        name: impl Into<String>,
        kind: TopologyKind,
    ) -> Result<TierSummary> {
        let name = name.into();
        let topology = match kind {
            TopologyKind::Development => create_development_topology(&name)?,
            TopologyKind::Production => create_production_topology(&name)?,
        };

        let summary = topology.summarize();
        let mut payload = Settings::new();
        payload.insert("event_type".into(), "topology_created".into());
        payload.insert("topology_name".into(), name.clone().into());
        payload.insert("topology_kind".into(), kind.to_string().into());
        payload.insert(
            "topology_id".into(),
            summary.topology_id.to_string().into(),
        );
        self.append(payload, Tier::SuperCluster, "topology-builder");

        info!(topology_id = %summary.topology_id, kind = %kind, "created topology '{name}'");
        self.topology = Some(topology);
        Ok(summary)
    }

    /// Register a client against the live topology
    ///
    /// Round-robin or preferred-leaf placement follows the builder
    /// contract; the aggregate is only replaced when the operation
    /// succeeds.
    pub fn add_client(
        &mut self,
        name: impl Into<String>,
        client_kind: ClientKind,
        preferred_leaf: Option<&LeafId>,
    ) -> Result<ClientRegistration> {
        let name = name.into();
        let current = self.require_topology()?;

        let client_id = ClientId::generate();
        let mut builder = TopologyBuilder::resume(current.clone()).with_client_id(
            client_id.clone(),
            name.clone(),
            client_kind,
            preferred_leaf,
        )?;
        let topology = builder.build();

        let assigned_leaf = topology
            .get_client(&client_id)
            .map(|client| client.assigned_leaf.clone())
            .ok_or_else(|| TopologyError::NotFound(client_id.to_string()))?;
        let total_clients = topology.clients.len();

        let mut payload = Settings::new();
        payload.insert("event_type".into(), "client_registered".into());
        payload.insert("client_name".into(), name.into());
        payload.insert("client_kind".into(), client_kind.to_string().into());
        payload.insert("client_id".into(), client_id.to_string().into());
        payload.insert("assigned_leaf".into(), assigned_leaf.to_string().into());
        let event_cid = self.append(payload, Tier::Client, "topology-builder").cid;

        info!(client_id = %client_id, leaf = %assigned_leaf, "registered client");
        self.topology = Some(topology);

        Ok(ClientRegistration {
            client_id,
            assigned_leaf,
            event_cid,
            total_clients,
        })
    }

    /// Simulate scaling a tier
    ///
    /// Reports what would change and records the request on the chain; the
    /// aggregate itself is not modified.
    pub fn scale_tier(
        &mut self,
        tier: Tier,
        action: ScaleAction,
        count: usize,
    ) -> Result<ScaleReport> {
        let current_tiers = self.require_topology()?.tier_counts();

        let mut payload = Settings::new();
        payload.insert("event_type".into(), "tier_scale_requested".into());
        payload.insert("tier".into(), tier.as_str().into());
        payload.insert("action".into(), action.to_string().into());
        payload.insert("count".into(), json!(count));
        let event_cid = self.append(payload, tier, "topology-builder").cid;

        debug!(%tier, %action, count, "simulated tier scaling");
        Ok(ScaleReport {
            tier,
            action,
            count,
            current_tiers,
            event_cid,
        })
    }

    /// Simulate an application event flowing through the hierarchy
    pub fn simulate_event(
        &mut self,
        event_type: impl Into<String>,
        payload: Settings,
        source_tier: Tier,
    ) -> Result<EventSimulation> {
        self.require_topology()?;
        let event_type = event_type.into();

        let mut full_payload = Settings::new();
        full_payload.insert("event_type".into(), event_type.clone().into());
        full_payload.insert("simulation".into(), true.into());
        for (key, value) in payload {
            full_payload.insert(key, value);
        }

        let event = self.append(full_payload, source_tier, "simulation");
        let simulation = EventSimulation {
            event_cid: event.cid.clone(),
            correlation_id: event.correlation_id.clone(),
            source_tier,
            flow_path: simulate_event_flow(source_tier),
        };

        debug!(event_type = %event_type, tier = %source_tier, "simulated event flow");
        Ok(simulation)
    }

    /// Summary of the live topology
    pub fn summary(&self) -> Result<TierSummary> {
        Ok(self.require_topology()?.summarize())
    }

    /// Verify the integrity of this session's event chain
    pub fn verify(&self) -> Result<()> {
        verify_chain(&self.chain)
    }
}

/// Describe how an event propagates through the tiers from its source
fn simulate_event_flow(source_tier: Tier) -> Vec<String> {
    match source_tier {
        Tier::Client => vec![
            "CLIENT: Event initiated by user/application".into(),
            "LEAF: Command validation and local processing".into(),
            "CLUSTER: Domain coordination and saga orchestration".into(),
            "SUPER_CLUSTER: Global orchestration and consistency".into(),
        ],
        Tier::Leaf => vec![
            "LEAF: Local event generated".into(),
            "CLUSTER: Domain aggregation and coordination".into(),
            "SUPER_CLUSTER: Global impact analysis".into(),
        ],
        Tier::Cluster => vec![
            "CLUSTER: Domain-level event".into(),
            "SUPER_CLUSTER: Cross-domain coordination".into(),
        ],
        Tier::SuperCluster => vec![
            "SUPER_CLUSTER: Global system event".into(),
            "CLUSTER: Domain-specific coordination".into(),
            "LEAF: Local implementation".into(),
            "CLIENT: Event notification".into(),
        ],
    }
}
