// Copyright 2025 Cowboy AI, LLC.

//! Topology Domain Events
//!
//! State-changing operations against a topology are recorded as immutable,
//! content-addressed events forming a hash chain. The chain pointer is not
//! hidden state: callers thread each event's address into the next
//! `previous_cid`, keeping event creation a pure value-producing function.
//!
//! The content address is SHA-256 over a canonical JSON document of the
//! event's logical fields (payload, source tier, node id, timestamp,
//! previous address). Because the stored timestamp is exactly the hashed
//! timestamp, the address can always be recomputed from the stored fields
//! for integrity verification. Two logically identical events recorded at
//! different instants get different addresses; that is intentional.

use crate::value_objects::{
    CausationId, CorrelationId, EventCid, Result, Settings, Tier, TopologyError,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

// ============================================================================
// Vector Clock
// ============================================================================

/// Per-node counters expressing a partial causal order across event producers
///
/// Counters are monotonically non-decreasing: `tick` only increments and
/// `merge` takes the point-wise maximum.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VectorClock {
    clocks: HashMap<String, u64>,
}

impl VectorClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment this node's own counter
    pub fn tick(&mut self, node_id: &str) {
        *self.clocks.entry(node_id.to_string()).or_insert(0) += 1;
    }

    /// Merge another clock, taking the point-wise maximum per node
    pub fn merge(&mut self, other: &VectorClock) {
        for (node_id, &clock) in &other.clocks {
            let entry = self.clocks.entry(node_id.clone()).or_insert(0);
            *entry = (*entry).max(clock);
        }
    }

    /// Current counter for a node (0 if never seen)
    pub fn get(&self, node_id: &str) -> u64 {
        self.clocks.get(node_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }
}

// ============================================================================
// Topology Event
// ============================================================================

/// Immutable, content-addressed, causally-linked event record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyEvent {
    /// Content address, a pure function of the fields below
    pub cid: EventCid,
    /// Address of the predecessor in the chain (None for the first event)
    pub previous_cid: Option<EventCid>,
    /// Groups events belonging to one logical operation
    pub correlation_id: CorrelationId,
    /// Names the specific event that directly caused this one
    pub causation_id: CausationId,
    /// Tier the event originated from
    pub source_tier: Tier,
    /// Free-form producer node label (not a typed identifier)
    pub node_id: String,
    /// Application-defined payload, carried untouched
    pub payload: Settings,
    pub timestamp: DateTime<Utc>,
    pub vector_clock: VectorClock,
}

impl TopologyEvent {
    /// Record a new event, stamping the current time
    ///
    /// A fresh correlation id is assigned when none is supplied (a new
    /// logical operation); a fresh causation id likewise (the root cause is
    /// the event itself).
    pub fn record(
        payload: Settings,
        source_tier: Tier,
        node_id: impl Into<String>,
        previous_cid: Option<EventCid>,
        correlation_id: Option<CorrelationId>,
        causation_id: Option<CausationId>,
    ) -> Self {
        Self::record_at(
            payload,
            source_tier,
            node_id,
            previous_cid,
            correlation_id,
            causation_id,
            Utc::now(),
            VectorClock::new(),
        )
    }

    /// Record an event at an explicit instant with an explicit clock snapshot
    ///
    /// The address is deterministic for fixed inputs, so holding the
    /// timestamp fixed reproduces the same address.
    #[allow(clippy::too_many_arguments)]
    pub fn record_at(
        payload: Settings,
        source_tier: Tier,
        node_id: impl Into<String>,
        previous_cid: Option<EventCid>,
        correlation_id: Option<CorrelationId>,
        causation_id: Option<CausationId>,
        timestamp: DateTime<Utc>,
        vector_clock: VectorClock,
    ) -> Self {
        let node_id = node_id.into();
        let cid = content_address(&payload, source_tier, &node_id, timestamp, previous_cid.as_ref());

        Self {
            cid,
            previous_cid,
            correlation_id: correlation_id.unwrap_or_else(CorrelationId::generate),
            causation_id: causation_id.unwrap_or_else(CausationId::generate),
            source_tier,
            node_id,
            payload,
            timestamp,
            vector_clock,
        }
    }

    /// Recompute the content address from the stored fields
    pub fn recompute_cid(&self) -> EventCid {
        content_address(
            &self.payload,
            self.source_tier,
            &self.node_id,
            self.timestamp,
            self.previous_cid.as_ref(),
        )
    }
}

/// Compute the content address over the canonical serialization of the
/// event's logical content
///
/// `serde_json`'s map is ordered, so the serialized document has a single
/// canonical byte form per field values.
fn content_address(
    payload: &Settings,
    source_tier: Tier,
    node_id: &str,
    timestamp: DateTime<Utc>,
    previous_cid: Option<&EventCid>,
) -> EventCid {
    let content = json!({
        "payload": payload,
        "source_tier": source_tier.as_str(),
        "node_id": node_id,
        "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        "previous_cid": previous_cid.map(EventCid::as_str),
    });
    EventCid::from_content(content.to_string().as_bytes())
}

// ============================================================================
// Chain Verification
// ============================================================================

/// Verify an event sequence claiming to form a hash chain
///
/// Each event's address is recomputed from its fields and compared against
/// the stored address, and each `previous_cid` is compared against the
/// prior event's address. The first divergent position is reported.
pub fn verify_chain(events: &[TopologyEvent]) -> Result<()> {
    for (position, event) in events.iter().enumerate() {
        let recomputed = event.recompute_cid();
        if recomputed != event.cid {
            return Err(TopologyError::ChainIntegrity {
                position,
                reason: format!(
                    "content address mismatch: stored {}, recomputed {}",
                    event.cid, recomputed
                ),
            });
        }

        if position > 0 {
            let prior = &events[position - 1].cid;
            if event.previous_cid.as_ref() != Some(prior) {
                return Err(TopologyError::ChainIntegrity {
                    position,
                    reason: format!(
                        "previous address does not link to prior event {prior}"
                    ),
                });
            }
        }
    }

    Ok(())
}
