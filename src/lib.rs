// Copyright 2025 Cowboy AI, LLC.

//! Topology Domain Module
//!
//! This module implements the hierarchical CIM topology domain using
//! Domain-Driven Design and Event Sourcing principles. The topology models
//! four tiers (clients, leaves, clusters, super-clusters) connected by a
//! declarative NATS lattice configuration.
//!
//! ## Architecture
//!
//! 1. **Typed Identifiers**: every tier has its own identifier scope
//! 2. **Builder**: ordered, invariant-preserving construction of a topology
//! 3. **Aggregate**: the read side, covering summaries, traversal, lookup
//! 4. **Event Chain**: content-addressed, causally-linked audit records
//! 5. **Session**: explicit command-layer state, never process globals
//!
//! ## Key Concepts
//!
//! - **Tier ordering**: `CLIENT < LEAF < CLUSTER < SUPER_CLUSTER`; a child
//!   sits exactly one level below its parent
//! - **Content address**: SHA-256 over an event's canonical logical content,
//!   used as its identity and for chain verification
//! - **Round-robin placement**: clients without a preferred leaf are
//!   distributed cyclically over leaves in addition order
//!
//! ## Usage
//!
//! ```rust
//! use cim_domain_topology::*;
//!
//! let super_id = SuperClusterId::new("S").unwrap();
//! let cluster_id = ClusterId::new("C").unwrap();
//! let leaf_id = LeafId::new("L").unwrap();
//!
//! let mut builder = TopologyBuilder::start("t1")
//!     .with_root_super_cluster(super_id.clone(), "S", NatsGatewayConfig::new("gw", "localhost"))
//!     .unwrap()
//!     .with_cluster(cluster_id.clone(), "C", "dev", &super_id, NatsClusterConfig::new("C"))
//!     .unwrap()
//!     .with_leaf(leaf_id, "L", &cluster_id, NatsLeafConfig::new("L"))
//!     .unwrap()
//!     .with_client("dev-cli", ClientKind::Cli, None)
//!     .unwrap();
//!
//! let topology = builder.build();
//! assert_eq!(topology.version, 1);
//! assert_eq!(topology.tier_counts().clients, 1);
//! ```

pub mod aggregate;
pub mod builder;
pub mod events;
pub mod messaging;
pub mod session;
pub mod value_objects;

// Re-export commonly used types
pub use aggregate::{
    ClientConfig, ClusterConfig, ClusterView, LeafConfig, LeafView, SuperClusterConfig,
    SuperClusterView, TierConfigRef, TierCounts, TierId, TierSummary, TopologyAggregate,
};
pub use builder::{
    create_development_topology, create_production_topology, TopologyBuilder,
    PRODUCTION_LEAVES_PER_CLUSTER, PRODUCTION_REGIONS,
};
pub use events::{verify_chain, TopologyEvent, VectorClock};
pub use messaging::{
    JetStreamConfig, NatsClusterConfig, NatsGatewayConfig, NatsLatticeConfig, NatsLeafConfig,
    NatsSecurityConfig,
};
pub use session::{
    ClientRegistration, EventSimulation, ScaleAction, ScaleReport, TopologyKind, TopologySession,
};
pub use value_objects::{
    CausationId, ClientId, ClientKind, ClusterId, CorrelationId, EventCid, LeafId, Result,
    Settings, SuperClusterId, Tier, TopologyError, TopologyId,
};
