// Copyright 2025 Cowboy AI, LLC.

//! Topology Aggregate
//!
//! The topology aggregate is the root entity holding every tier
//! configuration object, indexed by identifier. It exposes the read side:
//! tier summaries, hierarchy traversal, and lookup by identifier. All
//! structural mutation goes through the builder, which maintains the
//! bidirectional owner/membership invariant; the read path never fails on
//! a dangling child reference, it just omits the branch.

use crate::messaging::{NatsClusterConfig, NatsGatewayConfig, NatsLatticeConfig, NatsLeafConfig};
use crate::value_objects::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ============================================================================
// Tier Configuration Objects
// ============================================================================

/// Client configuration (lowest tier)
///
/// A client is assigned to exactly one leaf; it is never split across
/// leaves. Auth and rate-limit settings are opaque pass-through data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub client_id: ClientId,
    pub name: String,
    pub client_kind: ClientKind,
    pub assigned_leaf: LeafId,
    pub auth_config: Settings,
    pub rate_limits: Settings,
}

impl ClientConfig {
    pub fn new(
        client_id: ClientId,
        name: impl Into<String>,
        client_kind: ClientKind,
        assigned_leaf: LeafId,
    ) -> Self {
        Self {
            client_id,
            name: name.into(),
            client_kind,
            assigned_leaf,
            auth_config: Settings::new(),
            rate_limits: Settings::new(),
        }
    }
}

/// Leaf node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafConfig {
    pub leaf_id: LeafId,
    pub name: String,
    pub cluster: ClusterId,
    pub nats_leaf: NatsLeafConfig,
    pub event_store_config: Settings,
    pub assigned_clients: BTreeSet<ClientId>,
    pub resource_limits: Settings,
}

impl LeafConfig {
    pub fn new(
        leaf_id: LeafId,
        name: impl Into<String>,
        cluster: ClusterId,
        nats_leaf: NatsLeafConfig,
    ) -> Self {
        Self {
            leaf_id,
            name: name.into(),
            cluster,
            nats_leaf,
            event_store_config: Settings::new(),
            assigned_clients: BTreeSet::new(),
            resource_limits: Settings::new(),
        }
    }
}

/// Cluster configuration
///
/// The domain label partitions clusters; saga and projection definitions
/// are descriptive metadata only, never executed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub cluster_id: ClusterId,
    pub name: String,
    pub domain: String,
    pub super_cluster: SuperClusterId,
    pub nats_cluster: NatsClusterConfig,
    pub managed_leaves: BTreeSet<LeafId>,
    pub saga_definitions: Settings,
    pub projection_configs: Vec<Settings>,
}

impl ClusterConfig {
    pub fn new(
        cluster_id: ClusterId,
        name: impl Into<String>,
        domain: impl Into<String>,
        super_cluster: SuperClusterId,
        nats_cluster: NatsClusterConfig,
    ) -> Self {
        Self {
            cluster_id,
            name: name.into(),
            domain: domain.into(),
            super_cluster,
            nats_cluster,
            managed_leaves: BTreeSet::new(),
            saga_definitions: Settings::new(),
            projection_configs: Vec::new(),
        }
    }
}

/// Super-cluster configuration (root tier)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperClusterConfig {
    pub super_id: SuperClusterId,
    pub name: String,
    pub nats_gateway: NatsGatewayConfig,
    pub managed_clusters: BTreeSet<ClusterId>,
    pub global_projections: Vec<Settings>,
    pub orchestration_rules: Vec<Settings>,
}

impl SuperClusterConfig {
    pub fn new(
        super_id: SuperClusterId,
        name: impl Into<String>,
        nats_gateway: NatsGatewayConfig,
    ) -> Self {
        Self {
            super_id,
            name: name.into(),
            nats_gateway,
            managed_clusters: BTreeSet::new(),
            global_projections: Vec::new(),
            orchestration_rules: Vec::new(),
        }
    }
}

// ============================================================================
// Lookup Types
// ============================================================================

/// An identifier of any tier scope, for aggregate-wide lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierId {
    Client(ClientId),
    Leaf(LeafId),
    Cluster(ClusterId),
    SuperCluster(SuperClusterId),
}

/// Reference to a configuration object of any tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TierConfigRef<'a> {
    Client(&'a ClientConfig),
    Leaf(&'a LeafConfig),
    Cluster(&'a ClusterConfig),
    SuperCluster(&'a SuperClusterConfig),
}

impl TierConfigRef<'_> {
    pub fn tier(&self) -> Tier {
        match self {
            TierConfigRef::Client(_) => Tier::Client,
            TierConfigRef::Leaf(_) => Tier::Leaf,
            TierConfigRef::Cluster(_) => Tier::Cluster,
            TierConfigRef::SuperCluster(_) => Tier::SuperCluster,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TierConfigRef::Client(c) => &c.name,
            TierConfigRef::Leaf(l) => &l.name,
            TierConfigRef::Cluster(c) => &c.name,
            TierConfigRef::SuperCluster(s) => &s.name,
        }
    }
}

// ============================================================================
// Summary Views
// ============================================================================

/// Entity counts per tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub super_clusters: usize,
    pub clusters: usize,
    pub leaves: usize,
    pub clients: usize,
}

/// Leaf branch of the hierarchy view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafView {
    pub name: String,
    pub clients: Vec<String>,
}

/// Cluster branch of the hierarchy view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterView {
    pub name: String,
    pub domain: String,
    pub leaves: BTreeMap<String, LeafView>,
}

/// Super-cluster branch of the hierarchy view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperClusterView {
    pub name: String,
    pub clusters: BTreeMap<String, ClusterView>,
}

/// Summary of a topology for renderers and command-layer responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    pub topology_id: TopologyId,
    pub version: u64,
    pub tiers: TierCounts,
    pub hierarchy: BTreeMap<String, SuperClusterView>,
}

// ============================================================================
// Topology Aggregate
// ============================================================================

/// Complete hierarchical topology: super-clusters, clusters, leaves, clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyAggregate {
    /// Aggregate ID
    pub topology_id: TopologyId,

    /// 0 while under construction, 1 once finalized
    pub version: u64,

    /// Super-clusters indexed by ID
    pub super_clusters: HashMap<SuperClusterId, SuperClusterConfig>,

    /// Clusters indexed by ID
    pub clusters: HashMap<ClusterId, ClusterConfig>,

    /// Leaves indexed by ID
    pub leaves: HashMap<LeafId, LeafConfig>,

    /// Leaf addition order, the rotation order for client placement
    pub leaf_order: Vec<LeafId>,

    /// Clients indexed by ID
    pub clients: HashMap<ClientId, ClientConfig>,

    /// Lattice configuration carried for renderers
    pub nats_config: NatsLatticeConfig,

    /// Chain anchor for this topology's event history
    pub genesis_cid: EventCid,
}

impl TopologyAggregate {
    /// Create an empty topology aggregate
    pub fn new(topology_id: TopologyId) -> Self {
        Self {
            topology_id,
            version: 0,
            super_clusters: HashMap::new(),
            clusters: HashMap::new(),
            leaves: HashMap::new(),
            leaf_order: Vec::new(),
            clients: HashMap::new(),
            nats_config: NatsLatticeConfig::default(),
            genesis_cid: EventCid::from_content(b"genesis"),
        }
    }

    /// Entity counts per tier
    pub fn tier_counts(&self) -> TierCounts {
        TierCounts {
            super_clusters: self.super_clusters.len(),
            clusters: self.clusters.len(),
            leaves: self.leaves.len(),
            clients: self.clients.len(),
        }
    }

    /// Build the full summary: counts plus nested hierarchy view
    ///
    /// Pure read over the aggregate. A referenced child missing from its
    /// tier map is omitted rather than surfaced as an error.
    pub fn summarize(&self) -> TierSummary {
        TierSummary {
            topology_id: self.topology_id.clone(),
            version: self.version,
            tiers: self.tier_counts(),
            hierarchy: self.build_hierarchy_view(),
        }
    }

    fn build_hierarchy_view(&self) -> BTreeMap<String, SuperClusterView> {
        let mut hierarchy = BTreeMap::new();

        for (super_id, super_config) in &self.super_clusters {
            let mut clusters = BTreeMap::new();

            for cluster_id in &super_config.managed_clusters {
                let Some(cluster_config) = self.clusters.get(cluster_id) else {
                    continue;
                };

                let mut leaves = BTreeMap::new();
                for leaf_id in &cluster_config.managed_leaves {
                    let Some(leaf_config) = self.leaves.get(leaf_id) else {
                        continue;
                    };

                    leaves.insert(
                        leaf_id.to_string(),
                        LeafView {
                            name: leaf_config.name.clone(),
                            clients: leaf_config
                                .assigned_clients
                                .iter()
                                .map(|client_id| client_id.to_string())
                                .collect(),
                        },
                    );
                }

                clusters.insert(
                    cluster_id.to_string(),
                    ClusterView {
                        name: cluster_config.name.clone(),
                        domain: cluster_config.domain.clone(),
                        leaves,
                    },
                );
            }

            hierarchy.insert(
                super_id.to_string(),
                SuperClusterView {
                    name: super_config.name.clone(),
                    clusters,
                },
            );
        }

        hierarchy
    }

    /// Look up a configuration object by an identifier of any scope
    pub fn find(&self, id: &TierId) -> Result<TierConfigRef<'_>> {
        match id {
            TierId::Client(client_id) => self
                .clients
                .get(client_id)
                .map(TierConfigRef::Client)
                .ok_or_else(|| TopologyError::NotFound(client_id.to_string())),
            TierId::Leaf(leaf_id) => self
                .leaves
                .get(leaf_id)
                .map(TierConfigRef::Leaf)
                .ok_or_else(|| TopologyError::NotFound(leaf_id.to_string())),
            TierId::Cluster(cluster_id) => self
                .clusters
                .get(cluster_id)
                .map(TierConfigRef::Cluster)
                .ok_or_else(|| TopologyError::NotFound(cluster_id.to_string())),
            TierId::SuperCluster(super_id) => self
                .super_clusters
                .get(super_id)
                .map(TierConfigRef::SuperCluster)
                .ok_or_else(|| TopologyError::NotFound(super_id.to_string())),
        }
    }

    /// Get a super-cluster by ID
    pub fn get_super_cluster(&self, id: &SuperClusterId) -> Option<&SuperClusterConfig> {
        self.super_clusters.get(id)
    }

    /// Get a cluster by ID
    pub fn get_cluster(&self, id: &ClusterId) -> Option<&ClusterConfig> {
        self.clusters.get(id)
    }

    /// Get a leaf by ID
    pub fn get_leaf(&self, id: &LeafId) -> Option<&LeafConfig> {
        self.leaves.get(id)
    }

    /// Get a client by ID
    pub fn get_client(&self, id: &ClientId) -> Option<&ClientConfig> {
        self.clients.get(id)
    }

    /// Clients assigned to a leaf
    pub fn leaf_clients(&self, leaf_id: &LeafId) -> Vec<&ClientConfig> {
        self.clients
            .values()
            .filter(|client| &client.assigned_leaf == leaf_id)
            .collect()
    }

    /// Clusters within a domain
    pub fn clusters_in_domain(&self, domain: &str) -> Vec<&ClusterConfig> {
        self.clusters
            .values()
            .filter(|cluster| cluster.domain == domain)
            .collect()
    }
}
