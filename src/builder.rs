// Copyright 2025 Cowboy AI, LLC.

//! Topology Builder
//!
//! Stepwise, invariant-preserving construction of a topology aggregate.
//! Every operation is all-or-nothing: validation happens before any
//! mutation, so a failed call leaves the working set untouched.
//!
//! The builder is single-use: `build()` finalizes it, and any `with_*`
//! call after that fails with `AlreadyFinalized`. Calling `build()` again
//! is idempotent and yields an independent, equal aggregate.

use crate::aggregate::{
    ClientConfig, ClusterConfig, LeafConfig, SuperClusterConfig, TopologyAggregate,
};
use crate::messaging::{NatsClusterConfig, NatsGatewayConfig, NatsLatticeConfig, NatsLeafConfig};
use crate::value_objects::*;

/// Regions used by the production preset
pub const PRODUCTION_REGIONS: [&str; 3] = ["us-east", "us-west", "eu-west"];

/// Leaves per regional cluster in the production preset
pub const PRODUCTION_LEAVES_PER_CLUSTER: usize = 3;

/// Builder for hierarchical topologies
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    name: String,
    topology: TopologyAggregate,
    finalized: bool,
}

impl TopologyBuilder {
    /// Begin an empty topology with a fresh identifier and version 0
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topology: TopologyAggregate::new(TopologyId::generate()),
            finalized: false,
        }
    }

    /// Resume construction over an existing aggregate
    ///
    /// The aggregate carries its leaf addition order, so rotation picks up
    /// exactly where earlier construction stopped.
    pub fn resume(topology: TopologyAggregate) -> Self {
        Self {
            name: String::new(),
            topology,
            finalized: false,
        }
    }

    /// The display name the topology is being built under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The topology identifier being built
    pub fn topology_id(&self) -> &TopologyId {
        &self.topology.topology_id
    }

    /// The root super-cluster identifier, once one has been added
    pub fn root_super_cluster(&self) -> Option<&SuperClusterId> {
        self.topology.super_clusters.keys().next()
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.finalized {
            return Err(TopologyError::AlreadyFinalized);
        }
        Ok(())
    }

    /// Add the single root super-cluster
    pub fn with_root_super_cluster(
        mut self,
        super_id: SuperClusterId,
        name: impl Into<String>,
        gateway: NatsGatewayConfig,
    ) -> Result<Self> {
        self.ensure_mutable()?;
        if !self.topology.super_clusters.is_empty() {
            return Err(TopologyError::AlreadyInitialized);
        }

        let config = SuperClusterConfig::new(super_id.clone(), name, gateway);
        self.topology.super_clusters.insert(super_id, config);
        Ok(self)
    }

    /// Add a cluster under an existing super-cluster
    pub fn with_cluster(
        mut self,
        cluster_id: ClusterId,
        name: impl Into<String>,
        domain: impl Into<String>,
        parent: &SuperClusterId,
        nats_cluster: NatsClusterConfig,
    ) -> Result<Self> {
        self.ensure_mutable()?;
        if self.topology.clusters.contains_key(&cluster_id) {
            return Err(TopologyError::DuplicateId(cluster_id.to_string()));
        }
        let Some(super_config) = self.topology.super_clusters.get_mut(parent) else {
            return Err(TopologyError::UnknownParent {
                tier: Tier::SuperCluster,
                id: parent.to_string(),
            });
        };

        super_config.managed_clusters.insert(cluster_id.clone());
        let config = ClusterConfig::new(cluster_id.clone(), name, domain, parent.clone(), nats_cluster);
        self.topology.clusters.insert(cluster_id, config);
        Ok(self)
    }

    /// Add a leaf under an existing cluster
    pub fn with_leaf(
        mut self,
        leaf_id: LeafId,
        name: impl Into<String>,
        parent: &ClusterId,
        nats_leaf: NatsLeafConfig,
    ) -> Result<Self> {
        self.ensure_mutable()?;
        if self.topology.leaves.contains_key(&leaf_id) {
            return Err(TopologyError::DuplicateId(leaf_id.to_string()));
        }
        let Some(cluster_config) = self.topology.clusters.get_mut(parent) else {
            return Err(TopologyError::UnknownParent {
                tier: Tier::Cluster,
                id: parent.to_string(),
            });
        };

        cluster_config.managed_leaves.insert(leaf_id.clone());
        let config = LeafConfig::new(leaf_id.clone(), name, parent.clone(), nats_leaf);
        self.topology.leaves.insert(leaf_id.clone(), config);
        self.topology.leaf_order.push(leaf_id);
        Ok(self)
    }

    /// Attach a client with a generated identifier
    ///
    /// With no preferred leaf, assignment is round-robin over leaves in
    /// addition order, rotating by the number of clients already assigned.
    pub fn with_client(
        self,
        name: impl Into<String>,
        client_kind: ClientKind,
        preferred_leaf: Option<&LeafId>,
    ) -> Result<Self> {
        self.with_client_id(ClientId::generate(), name, client_kind, preferred_leaf)
    }

    /// Attach a client with a caller-supplied identifier
    pub fn with_client_id(
        mut self,
        client_id: ClientId,
        name: impl Into<String>,
        client_kind: ClientKind,
        preferred_leaf: Option<&LeafId>,
    ) -> Result<Self> {
        self.ensure_mutable()?;
        if self.topology.clients.contains_key(&client_id) {
            return Err(TopologyError::DuplicateId(client_id.to_string()));
        }

        let assigned_leaf = match preferred_leaf {
            Some(leaf_id) => {
                if !self.topology.leaves.contains_key(leaf_id) {
                    return Err(TopologyError::UnknownParent {
                        tier: Tier::Leaf,
                        id: leaf_id.to_string(),
                    });
                }
                leaf_id.clone()
            }
            None => {
                if self.topology.leaf_order.is_empty() {
                    return Err(TopologyError::NoLeavesAvailable);
                }
                let rotation = self.topology.clients.len() % self.topology.leaf_order.len();
                self.topology.leaf_order[rotation].clone()
            }
        };

        let Some(leaf_config) = self.topology.leaves.get_mut(&assigned_leaf) else {
            return Err(TopologyError::UnknownParent {
                tier: Tier::Leaf,
                id: assigned_leaf.to_string(),
            });
        };

        leaf_config.assigned_clients.insert(client_id.clone());
        let config = ClientConfig::new(client_id.clone(), name, client_kind, assigned_leaf);
        self.topology.clients.insert(client_id, config);
        Ok(self)
    }

    /// Set the lattice configuration carried by the aggregate
    pub fn with_nats_lattice(mut self, nats_config: NatsLatticeConfig) -> Result<Self> {
        self.ensure_mutable()?;
        self.topology.nats_config = nats_config;
        Ok(self)
    }

    /// Finalize and return the assembled aggregate at version 1
    pub fn build(&mut self) -> TopologyAggregate {
        self.finalized = true;
        let mut topology = self.topology.clone();
        topology.version = 1;
        topology
    }

    // ========================================================================
    // Presets
    // ========================================================================

    /// Development topology: one super-cluster, one cluster, one leaf,
    /// local single-node lattice, well-known identifiers
    pub fn development(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let super_id = SuperClusterId::new("dev-super")?;
        let cluster_id = ClusterId::new("dev-cluster")?;
        let leaf_id = LeafId::new("dev-leaf")?;

        let builder = Self::start(name.clone())
            .with_root_super_cluster(
                super_id.clone(),
                format!("{name} Development Super-cluster"),
                NatsGatewayConfig::new("dev-gateway", "localhost"),
            )?
            .with_cluster(
                cluster_id.clone(),
                format!("{name} Development Cluster"),
                "development",
                &super_id,
                NatsClusterConfig::new("dev-cluster"),
            )?
            .with_leaf(
                leaf_id,
                format!("{name} Development Leaf"),
                &cluster_id,
                NatsLeafConfig::new("dev-leaf"),
            )?
            .with_nats_lattice(NatsLatticeConfig::development())?;

        Ok(builder)
    }

    /// Production topology: one super-cluster, three regional clusters,
    /// three leaves per cluster, distributed lattice
    pub fn production(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let super_id = SuperClusterId::new("prod-super")?;

        let mut builder = Self::start(name.clone()).with_root_super_cluster(
            super_id.clone(),
            format!("{name} Production Super-cluster"),
            NatsGatewayConfig::new("prod-gateway", "0.0.0.0"),
        )?;

        for region in PRODUCTION_REGIONS {
            let cluster_id = ClusterId::new(format!("{region}-cluster"))?;
            builder = builder.with_cluster(
                cluster_id.clone(),
                format!("{name} {} Cluster", title_case(region)),
                region,
                &super_id,
                NatsClusterConfig::new(format!("{region}-cluster")),
            )?;

            for i in 1..=PRODUCTION_LEAVES_PER_CLUSTER {
                let leaf_id = LeafId::new(format!("{region}-leaf-{i}"))?;
                builder = builder.with_leaf(
                    leaf_id,
                    format!("{name} {} Leaf {i}", title_case(region)),
                    &cluster_id,
                    NatsLeafConfig::new(format!("{region}-leaf-{i}")),
                )?;
            }
        }

        builder.with_nats_lattice(NatsLatticeConfig::production())
    }
}

/// Create a development topology with the standard local clients attached
pub fn create_development_topology(name: impl Into<String>) -> Result<TopologyAggregate> {
    let mut builder = TopologyBuilder::development(name)?
        .with_client("Developer CLI", ClientKind::Cli, None)?
        .with_client("Local Browser", ClientKind::Browser, None)?;
    Ok(builder.build())
}

/// Create a production topology with the standard client mix distributed
/// round-robin across all leaves
pub fn create_production_topology(name: impl Into<String>) -> Result<TopologyAggregate> {
    let clients = [
        ("Web Application", ClientKind::Application),
        ("Mobile Service", ClientKind::Service),
        ("Admin CLI", ClientKind::Cli),
        ("Developer Workspace", ClientKind::Developer),
    ];

    let mut builder = TopologyBuilder::production(name)?;
    for (client_name, client_kind) in clients {
        builder = builder.with_client(client_name, client_kind, None)?;
    }
    Ok(builder.build())
}

/// Capitalize hyphen-separated words ("us-east" -> "Us-East")
fn title_case(s: &str) -> String {
    s.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_manual_construction_scenario() {
        let super_id = SuperClusterId::new("S").unwrap();
        let cluster_id = ClusterId::new("C").unwrap();
        let leaf_id = LeafId::new("L").unwrap();

        let mut builder = TopologyBuilder::start("t1")
            .with_root_super_cluster(
                super_id.clone(),
                "S",
                NatsGatewayConfig::new("gw", "localhost"),
            )
            .unwrap()
            .with_cluster(
                cluster_id.clone(),
                "C",
                "dev",
                &super_id,
                NatsClusterConfig::new("C"),
            )
            .unwrap()
            .with_leaf(leaf_id, "L", &cluster_id, NatsLeafConfig::new("L"))
            .unwrap()
            .with_client("dev-cli", ClientKind::Cli, None)
            .unwrap();

        let topology = builder.build();
        assert_eq!(topology.version, 1);
        let counts = topology.tier_counts();
        assert_eq!(
            (counts.super_clusters, counts.clusters, counts.leaves, counts.clients),
            (1, 1, 1, 1)
        );

        let summary = topology.summarize();
        let super_view = summary.hierarchy.get("S").unwrap();
        let cluster_view = super_view.clusters.get("C").unwrap();
        let leaf_view = cluster_view.leaves.get("L").unwrap();
        assert_eq!(leaf_view.clients.len(), 1);
    }

    #[test]
    fn test_second_root_super_cluster_fails() {
        let result = TopologyBuilder::start("t")
            .with_root_super_cluster(
                SuperClusterId::new("s1").unwrap(),
                "first",
                NatsGatewayConfig::new("gw", "localhost"),
            )
            .unwrap()
            .with_root_super_cluster(
                SuperClusterId::new("s2").unwrap(),
                "second",
                NatsGatewayConfig::new("gw2", "localhost"),
            );

        assert_eq!(result.unwrap_err(), TopologyError::AlreadyInitialized);
    }

    #[test]
    fn test_unknown_parent_fails() {
        let result = TopologyBuilder::start("t").with_cluster(
            ClusterId::new("c").unwrap(),
            "C",
            "dev",
            &SuperClusterId::new("missing").unwrap(),
            NatsClusterConfig::new("c"),
        );

        assert_eq!(
            result.unwrap_err(),
            TopologyError::UnknownParent {
                tier: Tier::SuperCluster,
                id: "missing".into(),
            }
        );
    }

    #[test]
    fn test_no_leaves_available_leaves_builder_unchanged() {
        let super_id = SuperClusterId::new("s").unwrap();
        let builder = TopologyBuilder::start("t")
            .with_root_super_cluster(super_id.clone(), "S", NatsGatewayConfig::new("gw", "h"))
            .unwrap()
            .with_cluster(
                ClusterId::new("c").unwrap(),
                "C",
                "dev",
                &super_id,
                NatsClusterConfig::new("c"),
            )
            .unwrap();

        let before = builder.clone();
        let result = before.with_client("x", ClientKind::Cli, None);
        assert_eq!(result.unwrap_err(), TopologyError::NoLeavesAvailable);

        let mut builder = builder;
        assert_eq!(builder.build().clients.len(), 0);
    }

    #[test]
    fn test_unknown_preferred_leaf_fails() {
        let builder = TopologyBuilder::development("t").unwrap();
        let result = builder.with_client(
            "x",
            ClientKind::Cli,
            Some(&LeafId::new("missing-leaf").unwrap()),
        );

        assert_eq!(
            result.unwrap_err(),
            TopologyError::UnknownParent {
                tier: Tier::Leaf,
                id: "missing-leaf".into(),
            }
        );
    }

    #[test]
    fn test_round_robin_assignment_in_addition_order() {
        let super_id = SuperClusterId::new("s").unwrap();
        let cluster_id = ClusterId::new("c").unwrap();
        let leaf_ids: Vec<LeafId> = (0..3)
            .map(|i| LeafId::new(format!("leaf-{i}")).unwrap())
            .collect();

        let mut builder = TopologyBuilder::start("t")
            .with_root_super_cluster(super_id.clone(), "S", NatsGatewayConfig::new("gw", "h"))
            .unwrap()
            .with_cluster(cluster_id.clone(), "C", "dev", &super_id, NatsClusterConfig::new("c"))
            .unwrap();

        for leaf_id in &leaf_ids {
            builder = builder
                .with_leaf(
                    leaf_id.clone(),
                    leaf_id.as_str(),
                    &cluster_id,
                    NatsLeafConfig::new(leaf_id.as_str()),
                )
                .unwrap();
        }

        let client_ids: Vec<ClientId> = (0..7)
            .map(|i| ClientId::new(format!("client-{i}")).unwrap())
            .collect();
        for (i, client_id) in client_ids.iter().enumerate() {
            builder = builder
                .with_client_id(
                    client_id.clone(),
                    format!("client {i}"),
                    ClientKind::Service,
                    None,
                )
                .unwrap();
        }

        let topology = builder.build();
        for (i, client_id) in client_ids.iter().enumerate() {
            let client = topology.get_client(client_id).unwrap();
            assert_eq!(client.assigned_leaf, leaf_ids[i % leaf_ids.len()]);
        }
    }

    #[test]
    fn test_resume_continues_rotation_in_addition_order() {
        let super_id = SuperClusterId::new("s").unwrap();
        let cluster_id = ClusterId::new("c").unwrap();
        // Addition order deliberately contradicts identifier order
        let first = LeafId::new("z-leaf").unwrap();
        let second = LeafId::new("a-leaf").unwrap();

        let mut builder = TopologyBuilder::start("t")
            .with_root_super_cluster(super_id.clone(), "S", NatsGatewayConfig::new("gw", "h"))
            .unwrap()
            .with_cluster(cluster_id.clone(), "C", "dev", &super_id, NatsClusterConfig::new("c"))
            .unwrap()
            .with_leaf(first.clone(), "Z", &cluster_id, NatsLeafConfig::new("z"))
            .unwrap()
            .with_leaf(second.clone(), "A", &cluster_id, NatsLeafConfig::new("a"))
            .unwrap();
        let built = builder.build();

        let client_id = ClientId::new("resumed-client").unwrap();
        let mut resumed = TopologyBuilder::resume(built)
            .with_client_id(client_id.clone(), "resumed", ClientKind::Service, None)
            .unwrap();

        let topology = resumed.build();
        assert_eq!(topology.get_client(&client_id).unwrap().assigned_leaf, first);
    }

    #[test]
    fn test_preferred_leaf_wins_over_rotation() {
        let preferred = LeafId::new("dev-leaf").unwrap();
        let mut builder = TopologyBuilder::development("t")
            .unwrap()
            .with_client("pinned", ClientKind::Application, Some(&preferred))
            .unwrap();

        let topology = builder.build();
        let client = topology.clients.values().next().unwrap();
        assert_eq!(client.assigned_leaf, preferred);
    }

    #[test]
    fn test_build_is_idempotent_and_freezes() {
        let mut builder = TopologyBuilder::development("t").unwrap();
        let first = builder.build();
        let second = builder.build();

        assert_eq!(first, second);
        assert_eq!(first.version, 1);

        let result = builder.clone().with_client("late", ClientKind::Cli, None);
        assert_eq!(result.unwrap_err(), TopologyError::AlreadyFinalized);

        let result = builder
            .clone()
            .with_nats_lattice(NatsLatticeConfig::production());
        assert_eq!(result.unwrap_err(), TopologyError::AlreadyFinalized);
    }

    #[test]
    fn test_no_dangling_owner_references() {
        let topology = create_production_topology("Acme").unwrap();

        for cluster in topology.clusters.values() {
            assert!(topology.super_clusters.contains_key(&cluster.super_cluster));
        }
        for leaf in topology.leaves.values() {
            assert!(topology.clusters.contains_key(&leaf.cluster));
        }
        for client in topology.clients.values() {
            assert!(topology.leaves.contains_key(&client.assigned_leaf));
        }

        // Bidirectional: every owner link is mirrored in a membership set
        for cluster in topology.clusters.values() {
            let parent = &topology.super_clusters[&cluster.super_cluster];
            assert!(parent.managed_clusters.contains(&cluster.cluster_id));
        }
        for leaf in topology.leaves.values() {
            let parent = &topology.clusters[&leaf.cluster];
            assert!(parent.managed_leaves.contains(&leaf.leaf_id));
        }
        for client in topology.clients.values() {
            let leaf = &topology.leaves[&client.assigned_leaf];
            assert!(leaf.assigned_clients.contains(&client.client_id));
        }
    }

    #[test]
    fn test_development_preset_shape() {
        let topology = create_development_topology("Acme").unwrap();
        let counts = topology.tier_counts();
        assert_eq!(counts.super_clusters, 1);
        assert_eq!(counts.clusters, 1);
        assert_eq!(counts.leaves, 1);
        assert_eq!(counts.clients, 2);

        assert!(topology
            .get_super_cluster(&SuperClusterId::new("dev-super").unwrap())
            .is_some());
        assert_eq!(topology.nats_config.jetstream.max_memory, "256MB");
    }

    #[test]
    fn test_production_preset_shape() {
        let topology = create_production_topology("Acme").unwrap();
        let counts = topology.tier_counts();
        assert_eq!(counts.super_clusters, 1);
        assert_eq!(counts.clusters, 3);
        assert_eq!(counts.leaves, 9);
        assert_eq!(counts.clients, 4);

        let cluster = topology
            .get_cluster(&ClusterId::new("us-east-cluster").unwrap())
            .unwrap();
        assert_eq!(cluster.domain, "us-east");
        assert_eq!(cluster.name, "Acme Us-East Cluster");
        assert_eq!(cluster.managed_leaves.len(), 3);
    }

    #[test]
    fn test_duplicate_cluster_id_fails() {
        let super_id = SuperClusterId::new("s").unwrap();
        let builder = TopologyBuilder::start("t")
            .with_root_super_cluster(super_id.clone(), "S", NatsGatewayConfig::new("gw", "h"))
            .unwrap()
            .with_cluster(
                ClusterId::new("c").unwrap(),
                "C1",
                "dev",
                &super_id,
                NatsClusterConfig::new("c"),
            )
            .unwrap();

        let result = builder.with_cluster(
            ClusterId::new("c").unwrap(),
            "C2",
            "dev",
            &super_id,
            NatsClusterConfig::new("c"),
        );
        assert_eq!(result.unwrap_err(), TopologyError::DuplicateId("c".into()));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("us-east"), "Us-East");
        assert_eq!(title_case("eu"), "Eu");
    }
}
