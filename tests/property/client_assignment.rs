// Copyright 2025 Cowboy AI, LLC.

//! Property-Based Tests for Topology Construction
//!
//! Verifies the round-robin placement law and the owner-reference
//! invariant for arbitrary valid construction sequences.

use cim_domain_topology::{
    ClientId, ClientKind, ClusterId, LeafId, NatsClusterConfig, NatsGatewayConfig, NatsLeafConfig,
    SuperClusterId, TopologyAggregate, TopologyBuilder,
};
use proptest::prelude::*;

/// Build a topology with one super-cluster, `clusters` clusters, and
/// `leaves_per_cluster` leaves under each, then attach `clients` clients
/// with no placement preference.
fn build_topology(
    clusters: usize,
    leaves_per_cluster: usize,
    clients: usize,
) -> (TopologyAggregate, Vec<LeafId>, Vec<ClientId>) {
    let super_id = SuperClusterId::new("root").unwrap();
    let mut builder = TopologyBuilder::start("prop")
        .with_root_super_cluster(super_id.clone(), "Root", NatsGatewayConfig::new("gw", "host"))
        .unwrap();

    let mut leaf_ids = Vec::new();
    for c in 0..clusters {
        let cluster_id = ClusterId::new(format!("cluster-{c}")).unwrap();
        builder = builder
            .with_cluster(
                cluster_id.clone(),
                format!("Cluster {c}"),
                format!("domain-{c}"),
                &super_id,
                NatsClusterConfig::new(format!("cluster-{c}")),
            )
            .unwrap();

        for l in 0..leaves_per_cluster {
            let leaf_id = LeafId::new(format!("cluster-{c}-leaf-{l}")).unwrap();
            builder = builder
                .with_leaf(
                    leaf_id.clone(),
                    format!("Leaf {c}/{l}"),
                    &cluster_id,
                    NatsLeafConfig::new(leaf_id.as_str()),
                )
                .unwrap();
            leaf_ids.push(leaf_id);
        }
    }

    let mut client_ids = Vec::new();
    for i in 0..clients {
        let client_id = ClientId::new(format!("client-{i}")).unwrap();
        builder = builder
            .with_client_id(client_id.clone(), format!("Client {i}"), ClientKind::Service, None)
            .unwrap();
        client_ids.push(client_id);
    }

    (builder.build(), leaf_ids, client_ids)
}

proptest! {
    /// Property: client i lands on leaf i mod K, in addition order
    #[test]
    fn prop_round_robin_placement(
        clusters in 1usize..4,
        leaves_per_cluster in 1usize..4,
        clients in 0usize..24,
    ) {
        let (topology, leaf_ids, client_ids) =
            build_topology(clusters, leaves_per_cluster, clients);

        for (i, client_id) in client_ids.iter().enumerate() {
            let client = topology.get_client(client_id).unwrap();
            prop_assert_eq!(
                &client.assigned_leaf,
                &leaf_ids[i % leaf_ids.len()]
            );
        }
    }

    /// Property: construction never produces a dangling owner reference,
    /// and every owner link is mirrored in the parent's membership set
    #[test]
    fn prop_owner_references_resolve(
        clusters in 1usize..4,
        leaves_per_cluster in 0usize..4,
        clients in 0usize..12,
    ) {
        // Clients need at least one leaf to land on
        prop_assume!(leaves_per_cluster > 0 || clients == 0);

        let (topology, _, _) = build_topology(clusters, leaves_per_cluster, clients);

        for cluster in topology.clusters.values() {
            let parent = topology.get_super_cluster(&cluster.super_cluster);
            prop_assert!(parent.is_some());
            prop_assert!(parent.unwrap().managed_clusters.contains(&cluster.cluster_id));
        }
        for leaf in topology.leaves.values() {
            let parent = topology.get_cluster(&leaf.cluster);
            prop_assert!(parent.is_some());
            prop_assert!(parent.unwrap().managed_leaves.contains(&leaf.leaf_id));
        }
        for client in topology.clients.values() {
            let leaf = topology.get_leaf(&client.assigned_leaf);
            prop_assert!(leaf.is_some());
            prop_assert!(leaf.unwrap().assigned_clients.contains(&client.client_id));
        }
    }

    /// Property: the summary counts match the maps and every client id
    /// appears exactly once in the hierarchy view
    #[test]
    fn prop_summary_is_consistent(
        clusters in 1usize..3,
        leaves_per_cluster in 1usize..3,
        clients in 0usize..10,
    ) {
        let (topology, _, client_ids) = build_topology(clusters, leaves_per_cluster, clients);
        let summary = topology.summarize();

        prop_assert_eq!(summary.tiers.clusters, clusters);
        prop_assert_eq!(summary.tiers.leaves, clusters * leaves_per_cluster);
        prop_assert_eq!(summary.tiers.clients, clients);

        let mut seen = 0usize;
        for super_view in summary.hierarchy.values() {
            for cluster_view in super_view.clusters.values() {
                for leaf_view in cluster_view.leaves.values() {
                    seen += leaf_view.clients.len();
                    for client in &leaf_view.clients {
                        prop_assert!(client_ids.iter().any(|id| id.as_str() == client));
                    }
                }
            }
        }
        prop_assert_eq!(seen, clients);
    }
}
