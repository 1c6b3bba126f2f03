// Copyright 2025 Cowboy AI, LLC.

//! NATS Lattice Configuration
//!
//! Declarative configuration records for the NATS lattice that connects the
//! topology tiers. These are pure data carried by the topology aggregate for
//! external renderers; the domain never opens a connection.

use crate::value_objects::Settings;
use serde::{Deserialize, Serialize};

/// Default client port for NATS
pub const NATS_CLIENT_PORT: u16 = 4222;
/// Default cluster route port
pub const NATS_CLUSTER_PORT: u16 = 6222;
/// Default gateway port for super-cluster interconnect
pub const NATS_GATEWAY_PORT: u16 = 7222;
/// Default leaf node port
pub const NATS_LEAF_PORT: u16 = 7422;

/// Security configuration for the lattice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatsSecurityConfig {
    pub tls_enabled: bool,
    pub auth_required: bool,
    pub jwt_enabled: bool,
    pub nkeys_enabled: bool,
}

impl Default for NatsSecurityConfig {
    fn default() -> Self {
        Self {
            tls_enabled: true,
            auth_required: true,
            jwt_enabled: true,
            nkeys_enabled: true,
        }
    }
}

/// Gateway configuration for super-clusters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatsGatewayConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub authorization: Settings,
}

impl NatsGatewayConfig {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: NATS_GATEWAY_PORT,
            tls: true,
            authorization: Settings::new(),
        }
    }
}

/// Cluster route configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatsClusterConfig {
    pub name: String,
    pub routes: Vec<String>,
    pub cluster_port: u16,
    pub jetstream: bool,
}

impl NatsClusterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: Vec::new(),
            cluster_port: NATS_CLUSTER_PORT,
            jetstream: true,
        }
    }

    pub fn with_routes(mut self, routes: Vec<String>) -> Self {
        self.routes = routes;
        self
    }
}

/// Leaf node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatsLeafConfig {
    pub name: String,
    pub remotes: Vec<String>,
    pub leaf_port: u16,
}

impl NatsLeafConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remotes: Vec::new(),
            leaf_port: NATS_LEAF_PORT,
        }
    }

    pub fn with_remotes(mut self, remotes: Vec<String>) -> Self {
        self.remotes = remotes;
        self
    }
}

/// JetStream configuration for event persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JetStreamConfig {
    pub enabled: bool,
    pub max_memory: String,
    pub max_file: String,
    pub store_dir: String,
}

impl Default for JetStreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_memory: "1GB".into(),
            max_file: "10GB".into(),
            store_dir: "/var/lib/nats/jetstream".into(),
        }
    }
}

/// Complete lattice configuration carried by a topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NatsLatticeConfig {
    pub gateways: Vec<NatsGatewayConfig>,
    pub clusters: Vec<NatsClusterConfig>,
    pub leaves: Vec<NatsLeafConfig>,
    pub jetstream: JetStreamConfig,
    pub security: NatsSecurityConfig,
}

impl NatsLatticeConfig {
    /// Single-node development lattice
    pub fn development() -> Self {
        Self {
            gateways: Vec::new(),
            clusters: vec![NatsClusterConfig::new("dev-cluster")],
            leaves: vec![NatsLeafConfig::new("dev-leaf")
                .with_remotes(vec![format!("nats://localhost:{NATS_CLIENT_PORT}")])],
            jetstream: JetStreamConfig {
                enabled: true,
                max_memory: "256MB".into(),
                max_file: "1GB".into(),
                store_dir: "/tmp/nats-dev".into(),
            },
            security: NatsSecurityConfig::default(),
        }
    }

    /// Distributed production lattice
    pub fn production() -> Self {
        Self {
            gateways: vec![NatsGatewayConfig::new("super-gateway", "0.0.0.0")],
            clusters: vec![NatsClusterConfig::new("primary-cluster").with_routes(vec![
                format!("nats://cluster1:{NATS_CLUSTER_PORT}"),
                format!("nats://cluster2:{NATS_CLUSTER_PORT}"),
            ])],
            leaves: Vec::new(),
            jetstream: JetStreamConfig {
                enabled: true,
                max_memory: "8GB".into(),
                max_file: "100GB".into(),
                store_dir: "/var/lib/nats/jetstream".into(),
            },
            security: NatsSecurityConfig::default(),
        }
    }
}
