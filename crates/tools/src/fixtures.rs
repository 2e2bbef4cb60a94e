//! Fixture topology shared by the cluster-facing tools.
//!
//! Three clusters with stable node and pod sets. `prod` and `staging`
//! are healthy; `dev` carries one NotReady node and a crash-looping pod
//! so failure paths can be exercised deterministically.

pub(crate) struct ClusterFixture {
    pub id: &'static str,
    pub nodes: &'static [NodeFixture],
    pub pods: &'static [PodFixture],
}

pub(crate) struct NodeFixture {
    pub name: &'static str,
    pub ready: bool,
    pub cpu: &'static str,
    pub memory: &'static str,
}

pub(crate) struct PodFixture {
    pub name: &'static str,
    pub phase: &'static str,
    pub restarts: u64,
}

pub(crate) const CLUSTERS: &[ClusterFixture] = &[
    ClusterFixture {
        id: "prod",
        nodes: &[
            NodeFixture { name: "prod-node-1", ready: true, cpu: "8", memory: "32Gi" },
            NodeFixture { name: "prod-node-2", ready: true, cpu: "8", memory: "32Gi" },
            NodeFixture { name: "prod-node-3", ready: true, cpu: "16", memory: "64Gi" },
        ],
        pods: &[
            PodFixture { name: "api-service", phase: "Running", restarts: 0 },
            PodFixture { name: "payment-service", phase: "CrashLoopBackOff", restarts: 14 },
            PodFixture { name: "worker", phase: "Running", restarts: 1 },
        ],
    },
    ClusterFixture {
        id: "dev",
        nodes: &[
            NodeFixture { name: "dev-node-1", ready: true, cpu: "4", memory: "16Gi" },
            NodeFixture { name: "dev-node-2", ready: false, cpu: "4", memory: "16Gi" },
        ],
        pods: &[
            PodFixture { name: "api-service", phase: "Running", restarts: 2 },
            PodFixture { name: "experiment", phase: "Pending", restarts: 0 },
        ],
    },
    ClusterFixture {
        id: "staging",
        nodes: &[
            NodeFixture { name: "staging-node-1", ready: true, cpu: "4", memory: "16Gi" },
            NodeFixture { name: "staging-node-2", ready: true, cpu: "4", memory: "16Gi" },
        ],
        pods: &[
            PodFixture { name: "api-service", phase: "Running", restarts: 0 },
        ],
    },
];

/// Look up a cluster by id.
pub(crate) fn cluster(id: &str) -> Option<&'static ClusterFixture> {
    CLUSTERS.iter().find(|c| c.id == id)
}

/// The ids callers may pass, for error messages.
pub(crate) fn known_cluster_ids() -> Vec<&'static str> {
    CLUSTERS.iter().map(|c| c.id).collect()
}
