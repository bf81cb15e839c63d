//! Mesh topology: which machine talks to which

/// One connection from a source machine to `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    /// Index of the target machine in the machine set
    pub target: usize,
    /// Which of the per-pair connections this is (0-based)
    pub connection: usize,
}

/// A directed connection across the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshLink {
    pub source: usize,
    pub target: usize,
    pub connection: usize,
}

/// Links opened by `source` in a mesh of `machine_count` machines.
///
/// Every other machine is targeted once per connection, connection-major:
/// all targets for connection 0, then all targets for connection 1, and so on.
pub fn targets_for(machine_count: usize, source: usize, connections: usize) -> Vec<Link> {
    (0..connections)
        .flat_map(|connection| {
            (0..machine_count)
                .filter(move |&target| target != source)
                .map(move |target| Link { target, connection })
        })
        .collect()
}

/// Every directed link in the mesh
pub fn mesh_links(machine_count: usize, connections: usize) -> Vec<MeshLink> {
    (0..machine_count)
        .flat_map(|source| {
            targets_for(machine_count, source, connections)
                .into_iter()
                .map(move |link| MeshLink {
                    source,
                    target: link.target,
                    connection: link.connection,
                })
        })
        .collect()
}

/// Number of directed links: `n * (n - 1) * connections`
pub fn directed_pair_count(machine_count: usize, connections: usize) -> usize {
    machine_count * machine_count.saturating_sub(1) * connections
}
