use crate::cluster::SystemCluster;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::BTreeMap;

/// Directed `depends_on` relation between systems and its inverse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyEdges {
    depends_on: BTreeMap<String, Vec<String>>,
    imported_by: BTreeMap<String, Vec<String>>,
    edge_count: usize,
}

impl DependencyEdges {
    /// Systems `key` depends on, sorted
    pub fn depends_on(&self, key: &str) -> &[String] {
        self.depends_on.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Systems depending on `key`, sorted
    pub fn imported_by(&self, key: &str) -> &[String] {
        self.imported_by.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// Infer edges from each system's collected import strings.
///
/// `A -> B` when B's key occurs as a case-insensitive substring of any import
/// seen in A. This is a heuristic over free text: there is no import resolution,
/// and coincidental overlaps produce edges. No self edges. The `other` bucket
/// is matched like any other key.
pub fn infer_dependencies(systems: &BTreeMap<String, SystemCluster>) -> DependencyEdges {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for key in systems.keys() {
        graph.add_node(key.as_str());
    }

    for (key, cluster) in systems {
        let imports: Vec<String> = cluster
            .imports_seen
            .iter()
            .map(|import| import.to_lowercase())
            .filter(|import| !import.is_empty())
            .collect();
        if imports.is_empty() {
            continue;
        }

        for target in systems.keys() {
            if target == key {
                continue;
            }
            let needle = target.to_lowercase();
            if imports.iter().any(|import| import.contains(needle.as_str())) {
                graph.add_edge(key.as_str(), target.as_str(), ());
            }
        }
    }

    let mut edges = DependencyEdges {
        edge_count: graph.edge_count(),
        ..Default::default()
    };
    for key in systems.keys() {
        let mut outgoing: Vec<String> = graph
            .neighbors_directed(key.as_str(), Direction::Outgoing)
            .map(str::to_string)
            .collect();
        outgoing.sort();
        let mut incoming: Vec<String> = graph
            .neighbors_directed(key.as_str(), Direction::Incoming)
            .map(str::to_string)
            .collect();
        incoming.sort();
        edges.depends_on.insert(key.clone(), outgoing);
        edges.imported_by.insert(key.clone(), incoming);
    }
    edges
}
