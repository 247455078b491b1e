//! Module graph built on petgraph.
//!
//! Edges point from a dependency to its dependent, so a topological sort
//! yields dependencies before the modules that declare them and the outgoing
//! neighbours of a node are exactly the modules a bump must cascade to.

use crate::{Error, Module, ModuleId, Result};
use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

/// Immutable dependency graph over a fixed set of modules.
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    /// Directed graph, edge `a -> b` meaning `b` depends on `a`.
    graph: DiGraph<Module, ()>,
    /// Map from module ids to node indices.
    id_to_node: HashMap<ModuleId, NodeIndex>,
}

impl ModuleGraph {
    /// Build a graph from a complete module set.
    ///
    /// # Errors
    ///
    /// Returns an error if two modules share an id or a module declares a
    /// dependency on an id that is not in the set. Cycles are not rejected
    /// here; they surface from [`ModuleGraph::topological_order`].
    pub fn new(modules: impl IntoIterator<Item = Module>) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut id_to_node = HashMap::new();

        for module in modules {
            if id_to_node.contains_key(&module.id) {
                return Err(Error::DuplicateModule { id: module.id });
            }
            let id = module.id.clone();
            let node = graph.add_node(module);
            id_to_node.insert(id, node);
        }

        let mut edges = Vec::new();
        for node in graph.node_indices() {
            let module = &graph[node];
            for dependency in &module.dependencies {
                let Some(&dep_node) = id_to_node.get(dependency) else {
                    return Err(Error::DanglingDependency {
                        module: module.id.clone(),
                        dependency: dependency.clone(),
                    });
                };
                edges.push((dep_node, node));
            }
        }
        for (from, to) in edges {
            graph.add_edge(from, to, ());
        }

        debug!(
            modules = graph.node_count(),
            edges = graph.edge_count(),
            "Built module graph"
        );

        Ok(Self { graph, id_to_node })
    }

    /// Number of modules in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check if a module exists in the graph.
    #[must_use]
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.id_to_node.contains_key(id)
    }

    /// Look up a module by id.
    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.id_to_node.get(id).map(|&node| &self.graph[node])
    }

    /// All modules, in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.graph.node_weights()
    }

    /// The root module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRootModule`] if no module has the root id.
    pub fn root(&self) -> Result<&Module> {
        self.module(&ModuleId::root()).ok_or(Error::MissingRootModule)
    }

    /// Modules that declare a dependency on `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownModule`] if `id` is not in the graph.
    pub fn dependents_of(&self, id: &ModuleId) -> Result<BTreeSet<ModuleId>> {
        let node = self.node(id)?;
        Ok(self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|n| self.graph[n].id.clone())
            .collect())
    }

    /// Modules that `id` declares a dependency on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownModule`] if `id` is not in the graph.
    pub fn dependencies_of(&self, id: &ModuleId) -> Result<&BTreeSet<ModuleId>> {
        let node = self.node(id)?;
        Ok(&self.graph[node].dependencies)
    }

    /// Check if the dependency relation has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Module ids ordered so that every dependency precedes its dependents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DependencyCycle`] with a concrete cycle path if the
    /// dependency relation is not acyclic.
    pub fn topological_order(&self) -> Result<Vec<ModuleId>> {
        match toposort(&self.graph, None) {
            Ok(sorted) => {
                let order: Vec<ModuleId> = sorted
                    .into_iter()
                    .map(|node| self.graph[node].id.clone())
                    .collect();
                debug!(?order, "Computed topological order");
                Ok(order)
            }
            Err(_) => Err(Error::DependencyCycle {
                cycle: self.find_cycle(),
            }),
        }
    }

    fn node(&self, id: &ModuleId) -> Result<NodeIndex> {
        self.id_to_node
            .get(id)
            .copied()
            .ok_or_else(|| Error::unknown_module(id))
    }

    /// Find a closed dependency path, walking "depends-on" edges.
    ///
    /// Picks the cyclic component containing the smallest module id so the
    /// reported path does not depend on registration order.
    fn find_cycle(&self) -> Vec<ModuleId> {
        let component = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .filter_map(|scc| {
                let start = scc
                    .iter()
                    .copied()
                    .min_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id))?;
                Some((start, scc))
            })
            .min_by(|(a, _), (b, _)| self.graph[*a].id.cmp(&self.graph[*b].id));

        let Some((start, members)) = component else {
            return Vec::new();
        };
        let members: HashSet<NodeIndex> = members.into_iter().collect();

        // Breadth-first search from `start` back to itself inside the component.
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        let mut closing = None;
        'search: while let Some(current) = queue.pop_front() {
            let mut next: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(current, Direction::Incoming)
                .filter(|n| members.contains(n))
                .collect();
            next.sort_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));
            for neighbor in next {
                if neighbor == start {
                    closing = Some(current);
                    break 'search;
                }
                if !parent.contains_key(&neighbor) {
                    parent.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }

        let Some(mut current) = closing else {
            return Vec::new();
        };
        let mut path = vec![start];
        let mut tail = Vec::new();
        while current != start {
            tail.push(current);
            current = parent[&current];
        }
        path.extend(tail.into_iter().rev());
        path.push(start);

        path.into_iter()
            .map(|node| self.graph[node].id.clone())
            .collect()
    }
}
