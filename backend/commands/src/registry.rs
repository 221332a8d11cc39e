//! Command graph: the registry of descriptors and the chains linking them.
//!
//! Built once at startup from an explicit registration table and shared
//! read-only afterwards.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use stepflow_core::RegistrationError;
use tracing::{debug, info, warn};

use crate::detection::is_reserved;
use crate::types::{CommandDescriptor, PrevLink, Step};

/// One registered command together with its resolved chain.
#[derive(Debug, Clone)]
pub struct GraphEntry {
    pub descriptor: CommandDescriptor,
    pub step: Arc<Step>,
}

/// Immutable mapping from command name to resolved step.
#[derive(Debug, Clone, Default)]
pub struct CommandGraph {
    /// Declaration order.
    entries: Vec<GraphEntry>,
    index: HashMap<String, usize>,
}

impl CommandGraph {
    /// Validate the registration table and link every chain.
    pub fn build(descriptors: Vec<CommandDescriptor>) -> Result<Self, RegistrationError> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (i, d) in descriptors.iter().enumerate() {
            if d.name.trim().is_empty() {
                return Err(RegistrationError::BlankName);
            }
            if is_reserved(&d.name) {
                return Err(RegistrationError::ReservedName(d.name.clone()));
            }
            if index.insert(d.name.clone(), i).is_some() {
                return Err(RegistrationError::DuplicateName(d.name.clone()));
            }
        }

        let resolver = Resolver { descriptors: &descriptors, index: &index };

        let forward: Vec<Option<Arc<Step>>> = descriptors
            .iter()
            .map(|d| {
                let mut visited = HashSet::from([d.name.as_str()]);
                resolver.resolve(d.next_name.as_deref(), &mut visited)
            })
            .collect();

        // First declared source wins when two commands name the same successor.
        let mut prev: HashMap<&str, PrevLink> = HashMap::new();
        for (d, next) in descriptors.iter().zip(&forward) {
            let Some(next) = next else { continue };
            if let Some(existing) = prev.get(next.name.as_str()) {
                warn!(
                    command = %d.name,
                    successor = %next.name,
                    kept = %existing.name,
                    "Two chains share a successor; keeping the first back-reference"
                );
                continue;
            }
            prev.insert(next.name.as_str(), PrevLink { name: d.name.clone(), order: d.order });
        }

        let entries: Vec<GraphEntry> = descriptors
            .iter()
            .zip(&forward)
            .map(|(d, next)| GraphEntry {
                descriptor: d.clone(),
                step: Arc::new(Step {
                    name: d.name.clone(),
                    action: d.action.clone(),
                    auxiliary_data: d.auxiliary_data.clone(),
                    next: next.clone(),
                    prev: prev.get(d.name.as_str()).cloned(),
                    order: d.order,
                }),
            })
            .collect();

        let graph = Self { entries, index };
        info!(
            commands = graph.len(),
            heads = graph.heads().count(),
            categories = graph.categories().len(),
            "Command graph built"
        );
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&GraphEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn step(&self, name: &str) -> Option<&Arc<Step>> {
        self.get(name).map(|e| &e.step)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[GraphEntry] {
        &self.entries
    }

    /// Entries that start a chain (shown in the menu).
    pub fn heads(&self) -> impl Iterator<Item = &GraphEntry> {
        self.entries.iter().filter(|e| e.step.is_head())
    }

    /// Entries grouped by category, categories in first-seen order and
    /// entries in declaration order within each.
    pub fn categories(&self) -> Vec<(&str, Vec<&GraphEntry>)> {
        let mut groups: Vec<(&str, Vec<&GraphEntry>)> = Vec::new();
        for entry in &self.entries {
            let category = entry.descriptor.category.as_str();
            match groups.iter_mut().find(|(c, _)| *c == category) {
                Some((_, members)) => members.push(entry),
                None => groups.push((category, vec![entry])),
            }
        }
        groups
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

struct Resolver<'a> {
    descriptors: &'a [CommandDescriptor],
    index: &'a HashMap<String, usize>,
}

impl<'a> Resolver<'a> {
    /// Depth-first walk along `next_name` references.
    ///
    /// Returns `None` for a missing target or a name already on the path.
    fn resolve(&self, name: Option<&'a str>, visited: &mut HashSet<&'a str>) -> Option<Arc<Step>> {
        let name = name?;
        let Some(&i) = self.index.get(name) else {
            warn!(missing = %name, "Unresolved next reference; chain ends here");
            return None;
        };
        if !visited.insert(name) {
            debug!(command = %name, "Cycle in next references; chain ends here");
            return None;
        }

        let descriptors = self.descriptors;
        let d = &descriptors[i];
        let next = self.resolve(d.next_name.as_deref(), visited);
        Some(Arc::new(Step {
            name: d.name.clone(),
            action: d.action.clone(),
            auxiliary_data: d.auxiliary_data.clone(),
            next,
            prev: None,
            order: d.order,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Noop;

    fn cmd(name: &str) -> CommandDescriptor {
        CommandDescriptor::new(name, Noop)
    }

    fn chain_of(graph: &CommandGraph, name: &str) -> Vec<String> {
        graph
            .step(name)
            .unwrap()
            .chain_names()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn registry_size_matches_descriptors() {
        let graph = CommandGraph::build(vec![cmd("A"), cmd("B"), cmd("C")]).unwrap();
        assert_eq!(graph.len(), 3);
        assert!(graph.contains("B"));
        assert!(!graph.contains("D"));
    }

    #[test]
    fn empty_table_builds_empty_graph() {
        let graph = CommandGraph::build(vec![]).unwrap();
        assert!(graph.is_empty());
        assert!(graph.categories().is_empty());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let err = CommandGraph::build(vec![cmd("A"), cmd("B"), cmd("A")]).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateName("A".into()));
    }

    #[test]
    fn reserved_and_blank_names_are_rejected() {
        assert_eq!(
            CommandGraph::build(vec![cmd("cancel")]).unwrap_err(),
            RegistrationError::ReservedName("cancel".into())
        );
        assert_eq!(
            CommandGraph::build(vec![cmd("/start")]).unwrap_err(),
            RegistrationError::ReservedName("/start".into())
        );
        assert_eq!(CommandGraph::build(vec![cmd("  ")]).unwrap_err(), RegistrationError::BlankName);
    }

    #[test]
    fn links_chain_in_next_order() {
        // Declared out of order on purpose.
        let graph = CommandGraph::build(vec![
            cmd("C").order(1),
            cmd("A").next("B").order(3),
            cmd("B").next("C").order(2),
        ])
        .unwrap();

        assert_eq!(chain_of(&graph, "A"), vec!["A", "B", "C"]);
        assert_eq!(chain_of(&graph, "B"), vec!["B", "C"]);
        assert_eq!(chain_of(&graph, "C"), vec!["C"]);
    }

    #[test]
    fn prev_marks_non_heads() {
        let graph = CommandGraph::build(vec![
            cmd("A").next("B").order(1),
            cmd("B").next("C"),
            cmd("C"),
            cmd("Solo"),
        ])
        .unwrap();

        let heads: Vec<_> = graph.heads().map(|e| e.descriptor.name.as_str()).collect();
        assert_eq!(heads, vec!["A", "Solo"]);

        let b = graph.step("B").unwrap();
        assert_eq!(b.prev, Some(PrevLink { name: "A".into(), order: 1 }));
        assert_eq!(graph.step("C").unwrap().prev.as_ref().unwrap().name, "B");
    }

    #[test]
    fn self_reference_terminates_without_next() {
        let graph = CommandGraph::build(vec![cmd("A").next("A")]).unwrap();
        let a = graph.step("A").unwrap();
        assert!(a.next.is_none());
        assert!(a.is_head());
    }

    #[test]
    fn longer_cycle_is_cut_before_repeating() {
        let graph = CommandGraph::build(vec![
            cmd("A").next("B"),
            cmd("B").next("C"),
            cmd("C").next("A"),
        ])
        .unwrap();
        assert_eq!(chain_of(&graph, "A"), vec!["A", "B", "C"]);
        assert_eq!(chain_of(&graph, "C"), vec!["C", "A", "B"]);
    }

    #[test]
    fn unresolved_next_truncates_chain() {
        let graph = CommandGraph::build(vec![cmd("A").next("Missing"), cmd("B")]).unwrap();
        assert!(graph.step("A").unwrap().next.is_none());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn shared_successor_keeps_first_back_reference() {
        let graph = CommandGraph::build(vec![
            cmd("A").next("Shared"),
            cmd("B").next("Shared"),
            cmd("Shared"),
        ])
        .unwrap();
        assert_eq!(graph.step("Shared").unwrap().prev.as_ref().unwrap().name, "A");
        assert_eq!(chain_of(&graph, "B"), vec!["B", "Shared"]);
    }

    #[test]
    fn build_is_idempotent() {
        let table = || {
            vec![
                cmd("A").next("B"),
                cmd("B").next("C"),
                cmd("C").next("A"),
                cmd("D").next("Missing"),
                cmd("E").category("other"),
            ]
        };
        let first = CommandGraph::build(table()).unwrap();
        let second = CommandGraph::build(table()).unwrap();

        for (x, y) in first.entries().iter().zip(second.entries()) {
            assert_eq!(x.step.chain_names(), y.step.chain_names());
            assert_eq!(x.step, y.step);
        }
    }

    #[test]
    fn categories_group_in_first_seen_order() {
        let graph = CommandGraph::build(vec![
            cmd("A").category("profile"),
            cmd("B"),
            cmd("C").category("profile"),
            cmd("D").category("help"),
        ])
        .unwrap();

        let grouped: Vec<(&str, Vec<&str>)> = graph
            .categories()
            .into_iter()
            .map(|(c, es)| (c, es.iter().map(|e| e.descriptor.name.as_str()).collect()))
            .collect();
        assert_eq!(
            grouped,
            vec![("profile", vec!["A", "C"]), ("default", vec!["B"]), ("help", vec!["D"])]
        );
    }

    #[test]
    fn many_unique_names_all_register() {
        let table: Vec<_> = (0..200)
            .map(|i| {
                let d = cmd(&format!("cmd-{i}"));
                if i % 3 == 0 { d.next(format!("cmd-{}", (i * 7) % 200)) } else { d }
            })
            .collect();
        let graph = CommandGraph::build(table).unwrap();
        assert_eq!(graph.len(), 200);
    }
}
