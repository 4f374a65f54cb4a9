//! Named script fragments with declared dependencies.
//!
//! Each helper of the standalone runtime is one fragment. A fragment lists
//! the fragments it calls into; [`FragmentSet::resolve`] pulls in the
//! transitive closure of what an export needs and orders it so every
//! fragment comes after its dependencies.

use crate::error::{ExportError, ExportResult};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::borrow::Cow;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub name: &'static str,
    pub deps: &'static [&'static str],
    pub source: Cow<'static, str>,
}

impl Fragment {
    /// A fragment whose source is compiled into the binary.
    pub const fn embedded(name: &'static str, deps: &'static [&'static str], source: &'static str) -> Self {
        Self {
            name,
            deps,
            source: Cow::Borrowed(source),
        }
    }

    /// A fragment whose source is built at export time.
    pub fn generated(name: &'static str, deps: &'static [&'static str], source: String) -> Self {
        Self {
            name,
            deps,
            source: Cow::Owned(source),
        }
    }

    /// Source text with a marker line, ready to concatenate.
    pub fn render(&self) -> String {
        format!("// ── {} ──\n{}\n", self.name, self.source.trim_end())
    }
}

/// A registry of fragments, keyed by name. Later inserts replace earlier
/// ones with the same name.
#[derive(Debug, Clone, Default)]
pub struct FragmentSet {
    fragments: Vec<Fragment>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fragment: Fragment) {
        match self.fragments.iter_mut().find(|f| f.name == fragment.name) {
            Some(slot) => *slot = fragment,
            None => self.fragments.push(fragment),
        }
    }

    pub fn with(mut self, fragment: Fragment) -> Self {
        self.insert(fragment);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// `roots` and everything they depend on, dependencies first.
    pub fn resolve(&self, roots: &[&str]) -> ExportResult<Vec<&Fragment>> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
        let mut queue: Vec<(&str, &str)> = roots.iter().rev().map(|r| ("export", *r)).collect();

        while let Some((requested_by, name)) = queue.pop() {
            if nodes.contains_key(name) {
                continue;
            }
            let Some(pos) = self.fragments.iter().position(|f| f.name == name) else {
                return Err(ExportError::UnknownFragment {
                    name: requested_by.to_string(),
                    missing: name.to_string(),
                });
            };
            let fragment = &self.fragments[pos];
            nodes.insert(fragment.name, graph.add_node(pos));
            for dep in fragment.deps.iter().rev() {
                queue.push((fragment.name, *dep));
            }
        }

        let indices: Vec<NodeIndex> = graph.node_indices().collect();
        for idx in indices {
            let fragment = &self.fragments[graph[idx]];
            for dep in fragment.deps {
                if let Some(&dep_idx) = nodes.get(dep) {
                    graph.add_edge(dep_idx, idx, ());
                }
            }
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| ExportError::FragmentCycle(self.fragments[graph[cycle.node_id()]].name.to_string()))?;
        Ok(order.into_iter().map(|idx| &self.fragments[graph[idx]]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names<'a>(fragments: &[&'a Fragment]) -> Vec<&'a str> {
        fragments.iter().map(|f| f.name).collect()
    }

    fn set() -> FragmentSet {
        FragmentSet::new()
            .with(Fragment::embedded("c", &["b"], "c();"))
            .with(Fragment::embedded("a", &[], "a();"))
            .with(Fragment::embedded("b", &["a"], "b();"))
            .with(Fragment::embedded("unused", &["a"], "u();"))
    }

    #[test]
    fn dependencies_come_first_and_unused_are_left_out() {
        let set = set();
        let order = set.resolve(&["c"]).expect("acyclic");
        assert_eq!(names(&order), vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_dependency_is_reported() {
        let s = set().with(Fragment::embedded("d", &["missing"], ""));
        match s.resolve(&["d"]) {
            Err(ExportError::UnknownFragment { name, missing }) => {
                assert_eq!((name.as_str(), missing.as_str()), ("d", "missing"));
            }
            other => panic!("expected unknown fragment, got {other:?}"),
        }
    }

    #[test]
    fn cycles_are_rejected() {
        let s = FragmentSet::new()
            .with(Fragment::embedded("x", &["y"], ""))
            .with(Fragment::embedded("y", &["x"], ""));
        assert!(matches!(s.resolve(&["x"]), Err(ExportError::FragmentCycle(_))));
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut s = set();
        s.insert(Fragment::generated("a", &[], "a2();".to_string()));
        assert_eq!(s.len(), 4);
        assert_eq!(s.get("a").map(|f| f.source.as_ref()), Some("a2();"));
    }

    #[test]
    fn rendered_fragment_is_marked() {
        let f = Fragment::embedded("geometry", &[], "const x = 1;\n\n");
        assert_eq!(f.render(), "// ── geometry ──\nconst x = 1;\n");
    }
}
