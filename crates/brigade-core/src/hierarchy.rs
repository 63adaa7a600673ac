//! Position hierarchy: materializes the per-department forest from the
//! flat position list and answers tree queries against it.
//!
//! The forest is an arena of positions plus a parent-id → children
//! index built once per load. Construction validates the parent
//! chains, so every traversal afterwards is bounded:
//!
//! - a chain that revisits a position is rejected as a cycle,
//! - a chain longer than `max_depth` is rejected,
//! - a parent in a different department is rejected.
//!
//! A position whose parent is missing from the list is treated as a
//! root of its department.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write as _;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::error::BrigadeError;
use crate::models::position::Position;

/// Default bound on parent-chain length.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("position {id} appears more than once")]
    DuplicateId { id: Uuid },

    #[error("position {id} is its own ancestor")]
    Cycle { id: Uuid },

    #[error("position {id} is nested deeper than {max_depth} levels")]
    TooDeep { id: Uuid, max_depth: usize },

    #[error(
        "position {id} in department '{department}' has parent {parent_id} \
         in department '{parent_department}'"
    )]
    DepartmentMismatch {
        id: Uuid,
        department: String,
        parent_id: Uuid,
        parent_department: String,
    },
}

impl From<HierarchyError> for BrigadeError {
    fn from(err: HierarchyError) -> Self {
        BrigadeError::Validation {
            message: err.to_string(),
        }
    }
}

/// One materialized tree node.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PositionNode {
    #[serde(flatten)]
    pub position: Position,
    pub children: Vec<PositionNode>,
}

impl PositionNode {
    /// Number of positions in this subtree, the node included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(PositionNode::size).sum::<usize>()
    }
}

/// Validated forest of positions for one organization.
#[derive(Debug, Clone, Default)]
pub struct PositionForest {
    positions: Vec<Position>,
    index: HashMap<Uuid, usize>,
    children: HashMap<Uuid, Vec<usize>>,
    roots: Vec<usize>,
    depths: Vec<usize>,
}

impl PositionForest {
    /// Build and validate the forest in O(n) (plus sorting of sibling
    /// lists).
    pub fn build(positions: Vec<Position>, max_depth: usize) -> Result<Self, HierarchyError> {
        let mut index = HashMap::with_capacity(positions.len());
        for (i, p) in positions.iter().enumerate() {
            if index.insert(p.id, i).is_some() {
                return Err(HierarchyError::DuplicateId { id: p.id });
            }
        }

        let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (i, p) in positions.iter().enumerate() {
            match p.parent_id.filter(|pid| index.contains_key(pid)) {
                Some(pid) => children.entry(pid).or_default().push(i),
                None => roots.push(i),
            }
        }

        let sibling_order = |a: &usize, b: &usize| {
            let (pa, pb) = (&positions[*a], &positions[*b]);
            (&pa.department_id, pa.level, &pa.title, pa.id).cmp(&(
                &pb.department_id,
                pb.level,
                &pb.title,
                pb.id,
            ))
        };
        roots.sort_by(sibling_order);
        for list in children.values_mut() {
            list.sort_by(sibling_order);
        }

        let mut forest = Self {
            positions,
            index,
            children,
            roots,
            depths: Vec::new(),
        };
        forest.check_departments()?;
        forest.depths = forest.compute_depths(max_depth)?;
        Ok(forest)
    }

    fn parent_index(&self, i: usize) -> Option<usize> {
        self.positions[i]
            .parent_id
            .and_then(|pid| self.index.get(&pid).copied())
    }

    fn check_departments(&self) -> Result<(), HierarchyError> {
        for (i, p) in self.positions.iter().enumerate() {
            if let Some(parent) = self.parent_index(i) {
                let parent = &self.positions[parent];
                if parent.department_id != p.department_id {
                    return Err(HierarchyError::DepartmentMismatch {
                        id: p.id,
                        department: p.department_id.clone(),
                        parent_id: parent.id,
                        parent_department: parent.department_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Walk each parent chain upwards until a root or an already
    /// measured position, then assign depths on the way back down.
    fn compute_depths(&self, max_depth: usize) -> Result<Vec<usize>, HierarchyError> {
        let mut depths: Vec<Option<usize>> = vec![None; self.positions.len()];

        for start in 0..self.positions.len() {
            if depths[start].is_some() {
                continue;
            }

            let mut path = Vec::new();
            let mut on_path = HashSet::new();
            let mut current = start;
            let top_depth = loop {
                if let Some(d) = depths[current] {
                    break d + 1;
                }
                if !on_path.insert(current) {
                    return Err(HierarchyError::Cycle {
                        id: self.positions[current].id,
                    });
                }
                path.push(current);
                match self.parent_index(current) {
                    Some(parent) => current = parent,
                    None => break 0,
                }
            };

            for (offset, &i) in path.iter().rev().enumerate() {
                let depth = top_depth + offset;
                if depth > max_depth {
                    return Err(HierarchyError::TooDeep {
                        id: self.positions[i].id,
                        max_depth,
                    });
                }
                depths[i] = Some(depth);
            }
        }

        Ok(depths.into_iter().map(|d| d.unwrap_or(0)).collect())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn get(&self, id: Uuid) -> Option<&Position> {
        self.index.get(&id).map(|&i| &self.positions[i])
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    /// Direct children, sorted by department, stored level, title and
    /// finally id.
    pub fn children(&self, id: Uuid) -> impl Iterator<Item = &Position> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&i| &self.positions[i])
    }

    pub fn child_count(&self, id: Uuid) -> usize {
        self.children.get(&id).map_or(0, Vec::len)
    }

    /// All roots, ordered by department then title.
    pub fn roots(&self) -> impl Iterator<Item = &Position> {
        self.roots.iter().map(|&i| &self.positions[i])
    }

    pub fn roots_in<'a>(&'a self, department: &'a str) -> impl Iterator<Item = &'a Position> {
        self.roots().filter(move |p| p.department_id == department)
    }

    /// Distinct department slugs referenced by positions, sorted.
    pub fn departments(&self) -> Vec<&str> {
        self.positions
            .iter()
            .map(|p| p.department_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distance from the root of the position's tree.
    pub fn depth(&self, id: Uuid) -> Option<usize> {
        self.index.get(&id).map(|&i| self.depths[i])
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: Uuid) -> Vec<&Position> {
        let mut out = Vec::new();
        let Some(&start) = self.index.get(&id) else {
            return out;
        };
        let mut current = self.parent_index(start);
        while let Some(i) = current {
            out.push(&self.positions[i]);
            current = self.parent_index(i);
        }
        out
    }

    /// The root plus every transitive descendant. Empty for an unknown
    /// root.
    pub fn scope(&self, root: Uuid) -> HashSet<Uuid> {
        let mut out = HashSet::new();
        let Some(&start) = self.index.get(&root) else {
            return out;
        };

        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            let id = self.positions[i].id;
            if !out.insert(id) {
                continue;
            }
            if let Some(kids) = self.children.get(&id) {
                stack.extend(kids.iter().copied());
            }
        }
        out
    }

    /// Whether `id` lies in the subtree rooted at `root`.
    pub fn in_scope(&self, root: Uuid, id: Uuid) -> bool {
        (id == root && self.contains(id)) || self.ancestors(id).iter().any(|p| p.id == root)
    }

    /// Positions occupied by `user_id`.
    pub fn occupied_by(&self, user_id: Uuid) -> Vec<&Position> {
        self.positions
            .iter()
            .filter(|p| p.occupant_id == Some(user_id))
            .collect()
    }

    fn node(&self, i: usize) -> PositionNode {
        let position = self.positions[i].clone();
        let children = self
            .children
            .get(&position.id)
            .map(|kids| kids.iter().map(|&k| self.node(k)).collect())
            .unwrap_or_default();
        PositionNode { position, children }
    }

    /// Materialize the trees of one department.
    pub fn tree(&self, department: &str) -> Vec<PositionNode> {
        self.roots
            .iter()
            .filter(|&&i| self.positions[i].department_id == department)
            .map(|&i| self.node(i))
            .collect()
    }

    /// Materialize every department's trees.
    pub fn trees(&self) -> Vec<PositionNode> {
        self.roots.iter().map(|&i| self.node(i)).collect()
    }

    /// Indented text outline of one department, two spaces per level.
    pub fn render_outline(&self, department: &str) -> String {
        fn walk(node: &PositionNode, depth: usize, out: &mut String) {
            let p = &node.position;
            let marker = if p.is_vacant() { " (vacant)" } else { "" };
            let _ = writeln!(out, "{}{}{}", "  ".repeat(depth), p.title, marker);
            for child in &node.children {
                walk(child, depth + 1, out);
            }
        }

        let mut out = String::new();
        for root in self.tree(department) {
            walk(&root, 0, &mut out);
        }
        out
    }
}
