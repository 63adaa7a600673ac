//! Loaded org-chart state for one organization.

use std::collections::HashMap;
use std::sync::Arc;

use brigade_core::hierarchy::{PositionForest, PositionNode};
use brigade_core::models::{department::Department, membership::Member};
use serde::Serialize;
use uuid::Uuid;

/// Everything the chart needs, fetched in one reload.
#[derive(Debug, Clone)]
pub struct ChartSnapshot {
    pub organization_id: Uuid,
    /// View generation the reload was started under.
    pub generation: u64,
    pub departments: Vec<Department>,
    pub members: Vec<Member>,
    pub forest: PositionForest,
}

/// Serializable chart, grouped by department.
#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub organization_id: Uuid,
    pub generation: u64,
    pub departments: Vec<DepartmentChart>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentChart {
    pub id: String,
    /// `None` when positions still reference a deleted department.
    pub name: Option<String>,
    pub color: Option<String>,
    pub positions: Vec<PositionNode>,
}

/// A write result paired with the chart reloaded after the write.
#[derive(Debug, Clone)]
pub struct Reconciled<T> {
    pub value: T,
    pub chart: Arc<ChartSnapshot>,
}

impl ChartSnapshot {
    pub fn member(&self, user_id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn department(&self, slug: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == slug)
    }

    /// Members that hold no position.
    pub fn unassigned_members(&self) -> Vec<&Member> {
        self.members
            .iter()
            .filter(|m| m.position_id.is_none())
            .collect()
    }

    /// Group the forest by department. Defined departments come first in
    /// their listed order, followed by department ids that only appear on
    /// positions.
    pub fn view(&self) -> ChartView {
        let mut departments: Vec<DepartmentChart> = self
            .departments
            .iter()
            .map(|d| DepartmentChart {
                id: d.id.clone(),
                name: Some(d.name.clone()),
                color: Some(d.color.clone()),
                positions: self.forest.tree(&d.id),
            })
            .collect();

        for slug in self.forest.departments() {
            if self.department(slug).is_none() {
                departments.push(DepartmentChart {
                    id: slug.to_string(),
                    name: None,
                    color: None,
                    positions: self.forest.tree(slug),
                });
            }
        }

        ChartView {
            organization_id: self.organization_id,
            generation: self.generation,
            departments,
            members: self.members.clone(),
        }
    }

    /// Cross-check position occupants against member position references.
    /// Returns one description per inconsistency; empty when the chart
    /// agrees with the membership list.
    pub fn occupancy_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut held: HashMap<Uuid, Vec<Uuid>> = HashMap::new();

        for position in self.forest.positions() {
            let Some(occupant) = position.occupant_id else {
                continue;
            };
            held.entry(occupant).or_default().push(position.id);
            match self.member(occupant) {
                None => violations.push(format!(
                    "position {} is occupied by non-member {occupant}",
                    position.id
                )),
                Some(m) if m.position_id != Some(position.id) => violations.push(format!(
                    "position {} names occupant {occupant} but the membership points at {:?}",
                    position.id, m.position_id
                )),
                Some(_) => {}
            }
        }

        for (user, positions) in &held {
            if positions.len() > 1 {
                violations.push(format!(
                    "user {user} occupies {} positions",
                    positions.len()
                ));
            }
        }

        for member in &self.members {
            let Some(position_id) = member.position_id else {
                continue;
            };
            let occupant = self.forest.get(position_id).and_then(|p| p.occupant_id);
            if occupant != Some(member.user_id) {
                violations.push(format!(
                    "membership of {} points at position {position_id} which it does not occupy",
                    member.user_id
                ));
            }
        }

        violations
    }
}
