//! Org-chart service: position lifecycle, occupant assignment,
//! departments, the title catalog and memberships.
//!
//! Every write is followed by a full reload of the organization's chart.
//! Reloads are guarded by a per-organization [`ViewGeneration`]: a reload
//! only replaces the cached snapshot while its ticket is current.

use std::collections::HashMap;
use std::sync::Arc;

use brigade_core::context::{AppContext, ViewGeneration, ViewTicket};
use brigade_core::error::{BrigadeError, BrigadeResult};
use brigade_core::hierarchy::{PositionForest, PositionNode};
use brigade_core::models::{
    department::{CreateDepartment, Department, is_valid_color},
    membership::{CreateMembership, Member, MemberRole, Membership},
    position::{CreatePosition, Position, PositionPermissions, PositionTitle},
};
use brigade_core::repository::{
    DepartmentRepository, MembershipRepository, PositionRepository, PositionTitleRepository,
};
use brigade_core::slug::slugify;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::snapshot::{ChartSnapshot, Reconciled};

fn default_open() -> bool {
    true
}

/// Input for creating a position. The level is derived from the parent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPosition {
    pub title: String,
    pub department_id: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default = "default_open")]
    pub is_open: bool,
    #[serde(default)]
    pub permissions: PositionPermissions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    pub color: String,
}

#[derive(Default)]
struct ViewState {
    generation: ViewGeneration,
    snapshot: Option<Arc<ChartSnapshot>>,
}

pub struct OrgChartService<P, M, D, T>
where
    P: PositionRepository,
    M: MembershipRepository,
    D: DepartmentRepository,
    T: PositionTitleRepository,
{
    positions: P,
    members: M,
    departments: D,
    titles: T,
    config: ChartConfig,
    views: RwLock<HashMap<Uuid, ViewState>>,
}

impl<P, M, D, T> OrgChartService<P, M, D, T>
where
    P: PositionRepository,
    M: MembershipRepository,
    D: DepartmentRepository,
    T: PositionTitleRepository,
{
    pub fn new(positions: P, members: M, departments: D, titles: T, config: ChartConfig) -> Self {
        Self {
            positions,
            members,
            departments,
            titles,
            config,
            views: RwLock::new(HashMap::new()),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The organization's chart, served from cache while no write has
    /// happened since it was loaded.
    pub async fn chart(&self, ctx: &AppContext) -> BrigadeResult<Arc<ChartSnapshot>> {
        let cached = self
            .views
            .read()
            .await
            .get(&ctx.organization_id)
            .and_then(|state| {
                state
                    .snapshot
                    .as_ref()
                    .filter(|s| s.generation == state.generation.current())
                    .map(Arc::clone)
            });
        match cached {
            Some(snapshot) => Ok(snapshot),
            None => self.reload(ctx.organization_id).await,
        }
    }

    /// Nested position trees of one department.
    pub async fn tree(
        &self,
        ctx: &AppContext,
        department: &str,
    ) -> BrigadeResult<Vec<PositionNode>> {
        Ok(self.chart(ctx).await?.forest.tree(department))
    }

    /// A position plus all of its transitive subordinates.
    pub async fn scope(&self, ctx: &AppContext, position_id: Uuid) -> BrigadeResult<Vec<Position>> {
        let chart = self.chart(ctx).await?;
        if !chart.forest.contains(position_id) {
            return Err(BrigadeError::not_found("position", position_id));
        }
        let scope = chart.forest.scope(position_id);
        Ok(chart
            .forest
            .positions()
            .iter()
            .filter(|p| scope.contains(&p.id))
            .cloned()
            .collect())
    }

    pub async fn list_members(&self, ctx: &AppContext) -> BrigadeResult<Vec<Member>> {
        Ok(self.chart(ctx).await?.members.clone())
    }

    pub async fn list_departments(&self, ctx: &AppContext) -> BrigadeResult<Vec<Department>> {
        self.departments.list(ctx.organization_id).await
    }

    pub async fn list_titles(&self, ctx: &AppContext) -> BrigadeResult<Vec<PositionTitle>> {
        self.titles.list(ctx.organization_id).await
    }

    /// Drop the cached chart and invalidate any reload in flight.
    pub async fn dismiss(&self, organization_id: Uuid) {
        if let Some(state) = self.views.write().await.remove(&organization_id) {
            state.generation.dismiss();
        }
    }

    // -----------------------------------------------------------------------
    // Positions
    // -----------------------------------------------------------------------

    pub async fn create_position(
        &self,
        ctx: &AppContext,
        input: NewPosition,
    ) -> BrigadeResult<Reconciled<Position>> {
        ctx.require_admin()?;
        let org = ctx.organization_id;

        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(self.rejected(org, ChartError::EmptyTitle));
        }

        match self.departments.get(org, &input.department_id).await {
            Ok(_) => {}
            Err(BrigadeError::NotFound { .. }) => {
                return Err(self.rejected(org, ChartError::UnknownDepartment(input.department_id)));
            }
            Err(e) => return Err(e),
        }

        let level = match input.parent_id {
            None => 0,
            Some(parent_id) => {
                let parent = match self.positions.get_by_id(org, parent_id).await {
                    Ok(p) => p,
                    Err(BrigadeError::NotFound { .. }) => {
                        return Err(self.rejected(org, ChartError::UnknownParent(parent_id)));
                    }
                    Err(e) => return Err(e),
                };
                if parent.department_id != input.department_id {
                    return Err(self.rejected(
                        org,
                        ChartError::ParentDepartmentMismatch {
                            parent_id,
                            parent_department: parent.department_id,
                            department: input.department_id,
                        },
                    ));
                }
                parent.level + 1
            }
        };

        let position = self
            .positions
            .create(CreatePosition {
                organization_id: org,
                title,
                department_id: input.department_id,
                parent_id: input.parent_id,
                level,
                is_open: input.is_open,
                permissions: input.permissions,
            })
            .await?;

        info!(
            organization_id = %org,
            position_id = %position.id,
            department = %position.department_id,
            "Position created"
        );
        self.reconcile(org, position).await
    }

    /// Delete a childless position.
    pub async fn delete_position(
        &self,
        ctx: &AppContext,
        position_id: Uuid,
    ) -> BrigadeResult<Reconciled<()>> {
        ctx.require_admin()?;
        self.positions
            .delete(ctx.organization_id, position_id)
            .await?;
        self.reconcile(ctx.organization_id, ()).await
    }

    pub async fn update_permissions(
        &self,
        ctx: &AppContext,
        position_id: Uuid,
        permissions: PositionPermissions,
    ) -> BrigadeResult<Reconciled<Position>> {
        ctx.require_admin()?;
        let position = self
            .positions
            .update_permissions(ctx.organization_id, position_id, permissions)
            .await?;
        info!(
            organization_id = %ctx.organization_id,
            %position_id,
            "Position permissions replaced"
        );
        self.reconcile(ctx.organization_id, position).await
    }

    pub async fn set_open(
        &self,
        ctx: &AppContext,
        position_id: Uuid,
        is_open: bool,
    ) -> BrigadeResult<Reconciled<Position>> {
        ctx.require_admin()?;
        let position = self
            .positions
            .set_open(ctx.organization_id, position_id, is_open)
            .await?;
        info!(
            organization_id = %ctx.organization_id,
            %position_id,
            is_open,
            "Position vacancy updated"
        );
        self.reconcile(ctx.organization_id, position).await
    }

    // -----------------------------------------------------------------------
    // Assignment
    // -----------------------------------------------------------------------

    /// Make `user_id` the sole occupant of `position_id`, vacating any
    /// other position the user held.
    pub async fn assign(
        &self,
        ctx: &AppContext,
        position_id: Uuid,
        user_id: Uuid,
    ) -> BrigadeResult<Reconciled<()>> {
        ctx.require_admin()?;
        let org = ctx.organization_id;

        let position = self.positions.get_by_id(org, position_id).await?;
        match self.members.get(org, user_id).await {
            Ok(_) => {}
            Err(BrigadeError::NotFound { .. }) => {
                return Err(self.rejected(org, ChartError::NotAMember(user_id)));
            }
            Err(e) => return Err(e),
        }

        if position.occupant_id == Some(user_id) {
            debug!(organization_id = %org, %position_id, %user_id, "Already the occupant");
        } else {
            if let Some(previous) = position.occupant_id {
                debug!(organization_id = %org, %position_id, %previous, "Displacing occupant");
            }
            self.positions
                .assign_occupant(org, position_id, user_id)
                .await?;
        }
        self.reconcile(org, ()).await
    }

    /// Vacate a position. Vacant positions are left as they are.
    pub async fn unassign(
        &self,
        ctx: &AppContext,
        position_id: Uuid,
    ) -> BrigadeResult<Reconciled<()>> {
        ctx.require_admin()?;
        let org = ctx.organization_id;

        let position = self.positions.get_by_id(org, position_id).await?;
        if !position.is_vacant() {
            self.positions.clear_occupant(org, position_id).await?;
        }
        self.reconcile(org, ()).await
    }

    // -----------------------------------------------------------------------
    // Departments and titles
    // -----------------------------------------------------------------------

    pub async fn create_department(
        &self,
        ctx: &AppContext,
        input: NewDepartment,
    ) -> BrigadeResult<Reconciled<Department>> {
        ctx.require_admin()?;
        let org = ctx.organization_id;

        let name = input.name.trim().to_string();
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(self.rejected(org, ChartError::EmptySlug(name)));
        }
        if !is_valid_color(&input.color) {
            return Err(self.rejected(org, ChartError::InvalidColor(input.color)));
        }

        let department = self
            .departments
            .create(
                &slug,
                CreateDepartment {
                    organization_id: org,
                    name,
                    color: input.color,
                },
            )
            .await?;

        info!(organization_id = %org, department = %department.id, "Department created");
        self.reconcile(org, department).await
    }

    /// Remove a department definition. Positions keep their department id.
    pub async fn delete_department(
        &self,
        ctx: &AppContext,
        slug: &str,
    ) -> BrigadeResult<Reconciled<()>> {
        ctx.require_admin()?;
        self.departments.delete(ctx.organization_id, slug).await?;
        info!(organization_id = %ctx.organization_id, department = %slug, "Department deleted");
        self.reconcile(ctx.organization_id, ()).await
    }

    pub async fn add_title(&self, ctx: &AppContext, title: &str) -> BrigadeResult<PositionTitle> {
        ctx.require_admin()?;
        let title = title.trim();
        if title.is_empty() {
            return Err(self.rejected(ctx.organization_id, ChartError::EmptyTitle));
        }
        let added = self.titles.add(ctx.organization_id, title).await?;
        info!(organization_id = %ctx.organization_id, title, "Title added to catalog");
        Ok(added)
    }

    pub async fn remove_title(&self, ctx: &AppContext, title: &str) -> BrigadeResult<()> {
        ctx.require_admin()?;
        self.titles.remove(ctx.organization_id, title.trim()).await?;
        info!(organization_id = %ctx.organization_id, title, "Title removed from catalog");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------------

    pub async fn add_member(
        &self,
        ctx: &AppContext,
        user_id: Uuid,
        role: MemberRole,
    ) -> BrigadeResult<Reconciled<Membership>> {
        ctx.require_admin()?;
        if role == MemberRole::Owner {
            self.require_owner(ctx)?;
        }
        let membership = self
            .members
            .add(CreateMembership {
                organization_id: ctx.organization_id,
                user_id,
                role,
            })
            .await?;
        self.reconcile(ctx.organization_id, membership).await
    }

    pub async fn change_role(
        &self,
        ctx: &AppContext,
        user_id: Uuid,
        role: MemberRole,
    ) -> BrigadeResult<Reconciled<Membership>> {
        ctx.require_admin()?;
        let org = ctx.organization_id;
        let current = self.members.get(org, user_id).await?;
        if current.role == role {
            return self.reconcile(org, current).await;
        }
        if current.role == MemberRole::Owner || role == MemberRole::Owner {
            self.require_owner(ctx)?;
        }
        if current.role == MemberRole::Owner {
            self.ensure_other_owner(org, user_id).await?;
        }

        let membership = self.members.update_role(org, user_id, role).await?;
        info!(
            organization_id = %org,
            %user_id,
            from = current.role.as_str(),
            to = role.as_str(),
            "Member role changed"
        );
        self.reconcile(org, membership).await
    }

    /// Remove a member, vacating the position they hold.
    pub async fn remove_member(
        &self,
        ctx: &AppContext,
        user_id: Uuid,
    ) -> BrigadeResult<Reconciled<()>> {
        ctx.require_admin()?;
        let org = ctx.organization_id;
        let current = self.members.get(org, user_id).await?;
        if current.role == MemberRole::Owner {
            self.require_owner(ctx)?;
            self.ensure_other_owner(org, user_id).await?;
        }

        self.members.remove(org, user_id).await?;
        self.reconcile(org, ()).await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_owner(&self, ctx: &AppContext) -> BrigadeResult<()> {
        if ctx.role == MemberRole::Owner {
            Ok(())
        } else {
            Err(ChartError::OwnerRequired.into())
        }
    }

    async fn ensure_other_owner(&self, organization_id: Uuid, user_id: Uuid) -> BrigadeResult<()> {
        let members = self.members.list_members(organization_id).await?;
        let others = members
            .iter()
            .filter(|m| m.role == MemberRole::Owner && m.user_id != user_id)
            .count();
        if others == 0 {
            return Err(self.rejected(organization_id, ChartError::LastOwner));
        }
        Ok(())
    }

    fn rejected(&self, organization_id: Uuid, err: ChartError) -> BrigadeError {
        warn!(%organization_id, error = %err, "Chart change rejected");
        err.into()
    }

    async fn generation(&self, organization_id: Uuid) -> ViewGeneration {
        if let Some(state) = self.views.read().await.get(&organization_id) {
            return state.generation.clone();
        }
        self.views
            .write()
            .await
            .entry(organization_id)
            .or_default()
            .generation
            .clone()
    }

    /// Invalidate the cached chart and reload it after a write.
    async fn reconcile<V>(&self, organization_id: Uuid, value: V) -> BrigadeResult<Reconciled<V>> {
        self.generation(organization_id).await.advance();
        let chart = self.reload(organization_id).await?;
        Ok(Reconciled { value, chart })
    }

    async fn reload(&self, organization_id: Uuid) -> BrigadeResult<Arc<ChartSnapshot>> {
        let ticket = self.generation(organization_id).await.ticket();

        let positions = self.positions.list_by_organization(organization_id).await?;
        let members = self.members.list_members(organization_id).await?;
        let departments = self.departments.list(organization_id).await?;

        let forest = PositionForest::build(positions, self.config.max_depth).map_err(|e| {
            error!(%organization_id, error = %e, "Org chart failed validation on load");
            BrigadeError::from(e)
        })?;

        let snapshot = Arc::new(ChartSnapshot {
            organization_id,
            generation: ticket.generation(),
            departments,
            members,
            forest,
        });

        for violation in snapshot.occupancy_violations() {
            error!(%organization_id, %violation, "Occupancy invariant violated after reload");
        }

        self.publish(organization_id, &ticket, &snapshot).await;
        Ok(snapshot)
    }

    async fn publish(
        &self,
        organization_id: Uuid,
        ticket: &ViewTicket,
        snapshot: &Arc<ChartSnapshot>,
    ) {
        let mut views = self.views.write().await;
        if !ticket.is_current() {
            debug!(
                %organization_id,
                generation = ticket.generation(),
                "Discarding stale chart reload"
            );
            return;
        }
        // Dismissed organizations have no entry to publish into.
        if let Some(state) = views.get_mut(&organization_id) {
            state.snapshot = Some(Arc::clone(snapshot));
        }
    }
}

#[cfg(test)]
mod tests {
    use brigade_db::repository::{
        SurrealDepartmentRepository, SurrealMembershipRepository, SurrealPositionRepository,
        SurrealPositionTitleRepository,
    };
    use surrealdb::Surreal;
    use surrealdb::engine::local::{Db, Mem};

    use super::*;

    type Chart = OrgChartService<
        SurrealPositionRepository<Db>,
        SurrealMembershipRepository<Db>,
        SurrealDepartmentRepository<Db>,
        SurrealPositionTitleRepository<Db>,
    >;

    async fn service() -> (Chart, AppContext) {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        brigade_db::run_migrations(&db).await.unwrap();

        let chart = OrgChartService::new(
            SurrealPositionRepository::new(db.clone()),
            SurrealMembershipRepository::new(db.clone()),
            SurrealDepartmentRepository::new(db.clone()),
            SurrealPositionTitleRepository::new(db),
            ChartConfig::default(),
        );
        let ctx = AppContext {
            organization_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role: MemberRole::Owner,
        };
        (chart, ctx)
    }

    async fn cached(chart: &Chart, organization_id: Uuid) -> Option<Arc<ChartSnapshot>> {
        chart
            .views
            .read()
            .await
            .get(&organization_id)
            .and_then(|state| state.snapshot.clone())
    }

    #[tokio::test]
    async fn reload_overtaken_by_a_write_is_not_published() {
        let (chart, ctx) = service().await;
        let org = ctx.organization_id;

        let before = chart.chart(&ctx).await.unwrap();
        let ticket = chart.generation(org).await.ticket();

        let written = chart
            .create_department(
                &ctx,
                NewDepartment {
                    name: "Kitchen".into(),
                    color: "#aa3300".into(),
                },
            )
            .await
            .unwrap();
        assert!(!ticket.is_current());

        chart.publish(org, &ticket, &before).await;

        let current = cached(&chart, org).await.unwrap();
        assert!(Arc::ptr_eq(&current, &written.chart));
        assert!(!Arc::ptr_eq(&current, &before));
        assert_eq!(current.departments.len(), 1);
    }

    #[tokio::test]
    async fn reload_finishing_after_dismiss_is_dropped() {
        let (chart, ctx) = service().await;
        let org = ctx.organization_id;

        let before = chart.chart(&ctx).await.unwrap();
        let ticket = chart.generation(org).await.ticket();
        chart.dismiss(org).await;

        chart.publish(org, &ticket, &before).await;
        assert!(cached(&chart, org).await.is_none());
    }
}
