//! Shared application state handed to every handler.

use std::sync::Arc;

use brigade_auth::{AuthConfig, AuthService};
use brigade_chart::{ChartConfig, OrgChartService, TrainingService};
use brigade_db::repository::{
    SurrealChannelRepository, SurrealCourseRepository, SurrealDepartmentRepository,
    SurrealMembershipRepository, SurrealOrganizationRepository, SurrealPositionRepository,
    SurrealPositionTitleRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

pub type Auth = AuthService<SurrealUserRepository<Any>, SurrealMembershipRepository<Any>>;

pub type Chart = OrgChartService<
    SurrealPositionRepository<Any>,
    SurrealMembershipRepository<Any>,
    SurrealDepartmentRepository<Any>,
    SurrealPositionTitleRepository<Any>,
>;

pub type Training = TrainingService<SurrealChannelRepository<Any>, SurrealCourseRepository<Any>>;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub chart: Arc<Chart>,
    pub training: Arc<Training>,
    pub organizations: Arc<SurrealOrganizationRepository<Any>>,
    pub users: Arc<SurrealUserRepository<Any>>,
}

impl AppState {
    pub fn new(db: Surreal<Any>, auth_config: AuthConfig, chart_config: ChartConfig) -> Self {
        let users = match auth_config.pepper.clone() {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper),
            None => SurrealUserRepository::new(db.clone()),
        };
        let members = SurrealMembershipRepository::new(db.clone());

        Self {
            auth: Arc::new(AuthService::new(users.clone(), members.clone(), auth_config)),
            chart: Arc::new(OrgChartService::new(
                SurrealPositionRepository::new(db.clone()),
                members,
                SurrealDepartmentRepository::new(db.clone()),
                SurrealPositionTitleRepository::new(db.clone()),
                chart_config,
            )),
            training: Arc::new(TrainingService::new(
                SurrealChannelRepository::new(db.clone()),
                SurrealCourseRepository::new(db.clone()),
            )),
            organizations: Arc::new(SurrealOrganizationRepository::new(db)),
            users: Arc::new(users),
        }
    }
}
