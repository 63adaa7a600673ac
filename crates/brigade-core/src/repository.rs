//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Organization-scoped
//! repositories take an `organization_id` parameter to enforce data
//! isolation between venues.

use uuid::Uuid;

use crate::error::BrigadeResult;
use crate::models::{
    channel::{Channel, CreateChannel, Subscription},
    course::{Course, CourseCompletion, CreateCourse, CreateCourseCompletion},
    department::{CreateDepartment, Department},
    membership::{CreateMembership, Member, MemberRole, Membership},
    organization::{CreateOrganization, Organization},
    position::{CreatePosition, Position, PositionPermissions, PositionTitle},
    user::{CreateUser, User},
};

// ---------------------------------------------------------------------------
// Organizations, users and memberships
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    /// Create the organization and its owner's membership together.
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = BrigadeResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = BrigadeResult<Organization>> + Send;
    /// Organizations the user is a member of.
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<Organization>>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = BrigadeResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = BrigadeResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = BrigadeResult<User>> + Send;
}

pub trait MembershipRepository: Send + Sync {
    fn add(&self, input: CreateMembership)
    -> impl Future<Output = BrigadeResult<Membership>> + Send;
    fn get(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Membership>> + Send;
    fn update_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> impl Future<Output = BrigadeResult<Membership>> + Send;
    /// Remove a membership and vacate any position the user occupies
    /// in that organization.
    fn remove(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<()>> + Send;
    /// All members of an organization, profile joined with membership.
    fn list_members(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<Member>>> + Send;
}

// ---------------------------------------------------------------------------
// Org chart
// ---------------------------------------------------------------------------

pub trait DepartmentRepository: Send + Sync {
    /// Create a department whose id is `slug`.
    fn create(
        &self,
        slug: &str,
        input: CreateDepartment,
    ) -> impl Future<Output = BrigadeResult<Department>> + Send;
    fn get(
        &self,
        organization_id: Uuid,
        slug: &str,
    ) -> impl Future<Output = BrigadeResult<Department>> + Send;
    /// Removes only the definition; positions keep their reference.
    fn delete(
        &self,
        organization_id: Uuid,
        slug: &str,
    ) -> impl Future<Output = BrigadeResult<()>> + Send;
    fn list(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<Department>>> + Send;
}

pub trait PositionTitleRepository: Send + Sync {
    fn add(
        &self,
        organization_id: Uuid,
        title: &str,
    ) -> impl Future<Output = BrigadeResult<PositionTitle>> + Send;
    fn remove(
        &self,
        organization_id: Uuid,
        title: &str,
    ) -> impl Future<Output = BrigadeResult<()>> + Send;
    fn list(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<PositionTitle>>> + Send;
}

pub trait PositionRepository: Send + Sync {
    fn create(&self, input: CreatePosition)
    -> impl Future<Output = BrigadeResult<Position>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Position>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<Position>>> + Send;
    /// Number of positions whose `parent_id` is `id`.
    fn count_children(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BrigadeResult<u64>> + Send;
    /// Delete a childless position. Fails with a validation error if a
    /// child exists at write time.
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BrigadeResult<()>> + Send;
    /// Replace the full permission flag set.
    fn update_permissions(
        &self,
        organization_id: Uuid,
        id: Uuid,
        permissions: PositionPermissions,
    ) -> impl Future<Output = BrigadeResult<Position>> + Send;
    fn set_open(
        &self,
        organization_id: Uuid,
        id: Uuid,
        is_open: bool,
    ) -> impl Future<Output = BrigadeResult<Position>> + Send;
    /// Make `user_id` the occupant of `position_id` in one transaction:
    /// any other position the user holds is vacated, the previous
    /// occupant's membership is cleared, and the user's membership is
    /// pointed at the new position.
    fn assign_occupant(
        &self,
        organization_id: Uuid,
        position_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<()>> + Send;
    /// Vacate a position and clear its occupant's membership reference.
    /// Succeeds without change on a vacant position.
    fn clear_occupant(
        &self,
        organization_id: Uuid,
        position_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Channels & training
// ---------------------------------------------------------------------------

pub trait ChannelRepository: Send + Sync {
    fn create(&self, input: CreateChannel) -> impl Future<Output = BrigadeResult<Channel>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Channel>> + Send;
    /// Delete a channel together with its subscriptions and courses.
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BrigadeResult<()>> + Send;
    fn list(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<Channel>>> + Send;
    /// Idempotent: subscribing twice returns the existing subscription.
    fn subscribe(
        &self,
        organization_id: Uuid,
        channel_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Subscription>> + Send;
    fn unsubscribe(
        &self,
        organization_id: Uuid,
        channel_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<()>> + Send;
    /// Channels the user is subscribed to.
    fn list_subscribed(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<Channel>>> + Send;
}

pub trait CourseRepository: Send + Sync {
    fn create(&self, input: CreateCourse) -> impl Future<Output = BrigadeResult<Course>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Course>> + Send;
    fn list_by_channel(
        &self,
        organization_id: Uuid,
        channel_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<Course>>> + Send;
    fn list(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<Course>>> + Send;
    fn record_completion(
        &self,
        input: CreateCourseCompletion,
    ) -> impl Future<Output = BrigadeResult<CourseCompletion>> + Send;
    fn list_completions(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = BrigadeResult<Vec<CourseCompletion>>> + Send;
}
