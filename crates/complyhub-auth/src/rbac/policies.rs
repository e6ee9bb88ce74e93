//! Per-endpoint role requirements.

use complyhub_entity::role::{OrgRole, SiteRole, TeamRole};

use super::authorizer::RoleRequirement;

const STAFF: &[SiteRole] = &[SiteRole::SiteAdmin, SiteRole::SiteModerator];
const ADMIN: &[SiteRole] = &[SiteRole::SiteAdmin];
const ORG_ADMINS: &[OrgRole] = &[OrgRole::OrgOwner, OrgRole::OrgAdmin];
const ORG_ANY: &[OrgRole] = &[
    OrgRole::OrgOwner,
    OrgRole::OrgAdmin,
    OrgRole::TeamLeader,
    OrgRole::Employee,
];
const TEAM_ANY: &[TeamRole] = &[TeamRole::TeamLeader, TeamRole::Employee];
const TEAM_LEAD: &[TeamRole] = &[TeamRole::TeamLeader];

// Organizations
pub const ORG_LIST_ALL: RoleRequirement = RoleRequirement::site(STAFF);
pub const ORG_READ: RoleRequirement = RoleRequirement::new(STAFF, ORG_ANY, &[]);
pub const ORG_UPDATE: RoleRequirement = RoleRequirement::new(&[], ORG_ADMINS, &[]);
pub const ORG_DELETE: RoleRequirement = RoleRequirement::new(&[], &[OrgRole::OrgOwner], &[]);
pub const ORG_MEMBERS: RoleRequirement = RoleRequirement::new(&[], ORG_ADMINS, &[]);

// Teams
pub const TEAM_CREATE: RoleRequirement = RoleRequirement::new(STAFF, ORG_ADMINS, &[]);
pub const TEAM_READ: RoleRequirement = RoleRequirement::new(STAFF, ORG_ADMINS, TEAM_ANY);
pub const TEAM_MANAGE: RoleRequirement = RoleRequirement::new(STAFF, ORG_ADMINS, TEAM_LEAD);
pub const TEAM_DELETE: RoleRequirement = RoleRequirement::new(STAFF, ORG_ADMINS, &[]);
pub const TEAM_LEADERSHIP: RoleRequirement = RoleRequirement::new(STAFF, ORG_ADMINS, &[]);
pub const USER_TEAMS: RoleRequirement = RoleRequirement::site(STAFF);

// Compliance catalogue
pub const PROGRAM_READ: RoleRequirement = RoleRequirement::site(STAFF);
pub const PROGRAM_CREATE: RoleRequirement = RoleRequirement::site(STAFF);
pub const PROGRAM_WRITE: RoleRequirement = RoleRequirement::site(ADMIN);

// Folders and documents
pub const FOLDER_CREATE: RoleRequirement = RoleRequirement::new(
    &[],
    &[OrgRole::OrgOwner, OrgRole::OrgAdmin, OrgRole::TeamLeader],
    &[],
);
pub const FOLDER_LIST: RoleRequirement = RoleRequirement::new(&[], ORG_ANY, &[]);
pub const FOLDER_UPDATE: RoleRequirement = RoleRequirement::new(&[], ORG_ADMINS, TEAM_LEAD);
pub const FOLDER_DELETE: RoleRequirement = RoleRequirement::new(&[], ORG_ADMINS, &[]);
pub const DOCUMENT_LIST: RoleRequirement = RoleRequirement::new(&[], ORG_ANY, &[]);
pub const DOCUMENT_WRITE: RoleRequirement = RoleRequirement::new(&[], ORG_ADMINS, TEAM_LEAD);
pub const DOCUMENT_DELETE: RoleRequirement = RoleRequirement::new(&[], ORG_ADMINS, &[]);

// Templates
pub const TEMPLATE_WRITE: RoleRequirement = RoleRequirement::site(STAFF);

// Users
pub const USER_ADMIN: RoleRequirement = RoleRequirement::site(ADMIN);
