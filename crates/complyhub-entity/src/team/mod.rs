//! Team domain entities.

pub mod member;
pub mod model;

pub use member::{TeamMember, TeamMemberView, TeamMembership};
pub use model::{CreateTeam, Team, TeamDetails, UpdateTeam};
