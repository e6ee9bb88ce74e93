//! Team services.

pub mod service;

pub use service::{
    AssignMembersRequest, BulkResult, CreateTeamRequest, MemberAssignment, RemoveMembersRequest,
    TeamService, TransferLeadershipRequest,
};
