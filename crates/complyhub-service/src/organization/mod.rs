//! Organization services.

pub mod service;

pub use service::{
    AddExistingMemberRequest, AddMemberRequest, AddNewMemberRequest, CreateOrganizationRequest,
    NewMember, OrganizationService,
};
