//! Organization domain entities.

pub mod billing;
pub mod member;
pub mod model;

pub use billing::{BillingInfo, PaymentMethod, PaymentStatus};
pub use member::{OrganizationMember, OrganizationMemberView};
pub use model::{
    CreateOrganization, Organization, OrganizationSettings, OrganizationStatus,
    UpdateOrganization,
};
