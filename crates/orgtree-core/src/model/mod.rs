pub mod category;
pub mod interval;
pub mod organization;

pub use category::Category;
pub use interval::Interval;
pub use organization::{NewOrganization, Organization, OrganizationKind, OrganizationPatch};
