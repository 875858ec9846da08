//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`ResourceRepository`, `ReferenceLookup`, `LinkRepository`)
//! are implemented by outbound adapters. Driving ports (`Handler`,
//! `LoginService`) are called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod handler;
mod link_repository;
mod login_service;
mod reference_lookup;
mod resource_repository;

pub use handler::{
    AttachLink, CreateResource, DeleteResource, DetachLink, GetResource, Handler, ListLinks,
    ListResources, RecordPage, RecordView, UpdateResource,
};
#[cfg(test)]
pub use link_repository::MockLinkRepository;
pub use link_repository::{Link, LinkRepository, LinkRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FIXTURE_ADMIN_ID, FIXTURE_ATHLETE_ID, FixtureLoginService, LoginService};
#[cfg(test)]
pub use reference_lookup::MockReferenceLookup;
pub use reference_lookup::{RecordSummary, ReferenceLookup, ReferenceLookupError};
pub use resource_repository::{
    NewRecord, ResourceRepository, ResourceRepositoryError, taken_unique_key,
};
