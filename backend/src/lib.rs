//! Workout tracker backend library.
//!
//! The domain owns the command and query pipeline; inbound adapters expose
//! it over HTTP and outbound adapters store records.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
