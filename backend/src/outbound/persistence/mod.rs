//! Storage adapters implementing the domain persistence ports.
//!
//! # Architecture
//!
//! - **Thin adapters**: stores only translate between stored rows and domain
//!   records. Pipeline rules (authorization, validation, tokens) live in the
//!   domain services.
//! - **Internal rows**: the stored representation never leaks past the
//!   adapter; callers see `Record<E>` and `RecordSummary` only.
//! - **Strongly typed errors**: faults surface as the port error enums and
//!   become `StorageFailure` at the service boundary.

mod in_memory_store;

pub use in_memory_store::InMemoryStore;
