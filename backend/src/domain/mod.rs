//! Domain primitives, entities and the request pipeline.
//!
//! Purpose: Define strongly typed entities and the services that run every
//! command and query through the same pipeline: authorization, existence,
//! validation, business rules and a single guarded write. Keep types
//! immutable and document serialisation contracts (serde) in each type's
//! Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode / FieldErrors: the closed failure taxonomy.
//! - Outcome: result alias every handler returns.
//! - Record / RecordId / ConcurrencyToken: stored rows and their versions.
//! - Resource / EntityKind / RelationKind: entity metadata.
//! - Payload: entity fields, typed or still-encoded, awaiting validation.
//! - ResourceService / RelationshipService: handler implementations.

pub mod auth;
pub mod catalogue;
pub mod concurrency;
pub mod context;
pub mod credentials;
pub mod error;
pub mod payload;
pub mod ports;
pub mod record;
pub mod relationship_service;
pub mod resource;
pub mod resource_service;
pub mod trace_id;
pub mod training;
pub mod user;
pub mod validation;

pub use self::auth::{AccessPolicy, Principal, RequiredRole, authorize, require_principal};
pub use self::catalogue::{BodyRegion, Equipment, EquipmentGroup, ExerciseType, MuscleGroup};
pub use self::concurrency::{ConcurrencyToken, ConcurrencyTokenError};
pub use self::context::{Cancellation, RequestContext};
pub use self::credentials::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, FieldErrors};
pub use self::payload::Payload;
pub use self::record::{Record, RecordId, RecordIdError};
pub use self::relationship_service::RelationshipService;
pub use self::resource::{
    EntityKind, Reference, RelationKind, RelationKindError, Resource,
};
pub use self::resource_service::ResourceService;
pub use self::trace_id::TraceId;
pub use self::training::{MAX_DURATION_MINUTES, UserExercise, WorkoutSession};
pub use self::user::{UserId, UserValidationError};

/// HTTP header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Result every command and query handler returns.
///
/// # Examples
/// ```
/// use backend::domain::{Error, Outcome};
///
/// fn lookup(found: bool) -> Outcome<u32> {
///     if found { Ok(7) } else { Err(Error::not_found_entity("Equipment")) }
/// }
///
/// assert_eq!(lookup(true).ok(), Some(7));
/// assert_eq!(lookup(false).err().map(|e| e.status_hint()), Some(404));
/// ```
pub type Outcome<T> = Result<T, Error>;
