//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use actix_web::{Scope, web};
use mockable::Clock;
use pagination::PageLimits;

use crate::domain::ports::{LinkRepository, LoginService, ReferenceLookup, ResourceRepository};
use crate::domain::{
    Equipment, EquipmentGroup, ExerciseType, MuscleGroup, RelationshipService, Resource,
    ResourceService, UserExercise, WorkoutSession,
};
use crate::inbound::http::relations::{RelationEndpoints, relation_scope};
use crate::inbound::http::resources::{ResourceEndpoints, resource_scope};
use crate::inbound::http::users;

/// Dependency bundle for the session handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential check behind `POST /login`.
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    /// Construct state from the login port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::FixtureLoginService;
    /// use backend::inbound::http::state::HttpState;
    ///
    /// let _state = HttpState::new(Arc::new(FixtureLoginService));
    /// ```
    pub fn new(login: Arc<dyn LoginService>) -> Self {
        Self { login }
    }
}

/// Every entity and relation endpoint the API mounts.
#[derive(Clone)]
pub struct ApiEndpoints {
    /// `/equipment-groups`.
    pub equipment_groups: ResourceEndpoints<EquipmentGroup>,
    /// `/equipment`.
    pub equipment: ResourceEndpoints<Equipment>,
    /// `/muscle-groups`.
    pub muscle_groups: ResourceEndpoints<MuscleGroup>,
    /// `/exercise-types`.
    pub exercise_types: ResourceEndpoints<ExerciseType>,
    /// `/user-exercises`.
    pub user_exercises: ResourceEndpoints<UserExercise>,
    /// `/workout-sessions`.
    pub workout_sessions: ResourceEndpoints<WorkoutSession>,
    /// `/relations`.
    pub relations: RelationEndpoints,
}

impl ApiEndpoints {
    /// Wire every endpoint to services over one store.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::inbound::http::state::ApiEndpoints;
    /// use backend::outbound::persistence::InMemoryStore;
    /// use mockable::DefaultClock;
    ///
    /// let _endpoints = ApiEndpoints::from_store(Arc::new(InMemoryStore::new()), Arc::new(DefaultClock));
    /// ```
    pub fn from_store<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: ResourceRepository<EquipmentGroup>
            + ResourceRepository<Equipment>
            + ResourceRepository<MuscleGroup>
            + ResourceRepository<ExerciseType>
            + ResourceRepository<UserExercise>
            + ResourceRepository<WorkoutSession>
            + ReferenceLookup
            + LinkRepository
            + 'static,
    {
        Self {
            equipment_groups: resource_endpoints(&store, &clock),
            equipment: resource_endpoints(&store, &clock),
            muscle_groups: resource_endpoints(&store, &clock),
            exercise_types: resource_endpoints(&store, &clock),
            user_exercises: resource_endpoints(&store, &clock),
            workout_sessions: resource_endpoints(&store, &clock),
            relations: RelationEndpoints::from_service(RelationshipService::new(
                Arc::clone(&store),
                store,
            )),
        }
    }
}

fn resource_endpoints<E, S>(store: &Arc<S>, clock: &Arc<dyn Clock>) -> ResourceEndpoints<E>
where
    E: Resource,
    S: ResourceRepository<E> + ReferenceLookup + 'static,
{
    ResourceEndpoints::from_service(ResourceService::<E, S, S>::new(
        Arc::clone(store),
        Arc::clone(store),
        Arc::clone(clock),
    ))
}

/// Build the `/api/v1` scope.
///
/// Session middleware is applied by the caller so tests can supply their own.
pub fn api_scope(
    state: web::Data<HttpState>,
    limits: PageLimits,
    endpoints: ApiEndpoints,
) -> Scope {
    let ApiEndpoints {
        equipment_groups,
        equipment,
        muscle_groups,
        exercise_types,
        user_exercises,
        workout_sessions,
        relations,
    } = endpoints;

    web::scope("/api/v1")
        .app_data(state)
        .app_data(web::Data::new(limits))
        .service(users::login)
        .service(users::logout)
        .service(resource_scope(equipment_groups))
        .service(resource_scope(equipment))
        .service(resource_scope(muscle_groups))
        .service(resource_scope(exercise_types))
        .service(resource_scope(user_exercises))
        .service(resource_scope(workout_sessions))
        .service(relation_scope(relations))
}
