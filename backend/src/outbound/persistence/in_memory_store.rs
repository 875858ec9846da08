//! Process-local store implementing every storage port.
//!
//! Rows are grouped per [`EntityKind`] and keep their payload as a JSON
//! document next to a typed header, so one store serves every entity type.
//! All state sits behind a single `RwLock`; each port call takes it once, so
//! a write is applied completely or not at all.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{
    Link, LinkRepository, LinkRepositoryError, NewRecord, RecordSummary, ReferenceLookup,
    ReferenceLookupError, ResourceRepository, ResourceRepositoryError, taken_unique_key,
};
use crate::domain::{
    ConcurrencyToken, EntityKind, Record, RecordId, RelationKind, Resource, UserId,
};

/// Stored row: typed header plus the encoded payload.
type Row = Record<Value>;

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<RecordId, Row>,
}

impl Table {
    fn next_id(&mut self) -> Result<RecordId, ResourceRepositoryError> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| ResourceRepositoryError::query("identifier sequence exhausted"))?;
        let id = RecordId::new(next)
            .map_err(|error| ResourceRepositoryError::query(error.to_string()))?;
        self.last_id = next;
        Ok(id)
    }

    /// Fail when another row in `owner`'s scope holds the unique key of
    /// `fields`. Rows are decoded only for entities that have a key.
    fn ensure_unique<E: Resource>(
        &self,
        fields: &E,
        owner: Option<&UserId>,
        except: Option<RecordId>,
    ) -> Result<(), ResourceRepositoryError> {
        if fields.unique_key().is_none() {
            return Ok(());
        }
        let existing = self
            .rows
            .values()
            .map(decode::<E>)
            .collect::<Result<Vec<_>, _>>()?;
        match taken_unique_key(&existing, fields, owner, except) {
            Some(key) => Err(ResourceRepositoryError::duplicate_key(key)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<EntityKind, Table>,
    links: BTreeSet<Link>,
}

impl State {
    fn table(&self, kind: EntityKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut Table {
        self.tables.entry(kind).or_default()
    }

    /// Drop every link with `kind`/`id` on either side.
    fn unlink(&mut self, kind: EntityKind, id: RecordId) -> usize {
        let before = self.links.len();
        self.links.retain(|link| {
            let left = link.relation.left() == kind && link.left == id;
            let right = link.relation.right() == kind && link.right == id;
            !(left || right)
        });
        before - self.links.len()
    }
}

/// Storage adapter holding every record and link in memory.
///
/// # Examples
/// ```
/// use backend::domain::ports::{Link, LinkRepository};
/// use backend::domain::{RecordId, RelationKind};
/// use backend::outbound::persistence::InMemoryStore;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryStore::new();
/// let link = Link {
///     relation: RelationKind::EquipmentGroupMembership,
///     left: RecordId::new(1).unwrap(),
///     right: RecordId::new(2).unwrap(),
/// };
/// assert_eq!(store.attach(&link).await.unwrap(), 1);
/// assert!(store.exists(&link).await.unwrap());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Empty store; every entity sequence starts at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn encode<E: Resource>(fields: &E) -> Result<Value, ResourceRepositoryError> {
    serde_json::to_value(fields).map_err(|error| {
        ResourceRepositoryError::serialization(format!("encode {}: {error}", E::KIND))
    })
}

fn decode<E: Resource>(row: &Row) -> Result<Record<E>, ResourceRepositoryError> {
    let fields = serde_json::from_value(row.fields.clone()).map_err(|error| {
        ResourceRepositoryError::serialization(format!("decode {} {}: {error}", E::KIND, row.id))
    })?;
    Ok(Record {
        id: row.id,
        concurrency_token: row.concurrency_token.clone(),
        created_at: row.created_at,
        updated_at: row.updated_at,
        owner_id: row.owner_id.clone(),
        fields,
    })
}

#[async_trait]
impl<E: Resource> ResourceRepository<E> for InMemoryStore {
    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record<E>>, ResourceRepositoryError> {
        let state = self.state.read().await;
        state
            .table(E::KIND)
            .and_then(|table| table.rows.get(&id))
            .map(decode::<E>)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Record<E>>, ResourceRepositoryError> {
        let state = self.state.read().await;
        state
            .table(E::KIND)
            .map_or_else(Vec::new, |table| table.rows.values().collect())
            .into_iter()
            .map(decode::<E>)
            .collect()
    }

    async fn insert(&self, record: NewRecord<E>) -> Result<RecordId, ResourceRepositoryError> {
        let fields = encode(&record.fields)?;
        let mut state = self.state.write().await;
        let table = state.table_mut(E::KIND);
        table.ensure_unique(&record.fields, record.owner_id.as_ref(), None)?;
        let id = table.next_id()?;
        let row = NewRecord {
            concurrency_token: record.concurrency_token,
            created_at: record.created_at,
            owner_id: record.owner_id,
            fields,
        }
        .with_id(id);
        table.rows.insert(id, row);
        debug!(entity = E::KIND.name(), id = %id, "row inserted");
        Ok(id)
    }

    async fn replace(
        &self,
        record: &Record<E>,
        expected: &ConcurrencyToken,
    ) -> Result<u64, ResourceRepositoryError> {
        let fields = encode(&record.fields)?;
        let mut state = self.state.write().await;
        let table = state.table_mut(E::KIND);
        let owner = match table.rows.get(&record.id) {
            Some(row) if &row.concurrency_token == expected => row.owner_id.clone(),
            _ => return Ok(0),
        };
        table.ensure_unique(&record.fields, owner.as_ref(), Some(record.id))?;
        let Some(row) = table.rows.get_mut(&record.id) else {
            return Ok(0);
        };
        row.concurrency_token = record.concurrency_token.clone();
        row.updated_at = record.updated_at;
        row.fields = fields;
        Ok(1)
    }

    async fn delete(&self, id: RecordId) -> Result<u64, ResourceRepositoryError> {
        let mut state = self.state.write().await;
        if state.table_mut(E::KIND).rows.remove(&id).is_none() {
            return Ok(0);
        }
        let unlinked = state.unlink(E::KIND, id);
        debug!(entity = E::KIND.name(), id = %id, unlinked, "row deleted");
        Ok(1)
    }
}

#[async_trait]
impl ReferenceLookup for InMemoryStore {
    async fn find(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> Result<Option<RecordSummary>, ReferenceLookupError> {
        let state = self.state.read().await;
        Ok(state
            .table(kind)
            .and_then(|table| table.rows.get(&id))
            .map(|row| RecordSummary {
                kind,
                id,
                owner_id: row.owner_id.clone(),
            }))
    }
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn exists(&self, link: &Link) -> Result<bool, LinkRepositoryError> {
        Ok(self.state.read().await.links.contains(link))
    }

    async fn attach(&self, link: &Link) -> Result<u64, LinkRepositoryError> {
        let inserted = self.state.write().await.links.insert(*link);
        Ok(u64::from(inserted))
    }

    async fn detach(&self, link: &Link) -> Result<u64, LinkRepositoryError> {
        let removed = self.state.write().await.links.remove(link);
        Ok(u64::from(removed))
    }

    async fn linked(
        &self,
        relation: RelationKind,
        left: RecordId,
    ) -> Result<Vec<RecordId>, LinkRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .links
            .iter()
            .filter(|link| link.relation == relation && link.left == left)
            .map(|link| link.right)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Adapter-level behaviour; pipeline rules are covered by the services.

    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{Equipment, EquipmentGroup, UserExercise, WorkoutSession};

    fn new_record<E>(fields: E) -> NewRecord<E> {
        NewRecord {
            concurrency_token: ConcurrencyToken::generate(),
            created_at: Utc
                .with_ymd_and_hms(2024, 3, 1, 8, 0, 0)
                .single()
                .expect("valid timestamp"),
            owner_id: None,
            fields,
        }
    }

    fn id(raw: i64) -> RecordId {
        RecordId::new(raw).expect("positive id")
    }

    #[fixture]
    fn store() -> InMemoryStore {
        InMemoryStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn sequences_are_per_entity(store: InMemoryStore) {
        let first = store
            .insert(new_record(EquipmentGroup::named("Home Gym")))
            .await
            .expect("insert group");
        let second = store
            .insert(new_record(EquipmentGroup::named("Garage")))
            .await
            .expect("insert group");
        let equipment = store
            .insert(new_record(Equipment::named("Barbell")))
            .await
            .expect("insert equipment");

        assert_eq!((first, second, equipment), (id(1), id(2), id(1)));
    }

    #[rstest]
    #[tokio::test]
    async fn stored_fields_decode_back(store: InMemoryStore) {
        let new = new_record(EquipmentGroup::named("Home Gym"));
        let inserted = store.insert(new.clone()).await.expect("insert");

        let found: Record<EquipmentGroup> = store
            .find_by_id(inserted)
            .await
            .expect("read")
            .expect("row present");

        assert_eq!(found, new.with_id(inserted));
    }

    #[rstest]
    #[tokio::test]
    async fn replace_requires_the_expected_token(store: InMemoryStore) {
        let inserted = store
            .insert(new_record(EquipmentGroup::named("Home Gym")))
            .await
            .expect("insert");
        let mut current: Record<EquipmentGroup> = store
            .find_by_id(inserted)
            .await
            .expect("read")
            .expect("row present");
        let expected = current.concurrency_token.clone();
        current.fields = EquipmentGroup::named("Garage");
        current.concurrency_token = ConcurrencyToken::generate();

        let stale = store
            .replace(&current, &ConcurrencyToken::generate())
            .await
            .expect("stale replace");
        let fresh = store.replace(&current, &expected).await.expect("replace");
        let again = store.replace(&current, &expected).await.expect("replay");

        assert_eq!((stale, fresh, again), (0, 1, 0));
    }

    #[rstest]
    #[tokio::test]
    async fn unique_keys_are_checked_inside_the_write(store: InMemoryStore) {
        let home = store
            .insert(new_record(EquipmentGroup::named("Home Gym")))
            .await
            .expect("insert home gym");
        let garage = store
            .insert(new_record(EquipmentGroup::named("Garage")))
            .await
            .expect("insert garage");

        let duplicate = store
            .insert(new_record(EquipmentGroup::named("HOME GYM")))
            .await
            .expect_err("duplicate insert");
        assert!(matches!(duplicate, ResourceRepositoryError::DuplicateKey { .. }));

        let mut renamed: Record<EquipmentGroup> = store
            .find_by_id(garage)
            .await
            .expect("read")
            .expect("row present");
        let expected = renamed.concurrency_token.clone();
        renamed.fields = EquipmentGroup::named("Home Gym");
        renamed.concurrency_token = ConcurrencyToken::generate();
        let clash = store
            .replace(&renamed, &expected)
            .await
            .expect_err("rename onto a taken name");
        assert!(matches!(clash, ResourceRepositoryError::DuplicateKey { .. }));

        let mut kept: Record<EquipmentGroup> = store
            .find_by_id(home)
            .await
            .expect("read")
            .expect("row present");
        let kept_token = kept.concurrency_token.clone();
        kept.concurrency_token = ConcurrencyToken::generate();
        assert_eq!(store.replace(&kept, &kept_token).await.expect("keep own name"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn owner_scoped_keys_are_unique_per_owner(store: InMemoryStore) {
        let exercise = || UserExercise {
            name: "Goblet squat".to_owned(),
            exercise_type_id: id(1),
            notes: None,
        };
        let insert_for = |owner: UserId| NewRecord {
            owner_id: Some(owner),
            ..new_record(exercise())
        };
        let athlete = UserId::random();

        store
            .insert(insert_for(athlete.clone()))
            .await
            .expect("first owner");
        store
            .insert(insert_for(UserId::random()))
            .await
            .expect("second owner");
        let clash = store
            .insert(insert_for(athlete))
            .await
            .expect_err("same owner twice");

        assert!(matches!(clash, ResourceRepositoryError::DuplicateKey { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_cascades_to_links(store: InMemoryStore) {
        let group = store
            .insert(new_record(EquipmentGroup::named("Home Gym")))
            .await
            .expect("insert group");
        let equipment = store
            .insert(new_record(Equipment::named("Barbell")))
            .await
            .expect("insert equipment");
        let link = Link {
            relation: RelationKind::EquipmentGroupMembership,
            left: group,
            right: equipment,
        };
        store.attach(&link).await.expect("attach");

        let rows = ResourceRepository::<Equipment>::delete(&store, equipment)
            .await
            .expect("delete");

        assert_eq!(rows, 1);
        assert!(!store.exists(&link).await.expect("exists"));
        assert_eq!(
            ResourceRepository::<Equipment>::delete(&store, equipment)
                .await
                .expect("second delete"),
            0
        );
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_reports_owner(store: InMemoryStore) {
        let owner = UserId::random();
        let session = WorkoutSession {
            title: "Leg day".to_owned(),
            performed_at: Utc::now(),
            duration_minutes: Some(45),
            notes: None,
        };
        let inserted = store
            .insert(NewRecord {
                owner_id: Some(owner.clone()),
                ..new_record(session)
            })
            .await
            .expect("insert session");

        let summary = store
            .find(EntityKind::WorkoutSession, inserted)
            .await
            .expect("lookup")
            .expect("present");
        let missing = store
            .find(EntityKind::UserExercise, inserted)
            .await
            .expect("lookup");

        assert_eq!(summary.owner_id, Some(owner));
        assert!(missing.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn links_attach_once_and_list_in_order(store: InMemoryStore) {
        let relation = RelationKind::ExerciseTypeMuscleGroup;
        for right in [3, 1, 2] {
            let link = Link {
                relation,
                left: id(9),
                right: id(right),
            };
            assert_eq!(store.attach(&link).await.expect("attach"), 1);
        }
        let repeat = Link {
            relation,
            left: id(9),
            right: id(1),
        };

        assert_eq!(store.attach(&repeat).await.expect("attach again"), 0);
        assert_eq!(
            store.linked(relation, id(9)).await.expect("linked"),
            vec![id(1), id(2), id(3)]
        );
        assert_eq!(store.detach(&repeat).await.expect("detach"), 1);
        assert_eq!(store.detach(&repeat).await.expect("detach again"), 0);
    }
}
