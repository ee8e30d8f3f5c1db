use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use natours_core::{Entity, RawError, DUPLICATE_KEY_CODE};

/// Storage abstraction for one document type.
pub trait Collection<D: Entity>: Send + Sync {
    /// Insert a new document. Fails with a duplicate-key error when a unique
    /// key is already taken.
    fn insert(&self, doc: D) -> Result<D, RawError>;

    fn find(&self, id: D::Id) -> Result<Option<D>, RawError>;

    /// All documents, oldest first.
    fn list(&self) -> Result<Vec<D>, RawError>;

    /// Replace an existing document. `Ok(None)` when no document has that id.
    fn replace(&self, doc: D) -> Result<Option<D>, RawError>;

    /// Remove a document, returning it. `Ok(None)` when no document has that id.
    fn remove(&self, id: D::Id) -> Result<Option<D>, RawError>;
}

impl<D, S> Collection<D> for Arc<S>
where
    D: Entity,
    S: Collection<D> + ?Sized,
{
    fn insert(&self, doc: D) -> Result<D, RawError> {
        (**self).insert(doc)
    }

    fn find(&self, id: D::Id) -> Result<Option<D>, RawError> {
        (**self).find(id)
    }

    fn list(&self) -> Result<Vec<D>, RawError> {
        (**self).list()
    }

    fn replace(&self, doc: D) -> Result<Option<D>, RawError> {
        (**self).replace(doc)
    }

    fn remove(&self, id: D::Id) -> Result<Option<D>, RawError> {
        (**self).remove(id)
    }
}

/// In-memory collection for dev/tests.
///
/// Ordered by id; with time-ordered ids this is insertion order.
#[derive(Debug)]
pub struct InMemoryCollection<D: Entity> {
    namespace: String,
    inner: RwLock<BTreeMap<D::Id, D>>,
}

impl<D: Entity> InMemoryCollection<D> {
    /// `namespace` is the `<database>.<collection>` name used in driver messages.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<D::Id, D>>, RawError> {
        self.inner.read().map_err(|_| self.poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<D::Id, D>>, RawError> {
        self.inner.write().map_err(|_| self.poisoned())
    }

    fn poisoned(&self) -> RawError {
        tracing::error!(namespace = %self.namespace, "collection lock poisoned");
        RawError::fault(format!("collection {} is unavailable", self.namespace))
    }

    /// First unique key of `doc` already held by a different document.
    fn check_unique(&self, map: &BTreeMap<D::Id, D>, doc: &D) -> Result<(), RawError> {
        for (field, value) in doc.unique_keys() {
            let taken = map.values().any(|other| {
                other.id() != doc.id()
                    && other
                        .unique_keys()
                        .iter()
                        .any(|(f, v)| *f == field && *v == value)
            });
            if taken {
                return Err(self.duplicate_key(field, &value));
            }
        }
        Ok(())
    }

    fn duplicate_key(&self, field: &str, value: &str) -> RawError {
        let quoted = serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""));
        RawError::store(
            DUPLICATE_KEY_CODE,
            format!(
                "E11000 duplicate key error collection: {} index: {field}_1 dup key: {{ {field}: {quoted} }}",
                self.namespace
            ),
        )
    }
}

impl<D> Collection<D> for InMemoryCollection<D>
where
    D: Entity + Clone + Send + Sync,
    D::Id: Send + Sync,
{
    fn insert(&self, doc: D) -> Result<D, RawError> {
        let mut map = self.write()?;
        if map.contains_key(&doc.id()) {
            return Err(self.duplicate_key("_id", &doc.id().to_string()));
        }
        self.check_unique(&map, &doc)?;
        map.insert(doc.id(), doc.clone());
        Ok(doc)
    }

    fn find(&self, id: D::Id) -> Result<Option<D>, RawError> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<D>, RawError> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn replace(&self, doc: D) -> Result<Option<D>, RawError> {
        let mut map = self.write()?;
        if !map.contains_key(&doc.id()) {
            return Ok(None);
        }
        self.check_unique(&map, &doc)?;
        map.insert(doc.id(), doc.clone());
        Ok(Some(doc))
    }

    fn remove(&self, id: D::Id) -> Result<Option<D>, RawError> {
        Ok(self.write()?.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use natours_core::{classify, TourId};
    use natours_tours::{Tour, TourInput};

    fn tour(name: &str) -> Tour {
        Tour::create(
            TourId::new(),
            TourInput {
                name: Some(name.to_string()),
                duration: Some(5),
                max_group_size: Some(25),
                difficulty: Some("easy".to_string()),
                price: Some(397.0),
                summary: Some("Breathtaking hike".to_string()),
                image_cover: Some("tour-1-cover.jpg".to_string()),
                ..TourInput::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn insert_find_list_remove() {
        let tours = InMemoryCollection::<Tour>::new("natours.tours");
        let a = tours.insert(tour("The Forest Hiker")).unwrap();
        let b = tours.insert(tour("The Sea Explorer")).unwrap();

        assert_eq!(tours.find(a.id).unwrap(), Some(a.clone()));
        let listed: Vec<_> = tours.list().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(listed, vec!["The Forest Hiker", "The Sea Explorer"]);

        assert_eq!(tours.remove(b.id).unwrap().map(|t| t.id), Some(b.id));
        assert_eq!(tours.remove(b.id).unwrap(), None);
        assert_eq!(tours.list().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_unique_key_is_a_driver_error() {
        let tours = InMemoryCollection::<Tour>::new("natours.tours");
        tours.insert(tour("The Forest Hiker")).unwrap();

        let err = tours.insert(tour("The Forest Hiker")).unwrap_err();
        match &err {
            RawError::Store { code, errmsg } => {
                assert_eq!(*code, DUPLICATE_KEY_CODE);
                assert_eq!(
                    errmsg,
                    r#"E11000 duplicate key error collection: natours.tours index: name_1 dup key: { name: "The Forest Hiker" }"#
                );
            }
            other => panic!("Expected Store error, got {other:?}"),
        }

        let op = classify(&err).unwrap();
        assert_eq!(
            op.message(),
            r#"Duplicate field value "The Forest Hiker". Try different value!"#
        );
    }

    #[test]
    fn replace_checks_uniqueness_against_other_documents_only() {
        let tours = InMemoryCollection::<Tour>::new("natours.tours");
        let a = tours.insert(tour("The Forest Hiker")).unwrap();
        tours.insert(tour("The Sea Explorer")).unwrap();

        let same_name = a.update(TourInput { price: Some(1.0), ..TourInput::default() }).unwrap();
        assert!(tours.replace(same_name).unwrap().is_some());

        let clash = a
            .update(TourInput {
                name: Some("The Sea Explorer".to_string()),
                ..TourInput::default()
            })
            .unwrap();
        assert!(matches!(tours.replace(clash), Err(RawError::Store { .. })));
    }

    #[test]
    fn replace_missing_document_is_none() {
        let tours = InMemoryCollection::<Tour>::new("natours.tours");
        assert_eq!(tours.replace(tour("The Forest Hiker")).unwrap(), None);
    }
}
