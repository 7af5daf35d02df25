use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use voucherdesk_core::Entity;

use super::RepositoryError;

/// Lock-guarded map of entities keyed by their identifier.
///
/// Writers are serialized and readers see a consistent map. Values handed out
/// are clones; callers mutate their own copy and write it back.
#[derive(Debug)]
pub struct MemoryTable<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> MemoryTable<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<E::Id, E>>, RepositoryError> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::storage("lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<E::Id, E>>, RepositoryError> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::storage("lock poisoned"))
    }
}

impl<E: Entity> Default for MemoryTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> MemoryTable<E>
where
    E: Entity + Clone,
{
    pub fn get(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        Ok(self.read()?.get(id).cloned())
    }

    pub fn find_first(&self, pred: impl Fn(&E) -> bool) -> Result<Option<E>, RepositoryError> {
        Ok(self.read()?.values().find(|e| pred(e)).cloned())
    }

    pub fn list(&self) -> Result<Vec<E>, RepositoryError> {
        Ok(self.read()?.values().cloned().collect())
    }

    pub fn filter(&self, pred: impl Fn(&E) -> bool) -> Result<Vec<E>, RepositoryError> {
        Ok(self.read()?.values().filter(|e| pred(e)).cloned().collect())
    }

    /// Give `entity` an id if it has none (via `assign`), then store it.
    ///
    /// The whole step runs under one write lock, together with `reject`, which
    /// can veto the insert by inspecting the current contents (unique keys).
    pub fn insert_new(
        &self,
        mut entity: E,
        assign: impl FnOnce(&mut E) -> E::Id,
        reject: impl Fn(&E, &E) -> Option<String>,
    ) -> Result<E, RepositoryError> {
        let mut map = self.write()?;

        let id = assign(&mut entity);
        if map.contains_key(&id) {
            return Err(RepositoryError::Conflict(format!("id {id:?} already exists")));
        }
        if let Some(reason) = map.values().find_map(|existing| reject(existing, &entity)) {
            return Err(RepositoryError::Conflict(reason));
        }

        map.insert(id, entity.clone());
        Ok(entity)
    }

    /// Overwrite the stored entity with the same id.
    ///
    /// `reject` sees the stored entity and the replacement under the write
    /// lock; returning a reason leaves the stored entity untouched.
    pub fn replace(
        &self,
        entity: &E,
        reject: impl Fn(&E, &E) -> Option<String>,
    ) -> Result<(), RepositoryError> {
        let id = entity.id().ok_or(RepositoryError::MissingId)?;
        let mut map = self.write()?;

        match map.get_mut(&id) {
            Some(slot) => {
                if let Some(reason) = reject(slot, entity) {
                    return Err(RepositoryError::Conflict(reason));
                }
                *slot = entity.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("{id:?}"))),
        }
    }

    pub fn remove(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        Ok(self.write()?.remove(id))
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.len())
    }
}
