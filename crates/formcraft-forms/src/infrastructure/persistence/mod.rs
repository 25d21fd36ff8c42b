//! In-memory document store
//!
//! `forms` and `responses` collections held in `DashMap`s. Each document is
//! written whole, so concurrent writers to one document are last-write-wins.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::aggregates::{Form, ResponseRecord};
use crate::domain::value_objects::{FormId, OwnerId, ResponseId};
use crate::ports::outbound::{FormRepository, RepositoryError, ResponseRepository};

/// In-memory form collection
#[derive(Default)]
pub struct InMemoryFormRepository {
    forms: DashMap<FormId, Form>,
}

impl InMemoryFormRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn insert(&self, form: &Form) -> Result<(), RepositoryError> {
        match self.forms.entry(form.id().clone()) {
            Entry::Occupied(_) => Err(RepositoryError::DuplicateKey(form.id().to_string())),
            Entry::Vacant(slot) => {
                slot.insert(form.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &FormId) -> Result<Option<Form>, RepositoryError> {
        Ok(self.forms.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Form>, RepositoryError> {
        let mut forms: Vec<Form> = self
            .forms
            .iter()
            .filter(|entry| entry.is_owned_by(owner))
            .map(|entry| entry.value().clone())
            .collect();
        forms.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(forms)
    }

    async fn save(&self, form: &Form) -> Result<bool, RepositoryError> {
        match self.forms.get_mut(form.id()) {
            Some(mut stored) => {
                *stored = form.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &FormId) -> Result<bool, RepositoryError> {
        Ok(self.forms.remove(id).is_some())
    }
}

/// In-memory response collection
#[derive(Default)]
pub struct InMemoryResponseRepository {
    responses: DashMap<ResponseId, ResponseRecord>,
}

impl InMemoryResponseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseRepository for InMemoryResponseRepository {
    async fn insert(&self, response: &ResponseRecord) -> Result<(), RepositoryError> {
        match self.responses.entry(response.id().clone()) {
            Entry::Occupied(_) => Err(RepositoryError::DuplicateKey(response.id().to_string())),
            Entry::Vacant(slot) => {
                slot.insert(response.clone());
                Ok(())
            }
        }
    }

    async fn find_by_form(&self, form_id: &FormId) -> Result<Vec<ResponseRecord>, RepositoryError> {
        let mut responses: Vec<ResponseRecord> = self
            .responses
            .iter()
            .filter(|entry| entry.form_id() == form_id)
            .map(|entry| entry.value().clone())
            .collect();
        responses.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(responses)
    }

    async fn count_by_form(&self, form_id: &FormId) -> Result<u64, RepositoryError> {
        Ok(self
            .responses
            .iter()
            .filter(|entry| entry.form_id() == form_id)
            .count() as u64)
    }

    async fn delete_by_form(&self, form_id: &FormId) -> Result<u64, RepositoryError> {
        let mut removed = 0u64;
        self.responses.retain(|_, response| {
            let keep = response.form_id() != form_id;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
