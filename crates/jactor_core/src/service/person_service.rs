//! Person use-case service.

use crate::model::person::Person;
use crate::model::persistent::{Persistable, RecordId};
use crate::repo::person_repo::PersonRepository;
use crate::repo::RepoResult;
use crate::service::persistence_handler::PersistenceHandler;
use log::debug;

pub struct PersonService<R: PersonRepository> {
    repo: R,
    handler: PersistenceHandler,
}

impl<R: PersonRepository> PersonService<R> {
    pub fn new(repo: R, handler: PersistenceHandler) -> Self {
        Self { repo, handler }
    }

    pub fn find(&self, id: RecordId) -> RepoResult<Option<Person>> {
        self.repo.fetch_by_id(id)
    }

    /// Returns the stored person when `person` carries the id of an existing
    /// row, otherwise inserts it as a new person.
    ///
    /// # Contract
    /// - An id with no stored row is dropped and a fresh row is inserted.
    pub fn create_when_not_exists(&self, person: Person) -> RepoResult<Person> {
        self.create_when_not_exists_as(&self.handler, person)
    }

    pub(crate) fn create_when_not_exists_as(
        &self,
        handler: &PersistenceHandler,
        person: Person,
    ) -> RepoResult<Person> {
        let Some(id) = person.id() else {
            return handler.save(&self.repo, person);
        };

        if let Some(existing) = self.repo.fetch_by_id(id)? {
            return Ok(existing);
        }

        debug!("event=person_recreate module=service status=ok stale_id={id}");
        handler.save(&self.repo, person.copy_without_id())
    }
}
