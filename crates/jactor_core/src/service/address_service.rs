//! Address use-case service.

use crate::model::address::Address;
use crate::model::persistent::RecordId;
use crate::repo::address_repo::AddressRepository;
use crate::repo::RepoResult;
use crate::service::persistence_handler::PersistenceHandler;

pub struct AddressService<R: AddressRepository> {
    repo: R,
    handler: PersistenceHandler,
}

impl<R: AddressRepository> AddressService<R> {
    pub fn new(repo: R, handler: PersistenceHandler) -> Self {
        Self { repo, handler }
    }

    pub fn find(&self, id: RecordId) -> RepoResult<Option<Address>> {
        self.repo.fetch_by_id(id)
    }

    pub fn find_by_zip_code(&self, zip_code: &str) -> RepoResult<Vec<Address>> {
        self.repo.find_by_zip_code(zip_code)
    }

    /// Inserts a new address or updates a persisted one.
    pub fn save(&self, address: Address) -> RepoResult<Address> {
        self.handler.save(&self.repo, address)
    }
}
