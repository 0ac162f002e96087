//! User use-case service.
//!
//! # Responsibility
//! - Register users together with their person and optional address.
//! - Expose username lookups.
//!
//! # Invariants
//! - Rows written by `create` are attributed to the new username.
//! - `create` writes its address, person and user in one transaction; a
//!   failed user insert leaves no address or person behind.
//! - `update` only accepts persisted users.

use crate::model::address::Address;
use crate::model::person::Person;
use crate::model::persistent::{Persistable, RecordId};
use crate::model::user::{CreateUser, User, UserType};
use crate::model::validation::require_text;
use crate::repo::address_repo::AddressRepository;
use crate::repo::person_repo::PersonRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::person_service::PersonService;
use crate::service::persistence_handler::PersistenceHandler;
use log::info;

pub struct UserService<U, P, A>
where
    U: UserRepository,
    P: PersonRepository,
    A: AddressRepository,
{
    users: U,
    people: PersonService<P>,
    addresses: A,
    handler: PersistenceHandler,
}

impl<U, P, A> UserService<U, P, A>
where
    U: UserRepository,
    P: PersonRepository,
    A: AddressRepository,
{
    pub fn new(users: U, people: P, addresses: A, handler: PersistenceHandler) -> Self {
        Self {
            users,
            people: PersonService::new(people, handler.clone()),
            addresses,
            handler,
        }
    }

    pub fn find(&self, id: RecordId) -> RepoResult<Option<User>> {
        self.users.fetch_by_id(id)
    }

    pub fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.users.find_by_username(username)
    }

    /// Creates a user, creating its person (and address) first when the
    /// command does not reference an existing person.
    ///
    /// # Contract
    /// - A `person_id` with no stored person is treated as absent.
    /// - An address is created only for a new person, when no `address_id`
    ///   is given and line 1, zip code and city are all present.
    /// - The new user is `Active`.
    /// - A blank username is rejected before anything is written.
    pub fn create(&self, command: CreateUser) -> RepoResult<User> {
        require_text(User::ENTITY, "username", &command.username)?;
        let handler = self.handler.with_actor(command.username.as_str());

        let (user, person) = self
            .users
            .atomically(|| self.create_rows(&handler, command))?;

        info!(
            "event=user_create module=service status=ok user_id={} person_id={}",
            user.id().map(|id| id.to_string()).unwrap_or_default(),
            person.id().map(|id| id.to_string()).unwrap_or_default()
        );
        Ok(user)
    }

    fn create_rows(
        &self,
        handler: &PersistenceHandler,
        command: CreateUser,
    ) -> RepoResult<(User, Person)> {
        let existing = match command.person_id {
            Some(person_id) => self.people.find(person_id)?,
            None => None,
        };
        let person = match existing {
            Some(person) => person,
            None => {
                let address_id = match (command.address_id, new_address(&command)) {
                    (Some(id), _) => Some(id),
                    (None, Some(address)) => handler.save(&self.addresses, address)?.id(),
                    (None, None) => None,
                };
                self.people
                    .create_when_not_exists_as(handler, new_person(&command, address_id))?
            }
        };

        let mut user = User::new(command.username, person.id());
        user.email_address = command.email_address;
        user.user_type = UserType::Active;
        let user = handler.save(&self.users, user)?;
        Ok((user, person))
    }

    /// Writes the mutable fields of a persisted user.
    pub fn update(&self, user: User) -> RepoResult<User> {
        if user.is_not_persisted() {
            return Err(RepoError::InvalidData(
                "user must have an id to be updated".to_string(),
            ));
        }
        self.handler.save(&self.users, user)
    }

    pub fn find_usernames(&self, user_type: UserType) -> RepoResult<Vec<String>> {
        self.users.find_usernames(&[user_type])
    }

    pub fn is_already_persisted(&self, username: &str) -> RepoResult<bool> {
        self.users.contains(username)
    }
}

fn new_person(command: &CreateUser, address_id: Option<RecordId>) -> Person {
    let mut person = Person::new(command.surname.as_str());
    person.address_id = address_id;
    person.locale = command.language.clone();
    person.first_name = command.first_name.clone();
    person.description = command.description.clone();
    person
}

fn new_address(command: &CreateUser) -> Option<Address> {
    let (Some(line1), Some(zip_code), Some(city)) = (
        command.address_line1.as_deref(),
        command.zip_code.as_deref(),
        command.city.as_deref(),
    ) else {
        return None;
    };

    let mut address = Address::new(line1, zip_code, city);
    address.address_line2 = command.address_line2.clone();
    address.address_line3 = command.address_line3.clone();
    address.country = command.country.clone();
    Some(address)
}
