use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// The name cached on each of the user's expenses.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug)]
struct StoredUser {
    user: User,
    /// Creation order, used to list users deterministically.
    seq: u64,
}

#[derive(Debug, Default)]
pub struct UsersStore {
    users: HashMap<UserId, StoredUser>,
    next_seq: u64,
}

impl UsersStore {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Inserts a user under a freshly generated identifier.
    pub fn insert(&mut self, first_name: String, last_name: String) -> &User {
        let id = loop {
            let candidate = UserId::generate();
            if !self.users.contains_key(&candidate) {
                break candidate;
            }
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        &self
            .users
            .entry(id)
            .or_insert(StoredUser {
                user: User {
                    id,
                    first_name,
                    last_name,
                },
                seq,
            })
            .user
    }

    pub fn get(&self, id: UserId) -> Result<&User, Error> {
        self.users
            .get(&id)
            .map(|stored| &stored.user)
            .ok_or(Error::UserNotFound(id))
    }

    pub fn get_mut(&mut self, id: UserId) -> Result<&mut User, Error> {
        self.users
            .get_mut(&id)
            .map(|stored| &mut stored.user)
            .ok_or(Error::UserNotFound(id))
    }

    pub fn remove(&mut self, id: UserId) -> Result<User, Error> {
        self.users
            .remove(&id)
            .map(|stored| stored.user)
            .ok_or(Error::UserNotFound(id))
    }

    /// Iterates users in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        let mut stored: Vec<_> = self.users.values().collect();
        stored.sort_by_key(|s| s.seq);
        stored.into_iter().map(|s| &s.user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
