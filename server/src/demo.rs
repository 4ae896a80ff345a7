//! Demo resources served by the `jsonapi-demo` binary.
//!
//! Users own chocolates. `GET /users/:id/sweets` lists the chocolates whose
//! owner is that user and `GET /chocolates/:id/owner` finds the user holding
//! a chocolate.

use serde::{Deserialize, Serialize};

use crate::domain::{
    ApiError, ApiResult, EditToMany, LinkedFilter, Reference, ReferenceId, RegistrationError,
    Resource,
};
use crate::inbound::http::Api;
use crate::outbound::MemorySource;

/// A user holding chocolates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub username: String,
    /// Identifiers of owned chocolates.
    #[serde(default)]
    pub chocolate_ids: Vec<String>,
}

/// A chocolate with at most one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chocolate {
    /// Identifier.
    #[serde(default)]
    pub id: String,
    /// Product name.
    #[serde(default)]
    pub name: String,
    /// Taste description.
    #[serde(default)]
    pub taste: String,
    /// Identifier of the owning user.
    #[serde(default)]
    pub owner_id: Option<String>,
}

fn unknown_relation(name: &str) -> ApiError {
    ApiError::invalid_request(format!("There is no relation with the name {name}"))
}

impl Resource for User {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn set_id(&mut self, id: &str) -> ApiResult<()> {
        self.id = id.to_owned();
        Ok(())
    }

    fn hidden_fields() -> &'static [&'static str] {
        &["chocolate_ids"]
    }

    fn references() -> Vec<Reference> {
        vec![Reference::to_many("chocolates", "sweets")]
    }

    fn referenced_ids(&self) -> Vec<ReferenceId> {
        self.chocolate_ids
            .iter()
            .map(|id| ReferenceId::new("chocolates", "sweets", id.clone()))
            .collect()
    }

    fn set_to_many_ids(&mut self, name: &str, ids: Vec<String>) -> ApiResult<()> {
        if name != "sweets" {
            return Err(unknown_relation(name));
        }
        self.chocolate_ids = ids;
        Ok(())
    }

    fn to_many_editor(&mut self) -> Option<&mut dyn EditToMany> {
        Some(self)
    }
}

impl EditToMany for User {
    fn add_to_many_ids(&mut self, name: &str, ids: Vec<String>) -> ApiResult<()> {
        if name != "sweets" {
            return Err(unknown_relation(name));
        }
        for id in ids {
            if !self.chocolate_ids.contains(&id) {
                self.chocolate_ids.push(id);
            }
        }
        Ok(())
    }

    fn delete_to_many_ids(&mut self, name: &str, ids: Vec<String>) -> ApiResult<()> {
        if name != "sweets" {
            return Err(unknown_relation(name));
        }
        self.chocolate_ids.retain(|id| !ids.contains(id));
        Ok(())
    }
}

impl Resource for Chocolate {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn set_id(&mut self, id: &str) -> ApiResult<()> {
        self.id = id.to_owned();
        Ok(())
    }

    fn hidden_fields() -> &'static [&'static str] {
        &["owner_id"]
    }

    fn references() -> Vec<Reference> {
        vec![Reference::to_one("users", "owner")]
    }

    fn referenced_ids(&self) -> Vec<ReferenceId> {
        self.owner_id
            .iter()
            .map(|id| ReferenceId::new("users", "owner", id.clone()))
            .collect()
    }

    fn set_to_one_id(&mut self, name: &str, id: Option<String>) -> ApiResult<()> {
        if name != "owner" {
            return Err(unknown_relation(name));
        }
        self.owner_id = id;
        Ok(())
    }
}

fn chocolate(id: &str, name: &str, taste: &str, owner: &str) -> Chocolate {
    Chocolate {
        id: id.into(),
        name: name.into(),
        taste: taste.into(),
        owner_id: Some(owner.into()),
    }
}

/// Seed data: two users and three chocolates.
#[must_use]
pub fn seed() -> (Vec<User>, Vec<Chocolate>) {
    let users = vec![
        User {
            id: "1".into(),
            username: "marvin".into(),
            chocolate_ids: vec!["1".into(), "2".into()],
        },
        User {
            id: "2".into(),
            username: "trillian".into(),
            chocolate_ids: vec!["3".into()],
        },
    ];
    let chocolates = vec![
        chocolate("1", "Ritter Sport", "nutty", "1"),
        chocolate("2", "Milka", "creamy", "1"),
        chocolate("3", "Lindt", "dark", "2"),
    ];
    (users, chocolates)
}

fn owns_chocolate(user: &User, filter: &LinkedFilter) -> bool {
    filter.source_resource == "chocolates" && user.chocolate_ids.contains(&filter.source_id)
}

fn owned_by(chocolate: &Chocolate, filter: &LinkedFilter) -> bool {
    filter.source_resource == "users" && chocolate.owner_id.as_deref() == Some(filter.source_id.as_str())
}

/// Register the demo resources backed by seeded in-memory sources.
///
/// # Errors
/// Propagates registration failures.
pub fn register(api: &mut Api) -> Result<&mut Api, RegistrationError> {
    let (users, chocolates) = seed();
    api.add_resource(User::default(), MemorySource::with_objects(users).with_link_predicate(owns_chocolate))?
        .add_resource(
            Chocolate::default(),
            MemorySource::with_objects(chocolates).with_link_predicate(owned_by),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceDescriptor;
    use rstest::rstest;

    #[rstest]
    fn demo_types_register() {
        let user = ResourceDescriptor::reflect(&User::default()).expect("user registers");
        let chocolate = ResourceDescriptor::reflect(&Chocolate::default()).expect("chocolate registers");
        assert_eq!(user.name(), "users");
        assert!(user.edits_to_many());
        assert_eq!(chocolate.name(), "chocolates");
        assert_eq!(chocolate.attributes(), ["name", "taste"]);
    }

    #[rstest]
    fn seed_is_consistent() {
        let (users, chocolates) = seed();
        for chocolate in &chocolates {
            let owner = users
                .iter()
                .find(|user| Some(user.id.as_str()) == chocolate.owner_id.as_deref())
                .expect("owner seeded");
            assert!(owner.chocolate_ids.contains(&chocolate.id));
        }
    }

    #[rstest]
    fn adding_sweets_skips_duplicates() {
        let mut user = User::default();
        user.add_to_many_ids("sweets", vec!["1".into(), "1".into()]).expect("add");
        assert_eq!(user.chocolate_ids, ["1"]);
    }
}
