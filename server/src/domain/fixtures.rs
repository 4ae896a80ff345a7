//! Resource types shared by unit tests.

use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, EditToMany, Reference, ReferenceId, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub comment_ids: Vec<String>,
}

impl Post {
    pub fn sample() -> Self {
        Self {
            id: "1".into(),
            title: "Hello".into(),
            body: "First post".into(),
            author_id: Some("7".into()),
            comment_ids: vec!["10".into(), "11".into()],
        }
    }
}

impl Resource for Post {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn set_id(&mut self, id: &str) -> ApiResult<()> {
        self.id = id.to_owned();
        Ok(())
    }

    fn hidden_fields() -> &'static [&'static str] {
        &["author_id", "comment_ids"]
    }

    fn references() -> Vec<Reference> {
        vec![
            Reference::new("people", "author"),
            Reference::new("comments", "comments"),
        ]
    }

    fn referenced_ids(&self) -> Vec<ReferenceId> {
        let author = self
            .author_id
            .iter()
            .map(|id| ReferenceId::new("people", "author", id.clone()));
        let comments = self
            .comment_ids
            .iter()
            .map(|id| ReferenceId::new("comments", "comments", id.clone()));
        author.chain(comments).collect()
    }

    fn set_to_one_id(&mut self, name: &str, id: Option<String>) -> ApiResult<()> {
        match name {
            "author" => {
                self.author_id = id;
                Ok(())
            }
            other => Err(ApiError::invalid_request(format!("unknown relation {other}"))),
        }
    }

    fn set_to_many_ids(&mut self, name: &str, ids: Vec<String>) -> ApiResult<()> {
        match name {
            "comments" => {
                self.comment_ids = ids;
                Ok(())
            }
            other => Err(ApiError::invalid_request(format!("unknown relation {other}"))),
        }
    }

    fn to_many_editor(&mut self) -> Option<&mut dyn EditToMany> {
        Some(self)
    }
}

impl EditToMany for Post {
    fn add_to_many_ids(&mut self, name: &str, ids: Vec<String>) -> ApiResult<()> {
        if name != "comments" {
            return Err(ApiError::invalid_request(format!("unknown relation {name}")));
        }
        self.comment_ids.extend(ids);
        Ok(())
    }

    fn delete_to_many_ids(&mut self, name: &str, ids: Vec<String>) -> ApiResult<()> {
        if name != "comments" {
            return Err(ApiError::invalid_request(format!("unknown relation {name}")));
        }
        self.comment_ids.retain(|id| !ids.contains(id));
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub post_id: Option<String>,
}

impl Resource for Comment {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn set_id(&mut self, id: &str) -> ApiResult<()> {
        self.id = id.to_owned();
        Ok(())
    }

    fn hidden_fields() -> &'static [&'static str] {
        &["post_id"]
    }
}

/// Tree node relating to other nodes through three distinct relations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mother_id: String,
    #[serde(default)]
    pub child_ids: Vec<String>,
    #[serde(default)]
    pub abandoned_child_ids: Vec<String>,
}

impl Resource for Node {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn set_id(&mut self, id: &str) -> ApiResult<()> {
        self.id = id.to_owned();
        Ok(())
    }

    fn hidden_fields() -> &'static [&'static str] {
        &["mother_id", "child_ids", "abandoned_child_ids"]
    }

    fn references() -> Vec<Reference> {
        vec![
            Reference::new("nodes", "mother-node"),
            Reference::new("nodes", "child-nodes"),
            Reference::new("nodes", "abandoned-child-nodes"),
        ]
    }

    fn referenced_ids(&self) -> Vec<ReferenceId> {
        let mut ids = vec![ReferenceId::new("nodes", "mother-node", self.mother_id.clone())];
        ids.extend(
            self.child_ids
                .iter()
                .map(|id| ReferenceId::new("nodes", "child-nodes", id.clone())),
        );
        ids.extend(
            self.abandoned_child_ids
                .iter()
                .map(|id| ReferenceId::new("nodes", "abandoned-child-nodes", id.clone())),
        );
        ids
    }

    fn set_to_one_id(&mut self, name: &str, id: Option<String>) -> ApiResult<()> {
        if name != "mother-node" {
            return Err(ApiError::invalid_request(format!("unknown relation {name}")));
        }
        self.mother_id = id.unwrap_or_default();
        Ok(())
    }

    fn set_to_many_ids(&mut self, name: &str, ids: Vec<String>) -> ApiResult<()> {
        match name {
            "child-nodes" => self.child_ids = ids,
            "abandoned-child-nodes" => self.abandoned_child_ids = ids,
            other => return Err(ApiError::invalid_request(format!("unknown relation {other}"))),
        }
        Ok(())
    }
}
