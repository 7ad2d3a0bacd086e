use serde::{Deserialize, Serialize};

use super::entity;
use crate::modules::books::{entity as book, models::BookSummary};
use crate::validation::{Validate, Validator, Violation};

/// Author as exposed by the author endpoints, books included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub books: Vec<BookSummary>,
}

impl AuthorView {
    pub fn new(author: entity::Model, books: Vec<book::Model>) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            books: books.into_iter().map(BookSummary::from).collect(),
        }
    }
}

/// Author as embedded in book views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl From<entity::Model> for AuthorSummary {
    fn from(author: entity::Model) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
        }
    }
}

/// Request body for create and update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Author fields as they will be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorFields {
    pub first_name: String,
    pub last_name: String,
}

impl AuthorFields {
    pub fn merge(mut self, payload: AuthorPayload) -> Self {
        if let Some(first_name) = payload.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = payload.last_name {
            self.last_name = last_name;
        }
        self
    }
}

impl From<&entity::Model> for AuthorFields {
    fn from(author: &entity::Model) -> Self {
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
        }
    }
}

impl Validate for AuthorFields {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .not_blank("firstName", &self.first_name)
            .max_length("firstName", Some(&self.first_name), 255)
            .not_blank("lastName", &self.last_name)
            .max_length("lastName", Some(&self.last_name), 255)
            .finish()
    }
}
