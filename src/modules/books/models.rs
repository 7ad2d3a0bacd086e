use serde::{Deserialize, Serialize};

use super::entity;
use crate::modules::authors::{entity as author, models::AuthorSummary};
use crate::validation::{Validate, Validator, Violation};

/// Book as exposed by the book endpoints, author embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: i32,
    pub title: String,
    pub cover_text: String,
    pub comment: Option<String>,
    pub author: Option<AuthorSummary>,
}

impl BookView {
    pub fn new(book: entity::Model, author: Option<author::Model>) -> Self {
        Self {
            id: book.id,
            title: book.title,
            cover_text: book.cover_text,
            comment: book.comment,
            author: author.map(AuthorSummary::from),
        }
    }
}

/// Book as embedded in author views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub cover_text: String,
    pub comment: Option<String>,
}

impl From<entity::Model> for BookSummary {
    fn from(book: entity::Model) -> Self {
        Self {
            id: book.id,
            title: book.title,
            cover_text: book.cover_text,
            comment: book.comment,
        }
    }
}

/// Request body for create and update.
///
/// `idAuthor` is resolved against the author table; an unknown id leaves the
/// book without an author. On update, absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: Option<String>,
    pub cover_text: Option<String>,
    pub comment: Option<String>,
    pub id_author: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub cover_text: String,
    pub comment: Option<String>,
}

impl BookFields {
    pub fn merge(mut self, payload: &BookPayload) -> Self {
        if let Some(title) = &payload.title {
            self.title = title.clone();
        }
        if let Some(cover_text) = &payload.cover_text {
            self.cover_text = cover_text.clone();
        }
        if let Some(comment) = &payload.comment {
            self.comment = Some(comment.clone());
        }
        self
    }
}

impl From<&entity::Model> for BookFields {
    fn from(book: &entity::Model) -> Self {
        Self {
            title: book.title.clone(),
            cover_text: book.cover_text.clone(),
            comment: book.comment.clone(),
        }
    }
}

impl Validate for BookFields {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .not_blank("title", &self.title)
            .max_length("title", Some(&self.title), 255)
            .not_blank("coverText", &self.cover_text)
            .max_length("comment", self.comment.as_deref(), 1000)
            .finish()
    }
}

/// `?page=&limit=`; missing values fall back to the configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBooksQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
