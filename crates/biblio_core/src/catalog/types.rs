use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A book row as stored in the `books` table. The record's `id` is assigned by the store
/// on insert and never changes afterwards; everything except `title` is optional input.
#[non_exhaustive]
#[derive(Serialize, Debug, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub pages: Option<i64>,
    pub year: Option<i64>,
    pub publisher: Option<String>,
    pub acquired_date: NaiveDate,
    pub read_status: ReadStatus,
    pub rating: i64,
    pub notes: Option<String>,
}

impl Book {
    #[allow(
        clippy::too_many_arguments,
        reason = "Constructor, cannot have fewer arguments"
    )]
    #[must_use]
    #[inline]
    pub const fn new(
        id: i64,
        title: String,
        author: Option<String>,
        isbn: Option<String>,
        genre: Option<String>,
        pages: Option<i64>,
        year: Option<i64>,
        publisher: Option<String>,
        acquired_date: NaiveDate,
        read_status: ReadStatus,
        rating: i64,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            title,
            author,
            isbn,
            genre,
            pages,
            year,
            publisher,
            acquired_date,
            read_status,
            rating,
            notes,
        }
    }
}

/// Payload for inserting a new book. `acquired_date` left as `None` defaults to today at
/// insert time. The caller is responsible for having collected a non-empty `title`; the
/// store does not re-validate it.
#[non_exhaustive]
#[derive(Serialize, Debug, Deserialize, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub pages: Option<i64>,
    pub year: Option<i64>,
    pub publisher: Option<String>,
    pub acquired_date: Option<NaiveDate>,
    pub read_status: ReadStatus,
    pub rating: i64,
    pub notes: Option<String>,
}

impl NewBook {
    /// A new payload with the entry-form defaults: unread, rated 1, nothing else set.
    #[must_use]
    #[inline]
    pub const fn new(title: String) -> Self {
        Self {
            title,
            author: None,
            isbn: None,
            genre: None,
            pages: None,
            year: None,
            publisher: None,
            acquired_date: None,
            read_status: ReadStatus::Unread,
            rating: 1,
            notes: None,
        }
    }
}

/// Partial update for an existing book. Fields left as `None` are not touched, so
/// applying a patch changes exactly the fields that are present.
#[non_exhaustive]
#[derive(Serialize, Debug, Deserialize, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub pages: Option<i64>,
    pub year: Option<i64>,
    pub publisher: Option<String>,
    pub acquired_date: Option<NaiveDate>,
    pub read_status: Option<ReadStatus>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
}

impl BookPatch {
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.genre.is_none()
            && self.pages.is_none()
            && self.year.is_none()
            && self.publisher.is_none()
            && self.acquired_date.is_none()
            && self.read_status.is_none()
            && self.rating.is_none()
            && self.notes.is_none()
    }
}

/// Reading progress of a book. Stored as TEXT using the variant name; moves freely
/// between variants via updates, there is no enforced ordering or terminal state.
#[derive(
    Serialize,
    Debug,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    sqlx::Type,
)]
pub enum ReadStatus {
    #[default]
    Unread,
    Reading,
    Finished,
}

impl ReadStatus {
    #[must_use]
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unread => "Unread",
            Self::Reading => "Reading",
            Self::Finished => "Finished",
        }
    }
}

impl fmt::Display for ReadStatus {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadStatus {
    type Err = CatalogError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unread" => Ok(Self::Unread),
            "Reading" => Ok(Self::Reading),
            "Finished" => Ok(Self::Finished),
            other => Err(CatalogError::Validation(format!(
                "unknown read status: {other}"
            ))),
        }
    }
}

/// Allow-list of columns a caller may search on. Anything outside this set is rejected
/// before it gets anywhere near a query, so caller-supplied field names are never
/// interpolated into SQL.
#[derive(Serialize, Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    Genre,
    Isbn,
}

impl SearchField {
    /// The column name this field maps to. Only ever one of four fixed literals.
    #[must_use]
    #[inline]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Genre => "genre",
            Self::Isbn => "isbn",
        }
    }
}

impl FromStr for SearchField {
    type Err = CatalogError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "genre" => Ok(Self::Genre),
            "isbn" => Ok(Self::Isbn),
            other => Err(CatalogError::InvalidArgument(other.to_owned())),
        }
    }
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A field value was structurally out of range (year in the future, rating off the
    /// 1-5 scale).
    #[error("invalid field value: {0}")]
    Validation(String),

    /// The operation targeted an id with no matching row.
    #[error("no book with id {0}")]
    NotFound(i64),

    /// A caller-supplied field name is not on the search/update allow-list.
    #[error("unrecognized field: {0}")]
    InvalidArgument(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded cover bytes are not a decodable image.
    #[error("failed to decode cover image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// The cover decoded fine but could not be re-encoded to disk.
    #[error("failed to write cover image: {0}")]
    CoverWrite(#[source] image::ImageError),
}
