use crate::catalog::covers::CoverStore;
use crate::catalog::types::{Book, BookPatch, CatalogError, NewBook, SearchField};
use chrono::{Datelike as _, Local};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the SQLite database inside the store directory.
pub const DB_FILE: &str = "library.db";
/// Directory name of the cover-image side store inside the store directory.
pub const COVERS_DIR: &str = "covers";

const CREATE_BOOKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT,
    isbn TEXT,
    genre TEXT,
    pages INTEGER,
    year INTEGER,
    publisher TEXT,
    acquired_date DATE,
    read_status TEXT,
    rating INTEGER,
    notes TEXT
)";

const BOOK_COLUMNS: &str =
    "id, title, author, isbn, genre, pages, year, publisher, acquired_date, read_status, rating, notes";

/// The catalog store: one SQLite table of books plus a directory of cover images, both
/// living under a single store directory passed to [`Self::open`].
pub struct CatalogStore {
    pool: SqlitePool,
    covers: CoverStore,
}

impl CatalogStore {
    /// Open (or create) the store rooted at `data_dir`. Ensures the directory, the
    /// `books` table and the covers directory all exist. Idempotent, safe to call on
    /// every process start.
    #[allow(
        clippy::missing_inline_in_public_items,
        reason = "Called once at start of program"
    )]
    pub async fn open(data_dir: &Path) -> Result<Self, CatalogError> {
        fs::create_dir_all(data_dir)?;

        let options = SqliteConnectOptions::new()
            .foreign_keys(true)
            .create_if_missing(true)
            .filename(data_dir.join(DB_FILE));
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::query(CREATE_BOOKS_TABLE).execute(&pool).await?;

        let covers = CoverStore::new(data_dir.join(COVERS_DIR));
        covers.ensure()?;

        log::info!("Opened catalog store at {}", data_dir.display());
        Ok(Self { pool, covers })
    }

    #[allow(
        clippy::missing_inline_in_public_items,
        reason = "Called once at end of program"
    )]
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert a new book and, if cover bytes are given, write its cover image. Returns
    /// the freshly assigned id.
    ///
    /// The row insert and the cover write are not transactionally linked: if the cover
    /// fails after the insert succeeded, the error is returned but the row remains.
    pub async fn add_book(
        &self,
        book: &NewBook,
        cover: Option<&[u8]>,
    ) -> Result<i64, CatalogError> {
        validate_ranges(book.year, Some(book.rating))?;

        let acquired_date = book
            .acquired_date
            .unwrap_or_else(|| Local::now().date_naive());

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO books
                (title, author, isbn, genre, pages, year, publisher,
                 acquired_date, read_status, rating, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(book.title.as_str())
        .bind(book.author.as_deref())
        .bind(book.isbn.as_deref())
        .bind(book.genre.as_deref())
        .bind(book.pages)
        .bind(book.year)
        .bind(book.publisher.as_deref())
        .bind(acquired_date)
        .bind(book.read_status)
        .bind(book.rating)
        .bind(book.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;

        if let Some(bytes) = cover {
            self.covers.save(id, bytes)?;
        }

        log::info!("Added book {id} ({})", book.title);
        Ok(id)
    }

    /// Every book, in insertion (id) order. No implicit sort beyond that.
    pub async fn all_books(&self) -> Result<Vec<Book>, CatalogError> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Case-insensitive substring search over one of the allow-listed columns. `field`
    /// is parsed through [`SearchField`]; anything else fails with `InvalidArgument`.
    /// An empty term degenerates to a full scan, so rows with a NULL value in `field`
    /// are still returned.
    pub async fn search_books(&self, term: &str, field: &str) -> Result<Vec<Book>, CatalogError> {
        let field: SearchField = field.parse()?;
        if term.is_empty() {
            return self.all_books().await;
        }

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE {} LIKE ? ESCAPE '\\' ORDER BY id",
            field.column()
        );
        let pattern = format!("%{}%", escape_like(term));
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Apply only the fields present in `patch` to the book with `id`, leaving every
    /// other field and every other row untouched. An empty patch is a no-op, but still
    /// reports `NotFound` for an unknown id.
    pub async fn update_book(&self, id: i64, patch: &BookPatch) -> Result<(), CatalogError> {
        validate_ranges(patch.year, patch.rating)?;

        if patch.is_empty() {
            let found: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            return found.map(|_| ()).ok_or(CatalogError::NotFound(id));
        }

        // The SET clause is assembled from fixed column literals only; every value goes
        // through a bound parameter.
        let mut assignments: Vec<&'static str> = Vec::new();
        if patch.title.is_some() {
            assignments.push("title = ?");
        }
        if patch.author.is_some() {
            assignments.push("author = ?");
        }
        if patch.isbn.is_some() {
            assignments.push("isbn = ?");
        }
        if patch.genre.is_some() {
            assignments.push("genre = ?");
        }
        if patch.pages.is_some() {
            assignments.push("pages = ?");
        }
        if patch.year.is_some() {
            assignments.push("year = ?");
        }
        if patch.publisher.is_some() {
            assignments.push("publisher = ?");
        }
        if patch.acquired_date.is_some() {
            assignments.push("acquired_date = ?");
        }
        if patch.read_status.is_some() {
            assignments.push("read_status = ?");
        }
        if patch.rating.is_some() {
            assignments.push("rating = ?");
        }
        if patch.notes.is_some() {
            assignments.push("notes = ?");
        }

        let sql = format!("UPDATE books SET {} WHERE id = ?", assignments.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(title) = &patch.title {
            query = query.bind(title.as_str());
        }
        if let Some(author) = &patch.author {
            query = query.bind(author.as_str());
        }
        if let Some(isbn) = &patch.isbn {
            query = query.bind(isbn.as_str());
        }
        if let Some(genre) = &patch.genre {
            query = query.bind(genre.as_str());
        }
        if let Some(pages) = patch.pages {
            query = query.bind(pages);
        }
        if let Some(year) = patch.year {
            query = query.bind(year);
        }
        if let Some(publisher) = &patch.publisher {
            query = query.bind(publisher.as_str());
        }
        if let Some(acquired_date) = patch.acquired_date {
            query = query.bind(acquired_date);
        }
        if let Some(read_status) = patch.read_status {
            query = query.bind(read_status);
        }
        if let Some(rating) = patch.rating {
            query = query.bind(rating);
        }
        if let Some(notes) = &patch.notes {
            query = query.bind(notes.as_str());
        }

        let result = query.bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }

    /// Delete the book with `id` and, if present, its cover file. The row goes first;
    /// cover removal is idempotent, so a book that never had a cover deletes cleanly.
    pub async fn delete_book(&self, id: i64) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(id));
        }

        self.covers.remove(id)?;
        log::info!("Deleted book {id}");
        Ok(())
    }

    /// Whether a cover file exists for `id`. Absence is a valid state.
    #[must_use]
    #[inline]
    pub fn has_cover(&self, id: i64) -> bool {
        self.covers.exists(id)
    }

    /// Path a cover for `id` would live at, whether or not one exists.
    #[must_use]
    #[inline]
    pub fn cover_path(&self, id: i64) -> PathBuf {
        self.covers.path_for(id)
    }
}

/// Range checks shared by insert and update: `year` must fall in [0, current calendar
/// year], `rating` in [1, 5]. `None` means the field is not being written.
fn validate_ranges(year: Option<i64>, rating: Option<i64>) -> Result<(), CatalogError> {
    if let Some(year) = year {
        let current = i64::from(Local::now().year());
        if !(0..=current).contains(&year) {
            return Err(CatalogError::Validation(format!(
                "year {year} is outside 0..={current}"
            )));
        }
    }
    if let Some(rating) = rating {
        if !(1..=5).contains(&rating) {
            return Err(CatalogError::Validation(format!(
                "rating {rating} is outside 1..=5"
            )));
        }
    }
    Ok(())
}

/// Escape `LIKE` wildcards in a user-supplied term so the match is a literal substring
/// test.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
