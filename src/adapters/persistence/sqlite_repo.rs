//! SQLite-backed repository via libsql. Implements TodoRepoPort.
//!
//! Single `todos` table in `<data_dir>/todos.db`. Timestamps are stored as
//! INTEGER microseconds since the Unix epoch so ordering is a plain integer sort.
//! Partial updates run as one parameterized statement: every column is
//! `COALESCE(?n, column)`, so an unset patch field binds NULL and keeps the stored value.

use crate::domain::{DomainError, NewTodo, Priority, Todo, TodoPatch};
use crate::ports::TodoRepoPort;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database, Row, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TODOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(title) > 0),
    description TEXT NOT NULL DEFAULT '',
    completed INTEGER NOT NULL DEFAULT 0,
    priority TEXT NOT NULL DEFAULT 'medium' CHECK (priority IN ('low', 'medium', 'high')),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)"#;
const TODOS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at DESC)";

const TODO_COLUMNS: &str = "id, title, description, completed, priority, created_at, updated_at";

/// SQLite repository. One database file (todos.db) in the given base directory.
pub struct SqliteTodoRepo {
    db: Database,
    db_path: PathBuf,
}

fn storage_err(context: &'static str) -> impl Fn(libsql::Error) -> DomainError {
    move |e| DomainError::Storage(format!("{}: {}", context, e))
}

impl SqliteTodoRepo {
    /// Connect to (or create) the SQLite database and ensure the schema exists.
    /// Call this once at startup; the returned repo is safe to share via Arc.
    ///
    /// Sets WAL mode and synchronous=NORMAL so concurrent requests can read
    /// while one writes.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Storage(e.to_string()))?;
        let db_path = base.join("todos.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(storage_err("failed to open database"))?;
        let conn = db.connect().map_err(storage_err("failed to connect"))?;

        // PRAGMA returns a row (new value); execute fails on rows, so query and drain.
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(storage_err("pragma failed"))?;
            while rows.next().await.map_err(storage_err("pragma failed"))?.is_some() {}
        }

        conn.execute(TODOS_TABLE, ())
            .await
            .map_err(storage_err("failed to create todos table"))?;
        conn.execute(TODOS_INDEX, ())
            .await
            .map_err(storage_err("failed to create todos index"))?;

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(storage_err("failed to connect"))
    }

    fn now_micros() -> i64 {
        Utc::now().timestamp_micros()
    }

    fn micros_to_datetime(micros: i64) -> Result<DateTime<Utc>, DomainError> {
        DateTime::<Utc>::from_timestamp_micros(micros)
            .ok_or_else(|| DomainError::Storage(format!("timestamp out of range: {}", micros)))
    }

    fn row_to_todo(row: &Row) -> Result<Todo, DomainError> {
        let decode = storage_err("failed to decode todo row");
        let id: i64 = row.get(0).map_err(&decode)?;
        let title: String = row.get(1).map_err(&decode)?;
        let description: String = row.get(2).map_err(&decode)?;
        let completed: i64 = row.get(3).map_err(&decode)?;
        let priority: String = row.get(4).map_err(&decode)?;
        let created_at: i64 = row.get(5).map_err(&decode)?;
        let updated_at: i64 = row.get(6).map_err(&decode)?;
        Ok(Todo {
            id,
            title,
            description,
            completed: completed != 0,
            priority: priority
                .parse::<Priority>()
                .map_err(|e| DomainError::Storage(e.to_string()))?,
            created_at: Self::micros_to_datetime(created_at)?,
            updated_at: Self::micros_to_datetime(updated_at)?,
        })
    }

    /// Run a statement expected to yield at most one todo row.
    async fn query_one(
        conn: &Connection,
        sql: &str,
        params: impl libsql::params::IntoParams,
        context: &'static str,
    ) -> Result<Option<Todo>, DomainError> {
        let mut rows = conn.query(sql, params).await.map_err(storage_err(context))?;
        match rows.next().await.map_err(storage_err(context))? {
            Some(row) => Self::row_to_todo(&row).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl TodoRepoPort for SqliteTodoRepo {
    async fn get_all(&self) -> Result<Vec<Todo>, DomainError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM todos ORDER BY created_at DESC, id DESC",
            TODO_COLUMNS
        );
        let mut rows = conn
            .query(&sql, ())
            .await
            .map_err(storage_err("failed to fetch todos"))?;
        let mut todos = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(storage_err("failed to fetch todos"))?
        {
            todos.push(Self::row_to_todo(&row)?);
        }
        Ok(todos)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>, DomainError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM todos WHERE id = ?1", TODO_COLUMNS);
        Self::query_one(&conn, &sql, params![id], "failed to fetch todo").await
    }

    async fn create(&self, todo: &NewTodo) -> Result<Todo, DomainError> {
        let conn = self.conn()?;
        let now = Self::now_micros();
        let sql = format!(
            r#"
            INSERT INTO todos (title, description, completed, priority, created_at, updated_at)
            VALUES (?1, ?2, 0, ?3, ?4, ?4)
            RETURNING {}
            "#,
            TODO_COLUMNS
        );
        let created = Self::query_one(
            &conn,
            &sql,
            params![
                todo.title.as_str(),
                todo.description.as_str(),
                todo.priority.as_str(),
                now
            ],
            "failed to create todo",
        )
        .await?
        .ok_or_else(|| DomainError::Storage("failed to create todo: no row returned".into()))?;
        debug!(id = created.id, "inserted todo row");
        Ok(created)
    }

    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<Option<Todo>, DomainError> {
        let conn = self.conn()?;
        // MAX keeps updated_at monotonic even if the wall clock steps back.
        let sql = format!(
            r#"
            UPDATE todos SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                priority = COALESCE(?3, priority),
                completed = COALESCE(?4, completed),
                updated_at = MAX(updated_at, ?5)
            WHERE id = ?6
            RETURNING {}
            "#,
            TODO_COLUMNS
        );
        let priority: Option<String> = patch.priority.map(|p| p.as_str().to_string());
        let completed: Option<i64> = patch.completed.map(i64::from);
        Self::query_one(
            &conn,
            &sql,
            params![
                patch.title.clone(),
                patch.description.clone(),
                priority,
                completed,
                Self::now_micros(),
                id
            ],
            "failed to update todo",
        )
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let affected = conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])
            .await
            .map_err(storage_err("failed to delete todo"))?;
        if affected == 0 {
            return Err(DomainError::NotFound(id));
        }
        Ok(())
    }
}
