//! Persistence layer
//!
//! SQLite-backed store for users, sessions, projects, furniture inventory
//! and daily sales reports. Uploaded images live as files next to the
//! database; rows hold the filenames.
//!
//! # Layout
//!
//! ```text
//! <data_dir>/furnish.db     SQLite database
//! <data_dir>/uploads/       image files, uuid-named
//! ```

pub mod error;
pub mod furniture;
pub mod projects;
pub mod reports;
pub mod sessions;
pub mod types;
pub mod users;

pub use error::{StoreError, StoreResult};
pub use types::{
    Furniture, FurnitureReport, Project, ReportItem, Role, Session, SubFurniture, User,
    PROJECT_IMAGE_LIMIT,
};

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The SQLite-backed store shared by all API handlers
pub struct Store {
    conn: Mutex<Connection>,
    data_dir: PathBuf,
}

impl Store {
    /// Create or open the store under `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        std::fs::create_dir_all(data_dir.join("uploads"))?;

        let conn = Connection::open(data_dir.join("furnish.db"))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let store = Store {
            conn: Mutex::new(conn),
            data_dir,
        };
        store.initialize()?;

        Ok(store)
    }

    fn initialize(&self) -> StoreResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "
            -- Accounts (staff and clients)
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'client',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Bearer-token sessions
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );

            -- Client projects
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                note TEXT,
                duration TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );

            -- Project photos, capped per project in code
            CREATE TABLE IF NOT EXISTS project_images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                filename TEXT NOT NULL,
                position INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (project_id) REFERENCES projects(id)
            );

            -- Furniture categories
            CREATE TABLE IF NOT EXISTS furniture (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Inventory items, numbered per category (e.g. T001)
            CREATE TABLE IF NOT EXISTS sub_furniture (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                furniture_id INTEGER NOT NULL,
                item_no TEXT NOT NULL,
                name TEXT NOT NULL,
                image TEXT,
                price REAL NOT NULL DEFAULT 0,
                quantity INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (furniture_id, item_no),
                FOREIGN KEY (furniture_id) REFERENCES furniture(id)
            );

            -- Daily sales reports, one per date
            CREATE TABLE IF NOT EXISTS furniture_reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL UNIQUE,
                signature TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Snapshot rows for each report
            CREATE TABLE IF NOT EXISTS report_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                report_id INTEGER NOT NULL,
                item_no TEXT NOT NULL,
                item_name TEXT NOT NULL,
                initial_count INTEGER NOT NULL,
                sold INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (report_id) REFERENCES furniture_reports(id)
            );

            CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);
            CREATE INDEX IF NOT EXISTS idx_sub_furniture_category ON sub_furniture(furniture_id);
            CREATE INDEX IF NOT EXISTS idx_report_items_report ON report_items(report_id);
            ",
        )?;

        Self::migrate_conn(&conn)?;

        Ok(())
    }

    /// Column-add migrations for databases created by earlier builds
    fn migrate_conn(conn: &Connection) -> StoreResult<()> {
        let columns: Vec<String> = conn
            .prepare("PRAGMA table_info(projects)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !columns.contains(&"note".to_string()) {
            conn.execute("ALTER TABLE projects ADD COLUMN note TEXT", [])?;
        }
        if !columns.contains(&"duration".to_string()) {
            conn.execute("ALTER TABLE projects ADD COLUMN duration TEXT", [])?;
        }

        let report_columns: Vec<String> = conn
            .prepare("PRAGMA table_info(furniture_reports)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !report_columns.contains(&"signature".to_string()) {
            conn.execute("ALTER TABLE furniture_reports ADD COLUMN signature TEXT", [])?;
        }

        Ok(())
    }

    /// Acquire the connection, mapping a poisoned mutex to a StoreError
    pub(crate) fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Directory holding uploaded image files
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Persist uploaded image bytes under a fresh uuid filename.
    ///
    /// Returns the stored filename (not a full path).
    pub fn save_upload(&self, bytes: &[u8], extension: &str) -> StoreResult<String> {
        let filename = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        std::fs::write(self.uploads_dir().join(&filename), bytes)?;
        Ok(filename)
    }

    /// Remove a stored image file. Missing files are not an error; the row
    /// is the source of truth and cleanup must not mask the real failure.
    pub fn delete_upload(&self, filename: &str) {
        let path = self.uploads_dir().join(filename);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(file = %filename, error = %e, "Failed to remove upload");
            }
        }
    }

    /// Cheap connectivity probe used by the readiness endpoint
    pub fn health_check(&self) -> bool {
        match self.lock() {
            Ok(conn) => conn
                .query_row("SELECT COUNT(*) FROM users", [], |row| row.get::<_, i64>(0))
                .is_ok(),
            Err(_) => false,
        }
    }
}
