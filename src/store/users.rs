//! User accounts
//!
//! Account CRUD plus credential checks. Passwords are bcrypt-hashed on the
//! way in and verified on login; hashes never leave this module's types.

use super::error::{StoreError, StoreResult};
use super::types::{Role, User};
use super::Store;
use rusqlite::{params, Connection, OptionalExtension};

/// Fields for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Fields for updating a user; `password` is re-hashed only when provided
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::parse(&role).unwrap_or(Role::Client),
        created_at: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

fn get_user_conn(conn: &Connection, id: i64) -> StoreResult<User> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        [id],
        row_to_user,
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(format!("User {}", id)))
}

impl Store {
    /// Create a user, hashing the password. Duplicate emails are a conflict.
    pub fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let hash = bcrypt::hash(&new.password, bcrypt::DEFAULT_COST)?;

        let conn = self.lock()?;

        let exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                [&new.email],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::Conflict(format!(
                "A user with email '{}' already exists",
                new.email
            )));
        }

        conn.execute(
            "INSERT INTO users (name, email, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
            params![new.name, new.email, hash, new.role.as_str()],
        )?;

        let id = conn.last_insert_rowid();
        get_user_conn(&conn, id)
    }

    /// Look up a user by credentials. Returns None when the email is unknown
    /// or the password does not verify; callers cannot tell which.
    pub fn authenticate(&self, email: &str, password: &str) -> StoreResult<Option<User>> {
        let user = {
            let conn = self.lock()?;
            conn.query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                [email],
                row_to_user,
            )
            .optional()?
        };

        match user {
            Some(user) => {
                if bcrypt::verify(password, &user.password_hash)? {
                    Ok(Some(user))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    pub fn get_user(&self, id: i64) -> StoreResult<User> {
        let conn = self.lock()?;
        get_user_conn(&conn, id)
    }

    /// All users, newest first
    pub fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id DESC",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    pub fn count_users(&self) -> StoreResult<i64> {
        let conn = self.lock()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }

    /// Apply a partial update; returns the updated user
    pub fn update_user(&self, id: i64, update: UserUpdate) -> StoreResult<User> {
        let hash = match &update.password {
            Some(password) => Some(bcrypt::hash(password, bcrypt::DEFAULT_COST)?),
            None => None,
        };

        let conn = self.lock()?;
        let current = get_user_conn(&conn, id)?;

        if let Some(email) = &update.email {
            let taken: Option<i64> = conn
                .query_row(
                    "SELECT id FROM users WHERE email = ?1 AND id != ?2",
                    params![email, id],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(StoreError::Conflict(format!(
                    "A user with email '{}' already exists",
                    email
                )));
            }
        }

        conn.execute(
            "UPDATE users SET name = ?1, email = ?2, password_hash = ?3, role = ?4 WHERE id = ?5",
            params![
                update.name.unwrap_or(current.name),
                update.email.unwrap_or(current.email),
                hash.unwrap_or(current.password_hash),
                update.role.unwrap_or(current.role).as_str(),
                id
            ],
        )?;

        get_user_conn(&conn, id)
    }

    /// Delete a user along with their sessions, projects and project images
    pub fn delete_user(&self, id: i64) -> StoreResult<()> {
        let mut orphaned_files = Vec::new();
        {
            let mut conn = self.lock()?;
            get_user_conn(&conn, id)?;

            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "SELECT pi.filename FROM project_images pi
                     JOIN projects p ON pi.project_id = p.id
                     WHERE p.user_id = ?1",
                )?;
                let files = stmt
                    .query_map([id], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                orphaned_files.extend(files);
            }

            tx.execute(
                "DELETE FROM project_images WHERE project_id IN
                 (SELECT id FROM projects WHERE user_id = ?1)",
                [id],
            )?;
            tx.execute("DELETE FROM projects WHERE user_id = ?1", [id])?;
            tx.execute("DELETE FROM sessions WHERE user_id = ?1", [id])?;
            tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            tx.commit()?;
        }

        for filename in orphaned_files {
            self.delete_upload(&filename);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store() -> (Store, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (store, dir)
    }

    fn sample_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "hunter2secret".to_string(),
            role: Role::Client,
        }
    }

    #[test]
    fn test_create_and_authenticate() {
        let (store, _dir) = test_store();

        let user = store.create_user(sample_user("a@example.com")).unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.role, Role::Client);
        assert_ne!(user.password_hash, "hunter2secret");

        let found = store
            .authenticate("a@example.com", "hunter2secret")
            .unwrap();
        assert!(found.is_some());

        let wrong = store.authenticate("a@example.com", "nope").unwrap();
        assert!(wrong.is_none());

        let unknown = store.authenticate("b@example.com", "hunter2secret").unwrap();
        assert!(unknown.is_none());
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let (store, _dir) = test_store();

        store.create_user(sample_user("a@example.com")).unwrap();
        let err = store.create_user(sample_user("a@example.com")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_update_without_password_keeps_credentials() {
        let (store, _dir) = test_store();

        let user = store.create_user(sample_user("a@example.com")).unwrap();
        let updated = store
            .update_user(
                user.id,
                UserUpdate {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert!(store
            .authenticate("a@example.com", "hunter2secret")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_update_password_rotates_credentials() {
        let (store, _dir) = test_store();

        let user = store.create_user(sample_user("a@example.com")).unwrap();
        store
            .update_user(
                user.id,
                UserUpdate {
                    password: Some("newpassword".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(store
            .authenticate("a@example.com", "hunter2secret")
            .unwrap()
            .is_none());
        assert!(store
            .authenticate("a@example.com", "newpassword")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_delete_user_cascades_projects() {
        let (store, _dir) = test_store();

        let user = store.create_user(sample_user("a@example.com")).unwrap();
        let project = store
            .create_project(user.id, "Villa", None, None, None)
            .unwrap();
        let filename = store.save_upload(b"img", "jpg").unwrap();
        store.add_project_image(project.id, &filename).unwrap();

        store.delete_user(user.id).unwrap();

        assert!(matches!(
            store.get_user(user.id),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.get_project(project.id),
            Err(StoreError::NotFound(_))
        ));
        assert!(!store.uploads_dir().join(&filename).exists());
    }
}
