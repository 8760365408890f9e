//! Client projects
//!
//! Project CRUD plus photo attachments. A project holds at most
//! [`PROJECT_IMAGE_LIMIT`](super::types::PROJECT_IMAGE_LIMIT) images;
//! completion is derived from the image count and never stored.

use super::error::{StoreError, StoreResult};
use super::types::{Project, PROJECT_IMAGE_LIMIT};
use super::Store;
use rusqlite::{params, Connection, OptionalExtension};

/// Fields for updating a project
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub note: Option<Option<String>>,
    pub duration: Option<Option<String>>,
}

fn images_for(conn: &Connection, project_id: i64) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT filename FROM project_images WHERE project_id = ?1 ORDER BY position, id",
    )?;
    let images = stmt
        .query_map([project_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(images)
}

fn get_project_conn(conn: &Connection, id: i64) -> StoreResult<Project> {
    let project = conn
        .query_row(
            "SELECT id, user_id, name, description, note, duration, created_at
             FROM projects WHERE id = ?1",
            [id],
            |row| {
                Ok(Project {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    note: row.get(4)?,
                    duration: row.get(5)?,
                    images: Vec::new(),
                    created_at: row.get(6)?,
                })
            },
        )
        .optional()?;

    let mut project = project.ok_or_else(|| StoreError::NotFound(format!("Project {}", id)))?;
    project.images = images_for(conn, id)?;
    Ok(project)
}

impl Store {
    pub fn create_project(
        &self,
        user_id: i64,
        name: &str,
        description: Option<&str>,
        note: Option<&str>,
        duration: Option<&str>,
    ) -> StoreResult<Project> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO projects (user_id, name, description, note, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, name, description, note, duration],
        )?;

        let id = conn.last_insert_rowid();
        get_project_conn(&conn, id)
    }

    pub fn get_project(&self, id: i64) -> StoreResult<Project> {
        let conn = self.lock()?;
        get_project_conn(&conn, id)
    }

    /// All projects, newest first
    pub fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.list_projects_inner(None)
    }

    /// Projects owned by one user, newest first
    pub fn list_projects_for_user(&self, user_id: i64) -> StoreResult<Vec<Project>> {
        self.list_projects_inner(Some(user_id))
    }

    fn list_projects_inner(&self, user_id: Option<i64>) -> StoreResult<Vec<Project>> {
        let conn = self.lock()?;

        let ids: Vec<i64> = match user_id {
            Some(uid) => {
                let mut stmt = conn.prepare_cached(
                    "SELECT id FROM projects WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
                )?;
                let ids = stmt
                    .query_map([uid], |row| row.get(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                ids
            }
            None => {
                let mut stmt = conn
                    .prepare_cached("SELECT id FROM projects ORDER BY created_at DESC, id DESC")?;
                let ids = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                ids
            }
        };

        ids.into_iter()
            .map(|id| get_project_conn(&conn, id))
            .collect()
    }

    pub fn update_project(&self, id: i64, update: ProjectUpdate) -> StoreResult<Project> {
        let conn = self.lock()?;
        let current = get_project_conn(&conn, id)?;

        conn.execute(
            "UPDATE projects SET name = ?1, description = ?2, note = ?3, duration = ?4
             WHERE id = ?5",
            params![
                update.name.unwrap_or(current.name),
                update.description.unwrap_or(current.description),
                update.note.unwrap_or(current.note),
                update.duration.unwrap_or(current.duration),
                id
            ],
        )?;

        get_project_conn(&conn, id)
    }

    /// Delete a project and its image files
    pub fn delete_project(&self, id: i64) -> StoreResult<()> {
        let images = {
            let conn = self.lock()?;
            get_project_conn(&conn, id)?;

            let images = images_for(&conn, id)?;
            conn.execute("DELETE FROM project_images WHERE project_id = ?1", [id])?;
            conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
            images
        };

        for filename in images {
            self.delete_upload(&filename);
        }

        Ok(())
    }

    /// Attach an already-stored image file to a project.
    ///
    /// Rejects the upload once the project holds
    /// [`PROJECT_IMAGE_LIMIT`](super::types::PROJECT_IMAGE_LIMIT) images.
    pub fn add_project_image(&self, project_id: i64, filename: &str) -> StoreResult<Project> {
        let conn = self.lock()?;
        get_project_conn(&conn, project_id)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM project_images WHERE project_id = ?1",
            [project_id],
            |row| row.get(0),
        )?;

        if count as usize >= PROJECT_IMAGE_LIMIT {
            return Err(StoreError::Conflict(format!(
                "Project already has {} images",
                PROJECT_IMAGE_LIMIT
            )));
        }

        conn.execute(
            "INSERT INTO project_images (project_id, filename, position) VALUES (?1, ?2, ?3)",
            params![project_id, filename, count],
        )?;

        get_project_conn(&conn, project_id)
    }

    /// Detach an image from a project and delete its file
    pub fn remove_project_image(&self, project_id: i64, filename: &str) -> StoreResult<Project> {
        {
            let conn = self.lock()?;
            get_project_conn(&conn, project_id)?;

            let removed = conn.execute(
                "DELETE FROM project_images WHERE project_id = ?1 AND filename = ?2",
                params![project_id, filename],
            )?;
            if removed == 0 {
                return Err(StoreError::NotFound(format!("Image {}", filename)));
            }
        }

        self.delete_upload(filename);
        self.get_project(project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::users::NewUser;
    use crate::store::Role;
    use tempfile::tempdir;

    fn store_with_user() -> (Store, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let user = store
            .create_user(NewUser {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                password: "password1".to_string(),
                role: Role::Client,
            })
            .unwrap();
        (store, user.id, dir)
    }

    #[test]
    fn test_create_and_list() {
        let (store, user_id, _dir) = store_with_user();

        store
            .create_project(user_id, "Villa", Some("Beach house"), None, Some("6 weeks"))
            .unwrap();
        store.create_project(user_id, "Office", None, None, None).unwrap();

        let all = store.list_projects().unwrap();
        assert_eq!(all.len(), 2);

        let mine = store.list_projects_for_user(user_id).unwrap();
        assert_eq!(mine.len(), 2);

        let none = store.list_projects_for_user(user_id + 1).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_image_limit_enforced() {
        let (store, user_id, _dir) = store_with_user();
        let project = store.create_project(user_id, "Villa", None, None, None).unwrap();

        for i in 0..PROJECT_IMAGE_LIMIT {
            let filename = store.save_upload(b"img", "jpg").unwrap();
            let updated = store.add_project_image(project.id, &filename).unwrap();
            assert_eq!(updated.images.len(), i + 1);
        }

        let extra = store.save_upload(b"img", "jpg").unwrap();
        let err = store.add_project_image(project.id, &extra).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // State unchanged after the rejected upload
        let project = store.get_project(project.id).unwrap();
        assert_eq!(project.images.len(), PROJECT_IMAGE_LIMIT);
        assert_eq!(project.completion(), 100);
    }

    #[test]
    fn test_remove_image_deletes_file() {
        let (store, user_id, _dir) = store_with_user();
        let project = store.create_project(user_id, "Villa", None, None, None).unwrap();

        let filename = store.save_upload(b"img", "jpg").unwrap();
        store.add_project_image(project.id, &filename).unwrap();
        assert!(store.uploads_dir().join(&filename).exists());

        let updated = store.remove_project_image(project.id, &filename).unwrap();
        assert!(updated.images.is_empty());
        assert!(!store.uploads_dir().join(&filename).exists());
    }

    #[test]
    fn test_update_preserves_unset_fields() {
        let (store, user_id, _dir) = store_with_user();
        let project = store
            .create_project(user_id, "Villa", Some("desc"), Some("note"), None)
            .unwrap();

        let updated = store
            .update_project(
                project.id,
                ProjectUpdate {
                    name: Some("Villa Renovation".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Villa Renovation");
        assert_eq!(updated.description.as_deref(), Some("desc"));
        assert_eq!(updated.note.as_deref(), Some("note"));
    }
}
