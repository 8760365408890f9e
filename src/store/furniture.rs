//! Furniture inventory
//!
//! Categories and their numbered items. Item numbers take the first letter
//! of the category name and a zero-padded sequence (T001, T002, ...), scoped
//! to the category so two categories sharing an initial cannot collide.

use super::error::{StoreError, StoreResult};
use super::types::{Furniture, SubFurniture};
use super::Store;
use rusqlite::{params, Connection, OptionalExtension};

/// Fields for creating an inventory item
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    /// Already-stored image filename, if any
    pub image: Option<String>,
}

/// Fields for updating an inventory item
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}

/// Compute the next item number for a category.
///
/// The prefix is the first letter of the category name, uppercased. Existing
/// numbers with the same prefix contribute their numeric suffix; anything
/// unparsable is ignored. The result is max + 1, padded to three digits.
pub fn next_item_no(category: &str, existing: &[String]) -> String {
    let prefix = category
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('X');

    let max = existing
        .iter()
        .filter_map(|no| {
            no.strip_prefix(prefix)
                .and_then(|suffix| suffix.parse::<u32>().ok())
        })
        .max()
        .unwrap_or(0);

    format!("{}{:03}", prefix, max + 1)
}

const ITEM_COLUMNS: &str = "item_no, furniture_id, name, image, price, quantity, created_at";

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubFurniture> {
    Ok(SubFurniture {
        item_no: row.get(0)?,
        furniture_id: row.get(1)?,
        name: row.get(2)?,
        image: row.get(3)?,
        price: row.get(4)?,
        quantity: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn items_for(conn: &Connection, furniture_id: i64) -> StoreResult<Vec<SubFurniture>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM sub_furniture WHERE furniture_id = ?1 ORDER BY item_no",
        ITEM_COLUMNS
    ))?;
    let items = stmt
        .query_map([furniture_id], row_to_item)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

fn get_category_conn(conn: &Connection, id: i64) -> StoreResult<Furniture> {
    let category = conn
        .query_row(
            "SELECT id, name, created_at FROM furniture WHERE id = ?1",
            [id],
            |row| {
                Ok(Furniture {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    items: Vec::new(),
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()?;

    let mut category =
        category.ok_or_else(|| StoreError::NotFound(format!("Furniture category {}", id)))?;
    category.items = items_for(conn, id)?;
    Ok(category)
}

impl Store {
    /// Create a category; duplicate names are a conflict
    pub fn create_category(&self, name: &str) -> StoreResult<Furniture> {
        let conn = self.lock()?;

        let exists: Option<i64> = conn
            .query_row("SELECT id FROM furniture WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::Conflict(format!(
                "Category '{}' already exists",
                name
            )));
        }

        conn.execute("INSERT INTO furniture (name) VALUES (?1)", [name])?;
        let id = conn.last_insert_rowid();
        get_category_conn(&conn, id)
    }

    pub fn get_category(&self, id: i64) -> StoreResult<Furniture> {
        let conn = self.lock()?;
        get_category_conn(&conn, id)
    }

    /// All categories with their items, by name
    pub fn list_categories(&self) -> StoreResult<Vec<Furniture>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT id FROM furniture ORDER BY name")?;
        let ids: Vec<i64> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        ids.into_iter()
            .map(|id| get_category_conn(&conn, id))
            .collect()
    }

    /// Delete a category, its items and their image files
    pub fn delete_category(&self, id: i64) -> StoreResult<()> {
        let images = {
            let conn = self.lock()?;
            get_category_conn(&conn, id)?;

            let mut stmt = conn.prepare(
                "SELECT image FROM sub_furniture WHERE furniture_id = ?1 AND image IS NOT NULL",
            )?;
            let images: Vec<String> = stmt
                .query_map([id], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;

            conn.execute("DELETE FROM sub_furniture WHERE furniture_id = ?1", [id])?;
            conn.execute("DELETE FROM furniture WHERE id = ?1", [id])?;
            images
        };

        for filename in images {
            self.delete_upload(&filename);
        }

        Ok(())
    }

    /// Create an inventory item, allocating its item number.
    ///
    /// The caller stores the image file first; if the insert fails the file
    /// is removed again so a failed create leaves no trace.
    pub fn create_item(&self, furniture_id: i64, new: NewItem) -> StoreResult<SubFurniture> {
        let result: StoreResult<SubFurniture> = (|| {
            let conn = self.lock()?;
            let category = get_category_conn(&conn, furniture_id)?;

            let existing: Vec<String> =
                category.items.iter().map(|i| i.item_no.clone()).collect();
            let item_no = next_item_no(&category.name, &existing);

            conn.execute(
                "INSERT INTO sub_furniture (furniture_id, item_no, name, image, price, quantity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![furniture_id, item_no, new.name, new.image, new.price, new.quantity],
            )?;

            conn.query_row(
                &format!(
                    "SELECT {} FROM sub_furniture WHERE furniture_id = ?1 AND item_no = ?2",
                    ITEM_COLUMNS
                ),
                params![furniture_id, item_no],
                row_to_item,
            )
            .map_err(StoreError::from)
        })();

        if result.is_err() {
            if let Some(filename) = &new.image {
                self.delete_upload(filename);
            }
        }

        result
    }

    pub fn get_item(&self, furniture_id: i64, item_no: &str) -> StoreResult<SubFurniture> {
        let conn = self.lock()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM sub_furniture WHERE furniture_id = ?1 AND item_no = ?2",
                ITEM_COLUMNS
            ),
            params![furniture_id, item_no],
            row_to_item,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("Item {}", item_no)))
    }

    pub fn update_item(
        &self,
        furniture_id: i64,
        item_no: &str,
        update: ItemUpdate,
    ) -> StoreResult<SubFurniture> {
        let current = self.get_item(furniture_id, item_no)?;

        let conn = self.lock()?;
        conn.execute(
            "UPDATE sub_furniture SET name = ?1, price = ?2, quantity = ?3
             WHERE furniture_id = ?4 AND item_no = ?5",
            params![
                update.name.unwrap_or(current.name),
                update.price.unwrap_or(current.price),
                update.quantity.unwrap_or(current.quantity),
                furniture_id,
                item_no
            ],
        )?;
        drop(conn);

        self.get_item(furniture_id, item_no)
    }

    /// Delete an item and its image file
    pub fn delete_item(&self, furniture_id: i64, item_no: &str) -> StoreResult<()> {
        let item = self.get_item(furniture_id, item_no)?;

        {
            let conn = self.lock()?;
            conn.execute(
                "DELETE FROM sub_furniture WHERE furniture_id = ?1 AND item_no = ?2",
                params![furniture_id, item_no],
            )?;
        }

        if let Some(filename) = item.image {
            self.delete_upload(&filename);
        }

        Ok(())
    }

    /// Every inventory item across all categories, ordered by item number
    pub fn list_all_items(&self) -> StoreResult<Vec<SubFurniture>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM sub_furniture ORDER BY item_no",
            ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}
