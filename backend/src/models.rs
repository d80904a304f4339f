//! Row types for the `breeds` and `kittens` tables and their mapping to the
//! wire types in `shared`.

use std::fmt;

use chrono::{DateTime, Utc};
use shared::{CreateKittenRequest, UpdateKittenRequest};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

/// A row of the `breeds` table
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BreedRow {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for BreedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Breed({}) {}>", self.id, self.name)
    }
}

impl From<BreedRow> for shared::Breed {
    fn from(row: BreedRow) -> Self {
        shared::Breed {
            id: row.id,
            name: row.name,
        }
    }
}

/// A row of the `kittens` table joined with its breed
#[derive(Debug, Clone, PartialEq)]
pub struct KittenRow {
    pub id: i64,
    pub color: String,
    pub age: i32,
    pub description: Option<String>,
    pub breed_id: i64,
    pub breed: BreedRow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Expects the column aliases produced by `session::KITTEN_SELECT`.
impl<'r> FromRow<'r, SqliteRow> for KittenRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let breed_id: i64 = row.try_get("breed_id")?;
        Ok(Self {
            id: row.try_get("id")?,
            color: row.try_get("color")?,
            age: row.try_get("age")?,
            description: row.try_get("description")?,
            breed_id,
            breed: BreedRow {
                id: breed_id,
                name: row.try_get("breed_name")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl fmt::Display for KittenRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Kitten({}), color:{}, age:{}, breed_id:{}>",
            self.id, self.color, self.age, self.breed_id
        )
    }
}

impl From<KittenRow> for shared::Kitten {
    fn from(row: KittenRow) -> Self {
        shared::Kitten {
            color: row.color,
            age: row.age,
            description: row.description,
            id: row.id,
            breed: row.breed.into(),
        }
    }
}

/// Fields supplied by the caller when inserting a kitten
#[derive(Debug, Clone, PartialEq)]
pub struct NewKitten {
    pub color: String,
    pub age: i32,
    pub description: Option<String>,
    pub breed_id: i64,
}

impl From<CreateKittenRequest> for NewKitten {
    fn from(request: CreateKittenRequest) -> Self {
        Self {
            color: request.color,
            age: request.age,
            description: request.description,
            breed_id: request.breed_id,
        }
    }
}

/// A partial update: `None` means "leave unchanged"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KittenChanges {
    pub color: Option<String>,
    pub age: Option<i32>,
    pub description: Option<String>,
    pub breed_id: Option<i64>,
}

impl KittenChanges {
    /// Overwrite the fields of `kitten` that are present in this change set.
    ///
    /// When the breed changes the embedded breed name is stale until the row
    /// is read back.
    pub fn apply_to(self, kitten: &mut KittenRow) {
        if let Some(color) = self.color {
            kitten.color = color;
        }
        if let Some(age) = self.age {
            kitten.age = age;
        }
        if let Some(description) = self.description {
            kitten.description = Some(description);
        }
        if let Some(breed_id) = self.breed_id {
            kitten.breed_id = breed_id;
            kitten.breed.id = breed_id;
        }
    }
}

impl From<UpdateKittenRequest> for KittenChanges {
    fn from(request: UpdateKittenRequest) -> Self {
        Self {
            color: request.color,
            age: request.age,
            description: request.description,
            breed_id: request.breed_id,
        }
    }
}
