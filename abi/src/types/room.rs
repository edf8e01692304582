use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::RoomId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub max_dog_capacity: i32,
}

/// The room picked for a class and the capacity it was picked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomChoice {
    pub room: Room,
    pub required_capacity: i32,
}

impl Room {
    pub fn new(id: RoomId, name: impl Into<String>, max_dog_capacity: i32) -> Self {
        Self {
            id,
            name: name.into(),
            max_dog_capacity,
        }
    }

    pub fn fits(&self, required_capacity: i32) -> bool {
        self.max_dog_capacity >= required_capacity
    }
}

impl RoomChoice {
    pub fn spare_capacity(&self) -> i32 {
        self.room.max_dog_capacity - self.required_capacity
    }
}

impl FromRow<'_, PgRow> for Room {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let name: Option<String> = row.try_get("room_name")?;
        Ok(Self {
            id: row.try_get("room_id")?,
            name: name.unwrap_or_default(),
            max_dog_capacity: row.try_get("max_dog_capacity")?,
        })
    }
}
