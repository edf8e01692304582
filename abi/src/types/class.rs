use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::{ClassId, ClassTypeId, Error, RoomId, TimeSlot, TrainerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassType {
    pub id: ClassTypeId,
    pub kind: String,
    pub description: String,
    pub max_num_dogs: i32,
}

/// A room's reserved span for one class, as derived from the `classes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub class_id: ClassId,
    pub room_id: RoomId,
    pub slot: TimeSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub trainer_id: TrainerId,
    pub class_type_id: ClassTypeId,
    pub room_id: RoomId,
    pub slot: TimeSlot,
}

/// A class waiting to be booked. Without a `room_id` the best-fit room is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClass {
    pub trainer_id: TrainerId,
    pub class_type_id: ClassTypeId,
    pub slot: TimeSlot,
    pub room_id: Option<RoomId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub class_type_id: ClassTypeId,
    #[serde(default)]
    pub room_id: Option<RoomId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomQuery {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub class_type_id: ClassTypeId,
}

impl ClassRequest {
    pub fn into_new_class(self, trainer_id: TrainerId) -> Result<NewClass, Error> {
        Ok(NewClass {
            trainer_id,
            class_type_id: self.class_type_id,
            slot: TimeSlot::new(self.date, self.start_time, self.end_time)?,
            room_id: self.room_id,
        })
    }
}

impl RoomQuery {
    pub fn slot(&self) -> Result<TimeSlot, Error> {
        TimeSlot::new(self.date, self.start_time, self.end_time)
    }
}

impl Class {
    pub fn booked_interval(&self) -> BookedInterval {
        BookedInterval {
            class_id: self.id,
            room_id: self.room_id,
            slot: self.slot,
        }
    }
}

fn slot_from_row(row: &PgRow) -> Result<TimeSlot, sqlx::Error> {
    Ok(TimeSlot {
        date: row.try_get("date")?,
        start: row.try_get("start_time")?,
        end: row.try_get("end_time")?,
    })
}

impl FromRow<'_, PgRow> for ClassType {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("class_type_id")?,
            kind: row.try_get("type")?,
            description: row.try_get("description")?,
            max_num_dogs: row.try_get("max_num_dogs")?,
        })
    }
}

impl FromRow<'_, PgRow> for BookedInterval {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            class_id: row.try_get("class_id")?,
            room_id: row.try_get("room_id")?,
            slot: slot_from_row(row)?,
        })
    }
}

impl FromRow<'_, PgRow> for Class {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("class_id")?,
            trainer_id: row.try_get("trainer_id")?,
            class_type_id: row.try_get("class_type_id")?,
            room_id: row.try_get("room_id")?,
            slot: slot_from_row(row)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_request_should_deserialize_without_room() {
        let json = r#"
date: 2024-05-26
start_time: "12:30:00"
end_time: "13:30:00"
class_type_id: 2
"#;
        let request: ClassRequest = serde_yaml::from_str(json).unwrap();
        assert_eq!(request.room_id, None);

        let new_class = request.into_new_class(7).unwrap();
        assert_eq!(new_class.trainer_id, 7);
        assert_eq!(new_class.class_type_id, 2);
        assert_eq!(new_class.slot.start, NaiveTime::from_hms_opt(12, 30, 0).unwrap());
    }

    #[test]
    fn class_request_ending_before_start_should_be_rejected() {
        let request = ClassRequest {
            date: NaiveDate::from_ymd_opt(2024, 5, 26).unwrap(),
            start_time: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(1, 30, 0).unwrap(),
            class_type_id: 0,
            room_id: Some(1),
        };
        assert!(matches!(
            request.into_new_class(0),
            Err(Error::InvalidInterval { .. })
        ));
    }
}
