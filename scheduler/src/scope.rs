use abi::{
    BookedInterval, Class, ClassId, ClassTypeId, Error, NewClass, Room, RoomChoice, RoomId,
    TimeSlot, TrainerId, Validator,
};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;

use crate::resolver;

/// One serializable transaction in which rooms are checked and classes booked.
///
/// A class can only be inserted through [`BookingScope::book`], which runs the
/// room check for the same slot first. The insert becomes visible on
/// [`BookingScope::commit`]; dropping the scope rolls everything back. If a
/// concurrent booking touched the same rows postgres fails one of the two
/// transactions with a serialization error ([`Error::SerializationFailure`]),
/// and the whole scope has to be run again.
pub struct BookingScope {
    tx: Transaction<'static, Postgres>,
}

impl BookingScope {
    pub async fn begin(pool: &PgPool) -> Result<Self, Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        Ok(Self { tx })
    }

    pub async fn commit(self) -> Result<(), Error> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), Error> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// `max_num_dogs` of a class type.
    pub async fn class_type_capacity(&mut self, id: ClassTypeId) -> Result<i32, Error> {
        let row = sqlx::query("SELECT max_num_dogs FROM class_types WHERE class_type_id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        match row {
            Some(row) => Ok(row.get("max_num_dogs")),
            None => Err(Error::UnknownClassType(id)),
        }
    }

    pub async fn room(&mut self, id: RoomId) -> Result<Room, Error> {
        sqlx::query_as::<_, Room>(
            "SELECT room_id, room_name, max_dog_capacity FROM rooms WHERE room_id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(Error::UnknownRoom(id))
    }

    /// Rooms with no class overlapping `slot`, smallest first.
    pub async fn free_rooms(&mut self, slot: &TimeSlot) -> Result<Vec<Room>, Error> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT r.room_id, r.room_name, r.max_dog_capacity
            FROM rooms r
            WHERE NOT EXISTS (
                SELECT 1 FROM classes c
                WHERE c.room_id = r.room_id
                  AND c.date = $1
                  AND c.start_time < $3
                  AND $2 < c.end_time
            )
            ORDER BY r.max_dog_capacity, r.room_id
            "#,
        )
        .bind(slot.date)
        .bind(slot.start)
        .bind(slot.end)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rooms)
    }

    pub async fn find_best_room(
        &mut self,
        slot: &TimeSlot,
        required_capacity: i32,
    ) -> Result<RoomChoice, Error> {
        let free = self.free_rooms(slot).await?;
        debug!(free = free.len(), date = %slot.date, "free rooms for slot");
        resolver::best_fit(free, required_capacity)
    }

    /// Confirm `room_id` exists and has no class overlapping `slot`.
    pub async fn validate_room(&mut self, slot: &TimeSlot, room_id: RoomId) -> Result<Room, Error> {
        let room = self.room(room_id).await?;

        let conflict = sqlx::query_as::<_, BookedInterval>(
            r#"
            SELECT class_id, room_id, date, start_time, end_time
            FROM classes
            WHERE room_id = $1
              AND date = $2
              AND start_time < $4
              AND $3 < end_time
            ORDER BY start_time, class_id
            LIMIT 1
            "#,
        )
        .bind(room_id)
        .bind(slot.date)
        .bind(slot.start)
        .bind(slot.end)
        .fetch_optional(&mut *self.tx)
        .await?;

        match conflict {
            Some(interval) => Err(Error::RoomUnavailable(interval)),
            None => Ok(room),
        }
    }

    /// Check the room for `new_class` and insert it.
    pub async fn book(&mut self, new_class: &NewClass) -> Result<Class, Error> {
        new_class.slot.validate()?;
        self.ensure_trainer(new_class.trainer_id).await?;
        let required = self.class_type_capacity(new_class.class_type_id).await?;

        let room = match new_class.room_id {
            Some(room_id) => {
                let room = self.validate_room(&new_class.slot, room_id).await?;
                if !room.fits(required) {
                    return Err(Error::RoomTooSmall {
                        room_id,
                        capacity: room.max_dog_capacity,
                        required,
                    });
                }
                room
            }
            None => self.find_best_room(&new_class.slot, required).await?.room,
        };

        self.insert_class(new_class, room.id).await
    }

    pub async fn delete_class(&mut self, id: ClassId) -> Result<Class, Error> {
        sqlx::query_as::<_, Class>(
            r#"
            DELETE FROM classes WHERE class_id = $1
            RETURNING class_id, trainer_id, class_type_id, room_id, date, start_time, end_time
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(Error::ClassNotFound(id))
    }

    async fn ensure_trainer(&mut self, id: TrainerId) -> Result<(), Error> {
        let row = sqlx::query("SELECT trainer_id FROM trainers WHERE trainer_id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(|_| ()).ok_or(Error::UnknownTrainer(id))
    }

    async fn insert_class(&mut self, new_class: &NewClass, room_id: RoomId) -> Result<Class, Error> {
        let class = sqlx::query_as::<_, Class>(
            r#"
            INSERT INTO classes (trainer_id, class_type_id, room_id, date, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING class_id, trainer_id, class_type_id, room_id, date, start_time, end_time
            "#,
        )
        .bind(new_class.trainer_id)
        .bind(new_class.class_type_id)
        .bind(room_id)
        .bind(new_class.slot.date)
        .bind(new_class.slot.start)
        .bind(new_class.slot.end)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(class)
    }
}
