use std::future::Future;

use abi::{
    BookingConfig, Class, ClassId, ClassType, ClassTypeId, Config, Error, NewClass, Room,
    RoomChoice, RoomId, TimeSlot, Validator,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::{BookingScope, Schedule, ScheduleManager};

#[async_trait]
impl Schedule for ScheduleManager {
    async fn create_class(&self, new_class: NewClass) -> Result<Class, Error> {
        new_class.slot.validate()?;

        let new_class = &new_class;
        let class = with_retries(self.booking.max_attempts, "create_class", move || {
            self.try_book(new_class)
        })
        .await?;
        info!(
            class_id = class.id,
            room_id = class.room_id,
            date = %class.slot.date,
            "class booked"
        );
        Ok(class)
    }

    async fn suggest_room(
        &self,
        slot: TimeSlot,
        class_type_id: ClassTypeId,
    ) -> Result<RoomChoice, Error> {
        slot.validate()?;
        let mut scope = BookingScope::begin(&self.pool).await?;
        let required = scope.class_type_capacity(class_type_id).await?;
        let choice = scope.find_best_room(&slot, required).await;
        scope.rollback().await?;
        choice
    }

    async fn validate_room(&self, slot: TimeSlot, room_id: RoomId) -> Result<Room, Error> {
        slot.validate()?;
        let mut scope = BookingScope::begin(&self.pool).await?;
        let room = scope.validate_room(&slot, room_id).await;
        scope.rollback().await?;
        room
    }

    async fn delete_class(&self, id: ClassId) -> Result<Class, Error> {
        let class = with_retries(self.booking.max_attempts, "delete_class", move || {
            self.try_delete(id)
        })
        .await?;
        info!(class_id = id, room_id = class.room_id, "class deleted");
        Ok(class)
    }

    async fn get_class(&self, id: ClassId) -> Result<Class, Error> {
        sqlx::query_as::<_, Class>(
            r#"
            SELECT class_id, trainer_id, class_type_id, room_id, date, start_time, end_time
            FROM classes WHERE class_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::ClassNotFound(id))
    }

    async fn classes_on(&self, date: NaiveDate) -> Result<Vec<Class>, Error> {
        let classes = sqlx::query_as::<_, Class>(
            r#"
            SELECT class_id, trainer_id, class_type_id, room_id, date, start_time, end_time
            FROM classes WHERE date = $1
            ORDER BY start_time, class_id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(classes)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, Error> {
        let rooms = sqlx::query_as::<_, Room>(
            "SELECT room_id, room_name, max_dog_capacity FROM rooms ORDER BY room_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rooms)
    }

    async fn list_class_types(&self) -> Result<Vec<ClassType>, Error> {
        let types = sqlx::query_as::<_, ClassType>(
            "SELECT class_type_id, type, description, max_num_dogs FROM class_types ORDER BY class_type_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(types)
    }
}

impl ScheduleManager {
    pub fn new(pool: PgPool) -> Self {
        Self::with_booking(pool, BookingConfig::default())
    }

    pub fn with_booking(pool: PgPool, booking: BookingConfig) -> Self {
        Self { pool, booking }
    }

    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db.max_connections)
            .connect(&config.db.url())
            .await?;
        Ok(Self::with_booking(pool, config.booking.clone()))
    }

    async fn try_book(&self, new_class: &NewClass) -> Result<Class, Error> {
        let mut scope = BookingScope::begin(&self.pool).await?;
        let class = scope.book(new_class).await?;
        scope.commit().await?;
        Ok(class)
    }

    async fn try_delete(&self, id: ClassId) -> Result<Class, Error> {
        let mut scope = BookingScope::begin(&self.pool).await?;
        let class = scope.delete_class(id).await?;
        scope.commit().await?;
        Ok(class)
    }
}

/// Runs `op` until it succeeds, fails for a reason other than a serialization
/// failure, or has been tried `max_attempts` times.
async fn with_retries<T, F, Fut>(
    max_attempts: u32,
    operation: &str,
    mut op: F,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Err(e) if e.is_retryable() => {
                if attempt >= max_attempts {
                    warn!(attempt, operation, "giving up after serialization failures");
                    return Err(Error::BookingContention(attempt));
                }
                warn!(attempt, operation, "lost a serialization race, retrying");
            }
            result => return result,
        }
    }
}
