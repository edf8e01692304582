mod manager;
pub mod resolver;
mod scope;

use abi::{
    BookingConfig, Class, ClassId, ClassType, ClassTypeId, Error, NewClass, Room, RoomChoice,
    RoomId, TimeSlot,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub use resolver::Snapshot;
pub use scope::BookingScope;

#[derive(Debug, Clone)]
pub struct ScheduleManager {
    pool: PgPool,
    booking: BookingConfig,
}

#[async_trait]
pub trait Schedule {
    /// book a class, picking the best-fit room when none is given
    async fn create_class(&self, new_class: NewClass) -> Result<Class, Error>;
    /// the room a class of this type would get, nothing is booked
    async fn suggest_room(
        &self,
        slot: TimeSlot,
        class_type_id: ClassTypeId,
    ) -> Result<RoomChoice, Error>;
    /// check that a specific room is free for the slot
    async fn validate_room(&self, slot: TimeSlot, room_id: RoomId) -> Result<Room, Error>;
    /// delete a class, freeing its room
    async fn delete_class(&self, id: ClassId) -> Result<Class, Error>;
    /// get a class by id
    async fn get_class(&self, id: ClassId) -> Result<Class, Error>;
    /// classes taking place on a date, ordered by start time
    async fn classes_on(&self, date: NaiveDate) -> Result<Vec<Class>, Error>;
    async fn list_rooms(&self) -> Result<Vec<Room>, Error>;
    async fn list_class_types(&self) -> Result<Vec<ClassType>, Error>;
}
