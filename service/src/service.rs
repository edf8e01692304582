use abi::{Class, ClassId, ClassRequest, Config, Room, RoomChoice, RoomQuery, TrainerId};
use chrono::NaiveDate;
use scheduler::{Schedule, ScheduleManager};
use tracing::{info, warn};

use crate::{Rejection, SchedulingService};

impl SchedulingService {
    pub fn new(manager: ScheduleManager) -> Self {
        Self { manager }
    }

    pub async fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        Ok(Self {
            manager: ScheduleManager::from_config(config).await?,
        })
    }

    /// add a class to a trainer's schedule
    ///
    /// Without a room in the request the smallest free room that holds the
    /// class type is booked; with one, that room must be free.
    pub async fn create_class(
        &self,
        trainer_id: TrainerId,
        request: ClassRequest,
    ) -> Result<Class, Rejection> {
        let new_class = request.into_new_class(trainer_id).map_err(reject)?;
        let class = self.manager.create_class(new_class).await.map_err(reject)?;
        info!(class_id = class.id, trainer_id, "class added");
        Ok(class)
    }

    /// the room a class would get, without booking it
    pub async fn find_room(&self, query: RoomQuery) -> Result<RoomChoice, Rejection> {
        let slot = query.slot().map_err(reject)?;
        self.manager
            .suggest_room(slot, query.class_type_id)
            .await
            .map_err(reject)
    }

    pub async fn cancel_class(&self, id: ClassId) -> Result<Class, Rejection> {
        self.manager.delete_class(id).await.map_err(reject)
    }

    pub async fn classes_on(&self, date: NaiveDate) -> Result<Vec<Class>, Rejection> {
        self.manager.classes_on(date).await.map_err(reject)
    }

    pub async fn rooms(&self) -> Result<Vec<Room>, Rejection> {
        self.manager.list_rooms().await.map_err(reject)
    }
}

fn reject(e: abi::Error) -> Rejection {
    let rejection = Rejection::from(e);
    if rejection.status.is_client_error() {
        info!(status = rejection.status.as_u16(), reason = rejection.reason, "request rejected");
    } else {
        warn!(%rejection, "request failed");
    }
    rejection
}
