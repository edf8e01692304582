use abi::{Config, RoomQuery};
use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveTime};
use scheduler_service::{find_config_file, SchedulingService};
use tracing::info;

const USAGE: &str = "usage: room-finder <YYYY-MM-DD> <HH:MM> <HH:MM> <class_type_id>";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [date, start, end, class_type_id] = args.as_slice() else {
        bail!(USAGE);
    };
    let query = RoomQuery {
        date: date.parse::<NaiveDate>()?,
        start_time: NaiveTime::parse_from_str(start, "%H:%M")?,
        end_time: NaiveTime::parse_from_str(end, "%H:%M")?,
        class_type_id: class_type_id.parse()?,
    };

    let filename = find_config_file()?;
    info!(config = %filename.display(), "loading config");
    let config = Config::load(&filename)?;
    let service = SchedulingService::from_config(&config).await?;

    match service.find_room(query).await {
        Ok(choice) => {
            println!(
                "room {} ({}) holds {} dogs, {} to spare",
                choice.room.id,
                choice.room.name,
                choice.room.max_dog_capacity,
                choice.spare_capacity()
            );
            Ok(())
        }
        Err(rejection) => {
            if let Some(room) = rejection.fallback_room {
                eprintln!(
                    "largest free room is {} with {} dogs",
                    room.room_id, room.max_dog_capacity
                );
            }
            Err(rejection.into())
        }
    }
}
