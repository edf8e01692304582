use std::fmt;

use abi::{Error, RoomId};
use http::StatusCode;
use serde::{Serialize, Serializer};

/// A booking request turned down, in the shape handed back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub reason: &'static str,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_room: Option<FallbackRoom>,
}

/// The largest free room, offered when no free room is large enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FallbackRoom {
    pub room_id: RoomId,
    pub max_dog_capacity: i32,
}

impl Rejection {
    fn new(status: StatusCode, reason: &'static str, e: &Error) -> Self {
        Self {
            status,
            reason,
            detail: e.to_string(),
            fallback_room: None,
        }
    }
}

fn serialize_status<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

impl From<Error> for Rejection {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidInterval { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_interval", &e)
            }
            Error::InvalidCapacity(_) => Self::new(StatusCode::BAD_REQUEST, "invalid_capacity", &e),
            Error::UnknownClassType(_) => {
                Self::new(StatusCode::NOT_FOUND, "unknown_class_type", &e)
            }
            Error::UnknownRoom(_) => Self::new(StatusCode::NOT_FOUND, "unknown_room", &e),
            Error::UnknownTrainer(_) => Self::new(StatusCode::NOT_FOUND, "unknown_trainer", &e),
            Error::ClassNotFound(_) => Self::new(StatusCode::NOT_FOUND, "class_not_found", &e),
            Error::NoRoomsAvailable => Self::new(StatusCode::CONFLICT, "no_rooms_available", &e),
            Error::RoomUnavailable(_) => Self::new(StatusCode::CONFLICT, "room_unavailable", &e),
            Error::SerializationFailure | Error::BookingContention(_) => {
                Self::new(StatusCode::CONFLICT, "booking_contention", &e)
            }
            Error::RoomTooSmall { .. } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "room_too_small", &e)
            }
            Error::CapacityUnavailable {
                largest_room_id,
                largest_capacity,
            } => Self {
                fallback_room: Some(FallbackRoom {
                    room_id: largest_room_id,
                    max_dog_capacity: largest_capacity,
                }),
                ..Self::new(StatusCode::UNPROCESSABLE_ENTITY, "capacity_unavailable", &e)
            },
            Error::DbError(_) | Error::ConfigReadError | Error::ConfigParseError => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", &e)
            }
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.reason, self.detail)
    }
}

impl std::error::Error for Rejection {}

#[cfg(test)]
mod tests {
    use abi::{BookedInterval, TimeSlot};
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    #[test]
    fn capacity_rejection_should_carry_fallback_room() {
        let rejection: Rejection = Error::CapacityUnavailable {
            largest_room_id: 1,
            largest_capacity: 10,
        }
        .into();
        assert_eq!(rejection.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            rejection.fallback_room,
            Some(FallbackRoom {
                room_id: 1,
                max_dog_capacity: 10
            })
        );
        assert_eq!(
            serde_json::to_value(&rejection).unwrap(),
            serde_json::json!({
                "status": 422,
                "reason": "capacity_unavailable",
                "detail": "No available room is large enough, the largest available room is 1 with capacity 10",
                "fallback_room": { "room_id": 1, "max_dog_capacity": 10 }
            })
        );
    }

    #[test]
    fn availability_conflicts_should_be_client_errors() {
        let booked = BookedInterval {
            class_id: 3,
            room_id: 2,
            slot: TimeSlot {
                date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            },
        };
        for e in [
            Error::NoRoomsAvailable,
            Error::RoomUnavailable(booked),
            Error::BookingContention(3),
        ] {
            let rejection = Rejection::from(e);
            assert_eq!(rejection.status, StatusCode::CONFLICT);
            assert!(rejection.status.is_client_error());
            assert!(rejection.fallback_room.is_none());
        }
    }

    #[test]
    fn invalid_interval_should_be_bad_request() {
        let rejection = Rejection::from(Error::InvalidInterval {
            start: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
            end: NaiveTime::from_hms_opt(1, 30, 0).unwrap(),
        });
        assert_eq!(
            rejection.to_string(),
            "400 invalid_interval: Class end time 01:30:00 must be after its start time 12:30:00"
        );
    }

    #[test]
    fn unknown_entities_should_be_not_found() {
        for e in [
            Error::UnknownClassType(9),
            Error::UnknownRoom(9),
            Error::UnknownTrainer(9),
            Error::ClassNotFound(9),
        ] {
            let rejection = Rejection::from(e);
            assert_eq!(rejection.status, StatusCode::NOT_FOUND);
            assert!(rejection.status.is_client_error());
            assert_eq!(
                serde_json::to_value(&rejection).unwrap()["status"],
                serde_json::json!(404)
            );
        }
    }

    #[test]
    fn store_errors_should_not_be_client_errors() {
        let rejection = Rejection::from(Error::DbError(sqlx::Error::PoolTimedOut));
        assert_eq!(rejection.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(rejection.status.is_server_error());
    }
}
