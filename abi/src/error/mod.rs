use chrono::NaiveTime;
use sqlx::postgres::PgDatabaseError;
use thiserror::Error;

use crate::{BookedInterval, ClassId, ClassTypeId, RoomId, TrainerId};

/// SQLSTATE raised by postgres when a serializable transaction loses a race.
const SERIALIZATION_FAILURE: &str = "40001";

#[derive(Error, Debug)]
pub enum Error {
    #[error("sqlx error: {0}")]
    DbError(sqlx::Error),

    #[error("Failed to read configuration file")]
    ConfigReadError,

    #[error("Failed to parse configuration file")]
    ConfigParseError,

    #[error("Class end time {end} must be after its start time {start}")]
    InvalidInterval { start: NaiveTime, end: NaiveTime },

    #[error("Required capacity must be positive, got {0}")]
    InvalidCapacity(i32),

    #[error("Unknown class type {0}")]
    UnknownClassType(ClassTypeId),

    #[error("Unknown room {0}")]
    UnknownRoom(RoomId),

    #[error("Unknown trainer {0}")]
    UnknownTrainer(TrainerId),

    #[error("Class {0} not found")]
    ClassNotFound(ClassId),

    #[error("No rooms are available for the requested time")]
    NoRoomsAvailable,

    #[error("No available room is large enough, the largest available room is {largest_room_id} with capacity {largest_capacity}")]
    CapacityUnavailable {
        largest_room_id: RoomId,
        largest_capacity: i32,
    },

    #[error(
        "Room {} is already booked on {} from {} to {} by class {}",
        .0.room_id, .0.slot.date, .0.slot.start, .0.slot.end, .0.class_id
    )]
    RoomUnavailable(BookedInterval),

    #[error("Room {room_id} holds {capacity} dogs but the class needs {required}")]
    RoomTooSmall {
        room_id: RoomId,
        capacity: i32,
        required: i32,
    },

    #[error("Booking transaction could not be serialized")]
    SerializationFailure,

    #[error("Booking abandoned after {0} attempts lost to concurrent bookings")]
    BookingContention(u32),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // sqlx errors carry no equality, compare by variant only
            (Self::DbError(_), Self::DbError(_)) => true,
            (Self::ConfigReadError, Self::ConfigReadError) => true,
            (Self::ConfigParseError, Self::ConfigParseError) => true,
            (
                Self::InvalidInterval { start: s1, end: e1 },
                Self::InvalidInterval { start: s2, end: e2 },
            ) => s1 == s2 && e1 == e2,
            (Self::InvalidCapacity(v1), Self::InvalidCapacity(v2)) => v1 == v2,
            (Self::UnknownClassType(v1), Self::UnknownClassType(v2)) => v1 == v2,
            (Self::UnknownRoom(v1), Self::UnknownRoom(v2)) => v1 == v2,
            (Self::UnknownTrainer(v1), Self::UnknownTrainer(v2)) => v1 == v2,
            (Self::ClassNotFound(v1), Self::ClassNotFound(v2)) => v1 == v2,
            (Self::NoRoomsAvailable, Self::NoRoomsAvailable) => true,
            (
                Self::CapacityUnavailable {
                    largest_room_id: r1,
                    largest_capacity: c1,
                },
                Self::CapacityUnavailable {
                    largest_room_id: r2,
                    largest_capacity: c2,
                },
            ) => r1 == r2 && c1 == c2,
            (Self::RoomUnavailable(v1), Self::RoomUnavailable(v2)) => v1 == v2,
            (
                Self::RoomTooSmall {
                    room_id: r1,
                    capacity: c1,
                    required: q1,
                },
                Self::RoomTooSmall {
                    room_id: r2,
                    capacity: c2,
                    required: q2,
                },
            ) => r1 == r2 && c1 == c2 && q1 == q2,
            (Self::SerializationFailure, Self::SerializationFailure) => true,
            (Self::BookingContention(v1), Self::BookingContention(v2)) => v1 == v2,
            _ => false,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(e) => {
                let err: &PgDatabaseError = e.downcast_ref();
                match err.code() {
                    SERIALIZATION_FAILURE => Error::SerializationFailure,
                    _ => Error::DbError(sqlx::Error::Database(e)),
                }
            }
            _ => Error::DbError(e),
        }
    }
}

impl Error {
    /// Whether the failed transaction can simply be run again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::SerializationFailure)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::TimeSlot;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn capacity_error_should_name_fallback_room() {
        let err = Error::CapacityUnavailable {
            largest_room_id: 4,
            largest_capacity: 10,
        };
        assert_eq!(
            err.to_string(),
            "No available room is large enough, the largest available room is 4 with capacity 10"
        );
    }

    #[test]
    fn room_unavailable_should_describe_conflict() {
        let booked = BookedInterval {
            class_id: 17,
            room_id: 2,
            slot: TimeSlot {
                date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
                start: t(9, 0),
                end: t(11, 0),
            },
        };
        assert_eq!(
            Error::RoomUnavailable(booked).to_string(),
            "Room 2 is already booked on 2023-12-01 from 09:00:00 to 11:00:00 by class 17"
        );
    }

    #[test]
    fn only_serialization_failures_should_retry() {
        assert!(Error::SerializationFailure.is_retryable());
        assert!(!Error::NoRoomsAvailable.is_retryable());
        assert!(!Error::DbError(sqlx::Error::RowNotFound).is_retryable());
    }

    #[test]
    fn non_database_sqlx_errors_should_wrap() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err, Error::DbError(sqlx::Error::PoolClosed));
    }
}
