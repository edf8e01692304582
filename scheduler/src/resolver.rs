//! Room availability over a set of booked intervals.
//!
//! The store-backed path in [`crate::BookingScope`] filters free rooms in SQL
//! and hands them to [`best_fit`]; [`Snapshot`] answers the same questions
//! from intervals already held in memory.

use std::cmp::Reverse;

use abi::{BookedInterval, Error, Room, RoomChoice, RoomId, TimeSlot};

/// Pick the smallest free room holding at least `required_capacity` dogs.
///
/// Ties on capacity go to the lowest room id. When no free room is large
/// enough the error names the largest free room so callers can offer it.
pub fn best_fit(mut free: Vec<Room>, required_capacity: i32) -> Result<RoomChoice, Error> {
    if required_capacity <= 0 {
        return Err(Error::InvalidCapacity(required_capacity));
    }

    free.sort_by_key(|room| (room.max_dog_capacity, room.id));

    if let Some(pos) = free.iter().position(|room| room.fits(required_capacity)) {
        return Ok(RoomChoice {
            room: free.swap_remove(pos),
            required_capacity,
        });
    }

    match free
        .iter()
        .max_by_key(|room| (room.max_dog_capacity, Reverse(room.id)))
    {
        Some(largest) => Err(Error::CapacityUnavailable {
            largest_room_id: largest.id,
            largest_capacity: largest.max_dog_capacity,
        }),
        None => Err(Error::NoRoomsAvailable),
    }
}

/// The earliest booking of `room_id` that overlaps `slot`, if any.
pub fn first_conflict<'a>(
    booked: impl IntoIterator<Item = &'a BookedInterval>,
    room_id: RoomId,
    slot: &TimeSlot,
) -> Option<&'a BookedInterval> {
    booked
        .into_iter()
        .filter(|interval| interval.room_id == room_id && interval.slot.overlaps(slot))
        .min_by_key(|interval| (interval.slot.start, interval.class_id))
}

/// Rooms and their bookings captured at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    rooms: Vec<Room>,
    booked: Vec<BookedInterval>,
}

impl Snapshot {
    pub fn new(rooms: Vec<Room>, booked: Vec<BookedInterval>) -> Self {
        Self { rooms, booked }
    }

    pub fn free_rooms(&self, slot: &TimeSlot) -> Vec<Room> {
        self.rooms
            .iter()
            .filter(|room| first_conflict(&self.booked, room.id, slot).is_none())
            .cloned()
            .collect()
    }

    pub fn find_best_room(
        &self,
        slot: &TimeSlot,
        required_capacity: i32,
    ) -> Result<RoomChoice, Error> {
        best_fit(self.free_rooms(slot), required_capacity)
    }

    pub fn validate_room(&self, slot: &TimeSlot, room_id: RoomId) -> Result<&Room, Error> {
        let room = self
            .rooms
            .iter()
            .find(|room| room.id == room_id)
            .ok_or(Error::UnknownRoom(room_id))?;

        match first_conflict(&self.booked, room_id, slot) {
            Some(interval) => Err(Error::RoomUnavailable(interval.clone())),
            None => Ok(room),
        }
    }
}
