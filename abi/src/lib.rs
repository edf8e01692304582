mod config;
mod error;
mod types;

pub use config::*;
pub use error::*;
pub use types::*;

pub type RoomId = i32;
pub type ClassId = i32;
pub type ClassTypeId = i32;
pub type TrainerId = i32;

pub trait Validator {
    fn validate(&self) -> Result<(), Error>;
}
