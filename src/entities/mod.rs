//! Entity module - Contains the SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod movement;

pub use movement::{Column as MovementColumn, Entity as MovementEntity, Model as MovementModel};
