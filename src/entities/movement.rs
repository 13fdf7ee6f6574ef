//! Movement entity - Represents a single dated income or expense entry.
//!
//! Column names are upper case (`ID`, `CONCEPT`, `AMOUNT`, `DATE`) to match the
//! on-disk layout of existing wallet files. `DATE` holds epoch milliseconds.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Movement database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "MOVEMENT")]
pub struct Model {
    /// Unique identifier assigned by the database
    #[sea_orm(primary_key, column_name = "ID")]
    pub id: i64,
    /// Short label, 1 to 25 characters
    #[sea_orm(column_name = "CONCEPT")]
    pub concept: String,
    /// Signed amount (positive for income, negative for expenses)
    #[sea_orm(column_name = "AMOUNT")]
    pub amount: f64,
    /// Calendar date as epoch milliseconds
    #[sea_orm(column_name = "DATE")]
    pub date: i64,
}

/// Movements have no relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
