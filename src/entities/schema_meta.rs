//! Schema metadata entity - Stores key-value pairs describing the persisted layout.
//! Currently holds the schema fingerprint checked every time the store is opened.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Schema metadata database model - stores key-value pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schema_meta")]
pub struct Model {
    /// Metadata key (e.g., `"schema_fingerprint"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Value stored as string
    pub value: String,
    /// When this entry was last written
    pub updated_at: DateTime,
}

/// `SchemaMeta` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
