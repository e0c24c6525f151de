//! Document store seam.
//!
//! Handlers talk to [`MarketplaceStore`]; production wires in [`MongoStore`],
//! tests and database-less local runs use [`InMemoryStore`]. Documents go in and
//! come out untyped.

mod memory;
mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Store returned a non-ObjectId identifier: {0}")]
    UnexpectedId(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

/// Result of a `$set` update.
///
/// `modified` only counts documents whose content actually changed, so
/// writing a value that is already stored matches without modifying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

impl UpdateOutcome {
    pub fn modified_any(&self) -> bool {
        self.modified > 0
    }
}

#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Round-trip to the store.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Document>, StoreError>;

    /// `{_id, email, coins}` of the user with this email.
    async fn find_wallet_by_email(&self, email: &str) -> Result<Option<Document>, StoreError>;

    async fn insert_user(&self, user: Document) -> Result<ObjectId, StoreError>;

    /// Every recipe, projected to its summary fields, in natural order.
    async fn list_recipe_summaries(&self) -> Result<Vec<Document>, StoreError>;

    async fn find_recipe(&self, id: ObjectId) -> Result<Option<Document>, StoreError>;

    async fn insert_recipe(&self, recipe: Document) -> Result<ObjectId, StoreError>;

    /// `$set` the given fields on one user. `fields` must not contain `_id`.
    async fn set_user_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError>;

    /// `$set` the given fields on one recipe. `fields` must not contain `_id`.
    async fn set_recipe_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Overwrites the wallet balance of the first user with this email.
    async fn set_coins_by_email(&self, email: &str, coins: i64)
        -> Result<UpdateOutcome, StoreError>;

    async fn insert_payment(&self, payment: Document) -> Result<ObjectId, StoreError>;
}

pub(crate) fn inserted_object_id(id: Bson) -> Result<ObjectId, StoreError> {
    match id {
        Bson::ObjectId(oid) => Ok(oid),
        other => Err(StoreError::UnexpectedId(other.to_string())),
    }
}
