use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOneOptions, FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

use super::{inserted_object_id, MarketplaceStore, StoreError, UpdateOutcome};
use crate::models::{
    summary_projection, wallet_projection, PAYMENTS_COLLECTION, RECIPES_COLLECTION,
    USERS_COLLECTION,
};

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn users(&self) -> Collection<Document> {
        self.db.collection(USERS_COLLECTION)
    }

    pub fn recipes(&self) -> Collection<Document> {
        self.db.collection(RECIPES_COLLECTION)
    }

    pub fn payments(&self) -> Collection<Document> {
        self.db.collection(PAYMENTS_COLLECTION)
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for recipe-service");

        let user_email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_email_lookup".to_string())
                    .build(),
            )
            .build();
        self.users()
            .create_index(user_email_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create email index on users collection: {}", e);
                AppError::from(e)
            })?;

        let creator_index = IndexModel::builder()
            .keys(doc! { "creatorEmail": 1 })
            .options(
                IndexOptions::builder()
                    .name("recipe_creator_lookup".to_string())
                    .build(),
            )
            .build();
        self.recipes()
            .create_index(creator_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create creator index on recipe collection: {}", e);
                AppError::from(e)
            })?;

        let payer_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("payment_email_lookup".to_string())
                    .build(),
            )
            .build();
        self.payments()
            .create_index(payer_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create email index on payment collection: {}", e);
                AppError::from(e)
            })?;

        tracing::info!("MongoDB indexes initialized");
        Ok(())
    }

    async fn set_fields<T>(
        &self,
        collection: Collection<T>,
        filter: Document,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError>
    where
        T: Send + Sync,
    {
        if fields.is_empty() {
            let matched = collection.count_documents(filter, None).await?;
            return Ok(UpdateOutcome {
                matched,
                modified: 0,
            });
        }

        let result = collection
            .update_one(filter, doc! { "$set": fields }, None)
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }
}

#[async_trait]
impl MarketplaceStore for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    async fn find_wallet_by_email(&self, email: &str) -> Result<Option<Document>, StoreError> {
        let options = FindOneOptions::builder()
            .projection(wallet_projection())
            .build();
        Ok(self
            .users()
            .find_one(doc! { "email": email }, options)
            .await?)
    }

    async fn insert_user(&self, user: Document) -> Result<ObjectId, StoreError> {
        let result = self.users().insert_one(user, None).await?;
        inserted_object_id(result.inserted_id)
    }

    async fn list_recipe_summaries(&self) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder()
            .projection(summary_projection())
            .build();
        let cursor = self
            .recipes()
            .find(doc! {}, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_recipe(&self, id: ObjectId) -> Result<Option<Document>, StoreError> {
        Ok(self.recipes().find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert_recipe(&self, recipe: Document) -> Result<ObjectId, StoreError> {
        let result = self.recipes().insert_one(recipe, None).await?;
        inserted_object_id(result.inserted_id)
    }

    async fn set_user_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.set_fields(self.users(), doc! { "_id": id }, fields)
            .await
    }

    async fn set_recipe_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.set_fields(self.recipes(), doc! { "_id": id }, fields)
            .await
    }

    async fn set_coins_by_email(
        &self,
        email: &str,
        coins: i64,
    ) -> Result<UpdateOutcome, StoreError> {
        self.set_fields(
            self.users(),
            doc! { "email": email },
            doc! { "coins": coins },
        )
        .await
    }

    async fn insert_payment(&self, payment: Document) -> Result<ObjectId, StoreError> {
        let result = self.payments().insert_one(payment, None).await?;
        inserted_object_id(result.inserted_id)
    }
}
