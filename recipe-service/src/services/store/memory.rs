use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{MarketplaceStore, StoreError, UpdateOutcome};
use crate::models::{
    recipe_summary, wallet_of, PAYMENTS_COLLECTION, RECIPES_COLLECTION, USERS_COLLECTION,
};

#[derive(Default)]
struct Collections {
    users: Vec<Document>,
    recipes: Vec<Document>,
    payments: Vec<Document>,
    rejected: HashSet<&'static str>,
}

impl Collections {
    fn check_writable(&self, collection: &'static str) -> Result<(), StoreError> {
        if self.rejected.contains(collection) {
            return Err(StoreError::Unavailable(format!(
                "writes to '{}' are rejected",
                collection
            )));
        }
        Ok(())
    }
}

/// Process-local store with the same update semantics as MongoDB `$set`.
///
/// Backs the test suite and `STORE_BACKEND=memory` local runs. Dotted field
/// paths are stored as literal keys.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write to `collection` fail, to exercise partial-failure paths.
    pub async fn reject_writes_to(&self, collection: &'static str) {
        self.inner.write().await.rejected.insert(collection);
    }

    pub async fn users(&self) -> Vec<Document> {
        self.inner.read().await.users.clone()
    }

    pub async fn recipes(&self) -> Vec<Document> {
        self.inner.read().await.recipes.clone()
    }

    pub async fn payments(&self) -> Vec<Document> {
        self.inner.read().await.payments.clone()
    }
}

fn has_id(document: &Document, id: ObjectId) -> bool {
    document.get_object_id("_id").ok() == Some(id)
}

fn has_email(document: &Document, email: &str) -> bool {
    document.get_str("email").ok() == Some(email)
}

/// Gives the document an `_id` in first position unless it already has one.
fn with_id(document: Document) -> Result<(ObjectId, Document), StoreError> {
    match document.get("_id").cloned() {
        Some(Bson::ObjectId(id)) => Ok((id, document)),
        Some(other) => Err(StoreError::UnexpectedId(other.to_string())),
        None => {
            let id = ObjectId::new();
            let mut stored = doc! { "_id": id };
            stored.extend(document);
            Ok((id, stored))
        }
    }
}

/// Applies `$set` to one document. Returns whether its content changed.
fn apply_set(document: &mut Document, fields: &Document) -> bool {
    let mut changed = false;
    for (key, value) in fields {
        if key == "_id" || document.get(key) == Some(value) {
            continue;
        }
        document.insert(key.clone(), value.clone());
        changed = true;
    }
    changed
}

fn set_on<F>(documents: &mut [Document], matches: F, fields: &Document) -> UpdateOutcome
where
    F: Fn(&Document) -> bool,
{
    match documents.iter_mut().find(|document| matches(document)) {
        Some(document) => UpdateOutcome {
            matched: 1,
            modified: u64::from(apply_set(document, fields)),
        },
        None => UpdateOutcome::default(),
    }
}

#[async_trait]
impl MarketplaceStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Document>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.users.iter().find(|u| has_email(u, email)).cloned())
    }

    async fn find_wallet_by_email(&self, email: &str) -> Result<Option<Document>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .users
            .iter()
            .find(|u| has_email(u, email))
            .map(wallet_of))
    }

    async fn insert_user(&self, user: Document) -> Result<ObjectId, StoreError> {
        let mut guard = self.inner.write().await;
        guard.check_writable(USERS_COLLECTION)?;
        let (id, user) = with_id(user)?;
        guard.users.push(user);
        Ok(id)
    }

    async fn list_recipe_summaries(&self) -> Result<Vec<Document>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.recipes.iter().map(recipe_summary).collect())
    }

    async fn find_recipe(&self, id: ObjectId) -> Result<Option<Document>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.recipes.iter().find(|r| has_id(r, id)).cloned())
    }

    async fn insert_recipe(&self, recipe: Document) -> Result<ObjectId, StoreError> {
        let mut guard = self.inner.write().await;
        guard.check_writable(RECIPES_COLLECTION)?;
        let (id, recipe) = with_id(recipe)?;
        guard.recipes.push(recipe);
        Ok(id)
    }

    async fn set_user_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut guard = self.inner.write().await;
        guard.check_writable(USERS_COLLECTION)?;
        Ok(set_on(&mut guard.users, |u| has_id(u, id), &fields))
    }

    async fn set_recipe_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut guard = self.inner.write().await;
        guard.check_writable(RECIPES_COLLECTION)?;
        Ok(set_on(&mut guard.recipes, |r| has_id(r, id), &fields))
    }

    async fn set_coins_by_email(
        &self,
        email: &str,
        coins: i64,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut guard = self.inner.write().await;
        guard.check_writable(USERS_COLLECTION)?;
        Ok(set_on(
            &mut guard.users,
            |u| has_email(u, email),
            &doc! { "coins": coins },
        ))
    }

    async fn insert_payment(&self, payment: Document) -> Result<ObjectId, StoreError> {
        let mut guard = self.inner.write().await;
        guard.check_writable(PAYMENTS_COLLECTION)?;
        let (id, payment) = with_id(payment)?;
        guard.payments.push(payment);
        Ok(id)
    }
}
