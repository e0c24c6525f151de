//! Recipe purchase: three `$set` updates applied one after another.
//!
//! The buyer (new balance, purchase list), the creator (earned coins) and the
//! recipe (buyer list, watch count) are updated in that order without a
//! transaction. A failure or a no-op leaves the earlier writes in place.

use mongodb::bson::{oid::ObjectId, Document};

use super::store::{MarketplaceStore, StoreError, UpdateOutcome};

/// Fields to `$set` on one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPatch {
    pub id: ObjectId,
    pub fields: Document,
}

impl DocumentPatch {
    pub fn new(id: ObjectId, mut fields: Document) -> Self {
        fields.remove("_id");
        Self { id, fields }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseUpdate {
    pub buyer: DocumentPatch,
    pub creator: DocumentPatch,
    pub recipe: DocumentPatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseOutcome {
    pub buyer: UpdateOutcome,
    pub creator: UpdateOutcome,
    pub recipe: UpdateOutcome,
}

impl PurchaseOutcome {
    /// True only when every one of the three documents changed.
    pub fn fully_applied(&self) -> bool {
        self.buyer.modified_any() && self.creator.modified_any() && self.recipe.modified_any()
    }

    pub fn partially_applied(&self) -> bool {
        !self.fully_applied()
            && (self.buyer.modified_any()
                || self.creator.modified_any()
                || self.recipe.modified_any())
    }
}

pub async fn apply_purchase(
    store: &dyn MarketplaceStore,
    update: PurchaseUpdate,
) -> Result<PurchaseOutcome, StoreError> {
    let buyer = store
        .set_user_fields(update.buyer.id, update.buyer.fields)
        .await?;
    let creator = store
        .set_user_fields(update.creator.id, update.creator.fields)
        .await?;
    let recipe = store
        .set_recipe_fields(update.recipe.id, update.recipe.fields)
        .await?;

    Ok(PurchaseOutcome {
        buyer,
        creator,
        recipe,
    })
}
