//! Documents stored in the `RecipeHouse` database.
//!
//! The collections are schemaless. Reads hand back raw documents, so whatever a
//! client wrote, values of unexpected types included, is served back as stored.
//! This module only knows the field names the API reasons about and how new
//! documents are assembled.

pub mod payment;
pub mod recipe;
pub mod user;

pub use payment::{payment_receipt, Amount};
pub use recipe::{new_recipe, recipe_summary, summary_projection, SUMMARY_FIELDS};
pub use user::{new_user, wallet_of, wallet_projection, WALLET_FIELDS};

use mongodb::bson::{Bson, Document};

pub const USERS_COLLECTION: &str = "users";
pub const RECIPES_COLLECTION: &str = "recipe";
pub const PAYMENTS_COLLECTION: &str = "payment";

/// Store projection including `fields` (and `_id`, which is always returned).
pub fn projection(fields: &[&str]) -> Document {
    fields
        .iter()
        .map(|field| (field.to_string(), Bson::Int32(1)))
        .collect()
}

/// In-process equivalent of a store projection: `_id` plus whichever of
/// `fields` are present, in document order.
pub fn project(document: &Document, fields: &[&str]) -> Document {
    document
        .iter()
        .filter(|(key, _)| key.as_str() == "_id" || fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
