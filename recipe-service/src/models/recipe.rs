use mongodb::bson::{Bson, Document};

use super::{project, projection};

pub const CREATOR_EMAIL: &str = "creatorEmail";
pub const PURCHASED_BY: &str = "purchasedBy";
pub const WATCH_COUNT: &str = "watchCount";

/// Fields of the listing served by `GET /get-recipe`, besides `_id`.
pub const SUMMARY_FIELDS: [&str; 6] = [
    "recipeName",
    "recipeImage",
    PURCHASED_BY,
    CREATOR_EMAIL,
    "countryName",
    WATCH_COUNT,
];

/// A recipe document as published: the body verbatim, with an empty buyer list
/// and a zero watch count when the creator did not send them.
pub fn new_recipe(mut fields: Document) -> Document {
    fields.remove("_id");
    if !fields.contains_key(PURCHASED_BY) {
        fields.insert(PURCHASED_BY, Bson::Array(Vec::new()));
    }
    if !fields.contains_key(WATCH_COUNT) {
        fields.insert(WATCH_COUNT, Bson::Int32(0));
    }
    fields
}

pub fn summary_projection() -> Document {
    projection(&SUMMARY_FIELDS)
}

pub fn recipe_summary(recipe: &Document) -> Document {
    project(recipe, &SUMMARY_FIELDS)
}
