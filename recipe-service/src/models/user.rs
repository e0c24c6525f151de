use mongodb::bson::{doc, Document};

use super::{project, projection};

/// Fields of the wallet view of a user, besides `_id`.
pub const WALLET_FIELDS: [&str; 2] = ["email", "coins"];

/// A user document: `email` first, then the registration body as sent.
///
/// `coins` and any profile fields are part of `profile` and are stored with
/// whatever type the client used.
pub fn new_user(email: &str, mut profile: Document) -> Document {
    profile.remove("_id");
    profile.remove("email");

    let mut user = doc! { "email": email };
    user.extend(profile);
    user
}

pub fn wallet_projection() -> Document {
    projection(&WALLET_FIELDS)
}

/// `{_id, email, coins}` of a user document.
pub fn wallet_of(user: &Document) -> Document {
    project(user, &WALLET_FIELDS)
}
