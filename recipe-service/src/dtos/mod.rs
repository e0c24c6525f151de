//! Request and response bodies.
//!
//! Documents cross the wire as plain JSON: ObjectIds become 24-char hex strings,
//! everything else uses relaxed extended JSON.

use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service_core::error::AppError;
use validator::Validate;

use crate::models::{new_recipe, new_user, Amount};
use crate::services::purchase::{DocumentPatch, PurchaseUpdate};
use crate::services::store::UpdateOutcome;

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Wire form of a stored document.
pub fn to_json(document: &Document) -> Value {
    bson_to_json(Bson::Document(document.clone()))
}

/// Turns client JSON into a document, dropping any `_id` the client supplied.
pub fn json_to_document(mut fields: Map<String, Value>) -> Result<Document, AppError> {
    fields.remove("_id");
    bson::to_document(&fields)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Unsupported field value: {}", e)))
}

pub fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid id: {}", raw)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResponse {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl From<ObjectId> for InsertOneResponse {
    fn from(id: ObjectId) -> Self {
        Self {
            acknowledged: true,
            inserted_id: id.to_hex(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResultResponse {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl From<UpdateOutcome> for UpdateResultResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            acknowledged: true,
            matched_count: outcome.matched,
            modified_count: outcome.modified,
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

// --- auth ---

/// Body of `POST /jwt`. Every field besides `email` becomes a profile claim.
#[derive(Debug, Deserialize, Validate)]
pub struct IssueTokenRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// --- users ---

/// Body of `POST /store-user`. The profile is stored exactly as posted.
#[derive(Debug, Deserialize, Validate)]
pub struct StoreUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl StoreUserRequest {
    pub fn into_document(self) -> Result<Document, AppError> {
        Ok(new_user(&self.email, json_to_document(self.profile)?))
    }
}

// --- recipes ---

/// Body of `POST /recipe-store`: an arbitrary recipe document.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct NewRecipeRequest {
    pub fields: Map<String, Value>,
}

impl NewRecipeRequest {
    pub fn creator_email(&self) -> Option<&str> {
        self.fields.get("creatorEmail").and_then(Value::as_str)
    }

    pub fn into_document(self) -> Result<Document, AppError> {
        Ok(new_recipe(json_to_document(self.fields)?))
    }
}

// --- purchase ---

/// One document of a purchase: its hex `_id` plus the fields to set.
#[derive(Debug, Deserialize)]
pub struct DocumentPatchRequest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DocumentPatchRequest {
    fn into_patch(self) -> Result<DocumentPatch, AppError> {
        let id = parse_object_id(&self.id)?;
        Ok(DocumentPatch::new(id, json_to_document(self.fields)?))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub new_user_data: DocumentPatchRequest,
    pub new_creator_data: DocumentPatchRequest,
    pub new_recipe_data: DocumentPatchRequest,
}

impl UpdateRecipeRequest {
    /// Validates all three ids up front so that a bad one fails before any write.
    pub fn into_update(self) -> Result<PurchaseUpdate, AppError> {
        Ok(PurchaseUpdate {
            buyer: self.new_user_data.into_patch()?,
            creator: self.new_creator_data.into_patch()?,
            recipe: self.new_recipe_data.into_patch()?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub message: String,
    pub update_user_res: UpdateResultResponse,
    pub update_creator_res: UpdateResultResponse,
    pub update_recipe_res: UpdateResultResponse,
}

// --- payments ---

#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub price: Amount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecretResponse {
    pub client_secret: String,
}

/// Body of `POST /payment`: the buyer's email plus the receipt the client
/// posted, `amount` included.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl RecordPaymentRequest {
    pub fn amount(&self) -> Option<Amount> {
        Amount::from_json(self.body.get("amount"))
    }

    /// Receipt fields, minus the ones the server writes itself.
    pub fn body_document(&self) -> Result<Document, AppError> {
        let mut body = self.body.clone();
        body.remove("creditedCoins");
        body.remove("createdAt");
        json_to_document(body)
    }
}
