//! MongoStore against a live server. Set MONGODB_URI to override the default
//! local instance.

use mongodb::bson::doc;
use recipe_service::models::{new_recipe, new_user};
use recipe_service::services::{MarketplaceStore, MongoStore};

async fn store() -> MongoStore {
    let uri = std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let database = format!("recipe_house_test_{}", unique_suffix());
    let store = MongoStore::connect(&uri, &database)
        .await
        .expect("Failed to connect to MongoDB");
    store
        .initialize_indexes()
        .await
        .expect("Failed to create indexes");
    store
}

fn unique_suffix() -> String {
    mongodb::bson::oid::ObjectId::new().to_hex()
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn set_reports_modified_only_on_change() {
    let store = store().await;
    let id = store
        .insert_user(new_user("buyer@example.com", doc! { "coins": 100_i64 }))
        .await
        .unwrap();

    let first = store.set_user_fields(id, doc! { "coins": 90_i64 }).await.unwrap();
    assert_eq!((first.matched, first.modified), (1, 1));

    let second = store.set_user_fields(id, doc! { "coins": 90_i64 }).await.unwrap();
    assert_eq!((second.matched, second.modified), (1, 0));

    store.database().drop(None).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn wallet_and_summary_projections() {
    let store = store().await;
    store
        .insert_user(new_user(
            "chef@example.com",
            doc! { "name": "Chef", "coins": 5_i64 },
        ))
        .await
        .unwrap();
    store
        .insert_recipe(new_recipe(doc! {
            "recipeName": "Pho",
            "creatorEmail": "chef@example.com",
            "countryName": "Vietnam",
            "recipeDetails": "Simmer for hours.",
        }))
        .await
        .unwrap();

    let wallet = store
        .find_wallet_by_email("chef@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.get_i64("coins").unwrap(), 5);
    assert!(!wallet.contains_key("name"));

    let summaries = store.list_recipe_summaries().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].get_str("recipeName").unwrap(), "Pho");
    assert!(!summaries[0].contains_key("recipeDetails"));

    store.ping().await.unwrap();
    store.database().drop(None).await.unwrap();
}
