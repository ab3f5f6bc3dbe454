#![allow(clippy::unwrap_used)]

mod common;

use common::{file_url, line, product};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use storefront::{
    Error, Result, Storefront,
    config::database::FINGERPRINT_KEY,
    entities::{SchemaMeta, schema_meta},
};
use tempfile::TempDir;

#[tokio::test]
async fn data_survives_reopen() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let url = file_url(&dir);

    {
        let store = Storefront::open(&url).await?;
        store.catalog.insert_one(product(1, "Catan", 10.0)).await?;
        store.cart.insert(line(1, 10.0, 2)).await?;
    }

    let store = Storefront::open(&url).await?;
    assert_eq!(store.catalog.get_by_id(1).await?.unwrap().name, "Catan");
    assert_eq!(store.cart.total().await?, Some(20.0));
    Ok(())
}

#[tokio::test]
async fn reopen_with_foreign_fingerprint_fails() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let url = file_url(&dir);

    {
        let db = sea_orm::Database::connect(url.as_str()).await?;
        storefront::config::database::create_tables(&db).await?;
        schema_meta::ActiveModel {
            key: Set(FINGERPRINT_KEY.to_string()),
            value: Set("written-by-an-older-layout".to_string()),
            updated_at: Set(chrono::Utc::now().naive_utc()),
        }
        .insert(&db)
        .await?;
    }

    let result = Storefront::open(&url).await;
    match result {
        Err(Error::SchemaMismatch { expected, found }) => {
            assert_eq!(found, "written-by-an-older-layout");
            assert_ne!(expected, found);
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn first_open_records_fingerprint() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let url = file_url(&dir);
    Storefront::open(&url).await?;

    let db = sea_orm::Database::connect(url.as_str()).await?;
    let stored = SchemaMeta::find_by_id(FINGERPRINT_KEY.to_string())
        .one(&db)
        .await?
        .unwrap();
    assert_eq!(
        stored.value,
        storefront::config::database::schema_fingerprint(&db)
    );
    Ok(())
}
