#![allow(clippy::unwrap_used, clippy::float_cmp)]

mod common;

use common::{line, memory_store, product};
use storefront::{Error, NewCartLine, Result};

#[tokio::test]
async fn auto_assigned_ids_are_positive_and_unique() -> Result<()> {
    let store = memory_store().await?;

    let ids = store
        .catalog
        .insert_many(vec![
            product(0, "Azul", 1.0),
            product(0, "Brass", 2.0),
            product(10, "Catan", 3.0),
            product(0, "Dixit", 4.0),
        ])
        .await?;
    let single = store.catalog.insert_one(product(0, "Everdell", 5.0)).await?;

    let mut all = ids.clone();
    all.push(single);
    assert!(all.iter().all(|id| *id > 0));
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), 5);
    assert_eq!(ids[2], 10);
    Ok(())
}

#[tokio::test]
async fn listing_is_sorted_for_any_insertion_order() -> Result<()> {
    let store = memory_store().await?;
    for name in ["Wingspan", "Azul", "Pandemic", "Catan", "Root"] {
        store.catalog.insert_one(product(0, name, 1.0)).await?;
    }

    let names: Vec<String> = store
        .catalog
        .list_all()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    Ok(())
}

#[tokio::test]
async fn total_tracks_cart_contents() -> Result<()> {
    let store = memory_store().await?;
    assert_eq!(store.cart.total().await?, None);

    store.cart.insert(line(1, 10.0, 3)).await?;
    assert_eq!(store.cart.total().await?, Some(30.0));

    store.cart.insert(line(2, 5.0, 2)).await?;
    assert_eq!(store.cart.total().await?, Some(40.0));

    store.cart.clear().await?;
    assert_eq!(store.cart.total().await?, None);
    Ok(())
}

#[tokio::test]
async fn set_quantity_without_line_changes_nothing() -> Result<()> {
    let store = memory_store().await?;
    store.cart.insert(line(1, 10.0, 1)).await?;
    let before = store.cart.list_all().await?;

    assert_eq!(store.cart.set_quantity(99, 3).await?, 0);
    assert_eq!(store.cart.list_all().await?, before);
    Ok(())
}

#[tokio::test]
async fn deleting_products_keeps_cart_snapshots() -> Result<()> {
    let store = memory_store().await?;
    let id = store.catalog.insert_one(product(0, "Catan", 29990.0)).await?;
    let catan = store.catalog.get_by_id(id).await?.unwrap();
    store.cart.insert(NewCartLine::from_product(&catan, 2)).await?;

    store.catalog.delete_all().await?;

    assert!(store.catalog.get_by_id(id).await?.is_none());
    let snapshot = store.cart.get_by_product(id).await?.unwrap();
    assert_eq!(snapshot.name, "Catan");
    assert_eq!(snapshot.price, 29990.0);
    assert_eq!(snapshot.image_url, "catan.png");
    assert_eq!(snapshot.quantity, 2);
    assert_eq!(store.cart.total().await?, Some(59980.0));
    Ok(())
}

#[tokio::test]
async fn catalog_edits_do_not_touch_cart_snapshots() -> Result<()> {
    let store = memory_store().await?;
    let id = store.catalog.insert_one(product(0, "Azul", 20.0)).await?;
    let azul = store.catalog.get_by_id(id).await?.unwrap();
    store.cart.add_product(&azul).await?;

    let mut repriced = azul.clone();
    repriced.price = 25.0;
    store.catalog.update(&repriced).await?;

    assert_eq!(store.cart.get_by_product(id).await?.unwrap().price, 20.0);
    Ok(())
}

#[tokio::test]
async fn failed_batch_leaves_catalog_unchanged() -> Result<()> {
    let store = memory_store().await?;
    store
        .catalog
        .insert_many(vec![product(1, "Catan", 1.0), product(2, "Azul", 2.0)])
        .await?;
    let before = store.catalog.list_all().await?;

    let result = store
        .catalog
        .insert_many(vec![
            product(0, "Brass", 3.0),
            product(3, "Dixit", 4.0),
            product(2, "Duplicate", 5.0),
        ])
        .await;

    assert!(matches!(result, Err(Error::ConstraintViolation { .. })));
    assert_eq!(store.catalog.list_all().await?, before);
    Ok(())
}

#[tokio::test]
async fn cart_insert_never_overwrites() -> Result<()> {
    let store = memory_store().await?;
    let mut first = line(1, 10.0, 1);
    first.id = 3;
    store.cart.insert(first).await?;

    let mut clash = line(2, 99.0, 9);
    clash.id = 3;
    let result = store.cart.insert(clash).await;

    assert!(matches!(result, Err(Error::ConstraintViolation { .. })));
    assert_eq!(store.cart.total().await?, Some(10.0));
    Ok(())
}

#[tokio::test]
async fn catalog_upsert_replaces() -> Result<()> {
    let store = memory_store().await?;
    store.catalog.insert_one(product(1, "Catan", 1.0)).await?;
    store.catalog.insert_one(product(1, "Catan Deluxe", 2.0)).await?;

    let stored = store.catalog.get_by_id(1).await?.unwrap();
    assert_eq!(stored.name, "Catan Deluxe");
    assert_eq!(store.catalog.count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn live_total_delivers_one_value_per_update() -> Result<()> {
    let store = memory_store().await?;
    store.cart.insert(line(7, 2.5, 1)).await?;
    let mut total = store.cart.watch_total().await?;
    assert_eq!(total.next().await.unwrap(), Some(2.5));

    for quantity in [2, 3, 4] {
        store.cart.set_quantity(7, quantity).await?;
    }

    let mut seen = Vec::new();
    while let Some(value) = total.try_next() {
        seen.push(value);
    }
    assert_eq!(seen, vec![Some(5.0), Some(7.5), Some(10.0)]);
    Ok(())
}

#[tokio::test]
async fn concurrent_writers_publish_in_commit_order() -> Result<()> {
    let store = memory_store().await?;
    let mut lines = store.cart.watch_lines().await?;
    assert!(lines.next().await.unwrap().is_empty());

    let mut handles = Vec::new();
    for product_id in 1..=8 {
        let cart = store.cart.clone();
        handles.push(tokio::spawn(async move {
            cart.insert(line(product_id, 1.0, 1)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap()?;
    }

    // Each commit adds one line, so in-order delivery means strictly growing lists.
    let mut previous = 0;
    while let Some(snapshot) = lines.try_next() {
        assert_eq!(snapshot.len(), previous + 1);
        previous = snapshot.len();
    }
    assert_eq!(previous, 8);
    Ok(())
}

#[tokio::test]
async fn subscriptions_end_when_store_is_dropped() -> Result<()> {
    let store = memory_store().await?;
    let mut total = store.cart.watch_total().await?;
    drop(store);

    assert_eq!(total.next().await.unwrap(), None);
    assert!(total.next().await.is_none());
    Ok(())
}
