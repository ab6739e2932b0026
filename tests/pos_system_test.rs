mod common;

use common::{eventually, FakeServer};
use pos_sync::framework::{StoreEntity, SyncOutcome};
use pos_sync::lifecycle::{setup_tracing, PosSystem, SyncConfig};
use pos_sync::model::*;
use pos_sync::registry::{DispatchOutcome, RegistryError, ResourceKind, SyncMessage};
use std::sync::Arc;

fn terminal(server: &FakeServer) -> PosSystem {
    PosSystem::new(SyncConfig::default(), server.backend()).expect("stores register")
}

/// Two terminals against one server: a change made on one shows up on the other through the
/// broadcast stream alone.
#[tokio::test]
async fn test_changes_propagate_between_terminals() {
    setup_tracing();
    let server = FakeServer::start();
    let front = terminal(&server);
    let bar = terminal(&server);
    let front_link = server.connect(&front);
    let bar_link = server.connect(&bar);
    front.tables.fetch_all(false).await;
    bar.tables.fetch_all(false).await;

    let table = front
        .tables
        .create(DiningTableCreate {
            zone_id: ZoneId(1),
            name: "T1".to_string(),
            seats: 4,
        })
        .await
        .expect("create table");
    eventually("bar sees the new table", || bar.tables.contains(&table.id)).await;

    front
        .tables
        .update(
            table.id.clone(),
            DiningTableUpdate {
                seats: Some(6),
                ..Default::default()
            },
        )
        .await
        .expect("update table");
    eventually("bar sees the update", || {
        bar.tables.get_by_id(&table.id).map(|t| t.seats) == Some(6)
    })
    .await;

    front.tables.remove(table.id.clone()).await.expect("remove table");
    eventually("bar sees the removal", || bar.tables.is_empty()).await;
    eventually("front applied its own broadcasts", || front.tables.last_version() == 3).await;

    assert_eq!(bar.tables.last_version(), 3);
    assert!(front.tables.is_empty(), "own create was not duplicated by its broadcast");

    front_link.abort();
    bar_link.abort();
    let _ = front_link.await;
    let _ = bar_link.await;
    front.shutdown().await.unwrap();
    bar.shutdown().await.unwrap();
}

/// A terminal that missed a broadcast reloads the whole collection instead of applying the
/// next message.
#[tokio::test]
async fn test_missed_broadcast_triggers_full_reload() {
    let server = FakeServer::with_products(vec![Product::new(
        ProductId(1),
        "Espresso",
        CategoryId(1),
        2.0,
    )]);
    let writer = terminal(&server);
    let reader = terminal(&server);
    let mut broadcasts = server.subscribe();
    reader.products.fetch_all(false).await;

    for (name, price) in [("Latte", 3.5), ("Mocha", 4.0), ("Tea", 2.5)] {
        writer
            .products
            .create(ProductCreate {
                name: name.to_string(),
                category_id: CategoryId(1),
                price,
            })
            .await
            .unwrap();
    }
    let first = broadcasts.recv().await.unwrap();
    let _lost = broadcasts.recv().await.unwrap();
    let third = broadcasts.recv().await.unwrap();

    let registry = reader.registry();
    assert_eq!(
        registry.dispatch_message(first),
        DispatchOutcome::Delivered(SyncOutcome::Applied)
    );
    assert_eq!(
        registry.dispatch_message(third),
        DispatchOutcome::Delivered(SyncOutcome::Gap { refreshing: true })
    );
    reader.products.wait_for_fetch().await;

    let names: Vec<_> = reader.products.items().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Espresso", "Latte", "Mocha", "Tea"]);
    assert_eq!(server.products.fetch_count(), 2);
    assert_eq!(reader.products.last_version(), 1);
}

#[tokio::test]
async fn test_logout_clears_every_store() {
    let server = FakeServer::start();
    let system = terminal(&server);
    let link = server.connect(&system);
    system.zones.fetch_all(false).await;
    system
        .zones
        .create(ZoneCreate {
            name: "Patio".to_string(),
        })
        .await
        .unwrap();
    eventually("zone broadcast applied", || system.zones.last_version() == 1).await;

    system.logout();

    assert!(system.zones.is_empty());
    assert!(!system.zones.is_loaded());
    assert_eq!(system.zones.last_version(), 0);
    assert!(system.registry().get_loaded_stores().is_empty());

    link.abort();
    let _ = link.await;
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_refresh_after_import_reloads_only_loaded_stores() {
    let server = FakeServer::start();
    let system = terminal(&server);
    system.products.fetch_all(false).await;
    system.roles.fetch_all(false).await;

    system.refresh_after_import().await;

    assert_eq!(server.products.fetch_count(), 2);
    assert_eq!(server.roles.fetch_count(), 2);
    assert_eq!(server.zones.fetch_count(), 0);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_kitchen_printers_register_after_startup() {
    let server = FakeServer::start();
    let system = terminal(&server);
    let mut broadcasts = server.subscribe();
    let printer = KitchenPrinter {
        id: PrinterId(1),
        name: "Grill".to_string(),
        address: "10.0.0.7:9100".to_string(),
    };
    server.kitchen_printers.server_write(printer.clone()).await;
    let message = broadcasts.recv().await.unwrap();

    assert_eq!(
        system.registry().dispatch_message(message.clone()),
        DispatchOutcome::Unregistered(ResourceKind::KitchenPrinter)
    );

    let printers = system
        .enable_kitchen_printers(Arc::new(server.kitchen_printers.api.clone()))
        .unwrap();
    assert_eq!(
        system.registry().dispatch_message(message),
        DispatchOutcome::Delivered(SyncOutcome::Applied)
    );
    assert_eq!(printers.items(), vec![printer]);
    assert!(system.kitchen_printers().is_some());

    let again = system.enable_kitchen_printers(Arc::new(server.kitchen_printers.api.clone()));
    assert_eq!(
        again.err(),
        Some(RegistryError::AlreadyRegistered(ResourceKind::KitchenPrinter))
    );
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_orders_follow_server_writes() {
    let server = FakeServer::start();
    let system = terminal(&server);
    let link = server.connect(&system);
    system.orders.fetch_all(false).await;

    server
        .orders
        .server_write(Order::open("ord-1", Some(TableId(3)), 18.5))
        .await;
    eventually("order arrives", || system.orders.len() == 1).await;

    let mut paid = Order::open("ord-1", Some(TableId(3)), 18.5);
    paid.status = OrderStatus::Paid;
    server.orders.server_write(paid).await;
    eventually("order paid", || {
        system.orders.get_by_id(&OrderId::from("ord-1")).map(|o| o.status) == Some(OrderStatus::Paid)
    })
    .await;

    assert_eq!(system.orders.items()[0].id(), OrderId::from("ord-1"));
    link.abort();
    let _ = link.await;
    system.shutdown().await.unwrap();
}

/// Junk on the wire is dropped without stopping the dispatcher.
#[tokio::test]
async fn test_dispatcher_survives_unknown_and_malformed_messages() {
    let server = FakeServer::start();
    let system = terminal(&server);
    let sender = system.sync_sender();

    let unknown = SyncMessage::from_json(
        r#"{"resource": "label_template", "payload": {"id": 1, "version": 1, "action": "created", "data": {"id": 1}}}"#,
    )
    .unwrap();
    let malformed = SyncMessage::from_json(
        r#"{"resource": "tag", "payload": {"id": 1, "version": 1, "action": "created", "data": {"colour": "red"}}}"#,
    )
    .unwrap();
    let valid = SyncMessage::from_json(
        r#"{"resource": "tag", "payload": {"id": 1, "version": 1, "action": "created", "data": {"id": 1, "name": "Vegan", "color": "green"}}}"#,
    )
    .unwrap();
    sender.send(unknown).await.unwrap();
    sender.send(malformed).await.unwrap();
    sender.send(valid).await.unwrap();
    drop(sender);

    eventually("valid tag applied", || system.tags.len() == 1).await;
    assert_eq!(system.tags.items()[0].name, "Vegan");
    system.shutdown().await.unwrap();
}
