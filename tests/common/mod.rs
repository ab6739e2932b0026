//! An in-memory POS server for integration tests.
//!
//! Each resource type gets a backend actor that owns the authoritative collection, assigns ids
//! and per-resource versions, and broadcasts every change to connected terminals, the same way
//! the real server does.

#![allow(dead_code)]

use indexmap::IndexMap;
use pos_sync::framework::{ApiClient, ApiRequest, RawSyncPayload, StoreError, SyncAction};
use pos_sync::lifecycle::{PosBackend, PosSystem};
use pos_sync::model::*;
use pos_sync::registry::SyncMessage;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Server-side state for one resource type.
struct BackendActor<T: PosResource> {
    requests: mpsc::Receiver<ApiRequest<T>>,
    writes: mpsc::Receiver<T>,
    items: IndexMap<T::Id, T>,
    next_id: u32,
    version: u64,
    hub: broadcast::Sender<SyncMessage>,
    fetches: Arc<AtomicUsize>,
}

/// Test-side handle to a backend actor.
pub struct BackendHandle<T: PosResource> {
    pub api: ApiClient<T>,
    writes: mpsc::Sender<T>,
    fetches: Arc<AtomicUsize>,
}

impl<T: PosResource> BackendHandle<T> {
    /// A change made on the server by someone other than a terminal (e.g. the kitchen display).
    pub async fn server_write(&self, item: T) {
        self.writes.send(item).await.expect("backend stopped");
    }

    /// How many bulk loads this backend has served.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

pub fn spawn_backend<T: PosResource>(
    hub: &broadcast::Sender<SyncMessage>,
    seed: Vec<T>,
) -> BackendHandle<T> {
    let (api, requests) = ApiClient::channel(32);
    let (writes_tx, writes) = mpsc::channel(32);
    let fetches = Arc::new(AtomicUsize::new(0));
    let next_id = seed.len() as u32 + 1;
    let actor = BackendActor {
        requests,
        writes,
        items: seed.into_iter().map(|item| (item.id(), item)).collect(),
        next_id,
        version: 0,
        hub: hub.clone(),
        fetches: fetches.clone(),
    };
    tokio::spawn(actor.run());
    BackendHandle {
        api,
        writes: writes_tx,
        fetches,
    }
}

impl<T: PosResource> BackendActor<T> {
    async fn run(mut self) {
        loop {
            tokio::select! {
                Some(request) = self.requests.recv() => self.handle(request),
                Some(item) = self.writes.recv() => {
                    let action = if self.items.contains_key(&item.id()) {
                        SyncAction::Updated
                    } else {
                        SyncAction::Created
                    };
                    self.items.insert(item.id(), item.clone());
                    self.broadcast(item.id(), action, Some(&item));
                }
                else => break,
            }
        }
    }

    fn handle(&mut self, request: ApiRequest<T>) {
        match request {
            ApiRequest::FetchAll { respond_to } => {
                self.fetches.fetch_add(1, Ordering::SeqCst);
                let _ = respond_to.send(Ok(self.items.values().cloned().collect()));
            }
            ApiRequest::Create { params, respond_to } => {
                let result = self.create(&params);
                let _ = respond_to.send(result);
            }
            ApiRequest::Update {
                id,
                update,
                respond_to,
            } => {
                let result = self.update(&id, &update);
                let _ = respond_to.send(result);
            }
            ApiRequest::Remove { id, respond_to } => {
                let result = match self.items.shift_remove(&id) {
                    Some(_) => {
                        self.broadcast(id, SyncAction::Deleted, None);
                        Ok(())
                    }
                    None => Err(StoreError::api(format!("{} {id} not found", T::KIND))),
                };
                let _ = respond_to.send(result);
            }
        }
    }

    /// Builds the entity from the create DTO's fields plus a fresh id.
    fn create(&mut self, params: &T::Create) -> Result<T, StoreError> {
        let mut value = serde_json::to_value(params)?;
        value["id"] = json!(self.next_id);
        let item: T = serde_json::from_value(value)?;
        self.next_id += 1;
        self.items.insert(item.id(), item.clone());
        self.broadcast(item.id(), SyncAction::Created, Some(&item));
        Ok(item)
    }

    /// Overwrites the fields present in the update DTO.
    fn update(&mut self, id: &T::Id, update: &T::Update) -> Result<T, StoreError> {
        let Some(current) = self.items.get(id) else {
            return Err(StoreError::api(format!("{} {id} not found", T::KIND)));
        };
        let mut value = serde_json::to_value(current)?;
        if let (Value::Object(target), Value::Object(changes)) =
            (&mut value, serde_json::to_value(update)?)
        {
            target.extend(changes);
        }
        let item: T = serde_json::from_value(value)?;
        self.items.insert(id.clone(), item.clone());
        self.broadcast(id.clone(), SyncAction::Updated, Some(&item));
        Ok(item)
    }

    fn broadcast(&mut self, id: T::Id, action: SyncAction, data: Option<&T>) {
        self.version += 1;
        let message = SyncMessage::new(
            T::KIND,
            RawSyncPayload {
                id: json!(id),
                version: self.version,
                action,
                data: data.map(|item| json!(item)),
            },
        );
        // No connected terminals is fine.
        let _ = self.hub.send(message);
    }
}

/// One backend per resource type plus the broadcast hub.
pub struct FakeServer {
    hub: broadcast::Sender<SyncMessage>,
    pub products: BackendHandle<Product>,
    pub categories: BackendHandle<Category>,
    pub zones: BackendHandle<Zone>,
    pub tables: BackendHandle<DiningTable>,
    pub employees: BackendHandle<Employee>,
    pub roles: BackendHandle<Role>,
    pub price_rules: BackendHandle<PriceRule>,
    pub tags: BackendHandle<Tag>,
    pub attributes: BackendHandle<Attribute>,
    pub specs: BackendHandle<Spec>,
    pub orders: BackendHandle<Order>,
    pub kitchen_printers: BackendHandle<KitchenPrinter>,
}

impl FakeServer {
    pub fn start() -> Self {
        Self::with_products(Vec::new())
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let (hub, _) = broadcast::channel(256);
        Self {
            products: spawn_backend(&hub, products),
            categories: spawn_backend(&hub, Vec::new()),
            zones: spawn_backend(&hub, Vec::new()),
            tables: spawn_backend(&hub, Vec::new()),
            employees: spawn_backend(&hub, Vec::new()),
            roles: spawn_backend(&hub, Vec::new()),
            price_rules: spawn_backend(&hub, Vec::new()),
            tags: spawn_backend(&hub, Vec::new()),
            attributes: spawn_backend(&hub, Vec::new()),
            specs: spawn_backend(&hub, Vec::new()),
            orders: spawn_backend(&hub, Vec::new()),
            kitchen_printers: spawn_backend(&hub, Vec::new()),
            hub,
        }
    }

    /// API handles for one terminal.
    pub fn backend(&self) -> PosBackend {
        PosBackend {
            products: Arc::new(self.products.api.clone()),
            categories: Arc::new(self.categories.api.clone()),
            zones: Arc::new(self.zones.api.clone()),
            tables: Arc::new(self.tables.api.clone()),
            employees: Arc::new(self.employees.api.clone()),
            roles: Arc::new(self.roles.api.clone()),
            price_rules: Arc::new(self.price_rules.api.clone()),
            tags: Arc::new(self.tags.api.clone()),
            attributes: Arc::new(self.attributes.api.clone()),
            specs: Arc::new(self.specs.api.clone()),
            orders: Arc::new(self.orders.api.clone()),
        }
    }

    /// Receives every broadcast from now on, for tests that deliver messages by hand.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncMessage> {
        self.hub.subscribe()
    }

    /// Forwards every broadcast to `terminal`'s dispatcher. Abort the handle before shutdown.
    pub fn connect(&self, terminal: &PosSystem) -> JoinHandle<()> {
        let mut broadcasts = self.hub.subscribe();
        let sender = terminal.sync_sender();
        tokio::spawn(async move {
            loop {
                match broadcasts.recv().await {
                    Ok(message) => {
                        if sender.send(message).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Polls `condition` until it holds, failing the test after one second.
pub async fn eventually(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
