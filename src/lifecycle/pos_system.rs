use crate::framework::{CrudResourceStore, ResourceApi, ResourceLoader, ResourceStore, StoreConfig};
use crate::lifecycle::config::SyncConfig;
use crate::lifecycle::dispatcher::SyncDispatcher;
use crate::model::*;
use crate::registry::{RegistryError, RegistryStore, StoreRegistry, SyncMessage};
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, instrument};

/// Backend API handles injected into a [`PosSystem`], one per resource type.
///
/// Orders are read-only from the cache's point of view, so they only need a loader.
pub struct PosBackend {
    pub products: Arc<dyn ResourceApi<Product>>,
    pub categories: Arc<dyn ResourceApi<Category>>,
    pub zones: Arc<dyn ResourceApi<Zone>>,
    pub tables: Arc<dyn ResourceApi<DiningTable>>,
    pub employees: Arc<dyn ResourceApi<Employee>>,
    pub roles: Arc<dyn ResourceApi<Role>>,
    pub price_rules: Arc<dyn ResourceApi<PriceRule>>,
    pub tags: Arc<dyn ResourceApi<Tag>>,
    pub attributes: Arc<dyn ResourceApi<Attribute>>,
    pub specs: Arc<dyn ResourceApi<Spec>>,
    pub orders: Arc<dyn ResourceLoader<Order>>,
}

/// The application-level container that owns every resource store.
///
/// `PosSystem` is responsible for:
/// - **Construction**: one store per resource type, configured from [`SyncConfig`]
/// - **Registration**: each store is registered under its broadcast tag
/// - **Dispatch**: a [`SyncDispatcher`] task feeds server broadcasts to the registry
/// - **Session lifecycle**: [`logout`](Self::logout), [`refresh_after_import`](Self::refresh_after_import)
///   and [`shutdown`](Self::shutdown)
///
/// Stores are plain fields rather than process-wide globals, so each test can build an
/// isolated system.
///
/// # Example
///
/// ```ignore
/// let system = PosSystem::new(SyncConfig::from_env(), backend)?;
/// let transport_sender = system.sync_sender();
///
/// system.products.fetch_all(false).await;
/// let table = system.tables.create(new_table).await?;
///
/// system.logout();
/// system.shutdown().await?;
/// ```
pub struct PosSystem {
    pub products: CrudResourceStore<Product>,
    pub categories: CrudResourceStore<Category>,
    pub zones: CrudResourceStore<Zone>,
    pub tables: CrudResourceStore<DiningTable>,
    pub employees: CrudResourceStore<Employee>,
    pub roles: CrudResourceStore<Role>,
    pub price_rules: CrudResourceStore<PriceRule>,
    pub tags: CrudResourceStore<Tag>,
    pub attributes: CrudResourceStore<Attribute>,
    pub specs: CrudResourceStore<Spec>,
    pub orders: ResourceStore<Order>,

    kitchen_printers: OnceLock<CrudResourceStore<KitchenPrinter>>,
    registry: StoreRegistry,
    config: SyncConfig,
    sync_sender: mpsc::Sender<SyncMessage>,
    handles: Vec<JoinHandle<()>>,
}

impl PosSystem {
    /// Creates every store, registers it, and spawns the dispatcher.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: SyncConfig, backend: PosBackend) -> Result<Self, RegistryError> {
        let store_config = config.store_config();
        let registry = StoreRegistry::new();

        let products = crud_store(&registry, backend.products, &store_config)?;
        let categories = crud_store(&registry, backend.categories, &store_config)?;
        let zones = crud_store(&registry, backend.zones, &store_config)?;
        let tables = crud_store(&registry, backend.tables, &store_config)?;
        let employees = crud_store(&registry, backend.employees, &store_config)?;
        let roles = crud_store(&registry, backend.roles, &store_config)?;
        let price_rules = crud_store(&registry, backend.price_rules, &store_config)?;
        let tags = crud_store(&registry, backend.tags, &store_config)?;
        let attributes = crud_store(&registry, backend.attributes, &store_config)?;
        let specs = crud_store(&registry, backend.specs, &store_config)?;

        let orders = ResourceStore::with_config(backend.orders, store_config);
        register::<Order, _>(&registry, orders.clone())?;

        let (dispatcher, sync_sender) =
            SyncDispatcher::new(registry.clone(), config.dispatch_buffer);
        let dispatcher_handle = tokio::spawn(dispatcher.run());

        info!(stores = registry.len(), "POS system started");
        Ok(Self {
            products,
            categories,
            zones,
            tables,
            employees,
            roles,
            price_rules,
            tags,
            attributes,
            specs,
            orders,
            kitchen_printers: OnceLock::new(),
            registry,
            config,
            sync_sender,
            handles: vec![dispatcher_handle],
        })
    }

    /// Adds the kitchen printer store after startup.
    ///
    /// Fails with [`RegistryError::AlreadyRegistered`] if printers were already enabled.
    pub fn enable_kitchen_printers(
        &self,
        api: Arc<dyn ResourceApi<KitchenPrinter>>,
    ) -> Result<CrudResourceStore<KitchenPrinter>, RegistryError> {
        let printers = crud_store(&self.registry, api, &self.config.store_config())?;
        // Registration above is the guard; the cell can only be empty here.
        let _ = self.kitchen_printers.set(printers.clone());
        info!("Kitchen printers enabled");
        Ok(printers)
    }

    pub fn kitchen_printers(&self) -> Option<&CrudResourceStore<KitchenPrinter>> {
        self.kitchen_printers.get()
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    /// A sender for the transport to push decoded broadcasts into.
    pub fn sync_sender(&self) -> mpsc::Sender<SyncMessage> {
        self.sync_sender.clone()
    }

    /// Drops every cached collection and watermark, e.g. on logout or tenant switch.
    pub fn logout(&self) {
        info!("Logout: clearing all stores");
        self.registry.clear_all_stores();
    }

    /// Reloads every store that has been loaded, e.g. after a bulk import or restore.
    #[instrument(skip(self))]
    pub async fn refresh_after_import(&self) {
        self.registry.refresh_all_loaded_stores().await;
    }

    /// Stops the dispatcher and waits for it to finish.
    ///
    /// The dispatcher drains queued messages first. It exits once every sender is gone, so
    /// transports must drop the senders they obtained from [`sync_sender`](Self::sync_sender).
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down POS system...");
        drop(self.sync_sender);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Dispatcher task failed: {:?}", e);
                return Err(e);
            }
        }

        info!("POS system shutdown complete.");
        Ok(())
    }
}

fn crud_store<T: PosResource>(
    registry: &StoreRegistry,
    api: Arc<dyn ResourceApi<T>>,
    config: &StoreConfig,
) -> Result<CrudResourceStore<T>, RegistryError> {
    let store = CrudResourceStore::with_config(api, config.clone());
    register::<T, _>(registry, store.clone())?;
    Ok(store)
}

fn register<T: PosResource, S: RegistryStore + 'static>(
    registry: &StoreRegistry,
    store: S,
) -> Result<(), RegistryError> {
    registry.register(T::KIND, store)
}
