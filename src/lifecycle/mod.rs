//! # System Lifecycle & Orchestration
//!
//! Stores are simple on their own; wiring twelve of them to a backend, a registry and a
//! dispatcher is where the moving parts are. This module provides the container that does it.
//!
//! **Key Responsibilities:**
//! 1. **Store Creation** - One store per resource type, with injected backend handles
//! 2. **Registration** - Every store registered under its broadcast tag
//! 3. **Dispatch** - A task routing server broadcasts to the registry, in order
//! 4. **Session Operations** - Logout (clear everything) and post-import refresh
//! 5. **Graceful Shutdown** - Drain and stop the dispatcher
//! 6. **Observability Setup** - Initialize tracing and logging infrastructure
//!
//! ## The PosSystem Pattern
//!
//! ```rust,ignore
//! let system = PosSystem::new(SyncConfig::from_env(), backend)?;
//!
//! // The transport pushes decoded broadcasts here
//! let sender = system.sync_sender();
//! sender.send(SyncMessage::from_json(&frame)?).await?;
//!
//! // Tenant switch
//! system.logout();
//!
//! drop(sender);
//! system.shutdown().await?;
//! ```
//!
//! Dependencies are passed in through [`PosBackend`]; nothing is a process-wide global, so
//! tests construct one isolated system per case.

pub mod config;
pub mod dispatcher;
pub mod pos_system;
pub mod tracing;

pub use config::SyncConfig;
pub use dispatcher::SyncDispatcher;
pub use pos_system::{PosBackend, PosSystem};
pub use self::tracing::setup_tracing;
