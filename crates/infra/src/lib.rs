//! Infrastructure layer: storage, transactions, use cases, delivery and search.
//!
//! ```text
//! WarehouseService ─ validate ─ WarehouseStore (staged in UnitOfWork)
//!        │                                │ commit
//!        └──────── Transactor ───────── EventBus ─ NotifierWorker ─ legacy gateway
//!
//! WarehouseSearch ─ WarehouseStore::get_all (committed, active only)
//! ```

pub mod bootstrap;
pub mod config;
pub mod notifier;
pub mod search;
pub mod store;
pub mod transactor;
pub mod unit_of_work;
pub mod use_cases;
pub mod workers;


pub use bootstrap::{BootstrapError, FulfilmentRuntime, bootstrap, bootstrap_with_gateway};
pub use config::{ConfigError, FulfilmentConfig};
pub use notifier::{
    CommitGatedNotifier, LegacyGatewayError, LegacyWarehouseGateway, LoggingLegacyGateway, NotifierStats,
};
pub use search::{
    PageLimits, SearchError, SearchPage, SearchParseError, SearchQuery, SortBy, SortOrder, WarehouseSearch,
};
pub use store::{InMemoryWarehouseStore, StoreError, WarehouseStore};
pub use transactor::Transactor;
pub use unit_of_work::{CommitReceipt, UnitOfWork, UnitOfWorkState};
pub use use_cases::{WarehouseError, WarehouseService};
pub use workers::{NotifierWorker, WorkerHandle};
