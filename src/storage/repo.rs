//! Generic listing repository.
//!
//! One implementation serves every [`Listing`] type: the entity supplies the
//! table, columns, filter fields and derived-field rules; the repository runs
//! the same pipeline for all of them.

use chrono::Utc;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::seed::{insert_statement, Seed};
use super::{SqliteCatalog, SqliteStore};
use crate::entity::{annotate, Listing};
use crate::error::{Error, Result};
use crate::metrics;
use crate::query::{compile_filter, select_all, ColumnCatalog, DefaultFieldPolicy, OrderCompiler, OrderSpec};

/// Default number of demo rows seeded by [`ListingRepo::init`].
pub const DEFAULT_SEED_COUNT: u32 = 100;

/// Read access to one listing table.
pub struct ListingRepo<E: Listing> {
    store: Arc<SqliteStore>,
    catalog: Arc<dyn ColumnCatalog>,
    policy: DefaultFieldPolicy,
    seed_count: u32,
    base_query: String,
    initialized: Mutex<bool>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Listing> std::fmt::Debug for ListingRepo<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingRepo")
            .field("table", &E::TABLE)
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<E: Listing + Seed> ListingRepo<E> {
    /// Repository validating sort fields against the store's own catalog.
    pub fn new(store: Arc<SqliteStore>) -> Self {
        let catalog = Arc::new(SqliteCatalog::new(store.clone()));
        Self {
            store,
            catalog,
            policy: DefaultFieldPolicy::default(),
            seed_count: DEFAULT_SEED_COUNT,
            base_query: select_all(E::TABLE, E::COLUMNS),
            initialized: Mutex::new(false),
            _entity: PhantomData,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn ColumnCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_policy(mut self, policy: DefaultFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed_count(mut self, seed_count: u32) -> Self {
        self.seed_count = seed_count;
        self
    }

    /// Whether [`ListingRepo::init`] has completed successfully.
    pub fn is_initialized(&self) -> bool {
        *self.initialized.lock()
    }

    /// Create the table and seed demo rows, at most once per repository.
    ///
    /// A failed attempt leaves the repository uninitialized; the next call
    /// tries again.
    pub fn init(&self) -> Result<()> {
        let mut initialized = self.initialized.lock();
        if *initialized {
            return Ok(());
        }
        self.seed()?;
        *initialized = true;
        Ok(())
    }

    fn seed(&self) -> Result<()> {
        let insert = insert_statement::<E>();
        let now = Utc::now();
        let mut rng = rand::thread_rng();

        self.store.with_connection(|conn| -> Result<()> {
            conn.execute_batch(E::CREATE_TABLE)?;

            let tx = conn.unchecked_transaction()?;
            {
                let mut stmt = tx.prepare(&insert)?;
                for id in 1..=i64::from(self.seed_count) {
                    let row = E::demo_row(id, now, &mut rng);
                    stmt.execute(rusqlite::params_from_iter(row.iter()))?;
                }
            }
            tx.commit()?;
            Ok(())
        })?;

        info!(table = E::TABLE, rows = self.seed_count, "Seeded demo data");
        Ok(())
    }

    /// List entities matching `filter`, sorted per `order` when it is valid.
    #[instrument(skip(self, filter, order), fields(table = E::TABLE))]
    pub fn list(&self, filter: Option<&E::Filter>, order: Option<&OrderSpec>) -> Result<Vec<E>> {
        let (query, args) = compile_filter(&self.base_query, filter);

        let outcome = OrderCompiler::new(self.catalog.as_ref(), E::TABLE, E::DEFAULT_ORDER_FIELD)
            .with_policy(self.policy)
            .plan(order);
        metrics::record_order_outcome(E::TABLE, &outcome);
        let query = outcome.apply(&query);

        debug!(query = %query, args = args.len(), "Executing listing query");
        let rows = self.store.query(&query, &args, E::from_row)?;

        Ok(annotate(rows))
    }

    /// Fetch a single entity by identifier.
    #[instrument(skip(self), fields(table = E::TABLE))]
    pub fn get_by_id(&self, id: i64) -> Result<E> {
        if id <= 0 {
            return Err(Error::InvalidArgument(format!("id must be positive, got {}", id)));
        }

        let filter = E::id_filter(id);
        self.list(Some(&filter), None)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("no {} entry with id {}", E::TABLE, id)))
    }
}
