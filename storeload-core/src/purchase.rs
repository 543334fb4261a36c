use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};

use crate::workload::WorkloadConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseItem {
    pub item_id: u32,
    pub quantity: u32,
}

/// One synthetic purchase. Built right before it is sent and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub store_id: u32,
    pub customer_id: u64,
    pub date: NaiveDate,
    pub items: Vec<PurchaseItem>,
}

/// Per-store source of synthetic purchases.
#[derive(Debug)]
pub struct PurchaseGenerator {
    store_id: u32,
    customers_per_store: u32,
    max_item_id: u32,
    items_per_purchase: u32,
    date: NaiveDate,
    rng: StdRng,
}

impl PurchaseGenerator {
    pub fn new(cfg: &WorkloadConfig, store_id: u32) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(store_id))),
            None => StdRng::from_os_rng(),
        };

        Self {
            store_id,
            customers_per_store: cfg.customers_per_store.max(1),
            max_item_id: cfg.max_item_id.max(1),
            items_per_purchase: cfg.items_per_purchase,
            date: cfg.date,
            rng,
        }
    }

    pub fn store_id(&self) -> u32 {
        self.store_id
    }

    /// Customer ids owned by this store: `[store_id * cps, store_id * cps + cps)`.
    pub fn customer_range(&self) -> std::ops::Range<u64> {
        let base = u64::from(self.store_id) * u64::from(self.customers_per_store);
        base..base + u64::from(self.customers_per_store)
    }

    pub fn next_purchase(&mut self) -> PurchaseRequest {
        let items = (0..self.items_per_purchase)
            .map(|_| PurchaseItem {
                item_id: self.rng.random_range(1..=self.max_item_id),
                quantity: 1,
            })
            .collect();

        let customers = self.customer_range();
        let customer_id = self.rng.random_range(customers);

        PurchaseRequest {
            store_id: self.store_id,
            customer_id,
            date: self.date,
            items,
        }
    }
}
