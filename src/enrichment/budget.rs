//! Org AI-credit budgets.
//!
//! One `CreditBudget` per org, shared across every report generated for it
//! through a `CreditLedger`. Reservation is a single compare-and-swap
//! increment-and-check, so two concurrent batches can never together exceed
//! the limit. A `Reservation` refunds itself on drop unless committed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::error::EnrichmentError;
use super::types::CostUnits;

#[derive(Debug)]
pub struct CreditBudget {
    org_id: String,
    limit: CostUnits,
    used: AtomicU64,
}

impl CreditBudget {
    pub fn new(org_id: impl Into<String>, limit: CostUnits) -> Self {
        Self::with_usage(org_id, limit, 0)
    }

    /// Budget with usage already committed earlier in the billing period.
    pub fn with_usage(org_id: impl Into<String>, limit: CostUnits, used: CostUnits) -> Self {
        Self {
            org_id: org_id.into(),
            limit,
            used: AtomicU64::new(used),
        }
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    pub fn limit(&self) -> CostUnits {
        self.limit
    }

    pub fn used(&self) -> CostUnits {
        self.used.load(Ordering::Acquire)
    }

    pub fn remaining(&self) -> CostUnits {
        self.limit.saturating_sub(self.used())
    }

    /// Atomically reserve `cost` units, or refuse without changing usage.
    pub fn try_reserve(&self, cost: CostUnits) -> Result<(), EnrichmentError> {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(cost).filter(|next| *next <= self.limit)
            })
            .map(|_| ())
            .map_err(|used| EnrichmentError::BudgetExceeded {
                requested: cost,
                remaining: self.limit.saturating_sub(used),
            })
    }

    /// Reserve `cost` units, held by a guard that refunds them on drop.
    pub fn reserve(self: &Arc<Self>, cost: CostUnits) -> Result<Reservation, EnrichmentError> {
        self.try_reserve(cost)?;
        Ok(Reservation {
            budget: Arc::clone(self),
            cost,
            committed: false,
        })
    }

    /// Return a reservation whose module produced nothing billable.
    pub fn release(&self, cost: CostUnits) {
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(cost))
            });
    }
}

// ─── Reservation ─────────────────────────────────────────────────────────────

/// Credits held for one module run.
#[derive(Debug)]
pub struct Reservation {
    budget: Arc<CreditBudget>,
    cost: CostUnits,
    committed: bool,
}

impl Reservation {
    pub fn cost(&self) -> CostUnits {
        self.cost
    }

    /// Keep the credits: the module produced billable output.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.committed {
            self.budget.release(self.cost);
        }
    }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Per-org budgets. Orgs seen for the first time start at `default_limit`.
#[derive(Debug)]
pub struct CreditLedger {
    default_limit: CostUnits,
    budgets: Mutex<HashMap<String, Arc<CreditBudget>>>,
}

impl CreditLedger {
    pub fn new(default_limit: CostUnits) -> Self {
        Self {
            default_limit,
            budgets: Mutex::new(HashMap::new()),
        }
    }

    pub fn default_limit(&self) -> CostUnits {
        self.default_limit
    }

    fn budgets(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<CreditBudget>>> {
        self.budgets.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Install a budget loaded from billing, replacing any existing one.
    pub fn insert(&self, budget: CreditBudget) -> Arc<CreditBudget> {
        let budget = Arc::new(budget);
        self.budgets()
            .insert(budget.org_id().to_string(), Arc::clone(&budget));
        budget
    }

    pub fn get(&self, org_id: &str) -> Option<Arc<CreditBudget>> {
        self.budgets().get(org_id).cloned()
    }

    /// The org's budget, created at the default limit on first use.
    pub fn budget_for(&self, org_id: &str) -> Arc<CreditBudget> {
        let mut budgets = self.budgets();
        Arc::clone(
            budgets
                .entry(org_id.to_string())
                .or_insert_with(|| Arc::new(CreditBudget::new(org_id, self.default_limit))),
        )
    }

    pub fn len(&self) -> usize {
        self.budgets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
