//! Enrichment gate: decide which modules fire for a report, run them with
//! bounded concurrency, and collect a batch result.
//!
//! A module that fails, times out, panics or is cancelled is recorded as
//! `Failed` and never billed. Siblings keep running.

use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::EngineConfig;
use crate::context::ReportContext;

use super::budget::{CreditBudget, CreditLedger};
use super::error::EnrichmentError;
use super::modules::{
    DamageNarrativeModule, PhotoCaptionModule, ScopeReviewModule, StormCorrelationModule,
};
use super::traits::{AiModule, AiProvider};
use super::types::{CostUnits, EnrichmentBatchResult, ModuleKey, ModuleOutcome};

// ═══════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════

/// Ordered set of enrichment modules, unique by key.
pub struct AiModuleRegistry {
    modules: Vec<Arc<dyn AiModule>>,
}

impl AiModuleRegistry {
    pub fn from_modules(modules: Vec<Arc<dyn AiModule>>) -> Result<Self, EnrichmentError> {
        for (i, module) in modules.iter().enumerate() {
            let key = module.key();
            if modules[..i].iter().any(|m| m.key() == key) {
                return Err(EnrichmentError::DuplicateModule(key));
            }
        }
        Ok(Self { modules })
    }

    /// The four built-in modules.
    pub fn standard() -> Self {
        Self {
            modules: vec![
                Arc::new(PhotoCaptionModule),
                Arc::new(DamageNarrativeModule),
                Arc::new(StormCorrelationModule),
                Arc::new(ScopeReviewModule),
            ],
        }
    }

    pub fn get(&self, key: ModuleKey) -> Option<&Arc<dyn AiModule>> {
        self.modules.iter().find(|m| m.key() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AiModule>> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

// ═══════════════════════════════════════════
// Gate
// ═══════════════════════════════════════════

pub struct EnrichmentGate {
    registry: Arc<AiModuleRegistry>,
    provider: Arc<dyn AiProvider>,
    max_concurrency: usize,
    module_timeout: Duration,
    ledger: Option<Arc<CreditLedger>>,
}

type TaskOutput = (ModuleKey, Result<Value, EnrichmentError>);

impl EnrichmentGate {
    pub fn new(
        registry: Arc<AiModuleRegistry>,
        provider: Arc<dyn AiProvider>,
        max_concurrency: usize,
        module_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            provider,
            max_concurrency: max_concurrency.max(1),
            module_timeout,
            ledger: None,
        }
    }

    /// Gate over the given registry using concurrency and timeout from config.
    pub fn from_config(
        config: &EngineConfig,
        registry: Arc<AiModuleRegistry>,
        provider: Arc<dyn AiProvider>,
    ) -> Self {
        Self::new(
            registry,
            provider,
            config.max_concurrency,
            Duration::from_secs(config.module_timeout_secs),
        )
    }

    /// Charge successful runs against the budget of the context's org.
    pub fn with_ledger(mut self, ledger: Arc<CreditLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn ledger(&self) -> Option<&Arc<CreditLedger>> {
        self.ledger.as_ref()
    }

    /// Budget to charge for `ctx`. Metered gates refuse contexts without an org.
    fn budget_for(
        &self,
        ctx: &ReportContext,
    ) -> Result<Option<Arc<CreditBudget>>, EnrichmentError> {
        let Some(ledger) = &self.ledger else {
            return Ok(None);
        };
        match ctx.org_id.as_deref().map(str::trim) {
            Some(org_id) if !org_id.is_empty() => Ok(Some(ledger.budget_for(org_id))),
            _ => Err(EnrichmentError::MissingOrg),
        }
    }

    pub fn registry(&self) -> &AiModuleRegistry {
        &self.registry
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub async fn run_batch(&self, ctx: Arc<ReportContext>) -> EnrichmentBatchResult {
        self.run_batch_until(ctx, std::future::pending()).await
    }

    /// Run a batch, stopping early when `cancel` resolves. Results of modules
    /// that finished before cancellation are kept.
    ///
    /// Credits are reserved per module once it holds a concurrency permit and
    /// are refunded unless the run succeeds, including when this future is
    /// dropped mid-batch.
    pub async fn run_batch_until<F>(
        &self,
        ctx: Arc<ReportContext>,
        cancel: F,
    ) -> EnrichmentBatchResult
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let mut batch = EnrichmentBatchResult::default();
        let mut pending: BTreeMap<ModuleKey, CostUnits> = BTreeMap::new();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let budget = self.budget_for(&ctx);

        for module in self.registry.iter() {
            let key = module.key();

            let fired = match std::panic::catch_unwind(AssertUnwindSafe(|| module.trigger(&ctx))) {
                Ok(fired) => fired,
                Err(_) => {
                    tracing::warn!(module = %key, "Enrichment trigger panicked");
                    batch
                        .results
                        .insert(key, ModuleOutcome::failed(&EnrichmentError::TriggerPanicked));
                    continue;
                }
            };
            if !fired {
                tracing::debug!(module = %key, "Enrichment module not triggered");
                batch.skipped.push(key);
                continue;
            }

            let budget = match &budget {
                Ok(budget) => budget.clone(),
                Err(e) => {
                    tracing::warn!(module = %key, error = %e, "Enrichment module refused");
                    batch.results.insert(key, ModuleOutcome::failed(e));
                    continue;
                }
            };

            pending.insert(key, module.cost());
            tasks.spawn(execute(
                Arc::clone(module),
                Arc::clone(&ctx),
                Arc::clone(&self.provider),
                Arc::clone(&semaphore),
                budget,
                self.module_timeout,
            ));
        }

        tokio::pin!(cancel);
        loop {
            let joined = tokio::select! {
                biased;
                joined = tasks.join_next() => joined,
                () = &mut cancel => {
                    batch.cancelled = true;
                    break;
                }
            };
            match joined {
                None => break,
                Some(Ok((key, result))) => self.record(&mut batch, &mut pending, key, result),
                Some(Err(e)) => tracing::warn!(error = %e, "Enrichment task ended abnormally"),
            }
        }

        if batch.cancelled {
            tracing::info!(in_flight = tasks.len(), "Enrichment batch cancelled");
            tasks.abort_all();
            while let Some(joined) = tasks.join_next().await {
                if let Ok((key, result)) = joined {
                    self.record(&mut batch, &mut pending, key, result);
                }
            }
        }

        // Modules that never reported back.
        let unfinished = if batch.cancelled {
            EnrichmentError::Cancelled
        } else {
            EnrichmentError::RunPanicked
        };
        for key in pending.into_keys() {
            batch.results.insert(key, ModuleOutcome::failed(&unfinished));
        }

        batch.recompute_cost();
        batch.duration_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            completed = batch.completed_count(),
            failed = batch.failed_count(),
            skipped = batch.skipped.len(),
            total_cost = batch.total_cost,
            duration_ms = batch.duration_ms,
            cancelled = batch.cancelled,
            "Enrichment batch finished"
        );
        batch
    }

    fn record(
        &self,
        batch: &mut EnrichmentBatchResult,
        pending: &mut BTreeMap<ModuleKey, CostUnits>,
        key: ModuleKey,
        result: Result<Value, EnrichmentError>,
    ) {
        let Some(cost) = pending.remove(&key) else {
            return;
        };
        match result {
            Ok(output) => {
                tracing::debug!(module = %key, cost, "Enrichment module completed");
                batch
                    .results
                    .insert(key, ModuleOutcome::Completed { output, cost });
            }
            Err(e) => {
                tracing::warn!(module = %key, error = %e, "Enrichment module failed");
                batch.results.insert(key, ModuleOutcome::failed(&e));
            }
        }
    }
}

/// One module run: wait for a permit, reserve credits, then run under the
/// timeout with panics caught. The reservation is committed only on success.
async fn execute(
    module: Arc<dyn AiModule>,
    ctx: Arc<ReportContext>,
    provider: Arc<dyn AiProvider>,
    semaphore: Arc<Semaphore>,
    budget: Option<Arc<CreditBudget>>,
    limit: Duration,
) -> TaskOutput {
    let key = module.key();
    let Ok(_permit) = semaphore.acquire_owned().await else {
        return (key, Err(EnrichmentError::Cancelled));
    };
    let reservation = match budget.map(|b| b.reserve(module.cost())).transpose() {
        Ok(reservation) => reservation,
        Err(e) => return (key, Err(e)),
    };

    let run = AssertUnwindSafe(module.run(&ctx, provider.as_ref())).catch_unwind();
    let result = match tokio::time::timeout(limit, run).await {
        Err(_) => Err(EnrichmentError::Timeout(limit)),
        Ok(Err(_)) => Err(EnrichmentError::RunPanicked),
        Ok(Ok(result)) => result,
    };
    if let (Ok(_), Some(reservation)) = (&result, reservation) {
        reservation.commit();
    }
    (key, result)
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::traits::CompletionRequest;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullProvider;

    #[async_trait]
    impl AiProvider for NullProvider {
        async fn complete(&self, _: &CompletionRequest) -> Result<String, EnrichmentError> {
            Ok("{}".into())
        }
    }

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed,
        Fail,
        PanicInRun,
        PanicInTrigger,
        Sleep(Duration),
    }

    #[derive(Default)]
    struct Tracker {
        runs: AtomicUsize,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    struct MockModule {
        key: ModuleKey,
        cost: CostUnits,
        fires: bool,
        behavior: Behavior,
        tracker: Arc<Tracker>,
    }

    impl MockModule {
        fn new(
            key: ModuleKey,
            cost: CostUnits,
            behavior: Behavior,
            tracker: &Arc<Tracker>,
        ) -> Self {
            Self {
                key,
                cost,
                fires: true,
                behavior,
                tracker: Arc::clone(tracker),
            }
        }

        fn silent(mut self) -> Self {
            self.fires = false;
            self
        }
    }

    #[async_trait]
    impl AiModule for MockModule {
        fn key(&self) -> ModuleKey {
            self.key
        }

        fn cost(&self) -> CostUnits {
            self.cost
        }

        fn trigger(&self, _: &ReportContext) -> bool {
            if let Behavior::PanicInTrigger = self.behavior {
                panic!("trigger blew up");
            }
            self.fires
        }

        async fn run(
            &self,
            _: &ReportContext,
            _: &dyn AiProvider,
        ) -> Result<Value, EnrichmentError> {
            self.tracker.runs.fetch_add(1, Ordering::SeqCst);
            let now = self.tracker.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.tracker.peak.fetch_max(now, Ordering::SeqCst);

            let result = match self.behavior {
                Behavior::Succeed | Behavior::PanicInTrigger => Ok(json!({"module": self.key})),
                Behavior::Fail => Err(EnrichmentError::MalformedResponse("no json".into())),
                Behavior::PanicInRun => panic!("run blew up"),
                Behavior::Sleep(d) => {
                    tokio::time::sleep(d).await;
                    Ok(json!({"slept": true}))
                }
            };
            self.tracker.active.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn gate(modules: Vec<MockModule>, concurrency: usize, timeout: Duration) -> EnrichmentGate {
        let modules: Vec<Arc<dyn AiModule>> = modules
            .into_iter()
            .map(|m| Arc::new(m) as Arc<dyn AiModule>)
            .collect();
        let registry = AiModuleRegistry::from_modules(modules).unwrap();
        EnrichmentGate::new(Arc::new(registry), Arc::new(NullProvider), concurrency, timeout)
    }

    fn ctx() -> Arc<ReportContext> {
        Arc::new(ReportContext::default())
    }

    fn org_ctx(org_id: &str) -> Arc<ReportContext> {
        Arc::new(ReportContext {
            org_id: Some(org_id.into()),
            ..ReportContext::default()
        })
    }

    const LONG: Duration = Duration::from_secs(30);

    #[test]
    fn duplicate_module_rejected() {
        let tracker = Arc::new(Tracker::default());
        let modules: Vec<Arc<dyn AiModule>> = vec![
            Arc::new(MockModule::new(ModuleKey::ScopeReview, 1, Behavior::Succeed, &tracker)),
            Arc::new(MockModule::new(ModuleKey::ScopeReview, 5, Behavior::Succeed, &tracker)),
        ];
        match AiModuleRegistry::from_modules(modules) {
            Err(EnrichmentError::DuplicateModule(key)) => assert_eq!(key, ModuleKey::ScopeReview),
            _ => panic!("duplicate key accepted"),
        }
    }

    #[test]
    fn standard_registry_has_every_module() {
        let registry = AiModuleRegistry::standard();
        assert_eq!(registry.len(), ModuleKey::all().len());
        for key in ModuleKey::all() {
            assert!(registry.get(*key).is_some());
        }
    }

    #[tokio::test]
    async fn untriggered_module_never_runs() {
        let tracker = Arc::new(Tracker::default());
        let gate = gate(
            vec![
                MockModule::new(ModuleKey::PhotoCaptions, 2, Behavior::Succeed, &tracker).silent(),
            ],
            4,
            LONG,
        );

        let batch = gate.run_batch(ctx()).await;

        assert_eq!(tracker.runs.load(Ordering::SeqCst), 0);
        assert!(batch.results.is_empty());
        assert_eq!(batch.skipped, vec![ModuleKey::PhotoCaptions]);
        assert_eq!(batch.total_cost, 0);
        assert_eq!(batch.unavailable_notice(), None);
    }

    #[tokio::test]
    async fn failure_is_isolated_and_unbilled() {
        let tracker = Arc::new(Tracker::default());
        let gate = gate(
            vec![
                MockModule::new(ModuleKey::PhotoCaptions, 2, Behavior::Succeed, &tracker),
                MockModule::new(ModuleKey::DamageNarrative, 3, Behavior::Fail, &tracker),
                MockModule::new(ModuleKey::ScopeReview, 1, Behavior::Succeed, &tracker),
            ],
            4,
            LONG,
        );

        let batch = gate.run_batch(ctx()).await;

        assert_eq!(batch.completed_count(), 2);
        assert_eq!(batch.failed_count(), 1);
        assert_eq!(batch.total_cost, 3);
        assert!(!batch.results[&ModuleKey::DamageNarrative].is_completed());
        assert_eq!(
            batch.unavailable_notice().as_deref(),
            Some("Report generated with 1 enrichment unavailable")
        );
    }

    #[tokio::test]
    async fn panics_are_contained() {
        let tracker = Arc::new(Tracker::default());
        let gate = gate(
            vec![
                MockModule::new(ModuleKey::PhotoCaptions, 2, Behavior::PanicInTrigger, &tracker),
                MockModule::new(ModuleKey::DamageNarrative, 3, Behavior::PanicInRun, &tracker),
                MockModule::new(ModuleKey::ScopeReview, 1, Behavior::Succeed, &tracker),
            ],
            4,
            LONG,
        );

        let batch = gate.run_batch(ctx()).await;

        assert_eq!(
            batch.results[&ModuleKey::PhotoCaptions],
            ModuleOutcome::failed(&EnrichmentError::TriggerPanicked)
        );
        assert_eq!(
            batch.results[&ModuleKey::DamageNarrative],
            ModuleOutcome::failed(&EnrichmentError::RunPanicked)
        );
        assert!(batch.results[&ModuleKey::ScopeReview].is_completed());
        assert_eq!(batch.total_cost, 1);
    }

    #[tokio::test]
    async fn slow_module_times_out() {
        let tracker = Arc::new(Tracker::default());
        let limit = Duration::from_millis(50);
        let gate = gate(
            vec![
                MockModule::new(ModuleKey::StormCorrelation, 2, Behavior::Sleep(LONG), &tracker),
                MockModule::new(ModuleKey::ScopeReview, 1, Behavior::Succeed, &tracker),
            ],
            4,
            limit,
        );

        let batch = gate.run_batch(ctx()).await;

        assert_eq!(
            batch.results[&ModuleKey::StormCorrelation],
            ModuleOutcome::failed(&EnrichmentError::Timeout(limit))
        );
        assert!(batch.results[&ModuleKey::ScopeReview].is_completed());
        assert_eq!(batch.total_cost, 1);
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let tracker = Arc::new(Tracker::default());
        let nap = Behavior::Sleep(Duration::from_millis(100));
        let gate = gate(
            ModuleKey::all()
                .iter()
                .map(|k| MockModule::new(*k, 1, nap, &tracker))
                .collect(),
            2,
            LONG,
        );

        let batch = gate.run_batch(ctx()).await;

        assert_eq!(batch.completed_count(), 4);
        assert_eq!(tracker.runs.load(Ordering::SeqCst), 4);
        assert_eq!(tracker.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_concurrency_still_runs() {
        let tracker = Arc::new(Tracker::default());
        let gate = gate(
            vec![MockModule::new(ModuleKey::ScopeReview, 1, Behavior::Succeed, &tracker)],
            0,
            LONG,
        );
        assert_eq!(gate.max_concurrency(), 1);
        assert_eq!(gate.run_batch(ctx()).await.completed_count(), 1);
    }

    #[tokio::test]
    async fn cancellation_keeps_finished_results() {
        let tracker = Arc::new(Tracker::default());
        let gate = gate(
            vec![
                MockModule::new(ModuleKey::PhotoCaptions, 2, Behavior::Succeed, &tracker),
                MockModule::new(ModuleKey::StormCorrelation, 2, Behavior::Sleep(LONG), &tracker),
            ],
            4,
            LONG,
        );

        let batch = gate
            .run_batch_until(ctx(), tokio::time::sleep(Duration::from_millis(100)))
            .await;

        assert!(batch.cancelled);
        assert!(batch.results[&ModuleKey::PhotoCaptions].is_completed());
        assert_eq!(
            batch.results[&ModuleKey::StormCorrelation],
            ModuleOutcome::failed(&EnrichmentError::Cancelled)
        );
        assert_eq!(batch.total_cost, 2);
    }

    #[tokio::test]
    async fn failed_run_is_refunded() {
        let tracker = Arc::new(Tracker::default());
        let ledger = Arc::new(CreditLedger::new(5));
        let gate = gate(
            vec![
                MockModule::new(ModuleKey::PhotoCaptions, 2, Behavior::Succeed, &tracker),
                MockModule::new(ModuleKey::DamageNarrative, 3, Behavior::Fail, &tracker),
                MockModule::new(ModuleKey::ScopeReview, 1, Behavior::Succeed, &tracker),
            ],
            1,
            LONG,
        )
        .with_ledger(Arc::clone(&ledger));

        let batch = gate.run_batch(org_ctx("org_a")).await;

        // The failed narrative hands its 3 units back before scope review reserves.
        assert_eq!(batch.completed_count(), 2);
        assert_eq!(batch.total_cost, 3);
        assert_eq!(ledger.get("org_a").unwrap().used(), 3);
        assert_eq!(tracker.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn refused_module_leaves_siblings_running() {
        let tracker = Arc::new(Tracker::default());
        let ledger = Arc::new(CreditLedger::new(3));
        let gate = gate(
            vec![
                MockModule::new(ModuleKey::PhotoCaptions, 2, Behavior::Succeed, &tracker),
                MockModule::new(ModuleKey::DamageNarrative, 3, Behavior::Succeed, &tracker),
                MockModule::new(ModuleKey::ScopeReview, 1, Behavior::Succeed, &tracker),
            ],
            1,
            LONG,
        )
        .with_ledger(Arc::clone(&ledger));

        let batch = gate.run_batch(org_ctx("org_a")).await;

        assert_eq!(
            batch.results[&ModuleKey::DamageNarrative],
            ModuleOutcome::failed(&EnrichmentError::BudgetExceeded {
                requested: 3,
                remaining: 1
            })
        );
        assert!(batch.results[&ModuleKey::PhotoCaptions].is_completed());
        assert!(batch.results[&ModuleKey::ScopeReview].is_completed());
        assert_eq!(batch.total_cost, 3);
        assert_eq!(ledger.get("org_a").unwrap().used(), 3);
        assert_eq!(tracker.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dropped_batch_refunds_reservations() {
        let tracker = Arc::new(Tracker::default());
        let ledger = Arc::new(CreditLedger::new(10));
        let gate = gate(
            vec![MockModule::new(ModuleKey::StormCorrelation, 3, Behavior::Sleep(LONG), &tracker)],
            4,
            LONG,
        )
        .with_ledger(Arc::clone(&ledger));

        let batch = gate.run_batch(org_ctx("org_a"));
        assert!(tokio::time::timeout(Duration::from_millis(50), batch).await.is_err());
        assert_eq!(tracker.runs.load(Ordering::SeqCst), 1);

        // Aborted tasks release their guards once the runtime drops them.
        let budget = ledger.get("org_a").unwrap();
        for _ in 0..50 {
            if budget.used() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(budget.used(), 0);
    }

    #[tokio::test]
    async fn cancelled_module_is_refunded() {
        let tracker = Arc::new(Tracker::default());
        let ledger = Arc::new(CreditLedger::new(10));
        let gate = gate(
            vec![
                MockModule::new(ModuleKey::PhotoCaptions, 2, Behavior::Succeed, &tracker),
                MockModule::new(ModuleKey::StormCorrelation, 3, Behavior::Sleep(LONG), &tracker),
            ],
            4,
            LONG,
        )
        .with_ledger(Arc::clone(&ledger));

        let batch = gate
            .run_batch_until(org_ctx("org_a"), tokio::time::sleep(Duration::from_millis(50)))
            .await;

        assert!(batch.cancelled);
        assert_eq!(batch.total_cost, 2);
        assert_eq!(ledger.get("org_a").unwrap().used(), 2);
    }

    #[tokio::test]
    async fn orgs_are_billed_separately() {
        let tracker = Arc::new(Tracker::default());
        let ledger = Arc::new(CreditLedger::new(5));
        ledger.insert(CreditBudget::with_usage("org_b", 5, 4));
        let gate = gate(
            vec![MockModule::new(ModuleKey::PhotoCaptions, 2, Behavior::Succeed, &tracker)],
            4,
            LONG,
        )
        .with_ledger(Arc::clone(&ledger));

        let a = gate.run_batch(org_ctx("org_a")).await;
        let b = gate.run_batch(org_ctx("org_b")).await;

        assert!(a.results[&ModuleKey::PhotoCaptions].is_completed());
        assert_eq!(
            b.results[&ModuleKey::PhotoCaptions],
            ModuleOutcome::failed(&EnrichmentError::BudgetExceeded {
                requested: 2,
                remaining: 1
            })
        );
        assert_eq!(ledger.get("org_a").unwrap().used(), 2);
        assert_eq!(ledger.get("org_b").unwrap().used(), 4);
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn missing_org_refused_when_metered() {
        let tracker = Arc::new(Tracker::default());
        let ledger = Arc::new(CreditLedger::new(5));
        let gate = gate(
            vec![MockModule::new(ModuleKey::ScopeReview, 1, Behavior::Succeed, &tracker)],
            4,
            LONG,
        )
        .with_ledger(Arc::clone(&ledger));

        let batch = gate.run_batch(org_ctx("  ")).await;

        assert_eq!(
            batch.results[&ModuleKey::ScopeReview],
            ModuleOutcome::failed(&EnrichmentError::MissingOrg)
        );
        assert_eq!(tracker.runs.load(Ordering::SeqCst), 0);
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn empty_registry_yields_empty_batch() {
        let gate = gate(Vec::new(), 4, LONG);
        let batch = gate.run_batch(ctx()).await;
        assert!(batch.results.is_empty());
        assert!(!batch.cancelled);
        assert_eq!(batch.total_cost, 0);
    }
}
