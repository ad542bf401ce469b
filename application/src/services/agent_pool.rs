//! Agent pool manager
//!
//! Owns per-[`AgentType`] pools of reusable agent instances and the
//! conversation affinity map. Callers borrow an instance through
//! [`AgentPoolManager::get_agent`] and hand it back with
//! [`AgentPoolManager::return_agent`]; every mutation of instance state goes
//! through these methods.
//!
//! # Capacity
//!
//! For every agent type the number of pooled instances plus in-flight
//! creations never exceeds [`PoolConfig::max_pool_size_for`]. A caller that
//! finds its pool full (after evicting idle and unhealthy instances) waits
//! until an instance is released or evicted, bounded by
//! [`PoolConfig::acquire_timeout`].
//!
//! # Affinity
//!
//! Conversation affinity is best-effort and last-writer-wins: two concurrent
//! requests for the same conversation may bind to different instances, and
//! the later bind replaces the earlier one.

use crate::ports::agent::{Agent, AgentCallError, AgentFactory};
use futures::future::join_all;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use switchboard_domain::{
    AgentConfig, AgentType, ExecutionOutcome, HealthProbe, HealthStatus, InstanceId, PoolConfig,
    PoolSnapshot, TypeSnapshot,
};
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Probes that do not answer within this window count as unhealthy.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Agent pool for {agent_type} is exhausted ({max} instances in use)")]
    Exhausted { agent_type: AgentType, max: usize },

    #[error("Failed to create {agent_type} agent: {source}")]
    Creation {
        agent_type: AgentType,
        source: AgentCallError,
    },

    #[error("Agent pool has been shut down")]
    ShutDown,
}

/// A borrowed pool instance.
///
/// Hand it back with [`AgentPoolManager::return_agent`] when done.
#[derive(Clone)]
pub struct AgentLease {
    pub instance_id: InstanceId,
    pub agent_type: AgentType,
    pub agent: Arc<dyn Agent>,
}

impl fmt::Debug for AgentLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentLease")
            .field("instance_id", &self.instance_id)
            .field("agent_type", &self.agent_type)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a pooled instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceInfo {
    pub id: InstanceId,
    pub agent_type: AgentType,
    pub is_active: bool,
    pub health: HealthStatus,
    pub usage_count: u64,
    pub idle_for: Duration,
    pub age: Duration,
}

struct PooledAgentInstance {
    id: InstanceId,
    agent_type: AgentType,
    agent: Arc<dyn Agent>,
    health: HealthStatus,
    usage_count: u64,
    created_at: Instant,
    last_used_at: Instant,
    /// Acquisition time of every outstanding borrow, oldest first
    borrows: Vec<Instant>,
}

impl PooledAgentInstance {
    fn new(agent_type: AgentType, agent: Arc<dyn Agent>, now: Instant) -> Self {
        Self {
            id: InstanceId::generate(agent_type.as_str()),
            agent_type,
            agent,
            health: HealthStatus::Healthy,
            usage_count: 0,
            created_at: now,
            last_used_at: now,
            borrows: Vec::new(),
        }
    }

    fn is_active(&self) -> bool {
        !self.borrows.is_empty()
    }

    /// Only healthy instances are handed out.
    fn is_acquirable(&self) -> bool {
        self.health.is_healthy()
    }

    fn activate(&mut self, now: Instant) -> AgentLease {
        self.last_used_at = now;
        self.borrows.push(now);
        AgentLease {
            instance_id: self.id.clone(),
            agent_type: self.agent_type,
            agent: Arc::clone(&self.agent),
        }
    }

    /// Idle and either unhealthy or past `idle_timeout`. With
    /// `reclaim_degraded`, idle degraded instances qualify too.
    fn is_evictable(&self, now: Instant, idle_timeout: Duration, reclaim_degraded: bool) -> bool {
        !self.is_active()
            && (self.health == HealthStatus::Unhealthy
                || (reclaim_degraded && !self.health.is_healthy())
                || now.saturating_duration_since(self.last_used_at) > idle_timeout)
    }

    fn info(&self, now: Instant) -> InstanceInfo {
        InstanceInfo {
            id: self.id.clone(),
            agent_type: self.agent_type,
            is_active: self.is_active(),
            health: self.health,
            usage_count: self.usage_count,
            idle_for: now.saturating_duration_since(self.last_used_at),
            age: now.saturating_duration_since(self.created_at),
        }
    }
}

struct ConversationAffinity {
    instance_id: InstanceId,
    agent_type: AgentType,
    last_accessed_at: Instant,
}

#[derive(Default)]
struct PoolState {
    pools: HashMap<AgentType, Vec<PooledAgentInstance>>,
    /// Creations in flight, counted against the maximum
    pending: HashMap<AgentType, usize>,
    affinities: HashMap<String, ConversationAffinity>,
    hits: u64,
    misses: u64,
    executions: u64,
    total_execution_time: Duration,
    shut_down: bool,
}

impl PoolState {
    fn occupancy(&self, agent_type: AgentType) -> usize {
        self.pools.get(&agent_type).map_or(0, Vec::len)
            + self.pending.get(&agent_type).copied().unwrap_or(0)
    }

    fn release_pending(&mut self, agent_type: AgentType) {
        if let Some(count) = self.pending.get_mut(&agent_type) {
            *count = count.saturating_sub(1);
        }
    }

    /// Affinity first, then the first idle healthy instance.
    fn acquire_existing(
        &mut self,
        agent_type: AgentType,
        conversation_id: Option<&str>,
        now: Instant,
    ) -> Option<AgentLease> {
        let pool = self.pools.get_mut(&agent_type)?;

        let bound = conversation_id
            .and_then(|conversation| self.affinities.get(conversation))
            .filter(|affinity| affinity.agent_type == agent_type)
            .and_then(|affinity| {
                pool.iter()
                    .position(|i| i.id == affinity.instance_id && i.is_acquirable())
            });
        let index =
            bound.or_else(|| pool.iter().position(|i| !i.is_active() && i.is_acquirable()))?;

        let lease = pool[index].activate(now);
        self.hits += 1;
        if let Some(conversation) = conversation_id {
            self.bind(conversation, &lease, now);
        }
        Some(lease)
    }

    fn bind(&mut self, conversation_id: &str, lease: &AgentLease, now: Instant) {
        self.affinities.insert(
            conversation_id.to_string(),
            ConversationAffinity {
                instance_id: lease.instance_id.clone(),
                agent_type: lease.agent_type,
                last_accessed_at: now,
            },
        );
    }

    fn take_evictable(
        &mut self,
        agent_type: AgentType,
        now: Instant,
        idle_timeout: Duration,
        reclaim_degraded: bool,
    ) -> Vec<PooledAgentInstance> {
        let Some(pool) = self.pools.get_mut(&agent_type) else {
            return Vec::new();
        };
        let (evicted, kept): (Vec<_>, Vec<_>) = std::mem::take(pool)
            .into_iter()
            .partition(|i| i.is_evictable(now, idle_timeout, reclaim_degraded));
        *pool = kept;

        if !evicted.is_empty() {
            self.affinities
                .retain(|_, affinity| evicted.iter().all(|i| i.id != affinity.instance_id));
        }
        evicted
    }

    fn find_mut(&mut self, id: &InstanceId) -> Option<&mut PooledAgentInstance> {
        self.pools
            .values_mut()
            .flat_map(|pool| pool.iter_mut())
            .find(|i| &i.id == id)
    }
}

/// Counts an in-flight creation against the pool maximum until committed.
struct Reservation<'a> {
    manager: &'a AgentPoolManager,
    agent_type: AgentType,
    committed: bool,
}

impl Reservation<'_> {
    fn commit(mut self, state: &mut PoolState, instance: PooledAgentInstance) {
        state.release_pending(self.agent_type);
        state.pools.entry(self.agent_type).or_default().push(instance);
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.manager.state().release_pending(self.agent_type);
            self.manager.available.notify_waiters();
        }
    }
}

enum Acquire<'a> {
    Ready(AgentLease),
    Create(Reservation<'a>),
    Wait,
}

/// Bounded, reusable pools of agent instances.
pub struct AgentPoolManager {
    factory: Arc<dyn AgentFactory>,
    config: PoolConfig,
    agent_configs: HashMap<AgentType, AgentConfig>,
    state: Mutex<PoolState>,
    /// Woken whenever an instance is released, evicted or a reservation lapses
    available: Notify,
    cancel: CancellationToken,
    health_task: Mutex<Option<JoinHandle<()>>>,
}

impl AgentPoolManager {
    pub fn new(factory: Arc<dyn AgentFactory>, config: PoolConfig) -> Self {
        Self {
            factory,
            config,
            agent_configs: HashMap::new(),
            state: Mutex::new(PoolState::default()),
            available: Notify::new(),
            cancel: CancellationToken::new(),
            health_task: Mutex::new(None),
        }
    }

    /// Override the configuration handed to the factory for one agent type.
    pub fn with_agent_config(mut self, config: AgentConfig) -> Self {
        self.agent_configs.insert(config.agent_type(), config);
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn agent_config(&self, agent_type: AgentType) -> AgentConfig {
        self.agent_configs
            .get(&agent_type)
            .cloned()
            .unwrap_or_else(|| AgentConfig::default_for(agent_type))
    }

    fn state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pre-warm `min_pool_size` instances per type.
    ///
    /// Creation failures are logged and skipped. Returns the number of
    /// instances created.
    pub async fn initialize(&self, agent_types: &[AgentType]) -> usize {
        if let Err(e) = self.config.validate() {
            warn!("{}, pre-warming at most max_pool_size instances", e);
        }
        let mut created = 0;
        for &agent_type in agent_types {
            let target = self
                .config
                .min_pool_size
                .min(self.config.max_pool_size_for(agent_type));

            for _ in 0..target {
                let Some(reservation) = self.reserve(agent_type) else {
                    break;
                };
                match self.create_instance(agent_type).await {
                    Ok(instance) => {
                        reservation.commit(&mut self.state(), instance);
                        created += 1;
                    }
                    Err(e) => warn!("Skipping pre-warm of {} agent: {}", agent_type, e),
                }
            }
        }
        info!("Agent pool initialized with {} instances", created);
        created
    }

    fn reserve(&self, agent_type: AgentType) -> Option<Reservation<'_>> {
        let mut state = self.state();
        if state.shut_down || state.occupancy(agent_type) >= self.config.max_pool_size_for(agent_type)
        {
            return None;
        }
        *state.pending.entry(agent_type).or_default() += 1;
        Some(Reservation {
            manager: self,
            agent_type,
            committed: false,
        })
    }

    /// Borrow an instance of `agent_type`, preferring the conversation's
    /// bound instance when it is still usable.
    pub async fn get_agent(
        &self,
        agent_type: AgentType,
        conversation_id: Option<&str>,
    ) -> Result<AgentLease, PoolError> {
        let deadline = Instant::now() + self.config.acquire_timeout;

        loop {
            let available = self.available.notified();
            tokio::pin!(available);
            available.as_mut().enable();

            let (step, evicted) = self.try_acquire(agent_type, conversation_id)?;
            cleanup_instances(evicted).await;

            match step {
                Acquire::Ready(lease) => {
                    debug!(instance = %lease.instance_id, "Reusing {} agent", agent_type);
                    return Ok(lease);
                }
                Acquire::Create(reservation) => {
                    return self.create_leased(reservation, conversation_id).await;
                }
                Acquire::Wait => {
                    debug!("{} pool is full, waiting for a release", agent_type);
                    if tokio::time::timeout_at(deadline, available).await.is_err() {
                        return Err(PoolError::Exhausted {
                            agent_type,
                            max: self.config.max_pool_size_for(agent_type),
                        });
                    }
                }
            }
        }
    }

    fn try_acquire(
        &self,
        agent_type: AgentType,
        conversation_id: Option<&str>,
    ) -> Result<(Acquire<'_>, Vec<PooledAgentInstance>), PoolError> {
        let mut state = self.state();
        if state.shut_down {
            return Err(PoolError::ShutDown);
        }

        let now = Instant::now();
        if let Some(lease) = state.acquire_existing(agent_type, conversation_id, now) {
            return Ok((Acquire::Ready(lease), Vec::new()));
        }

        let max = self.config.max_pool_size_for(agent_type);
        let mut evicted = Vec::new();
        if state.occupancy(agent_type) >= max {
            // Idle degraded instances are never handed out, so reclaim their slots
            evicted = state.take_evictable(agent_type, now, self.config.idle_timeout, true);
            if !evicted.is_empty() {
                debug!("Evicted {} idle {} agents", evicted.len(), agent_type);
                self.available.notify_waiters();
            }
            if let Some(lease) = state.acquire_existing(agent_type, conversation_id, now) {
                return Ok((Acquire::Ready(lease), evicted));
            }
        }

        if state.occupancy(agent_type) < max {
            *state.pending.entry(agent_type).or_default() += 1;
            state.misses += 1;
            let reservation = Reservation {
                manager: self,
                agent_type,
                committed: false,
            };
            return Ok((Acquire::Create(reservation), evicted));
        }

        Ok((Acquire::Wait, evicted))
    }

    async fn create_leased(
        &self,
        reservation: Reservation<'_>,
        conversation_id: Option<&str>,
    ) -> Result<AgentLease, PoolError> {
        let agent_type = reservation.agent_type;
        let mut instance = self.create_instance(agent_type).await?;

        let orphan = {
            let mut state = self.state();
            if state.shut_down {
                Some(Arc::clone(&instance.agent))
            } else {
                let now = Instant::now();
                let lease = instance.activate(now);
                reservation.commit(&mut state, instance);
                if let Some(conversation) = conversation_id {
                    state.bind(conversation, &lease, now);
                }
                return Ok(lease);
            }
        };

        if let Some(agent) = orphan
            && let Err(e) = agent.cleanup().await
        {
            warn!("Cleanup of {} agent created during shutdown failed: {}", agent_type, e);
        }
        Err(PoolError::ShutDown)
    }

    async fn create_instance(&self, agent_type: AgentType) -> Result<PooledAgentInstance, PoolError> {
        let config = self.agent_config(agent_type);
        let agent = self
            .factory
            .create_agent(&config)
            .await
            .map_err(|source| PoolError::Creation { agent_type, source })?;

        let instance = PooledAgentInstance::new(agent_type, agent, Instant::now());
        debug!(instance = %instance.id, "Created {} agent", agent_type);
        Ok(instance)
    }

    /// Hand a borrowed instance back to its pool.
    ///
    /// Each call releases the oldest outstanding borrow; the instance goes
    /// idle once none remain. The outcome, when given, reclassifies the
    /// instance's health. Returns `false` for an unknown instance id.
    pub fn return_agent(&self, instance_id: &InstanceId, outcome: Option<&ExecutionOutcome>) -> bool {
        let now = Instant::now();
        let mut state = self.state();

        let Some(instance) = state.find_mut(instance_id) else {
            debug!(instance = %instance_id, "Ignoring return of unknown agent instance");
            return false;
        };

        let acquired = (!instance.borrows.is_empty()).then(|| instance.borrows.remove(0));
        instance.last_used_at = now;
        instance.usage_count += 1;
        if let Some(outcome) = outcome {
            instance.health = outcome.health_status();
        }
        if let Some(acquired) = acquired {
            state.executions += 1;
            state.total_execution_time += now.saturating_duration_since(acquired);
        }
        drop(state);

        self.available.notify_waiters();
        true
    }

    /// Remove idle instances of `agent_type` past the idle timeout, plus idle
    /// unhealthy ones. Active instances are never evicted.
    pub async fn evict_idle_agents(&self, agent_type: AgentType) -> usize {
        let evicted = self
            .state()
            .take_evictable(agent_type, Instant::now(), self.config.idle_timeout, false);
        let count = evicted.len();
        if count > 0 {
            self.available.notify_waiters();
            info!("Evicted {} idle {} agents", count, agent_type);
        }
        cleanup_instances(evicted).await;
        count
    }

    /// Probe every pooled instance and update its health.
    pub async fn perform_health_check(&self) -> Vec<(InstanceId, HealthStatus)> {
        let targets: Vec<(InstanceId, Arc<dyn Agent>)> = self
            .state()
            .pools
            .values()
            .flatten()
            .map(|i| (i.id.clone(), Arc::clone(&i.agent)))
            .collect();

        let probes = join_all(targets.into_iter().map(|(id, agent)| async move {
            let started = Instant::now();
            let probe = tokio::time::timeout(PROBE_TIMEOUT, agent.check_health())
                .await
                .unwrap_or_else(|_| HealthProbe::unhealthy(started.elapsed()));
            (id, probe.status())
        }))
        .await;

        let mut state = self.state();
        for (id, status) in &probes {
            if let Some(instance) = state.find_mut(id) {
                if instance.health != *status {
                    debug!(instance = %id, "Health changed to {}", status.as_str());
                }
                instance.health = *status;
            }
        }
        probes
    }

    /// Spawn the periodic health check and idle eviction task.
    ///
    /// The task holds only a weak reference and stops on [`shutdown`](Self::shutdown)
    /// or when the manager is dropped.
    pub fn start_health_checks(self: &Arc<Self>) {
        let period = self.config.health_check_interval;
        if period.is_zero() {
            warn!("Health check interval is zero, periodic checks disabled");
            return;
        }

        let pool = Arc::downgrade(self);
        let cancel = self.cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(pool) = pool.upgrade() else { break };
                        pool.perform_health_check().await;
                        for agent_type in AgentType::ALL {
                            pool.evict_idle_agents(agent_type).await;
                        }
                    }
                }
            }
            debug!("Health check task stopped");
        });

        let previous = self
            .health_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stop health checks, clean up every instance and clear all state.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self
            .health_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            let _ = task.await;
        }

        let instances: Vec<PooledAgentInstance> = {
            let mut state = self.state();
            state.shut_down = true;
            state.affinities.clear();
            state.pending.clear();
            state.pools.drain().flat_map(|(_, pool)| pool).collect()
        };
        self.available.notify_waiters();

        let count = instances.len();
        cleanup_instances(instances).await;
        info!("Agent pool shut down, {} instances cleaned up", count);
    }

    /// Drop a conversation's affinity. Returns whether one existed.
    pub fn release_conversation(&self, conversation_id: &str) -> bool {
        self.state().affinities.remove(conversation_id).is_some()
    }

    /// Instance currently bound to a conversation, if any.
    pub fn bound_instance(&self, conversation_id: &str) -> Option<InstanceId> {
        self.state()
            .affinities
            .get(conversation_id)
            .map(|affinity| affinity.instance_id.clone())
    }

    pub fn pool_size(&self, agent_type: AgentType) -> usize {
        self.state().pools.get(&agent_type).map_or(0, Vec::len)
    }

    pub fn active_count(&self, agent_type: AgentType) -> usize {
        self.state()
            .pools
            .get(&agent_type)
            .map_or(0, |pool| pool.iter().filter(|i| i.is_active()).count())
    }

    pub fn instances(&self, agent_type: AgentType) -> Vec<InstanceInfo> {
        let now = Instant::now();
        self.state()
            .pools
            .get(&agent_type)
            .map(|pool| pool.iter().map(|i| i.info(now)).collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.state();
        let mut snapshot = PoolSnapshot::default();

        for instance in state.pools.values().flatten() {
            snapshot
                .by_type
                .entry(instance.agent_type)
                .or_insert_with(TypeSnapshot::default)
                .record(instance.is_active(), instance.health);
            snapshot.total_agents += 1;
            if instance.is_active() {
                snapshot.active_agents += 1;
            }
            snapshot.memory_usage_bytes += instance.agent.memory_footprint();
        }
        snapshot.idle_agents = snapshot.total_agents - snapshot.active_agents;

        (snapshot.hit_rate, snapshot.miss_rate) = PoolSnapshot::rates(state.hits, state.misses);
        if state.executions > 0 {
            snapshot.avg_execution_time_ms =
                state.total_execution_time.as_secs_f64() * 1000.0 / state.executions as f64;
        }
        snapshot
    }
}

async fn cleanup_instances(instances: Vec<PooledAgentInstance>) {
    for instance in instances {
        if let Err(e) = instance.agent.cleanup().await {
            warn!(instance = %instance.id, "Agent cleanup failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use switchboard_domain::{AgentContext, AgentResponse};

    // -- Mock Agent / AgentFactory ---------------------------------------------

    struct MockAgent {
        agent_type: AgentType,
        probe: HealthProbe,
        probe_delay: Duration,
        cleanups: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Agent for MockAgent {
        fn agent_type(&self) -> AgentType {
            self.agent_type
        }

        async fn execute(&self, _context: &AgentContext) -> Result<AgentResponse, AgentCallError> {
            Ok(AgentResponse::new(self.agent_type, "ok"))
        }

        async fn check_health(&self) -> HealthProbe {
            tokio::time::sleep(self.probe_delay).await;
            self.probe
        }

        async fn cleanup(&self) -> Result<(), AgentCallError> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            Err(AgentCallError::Cleanup("already closed".to_string()))
        }

        fn memory_footprint(&self) -> usize {
            1024
        }
    }

    struct MockFactory {
        created: AtomicUsize,
        cleanups: Arc<AtomicUsize>,
        fail: AtomicBool,
        creation_delay: Duration,
        probe: HealthProbe,
        probe_delay: Duration,
    }

    impl MockFactory {
        fn new() -> Self {
            Self {
                created: AtomicUsize::new(0),
                cleanups: Arc::new(AtomicUsize::new(0)),
                fail: AtomicBool::new(false),
                creation_delay: Duration::ZERO,
                probe: HealthProbe::healthy(Duration::from_millis(10)),
                probe_delay: Duration::ZERO,
            }
        }

        fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentFactory for MockFactory {
        async fn create_agent(
            &self,
            config: &AgentConfig,
        ) -> Result<Arc<dyn Agent>, AgentCallError> {
            if !self.creation_delay.is_zero() {
                tokio::time::sleep(self.creation_delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(AgentCallError::Creation("sandbox unavailable".to_string()));
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockAgent {
                agent_type: config.agent_type(),
                probe: self.probe,
                probe_delay: self.probe_delay,
                cleanups: Arc::clone(&self.cleanups),
            }))
        }
    }

    fn manager(factory: Arc<MockFactory>, config: PoolConfig) -> AgentPoolManager {
        AgentPoolManager::new(factory, config)
    }

    // -- initialize ------------------------------------------------------------

    #[tokio::test]
    async fn initialize_prewarms_min_pool_size() {
        let factory = Arc::new(MockFactory::new());
        let pool = manager(factory.clone(), PoolConfig::default().with_min_pool_size(2));

        let created = pool
            .initialize(&[AgentType::WebSearch, AgentType::UrlPull])
            .await;

        assert_eq!(created, 4);
        assert_eq!(pool.pool_size(AgentType::WebSearch), 2);
        assert_eq!(pool.active_count(AgentType::WebSearch), 0);
    }

    #[tokio::test]
    async fn initialize_skips_failed_creations() {
        let factory = Arc::new(MockFactory::new());
        factory.fail.store(true, Ordering::SeqCst);
        let pool = manager(factory, PoolConfig::default());

        assert_eq!(pool.initialize(&[AgentType::WebSearch]).await, 0);
        assert_eq!(pool.pool_size(AgentType::WebSearch), 0);
    }

    // -- get_agent / return_agent ----------------------------------------------

    #[tokio::test]
    async fn idle_instance_is_reused() {
        let factory = Arc::new(MockFactory::new());
        let pool = manager(factory.clone(), PoolConfig::default());

        let first = pool.get_agent(AgentType::WebSearch, None).await.unwrap();
        assert!(pool.return_agent(&first.instance_id, Some(&ExecutionOutcome::Success)));
        let second = pool.get_agent(AgentType::WebSearch, None).await.unwrap();

        assert_eq!(first.instance_id, second.instance_id);
        assert_eq!(factory.created(), 1);

        let snapshot = pool.snapshot();
        assert_eq!(snapshot.hit_rate, 0.5);
        assert_eq!(snapshot.miss_rate, 0.5);
    }

    #[tokio::test]
    async fn affinity_returns_same_instance_without_return() {
        let factory = Arc::new(MockFactory::new());
        let pool = manager(factory, PoolConfig::default());

        let first = pool
            .get_agent(AgentType::LocalKnowledge, Some("conv-1"))
            .await
            .unwrap();
        let second = pool
            .get_agent(AgentType::LocalKnowledge, Some("conv-1"))
            .await
            .unwrap();

        assert_eq!(first.instance_id, second.instance_id);
        assert_eq!(pool.pool_size(AgentType::LocalKnowledge), 1);
        assert_eq!(pool.bound_instance("conv-1"), Some(first.instance_id));
    }

    #[tokio::test]
    async fn affinity_is_superseded_when_instance_unhealthy() {
        let factory = Arc::new(MockFactory::new());
        let pool = manager(factory, PoolConfig::default());

        let first = pool
            .get_agent(AgentType::WebSearch, Some("conv-1"))
            .await
            .unwrap();
        pool.return_agent(
            &first.instance_id,
            Some(&ExecutionOutcome::failure("connection refused")),
        );

        let second = pool
            .get_agent(AgentType::WebSearch, Some("conv-1"))
            .await
            .unwrap();
        assert_ne!(first.instance_id, second.instance_id);
        assert_eq!(pool.bound_instance("conv-1"), Some(second.instance_id));
    }

    #[tokio::test]
    async fn release_conversation_drops_affinity() {
        let pool = manager(Arc::new(MockFactory::new()), PoolConfig::default());
        pool.get_agent(AgentType::UrlPull, Some("conv-9")).await.unwrap();

        assert!(pool.release_conversation("conv-9"));
        assert!(!pool.release_conversation("conv-9"));
        assert_eq!(pool.bound_instance("conv-9"), None);
    }

    #[tokio::test]
    async fn return_agent_reclassifies_health() {
        let pool = manager(Arc::new(MockFactory::new()), PoolConfig::default());
        let lease = pool.get_agent(AgentType::WebSearch, None).await.unwrap();

        pool.return_agent(
            &lease.instance_id,
            Some(&ExecutionOutcome::failure("Agent execution timed out after 30s")),
        );
        let info = &pool.instances(AgentType::WebSearch)[0];
        assert_eq!(info.health, HealthStatus::Degraded);
        assert_eq!(info.usage_count, 1);
        assert!(!info.is_active);


        let again = pool.get_agent(AgentType::WebSearch, None).await.unwrap();
        assert_ne!(again.instance_id, lease.instance_id);
        assert_eq!(pool.pool_size(AgentType::WebSearch), 2);
    }

    #[tokio::test]
    async fn affinity_skips_degraded_instance() {
        let factory = Arc::new(MockFactory::new());
        let pool = manager(factory.clone(), PoolConfig::default());
        let first = pool
            .get_agent(AgentType::WebSearch, Some("conv-1"))
            .await
            .unwrap();
        pool.return_agent(
            &first.instance_id,
            Some(&ExecutionOutcome::failure("request timed out")),
        );

        let second = pool
            .get_agent(AgentType::WebSearch, Some("conv-1"))
            .await
            .unwrap();
        assert_ne!(second.instance_id, first.instance_id);
        assert_eq!(pool.bound_instance("conv-1"), Some(second.instance_id));
        assert_eq!(factory.created(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn full_pool_reclaims_idle_degraded_instance() {
        let factory = Arc::new(MockFactory::new());
        let pool = manager(factory.clone(), PoolConfig::default().with_max_pool_size(1));
        let lease = pool.get_agent(AgentType::UrlPull, None).await.unwrap();
        pool.return_agent(
            &lease.instance_id,
            Some(&ExecutionOutcome::failure("Agent execution timed out after 30s")),
        );

        let fresh = pool.get_agent(AgentType::UrlPull, None).await.unwrap();
        assert_ne!(fresh.instance_id, lease.instance_id);
        assert_eq!(pool.pool_size(AgentType::UrlPull), 1);
        assert_eq!(factory.cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_keeps_degraded_instance_out_of_rotation() {
        let mut factory = MockFactory::new();
        factory.probe = HealthProbe::healthy(Duration::from_millis(6_000));
        let factory = Arc::new(factory);
        let pool = manager(factory.clone(), PoolConfig::default());
        pool.initialize(&[AgentType::WebSearch]).await;
        pool.perform_health_check().await;

        pool.get_agent(AgentType::WebSearch, None).await.unwrap();
        assert_eq!(factory.created(), 2);
        // idle degraded instances survive routine eviction
        assert_eq!(pool.evict_idle_agents(AgentType::WebSearch).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_affinity_borrows_are_each_counted() {
        let pool = manager(Arc::new(MockFactory::new()), PoolConfig::default());
        let first = pool
            .get_agent(AgentType::LocalKnowledge, Some("conv-1"))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        let second = pool
            .get_agent(AgentType::LocalKnowledge, Some("conv-1"))
            .await
            .unwrap();
        assert_eq!(first.instance_id, second.instance_id);

        tokio::time::advance(Duration::from_secs(2)).await;
        pool.return_agent(&first.instance_id, Some(&ExecutionOutcome::Success));
        assert_eq!(pool.active_count(AgentType::LocalKnowledge), 1);
        pool.return_agent(&second.instance_id, Some(&ExecutionOutcome::Success));
        assert_eq!(pool.active_count(AgentType::LocalKnowledge), 0);

        // borrows of 6 s and 2 s
        assert_eq!(pool.snapshot().avg_execution_time_ms, 4000.0);
    }

    #[tokio::test]
    async fn return_of_unknown_instance_is_ignored() {
        let pool = manager(Arc::new(MockFactory::new()), PoolConfig::default());
        assert!(!pool.return_agent(&InstanceId::new("missing"), None));
    }

    #[tokio::test]
    async fn creation_failure_propagates_and_frees_reservation() {
        let factory = Arc::new(MockFactory::new());
        factory.fail.store(true, Ordering::SeqCst);
        let pool = manager(factory.clone(), PoolConfig::default().with_max_pool_size(1));

        let err = pool
            .get_agent(AgentType::CodeInterpreter, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::Creation { .. }));
        assert!(err.to_string().contains("sandbox unavailable"));

        factory.fail.store(false, Ordering::SeqCst);
        assert!(pool.get_agent(AgentType::CodeInterpreter, None).await.is_ok());
    }

    // -- capacity --------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn full_pool_times_out_with_exhausted() {
        let pool = manager(
            Arc::new(MockFactory::new()),
            PoolConfig::default()
                .with_max_pool_size(1)
                .with_acquire_timeout(Duration::from_secs(2)),
        );
        let _held = pool.get_agent(AgentType::WebSearch, None).await.unwrap();

        let err = pool.get_agent(AgentType::WebSearch, None).await.unwrap_err();
        assert!(matches!(
            err,
            PoolError::Exhausted {
                agent_type: AgentType::WebSearch,
                max: 1
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_is_woken_by_release() {
        let pool = Arc::new(manager(
            Arc::new(MockFactory::new()),
            PoolConfig::default().with_max_pool_size(1),
        ));
        let held = pool.get_agent(AgentType::WebSearch, None).await.unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.get_agent(AgentType::WebSearch, None).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        pool.return_agent(&held.instance_id, Some(&ExecutionOutcome::Success));

        let lease = waiter.await.unwrap().unwrap();
        assert_eq!(lease.instance_id, held.instance_id);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_acquisitions_respect_max_pool_size() {
        let mut factory = MockFactory::new();
        factory.creation_delay = Duration::from_millis(50);
        let factory = Arc::new(factory);
        let pool = Arc::new(manager(
            factory.clone(),
            PoolConfig::default()
                .with_max_pool_size(2)
                .with_acquire_timeout(Duration::from_secs(1)),
        ));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let pool = Arc::clone(&pool);
                tokio::spawn(async move { pool.get_agent(AgentType::WebSearch, None).await })
            })
            .collect();

        let mut leased = 0;
        let mut exhausted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => leased += 1,
                Err(PoolError::Exhausted { .. }) => exhausted += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
            assert!(pool.active_count(AgentType::WebSearch) <= 2);
            assert!(pool.pool_size(AgentType::WebSearch) <= 2);
        }

        assert_eq!(leased, 2);
        assert_eq!(exhausted, 1);
        assert_eq!(factory.created(), 2);
    }

    #[tokio::test]
    async fn per_type_override_bounds_pool() {
        let pool = manager(
            Arc::new(MockFactory::new()),
            PoolConfig::default()
                .with_max_pool_size_for(AgentType::UrlPull, 0)
                .with_acquire_timeout(Duration::ZERO),
        );
        assert!(matches!(
            pool.get_agent(AgentType::UrlPull, None).await,
            Err(PoolError::Exhausted { max: 0, .. })
        ));
    }

    // -- eviction --------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn eviction_removes_only_idle_expired_instances() {
        let factory = Arc::new(MockFactory::new());
        let pool = manager(
            factory.clone(),
            PoolConfig::default().with_idle_timeout(Duration::from_secs(60)),
        );

        let idle = pool.get_agent(AgentType::WebSearch, None).await.unwrap();
        let busy = pool.get_agent(AgentType::WebSearch, None).await.unwrap();
        pool.return_agent(&idle.instance_id, Some(&ExecutionOutcome::Success));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(pool.evict_idle_agents(AgentType::WebSearch).await, 1);

        let remaining = pool.instances(AgentType::WebSearch);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, busy.instance_id);
        assert!(remaining[0].is_active);
        assert_eq!(factory.cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn eviction_removes_idle_unhealthy_instances() {
        let pool = manager(Arc::new(MockFactory::new()), PoolConfig::default());
        let lease = pool
            .get_agent(AgentType::WebSearch, Some("conv-1"))
            .await
            .unwrap();
        pool.return_agent(&lease.instance_id, Some(&ExecutionOutcome::failure("boom")));

        assert_eq!(pool.evict_idle_agents(AgentType::WebSearch).await, 1);
        assert_eq!(pool.pool_size(AgentType::WebSearch), 0);
        assert_eq!(pool.bound_instance("conv-1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn full_pool_evicts_expired_instance_before_waiting() {
        let factory = Arc::new(MockFactory::new());
        let pool = manager(
            factory.clone(),
            PoolConfig::default()
                .with_max_pool_size(1)
                .with_idle_timeout(Duration::from_secs(10)),
        );
        let lease = pool.get_agent(AgentType::WebSearch, None).await.unwrap();
        pool.return_agent(&lease.instance_id, Some(&ExecutionOutcome::failure("boom")));

        let fresh = pool.get_agent(AgentType::WebSearch, None).await.unwrap();
        assert_ne!(fresh.instance_id, lease.instance_id);
        assert_eq!(pool.pool_size(AgentType::WebSearch), 1);
        assert_eq!(factory.created(), 2);
    }

    // -- health checks ---------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn slow_healthy_probe_is_downgraded() {
        let mut factory = MockFactory::new();
        factory.probe = HealthProbe::healthy(Duration::from_millis(6_000));
        let pool = manager(Arc::new(factory), PoolConfig::default());
        pool.initialize(&[AgentType::WebSearch]).await;

        let results = pool.perform_health_check().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1, HealthStatus::Degraded);
        assert_eq!(pool.instances(AgentType::WebSearch)[0].health, HealthStatus::Degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_probe_marks_instance_unhealthy() {
        let mut factory = MockFactory::new();
        factory.probe_delay = Duration::from_secs(60);
        let pool = manager(Arc::new(factory), PoolConfig::default());
        pool.initialize(&[AgentType::UrlPull]).await;

        let results = pool.perform_health_check().await;
        assert_eq!(results[0].1, HealthStatus::Unhealthy);
    }

    #[tokio::test(start_paused = true)]
    async fn background_checks_evict_and_stop_on_shutdown() {
        let factory = Arc::new(MockFactory::new());
        let pool = Arc::new(manager(
            factory.clone(),
            PoolConfig::default()
                .with_idle_timeout(Duration::from_secs(30))
                .with_health_check_interval(Duration::from_secs(60)),
        ));
        pool.initialize(&[AgentType::WebSearch]).await;
        pool.start_health_checks();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(pool.pool_size(AgentType::WebSearch), 0);

        pool.shutdown().await;
        assert!(matches!(
            pool.get_agent(AgentType::WebSearch, None).await,
            Err(PoolError::ShutDown)
        ));
    }

    #[tokio::test]
    async fn shutdown_cleans_up_every_instance() {
        let factory = Arc::new(MockFactory::new());
        let pool = manager(factory.clone(), PoolConfig::default().with_min_pool_size(2));
        pool.initialize(&[AgentType::WebSearch, AgentType::LocalKnowledge])
            .await;
        pool.get_agent(AgentType::WebSearch, Some("conv")).await.unwrap();

        pool.shutdown().await;

        assert_eq!(factory.cleanups.load(Ordering::SeqCst), 4);
        assert_eq!(pool.snapshot().total_agents, 0);
        assert_eq!(pool.bound_instance("conv"), None);
    }

    // -- snapshot --------------------------------------------------------------

    #[tokio::test]
    async fn snapshot_reports_totals_and_memory() {
        let pool = manager(Arc::new(MockFactory::new()), PoolConfig::default());
        let a = pool.get_agent(AgentType::WebSearch, None).await.unwrap();
        let _b = pool.get_agent(AgentType::CodeInterpreter, None).await.unwrap();
        pool.return_agent(&a.instance_id, Some(&ExecutionOutcome::Success));

        let snapshot = pool.snapshot();
        assert_eq!(snapshot.total_agents, 2);
        assert_eq!(snapshot.active_agents, 1);
        assert_eq!(snapshot.idle_agents, 1);
        assert_eq!(snapshot.memory_usage_bytes, 2048);
        assert_eq!(snapshot.by_type[&AgentType::CodeInterpreter].active, 1);
    }
}
