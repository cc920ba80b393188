//! Periodic task execution.
//!
//! A ticker enqueues one job per interval; a fixed pool of workers drains the
//! queue and runs the task. When every worker is busy and the queue is full,
//! the tick is dropped rather than queued without bound.

use crate::config::SchedulerConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Unit of work executed on every tick.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    async fn run(&self) -> anyhow::Result<()>;
}

/// Execution counters.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStats {
    pub execution_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub dropped_ticks: u64,
    pub last_execution: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Clone, Default)]
struct SharedStats(Arc<Mutex<SchedulerStats>>);

impl SharedStats {
    fn lock(&self) -> MutexGuard<'_, SchedulerStats> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, result: &anyhow::Result<()>) {
        let mut stats = self.lock();
        stats.execution_count += 1;
        stats.last_execution = Some(Utc::now());
        match result {
            Ok(()) => stats.success_count += 1,
            Err(e) => {
                stats.error_count += 1;
                stats.last_error = Some(format!("{e:#}"));
            }
        }
    }

    fn record_dropped(&self) {
        self.lock().dropped_ticks += 1;
    }
}

struct Running {
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

/// Runs a [`Task`] on a fixed interval with a bounded worker pool.
pub struct Scheduler<T: Task> {
    interval: Duration,
    worker_pool_size: usize,
    task: Arc<T>,
    stats: SharedStats,
    running: Option<Running>,
}

impl<T: Task> Scheduler<T> {
    pub fn new(config: &SchedulerConfig, task: Arc<T>) -> anyhow::Result<Self> {
        if config.interval.is_zero() {
            anyhow::bail!("Scheduler interval must be positive");
        }
        if config.worker_pool_size == 0 {
            anyhow::bail!("Scheduler needs at least one worker");
        }

        Ok(Self {
            interval: config.interval,
            worker_pool_size: config.worker_pool_size,
            task,
            stats: SharedStats::default(),
            running: None,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Snapshot of the execution counters.
    pub fn stats(&self) -> SchedulerStats {
        self.stats.lock().clone()
    }

    /// Spawn the ticker and workers. The first tick fires immediately.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.running.is_some() {
            anyhow::bail!("Scheduler is already running");
        }

        let (shutdown_tx, _) = broadcast::channel(1);
        let (job_tx, job_rx) = mpsc::channel::<()>(self.worker_pool_size);
        let job_rx = Arc::new(tokio::sync::Mutex::new(job_rx));

        let mut handles = Vec::with_capacity(self.worker_pool_size + 1);
        for worker_id in 0..self.worker_pool_size {
            handles.push(tokio::spawn(worker_loop(
                worker_id,
                Arc::clone(&self.task),
                Arc::clone(&job_rx),
                self.stats.clone(),
                shutdown_tx.subscribe(),
            )));
        }
        handles.push(tokio::spawn(ticker_loop(
            self.interval,
            job_tx,
            self.stats.clone(),
            shutdown_tx.subscribe(),
        )));

        info!(
            "Scheduler started: interval={:?}, workers={}",
            self.interval, self.worker_pool_size
        );
        self.running = Some(Running {
            shutdown_tx,
            handles,
        });
        Ok(())
    }

    /// Signal shutdown and wait for in-flight executions to finish.
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        let Some(running) = self.running.take() else {
            anyhow::bail!("Scheduler is not running");
        };

        info!("Stopping scheduler");
        let _ = running.shutdown_tx.send(());
        for handle in running.handles {
            if let Err(e) = handle.await {
                error!("Scheduler task panicked: {}", e);
            }
        }
        info!("Scheduler stopped");
        Ok(())
    }
}

async fn ticker_loop(
    period: Duration,
    job_tx: mpsc::Sender<()>,
    stats: SharedStats,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break,
            _ = ticker.tick() => {
                if let Err(mpsc::error::TrySendError::Full(())) = job_tx.try_send(()) {
                    warn!("All workers busy, skipping scheduled execution");
                    stats.record_dropped();
                }
            }
        }
    }
}

async fn worker_loop<T: Task>(
    worker_id: usize,
    task: Arc<T>,
    job_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<()>>>,
    stats: SharedStats,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => None,
            job = async { job_rx.lock().await.recv().await } => job,
        };
        if job.is_none() {
            break;
        }

        debug!("Worker {} executing task", worker_id);
        let result = task.run().await;
        if let Err(e) = &result {
            error!("Worker {} task failed: {:#}", worker_id, e);
        }
        stats.record(&result);
    }
    debug!("Worker {} stopped", worker_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingTask {
        runs: AtomicU64,
        fail: bool,
    }

    impl CountingTask {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                runs: AtomicU64::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl Task for CountingTask {
        async fn run(&self) -> anyhow::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    fn config(interval: Duration, workers: usize) -> SchedulerConfig {
        SchedulerConfig {
            enabled: true,
            interval,
            worker_pool_size: workers,
        }
    }

    #[tokio::test]
    async fn test_runs_periodically() {
        let task = CountingTask::new(false);
        let mut scheduler =
            Scheduler::new(&config(Duration::from_millis(20), 2), Arc::clone(&task)).unwrap();

        scheduler.start().unwrap();
        assert!(scheduler.is_running());
        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());

        let stats = scheduler.stats();
        assert!(stats.execution_count >= 2, "{stats:?}");
        assert_eq!(stats.execution_count, stats.success_count);
        assert_eq!(stats.error_count, 0);
        assert!(stats.last_execution.is_some());
        assert_eq!(task.runs.load(Ordering::SeqCst), stats.execution_count);
    }

    #[tokio::test]
    async fn test_records_errors() {
        let task = CountingTask::new(true);
        let mut scheduler =
            Scheduler::new(&config(Duration::from_millis(20), 1), Arc::clone(&task)).unwrap();

        scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        scheduler.stop().await.unwrap();

        let stats = scheduler.stats();
        assert!(stats.error_count >= 1);
        assert_eq!(stats.success_count, 0);
        assert_eq!(stats.last_error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_start_stop_state() {
        let task = CountingTask::new(false);
        let mut scheduler = Scheduler::new(&config(Duration::from_secs(60), 1), task).unwrap();

        assert!(scheduler.stop().await.is_err());
        scheduler.start().unwrap();
        assert!(scheduler.start().is_err());
        scheduler.stop().await.unwrap();
        assert!(scheduler.stop().await.is_err());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let task = CountingTask::new(false);
        assert!(Scheduler::new(&config(Duration::ZERO, 1), Arc::clone(&task)).is_err());
        assert!(Scheduler::new(&config(Duration::from_secs(1), 0), task).is_err());
    }
}
