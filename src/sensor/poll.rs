/// The repeating fetch-and-commit loop at the heart of the bridge.
use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::bridge::characteristics::{characteristic_updates, CharacteristicSink};
use crate::sensor::fetcher::Fetch;
use crate::sensor::state::StateStore;
use crate::utils::format_staleness;

/// Drives the fixed-interval polling cycle.
///
/// Each tick fetches one snapshot, commits it to the store and pushes the
/// classified characteristic values to the host sink. A failed fetch is
/// logged and recorded but never stops the loop; the bridge keeps serving
/// the previous good reading through outages of any length.
pub struct PollLoop<F: Fetch> {
    fetcher: F,
    store: Arc<StateStore>,
    sink: Arc<dyn CharacteristicSink>,
    interval: Duration,
}

impl<F: Fetch> PollLoop<F> {
    pub fn new(
        fetcher: F,
        store: Arc<StateStore>,
        sink: Arc<dyn CharacteristicSink>,
        interval: Duration,
    ) -> Self {
        PollLoop {
            fetcher,
            store,
            sink,
            interval,
        }
    }

    /// One fetch-and-commit cycle. Infallible by design: both outcomes are
    /// absorbed here. Public so tests can drive ticks without the timer.
    pub async fn tick(&self) {
        debug!("Polling sensor endpoint");

        match self.fetcher.fetch().await {
            Ok(reading) => {
                info!(
                    "Updated sensor data: eco2={:.0} ppm, tvoc={:.0} ppb, temperature={:.1} C, humidity={:.1}%, pressure={:.1} hPa, gas={:.1} kohm, aqi={}",
                    reading.eco2,
                    reading.tvoc,
                    reading.temperature,
                    reading.humidity,
                    reading.pressure,
                    reading.gas_kohms,
                    reading.aqi
                );
                self.store.update(reading.clone());
                for update in characteristic_updates(&reading) {
                    self.sink.update(update);
                }
            }
            Err(e) => {
                error!(
                    "Fetch failed: {} ({})",
                    e,
                    format_staleness(self.store.last_updated())
                );
                self.store.record_error(&e);
            }
        }
    }

    /// Run until the shutdown signal fires. The first tick happens one
    /// full interval after start; each subsequent tick is scheduled only
    /// once the previous fetch has completed, so at most one request is
    /// ever in flight.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        info!("Polling interval is {} ms", self.interval.as_millis());

        loop {
            tokio::select! {
                _ = sleep(self.interval) => self.tick().await,
                _ = &mut shutdown => {
                    info!("Poll loop shutting down");
                    break;
                }
            }
        }
    }
}

impl<F: Fetch + 'static> PollLoop<F> {
    /// Start the loop on the runtime and hand back its lifecycle handle.
    pub fn spawn(self) -> PollHandle {
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(self.run(rx));
        PollHandle { shutdown: tx, task }
    }
}

/// Handle for stopping a spawned poll loop.
pub struct PollHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Signal the loop to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::bridge::characteristics::CharacteristicUpdate;
    use crate::classify::{AirQuality, Co2Status};
    use crate::models::SensorReading;
    use crate::sensor::fetcher::{FetchError, FetchErrorKind};

    /// Replays a scripted sequence of fetch outcomes, then keeps
    /// succeeding with the default reading.
    struct ScriptedFetcher {
        results: Mutex<VecDeque<Result<SensorReading, FetchError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedFetcher {
        fn new(
            results: Vec<Result<SensorReading, FetchError>>,
        ) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                ScriptedFetcher {
                    results: Mutex::new(results.into()),
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Fetch for ScriptedFetcher {
        async fn fetch(&self) -> Result<SensorReading, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(SensorReading::default()))
        }
    }

    /// Collects pushed characteristic updates for inspection.
    #[derive(Default)]
    struct RecordingSink {
        updates: Mutex<Vec<CharacteristicUpdate>>,
    }

    impl CharacteristicSink for RecordingSink {
        fn update(&self, update: CharacteristicUpdate) {
            self.updates.lock().unwrap().push(update);
        }
    }

    fn sample_reading() -> SensorReading {
        SensorReading {
            eco2: 1500.0,
            tvoc: 300.0,
            temperature: 21.5,
            humidity: 45.2,
            pressure: 1013.0,
            gas_kohms: 50.0,
            aqi: 4,
        }
    }

    fn parse_failure() -> FetchError {
        FetchError::from(serde_json::from_slice::<SensorReading>(b"not json").unwrap_err())
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn successful_tick_commits_and_pushes_all_characteristics() {
        let (fetcher, _) = ScriptedFetcher::new(vec![Ok(sample_reading())]);
        let store = Arc::new(StateStore::new());
        let sink = Arc::new(RecordingSink::default());
        let poll = PollLoop::new(
            fetcher,
            Arc::clone(&store),
            sink.clone() as Arc<dyn CharacteristicSink>,
            Duration::from_millis(100),
        );

        poll.tick().await;

        assert_eq!(store.snapshot(), sample_reading());
        let updates = sink.updates.lock().unwrap().clone();
        assert_eq!(
            updates,
            vec![
                CharacteristicUpdate::Co2Detected(Co2Status::Abnormal),
                CharacteristicUpdate::Co2Level(1500),
                CharacteristicUpdate::AirQuality(AirQuality::Inferior),
                CharacteristicUpdate::VocDensity(300),
                CharacteristicUpdate::Temperature(21.5),
                CharacteristicUpdate::Humidity(45),
            ]
        );
    }

    #[tokio::test]
    async fn parse_failure_keeps_snapshot_and_pushes_nothing() {
        let (fetcher, _) =
            ScriptedFetcher::new(vec![Ok(sample_reading()), Err(parse_failure())]);
        let store = Arc::new(StateStore::new());
        let sink = Arc::new(RecordingSink::default());
        let poll = PollLoop::new(
            fetcher,
            Arc::clone(&store),
            sink.clone() as Arc<dyn CharacteristicSink>,
            Duration::from_millis(100),
        );

        poll.tick().await;
        sink.updates.lock().unwrap().clear();
        poll.tick().await;

        assert_eq!(store.snapshot(), sample_reading());
        assert_eq!(
            store.last_error().map(|e| e.kind),
            Some(FetchErrorKind::Parse)
        );
        assert!(sink.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn network_failure_keeps_snapshot() {
        let (fetcher, _) = ScriptedFetcher::new(vec![
            Ok(sample_reading()),
            Err(FetchError::Timeout(Duration::from_millis(50))),
        ]);
        let store = Arc::new(StateStore::new());
        let sink = Arc::new(RecordingSink::default());
        let poll = PollLoop::new(
            fetcher,
            Arc::clone(&store),
            sink.clone() as Arc<dyn CharacteristicSink>,
            Duration::from_millis(100),
        );

        poll.tick().await;
        poll.tick().await;

        assert_eq!(store.snapshot(), sample_reading());
        assert_eq!(
            store.last_error().map(|e| e.kind),
            Some(FetchErrorKind::Network)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_fire_at_the_configured_interval() {
        let (fetcher, calls) = ScriptedFetcher::new(vec![]);
        let store = Arc::new(StateStore::new());
        let sink = Arc::new(RecordingSink::default());
        let poll = PollLoop::new(
            fetcher,
            store,
            sink as Arc<dyn CharacteristicSink>,
            Duration::from_millis(100),
        );

        let handle = poll.spawn();
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(99)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_does_not_change_the_schedule() {
        let (fetcher, calls) = ScriptedFetcher::new(vec![Err(FetchError::Timeout(
            Duration::from_millis(50),
        ))]);
        let store = Arc::new(StateStore::new());
        let sink = Arc::new(RecordingSink::default());
        let poll = PollLoop::new(
            fetcher,
            Arc::clone(&store),
            sink as Arc<dyn CharacteristicSink>,
            Duration::from_millis(100),
        );

        let handle = poll.spawn();
        settle().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.last_error().is_some());

        // The next tick still fires one full interval later, no back-off.
        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let (fetcher, calls) = ScriptedFetcher::new(vec![]);
        let store = Arc::new(StateStore::new());
        let sink = Arc::new(RecordingSink::default());
        let poll = PollLoop::new(
            fetcher,
            store,
            sink as Arc<dyn CharacteristicSink>,
            Duration::from_millis(100),
        );

        let handle = poll.spawn();
        settle().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        handle.stop().await;
        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
