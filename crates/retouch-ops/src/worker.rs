//! Background mapping worker.
//!
//! Keeps mapping off the caller's thread while guaranteeing that only the
//! newest request matters:
//!
//! - every [`MappingWorker::submit`] bumps a generation counter shared with
//!   the worker thread
//! - the worker drains its queue before computing and runs only the last
//!   queued job, so at most one mapping is in flight
//! - a job whose generation is already superseded is skipped, before and
//!   after computing
//! - [`MappingWorker::poll`] and [`MappingWorker::wait`] drop any result not
//!   tagged with the current generation
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use retouch_core::Raster;
//! use retouch_lut::ToneLut;
//! use retouch_ops::MappingWorker;
//!
//! let src: Raster<u8> = Raster::filled(64, 64, &[100, 100, 100]).unwrap();
//! let mut worker = MappingWorker::spawn(src).unwrap();
//! worker.submit(ToneLut::from_fn(|t| t * 0.5)).unwrap();
//! let last = worker.submit(ToneLut::from_fn(|_| 1.0)).unwrap();
//!
//! let mapped = worker.wait(Duration::from_secs(10)).unwrap().unwrap();
//! assert_eq!(mapped.generation, last);
//! assert_eq!(mapped.image.sample(0, 0, 0), Some(255));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use retouch_core::{Raster, Sample};
use tracing::{debug, trace};

use crate::messages::{Generation, MapJob, MappedImage, WorkerMsg};
use crate::{OpsError, OpsResult};

/// Handle to a background mapping thread over one source image.
///
/// Dropping the handle stops and joins the thread.
pub struct MappingWorker<T: Sample> {
    tx: Sender<WorkerMsg<T>>,
    rx: Receiver<MappedImage<T>>,
    worker: Option<JoinHandle<()>>,
    latest: Arc<AtomicU64>,
    generation: Generation,
}

impl<T: Sample> MappingWorker<T> {
    /// Starts a worker thread that maps `source`.
    ///
    /// # Errors
    ///
    /// [`OpsError::Spawn`] if the OS refuses a new thread.
    pub fn spawn(source: Raster<T>) -> OpsResult<Self> {
        let (tx_to_worker, rx_in_worker) = channel();
        let (tx_to_caller, rx_from_worker) = channel();
        let latest = Arc::new(AtomicU64::new(0));

        let handler = MappingHandler {
            rx: rx_in_worker,
            tx: tx_to_caller,
            source: Arc::new(source),
            latest: Arc::clone(&latest),
        };
        let worker = thread::Builder::new()
            .name("retouch-mapper".into())
            .spawn(move || handler.run())
            .map_err(OpsError::Spawn)?;

        Ok(Self {
            tx: tx_to_worker,
            rx: rx_from_worker,
            worker: Some(worker),
            latest,
            generation: 0,
        })
    }

    fn bump(&mut self) -> Generation {
        self.generation += 1;
        self.latest.store(self.generation, Ordering::Release);
        self.generation
    }

    fn send(&self, msg: WorkerMsg<T>) -> OpsResult<()> {
        self.tx.send(msg).map_err(|_| OpsError::WorkerClosed)
    }

    /// Queues a mapping and returns its generation. Any earlier job that has
    /// not finished yet is superseded.
    pub fn submit(&mut self, job: impl Into<MapJob>) -> OpsResult<Generation> {
        let generation = self.bump();
        debug!(generation, "mapping job submitted");
        self.send(WorkerMsg::Map {
            generation,
            job: job.into(),
        })?;
        Ok(generation)
    }

    /// Replaces the source image.
    ///
    /// Invalidates all pending results; submit a job afterwards to map the
    /// new source.
    pub fn set_source(&mut self, source: Raster<T>) -> OpsResult<Generation> {
        let generation = self.bump();
        debug!(generation, "mapping source replaced");
        self.send(WorkerMsg::SetSource(Arc::new(source)))?;
        Ok(generation)
    }

    /// Generation of the newest request.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns the result for the current generation if it has arrived.
    /// Never blocks.
    pub fn poll(&self) -> Option<MappedImage<T>> {
        let mut newest = None;
        while let Ok(result) = self.rx.try_recv() {
            if result.generation == self.generation {
                newest = Some(result);
            } else {
                trace!(
                    generation = result.generation,
                    current = self.generation,
                    "dropping stale result"
                );
            }
        }
        newest
    }

    /// Blocks until the result for the current generation arrives or
    /// `timeout` elapses (`Ok(None)`).
    ///
    /// # Errors
    ///
    /// [`OpsError::WorkerClosed`] if the worker thread has exited.
    pub fn wait(&self, timeout: Duration) -> OpsResult<Option<MappedImage<T>>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(result) if result.generation == self.generation => return Ok(Some(result)),
                Ok(result) => {
                    trace!(
                        generation = result.generation,
                        current = self.generation,
                        "dropping stale result"
                    );
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(OpsError::WorkerClosed),
            }
        }
    }
}

impl<T: Sample> Drop for MappingWorker<T> {
    fn drop(&mut self) {
        // Signal worker to stop
        let _ = self.tx.send(WorkerMsg::Close);

        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// State owned by the worker thread.
struct MappingHandler<T: Sample> {
    rx: Receiver<WorkerMsg<T>>,
    tx: Sender<MappedImage<T>>,
    source: Arc<Raster<T>>,
    latest: Arc<AtomicU64>,
}

impl<T: Sample> MappingHandler<T> {
    /// Main event loop.
    fn run(mut self) {
        while let Ok(msg) = self.rx.recv() {
            let mut pending = None;
            if !self.absorb(msg, &mut pending) {
                break;
            }
            // Coalesce everything already queued; the last job wins.
            let mut closing = false;
            while let Ok(msg) = self.rx.try_recv() {
                if !self.absorb(msg, &mut pending) {
                    closing = true;
                    break;
                }
            }
            if closing {
                break;
            }
            if let Some((generation, job)) = pending {
                self.map(generation, &job);
            }
        }
        debug!("mapping worker shutdown");
    }

    /// Applies one message. Returns `false` on close.
    fn absorb(&mut self, msg: WorkerMsg<T>, pending: &mut Option<(Generation, MapJob)>) -> bool {
        match msg {
            WorkerMsg::Close => return false,
            WorkerMsg::SetSource(source) => self.source = source,
            WorkerMsg::Map { generation, job } => {
                if let Some((skipped, _)) = pending.replace((generation, job)) {
                    trace!(skipped, generation, "coalesced mapping job");
                }
            }
        }
        true
    }

    fn is_stale(&self, generation: Generation) -> bool {
        generation < self.latest.load(Ordering::Acquire)
    }

    fn map(&self, generation: Generation, job: &MapJob) {
        if self.is_stale(generation) {
            trace!(generation, "skipping stale job");
            return;
        }
        let image = job.run(&self.source);
        if self.is_stale(generation) {
            trace!(generation, "discarding stale mapping");
            return;
        }
        debug!(generation, "mapping ready");
        let _ = self.tx.send(MappedImage { generation, image });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RgbToneCurves;
    use retouch_lut::ToneLut;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn gray(v: u8) -> Raster<u8> {
        Raster::filled(32, 16, &[v, v, v]).unwrap()
    }

    #[test]
    fn test_single_job() {
        let src = gray(128);
        let lut = ToneLut::from_fn(|t| 1.0 - t);
        let expected = crate::mapper::apply_lut(&src, &lut);

        let mut worker = MappingWorker::spawn(src).unwrap();
        let generation = worker.submit(lut).unwrap();
        let result = worker.wait(TIMEOUT).unwrap().unwrap();
        assert_eq!(result.generation, generation);
        assert_eq!(result.image, expected);
    }

    #[test]
    fn test_newest_wins() {
        let mut worker = MappingWorker::spawn(gray(128)).unwrap();
        for k in 0..20 {
            worker.submit(ToneLut::from_fn(move |_| k as f32 / 100.0)).unwrap();
        }
        let last = worker.submit(ToneLut::from_fn(|_| 1.0)).unwrap();
        assert_eq!(last, 21);

        let result = worker.wait(TIMEOUT).unwrap().unwrap();
        assert_eq!(result.generation, last);
        assert!(result.image.data().iter().all(|&v| v == 255));
        // Nothing newer is coming.
        assert!(worker.poll().is_none());
    }

    #[test]
    fn test_set_source_invalidates() {
        let mut worker = MappingWorker::spawn(gray(10)).unwrap();
        worker.submit(ToneLut::identity()).unwrap();
        worker.set_source(gray(250)).unwrap();
        let generation = worker.submit(RgbToneCurves::master(ToneLut::from_fn(|_| 0.0))).unwrap();

        let result = worker.wait(TIMEOUT).unwrap().unwrap();
        assert_eq!(result.generation, generation);
        assert!(result.image.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_poll_eventually_returns() {
        let mut worker = MappingWorker::spawn(gray(0)).unwrap();
        let generation = worker.submit(ToneLut::from_fn(|_| 0.5)).unwrap();
        let deadline = Instant::now() + TIMEOUT;
        let result = loop {
            if let Some(r) = worker.poll() {
                break r;
            }
            assert!(Instant::now() < deadline, "worker never answered");
            thread::sleep(Duration::from_millis(1));
        };
        assert_eq!(result.generation, generation);
        assert_eq!(result.image.sample(0, 0, 0), Some(128));
    }

    #[test]
    fn test_wait_times_out_without_job() {
        let worker = MappingWorker::spawn(gray(0)).unwrap();
        assert!(worker.wait(Duration::from_millis(20)).unwrap().is_none());
    }
}
