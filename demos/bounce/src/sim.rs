//! Simulated plugin host.
//!
//! Stands in for the sandboxed runtime: it owns the delivery threads the real
//! host would own and drives the bridges exactly the way the bridges expect
//! to be driven.
//!
//! - A pacer thread completes one flush per ~16 ms, which is what re-arms the
//!   display bridge's flush loop.
//! - An audio thread pulls one block per cadence tick through the registered
//!   pump and appends it to a capture buffer.
//!
//! Everything the host "displayed" or "played" is kept around so the demo can
//! dump it as artifacts at exit.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use sandpipe_core::host::{AudioConfig, AudioPump, FlushDone, Graphics2d, HostInstance};

/// Flush pacing interval, roughly a 60 Hz compositor.
const FLUSH_INTERVAL: Duration = Duration::from_millis(16);

/// A host surface: staging image plus a queue of parked flush completions.
pub struct SimSurface {
    width: u32,
    height: u32,
    staged: Mutex<Vec<u32>>,
    pending: Mutex<VecDeque<FlushDone>>,
}

impl SimSurface {
    /// Deliver the oldest outstanding completion, if any. The completion is
    /// invoked after the queue lock is released because the continuation
    /// calls straight back into `flush`.
    fn complete_one(&self) {
        let done = self.pending.lock().pop_front();
        if let Some(done) = done {
            done();
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The last composite the bridge painted.
    pub fn staged(&self) -> Vec<u32> {
        self.staged.lock().clone()
    }
}

impl Graphics2d for SimSurface {
    fn paint(&self, pixels: &[u32]) {
        let mut staged = self.staged.lock();
        staged.clear();
        staged.extend_from_slice(pixels);
    }

    fn flush(&self, done: FlushDone) {
        self.pending.lock().push_back(done);
    }
}

/// The simulated host instance. One per demo run; shut down explicitly so the
/// delivery threads are joined before the artifacts are read.
pub struct SimHost {
    running: Arc<AtomicBool>,
    surface: Mutex<Option<Arc<SimSurface>>>,
    capture: Arc<Mutex<Vec<i16>>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl SimHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            running: Arc::new(AtomicBool::new(true)),
            surface: Mutex::new(None),
            capture: Arc::new(Mutex::new(Vec::new())),
            threads: Mutex::new(Vec::new()),
        })
    }

    /// The surface created for the display bridge, once one exists.
    pub fn surface(&self) -> Option<Arc<SimSurface>> {
        self.surface.lock().clone()
    }

    /// Everything the audio thread pulled, as interleaved stereo samples.
    pub fn captured_samples(&self) -> Vec<i16> {
        self.capture.lock().clone()
    }

    /// Stop the delivery threads and wait for them. Any flush left in flight
    /// stays parked; the bridges are torn down by now and would decline it
    /// anyway.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let threads = std::mem::take(&mut *self.threads.lock());
        for handle in threads {
            let _ = handle.join();
        }
    }
}

impl HostInstance for SimHost {
    fn create_surface(&self, width: u32, height: u32) -> Arc<dyn Graphics2d> {
        let surface = Arc::new(SimSurface {
            width,
            height,
            staged: Mutex::new(vec![0; width as usize * height as usize]),
            pending: Mutex::new(VecDeque::new()),
        });
        *self.surface.lock() = Some(Arc::clone(&surface));

        // The pacer thread: one completion per interval, like a compositor
        // vsync.
        let running = Arc::clone(&self.running);
        let paced = Arc::clone(&surface);
        self.threads.lock().push(thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                thread::sleep(FLUSH_INTERVAL);
                paced.complete_one();
            }
        }));

        surface
    }

    fn bind_surface(&self, _surface: &Arc<dyn Graphics2d>) -> bool {
        true
    }

    fn recommend_frame_count(&self, _sample_rate: u32, requested_frames: u32) -> u32 {
        // A real host trims large requests to its mixer granularity.
        requested_frames.min(1024)
    }

    fn start_playback(&self, config: AudioConfig, mut pump: AudioPump) -> bool {
        let block_len = config.frame_count as usize * 4;
        let cadence =
            Duration::from_secs_f64(f64::from(config.frame_count) / f64::from(config.sample_rate));

        let running = Arc::clone(&self.running);
        let capture = Arc::clone(&self.capture);
        self.threads.lock().push(thread::spawn(move || {
            let mut block = vec![0u8; block_len];
            while running.load(Ordering::SeqCst) {
                thread::sleep(cadence);
                pump(&mut block);

                let mut capture = capture.lock();
                for sample in block.chunks_exact(2) {
                    capture.push(i16::from_le_bytes([sample[0], sample[1]]));
                }
            }
        }));
        true
    }
}
