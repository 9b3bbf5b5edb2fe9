//! Reusable-buffer object pool for decoded-frame containers, and the
//! two-thread reader/presentation split the live player runs on top of
//! it. At 30 fps and ≥1 MB/frame, allocating a fresh container every
//! frame is the wrong default; the pool is an unbounded free list that
//! borrows from it or allocates, and gives back after presentation.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::mdec::Picture;
use crate::sync::presentation_time_ns;
use crate::Result;

/// An unbounded free list of `T` containers. `borrow` pops a container
/// off the list or allocates a fresh one with `make`; `give_back` pushes
/// it back on the list for the next borrower.
pub struct ObjectPool<T> {
    free: Mutex<Vec<T>>,
    make: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> ObjectPool<T> {
    pub fn new<F: Fn() -> T + Send + Sync + 'static>(make: F) -> Self {
        ObjectPool {
            free: Mutex::new(Vec::new()),
            make: Box::new(make),
        }
    }

    pub fn borrow(&self) -> T {
        let mut free = self.free.lock().unwrap();
        free.pop().unwrap_or_else(|| (self.make)())
    }

    pub fn give_back(&self, item: T) {
        self.free.lock().unwrap().push(item);
    }

    pub fn free_count(&self) -> usize {
        self.free.lock().unwrap().len()
    }
}

/// One decoded-frame container handed between the reader and
/// presentation threads: a reused `Picture` buffer plus the sector it
/// should present at.
pub struct PresentationFrame {
    pub picture: Picture,
    pub sector_from_start: i64,
}

/// Drives the reader/presentation split for live playback: a reader
/// thread decodes into pooled containers and pushes them onto a bounded
/// queue; a presentation thread pops them, sleeps until
/// `presentationTime`, hands the picture to `render`, and returns the
/// container to the pool. Stopping the player joins both threads.
pub struct LivePlayer {
    queue_tx: Sender<PresentationFrame>,
    reader_handle: Option<std::thread::JoinHandle<()>>,
    presenter_handle: Option<std::thread::JoinHandle<()>>,
}

impl LivePlayer {
    /// Spawns the reader and presentation threads. `decode_next` is
    /// called repeatedly on the reader thread until it returns `None`
    /// (end of stream); `render` is called on the presentation thread
    /// once per frame, at its scheduled presentation time.
    pub fn start<D, R>(
        sectors_per_second: u32,
        queue_capacity: usize,
        mut decode_next: D,
        mut render: R,
    ) -> Self
    where
        D: FnMut() -> Option<Result<PresentationFrame>> + Send + 'static,
        R: FnMut(&Picture) + Send + 'static,
    {
        let (queue_tx, queue_rx): (Sender<PresentationFrame>, Receiver<PresentationFrame>) =
            bounded(queue_capacity);

        let reader_tx = queue_tx.clone();
        let reader_handle = std::thread::spawn(move || {
            while let Some(result) = decode_next() {
                match result {
                    Ok(frame) => {
                        if reader_tx.send(frame).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        let presenter_handle = std::thread::spawn(move || {
            let start = Instant::now();
            for frame in queue_rx.iter() {
                let target_ns = presentation_time_ns(frame.sector_from_start, sectors_per_second);
                let target = Duration::from_nanos(target_ns.max(0) as u64);
                let elapsed = start.elapsed();
                if target > elapsed {
                    std::thread::sleep(target - elapsed);
                }
                render(&frame.picture);
            }
        });

        LivePlayer {
            queue_tx,
            reader_handle: Some(reader_handle),
            presenter_handle: Some(presenter_handle),
        }
    }

    /// Closes the queue and blocks until both threads drain and exit.
    pub fn join(mut self) {
        drop(self.queue_tx.clone());
        if let Some(h) = self.reader_handle.take() {
            let _ = h.join();
        }
        if let Some(h) = self.presenter_handle.take() {
            let _ = h.join();
        }
    }
}

/// Drives an audio output line on its own thread with a blocking write
/// API: `write` is called once per queued sample buffer and may block
/// when the device buffer is full, which is the only suspension point
/// on this thread.
pub struct AudioLineThread {
    tx: Sender<Vec<i16>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl AudioLineThread {
    pub fn start<W>(queue_capacity: usize, mut write: W) -> Self
    where
        W: FnMut(&[i16]) + Send + 'static,
    {
        let (tx, rx): (Sender<Vec<i16>>, Receiver<Vec<i16>>) = bounded(queue_capacity);
        let handle = std::thread::spawn(move || {
            for buf in rx.iter() {
                write(&buf);
            }
        });
        AudioLineThread { tx, handle: Some(handle) }
    }

    pub fn enqueue(&self, samples: Vec<i16>) -> bool {
        self.tx.send(samples).is_ok()
    }

    pub fn join(mut self) {
        drop(self.tx.clone());
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Shared cancellation flag every stage polls at frame boundaries,
/// raising `TaskCanceled` once set.
#[derive(Clone)]
pub struct CancelToken(Arc<std::sync::atomic::AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(std::sync::atomic::AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_canceled() {
            Err(crate::errors::Error::TaskCanceled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        CancelToken::new()
    }
}
