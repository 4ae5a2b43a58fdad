//! Platform delivery thread.
//!
//! Everything the virtual platform reports asynchronously (authorization
//! answers, photo completions) runs here, at or after its scheduled time.
//! Jobs due at the same instant run in scheduling order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use camera_capture_core::traits::callback_executor::Job;

struct Scheduled {
    due: Instant,
    seq: u64,
    job: Job,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed: the heap pops the earliest job first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Single timer thread running delayed jobs.
///
/// Dropping it runs every job still scheduled, each no earlier than its due
/// time, then joins the thread.
pub struct DeliveryThread {
    tx: Option<mpsc::Sender<(Instant, Job)>>,
    handle: Option<JoinHandle<()>>,
    thread_id: ThreadId,
}

impl DeliveryThread {
    pub fn new(label: &str) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<(Instant, Job)>();
        let handle = thread::Builder::new()
            .name(label.to_string())
            .spawn(move || run_timer(rx))?;
        let thread_id = handle.thread().id();

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            thread_id,
        })
    }

    /// Run `job` on the delivery thread once `delay` has elapsed.
    pub fn schedule(&self, delay: Duration, job: Job) {
        let due = Instant::now() + delay;
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        if tx.send((due, job)).is_err() {
            log::warn!("Delivery thread gone, dropping scheduled job");
        }
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }
}

impl Drop for DeliveryThread {
    fn drop(&mut self) {
        // Disconnecting the channel tells the thread to flush and exit.
        self.tx.take();
        if self.is_current() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_timer(rx: mpsc::Receiver<(Instant, Job)>) {
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;
    let mut connected = true;

    loop {
        let now = Instant::now();
        while heap.peek().is_some_and(|next: &Scheduled| next.due <= now) {
            if let Some(Scheduled { job, .. }) = heap.pop() {
                job();
            }
        }

        if !connected {
            match heap.peek() {
                Some(next) => {
                    thread::sleep(next.due.saturating_duration_since(Instant::now()));
                    continue;
                }
                None => {
                    log::debug!("Delivery thread exiting");
                    return;
                }
            }
        }

        let received = match heap.peek() {
            Some(next) => rx.recv_timeout(next.due.saturating_duration_since(now)),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok((due, job)) => {
                heap.push(Scheduled { due, seq, job });
                seq += 1;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => connected = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn runs_jobs_in_due_order() {
        let delivery = DeliveryThread::new("test-delivery-order").unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done_rx) = mpsc::channel();

        for (label, delay) in [("slow", 60), ("fast", 5), ("mid", 30)] {
            let log = Arc::clone(&log);
            let done_tx = done_tx.clone();
            delivery.schedule(
                Duration::from_millis(delay),
                Box::new(move || {
                    log.lock().push(label);
                    let _ = done_tx.send(());
                }),
            );
        }

        for _ in 0..3 {
            done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }
        assert_eq!(*log.lock(), vec!["fast", "mid", "slow"]);
    }

    #[test]
    fn same_due_time_keeps_scheduling_order() {
        let delivery = DeliveryThread::new("test-delivery-fifo").unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..20 {
            let log = Arc::clone(&log);
            delivery.schedule(Duration::ZERO, Box::new(move || log.lock().push(i)));
        }
        drop(delivery);

        assert_eq!(*log.lock(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn drop_flushes_delayed_jobs() {
        let delivery = DeliveryThread::new("test-delivery-flush").unwrap();
        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);
        delivery.schedule(Duration::from_millis(20), Box::new(move || *flag.lock() = true));

        drop(delivery);
        assert!(*ran.lock());
    }
}
