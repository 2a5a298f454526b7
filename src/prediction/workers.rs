//! Fixed-size worker pool for batch predictions.

use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::common::config::AppCfg;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Threads pulling jobs from one shared queue. Dropping the pool closes the
/// queue, lets queued jobs finish and joins every worker.
pub struct Pool {
    tx: Option<mpsc::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl Pool {
    pub fn new(size: usize) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let shared_rx = Arc::new(Mutex::new(rx));

        let workers = (0..size.max(1))
            .map(|id| {
                let rx = Arc::clone(&shared_rx);
                thread::Builder::new()
                    .name(format!("predict-{id}"))
                    .spawn(move || loop {
                        let job = match rx.lock() {
                            Ok(guard) => guard.recv(),
                            Err(_) => break,
                        };
                        match job {
                            Ok(job) => job(),
                            Err(_) => break,
                        }
                    })
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(err) => {
                    tracing::warn!(error = %err, "could not spawn prediction worker");
                    None
                }
            })
            .collect();

        Self {
            tx: Some(tx),
            workers,
        }
    }

    pub fn from_cfg(cfg: &AppCfg) -> Self {
        Self::new(cfg.workers)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job. Returns `false` if no worker is left to run it.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.tx {
            Some(tx) if !self.workers.is_empty() => tx.send(Box::new(job)).is_ok(),
            _ => false,
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        drop(self.tx.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
