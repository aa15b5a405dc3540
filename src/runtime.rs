//! Runtime abstraction layer for async operations
//!
//! Nearby refreshes run off the coordination task. This module lets the
//! crate spawn them without tying the core to one executor: tokio when the
//! `tokio-runtime` feature is on, a thread-per-task fallback otherwise.

use std::future::Future;
use std::pin::Pin;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Convenience function for spawning with type safety
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime().spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner.
        ///
        /// Spawns on the ambient runtime when called from inside one; falls
        /// back to a lazily built shared runtime otherwise.
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Box<dyn AsyncHandle> {
                let handle = match ::tokio::runtime::Handle::try_current() {
                    Ok(current) => current.spawn(future),
                    Err(_) => match fallback_runtime() {
                        Some(rt) => rt.spawn(future),
                        None => {
                            log::warn!("No tokio runtime available, running task on a thread");
                            return super::thread_impl::ThreadSpawner.spawn_boxed(future);
                        }
                    },
                };
                Box::new(TokioHandle(handle))
            }
        }

        fn fallback_runtime() -> Option<&'static ::tokio::runtime::Runtime> {
            static FALLBACK: std::sync::OnceLock<Option<::tokio::runtime::Runtime>> =
                std::sync::OnceLock::new();
            FALLBACK
                .get_or_init(|| {
                    ::tokio::runtime::Builder::new_multi_thread()
                        .worker_threads(2)
                        .enable_all()
                        .build()
                        .map_err(|e| log::warn!("Failed to build fallback runtime: {}", e))
                        .ok()
                })
                .as_ref()
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }

    pub mod thread_impl {
        use super::*;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        /// Runs each future to completion on its own OS thread
        pub struct ThreadSpawner;

        impl AsyncSpawner for ThreadSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Box<dyn AsyncHandle> {
                let finished = Arc::new(AtomicBool::new(false));
                let done = finished.clone();
                std::thread::spawn(move || {
                    futures::executor::block_on(future);
                    done.store(true, Ordering::SeqCst);
                });
                Box::new(ThreadHandle { finished })
            }
        }

        struct ThreadHandle {
            finished: Arc<AtomicBool>,
        }

        impl AsyncHandle for ThreadHandle {
            fn is_finished(&self) -> bool {
                self.finished.load(Ordering::SeqCst)
            }

            fn cancel(&self) {
                // Threads can't be cancelled; the result is discarded by sequence instead
                log::debug!("Cancel requested on a thread task");
            }
        }
    }
}

/// Global runtime instance
static RUNTIME: std::sync::OnceLock<Box<dyn AsyncSpawner>> = std::sync::OnceLock::new();

/// Initialize the runtime with a specific spawner. Has no effect once a
/// spawner has been chosen.
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) {
    let _ = RUNTIME.set(spawner);
}

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| {
            #[cfg(feature = "tokio-runtime")]
            {
                Box::new(spawners::tokio_impl::TokioSpawner)
            }

            #[cfg(not(feature = "tokio-runtime"))]
            {
                Box::new(spawners::thread_impl::ThreadSpawner)
            }
        })
        .as_ref()
}
