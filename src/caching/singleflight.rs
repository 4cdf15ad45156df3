//! # Single-Flight Coordinator
//!
//! Collapses concurrent loads of the same key into one execution. The first
//! caller for a key spawns the loader on its own task; later callers join the
//! same shared result until the loader finishes and the key is released.
//!
//! Waiters can give up through their [`CallContext`] without affecting the
//! loader, which always runs to completion for the remaining waiters.

use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::counter;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::core::context::CallContext;
use crate::core::error::{ProxyError, ProxyResult};

type SharedResult<V> = Shared<BoxFuture<'static, ProxyResult<V>>>;

struct Flight<V> {
    id: u64,
    result: SharedResult<V>,
}

struct FlightMap<V> {
    flights: Mutex<HashMap<String, Flight<V>>>,
    next_id: AtomicU64,
}

/// Releases a key when its loader task ends, including by panic. The id
/// check keeps a finished loader from evicting a newer flight.
struct FlightGuard<V> {
    map: Arc<FlightMap<V>>,
    key: String,
    id: u64,
}

impl<V> Drop for FlightGuard<V> {
    fn drop(&mut self) {
        let mut flights = self.map.flights.lock();
        if flights.get(&self.key).is_some_and(|flight| flight.id == self.id) {
            flights.remove(&self.key);
        }
    }
}

/// Per-key request coalescing.
pub struct SingleFlight<V> {
    map: Arc<FlightMap<V>>,
}

impl<V> Clone for SingleFlight<V> {
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
        }
    }
}

impl<V> Default for SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            map: Arc::new(FlightMap {
                flights: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Run `loader` for `key`, or join the load already in progress.
    ///
    /// Every caller that overlaps one execution receives a clone of its result.
    /// Errors are not remembered: once the loader finishes, the next call
    /// starts a fresh one.
    pub async fn run<F>(&self, ctx: &CallContext, key: &str, loader: F) -> ProxyResult<V>
    where
        F: Future<Output = ProxyResult<V>> + Send + 'static,
    {
        ctx.check()?;

        let result = {
            let mut flights = self.map.flights.lock();
            match flights.get(key) {
                Some(flight) => {
                    counter!("places_singleflight_shared_total").increment(1);
                    debug!(key, "Joining in-flight load");
                    flight.result.clone()
                }
                None => {
                    let id = self.map.next_id.fetch_add(1, Ordering::Relaxed);
                    let guard = FlightGuard {
                        map: Arc::clone(&self.map),
                        key: key.to_string(),
                        id,
                    };

                    let handle = tokio::spawn(async move {
                        let _guard = guard;
                        loader.await
                    });

                    let result = async move {
                        match handle.await {
                            Ok(result) => result,
                            Err(e) => Err(ProxyError::internal(format!(
                                "single-flight loader aborted: {}",
                                e
                            ))),
                        }
                    }
                    .boxed()
                    .shared();

                    flights.insert(
                        key.to_string(),
                        Flight {
                            id,
                            result: result.clone(),
                        },
                    );
                    result
                }
            }
        };

        ctx.run(result).await
    }

    /// Number of keys with a loader currently running.
    pub fn in_flight(&self) -> usize {
        self.map.flights.lock().len()
    }
}
