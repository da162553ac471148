//! Process-wide engine session management.
//!
//! The engine session is the only shared mutable resource in the pipeline.
//! [`SessionManager`] makes its lifecycle explicit: a factory closure is
//! provided up front, the session is created lazily on first
//! [`acquire`](SessionManager::acquire), reused afterwards, and released via
//! an idempotent [`cleanup`](SessionManager::cleanup) at process shutdown.

use std::sync::{Arc, Mutex};

use crate::{Engine, EngineError};

type EngineFactory = Box<dyn Fn() -> Result<Arc<dyn Engine>, EngineError> + Send + Sync>;

/// Lazily-initialized holder for the shared engine session.
pub struct SessionManager {
    factory: EngineFactory,
    session: Mutex<Option<Arc<dyn Engine>>>,
}

impl SessionManager {
    /// Create a manager that will launch the engine with `factory` on first
    /// use.
    #[must_use]
    pub fn new(
        factory: impl Fn() -> Result<Arc<dyn Engine>, EngineError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            session: Mutex::new(None),
        }
    }

    /// Create a manager around an already-running session.
    #[must_use]
    pub fn with_session(engine: Arc<dyn Engine>) -> Self {
        let holder = Arc::clone(&engine);
        Self {
            factory: Box::new(move || Ok(Arc::clone(&holder))),
            session: Mutex::new(Some(engine)),
        }
    }

    /// Get the shared session, launching it if this is the first use.
    ///
    /// A failed launch is not cached: the next `acquire` retries the
    /// factory.
    pub fn acquire(&self) -> Result<Arc<dyn Engine>, EngineError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| EngineError::Unavailable("session lock poisoned".to_owned()))?;

        if let Some(engine) = guard.as_ref() {
            return Ok(Arc::clone(engine));
        }

        tracing::info!("launching engine session");
        let engine = (self.factory)()?;
        *guard = Some(Arc::clone(&engine));
        Ok(engine)
    }

    /// Shut the session down and forget it.
    ///
    /// Idempotent and safe to call when the session was never created.
    pub fn cleanup(&self) {
        let Ok(mut guard) = self.session.lock() else {
            return;
        };
        if let Some(engine) = guard.take() {
            tracing::info!("shutting down engine session");
            engine.shutdown();
        }
    }
}
