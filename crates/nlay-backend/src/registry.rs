//! Process-wide precision-mode registry.
//!
//! Holds one backend per [`PrecisionMode`] and remembers which mode is
//! selected. The free functions operate on a single global registry: after
//! [`use_extended_precision`] every batch dispatched through
//! [`active_backend`] runs on the extended backend until
//! [`use_standard_precision`] is called.
//!
//! The global registry is not a synchronisation point for dispatches. A mode
//! switch racing a batch on another thread leaves that batch on whichever
//! backend it resolved first. Code that needs a fixed backend per call should
//! hold an `Arc<dyn ScatteringSolver>` directly instead.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::backend::{PrecisionMode, ScatteringSolver};

/// Errors from backend selection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No {0} precision backend is registered")]
    BackendUnavailable(PrecisionMode),
}

/// Backend table keyed by precision mode, plus the current selection.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    mode: PrecisionMode,
    double: Option<Arc<dyn ScatteringSolver>>,
    extended: Option<Arc<dyn ScatteringSolver>>,
}

impl BackendRegistry {
    /// Create an empty registry in double precision mode.
    pub const fn new() -> Self {
        Self {
            mode: PrecisionMode::Double,
            double: None,
            extended: None,
        }
    }

    /// Install the backend for `mode`, returning the one it replaces.
    pub fn register(
        &mut self,
        mode: PrecisionMode,
        backend: Arc<dyn ScatteringSolver>,
    ) -> Option<Arc<dyn ScatteringSolver>> {
        self.slot_mut(mode).replace(backend)
    }

    /// Remove the backend for `mode`.
    pub fn unregister(&mut self, mode: PrecisionMode) -> Option<Arc<dyn ScatteringSolver>> {
        self.slot_mut(mode).take()
    }

    /// Route subsequent lookups to the backend registered for `mode`.
    ///
    /// Fails without changing the selection if no such backend exists.
    pub fn select(&mut self, mode: PrecisionMode) -> Result<(), RegistryError> {
        if self.slot(mode).is_none() {
            return Err(RegistryError::BackendUnavailable(mode));
        }
        self.mode = mode;
        Ok(())
    }

    /// The backend for the selected mode.
    pub fn active(&self) -> Result<Arc<dyn ScatteringSolver>, RegistryError> {
        self.slot(self.mode)
            .clone()
            .ok_or(RegistryError::BackendUnavailable(self.mode))
    }

    fn slot(&self, mode: PrecisionMode) -> &Option<Arc<dyn ScatteringSolver>> {
        match mode {
            PrecisionMode::Double => &self.double,
            PrecisionMode::Extended => &self.extended,
        }
    }

    fn slot_mut(&mut self, mode: PrecisionMode) -> &mut Option<Arc<dyn ScatteringSolver>> {
        match mode {
            PrecisionMode::Double => &mut self.double,
            PrecisionMode::Extended => &mut self.extended,
        }
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |slot: &Option<Arc<dyn ScatteringSolver>>| slot.as_ref().map(|b| b.info().name);
        f.debug_struct("BackendRegistry")
            .field("mode", &self.mode)
            .field("double", &name(&self.double))
            .field("extended", &name(&self.extended))
            .finish()
    }
}

static GLOBAL: RwLock<BackendRegistry> = RwLock::new(BackendRegistry::new());

// Poisoning is ignored: every write leaves the registry consistent.
fn read_global() -> std::sync::RwLockReadGuard<'static, BackendRegistry> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_global() -> std::sync::RwLockWriteGuard<'static, BackendRegistry> {
    GLOBAL.write().unwrap_or_else(PoisonError::into_inner)
}

/// Install the process-wide backend for `mode`.
///
/// If `mode` is currently selected, the new backend takes effect for the next
/// dispatch.
pub fn register_backend(mode: PrecisionMode, backend: Arc<dyn ScatteringSolver>) {
    let name = backend.info().name;
    if write_global().register(mode, backend).is_some() {
        log::info!("Replaced {} precision backend with '{}'", mode, name);
    } else {
        log::info!("Registered {} precision backend '{}'", mode, name);
    }
}

/// Remove the process-wide backend for `mode`.
pub fn unregister_backend(mode: PrecisionMode) {
    let previous = write_global().unregister(mode);
    if let Some(previous) = previous {
        log::info!("Unregistered {} precision backend '{}'", mode, previous.info().name);
    }
}

/// Route every subsequent dispatch through the double precision backend.
pub fn use_standard_precision() -> Result<(), RegistryError> {
    switch_to(PrecisionMode::Double)
}

/// Route every subsequent dispatch through the extended precision backend.
pub fn use_extended_precision() -> Result<(), RegistryError> {
    switch_to(PrecisionMode::Extended)
}

/// Switch the process-wide precision mode.
pub fn switch_to(mode: PrecisionMode) -> Result<(), RegistryError> {
    write_global().select(mode)?;
    log::info!("Switched to {} precision", mode);
    Ok(())
}

/// The backend subsequent dispatches should use.
///
/// This is how a dispatcher binds to the selected mode. It is a diagnostics
/// accessor, not a mode query: the precision mode itself is write-only, and
/// callers should not branch on the returned backend's [`BackendInfo`].
///
/// [`BackendInfo`]: crate::backend::BackendInfo
pub fn active_backend() -> Result<Arc<dyn ScatteringSolver>, RegistryError> {
    read_global().active()
}
