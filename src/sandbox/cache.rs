//! Compiled engine module caching.
//!
//! Compiling the JS engine module is the expensive part of sandbox startup.
//! This module provides a thread-safe cache keyed by filesystem path so that
//! every preview session in a process shares one compiled copy.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use wasmtime::{Engine, Module};

use crate::error::{PreviewError, Result};

/// A thread-safe cache for compiled engine modules.
///
/// Modules are keyed by their canonical filesystem path, so multiple
/// `JsSandbox` instances configured with the same engine binary share the
/// same compiled module and skip redundant compilation.
#[derive(Debug, Default)]
pub struct ModuleCache {
    /// The cached modules, keyed by canonical path.
    cache: RwLock<HashMap<PathBuf, Arc<Module>>>,
}

impl ModuleCache {
    /// Create a new empty module cache.
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get a cached module or compile it if not present.
    ///
    /// The path is canonicalized before lookup so relative paths, absolute
    /// paths, and symlinks to the same file all share a cache entry.
    pub fn get_or_compile(&self, engine: &Engine, path: impl AsRef<Path>) -> Result<Arc<Module>> {
        let path = path.as_ref();

        let canonical_path = std::fs::canonicalize(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PreviewError::EngineNotFound(path.display().to_string())
            } else {
                PreviewError::Io(e)
            }
        })?;

        // Try to get from cache first (read lock)
        {
            let cache = self.cache.read().unwrap();
            if let Some(module) = cache.get(&canonical_path) {
                return Ok(Arc::clone(module));
            }
        }

        // Not in cache, compile the module (outside any lock)
        let wasm_bytes = std::fs::read(&canonical_path).map_err(PreviewError::Io)?;

        let module = Module::new(engine, &wasm_bytes).map_err(|e| {
            PreviewError::EngineLoad(anyhow::anyhow!("failed to compile engine module: {}", e))
        })?;

        let module = Arc::new(module);

        // Insert into cache (write lock)
        {
            let mut cache = self.cache.write().unwrap();
            // Double-check pattern: another thread might have compiled while we were
            if let Some(existing) = cache.get(&canonical_path) {
                return Ok(Arc::clone(existing));
            }
            cache.insert(canonical_path, Arc::clone(&module));
        }

        Ok(module)
    }

    /// Check if a module is cached.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if let Ok(canonical) = std::fs::canonicalize(path) {
            let cache = self.cache.read().unwrap();
            cache.contains_key(&canonical)
        } else {
            false
        }
    }

    /// Remove a module from the cache.
    ///
    /// Returns `true` if the module was present and removed.
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if let Ok(canonical) = std::fs::canonicalize(path) {
            let mut cache = self.cache.write().unwrap();
            cache.remove(&canonical).is_some()
        } else {
            false
        }
    }

    /// Clear all cached modules.
    pub fn clear(&self) {
        let mut cache = self.cache.write().unwrap();
        cache.clear();
    }

    /// Get the number of cached modules.
    pub fn len(&self) -> usize {
        let cache = self.cache.read().unwrap();
        cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Global module cache shared across all sandbox instances.
static GLOBAL_CACHE: std::sync::LazyLock<ModuleCache> = std::sync::LazyLock::new(ModuleCache::new);

/// Get the global module cache.
///
/// This cache is automatically used by `JsSandbox::new()`.
pub fn global_cache() -> &'static ModuleCache {
    &GLOBAL_CACHE
}

/// A shared Wasmtime engine that can be reused across sandbox instances.
///
/// Wraps an `Arc<Engine>` for thread-safe sharing.
#[derive(Clone)]
pub struct SharedEngine {
    engine: Arc<Engine>,
}

impl std::fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEngine")
            .field("engine", &"<wasmtime::Engine>")
            .finish()
    }
}

impl SharedEngine {
    /// Create a new shared engine with the default configuration.
    pub fn new() -> Result<Self> {
        let config = Self::default_config(false);
        let engine = Engine::new(&config)
            .map_err(|e| PreviewError::RuntimeInit(anyhow::anyhow!("{}", e)))?;
        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// Create a new shared engine with fuel consumption enabled.
    pub fn with_fuel() -> Result<Self> {
        let config = Self::default_config(true);
        let engine = Engine::new(&config)
            .map_err(|e| PreviewError::RuntimeInit(anyhow::anyhow!("{}", e)))?;
        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// Create a new shared engine from an existing engine configuration.
    pub fn from_config(config: &wasmtime::Config) -> Result<Self> {
        let engine = Engine::new(config)
            .map_err(|e| PreviewError::RuntimeInit(anyhow::anyhow!("{}", e)))?;
        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// Create a shared engine wrapper from an existing Arc<Engine>.
    pub fn from_arc(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Get a reference to the underlying engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Get the Arc<Engine> for sharing.
    pub fn arc(&self) -> Arc<Engine> {
        Arc::clone(&self.engine)
    }

    /// Create the default engine configuration.
    fn default_config(enable_fuel: bool) -> wasmtime::Config {
        let mut config = wasmtime::Config::new();
        config.epoch_interruption(true);
        config.consume_fuel(enable_fuel);
        config
    }
}

impl std::ops::Deref for SharedEngine {
    type Target = Engine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_cache_new() {
        let cache = ModuleCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_missing_engine_path() {
        let cache = ModuleCache::new();
        let engine = SharedEngine::new().unwrap();
        let err = cache
            .get_or_compile(engine.engine(), "no/such/engine.wasm")
            .unwrap_err();
        assert!(matches!(err, PreviewError::EngineNotFound(_)));
    }

    #[test]
    fn test_shared_engine_creation() {
        let engine = SharedEngine::new().unwrap();
        engine.engine().increment_epoch();
    }

    #[test]
    fn test_shared_engine_with_fuel() {
        let engine = SharedEngine::with_fuel().unwrap();
        engine.engine().increment_epoch();
    }

    #[test]
    fn test_shared_engine_clone() {
        let engine1 = SharedEngine::new().unwrap();
        let engine2 = engine1.clone();

        assert!(Arc::ptr_eq(&engine1.arc(), &engine2.arc()));
    }
}
