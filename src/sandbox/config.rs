//! Preview configuration with builder pattern.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the preview sandbox.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Maximum time a session may sit in `Loading` before it is demoted to
    /// `TimedOut`. Also bounds the engine execution itself.
    pub timeout: Duration,
    /// Maximum engine memory in bytes.
    pub max_memory: u64,
    /// Maximum fuel (instruction count limit).
    pub max_fuel: Option<u64>,
    /// Path to the QuickJS wasm build used for headless execution.
    pub engine_path: PathBuf,
    /// Epoch interruption interval for cooperative timeout.
    pub epoch_tick_interval: Duration,
    /// Smallest height the preview viewport can be dragged to, in pixels.
    pub min_height: u32,
    /// Largest height the preview viewport can be dragged to, in pixels.
    pub max_height: u32,
    /// Initial viewport height, in pixels.
    pub default_height: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_memory: 64 * 1024 * 1024, // 64MB
            max_fuel: None,
            engine_path: PathBuf::from("assets/quickjs.wasm"),
            epoch_tick_interval: Duration::from_millis(10),
            min_height: 200,
            max_height: 700,
            default_height: 320,
        }
    }
}

impl PreviewConfig {
    /// Create a new builder for PreviewConfig.
    pub fn builder() -> PreviewConfigBuilder {
        PreviewConfigBuilder::default()
    }

    /// Clamp a requested viewport height to the configured bounds.
    pub fn clamp_height(&self, px: u32) -> u32 {
        px.clamp(self.min_height, self.max_height)
    }
}

/// Builder for creating PreviewConfig instances.
#[derive(Debug, Clone, Default)]
pub struct PreviewConfigBuilder {
    timeout: Option<Duration>,
    max_memory: Option<u64>,
    max_fuel: Option<u64>,
    engine_path: Option<PathBuf>,
    epoch_tick_interval: Option<Duration>,
    min_height: Option<u32>,
    max_height: Option<u32>,
    default_height: Option<u32>,
}

impl PreviewConfigBuilder {
    /// Set the loading/execution timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum memory limit in bytes.
    pub fn max_memory(mut self, bytes: u64) -> Self {
        self.max_memory = Some(bytes);
        self
    }

    /// Set the maximum fuel (instruction count).
    pub fn max_fuel(mut self, fuel: u64) -> Self {
        self.max_fuel = Some(fuel);
        self
    }

    /// Set the path to the QuickJS wasm engine.
    pub fn engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.engine_path = Some(path.into());
        self
    }

    /// Set the epoch tick interval for timeout checking.
    pub fn epoch_tick_interval(mut self, interval: Duration) -> Self {
        self.epoch_tick_interval = Some(interval);
        self
    }

    /// Set the viewport height bounds.
    pub fn height_bounds(mut self, min: u32, max: u32) -> Self {
        self.min_height = Some(min);
        self.max_height = Some(max);
        self
    }

    /// Set the initial viewport height.
    pub fn default_height(mut self, px: u32) -> Self {
        self.default_height = Some(px);
        self
    }

    /// Build the PreviewConfig.
    pub fn build(self) -> PreviewConfig {
        let default = PreviewConfig::default();
        PreviewConfig {
            timeout: self.timeout.unwrap_or(default.timeout),
            max_memory: self.max_memory.unwrap_or(default.max_memory),
            max_fuel: self.max_fuel.or(default.max_fuel),
            engine_path: self.engine_path.unwrap_or(default.engine_path),
            epoch_tick_interval: self
                .epoch_tick_interval
                .unwrap_or(default.epoch_tick_interval),
            min_height: self.min_height.unwrap_or(default.min_height),
            max_height: self.max_height.unwrap_or(default.max_height),
            default_height: self.default_height.unwrap_or(default.default_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreviewConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_memory, 64 * 1024 * 1024);
        assert_eq!(config.default_height, 320);
    }

    #[test]
    fn test_builder() {
        let config = PreviewConfig::builder()
            .timeout(Duration::from_secs(5))
            .max_memory(32 * 1024 * 1024)
            .max_fuel(1_000_000)
            .height_bounds(100, 500)
            .build();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_memory, 32 * 1024 * 1024);
        assert_eq!(config.max_fuel, Some(1_000_000));
        assert_eq!(config.min_height, 100);
        assert_eq!(config.max_height, 500);
    }

    #[test]
    fn test_clamp_height() {
        let config = PreviewConfig::default();
        assert_eq!(config.clamp_height(50), 200);
        assert_eq!(config.clamp_height(320), 320);
        assert_eq!(config.clamp_height(5000), 700);
    }
}
