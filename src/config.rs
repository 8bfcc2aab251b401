// Tue Jan 13 2026 - Alex

use crate::census::SizePolicy;
use crate::vm::detector::{DEFAULT_COMPRESSED_SHIFT, DEFAULT_SAMPLE_SIZE, MAX_SAMPLE_SIZE, MIN_SAMPLE_SIZE};
use crate::vm::{
    AlignmentDetector, CapturedRuntime, ProfileResolver, RuntimeOptions, RuntimeProbe, StaticSource,
    VmOptionsSource, VmStateSource,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sample_size: usize,
    pub assumed_compressed_shift: u32,
    pub size_policy: SizePolicy,
    /// Profile used when detection fails.
    pub fallback: CapturedRuntime,
    /// Diagnostic VM option values, e.g. `UseCompressedOops`.
    pub vm_options: Option<HashMap<String, String>>,
    /// Output of a "print VM state" diagnostic command.
    pub vm_state: Option<String>,
    pub static_options: Option<RuntimeOptions>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            assumed_compressed_shift: DEFAULT_COMPRESSED_SHIFT,
            size_policy: SizePolicy::FirstInstance,
            fallback: CapturedRuntime {
                name: Some("fallback".to_string()),
                address_width: 8,
                reference_width: 4,
                header_size: 12,
                granularity: 8,
                compressed_shift: Some(DEFAULT_COMPRESSED_SHIFT),
            },
            vm_options: None,
            vm_state: None,
            static_options: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_size_policy(mut self, policy: SizePolicy) -> Self {
        self.size_policy = policy;
        self
    }

    pub fn with_vm_option(mut self, name: &str, value: &str) -> Self {
        self.vm_options
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_vm_state(mut self, dump: &str) -> Self {
        self.vm_state = Some(dump.to_string());
        self
    }

    pub fn with_static_options(mut self, options: RuntimeOptions) -> Self {
        self.static_options = Some(options);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_SAMPLE_SIZE..=MAX_SAMPLE_SIZE).contains(&self.sample_size) {
            return Err(format!(
                "sample_size must be between {} and {}",
                MIN_SAMPLE_SIZE, MAX_SAMPLE_SIZE
            ));
        }
        if self.assumed_compressed_shift > 8 {
            return Err("assumed_compressed_shift must be at most 8".to_string());
        }
        if ![4, 8].contains(&self.fallback.address_width) {
            return Err("fallback.address_width must be 4 or 8".to_string());
        }
        if self.fallback.reference_width > self.fallback.address_width {
            return Err("fallback.reference_width cannot exceed fallback.address_width".to_string());
        }
        if let Err(e) = self.fallback.to_profile() {
            return Err(format!("fallback: {}", e));
        }
        Ok(())
    }

    /// Resolver over the configured trusted sources, in order, with the
    /// detector as the last resort.
    pub fn resolver<'a>(&self, probe: &'a dyn RuntimeProbe) -> Result<ProfileResolver<'a>, ConfigError> {
        let fallback = self
            .fallback
            .to_profile()
            .map_err(|e| ConfigError::Invalid(format!("fallback: {}", e)))?;
        let detector = AlignmentDetector::new(probe)
            .with_sample_size(self.sample_size)
            .with_compressed_shift(self.assumed_compressed_shift)
            .with_fallback(fallback);

        let mut resolver = ProfileResolver::new(detector);
        if let Some(options) = &self.vm_options {
            resolver = resolver.with_source(VmOptionsSource::new(options.clone()));
        }
        if let Some(dump) = &self.vm_state {
            let source = VmStateSource::new(dump).map_err(|e| ConfigError::Invalid(format!("vm_state: {}", e)))?;
            resolver = resolver.with_source(source);
        }
        if let Some(options) = &self.static_options {
            resolver = resolver.with_source(StaticSource::new(options.clone()));
        }
        Ok(resolver)
    }
}
