// Wed Jan 15 2026 - Alex

use super::args::{Args, CensusArgs, Command, DetectArgs, LayoutArgs};
use crate::census::SizePolicy;
use crate::config::Config;
use crate::inspector::ObjectInspector;
use crate::memory::HeapSnapshot;
use crate::output::{ReportFormat, ReportGenerator};
use crate::structure::TypeRegistry;
use crate::ui::{print_warning, ProgressSpinner};
use crate::vm::{AlignmentProfile, DetectionReport, NativeProbe};
use anyhow::Context;
use colored::Colorize;
use std::sync::Arc;

pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args)?;
        if args.no_color {
            colored::control::set_override(false);
        }

        let config = match &args.config {
            Some(path) => Config::load(path).with_context(|| format!("Loading config {:?}", path))?,
            None => Config::default(),
        };
        let reports = ReportGenerator::new(if args.json { ReportFormat::Json } else { ReportFormat::Text });

        match args.command {
            Command::Layout(layout_args) => self.handle_layout(layout_args, &config, &reports),
            Command::Census(census_args) => self.handle_census(census_args, &config, &reports),
            Command::Detect(detect_args) => self.handle_detect(detect_args, config, &reports),
        }
    }

    fn setup_logging(&self, args: &Args) -> anyhow::Result<()> {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Warn,
        };

        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .try_init()?;

        Ok(())
    }

    fn handle_layout(&self, args: LayoutArgs, config: &Config, reports: &ReportGenerator) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let registry = TypeRegistry::load(&args.registry)?;
        let profile = self.registry_profile(&registry, config, reports)?;
        let inspector = ObjectInspector::new(&registry, profile);

        let mut failed = 0usize;
        for type_name in &args.types {
            match inspector.build_layout(type_name) {
                Ok(layout) => println!("{}", reports.layout(&layout)?),
                Err(e) => {
                    failed += 1;
                    crate::ui::print_error(&format!("{}: {}", type_name, e));
                }
            }
        }

        if failed > 0 {
            anyhow::bail!("{} of {} layouts failed", failed, args.types.len());
        }
        Ok(())
    }

    fn handle_census(&self, args: CensusArgs, config: &Config, reports: &ReportGenerator) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let registry = Arc::new(TypeRegistry::load(&args.registry)?);
        let profile = self.registry_profile(&registry, config, reports)?;
        let policy = if args.per_instance {
            SizePolicy::PerInstance
        } else {
            config.size_policy
        };

        let inspector = ObjectInspector::new(registry.as_ref(), profile).with_size_policy(policy);
        let mut heap = HeapSnapshot::new(Arc::clone(&registry));
        let census = inspector
            .census_of_type(&mut heap, &args.type_name)
            .with_context(|| format!("Census of {} aborted", args.type_name))?;

        println!("{}", reports.census(&census)?);
        Ok(())
    }

    fn handle_detect(&self, args: DetectArgs, mut config: Config, reports: &ReportGenerator) -> anyhow::Result<()> {
        if let Some(sample_size) = args.sample_size {
            config = config.with_sample_size(sample_size);
        }
        config.validate().map_err(|e| anyhow::anyhow!(e))?;

        let report = self.detect(&config, reports.format() == ReportFormat::Text)?;
        println!("{}", reports.detection(&report)?);
        Ok(())
    }

    /// Profile recorded in the registry, or the current process's own.
    fn registry_profile(
        &self,
        registry: &TypeRegistry,
        config: &Config,
        reports: &ReportGenerator,
    ) -> anyhow::Result<AlignmentProfile> {
        if let Some(runtime) = registry.runtime() {
            return Ok(runtime.to_profile()?);
        }

        let report = self.detect(config, false)?;
        if reports.format() == ReportFormat::Text {
            for warning in &report.warnings {
                print_warning(warning);
            }
            println!("{}\n", report.profile.to_string().dimmed());
        }
        Ok(report.profile)
    }

    fn detect(&self, config: &Config, show_progress: bool) -> anyhow::Result<DetectionReport> {
        let probe = NativeProbe::new();
        let resolver = config.resolver(&probe)?;

        let spinner = if show_progress {
            ProgressSpinner::new(&format!("Sampling {} allocations...", config.sample_size))
        } else {
            ProgressSpinner::hidden()
        };
        let report = resolver.resolve();
        spinner.finish_and_clear();

        log::debug!("Profile resolved in {:?}", spinner.elapsed());
        Ok(report)
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
