use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use pipeline_ext_core::symbol::vocabulary::{GLOBAL_VARIABLE, STEP_DESCRIPTOR};
use pipeline_ext_core::{
    DetectorConfig, ExtensionDetector, FailureVerbosity, Instance, LocalProjectBackend, Marker,
    Scope, Symbol, SymbolEntry, SymbolStore, SymbolUnit, WholeEnvironmentBackend,
    EXPAND_FAILURES_ENV,
};
use std::sync::{Arc, Mutex};

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};
static INSTALLED: OnceCell<()> = OnceCell::new();

/// Captured lines mentioning `needle`; tests use unique symbol names.
fn captured(needle: &str) -> Vec<(Level, String)> {
    install();
    CAPTURE
        .records
        .lock()
        .expect("capture lock")
        .iter()
        .filter(|(_, line)| line.contains(needle))
        .cloned()
        .collect()
}

fn install() {
    INSTALLED.get_or_init(|| {
        log::set_logger(&CAPTURE).expect("no other logger in this test binary");
        log::set_max_level(LevelFilter::Trace);
    });
}

fn failing_steps_detector(
    prefix: &str,
    config: DetectorConfig,
) -> ExtensionDetector<LocalProjectBackend> {
    let unit = SymbolUnit::local("project")
        .with_symbol(
            Symbol::new(format!("{prefix}.Checkout"))
                .extends(STEP_DESCRIPTOR)
                .marked(Marker::Extension)
                .constructs(Instance::with_properties([("functionName", "checkout")])),
        )
        .with_symbol(
            Symbol::new(format!("{prefix}.NeedsJenkins"))
                .extends(STEP_DESCRIPTOR)
                .marked(Marker::Extension)
                .with_factory(|| Err("cause-needs-live-jenkins".to_string())),
        )
        .with_symbol(
            Symbol::new(format!("{prefix}.Abstract"))
                .extends(STEP_DESCRIPTOR)
                .marked(Marker::Extension)
                .without_constructor("cause-abstract-symbol"),
        );
    let store = Arc::new(SymbolStore::new().with_unit(unit));
    ExtensionDetector::new(LocalProjectBackend::new(store, config), config)
}

#[test]
fn summary_mode_names_failed_symbols_without_causes() {
    install();
    let detector = failing_steps_detector("org.summary", DetectorConfig::quiet());
    let steps = detector.get_steps(&Scope::all()).expect("steps scan");
    assert_eq!(steps.len(), 1);

    let lines = captured("org.summary.");
    assert_eq!(lines.len(), 1, "one summary line expected: {lines:?}");
    let (level, line) = &lines[0];
    assert_eq!(*level, Level::Error);
    assert!(line.contains("org.summary.NeedsJenkins"));
    assert!(line.contains("org.summary.Abstract"));
    assert!(line.contains(EXPAND_FAILURES_ENV));
    assert!(!line.contains("cause-needs-live-jenkins"));
    assert!(!line.contains("cause-abstract-symbol"));
}

#[test]
fn expanded_mode_logs_each_failure_with_its_cause() {
    install();
    let quiet = failing_steps_detector("org.compare.quiet", DetectorConfig::quiet());
    let loud = failing_steps_detector("org.compare.loud", DetectorConfig::expanded());

    assert_eq!(
        quiet.get_steps(&Scope::all()).expect("quiet scan"),
        loud.get_steps(&Scope::all()).expect("loud scan")
    );

    let lines = captured("org.compare.loud.");
    assert_eq!(lines.len(), 2, "one line per failure expected: {lines:?}");
    assert!(lines.iter().all(|(level, _)| *level == Level::Error));
    assert!(lines.iter().any(|(_, line)| {
        line.contains("org.compare.loud.NeedsJenkins") && line.contains("cause-needs-live-jenkins")
    }));
    assert!(lines.iter().any(|(_, line)| {
        line.contains("org.compare.loud.Abstract") && line.contains("cause-abstract-symbol")
    }));
}

#[test]
fn environment_switch_is_read_on_every_call() {
    install();
    let config = DetectorConfig::new(FailureVerbosity::Environment);

    std::env::set_var(EXPAND_FAILURES_ENV, "true");
    let expanded = failing_steps_detector("org.env.on", config);
    let expanded_names = expanded.get_steps(&Scope::all()).expect("scan");
    assert_eq!(captured("org.env.on.").len(), 2);

    std::env::set_var(EXPAND_FAILURES_ENV, "yes");
    let summarized = failing_steps_detector("org.env.off", config);
    let summarized_names = summarized.get_steps(&Scope::all()).expect("scan");
    assert_eq!(captured("org.env.off.").len(), 1);

    std::env::remove_var(EXPAND_FAILURES_ENV);
    assert_eq!(expanded_names, summarized_names);
}

#[test]
fn whole_backend_summarizes_load_failures_as_warnings() {
    install();
    let unit = SymbolUnit::dependency("legacy").with_entry(SymbolEntry::failing(
        Symbol::new("org.warnings.Legacy")
            .extends(GLOBAL_VARIABLE)
            .marked(Marker::Extension),
        "cause-unloadable-class",
    ));
    let store = Arc::new(SymbolStore::new().with_unit(unit));
    let detector = ExtensionDetector::new(
        WholeEnvironmentBackend::new(store, DetectorConfig::quiet()),
        DetectorConfig::quiet(),
    );

    assert!(detector
        .get_global_variables(&Scope::all())
        .expect("scan")
        .is_empty());

    let lines = captured("org.warnings.Legacy");
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert_eq!(lines[0].0, Level::Warn);
    assert!(!lines[0].1.contains("cause-unloadable-class"));
}

#[test]
fn clean_scans_log_no_failures() {
    install();
    let unit = SymbolUnit::local("project").with_symbol(
        Symbol::new("org.clean.Tidy")
            .extends(STEP_DESCRIPTOR)
            .marked(Marker::Extension)
            .constructs(Instance::with_properties([("functionName", "tidy")])),
    );
    let store = Arc::new(SymbolStore::new().with_unit(unit));
    let detector = ExtensionDetector::new(
        LocalProjectBackend::new(store, DetectorConfig::expanded()),
        DetectorConfig::expanded(),
    );
    detector.get_all_extensions(&Scope::all()).expect("scan");

    assert!(captured("org.clean.")
        .iter()
        .all(|(_, line)| !line.contains("symbol_failure")));
}
