#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use color_eyre::eyre;
pub use partially_testhelpers_macros::test;

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::{OwoColorize, Style};
use std::io::Write;
use std::sync::Once;

/// Environment variable holding the max log level for tests (`off`, `error`,
/// `warn`, `info`, `debug`, `trace`).
pub const LOG_LEVEL_VAR: &str = "PARTIALLY_LOG";

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_style = match record.level() {
            Level::Error => Style::new().fg_rgb::<243, 139, 168>(),
            Level::Warn => Style::new().fg_rgb::<249, 226, 175>(),
            Level::Info => Style::new().fg_rgb::<166, 227, 161>(),
            Level::Debug => Style::new().fg_rgb::<137, 180, 250>(),
            Level::Trace => Style::new().fg_rgb::<148, 226, 213>(),
        };

        let thread = std::thread::current();
        eprintln!(
            "{:>5} [{}] {}: {}",
            record.level().style(level_style),
            thread.name().unwrap_or("?").dimmed(),
            record.target().style(Style::new().fg_rgb::<137, 180, 250>()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Reads [`LOG_LEVEL_VAR`], falling back to `trace` when unset or unparsable.
pub fn level_from_env() -> LevelFilter {
    std::env::var(LOG_LEVEL_VAR)
        .ok()
        .and_then(|raw| raw.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Trace)
}

/// Panic plumbing, the test runner and thread start-up frames.
#[cfg(not(miri))]
fn is_harness_frame(name: &str) -> bool {
    use regex::Regex;
    use std::sync::LazyLock;

    static HARNESS: LazyLock<Option<Regex>> = LazyLock::new(|| {
        Regex::new(r"^(std::panic|core::panic|test::run_test|__pthread_cond_wait|std::sys::(pal|backtrace)|std::thread::Builder|core::ops::function|test::__rust_begin_short_backtrace|<core::panic::|<alloc::boxed::Box<F,A> as core::ops::function::FnOnce<Args>>::call_once)")
            .ok()
    });
    HARNESS.as_ref().is_some_and(|re| re.is_match(name))
}

#[cfg(not(miri))]
fn install_backtrace_filters() {
    use color_backtrace::termcolor::{ColorChoice, StandardStream};
    use color_backtrace::BacktracePrinter;
    use color_eyre::config::{Frame as EyreFrame, HookBuilder};

    let hook = HookBuilder::default().add_frame_filter(Box::new(|frames: &mut Vec<&EyreFrame>| {
        frames.retain(|frame| {
            !frame
                .name
                .as_ref()
                .is_some_and(|name| is_harness_frame(&name.to_string()))
        });
    }));
    if let Err(err) = hook.install() {
        eprintln!("color-eyre hook already installed: {err}");
    }

    BacktracePrinter::new()
        .add_frame_filter(Box::new(|frames: &mut Vec<&color_backtrace::Frame>| {
            frames.retain(|frame| !frame.name.as_deref().is_some_and(is_harness_frame));
        }))
        .install(Box::new(StandardStream::stderr(ColorChoice::Auto)));
}

fn install_hooks() {
    #[cfg(not(miri))]
    install_backtrace_filters();

    // Another logger may already be installed by the embedding test binary.
    if log::set_boxed_logger(Box::new(StderrLogger)).is_ok() {
        log::set_max_level(level_from_env());
    }
}

/// Installs color-eyre and color-backtrace (except on miri) and the stderr
/// logger. Safe to call from every test: the hooks are installed once per
/// process.
pub fn setup() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(install_hooks);
}

/// [`setup`], then logs the name of the test about to run.
pub fn setup_for(test_name: &str) {
    setup();
    log::debug!("running {}", test_name.bold());
}
