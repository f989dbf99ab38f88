use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::{EitherWriter, MutexGuardWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Destination of the per-run debug log. Events are discarded until
/// [`open`](Self::open) is called, since the run directory only exists once
/// the configuration has been read.
#[derive(Debug, Clone, Default)]
pub struct DebugLog(Arc<OnceLock<Mutex<File>>>);
impl DebugLog {
    pub fn open(&self, path: &Path) -> Result<()> {
        let file = File::create(path).or_raise(|| ErrorKind::Logging)?;
        if self.0.set(Mutex::new(file)).is_err() {
            exn::bail!(ErrorKind::Logging);
        }
        tracing::debug!(path = %path.display(), "Writing debug log");
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for DebugLog {
    type Writer = EitherWriter<MutexGuardWriter<'a, File>, io::Sink>;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.get() {
            Some(file) => EitherWriter::A(file.make_writer()),
            None => EitherWriter::B(io::sink()),
        }
    }
}

/// Console output follows `RUST_LOG` when set, otherwise `info`, `debug` or
/// `trace` depending on `verbose`. With a `debug_log`, everything at debug
/// and above is also written there without colours.
pub fn init(verbose: u8, debug_log: Option<DebugLog>) -> Result<()> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    });
    let console = fmt::layer().with_target(false).with_filter(console_filter);
    let file = debug_log.map(|log| fmt::layer().with_ansi(false).with_writer(log).with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).try_init().or_raise(|| ErrorKind::Logging)?;
    Ok(())
}
