use std::io;

use tracing::{Dispatch, Level};
use tracing_subscriber::{fmt::MakeWriter, FmtSubscriber};

/// Builds the log sink handed to every pool and task. Nothing is installed
/// globally; each thread that logs installs it as its scoped default.
pub fn stdout_dispatch() -> Dispatch {
    dispatch_to(io::stdout, true)
}

fn dispatch_to<W>(writer: W, ansi: bool) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_thread_names(true)
        .with_ansi(ansi)
        .with_writer(writer)
        .finish();
    Dispatch::new(subscriber)
}
