use threading::demos::{self, LongTaskSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    //  the process exits without waiting for the detached task
    let _detached = demos::run(|dispatch| {
        demos::daemon_no_daemon(dispatch, &LongTaskSettings::default())
    })?;
    Ok(())
}
