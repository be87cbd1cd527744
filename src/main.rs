use threading::demos::{self, LockSettings, LongTaskSettings, ProducerConsumerSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let long_tasks = LongTaskSettings::default();

    demos::run(|dispatch| {
        demos::producer_consumer(dispatch, &ProducerConsumerSettings::default())
    })?;
    demos::run(|dispatch| demos::lock(dispatch, &LockSettings::default()))?;
    demos::run(|dispatch| demos::thread_pooling(dispatch, &long_tasks))?;
    demos::run(|dispatch| demos::thread_no_thread(dispatch, &long_tasks))?;
    //  runs last, the detached task is abandoned as soon as main returns
    let _detached = demos::run(|dispatch| demos::daemon_no_daemon(dispatch, &long_tasks))?;
    Ok(())
}
