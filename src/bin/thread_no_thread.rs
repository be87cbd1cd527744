use threading::demos::{self, LongTaskSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    demos::run(|dispatch| demos::thread_no_thread(dispatch, &LongTaskSettings::default()))?;
    Ok(())
}
