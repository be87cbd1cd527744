use threading::demos::{self, LockSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    demos::run(|dispatch| demos::lock(dispatch, &LockSettings::default()))?;
    Ok(())
}
