use threading::demos::{self, ProducerConsumerSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    demos::run(|dispatch| {
        demos::producer_consumer(dispatch, &ProducerConsumerSettings::default())
    })?;
    Ok(())
}
