use enginemdf::{EngineMdf, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1) Open the file: discovery only reads metadata
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "example.mf4".to_string());
    let mut engine = EngineMdf::open(&path)?;
    println!();

    // 2) List every segment, usable or not
    println!("Segments:");
    for segment in engine.segments() {
        match segment.status().reason() {
            None => println!(
                "    {} [{}] {} samples",
                segment.logical_path(),
                segment.unit().unwrap_or("-"),
                segment.sample_count().unwrap_or(0)
            ),
            Some(reason) => println!("    {} unusable: {}", segment.logical_path(), reason),
        }
    }
    println!();

    // 3) Materialize the usable ones on demand
    let paths: Vec<String> = engine
        .ok_segments()
        .map(|s| s.logical_path().to_string())
        .collect();
    for path in paths {
        match engine.get_channel(&path) {
            Ok(channel) => println!(
                "    {}: {} samples over {:.3} s, mean {:?} {}",
                path,
                channel.len(),
                channel.time().duration(),
                channel.mean(),
                channel.unit()
            ),
            Err(e) => println!("    {}: {}", path, e),
        }
    }

    engine.close();
    Ok(())
}
