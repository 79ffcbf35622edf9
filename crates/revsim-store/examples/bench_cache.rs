use revsim_store::EntityCache;
use std::sync::Arc;
use std::time::Instant;

const CAPACITY: usize = 10_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cache: EntityCache<Arc<String>> = EntityCache::new("bench", CAPACITY)?;
    let value = Arc::new("payload".to_string());

    let start = Instant::now();
    for i in 0..CAPACITY {
        cache.put(format!("key-{i}"), Arc::clone(&value));
    }
    println!("Filling {CAPACITY} entries took: {:?}", start.elapsed());

    let iterations = 1_000_000;
    let keys: Vec<String> = (0..CAPACITY).map(|i| format!("key-{i}")).collect();
    let start = Instant::now();
    for i in 0..iterations {
        let _ = cache.get(&keys[i % CAPACITY]);
    }
    let duration = start.elapsed();
    println!("{iterations} hits took: {duration:?}");

    // Every put past capacity evicts one entry.
    let start = Instant::now();
    for i in 0..iterations {
        cache.put(format!("new-{i}"), Arc::clone(&value));
    }
    println!("{iterations} evicting puts took: {:?}", start.elapsed());

    println!("{:?}", cache.stats());
    Ok(())
}
