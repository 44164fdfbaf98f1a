//! Example: Basic usage of Intention

use intention::loader::{BundleFetcher, Definition, Imports};
use intention::{Config, Toolkit};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    
    // Modules shipped with the binary, keyed by locator
    let bundle = BundleFetcher::new()
        .with("/js/left.js", |loader| {
            loader.register(Definition::new("left", |_| 1i64));
        })
        .with("/js/right.js", |loader| {
            loader.register(
                Definition::new("right", |deps: Imports| deps.value::<i64>(0).copied().unwrap_or(0) + 1)
                    .depends_on("left"),
            );
        });
    
    let toolkit = Toolkit::new(Config::default(), bundle);
    let loader = toolkit.loader();
    
    loader.load("right", |deps: Imports| {
        let right = deps.value::<i64>(0).copied().unwrap_or_default();
        println!("right = {}", right);
    }, false);
    
    smol::block_on(loader.run_until_settled())?;
    
    println!("Intention v{} loaded {:?}", intention::VERSION, loader);
    Ok(())
}
