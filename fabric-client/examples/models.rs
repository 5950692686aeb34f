//! Model and strategy listing demo
//!
//! Run with a Fabric server available:
//! `FABRIC_SERVER_URL=http://localhost:8080 cargo run --example models`

use fabric_client::Client;

#[tokio::main]
async fn main() -> fabric_client::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    let models = client.list_models().await?;
    for (vendor, names) in &models.vendors {
        println!("{vendor}:");
        for name in names {
            println!("  {name}");
        }
    }

    for strategy in client.list_strategies().await? {
        println!("strategy `{}`: {}", strategy.name, strategy.description);
    }

    Ok(())
}
