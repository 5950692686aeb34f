//! Pattern CRUD demo
//!
//! Run with a Fabric server available:
//! `FABRIC_SERVER_URL=http://localhost:8080 cargo run --example patterns`

use fabric_client::{Client, Pattern};

#[tokio::main]
async fn main() -> fabric_client::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    let pattern = Pattern {
        name: "demo_pattern".to_string(),
        description: "A demo pattern".to_string(),
        pattern: "Summarize the following text in three bullet points.".to_string(),
    };
    client.create_pattern("demo_pattern", &pattern).await?;
    println!("created pattern `demo_pattern`");

    println!(
        "exists: {}",
        client.pattern_exists("demo_pattern").await?
    );

    for name in client.list_patterns().await? {
        println!("pattern: {name}");
    }

    client
        .rename_pattern("demo_pattern", "demo_pattern_renamed")
        .await?;
    let renamed = client.get_pattern("demo_pattern_renamed").await?;
    println!("renamed to `{}`: {}", renamed.name, renamed.description);

    client.delete_pattern("demo_pattern_renamed").await?;
    println!("deleted pattern");

    Ok(())
}
