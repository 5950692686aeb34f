//! Streaming chat demo
//!
//! Run with a Fabric server available:
//! `FABRIC_SERVER_URL=http://localhost:8080 cargo run --example chat`

use fabric_client::{ChatRequest, Client, PromptRequest, StreamMessage};

#[tokio::main]
async fn main() -> fabric_client::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    let request = ChatRequest {
        prompts: vec![PromptRequest {
            user_input: "Write a short function that calculates the factorial of a number."
                .to_string(),
            vendor: "OpenAI".to_string(),
            model: "gpt-4o".to_string(),
            pattern_name: "coding_master".to_string(),
            ..Default::default()
        }],
        language: "en".to_string(),
        ..Default::default()
    };

    let mut chat = client.chat(&request).await?;
    while let Some(message) = chat.next_message().await {
        match message {
            StreamMessage::Content { format, content } => {
                println!("content ({format}): {content}");
            }
            StreamMessage::Error { content, .. } => {
                eprintln!("error: {content}");
            }
            StreamMessage::Complete { .. } => {
                println!("chat completed");
            }
        }
    }

    Ok(())
}
