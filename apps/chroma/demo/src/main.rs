//! Chroma demo - Entry Point
//!
//! Minimal entry point that delegates to the walkthrough module.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    chroma_demo::run().await
}
