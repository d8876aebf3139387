//! SPA edge server.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌───────────────────────────────────────────────────────┐
//!                          │                      EDGE SERVER                      │
//!                          │                                                       │
//!   Client Request         │  ┌────────┐   ┌────────┐   ┌──────────────────────┐   │
//!   ───────────────────────┼─▶│ trace  │──▶│  cors  │──▶│    routing engine    │   │
//!                          │  │ req-id │   │OPTIONS?│   │ health→static→proxy→ │   │
//!                          │  └────────┘   └────────┘   │      spa fallback    │   │
//!                          │                            └──────────┬───────────┘   │
//!                          │                                       │ proxy         │
//!                          │                                       ▼               │
//!                          │                            ┌──────────────────────┐   │
//!                          │                            │ path rewrite + single│   │
//!   Client Response        │  ┌────────┐                │  forwarding attempt  │   │
//!   ◀──────────────────────┼──│  cors  │◀───────────────│  (bounded timeout)   │◀──┼── Upstream
//!                          │  │headers │                └──────────────────────┘   │
//!                          │  └────────┘                                           │
//!                          └───────────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use edge_proxy::config::Cli;
use edge_proxy::lifecycle;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    lifecycle::start(cli).await?;
    Ok(())
}
