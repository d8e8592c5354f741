//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the seams between the watch engine and the outside world.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │   Scheduler / Cycle     │
//!     ┌──────────────┤   Auto-hold             ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌──────────┐           ┌─────────────┐              ┌───────────┐
//! │ Provider │           │ Watch store │              │ Notifier  │
//! │ adapters │           │   adapter   │              │ adapters  │
//! └──────────┘           └─────────────┘              └───────────┘
//! ```

pub mod inbound;
pub mod outbound;
