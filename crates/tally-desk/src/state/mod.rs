//! # State Module
//!
//! Shared state behind the desk facade.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                       Desk Facade                                │  │
//! │  │   holds: SessionState + Arc<dyn Store> seams                     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  SessionState (Arc<Mutex<SaleDraft>>)                            │  │
//! │  │  The ONE piece of shared mutable state. Everything else flowing  │  │
//! │  │  through the desk is a read-only snapshot or a store record.     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: Protected by Arc<Mutex<T>> for exclusive access      │
//! │  • Configs: Re-fetched per calculation, passed by reference           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;

pub use session::SessionState;
