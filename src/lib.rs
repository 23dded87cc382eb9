#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Netreach
//!
//! A cross-platform network reachability classification and monitoring
//! library for Rust applications.
//!
//! This crate answers "can this target be reached right now, and how"
//! without sending any traffic:
//! - Reachability status for a host, a socket address, the internet
//!   default route, or the directly attached local network
//! - Change notifications through typed, per-monitor subscriptions
//! - A pure flags-to-status classifier usable on its own
//! - Flag snapshots derived from OS interface and routing state via
//!   non-blocking local lookups
//!
//! Reachability is best-effort by nature: a reachable answer means a
//! route exists, not that a probe succeeded. When the system cannot
//! report flags at all, queries degrade to "not reachable" instead of
//! failing.
//!
//! ## Quick Start
//!
//! ```rust
//! use netreach::ReachabilityMonitor;
//!
//! let mut monitor = ReachabilityMonitor::internet();
//! let subscription = monitor.subscribe();
//!
//! println!("internet: {}", monitor.current_status());
//!
//! // Deliver change events until the monitor is stopped or dropped.
//! monitor.start();
//! # let _ = subscription.try_recv();
//! # monitor.stop();
//! ```
//!
//! ## Features
//!
//! - `serde-support` - Enable serialization support for statuses, targets and events

mod error;
mod flags;
mod monitor;
mod source;
mod status;
mod target;

// Re-export core types and traits
pub use error::{Error, Result};
pub use flags::ReachabilityFlags;
pub use monitor::{ReachabilityEvent, ReachabilityMonitor, Subscription};
pub use source::{FlagSource, SystemSource};
pub use status::{classify_local, classify_routed, NetworkStatus, StatusSnapshot};
pub use target::Target;
