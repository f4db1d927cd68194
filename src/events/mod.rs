//! # Events Module
//!
//! Progress reporting for the compression pipeline.
//!
//! The pipeline emits events through a channel; the CLI subscribes on a
//! separate thread and prints one line per finished file while the worker
//! pool is still running.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Compress(CompressEvent::FileCompleted(p)) = event {
//!             println!("{}: {} -> {}", p.output.display(), p.input_bytes, p.output_bytes);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
