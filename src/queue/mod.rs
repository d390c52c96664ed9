//! Durable Work Queue
//!
//! Files waiting for analysis live in a single SQLite table so that a crash
//! or a killed process never loses submitted work. The same table is the
//! feedback channel for plugins that discover new files (archive extraction
//! for example): they append jobs while the current file is still being
//! analysed and the drain loop picks them up afterwards.
//!
//! ```text
//!  CLI submit ──┐                          ┌──► consumer (process A)
//!               ▼                          │
//!        ┌────────────────────────────┐    │
//!        │ queue(id AUTOINCREMENT,    │────┤  BEGIN IMMEDIATE
//!        │       payload BLOB)        │    │  SELECT .. ORDER BY id LIMIT 1
//!        └────────────────────────────┘    │  DELETE .. WHERE id = ?
//!               ▲                          │  COMMIT
//!  plugin ──────┘                          └──► consumer (process B)
//! ```
//!
//! Ordering is FIFO by `id`. Delivery is at-most-once: an item is deleted
//! in the same transaction that reads it, so a crash during analysis loses
//! that item but two consumers never receive the same one.
//!
//! # Example
//!
//! ```rust,no_run
//! use filehound::queue::{Job, WorkQueue};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut queue: WorkQueue<Job> = WorkQueue::open("/var/log/filehound/filehound.db")?;
//! queue.append(&Job::analyze("/samples/invoice.pdf"))?;
//! while let Some(job) = queue.try_pop()? {
//!     println!("next: {}", job.path().display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod job;
pub mod work_queue;

pub use error::{QueueError, QueueResult};
pub use job::Job;
pub use work_queue::{WorkItem, WorkQueue};

#[cfg(test)]
mod tests;
