//! A typed reactive value cell.
//!
//! A `Signal<T>` owns one value. Writers replace or update it; readers get a
//! cheap `Arc<T>` snapshot; subscribers are called synchronously after every
//! applied change, with the write lock already released so a handler may
//! read the signal again.
//!
//! ```ignore
//! let count = Signal::new(0u32);
//! let read = count.read_only();
//! count.subscribe(|v| println!("count = {v}"));
//! count.update(|v| *v += 1);
//! assert_eq!(*read.get(), 1);
//! ```

mod signal;

pub use signal::{ChangeHandler, ReadSignal, Signal, SubscriptionId};
