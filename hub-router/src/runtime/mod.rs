//! Worker threads.
//!
//! Every port loop and the dispatcher runs on its own named thread with a
//! current-thread tokio runtime. The pool counts live workers so shutdown can wait
//! for them, and can interrupt loops that never reach their poison message.

pub(crate) mod worker_pool;
