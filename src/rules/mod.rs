mod util;

pub mod async_lambda_capture;
pub mod persist_in_loop;
pub mod receive_async_capture;
pub mod schedule_tell;
pub mod stash_once;

pub use async_lambda_capture::{ASYNC_LAMBDA_CAPTURE, AsyncLambdaCaptureRule};
pub use persist_in_loop::{PERSIST_IN_LOOP, PersistInLoopRule};
pub use receive_async_capture::{RECEIVE_ASYNC_CAPTURE, ReceiveAsyncCaptureRule};
pub use schedule_tell::{SCHEDULE_TELL, ScheduleTellRule};
pub use stash_once::{STASH_ONCE, StashOnceRule};
