pub mod buffer;
pub mod record;
pub mod symbol;

pub use buffer::{RecordBuffer, DEFAULT_BUFFER_LEN};
pub use record::StreamRecord;
pub use symbol::{Symbol, DEFAULT_SYMBOLS};
