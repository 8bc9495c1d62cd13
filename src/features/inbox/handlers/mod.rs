mod inbox_handler;
mod stream_handler;

pub use inbox_handler::*;
pub use stream_handler::*;
