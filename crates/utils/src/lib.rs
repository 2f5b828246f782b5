pub mod response;
pub mod sentry;
pub mod stream_lines;
pub mod time;
