//! Output: console status, document outline, renderers and file emission

pub mod console;
pub mod emitter;
pub mod formatter;
pub mod outline;
