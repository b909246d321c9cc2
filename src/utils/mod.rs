pub mod filename;
pub mod fs;
pub mod time;
