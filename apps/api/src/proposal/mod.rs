pub mod assembler;
pub mod handlers;
pub mod record;
