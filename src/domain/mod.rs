// Domain layer - Core models with no I/O
pub mod interval;
pub mod member;
pub mod pin;
pub mod telemetry;
pub mod timestamp;
