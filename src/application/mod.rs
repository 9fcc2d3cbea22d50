// Application layer - Use cases and the traits they depend on
pub mod data_source;
pub mod interval_fetcher;
pub mod member_view;
pub mod telemetry_repository;
pub mod widgets;
