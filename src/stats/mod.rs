pub mod aggregator;

pub use aggregator::{recompute, PlayerAggregate, StatsAggregator, StatsPolicy};
