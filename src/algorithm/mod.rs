/// Memoized chord rasterization per unordered pin pair
pub mod cache;
/// Greedy pin selection and step bookkeeping
pub mod engine;
/// Cooperative run loop with throttled progress reporting
pub mod executor;
/// Unordered pin pair keys and the used-pair set
pub mod pairs;
/// Residual brightness raster and chord scoring
pub mod residual;
