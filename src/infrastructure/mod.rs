pub mod dataset;
pub mod report;

pub use dataset::StockDataset;
pub use report::ChartRenderer;
