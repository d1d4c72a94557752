pub mod client;
pub mod universe;

pub use client::{ShortableStocksClient, ShortableStocksFactory};
pub use universe::{read_symbols, CsvSymbolUniverse};
