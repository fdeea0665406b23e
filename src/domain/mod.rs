pub mod callgraph;
pub mod index;
pub mod symbol;
pub mod unit;
