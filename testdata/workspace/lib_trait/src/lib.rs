mod ops;

pub use ops::{Add, Mul};

pub trait Op {
    fn apply(&self, x: i32) -> i32;
}

pub fn run_all(ops: &[&dyn Op], x: i32) -> i32 {
    ops.iter().map(|op| op.apply(x)).sum()
}
