use crate::Op;

pub struct Add;

impl Op for Add {
    fn apply(&self, x: i32) -> i32 {
        x + 10
    }
}

pub struct Mul;

impl Mul {
    pub fn new() -> Self {
        Mul
    }
}

impl Op for Mul {
    fn apply(&self, x: i32) -> i32 {
        x * 10
    }
}
