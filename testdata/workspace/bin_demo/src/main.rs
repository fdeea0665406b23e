use lib_base::{alias_base_fn, alias_util_fn};
use lib_trait::{Add, Mul, Op};

fn run_trait(op: &dyn Op, x: i32) -> i32 {
    op.apply(x)
}

fn main() {
    let add = Add;
    let mul = Mul::new();
    println!("{}", run_trait(&add, 1));
    println!("{}", run_trait(&mul, 2));
    alias_base_fn(123);
    alias_util_fn();
    lib_trait::run_all(&[&add, &mul], 3);
}
