pub fn base_fn<T>(val: T) -> T {
    val
}

pub mod util_mod {
    pub fn util_fn() {
        super::base_fn(());
    }
}

pub use base_fn as alias_base_fn;
pub use util_mod::util_fn as alias_util_fn;
