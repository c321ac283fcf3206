/// `write!` into a `String`, which cannot fail
#[macro_export]
macro_rules! append {
    ($dst:expr, $($arg:tt)*) => (write!($dst, $($arg)*).unwrap());
    ($dst:expr, $arg:expr) => (write!($dst, "{}", $arg).unwrap());
}
