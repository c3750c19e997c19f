/// Constructs an error object of the given kind and returns it on the `Err`
/// side, e.g. `throw!(sc, TypeError, "{} is not a function", name)`.
#[macro_export]
macro_rules! throw {
    ($sc:expr, $kind:ident, $msg:expr) => {
        return Err($crate::value::error::Error::create(
            $sc,
            $crate::value::error::ErrorKind::$kind,
            String::from($msg),
        ))
    };
    ($sc:expr, $kind:ident, $fmt:expr, $($arg:expr),* $(,)?) => {
        return Err($crate::value::error::Error::create(
            $sc,
            $crate::value::error::ErrorKind::$kind,
            format!($fmt, $($arg),*),
        ))
    };
}
