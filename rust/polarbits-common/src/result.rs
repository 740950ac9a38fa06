pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Rejects a construction call when `$expr` does not hold.
///
/// Expands to an early `return` of [`ErrorKind::InvalidConstructionInput`]
/// naming the offending parameter and the violated condition.
///
/// [`ErrorKind::InvalidConstructionInput`]: crate::error::ErrorKind::InvalidConstructionInput
#[macro_export]
macro_rules! verify_input {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_input(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_input(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_input(name, condition)
    }
}

#[cold]
pub fn invalid_input(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidConstructionInput {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}
