/// Convenience macro for creating a table.
#[macro_export]
macro_rules! table {
    () => {
        $crate::Table::default()
    };

    (
        $(
            $key:expr => $value:expr,
        )*
    ) => {
        {
            let mut entries = ::std::collections::BTreeMap::new();
            $(
                entries.insert(::std::string::String::from($key), $crate::Value::from($value));
            )*
            $crate::Table::from(entries)
        }
    };
}

/// Convenience macro for failing an evaluation with a formatted message.
#[macro_export]
macro_rules! throw {
    ($($arg:tt)*) => {
        return Err($crate::EvaluationError::from(format!($($arg)*)))
    };
}
