// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Simple macro to create a [`Result`] with an [`Ok`] variant. It is just syntactic sugar
/// that helps having to write `Ok(())`.
/// - If no arg is passed in then it will return `Ok(())`.
/// - If an arg is passed in then it will return `Ok($arg)`.
#[macro_export]
macro_rules! ok {
    // No args.
    () => {
        Ok(())
    };
    // With arg.
    ($value:expr) => {
        Ok($value)
    };
}

/// Return early (with the given value, or `()`) if the console has already shut down.
/// Every mutating operation that is not allowed after shutdown starts with this.
#[macro_export]
macro_rules! early_return_if_shutdown {
    ($flags:expr) => {
        if $flags.is_shutdown() {
            return;
        }
    };
    ($flags:expr, $retval:expr) => {
        if $flags.is_shutdown() {
            return $retval;
        }
    };
}
