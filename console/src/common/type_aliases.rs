// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::{MutexGuard, PoisonError};

pub type StdMutex<T> = std::sync::Mutex<T>;

/// Lock the given mutex. A panic on some other thread while it held this lock does not
/// make the console unusable: the data behind a poisoned lock is still consistent for
/// every type guarded here (each mutation is completed before anything can panic), so
/// the guard is simply recovered.
pub fn lock_recover<T: ?Sized>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
