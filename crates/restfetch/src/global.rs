//! Process-wide interceptors
//!
//! Registered hooks apply to every client that has no instance hook for the
//! same point. Registration is last-write-wins; each call takes a snapshot,
//! so a registration never affects a request already in flight.
//! Prefer passing hooks to [`ClientBuilder`](crate::ClientBuilder).

use crate::interceptor::{ErrorInterceptor, Interceptors, RequestInterceptor, ResponseInterceptor};
use std::sync::{Arc, PoisonError, RwLock};

static GLOBAL: RwLock<Interceptors> = RwLock::new(Interceptors::EMPTY);

/// Register the process-wide request interceptor
pub fn add_global_request_interceptor(interceptor: impl RequestInterceptor + 'static) {
    tracing::debug!("Registering global request interceptor");
    write(|hooks| hooks.request = Some(Arc::new(interceptor)));
}

/// Register the process-wide response interceptor
pub fn add_global_response_interceptor(interceptor: impl ResponseInterceptor + 'static) {
    tracing::debug!("Registering global response interceptor");
    write(|hooks| hooks.response = Some(Arc::new(interceptor)));
}

/// Register the process-wide error interceptor
pub fn add_global_error_interceptor(interceptor: impl ErrorInterceptor + 'static) {
    tracing::debug!("Registering global error interceptor");
    write(|hooks| hooks.error = Some(Arc::new(interceptor)));
}

/// Remove every process-wide interceptor
pub fn clear_global_interceptors() {
    write(|hooks| *hooks = Interceptors::EMPTY);
}

pub(crate) fn snapshot() -> Interceptors {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn write(update: impl FnOnce(&mut Interceptors)) {
    let mut hooks = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    update(&mut hooks);
}
