use sentry_tracing::{EventFilter, SentryLayer};
use tracing::Level;
use tracing_subscriber::registry::LookupSpan;

const SENTRY_DSN_VAR: &str = "SENTRY_DSN";

/// Initialise the Sentry client when `SENTRY_DSN` is set.
///
/// The returned guard flushes pending events on drop, so binaries keep it alive
/// for the lifetime of `main`.
pub fn init_once() -> Option<::sentry::ClientInitGuard> {
    let dsn = std::env::var(SENTRY_DSN_VAR)
        .ok()
        .filter(|dsn| !dsn.trim().is_empty())?;

    let environment = if cfg!(debug_assertions) {
        "dev"
    } else {
        "production"
    };

    Some(::sentry::init((
        dsn,
        ::sentry::ClientOptions {
            release: ::sentry::release_name!(),
            environment: Some(environment.into()),
            ..Default::default()
        },
    )))
}

/// Errors become Sentry events, warnings become breadcrumbs.
pub fn sentry_layer<S>() -> SentryLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    sentry_tracing::layer().event_filter(|metadata| match *metadata.level() {
        Level::ERROR => EventFilter::Event,
        Level::WARN => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    })
}
