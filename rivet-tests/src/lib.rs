#[cfg(not(feature = "disable-tracing"))]
mod options;
mod orders;
#[cfg(not(feature = "disable-async"))]
mod pending;
mod statement;
mod user;

use log::LevelFilter;
#[cfg(not(feature = "disable-tracing"))]
use options::options;
use orders::orders;
#[cfg(not(feature = "disable-async"))]
use pending::pending;
use rivet::Session;
use statement::statement;
use std::{env, sync::Arc};
pub use user::*;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs the whole suite against a session. The scenarios touch disjoint rows, so they can share it.
pub async fn execute_tests(session: Arc<dyn Session>) {
    users(session.clone()).await;
    orders(session.clone()).await;
    statement(session.clone()).await;
    #[cfg(not(feature = "disable-async"))]
    pending(session.clone()).await;
    #[cfg(not(feature = "disable-tracing"))]
    options(session.clone()).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
