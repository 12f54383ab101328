mod concurrency;
mod crud;
mod materialize;
mod pagination;
mod predicates;
mod references;

use crate::{
    concurrency::concurrency,
    crud::crud,
    materialize::materialize,
    pagination::pagination,
    predicates::predicates,
    references::references,
};
use log::LevelFilter;
use sluice::{Capture, Driver};
use std::env;

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

/// Run every suite against a dialect. The statements are captured instead of
/// being executed, the suites prepare the results the database would return.
pub async fn execute_tests<D: Driver>(mut executor: Capture<D>) {
    predicates(&mut executor).await;
    pagination(&mut executor).await;
    crud(&mut executor).await;
    concurrency(&mut executor).await;
    materialize(&mut executor).await;
    references(&mut executor).await;
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
