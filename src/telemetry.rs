use prometheus::register_int_counter_vec;
use prometheus::IntCounterVec;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUIZ_QUESTIONS_SERVED: IntCounterVec = register_int_counter_vec!(
        "quiz_questions_served_total",
        "Number of questions handed out to quiz rounds",
        &["category"]
    )
    .unwrap();
}

const DEFAULT_FILTER: &str = "info,sqlx=warn,tower_http=debug";

/// Counts a question handed out by the quiz picker; `0` is the "all categories" round.
pub fn record_quiz_question(category: i64) {
    QUIZ_QUESTIONS_SERVED
        .with_label_values(&[category.to_string().as_str()])
        .inc();
}

/// Installs the fmt subscriber. `LOG_LEVEL` takes an `EnvFilter` directive (default
/// `DEFAULT_FILTER`); `INCLUDE_SPAN_EVENTS=true` also logs span enter/exit.
pub fn init_tracing() {
    let mut fmt_layer = fmt::layer();
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::ENTER | FmtSpan::EXIT);
    }
    let filter_layer = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
