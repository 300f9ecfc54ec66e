//! Shared runtime helpers for the directory workspace.

pub mod utils;

#[cfg(test)]
mod tests {
    use super::utils::logging;

    #[test]
    fn logging_init_is_idempotent() {
        logging::init_logging(false);
        // a second subscriber install must not panic
        logging::init_logging(true);
        tracing::info!(event = "logger_init", "still alive");
    }
}
