// Logging tests: subscriber initialization from configuration

use media_transform::config::{LogFormat, LoggingConfig};
use media_transform::logging::init_subscriber;

/// Test: Can initialize tracing subscriber
///
/// Initialization must succeed and log events afterwards must not panic.
/// Calling it a second time (even with another format) keeps the first
/// subscriber and still succeeds.
#[test]
fn test_can_initialize_tracing_subscriber_repeatedly() {
    let json = LoggingConfig::default();
    assert!(init_subscriber(&json).is_ok());

    tracing::info!(width = 400, height = 300, "test event");

    let pretty = LoggingConfig {
        format: LogFormat::Pretty,
        level: "debug".to_string(),
    };
    assert!(init_subscriber(&pretty).is_ok());
}
