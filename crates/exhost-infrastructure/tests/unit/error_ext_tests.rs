//! Error context extension tests

use exhost_domain::Error;
use exhost_infrastructure::ErrorContext;

fn io_failure() -> std::result::Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
}

#[test]
fn test_config_context_keeps_source() {
    let err = io_failure().config_context("loading exhost.toml").unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(err.to_string(), "Configuration error: loading exhost.toml: missing");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_flow_context_maps_to_flow_execution() {
    let err = io_failure().flow_context("opening window").unwrap_err();
    assert!(matches!(err, Error::FlowExecution { .. }));
    assert!(err.to_string().contains("opening window"));
}

#[test]
fn test_flow_context_wraps_domain_errors() {
    let host: exhost_domain::Result<()> = Err(Error::flow_execution("start refused"));

    let err = host.flow_context("Flow failed to start").unwrap_err();
    assert!(err.to_string().contains("Flow failed to start"));
    assert!(err.to_string().contains("start refused"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_success_passes_through() {
    let ok: std::result::Result<u8, std::io::Error> = Ok(7);
    assert_eq!(ok.config_context("unused").unwrap(), 7);
}
