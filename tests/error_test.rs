use abyss::{AbyssError, Result};

#[test]
fn test_invalid_url() {
    let err = AbyssError::InvalidUrl("not a url".to_string());
    assert_eq!(err.to_string(), "Invalid URL: not a url");
}

#[test]
fn test_config_error() {
    let err = AbyssError::ConfigError("port out of range".to_string());
    assert_eq!(err.to_string(), "Configuration error: port out of range");
}

#[test]
fn test_error_conversion_from_anyhow() {
    let anyhow_err = anyhow::anyhow!("test anyhow error");
    let abyss_err: AbyssError = anyhow_err.into();
    assert!(abyss_err.to_string().contains("test anyhow error"));
}

#[test]
fn test_error_conversion_from_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let abyss_err: AbyssError = json_err.into();
    assert!(matches!(abyss_err, AbyssError::JsonError(_)));
}

#[test]
fn test_result_type() {
    fn returns_error() -> Result<()> {
        Err(AbyssError::RemoteError("503 Service Unavailable".to_string()))
    }

    match returns_error() {
        Err(AbyssError::RemoteError(msg)) => assert_eq!(msg, "503 Service Unavailable"),
        _ => panic!("Expected RemoteError"),
    }
}
