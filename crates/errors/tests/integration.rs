//! Integration tests for error types

#[cfg(test)]
mod tests {
    use pyembed_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "https://example.com".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = InstallError::ResourceNotFound {
            resource: "python.zip".into(),
            bundle: "embedded".into(),
        };
        assert_eq!(
            err.to_string(),
            "resource python.zip not found in bundle embedded"
        );
    }

    #[test]
    fn test_user_codes_are_stable() {
        let err: Error = InstallError::PackageManagerUnavailable {
            home: "/opt/python".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("install.package_manager_unavailable"));
        assert!(err.user_hint().is_some());

        let err: Error = InstallError::InvalidPackageName {
            file_name: ".whl".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("install.invalid_package_name"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io_with_path(&io_err, "/tmp/archive.zip");
        assert!(err.is_io_kind(std::io::ErrorKind::PermissionDenied));
        assert!(err.to_string().contains("/tmp/archive.zip"));

        let plain: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(plain, Error::Io { path: None, .. }));
    }

    #[test]
    fn test_http_status_retryability() {
        let server_side = NetworkError::HttpError {
            status: 503,
            message: "unavailable".into(),
        };
        let client_side = NetworkError::HttpError {
            status: 404,
            message: "not found".into(),
        };
        assert!(server_side.is_retryable());
        assert!(!client_side.is_retryable());
        assert!(client_side.user_hint().is_some());
    }
}
