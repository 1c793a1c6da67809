//! Integration tests for config

#[cfg(test)]
mod tests {
    use pyembed_config::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 5] = [
        "PYEMBED_INSTALL_ROOT",
        "PYEMBED_DIRECTORY_NAME",
        "PYEMBED_SOURCE_URL",
        "PYEMBED_FORCE",
        "PYEMBED_BOOTSTRAP_URL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[paths]
install_root = "/opt/runtimes"

[runtime]
directory_name = "py37"
force = true
restriction_file = "keep"

[runtime.source]
kind = "local"
path = "/tmp/python-3.7.3-embed-amd64.zip"

[network]
retries = 5
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.paths.install_root, Some(PathBuf::from("/opt/runtimes")));
        assert_eq!(config.runtime.directory_name.as_deref(), Some("py37"));
        assert!(config.runtime.force);
        assert_eq!(config.runtime.restriction_file, RestrictionPolicy::Keep);
        assert_eq!(
            config.runtime.source,
            SourceConfig::Local {
                path: PathBuf::from("/tmp/python-3.7.3-embed-amd64.zip")
            }
        );
        assert_eq!(config.network.retries, 5);
        // Unspecified fields keep their defaults
        assert_eq!(config.network.connect_timeout, 30);
        assert_eq!(
            config.package_manager.bootstrap_url,
            constants::DEFAULT_BOOTSTRAP_URL
        );
    }

    #[tokio::test]
    async fn test_directory_source() {
        let config = Config::parse(
            r#"
[runtime.source]
kind = "directory"
dir = "/usr/share/pyembed"
resource = "python-3.7.3-embed-amd64.zip"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.runtime.source,
            SourceConfig::Directory { ref resource, .. } if resource == "python-3.7.3-embed-amd64.zip"
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = Config::load_from_file(std::path::Path::new("/definitely/not/here.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            pyembed_errors::Error::Config(pyembed_errors::ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::parse("[runtime\nforce = ").unwrap_err();
        assert!(matches!(
            err,
            pyembed_errors::Error::Config(pyembed_errors::ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("PYEMBED_INSTALL_ROOT", "/var/lib/pyembed");
        std::env::set_var("PYEMBED_DIRECTORY_NAME", "python-embedded");
        std::env::set_var("PYEMBED_SOURCE_URL", "https://mirror.example/python.zip");
        std::env::set_var("PYEMBED_FORCE", "1");
        std::env::set_var("PYEMBED_BOOTSTRAP_URL", "https://mirror.example/get-pip.py");

        let mut config = Config::default();
        let result = config.merge_env();
        clear_env();
        result.unwrap();

        assert_eq!(
            config.install_root().unwrap(),
            PathBuf::from("/var/lib/pyembed")
        );
        assert_eq!(
            config.runtime.directory_name.as_deref(),
            Some("python-embedded")
        );
        assert_eq!(
            config.runtime.source,
            SourceConfig::Remote {
                url: "https://mirror.example/python.zip".to_string()
            }
        );
        assert!(config.runtime.force);
        assert_eq!(
            config.package_manager.bootstrap_url,
            "https://mirror.example/get-pip.py"
        );
    }

    #[test]
    fn test_merge_env_rejects_bad_values() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("PYEMBED_FORCE", "sometimes");
        let mut config = Config::default();
        let result = config.merge_env();
        clear_env();
        assert!(result.is_err());

        std::env::set_var("PYEMBED_SOURCE_URL", "ftp://old.example/python.zip");
        let result = config.merge_env();
        clear_env();
        assert!(result.is_err());
        assert_eq!(config.runtime.source, SourceConfig::default());
    }
}
