//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use pyembed_events::{channel, AppEvent, DownloadEvent};
    use pyembed_net::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;

    fn client() -> NetClient {
        NetClient::new(NetConfig {
            retry_count: 0,
            retry_delay: Duration::from_millis(10),
            ..NetConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_download_file() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        let content = b"test file content";
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test.zip");
            then.status(200)
                .header("content-length", content.len().to_string())
                .body(content);
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("downloaded.zip");
        let url = server.url("/test.zip");
        let cancel = CancellationToken::new();

        let size = download_file(&client(), &url, &dest, None, &cancel, Some(&tx))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(size, content.len() as u64);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), content);

        let mut saw_start = false;
        let mut saw_complete = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Download(DownloadEvent::Started { .. }) => saw_start = true,
                AppEvent::Download(DownloadEvent::Completed { .. }) => saw_complete = true,
                _ => {}
            }
        }
        assert!(saw_start);
        assert!(saw_complete);
    }

    #[tokio::test]
    async fn test_progress_reported_per_chunk() {
        let server = MockServer::start();
        // Two and a half chunks
        let content = vec![7u8; CHUNK_SIZE * 5 / 2];
        server.mock(|when, then| {
            when.method(GET).path("/big.zip");
            then.status(200)
                .header("content-length", content.len().to_string())
                .body(&content);
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("big.zip");
        let url = server.url("/big.zip");
        let cancel = CancellationToken::new();

        let seen = Mutex::new(Vec::new());
        let record = |percent: f64| seen.lock().unwrap().push(percent);

        download_file(&client(), &url, &dest, Some(&record), &cancel, None)
            .await
            .unwrap();

        let seen = seen.into_inner().unwrap();
        assert!(seen.len() >= 3);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!((seen.last().copied().unwrap() - 100.0).abs() < f64::EPSILON);
        assert_eq!(
            std::fs::metadata(&dest).unwrap().len(),
            content.len() as u64
        );
    }

    #[tokio::test]
    async fn test_http_error_leaves_no_file() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();
        server.mock(|when, then| {
            when.method(GET).path("/missing.zip");
            then.status(404);
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("missing.zip");
        let url = server.url("/missing.zip");
        let cancel = CancellationToken::new();

        let err = download_file(&client(), &url, &dest, None, &cancel, Some(&tx))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            pyembed_errors::Error::Network(pyembed_errors::NetworkError::HttpError {
                status: 404,
                ..
            })
        ));
        assert!(!dest.exists());

        let mut saw_failed = false;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Download(DownloadEvent::Failed { failure, .. }) = event {
                assert_eq!(failure.code.as_deref(), Some("network.http_error"));
                saw_failed = true;
            }
        }
        assert!(saw_failed);
    }

    #[tokio::test]
    async fn test_unreachable_host_leaves_no_file() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("python.zip");
        let cancel = CancellationToken::new();

        // Port 9 (discard) on localhost is expected to refuse connections.
        let result = download_file(
            &client(),
            "http://127.0.0.1:9/python.zip",
            &dest,
            None,
            &cancel,
            None,
        )
        .await;

        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_existing_destination_is_untouched() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/python.zip");
            then.status(200).body("new");
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("python.zip");
        std::fs::write(&dest, "old").unwrap();
        let cancel = CancellationToken::new();

        let err = download_file(
            &client(),
            &server.url("/python.zip"),
            &dest,
            None,
            &cancel,
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            pyembed_errors::Error::Network(pyembed_errors::NetworkError::DestinationExists { .. })
        ));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "old");
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_cancelled_download_leaves_no_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow.zip");
            then.status(200)
                .delay(Duration::from_secs(5))
                .body("late");
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("slow.zip");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = download_file(
            &client(),
            &server.url("/slow.zip"),
            &dest,
            None,
            &cancel,
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            pyembed_errors::Error::Network(pyembed_errors::NetworkError::Cancelled { .. })
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky.zip");
            then.status(503);
        });

        let client = NetClient::new(NetConfig {
            retry_count: 2,
            retry_delay: Duration::from_millis(5),
            ..NetConfig::default()
        })
        .unwrap();

        let temp = tempdir().unwrap();
        let dest = temp.path().join("flaky.zip");
        let cancel = CancellationToken::new();

        let err = download_file(
            &client,
            &server.url("/flaky.zip"),
            &dest,
            None,
            &cancel,
            None,
        )
        .await
        .unwrap_err();

        mock.assert_hits(3);
        assert!(matches!(
            err,
            pyembed_errors::Error::Network(pyembed_errors::NetworkError::HttpError {
                status: 503,
                ..
            })
        ));
        assert!(!dest.exists());
    }
}
