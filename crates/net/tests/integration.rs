//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use impack_errors::{Error, NetworkError};
    use impack_events::{channel, AppEvent, DownloadEvent};
    use impack_net::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_download_file() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        let content = b"PK\x03\x04 archive bytes";
        let mock = server.mock(|when, then| {
            when.method(GET).path("/acme/api/archive/master.zip");
            then.status(200)
                .header("content-length", content.len().to_string())
                .body(content);
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("download.bin");
        let client = NetClient::with_defaults().unwrap();
        let url = server.url("/acme/api/archive/master.zip");

        let result = download_file(&client, &url, &dest, &tx).await.unwrap();

        mock.assert();
        assert_eq!(result.size, content.len() as u64);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), content);

        let mut saw_start = false;
        let mut saw_complete = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Download(DownloadEvent::Started { total_size, .. }) => {
                    assert_eq!(total_size, Some(content.len() as u64));
                    saw_start = true;
                }
                AppEvent::Download(DownloadEvent::Completed { .. }) => saw_complete = true,
                _ => {}
            }
        }
        assert!(saw_start);
        assert!(saw_complete);
    }

    #[tokio::test]
    async fn test_http_error_is_reported_once() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing.zip");
            then.status(404);
        });

        let temp = tempdir().unwrap();
        let client = NetClient::with_defaults().unwrap();
        let err = download_file(
            &client,
            &server.url("/missing.zip"),
            &temp.path().join("x"),
            &tx,
        )
        .await
        .unwrap_err();

        // No retries
        mock.assert_hits(1);
        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            AppEvent::Download(DownloadEvent::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let (tx, _rx) = channel();
        let temp = tempdir().unwrap();
        let client = NetClient::with_defaults().unwrap();
        let err = download_file(&client, "not a url", &temp.path().join("x"), &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(NetworkError::InvalidUrl(_))));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = impack_config::NetworkConfig {
            timeout: 10,
            connect_timeout: 2,
            user_agent: "impack-test".to_string(),
        };
        let config = NetConfig::from(&settings);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "impack-test");
        assert_eq!(config.pool_max_idle_per_host, 10);
    }
}
