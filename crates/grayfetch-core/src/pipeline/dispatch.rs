//! Fan-out dispatcher: one concurrent download task per link.

use std::sync::Arc;

use super::download::Downloader;
use super::staging::StagingSender;
use super::{emit, EventHook};
use crate::types::{FailureStage, ItemFailure, Link, LocalImage, PipelineEvent};

/// Outcome of the download stage.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Files staged for conversion
    pub downloaded: usize,
    /// Links that produced no staging file
    pub failures: Vec<ItemFailure>,
}

/// Download every link concurrently, pushing successes onto the staging
/// channel.
///
/// All N tasks are spawned up front; there is no cap on download
/// concurrency. Each link's position is its id. Failures are logged and
/// recorded but never stop the other downloads.
///
/// Returns only after every task has finished, and by then every sender
/// clone handed to a task has been dropped. `sender` itself is consumed.
pub async fn dispatch_downloads(
    links: Vec<Link>,
    downloader: Arc<Downloader>,
    sender: StagingSender,
    events: Option<EventHook>,
) -> DownloadReport {
    let mut handles = Vec::with_capacity(links.len());

    for (id, link) in links.into_iter().enumerate() {
        let downloader = downloader.clone();
        let sender = sender.clone();
        let events = events.clone();
        let task_link = link.clone();

        let handle = tokio::spawn(async move {
            download_one(id, task_link, &downloader, &sender, &events).await
        });
        handles.push((id, link, handle));
    }
    drop(sender);

    let mut report = DownloadReport::default();
    for (id, link, handle) in handles {
        match handle.await {
            Ok(None) => report.downloaded += 1,
            Ok(Some(failure)) => report.failures.push(failure),
            Err(e) => {
                tracing::error!("Download task for {} panicked: {e}", link);
                report.failures.push(ItemFailure {
                    id,
                    link,
                    stage: FailureStage::Download,
                    message: format!("task panicked: {e}"),
                });
            }
        }
    }

    tracing::debug!(
        "Download stage finished: {} staged, {} failed",
        report.downloaded,
        report.failures.len()
    );
    report
}

/// Returns `None` on success, or the failure record.
async fn download_one(
    id: usize,
    link: Link,
    downloader: &Downloader,
    sender: &StagingSender,
    events: &Option<EventHook>,
) -> Option<ItemFailure> {
    let path = match downloader.fetch(id, &link).await {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("{e}");
            let message = e.to_string();
            emit(
                events,
                PipelineEvent::DownloadFailed {
                    id,
                    link: link.clone(),
                    message: message.clone(),
                },
            );
            return Some(ItemFailure {
                id,
                link,
                stage: FailureStage::Download,
                message,
            });
        }
    };

    tracing::info!("downloaded: {} to {:?}", link, path);
    emit(
        events,
        PipelineEvent::Downloaded {
            id,
            path: path.clone(),
        },
    );

    match sender.send(LocalImage { id, link, path }) {
        Ok(()) => None,
        Err(image) => {
            // Only reachable if the worker pool is gone
            tracing::error!("Staging channel closed, dropping {:?}", image.path);
            Some(ItemFailure {
                id,
                link: image.link,
                stage: FailureStage::Conversion,
                message: "staging channel closed before conversion".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::staging::staging_channel;
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader(dir: &Path) -> Arc<Downloader> {
        Arc::new(Downloader::with_client(
            reqwest::Client::new(),
            dir.to_path_buf(),
            "jpg",
            true,
        ))
    }

    async fn server_with_images() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken.jpg"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_every_link_is_staged_with_its_position() {
        let server = server_with_images().await;
        let dir = tempfile::tempdir().unwrap();
        let links: Vec<Link> = (0..5)
            .map(|i| Link::new(format!("{}/{i}.jpg", server.uri())))
            .collect();

        let (tx, rx) = staging_channel();
        let report = dispatch_downloads(links, downloader(dir.path()), tx, None).await;
        assert_eq!(report.downloaded, 5);
        assert!(report.failures.is_empty());

        let mut ids = HashSet::new();
        while let Some(image) = rx.recv().await {
            assert_eq!(image.path, dir.path().join(format!("image{}.jpg", image.id)));
            ids.insert(image.id);
        }
        assert_eq!(ids, (0..5).collect());
    }

    #[tokio::test]
    async fn test_failed_download_is_isolated() {
        let server = server_with_images().await;
        let dir = tempfile::tempdir().unwrap();
        let links = vec![
            Link::new(format!("{}/a.jpg", server.uri())),
            Link::new(format!("{}/broken.jpg", server.uri())),
            Link::new(format!("{}/c.jpg", server.uri())),
        ];

        let events = Arc::new(Mutex::new(Vec::<PipelineEvent>::new()));
        let sink = events.clone();
        let hook: EventHook = Arc::new(move |e: PipelineEvent| sink.lock().unwrap().push(e));

        let (tx, rx) = staging_channel();
        let report = dispatch_downloads(links, downloader(dir.path()), tx, Some(hook)).await;

        assert_eq!(report.downloaded, 2);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.id, 1);
        assert_eq!(failure.stage, FailureStage::Download);
        assert!(failure.link.as_str().ends_with("/broken.jpg"));

        let failed_events = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, PipelineEvent::DownloadFailed { .. }))
            .count();
        assert_eq!(failed_events, 1);

        let mut staged = 0;
        while rx.recv().await.is_some() {
            staged += 1;
        }
        assert_eq!(staged, 2);
    }

    #[tokio::test]
    async fn test_no_links() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = staging_channel();
        let report = dispatch_downloads(Vec::new(), downloader(dir.path()), tx, None).await;
        assert_eq!(report.downloaded, 0);
        assert!(report.failures.is_empty());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_downloads_run_concurrently() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"img".to_vec())
                    .set_delay(std::time::Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let links: Vec<Link> = (0..8)
            .map(|i| Link::new(format!("{}/{i}.jpg", server.uri())))
            .collect();

        let (tx, _rx) = staging_channel();
        let start = std::time::Instant::now();
        let report = dispatch_downloads(links, downloader(dir.path()), tx, None).await;
        assert_eq!(report.downloaded, 8);
        // Sequential would take 8 x 300ms
        assert!(start.elapsed() < std::time::Duration::from_millis(1500));
    }
}
