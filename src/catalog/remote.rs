use std::{
    collections::HashMap,
    sync::Arc,
};

use futures::future::join_all;
use reqwest::{
    Client,
    Url,
};
use tracing::{
    info,
    warn,
};

use super::{
    listing::{
        FileListing,
        FolderListing,
    },
    parser::parse_vocabulary,
};
use crate::core::{
    http::{
        fetch_text,
        RetryPolicy,
    },
    KosakataError,
    RequestTracker,
    VocabularyFolder,
    VocabularySet,
};

/// Loads the catalog from a running vocabulary server over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
    tracker: RequestTracker,
}

impl RemoteCatalog {
    pub fn new(base_url: &str, client: Client, retry: RetryPolicy) -> Result<Self, KosakataError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| KosakataError::Custom(format!("Invalid server URL {base_url}: {e}")))?;
        Ok(Self { client, base_url, retry, tracker: RequestTracker::new() })
    }

    fn endpoint(&self, relative: &str) -> Result<Url, KosakataError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                KosakataError::Custom(format!("Server URL cannot be a base: {}", self.base_url))
            })?;
            segments.pop_if_empty().extend(["api", "vocabulary"]);
            segments.extend(relative.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    /// Fetches and validates the folder listing. Retried per the policy.
    pub async fn fetch_listing(&self) -> Result<FolderListing, KosakataError> {
        let url = self.endpoint("")?;
        self.retry
            .run("vocabulary listing", |_| {
                let url = url.clone();
                async move {
                    let body = fetch_text(&self.client, url.as_str()).await?;
                    let listing: FolderListing = serde_json::from_str(&body)?;
                    listing.validate()?;
                    Ok(listing)
                }
            })
            .await
            .map_err(|exhausted| exhausted.last_error)
    }

    /// Fetches one file. Failures are recorded on the returned set.
    pub async fn fetch_set(&self, folder_path: &str, file: &FileListing) -> VocabularySet {
        let result = match self.endpoint(&file.path) {
            Ok(url) => fetch_text(&self.client, url.as_str()).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(content) => {
                let parsed = parse_vocabulary(&content);
                if !parsed.skipped.is_empty() {
                    warn!(file = %file.path, skipped = parsed.skipped.len(), "skipped malformed lines");
                }
                VocabularySet::new(folder_path, &file.name, parsed.words)
            }
            Err(e) => {
                warn!(file = %file.path, error = %e, "failed to fetch vocabulary file");
                VocabularySet::failed(folder_path, &file.name, e.to_string())
            }
        }
    }

    /// Fetches the listing and every file concurrently, then assembles the
    /// tree with the same ordering as a local scan.
    pub async fn load(&self) -> Result<VocabularyFolder, KosakataError> {
        let listing = self.fetch_listing().await?;

        let mut pending: Vec<(&str, &FileListing)> = Vec::new();
        collect_files(&listing, &mut pending);

        let sets = join_all(pending.iter().map(|(folder_path, file)| self.fetch_set(folder_path, file)))
            .await;
        let mut by_id: HashMap<String, VocabularySet> =
            sets.into_iter().map(|set| (set.id.clone(), set)).collect();

        let mut tree = assemble(&listing, &mut by_id);
        tree.sort_recursive();
        info!(server = %self.base_url, sets = tree.count_sets(), "remote catalog loaded");
        Ok(tree)
    }

    /// Like `load`, but yields `None` if another load was started meanwhile.
    pub async fn load_latest(&self) -> Result<Option<VocabularyFolder>, KosakataError> {
        let ticket = self.tracker.begin();
        let tree = self.load().await?;
        Ok(self.tracker.accept(ticket, tree))
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }
}

fn collect_files<'a>(listing: &'a FolderListing, out: &mut Vec<(&'a str, &'a FileListing)>) {
    for file in &listing.files {
        out.push((listing.path.as_str(), file));
    }
    for sub in &listing.subfolders {
        collect_files(sub, out);
    }
}

fn assemble(listing: &FolderListing, sets: &mut HashMap<String, VocabularySet>) -> VocabularyFolder {
    let mut folder = VocabularyFolder::new(listing.name.clone(), listing.path.clone());
    folder.error = listing.error.clone();
    folder.sets = listing
        .files
        .iter()
        .filter_map(|file| sets.remove(&file.path))
        .map(Arc::new)
        .collect();
    folder.subfolders = listing.subfolders.iter().map(|sub| assemble(sub, sets)).collect();
    folder
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        time::Duration,
    };

    use tempfile::tempdir;

    use super::*;
    use crate::{
        catalog::CatalogBuilder,
        server::{
            build_router,
            ServerState,
        },
    };

    async fn spawn_server(root: std::path::PathBuf) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let app = build_router(ServerState::new(root));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve app");
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_remote_load_matches_local_scan() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("Aliyah Vocab/Week 1")).expect("mkdir");
        fs::create_dir_all(root.join("themes")).expect("mkdir");
        fs::write(root.join("Aliyah Vocab/Week 1/kata kerja.txt"), "makan\teat\nminum\tdrink\n")
            .expect("write");
        fs::write(root.join("themes/beach.txt"), "pantai\tbeach\nbad line\n").expect("write");
        fs::write(root.join("themes/empty.txt"), "").expect("write");

        let base = spawn_server(root.clone()).await;
        let remote =
            RemoteCatalog::new(&base, Client::new(), RetryPolicy::new(1, Duration::ZERO)).expect("client");

        let loaded = remote.load().await.expect("remote load");
        let local = CatalogBuilder::scan(&root).expect("local scan");

        assert_eq!(loaded.folder_paths(), local.folder_paths());
        let remote_ids: Vec<String> = loaded.descendant_sets().iter().map(|s| s.id.clone()).collect();
        let local_ids: Vec<String> = local.descendant_sets().iter().map(|s| s.id.clone()).collect();
        assert_eq!(remote_ids, local_ids);
        assert_eq!(loaded.count_words(), 3);

        let week = loaded.find_folder("Aliyah Vocab/Week 1").expect("nested folder with spaces");
        assert_eq!(week.sets[0].items[1].english, "drink");
    }

    #[tokio::test]
    async fn test_odd_sibling_name_does_not_break_remote_load() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("good.txt"), "baik\tgood\n").expect("write");
        fs::write(dir.path().join("a\\b.txt"), "buruk\tbad\n").expect("write");
        let base = spawn_server(dir.path().to_path_buf()).await;
        let remote =
            RemoteCatalog::new(&base, Client::new(), RetryPolicy::new(1, Duration::ZERO)).expect("client");

        let loaded = remote.load().await.expect("remote load");
        let ids: Vec<String> = loaded.descendant_sets().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["good.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let remote = RemoteCatalog::new(
            "http://127.0.0.1:9",
            Client::new(),
            RetryPolicy::new(2, Duration::ZERO),
        )
        .expect("client");
        assert!(remote.load().await.is_err());
    }

    #[tokio::test]
    async fn test_superseded_load_is_discarded() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.txt"), "satu\tone\n").expect("write");
        let base = spawn_server(dir.path().to_path_buf()).await;
        let remote =
            RemoteCatalog::new(&base, Client::new(), RetryPolicy::default()).expect("client");

        let first = remote.load_latest();
        let second = remote.load_latest();
        let (first, second) = tokio::join!(first, second);

        assert!(first.expect("first load").is_none());
        assert!(second.expect("second load").is_some());
    }

    #[test]
    fn test_endpoint_encoding() {
        let remote = RemoteCatalog::new(
            "http://localhost:3001/",
            Client::new(),
            RetryPolicy::default(),
        )
        .expect("client");
        let url = remote.endpoint("Aliyah Vocab/Week 1/a b.txt").expect("url");
        assert_eq!(url.as_str(), "http://localhost:3001/api/vocabulary/Aliyah%20Vocab/Week%201/a%20b.txt");
    }
}
