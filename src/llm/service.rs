use tracing::info;

use super::{
    client::TextGenerator,
    fill_in::FillInStory,
    prompt::{
        CompletionRequest,
        FillInStoryConfig,
        StoryConfig,
    },
    sections::GeneratedStory,
};
use crate::core::{
    http::RetryPolicy,
    KosakataError,
    RequestTicket,
    RequestTracker,
    VocabularyWord,
};

/// Generates practice texts from selected vocabulary. A reply that cannot be
/// parsed counts as a failed attempt, same as a transport error.
#[derive(Debug, Clone)]
pub struct StoryService<G> {
    generator: G,
    retry: RetryPolicy,
    tracker: RequestTracker,
}

impl<G: TextGenerator> StoryService<G> {
    pub fn new(generator: G, retry: RetryPolicy) -> Self {
        Self { generator, retry, tracker: RequestTracker::new() }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn generate_story(
        &self,
        vocabulary: &[VocabularyWord],
        config: &StoryConfig,
    ) -> Result<GeneratedStory, KosakataError> {
        ensure_vocabulary(vocabulary)?;
        let request = config.request(vocabulary);
        let story = self.generate("story", &request, |text| GeneratedStory::parse(text, vocabulary)).await?;
        info!(used = story.used_vocabulary.len(), "story generated");
        Ok(story)
    }

    pub async fn generate_fill_in(
        &self,
        vocabulary: &[VocabularyWord],
        config: &FillInStoryConfig,
    ) -> Result<FillInStory, KosakataError> {
        ensure_vocabulary(vocabulary)?;
        let request = config.request(vocabulary);
        let story = self.generate("fill-in story", &request, FillInStory::parse).await?;
        info!(blanks = story.blank_count(), "fill-in story generated");
        Ok(story)
    }

    /// Starts a request whose result only matters if no newer one has begun.
    pub fn begin(&self) -> RequestTicket {
        self.tracker.begin()
    }

    /// `generate_story` guarded by `ticket`: `Ok(None)` when superseded.
    pub async fn generate_story_for(
        &self,
        ticket: RequestTicket,
        vocabulary: &[VocabularyWord],
        config: &StoryConfig,
    ) -> Result<Option<GeneratedStory>, KosakataError> {
        let story = self.generate_story(vocabulary, config).await?;
        Ok(self.tracker.accept(ticket, story))
    }

    async fn generate<T, P>(
        &self,
        label: &str,
        request: &CompletionRequest,
        parse: P,
    ) -> Result<T, KosakataError>
    where
        P: Fn(&str) -> Result<T, KosakataError>,
    {
        self.retry
            .run(label, |_| {
                let parse = &parse;
                async move {
                    let text = self.generator.complete(request).await?;
                    parse(&text)
                }
            })
            .await
            .map_err(|exhausted| KosakataError::GenerationFailed {
                attempts: exhausted.attempts,
                reason: exhausted.last_error.to_string(),
            })
    }
}

fn ensure_vocabulary(vocabulary: &[VocabularyWord]) -> Result<(), KosakataError> {
    if vocabulary.is_empty() {
        return Err(KosakataError::Custom("No vocabulary selected".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{
                AtomicUsize,
                Ordering,
            },
            Mutex,
        },
        time::Duration,
    };

    use super::*;

    /// Replays canned replies in order; the last one repeats.
    struct Scripted {
        replies: Mutex<Vec<Result<String, String>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, &str>>) -> Self {
            let replies =
                replies.into_iter().rev().map(|r| r.map(str::to_string).map_err(str::to_string)).collect();
            Self { replies: Mutex::new(replies), calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextGenerator for Scripted {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, KosakataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = {
                let mut replies = self.replies.lock().expect("replies lock");
                if replies.len() > 1 { replies.pop() } else { replies.last().cloned() }
            };
            reply
                .unwrap_or_else(|| Err("no reply".to_string()))
                .map_err(KosakataError::Custom)
        }
    }

    fn vocab() -> Vec<VocabularyWord> {
        vec![VocabularyWord::new("makan", "eat"), VocabularyWord::new("pantai", "beach")]
    }

    fn service(replies: Vec<Result<&str, &str>>) -> StoryService<Scripted> {
        StoryService::new(Scripted::new(replies), RetryPolicy::new(3, Duration::ZERO))
    }

    #[tokio::test]
    async fn test_retries_transport_and_parse_failures() {
        let service = service(vec![
            Err("rate limited"),
            Ok("[ENGLISH]\nno indonesian here"),
            Ok("[INDONESIAN]\nKami makan di pantai.\n[ENGLISH]\nWe eat at the beach."),
        ]);

        let story = service.generate_story(&vocab(), &StoryConfig::default()).await.expect("story");

        assert_eq!(story.indonesian, "Kami makan di pantai.");
        assert_eq!(story.used_vocabulary, vec!["makan", "pantai"]);
        assert_eq!(service.generator().calls(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let service = service(vec![Err("overloaded")]);

        let result = service.generate_fill_in(&vocab(), &FillInStoryConfig::default()).await;

        match result {
            Err(KosakataError::GenerationFailed { attempts, reason }) => {
                assert_eq!(attempts, 3);
                assert!(reason.contains("overloaded"));
            }
            other => panic!("expected GenerationFailed, got {:?}", other),
        }
        assert_eq!(service.generator().calls(), 3);
    }

    #[tokio::test]
    async fn test_fill_in_story() {
        let service = service(vec![Ok("[STORY]\nSaya [[makan]] di [[pantai]].")]);
        let story = service.generate_fill_in(&vocab(), &FillInStoryConfig::default()).await.expect("story");
        assert_eq!(story.answers, vec!["makan", "pantai"]);
    }

    #[tokio::test]
    async fn test_empty_vocabulary_is_rejected_without_calls() {
        let service = service(vec![Ok("[INDONESIAN]\nHalo")]);
        assert!(service.generate_story(&[], &StoryConfig::default()).await.is_err());
        assert_eq!(service.generator().calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_story_is_dropped() {
        let service = service(vec![Ok("[INDONESIAN]\nSaya makan.")]);
        let first = service.begin();
        let second = service.begin();

        let stale = service.generate_story_for(first, &vocab(), &StoryConfig::default()).await;
        let fresh = service.generate_story_for(second, &vocab(), &StoryConfig::default()).await;

        assert!(stale.expect("stale").is_none());
        assert!(fresh.expect("fresh").is_some());
    }
}
