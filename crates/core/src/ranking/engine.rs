//! Embedding-based ranking of chunks, sentences and candidate phrases

use super::fusion::fuse;
use super::selection::select;
use crate::aggregate::dedup_and_sort;
use crate::candidates::{CandidateGenerator, StopWords, Token, Tokenizer};
use crate::config::ExtractionConfig;
use crate::embedding::{EmbeddingSession, PromptRole};
use crate::error::Result;
use crate::text::SentenceSplitter;
use crate::types::{Keyphrase, ScoreOrder};
use futures::future::try_join_all;
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Ranks candidate phrases of each chunk against the chunk embedding
///
/// With sentence filtering enabled the engine first keeps the sentences that
/// best represent the chunk, ranks phrases inside each kept sentence and fuses
/// both rankings. Without it, phrases of the whole chunk are pooled and ranked
/// once against the chunk.
///
/// Selection problems (no candidates, unusable vectors) only empty the list of
/// the affected unit. Encoder and tokenizer errors fail the whole call.
pub struct RankingEngine {
    session: EmbeddingSession,
    tokenizer: Arc<dyn Tokenizer>,
    stop_words: Arc<StopWords>,
    splitter: SentenceSplitter,
    config: ExtractionConfig,
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field("session", &self.session)
            .field("stop_words", &self.stop_words.len())
            .field("config", &self.config)
            .finish()
    }
}

impl RankingEngine {
    pub fn new(
        session: EmbeddingSession,
        tokenizer: Arc<dyn Tokenizer>,
        stop_words: Arc<StopWords>,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            session,
            tokenizer,
            stop_words,
            splitter: SentenceSplitter::new(config.minimum_characters()),
            config,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn session(&self) -> &EmbeddingSession {
        &self.session
    }

    /// Ranks keyphrases for every chunk
    ///
    /// Returns one list per chunk, in chunk order, without repeated phrases and
    /// sorted by score descending.
    ///
    /// # Errors
    ///
    /// Propagates tokenizer and encoder errors.
    #[instrument(skip(self, chunks), fields(chunks = chunks.len(), model = self.session.model_name()))]
    pub async fn extract_keyphrases(&self, chunks: &[String]) -> Result<Vec<Vec<Keyphrase>>> {
        let sentences: Vec<Vec<String>> = chunks.iter().map(|c| self.splitter.split(c)).collect();
        let tokens: Vec<Vec<Vec<Token>>> = sentences
            .iter()
            .map(|chunk_sentences| {
                chunk_sentences
                    .iter()
                    .map(|s| self.tokenizer.tokenize(s))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let mut generator = CandidateGenerator::new(
            self.config.phrasing().clone(),
            self.config.pos_filter().clone(),
            Arc::clone(&self.stop_words),
        );
        let all_sentences: Vec<Vec<Token>> = tokens.iter().flatten().cloned().collect();
        generator.fit(&all_sentences);
        debug!(
            "Split {} chunks into {} sentences",
            chunks.len(),
            all_sentences.len()
        );

        let generator = &generator;
        let ranked = try_join_all(chunks.iter().zip(&sentences).zip(&tokens).map(
            |((chunk, chunk_sentences), chunk_tokens)| async move {
                if self.config.filter_sentences() {
                    self.rank_by_sentences(generator, chunk, chunk_sentences, chunk_tokens)
                        .await
                } else {
                    self.rank_by_chunk(generator, chunk, chunk_sentences, chunk_tokens)
                        .await
                }
            },
        ))
        .await?;

        info!(
            "Ranked keyphrases for {} chunks ({} phrases)",
            ranked.len(),
            ranked.iter().map(Vec::len).sum::<usize>()
        );
        Ok(ranked)
    }

    async fn rank_by_sentences(
        &self,
        generator: &CandidateGenerator,
        chunk: &str,
        sentences: &[String],
        tokens: &[Vec<Token>],
    ) -> Result<Vec<Keyphrase>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let target = self.config.target();
        let chunk_embedding = self
            .session
            .encode_one(chunk, Some(PromptRole::Passage))
            .await?;
        let rewritten: Vec<String> = sentences.iter().map(|s| target.rewrite(chunk, s)).collect();
        let sentence_embeddings = self
            .session
            .encode(&rewritten, Some(PromptRole::Query))
            .await?;

        let selected = self.select_or_empty(
            &chunk_embedding,
            &sentence_embeddings,
            sentences,
            self.config.max_filtered_sentences(),
            "sentence",
        );
        debug!("Kept {} of {} sentences", selected.len(), sentences.len());

        let phrase_lists = try_join_all(selected.iter().map(|sentence| async move {
            match sentences.iter().position(|s| *s == sentence.phrase) {
                Some(i) => self.rank_phrases(generator, &sentence.phrase, &tokens[i]).await,
                None => Ok(Vec::new()),
            }
        }))
        .await?;

        let fused = fuse(&selected, &phrase_lists, self.config.fusion());
        Ok(dedup_and_sort(fused, ScoreOrder::Descending))
    }

    async fn rank_phrases(
        &self,
        generator: &CandidateGenerator,
        sentence: &str,
        tokens: &[Token],
    ) -> Result<Vec<Keyphrase>> {
        let labels: Vec<String> = generator.generate(sentence, tokens)?.into_iter().collect();
        if labels.is_empty() {
            debug!("No candidates in sentence: {}", sentence);
            return Ok(Vec::new());
        }

        let target = self.config.target();
        let anchor = self
            .session
            .encode_one(sentence, Some(PromptRole::Passage))
            .await?;
        let rewritten: Vec<String> = labels.iter().map(|c| target.rewrite(sentence, c)).collect();
        let embeddings = self
            .session
            .encode(&rewritten, Some(PromptRole::Query))
            .await?;

        Ok(self.select_or_empty(
            &anchor,
            &embeddings,
            &labels,
            self.config.max_filtered_phrases(),
            "phrase",
        ))
    }

    async fn rank_by_chunk(
        &self,
        generator: &CandidateGenerator,
        chunk: &str,
        sentences: &[String],
        tokens: &[Vec<Token>],
    ) -> Result<Vec<Keyphrase>> {
        let mut pool: IndexSet<String> = IndexSet::new();
        for (sentence, sentence_tokens) in sentences.iter().zip(tokens) {
            pool.extend(generator.generate(sentence, sentence_tokens)?);
        }
        if pool.is_empty() {
            debug!("No candidates in chunk of {} sentences", sentences.len());
            return Ok(Vec::new());
        }

        let labels: Vec<String> = pool.into_iter().collect();
        let target = self.config.target();
        let anchor = self
            .session
            .encode_one(chunk, Some(PromptRole::Passage))
            .await?;
        let rewritten: Vec<String> = labels.iter().map(|c| target.rewrite(chunk, c)).collect();
        let embeddings = self
            .session
            .encode(&rewritten, Some(PromptRole::Query))
            .await?;

        let picked = self.select_or_empty(
            &anchor,
            &embeddings,
            &labels,
            self.config.max_filtered_phrases(),
            "phrase",
        );
        Ok(dedup_and_sort(picked, ScoreOrder::Descending))
    }

    fn select_or_empty(
        &self,
        anchor: &[f32],
        candidates: &[Vec<f32>],
        labels: &[String],
        top_n: usize,
        unit: &str,
    ) -> Vec<Keyphrase> {
        match select(
            anchor,
            candidates,
            labels,
            top_n,
            self.config.strategy(),
            self.config.metric(),
        ) {
            Ok(picked) => picked,
            Err(e) => {
                warn!("Skipping {} selection: {}", unit, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{PosTag, ScriptTokenizer};
    use crate::config::ExtractionSettings;
    use crate::embedding::Encoder;
    use crate::error::KpxError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// One axis per watched word; texts containing none map to the last axis
    struct KeywordEncoder {
        words: Vec<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    impl KeywordEncoder {
        fn new(words: &[&'static str]) -> Self {
            Self {
                words: words.to_vec(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Encoder for KeywordEncoder {
        fn model_name(&self) -> &str {
            "keyword"
        }

        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.seen.lock().unwrap().extend(texts.iter().cloned());
            Ok(texts
                .iter()
                .map(|text| {
                    let mut v: Vec<f32> = self
                        .words
                        .iter()
                        .map(|w| if text.contains(w) { 1.0 } else { 0.0 })
                        .collect();
                    v.push(if v.iter().all(|x| *x == 0.0) { 1.0 } else { 0.1 });
                    v
                })
                .collect())
        }
    }

    struct FailingEncoder;

    #[async_trait]
    impl Encoder for FailingEncoder {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(KpxError::network("connection refused"))
        }
    }

    struct FailingTokenizer;

    impl Tokenizer for FailingTokenizer {
        fn tokenize(&self, _text: &str) -> Result<Vec<Token>> {
            Err(KpxError::tokenizer("dictionary missing"))
        }
    }

    fn engine(encoder: Arc<dyn Encoder>, settings: ExtractionSettings) -> RankingEngine {
        RankingEngine::new(
            EmbeddingSession::new(encoder),
            Arc::new(ScriptTokenizer::new()),
            Arc::new(StopWords::empty()),
            settings.validate().unwrap(),
        )
    }

    fn chunk() -> Vec<String> {
        vec!["東京は日本の首都である。経済の中心でもある。".to_string()]
    }

    #[tokio::test]
    async fn test_pooled_chunk_ranking() {
        let encoder = Arc::new(KeywordEncoder::new(&["東京", "日本", "首都"]));
        let settings = ExtractionSettings::default()
            .with_filter_sentences(false)
            .with_max_filtered_phrases(2);
        let ranked = engine(encoder, settings).extract_keyphrases(&chunk()).await.unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].len(), 2);
        assert!(ranked[0][0].score >= ranked[0][1].score);
    }

    #[tokio::test]
    async fn test_sentence_filtered_ranking_uses_prompts_by_role() {
        let encoder = Arc::new(KeywordEncoder::new(&["東京", "経済"]));
        let session = EmbeddingSession::new(encoder.clone()).with_prompts(Some(
            crate::embedding::EmbeddingPrompts::new("passage: ", "query: "),
        ));
        let settings = ExtractionSettings {
            minimum_characters: 1,
            ..Default::default()
        };
        let engine = RankingEngine::new(
            session,
            Arc::new(ScriptTokenizer::new()),
            Arc::new(StopWords::empty()),
            settings.validate().unwrap(),
        );

        let ranked = engine.extract_keyphrases(&chunk()).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert!(!ranked[0].is_empty());

        let seen = encoder.seen.lock().unwrap();
        assert!(seen[0].starts_with("passage: 東京は日本の首都である。"));
        assert!(seen.iter().any(|t| t == "query: 東京"));
    }

    #[tokio::test]
    async fn test_chunk_without_candidates_is_empty() {
        let encoder = Arc::new(KeywordEncoder::new(&["x"]));
        let settings = ExtractionSettings::default().with_filter_sentences(false);
        let ranked = engine(encoder, settings)
            .extract_keyphrases(&["ある。".to_string()])
            .await
            .unwrap();
        assert_eq!(ranked, vec![Vec::<Keyphrase>::new()]);
    }

    #[tokio::test]
    async fn test_sentence_without_candidates_does_not_stop_later_ones() {
        let encoder = Arc::new(KeywordEncoder::new(&["東京", "首都"]));
        let settings = ExtractionSettings {
            minimum_characters: 1,
            ..Default::default()
        };
        let ranked = engine(encoder, settings)
            .extract_keyphrases(&["ある。東京は首都である。".to_string()])
            .await
            .unwrap();

        assert_eq!(ranked.len(), 1);
        let phrases: Vec<&str> = ranked[0].iter().map(|k| k.phrase.as_str()).collect();
        assert!(phrases.contains(&"東京"));
        assert!(phrases.contains(&"首都"));
    }

    #[tokio::test]
    async fn test_no_chunks() {
        let encoder = Arc::new(KeywordEncoder::new(&["x"]));
        let ranked = engine(encoder, ExtractionSettings::default())
            .extract_keyphrases(&[])
            .await
            .unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_encoder_errors_propagate() {
        let result = engine(Arc::new(FailingEncoder), ExtractionSettings::default())
            .extract_keyphrases(&chunk())
            .await;
        assert!(matches!(result, Err(KpxError::Network { .. })));
    }

    #[tokio::test]
    async fn test_tokenizer_errors_propagate() {
        let engine = RankingEngine::new(
            EmbeddingSession::new(Arc::new(KeywordEncoder::new(&["x"]))),
            Arc::new(FailingTokenizer),
            Arc::new(StopWords::empty()),
            ExtractionSettings::default().validate().unwrap(),
        );
        let result = engine.extract_keyphrases(&chunk()).await;
        assert!(matches!(result, Err(KpxError::Tokenizer { .. })));
    }

    #[tokio::test]
    async fn test_zero_vectors_empty_the_unit_only() {
        struct ZeroEncoder;

        #[async_trait]
        impl Encoder for ZeroEncoder {
            fn model_name(&self) -> &str {
                "zero"
            }

            async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
                Ok(texts.iter().map(|_| vec![0.0, 0.0]).collect())
            }
        }

        let settings = ExtractionSettings {
            pos_filter: Some(vec![PosTag::Noun]),
            ..Default::default()
        };
        let ranked = engine(Arc::new(ZeroEncoder), settings)
            .extract_keyphrases(&chunk())
            .await
            .unwrap();
        assert_eq!(ranked, vec![Vec::<Keyphrase>::new()]);
    }
}
