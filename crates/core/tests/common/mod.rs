//! Common test helpers for extraction integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use kpx_core::{Encoder, KpxError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of buckets characters are folded into
pub const DIMENSION: usize = 64;

/// Deterministic embedding: a bag of characters folded into buckets
pub fn char_bag(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; DIMENSION];
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        vector[(c as usize) % DIMENSION] += 1.0;
    }
    vector
}

/// Encoder embedding every text with [`char_bag`] and counting requests
#[derive(Default)]
pub struct CharBagEncoder {
    calls: AtomicUsize,
    texts: AtomicUsize,
}

impl CharBagEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `encode` calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of texts embedded
    pub fn texts(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Encoder for CharBagEncoder {
    fn model_name(&self) -> &str {
        "char-bag"
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| char_bag(t)).collect())
    }
}

/// Encoder that always fails like an unreachable server
pub struct UnreachableEncoder;

#[async_trait]
impl Encoder for UnreachableEncoder {
    fn model_name(&self) -> &str {
        "unreachable"
    }

    async fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(KpxError::network("connection refused"))
    }
}

/// Sample document used across tests
pub const CAPITAL_TEXT: &str = "東京は日本の首都である。経済の中心でもある。";

/// Longer sample made of several paragraphs
pub const TRAVEL_TEXT: &str = "京都は歴史のある古都である。多くの寺院が観光客を集める。\n\
大阪は商業の中心である。食文化が豊かで屋台も多い。\n\
北海道は自然が豊かである。冬は雪まつりが開かれる。";
