//! Text preprocessing and tokenization for NER models
//!
//! This module normalizes sentences and turns them into WordPiece token ids with
//! byte offsets, so token-level predictions can be mapped back onto the text.

use crate::error::{CharnetError, Result};
use serde_json::json;
use std::path::Path;
use tokenizers::Tokenizer;
use unicode_normalization::UnicodeNormalization;

/// Tokenized text ready for model inference
#[derive(Debug, Clone)]
pub struct TokenizedText {
    /// Token IDs
    pub input_ids: Vec<u32>,
    /// Attention mask (1 for real tokens)
    pub attention_mask: Vec<u32>,
    /// Token type IDs (for BERT-style models)
    pub token_type_ids: Vec<u32>,
    /// Byte offsets of each token in the normalized text; (0, 0) for special tokens
    pub offsets: Vec<(usize, usize)>,
    /// Index of the word each token belongs to; `None` for special tokens
    pub word_ids: Vec<Option<u32>>,
}

impl TokenizedText {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Shortest sequence that still fits `[CLS]`, one word and `[SEP]`
pub const MIN_SEQUENCE_LENGTH: usize = 3;

/// Text preprocessor and tokenizer
pub struct TextProcessor {
    tokenizer: Tokenizer,
    max_length: usize,
}

impl TextProcessor {
    /// Load the tokenizer from a model directory.
    ///
    /// Uses `tokenizer.json` when present, otherwise builds a BERT WordPiece
    /// tokenizer from `vocab.txt`.
    pub fn from_model_dir<P: AsRef<Path>>(model_dir: P, max_length: usize, lowercase: bool) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let tokenizer_path = model_dir.join("tokenizer.json");
        let vocab_path = model_dir.join("vocab.txt");

        let tokenizer = if tokenizer_path.exists() {
            Tokenizer::from_file(&tokenizer_path).map_err(|e| {
                CharnetError::MachineLearning(format!("Failed to load tokenizer: {}", e))
            })?
        } else if vocab_path.exists() {
            let vocab = std::fs::read_to_string(&vocab_path)?;
            wordpiece_tokenizer(&vocab, lowercase)?
        } else {
            return Err(CharnetError::MachineLearning(format!(
                "No tokenizer.json or vocab.txt in {}",
                model_dir.display()
            )));
        };

        log::info!("Loaded tokenizer from {:?}", model_dir);
        Ok(Self::new(tokenizer, max_length))
    }

    /// Create a processor around an already constructed tokenizer.
    ///
    /// `max_length` is raised to [`MIN_SEQUENCE_LENGTH`] if smaller.
    pub fn new(tokenizer: Tokenizer, max_length: usize) -> Self {
        if max_length < MIN_SEQUENCE_LENGTH {
            log::warn!(
                "max_length {} is too small, using {}",
                max_length,
                MIN_SEQUENCE_LENGTH
            );
        }
        Self {
            tokenizer,
            max_length: max_length.max(MIN_SEQUENCE_LENGTH),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Preprocess text: unicode NFC and single spaces
    pub fn preprocess_text(&self, text: &str) -> String {
        normalize_text(text)
    }

    /// Tokenize already preprocessed text, truncating to `max_length` tokens
    pub fn tokenize(&self, text: &str) -> Result<TokenizedText> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| CharnetError::MachineLearning(format!("Tokenization failed: {}", e)))?;

        let mut tokenized = TokenizedText {
            input_ids: encoding.get_ids().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
            token_type_ids: encoding.get_type_ids().to_vec(),
            offsets: encoding.get_offsets().to_vec(),
            word_ids: encoding.get_word_ids().to_vec(),
        };

        self.truncate(&mut tokenized);
        Ok(tokenized)
    }

    /// Keep the first `max_length - 1` tokens plus the closing special token
    fn truncate(&self, tokenized: &mut TokenizedText) {
        let max_len = self.max_length;
        if tokenized.len() <= max_len {
            return;
        }

        log::debug!("Truncating {} tokens to {}", tokenized.len(), max_len);

        fn keep_ends<T: Clone>(values: &mut Vec<T>, max_len: usize) {
            if let Some(last) = values.last().cloned() {
                values.truncate(max_len - 1);
                values.push(last);
            }
        }

        keep_ends(&mut tokenized.input_ids, max_len);
        keep_ends(&mut tokenized.attention_mask, max_len);
        keep_ends(&mut tokenized.token_type_ids, max_len);
        keep_ends(&mut tokenized.offsets, max_len);
        keep_ends(&mut tokenized.word_ids, max_len);
    }

    /// Get tokenizer vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }
}

/// Unicode NFC normalization with whitespace runs collapsed to single spaces
pub fn normalize_text(text: &str) -> String {
    text.nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Build a BERT WordPiece tokenizer from the lines of a `vocab.txt` file
fn wordpiece_tokenizer(vocab: &str, lowercase: bool) -> Result<Tokenizer> {
    let vocab_map: serde_json::Map<String, serde_json::Value> = vocab
        .lines()
        .enumerate()
        .map(|(id, token)| (token.to_string(), json!(id)))
        .collect();

    let token_id = |token: &str| {
        vocab_map
            .get(token)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| CharnetError::MachineLearning(format!("vocab.txt has no {}", token)))
    };
    let cls_id = token_id("[CLS]")?;
    let sep_id = token_id("[SEP]")?;

    let definition = json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": lowercase
        },
        "pre_tokenizer": { "type": "BertPreTokenizer" },
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", sep_id],
            "cls": ["[CLS]", cls_id]
        },
        "decoder": { "type": "WordPiece", "prefix": "##", "cleanup": true },
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": vocab_map
        }
    });

    let bytes = serde_json::to_vec(&definition)?;
    Tokenizer::from_bytes(bytes).map_err(|e| {
        CharnetError::MachineLearning(format!("Failed to build WordPiece tokenizer: {}", e))
    })
}
