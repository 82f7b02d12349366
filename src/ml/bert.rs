//! BERT token classification backend
//!
//! Runs a BERT encoder with a linear token classification head (the layout of
//! HuggingFace `BertForTokenClassification` checkpoints such as `dslim/bert-base-NER`)
//! on candle, then merges BIO tags into entity spans. Each word is labelled by its
//! first sub-word token.

use crate::config::NerConfig;
use crate::error::{CharnetError, Result};
use crate::ml::backend::{EntityLabel, NerBackend, RecognizedEntity};
use crate::ml::device::resolve_device;
use crate::ml::models::ModelManager;
use crate::ml::text::{MIN_SEQUENCE_LENGTH, TextProcessor, TokenizedText};
use candle_core::{D, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fields of `config.json` needed for the classification head
#[derive(Debug, Deserialize)]
struct HeadConfig {
    hidden_size: usize,
    id2label: HashMap<String, String>,
}

/// Fields of `tokenizer_config.json`
#[derive(Debug, Default, Deserialize)]
struct TokenizerSettings {
    #[serde(default)]
    do_lower_case: bool,
}

/// Person/location/organization recognizer backed by a BERT checkpoint
pub struct BertNerBackend {
    model: BertModel,
    classifier: Linear,
    processor: TextProcessor,
    tags: Vec<String>,
    device: Device,
    name: String,
}

impl BertNerBackend {
    /// Load the model named in `config`, downloading it if no local directory is set.
    ///
    /// Any failure is reported as [`CharnetError::BackendInit`].
    pub fn load(config: &NerConfig) -> Result<Self> {
        Self::try_load(config).map_err(|e| match e {
            CharnetError::BackendInit(_) => e,
            other => CharnetError::BackendInit(other.to_string()),
        })
    }

    fn try_load(config: &NerConfig) -> Result<Self> {
        if config.max_length < MIN_SEQUENCE_LENGTH {
            return Err(CharnetError::BackendInit(format!(
                "max_length {} leaves no room for special tokens (minimum {})",
                config.max_length, MIN_SEQUENCE_LENGTH
            )));
        }

        let device = resolve_device(config.device)?;
        let model_dir = locate_model(config)?;

        let config_json = std::fs::read_to_string(model_dir.join("config.json"))?;
        let bert_config: BertConfig = serde_json::from_str(&config_json)?;
        let head: HeadConfig = serde_json::from_str(&config_json)?;
        let tags = ordered_tags(&head.id2label)?;

        let lowercase = read_tokenizer_settings(&model_dir).do_lower_case;
        let processor = TextProcessor::from_model_dir(&model_dir, config.max_length, lowercase)?;

        let weights = model_dir.join("model.safetensors");
        // Safety: the weights file is memory mapped read-only and must not change while loaded
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DTYPE, &device)? };
        let model = BertModel::load(vb.clone(), &bert_config)?;
        let classifier = candle_nn::linear(head.hidden_size, tags.len(), vb.pp("classifier"))?;

        log::info!(
            "Loaded NER model {} with {} tags ({} vocabulary entries)",
            config.model_name,
            tags.len(),
            processor.vocab_size()
        );

        Ok(Self {
            model,
            classifier,
            processor,
            tags,
            device,
            name: config.model_name.clone(),
        })
    }

    /// Per-token tag probabilities, shape `[tokens][tags]`
    fn predict(&self, tokenized: &TokenizedText) -> Result<Vec<Vec<f32>>> {
        let input_ids = Tensor::new(tokenized.input_ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let token_type_ids =
            Tensor::new(tokenized.token_type_ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(tokenized.attention_mask.as_slice(), &self.device)?.unsqueeze(0)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let logits = self.classifier.forward(&hidden)?.squeeze(0)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?;

        Ok(probs.to_vec2::<f32>()?)
    }
}

impl NerBackend for BertNerBackend {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        let text = self.processor.preprocess_text(text);
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let tokenized = self.processor.tokenize(&text)?;
        let probs = self.predict(&tokenized)?;
        Ok(decode_bio(&text, &tokenized, &probs, &self.tags))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn locate_model(config: &NerConfig) -> Result<PathBuf> {
    if let Some(dir) = &config.model_dir {
        if !crate::ml::models::validate_model_dir(dir) {
            return Err(CharnetError::BackendInit(format!(
                "{} does not contain config.json, model.safetensors and a tokenizer",
                dir.display()
            )));
        }
        return Ok(dir.clone());
    }

    let manager = ModelManager::new(config.cache_dir.clone())?;
    manager.fetch_model(&config.model_name)
}

fn read_tokenizer_settings(model_dir: &Path) -> TokenizerSettings {
    std::fs::read_to_string(model_dir.join("tokenizer_config.json"))
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

/// Turn the `id2label` map into a tag list indexed by class id
fn ordered_tags(id2label: &HashMap<String, String>) -> Result<Vec<String>> {
    let mut tags = vec![None; id2label.len()];
    for (id, tag) in id2label {
        let index: usize = id
            .parse()
            .map_err(|_| CharnetError::MachineLearning(format!("Invalid label id: {}", id)))?;
        let slot = tags.get_mut(index).ok_or_else(|| {
            CharnetError::MachineLearning(format!("Label ids are not contiguous: {}", id))
        })?;
        *slot = Some(tag.clone());
    }

    tags.into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| CharnetError::MachineLearning("Duplicate label ids".to_string()))
}

/// Span being accumulated while walking the tag sequence
struct OpenSpan {
    label: EntityLabel,
    start: usize,
    end: usize,
    word: u32,
    scores: Vec<f32>,
}

impl OpenSpan {
    fn close(self, text: &str) -> Option<RecognizedEntity> {
        let surface = text.get(self.start..self.end)?.trim();
        if surface.is_empty() {
            return None;
        }
        let confidence = self.scores.iter().sum::<f32>() / self.scores.len() as f32;
        Some(RecognizedEntity {
            text: surface.to_string(),
            label: self.label,
            start: self.start,
            end: self.end,
            confidence,
        })
    }
}

/// Merge per-token tag probabilities into entity spans.
///
/// A word takes the tag of its first sub-word; later sub-words only extend the
/// span's end offset. `I-X` continues an open span of the same label, while `B-X`,
/// a label change, or `O` closes it.
pub fn decode_bio(
    text: &str,
    tokenized: &TokenizedText,
    probs: &[Vec<f32>],
    tags: &[String],
) -> Vec<RecognizedEntity> {
    let mut entities = Vec::new();
    let mut open: Option<OpenSpan> = None;
    let mut previous_word: Option<u32> = None;

    let mut flush = |open: &mut Option<OpenSpan>| {
        if let Some(entity) = open.take().and_then(|span| span.close(text)) {
            entities.push(entity);
        }
    };

    for (index, row) in probs.iter().enumerate().take(tokenized.len()) {
        let Some(word) = tokenized.word_ids[index] else {
            flush(&mut open);
            previous_word = None;
            continue;
        };
        let (_, token_end) = tokenized.offsets[index];

        if previous_word == Some(word) {
            if let Some(span) = open.as_mut().filter(|span| span.word == word) {
                span.end = token_end;
            }
            continue;
        }
        previous_word = Some(word);

        let Some((best, score)) = row
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            continue;
        };

        let tag = tags.get(best).map(String::as_str).unwrap_or("O");
        if tag == "O" {
            flush(&mut open);
            continue;
        }

        let label = EntityLabel::from_tag(tag);
        let (token_start, _) = tokenized.offsets[index];

        match open.as_mut() {
            Some(span) if !tag.starts_with("B-") && span.label == label => {
                span.end = token_end;
                span.word = word;
                span.scores.push(score);
            }
            _ => {
                flush(&mut open);
                open = Some(OpenSpan {
                    label,
                    start: token_start,
                    end: token_end,
                    word,
                    scores: vec![score],
                });
            }
        }
    }
    flush(&mut open);

    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<String> {
        ["O", "B-PER", "I-PER", "B-LOC", "I-LOC"]
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    fn one_hot(tag: usize) -> Vec<f32> {
        let mut row = vec![0.0; 5];
        row[tag] = 0.9;
        row
    }

    /// Builds a tokenized view of whitespace words, splitting words listed in
    /// `split` into two sub-word tokens
    fn tokenize(text: &str, split: &[usize]) -> TokenizedText {
        let mut offsets = vec![(0, 0)];
        let mut word_ids = vec![None];
        let mut position = 0;
        for (word_index, word) in text.split(' ').enumerate() {
            let start = position;
            let end = start + word.len();
            if split.contains(&word_index) {
                let middle = start + word.len() / 2;
                offsets.push((start, middle));
                offsets.push((middle, end));
                word_ids.push(Some(word_index as u32));
                word_ids.push(Some(word_index as u32));
            } else {
                offsets.push((start, end));
                word_ids.push(Some(word_index as u32));
            }
            position = end + 1;
        }
        offsets.push((0, 0));
        word_ids.push(None);

        let len = offsets.len();
        TokenizedText {
            input_ids: vec![0; len],
            attention_mask: vec![1; len],
            token_type_ids: vec![0; len],
            offsets,
            word_ids,
        }
    }

    #[test]
    fn test_multi_word_person() {
        let text = "Uchiha Sasuke left Konoha";
        let tokenized = tokenize(text, &[]);
        // [CLS] Uchiha Sasuke left Konoha [SEP]
        let probs = vec![one_hot(0), one_hot(1), one_hot(2), one_hot(0), one_hot(3), one_hot(0)];

        let entities = decode_bio(text, &tokenized, &probs, &tags());
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "Uchiha Sasuke");
        assert_eq!(entities[0].label, EntityLabel::Person);
        assert_eq!(entities[1].text, "Konoha");
        assert_eq!(entities[1].label, EntityLabel::Location);
    }

    #[test]
    fn test_subwords_extend_span() {
        let text = "Kakashi waited";
        let tokenized = tokenize(text, &[0]);
        // [CLS] Kak ##ashi waited [SEP]; second sub-word tag is ignored
        let probs = vec![one_hot(0), one_hot(1), one_hot(3), one_hot(0), one_hot(0)];

        let entities = decode_bio(text, &tokenized, &probs, &tags());
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Kakashi");
        assert_eq!(entities[0].end, 7);
    }

    #[test]
    fn test_adjacent_begin_tags_split() {
        let text = "Naruto Sakura";
        let tokenized = tokenize(text, &[]);
        let probs = vec![one_hot(0), one_hot(1), one_hot(1), one_hot(0)];

        let entities = decode_bio(text, &tokenized, &probs, &tags());
        let names: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(names, vec!["Naruto", "Sakura"]);
    }

    #[test]
    fn test_confidence_is_mean_of_word_scores() {
        let text = "Might Guy";
        let tokenized = tokenize(text, &[]);
        let mut second = vec![0.0; 5];
        second[2] = 0.7;
        let probs = vec![one_hot(0), one_hot(1), second, one_hot(0)];

        let entities = decode_bio(text, &tokenized, &probs, &tags());
        assert_eq!(entities.len(), 1);
        assert!((entities[0].confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_ordered_tags() {
        let mut id2label = HashMap::new();
        id2label.insert("1".to_string(), "B-PER".to_string());
        id2label.insert("0".to_string(), "O".to_string());
        assert_eq!(ordered_tags(&id2label).unwrap(), vec!["O", "B-PER"]);

        id2label.insert("5".to_string(), "B-LOC".to_string());
        assert!(ordered_tags(&id2label).is_err());
    }

    #[test]
    fn test_missing_model_dir_is_init_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = NerConfig {
            model_dir: Some(temp_dir.path().to_path_buf()),
            ..NerConfig::default()
        };

        let result = BertNerBackend::load(&config);
        assert!(matches!(result, Err(CharnetError::BackendInit(_))));
    }

    #[test]
    fn test_tiny_max_length_is_init_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = NerConfig {
            model_dir: Some(temp_dir.path().to_path_buf()),
            max_length: 0,
            ..NerConfig::default()
        };

        match BertNerBackend::load(&config) {
            Err(CharnetError::BackendInit(message)) => assert!(message.contains("max_length")),
            Err(other) => panic!("expected init error, got {}", other),
            Ok(_) => panic!("expected init error"),
        }
    }
}
