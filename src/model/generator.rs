use tokenizers::Tokenizer;

use crate::model::{GeneratedSequence, GenerationOptions};

/// A loaded text-generation model. Calls block for the duration of inference
/// and may be issued from several threads at once.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> anyhow::Result<Vec<GeneratedSequence>>;
}

/// Turns text into token ids. Only the length of the result is used.
pub trait TokenCounter: Send + Sync {
    fn token_ids(&self, text: &str) -> anyhow::Result<Vec<u32>>;

    fn count_tokens(&self, text: &str) -> anyhow::Result<usize> {
        self.token_ids(text).map(|ids| ids.len())
    }
}

impl TokenCounter for Tokenizer {
    fn token_ids(&self, text: &str) -> anyhow::Result<Vec<u32>> {
        let encoding = self
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;
        Ok(encoding.get_ids().to_vec())
    }
}
