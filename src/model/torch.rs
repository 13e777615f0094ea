use std::{path::Path, sync::Arc};

use anyhow::{anyhow, bail};
use parking_lot::Mutex;
use tch::{Device, IValue, Kind, Tensor, no_grad};
use tokenizers::Tokenizer;
use tracing::info;

use crate::{
    error::ServiceError,
    model::{GeneratedSequence, GenerationOptions, TextGenerator},
};

const END_OF_TEXT: i64 = 50256;

/// Traced causal LM driven one token at a time.
pub struct TorchGenerator {
    device: Device,
    module: Mutex<tch::CModule>,
    tokenizer: Arc<Tokenizer>,
}

impl TorchGenerator {
    pub fn load(
        module_path: &Path,
        device: Device,
        tokenizer: Arc<Tokenizer>,
    ) -> Result<Self, ServiceError> {
        if !module_path.exists() {
            return Err(ServiceError::Internal(format!(
                "model artifact missing: {}",
                module_path.display()
            )));
        }
        let mut module = tch::CModule::load_on_device(module_path, device)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        module.set_eval();
        info!(path = %module_path.display(), ?device, "loaded TorchScript module");

        Ok(Self {
            device,
            module: Mutex::new(module),
            tokenizer,
        })
    }

    fn next_token(
        &self,
        module: &tch::CModule,
        input_ids: &[i64],
        options: &GenerationOptions,
    ) -> anyhow::Result<i64> {
        let input = Tensor::from_slice(input_ids)
            .reshape([1, input_ids.len() as i64])
            .to(self.device);

        // Traced GPT-2 returns either the logits or (logits, past).
        let logits = match module.forward_is(&[IValue::Tensor(input)])? {
            IValue::Tensor(t) => t,
            IValue::Tuple(ref items) if !items.is_empty() => match &items[0] {
                IValue::Tensor(t) => t.shallow_clone(),
                _ => bail!("expected tensor as first tuple element"),
            },
            _ => bail!("unexpected model output format"),
        };

        // [1, seq_len, vocab] -> [vocab]
        let last = logits.select(1, -1).squeeze();

        let next = match options.temperature {
            Some(temperature) if options.do_sample && temperature > 0.0 => {
                let probs = (last / temperature).softmax(-1, Kind::Float);
                probs.multinomial(1, false).int64_value(&[0])
            }
            _ => last.argmax(0, false).int64_value(&[]),
        };
        Ok(next)
    }

    fn generate_one(
        &self,
        prompt_ids: &[i64],
        options: &GenerationOptions,
    ) -> anyhow::Result<String> {
        let mut input_ids = prompt_ids.to_vec();

        no_grad(|| {
            let module = self.module.lock();
            while (input_ids.len() as i64) < options.max_length {
                let next = self.next_token(&module, &input_ids, options)?;
                input_ids.push(next);
                if next == END_OF_TEXT {
                    break;
                }
            }
            Ok::<(), anyhow::Error>(())
        })?;

        let ids: Vec<u32> = input_ids.iter().map(|&id| id as u32).collect();
        self.tokenizer
            .decode(&ids, true)
            .map_err(|e| anyhow!("detokenization failed: {e}"))
    }
}

impl TextGenerator for TorchGenerator {
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> anyhow::Result<Vec<GeneratedSequence>> {
        let encoding = self
            .tokenizer
            .encode(prompt, false)
            .map_err(|e| anyhow!("tokenization failed: {e}"))?;
        let mut prompt_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        if prompt_ids.is_empty() {
            prompt_ids.push(0);
        }

        (0..options.num_return_sequences.max(1))
            .map(|_| {
                self.generate_one(&prompt_ids, options)
                    .map(|generated_text| GeneratedSequence::Record { generated_text })
            })
            .collect()
    }
}
