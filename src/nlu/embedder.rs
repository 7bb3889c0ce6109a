//! # Embedder MiniLM — Gerador de Representações Vetoriais
//!
//! O [`Embedder`] encapsula o modelo **all-MiniLM-L6-v2**
//! (`sentence-transformers/all-MiniLM-L6-v2`), um BERT pequeno treinado
//! para similaridade de sentenças em inglês.
//!
//! ## Pipeline de Embedding
//!
//! ```text
//! Texto → Tokenizer → Token IDs → BERT Forward Pass → Mean Pooling → L2 Normalize
//!                                                            ↓
//!                                                   Vec<f32> (384-dim)
//! ```
//!
//! ## O trait [`Encoder`]
//!
//! O resto do crate só conhece o trait: o catálogo é embeddado no startup
//! com [`Encoder::encode_batch()`] e cada mensagem com [`Encoder::encode()`].
//! Os testes usam um encoder determinístico sem modelo.
//!
//! ## Carregamento do Modelo
//!
//! Baixado do HuggingFace Hub na primeira execução (~90 MB) e cacheado em
//! `~/.cache/huggingface/`.
//!
//! | Componente | Preferido | Fallback |
//! |-----------|-----------|----------|
//! | Tokenizer | `tokenizer.json` | `vocab.txt` (WordPiece, lowercase) |
//! | Pesos | `model.safetensors` | `pytorch_model.bin` |
//! | Device | CPU | — |

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert;
use hf_hub::api::sync::{Api, ApiRepo};
use tokenizers::{Tokenizer, TruncationParams};

use crate::error::BotError;

/// Modelo padrão de sentence embeddings.
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Limite de tokens por texto (o MiniLM foi treinado com 256).
const MAX_TOKENS: usize = 256;

/// Codifica texto em vetores de dimensão fixa.
///
/// Deve ser determinístico: o mesmo texto sempre gera o mesmo vetor.
pub trait Encoder: Send + Sync {
    /// Um vetor por texto, na mesma ordem da entrada.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BotError>;

    fn encode(&self, text: &str) -> Result<Vec<f32>, BotError> {
        self.encode_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| BotError::Encoding("encoder returned no vector".into()))
    }
}

/// Embedder MiniLM via Candle.
///
/// | Operação | Tempo típico (CPU) |
/// |----------|--------------------|
/// | `encode()` (1 texto) | ~5ms |
/// | `embed_batch()` (50 textos) | ~60ms |
pub struct Embedder {
    model: bert::BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

/// Ids, tipos e máscara de um batch, já paddeados para `[batch, seq]`.
struct BatchTensors {
    input_ids: Tensor,
    token_type_ids: Tensor,
    attention_mask: Tensor,
}

impl Embedder {
    /// Carrega `repo_id` do HuggingFace Hub.
    ///
    /// Faz I/O pesado (download + mmap dos pesos); chamado dentro de
    /// `spawn_blocking` no `main.rs`.
    ///
    /// # Erros
    ///
    /// Retorna erro se o Hub estiver inacessível ou os arquivos corrompidos.
    pub fn load(repo_id: &str) -> Result<Self> {
        let device = Device::Cpu;

        tracing::info!(model = repo_id, "Fetching embedding model from HuggingFace Hub");
        let repo = Api::new()
            .context("Failed to create HF Hub API")?
            .model(repo_id.to_string());

        let tokenizer = load_tokenizer(&repo)?;

        let config_path = repo
            .get("config.json")
            .context("Failed to download config.json")?;
        let config: bert::Config = serde_json::from_str(&std::fs::read_to_string(&config_path)?)
            .context("Failed to parse model config")?;

        let weights = load_weights(&repo, &device)?;
        let model = bert::BertModel::load(weights, &config).context("Failed to load BERT model")?;

        tracing::info!(model = repo_id, device = ?device, "Embedding model ready");
        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    /// Embeddings de vários textos em uma única forward pass.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let batch = self.tokenize(texts)?;
        let pooled = self.forward_pooled(&batch)?;
        Ok(pooled.to_vec2()?)
    }

    /// Tokeniza e monta os tensores do batch.
    ///
    /// Textos mais curtos recebem padding com id 0 e máscara 0 até o maior
    /// do batch, então o padding não entra no pooling.
    fn tokenize(&self, texts: &[String]) -> Result<BatchTensors> {
        let encodings = texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(t.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenizer error: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = encodings.len();
        let width = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut ids = Vec::with_capacity(rows * width);
        let mut mask = Vec::with_capacity(rows * width);
        for encoding in &encodings {
            let pad = width - encoding.get_ids().len();
            ids.extend_from_slice(encoding.get_ids());
            ids.extend(std::iter::repeat(0u32).take(pad));
            mask.extend_from_slice(encoding.get_attention_mask());
            mask.extend(std::iter::repeat(0u32).take(pad));
        }

        let shape = (rows, width);
        Ok(BatchTensors {
            input_ids: Tensor::from_vec(ids, shape, &self.device)?,
            token_type_ids: Tensor::zeros(shape, DType::U32, &self.device)?,
            attention_mask: Tensor::from_vec(mask, shape, &self.device)?,
        })
    }

    /// Forward pass + mean pooling + L2 normalize → tensor `[batch, hidden]`.
    fn forward_pooled(&self, batch: &BatchTensors) -> Result<Tensor> {
        let hidden = self.model.forward(
            &batch.input_ids,
            &batch.token_type_ids,
            Some(&batch.attention_mask),
        )?;

        // ─── Mean Pooling ─────────────────────────────────────────
        let mask = batch
            .attention_mask
            .unsqueeze(2)?
            .to_dtype(DType::F32)?
            .broadcast_as(hidden.shape())?;
        let token_count = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
        let mean = ((hidden * mask)?.sum(1)? / token_count)?;

        // ─── L2 Normalize ─────────────────────────────────────────
        let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?;
        Ok(mean.broadcast_div(&norm)?)
    }
}

/// `tokenizer.json` quando o repositório tem, senão WordPiece do `vocab.txt`.
///
/// Sem padding automático (feito em [`Embedder::tokenize`]) e truncado em
/// [`MAX_TOKENS`].
fn load_tokenizer(repo: &ApiRepo) -> Result<Tokenizer> {
    let mut tokenizer = match repo.get("tokenizer.json") {
        Ok(path) => Tokenizer::from_file(&path).map_err(|e| anyhow::anyhow!("{}", e))?,
        Err(_) => {
            tracing::info!("tokenizer.json not available, building WordPiece from vocab.txt");
            let vocab = repo
                .get("vocab.txt")
                .context("Failed to download vocab.txt")?;
            wordpiece_tokenizer(vocab.to_str().context("Invalid vocab.txt path encoding")?)?
        }
    };

    tokenizer.with_padding(None);
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_TOKENS,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(tokenizer)
}

/// Tokenizer BERT uncased (`lowercase = true`) montado à mão.
fn wordpiece_tokenizer(vocab_path: &str) -> Result<Tokenizer> {
    use tokenizers::models::wordpiece::WordPiece;
    use tokenizers::normalizers::BertNormalizer;
    use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
    use tokenizers::processors::bert::BertProcessing;

    let wordpiece = WordPiece::from_file(vocab_path)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let mut tokenizer = Tokenizer::new(wordpiece);
    tokenizer.with_normalizer(Some(BertNormalizer::new(true, true, None, true)));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
    tokenizer.with_post_processor(Some(BertProcessing::new(
        ("[SEP]".to_string(), 102),
        ("[CLS]".to_string(), 101),
    )));
    Ok(tokenizer)
}

/// Pesos em safetensors (mmap) com fallback para `pytorch_model.bin`.
fn load_weights(repo: &ApiRepo, device: &Device) -> Result<VarBuilder<'static>> {
    if let Ok(path) = repo.get("model.safetensors") {
        // SAFETY: o arquivo fica no cache do Hub e não é alterado enquanto mapeado
        return unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device) }
            .context("Failed to load safetensors weights");
    }

    tracing::info!("model.safetensors not available, falling back to pytorch_model.bin");
    let path = repo
        .get("pytorch_model.bin")
        .context("Failed to download pytorch_model.bin")?;
    VarBuilder::from_pth(&path, DType::F32, device).context("Failed to load pytorch weights")
}

impl Encoder for Embedder {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BotError> {
        self.embed_batch(texts)
            .map_err(|e| BotError::Encoding(format!("{:#}", e)))
    }
}
