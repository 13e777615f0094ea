use std::{
    env,
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use serde::Serialize;

#[cfg(feature = "tch-backend")]
use tch::Device;

const DEFAULT_PORT: u16 = 8000;

/// Which flavour of the generation endpoint to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceVariant {
    /// Empty-prompt check only, requested length passed through as-is.
    Basic,
    /// Length bounds, token accounting and sampling.
    Hardened,
}

impl ServiceVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceVariant::Basic => "basic",
            ServiceVariant::Hardened => "hardened",
        }
    }
}

impl fmt::Display for ServiceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceVariant {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "basic" => Ok(ServiceVariant::Basic),
            "hardened" => Ok(ServiceVariant::Hardened),
            other => anyhow::bail!("unknown service variant '{other}', expected basic or hardened"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub model_id: String,
    pub variant: ServiceVariant,
    pub tokenizer_path: Option<PathBuf>,
    pub module_path: PathBuf,
    pub max_prompt_length: usize,
    pub max_prompt_tokens: usize,
    pub min_max_length: i64,
    pub max_output_length: i64,
    pub default_max_length: i64,
    pub temperature: f64,
    pub generation_timeout: Duration,
    #[cfg(feature = "tch-backend")]
    pub device: Device,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            model_id: "gpt2".to_string(),
            variant: ServiceVariant::Hardened,
            tokenizer_path: None,
            module_path: PathBuf::from("models/gpt2.ts"),
            max_prompt_length: 1000,
            max_prompt_tokens: 1000,
            min_max_length: 10,
            max_output_length: 500,
            default_max_length: 200,
            temperature: 0.7,
            generation_timeout: Duration::from_secs(120),
            #[cfg(feature = "tch-backend")]
            device: Device::Cpu,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let listen_addr = env::var("SERVER_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.listen_addr);

        let model_id = env::var("MODEL_ID").unwrap_or(defaults.model_id);
        let variant = match env::var("SERVICE_VARIANT") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.variant,
        };

        let tokenizer_path = env::var("TOKENIZER_PATH").ok().map(PathBuf::from);
        let module_path = env::var("MODEL_MODULE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.module_path);

        let generation_timeout = parse_var::<u64>("GENERATION_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.generation_timeout);

        #[cfg(feature = "tch-backend")]
        let device = {
            let raw = env::var("DEVICE").unwrap_or_else(|_| "cpu".into());
            parse_device(&raw)
        };

        Ok(Self {
            listen_addr,
            model_id,
            variant,
            tokenizer_path,
            module_path,
            max_prompt_length: parse_var("MAX_PROMPT_LENGTH").unwrap_or(defaults.max_prompt_length),
            max_prompt_tokens: parse_var("MAX_PROMPT_TOKENS").unwrap_or(defaults.max_prompt_tokens),
            min_max_length: parse_var("MIN_MAX_LENGTH").unwrap_or(defaults.min_max_length),
            max_output_length: parse_var("MAX_OUTPUT_LENGTH").unwrap_or(defaults.max_output_length),
            default_max_length: parse_var("DEFAULT_MAX_LENGTH")
                .unwrap_or(defaults.default_max_length),
            temperature: parse_var("TEMPERATURE").unwrap_or(defaults.temperature),
            generation_timeout,
            #[cfg(feature = "tch-backend")]
            device,
        })
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(feature = "tch-backend")]
fn parse_device(raw: &str) -> Device {
    let lower = raw.to_lowercase();
    if lower == "cpu" {
        Device::Cpu
    } else if lower.starts_with("cuda") {
        let idx = lower
            .split(':')
            .nth(1)
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(0);
        if tch::Cuda::is_available() {
            Device::Cuda(idx)
        } else {
            Device::Cpu
        }
    } else {
        Device::Cpu
    }
}
