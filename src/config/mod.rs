use std::env;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_QWEN_ENDPOINT: &str =
    "https://dashscope-intl.aliyuncs.com/compatible-mode/v1/chat/completions";
pub const DEFAULT_QWEN_MODEL: &str = "qwen-max";
pub const DEFAULT_SAUL_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/Equall/Saul-7B-Instruct-v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    /// 未配置时使用进程内的用量账本
    pub redis_url: Option<String>,
    /// 服务端免费额度使用的 Gemini 密钥
    pub gemini_api_key: Option<String>,
    pub gemini_endpoint: String,
    pub gemini_model: String,
    pub qwen_endpoint: String,
    pub qwen_model: String,
    /// 直连路径下调用方未提供 Qwen 密钥时的默认值
    pub qwen_api_key: Option<String>,
    pub saul_endpoint: String,
    pub free_request_limit: u32,
    pub usage_window_ms: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            api_base_uri: "/api".to_string(),
            redis_url: None,
            gemini_api_key: None,
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            qwen_endpoint: DEFAULT_QWEN_ENDPOINT.to_string(),
            qwen_model: DEFAULT_QWEN_MODEL.to_string(),
            qwen_api_key: None,
            saul_endpoint: DEFAULT_SAUL_ENDPOINT.to_string(),
            free_request_limit: 5,
            usage_window_ms: 120_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构建配置，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        Config {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: get("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            api_base_uri: get("API_BASE_URI").unwrap_or(defaults.api_base_uri),
            redis_url: get("REDIS_URL"),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_endpoint: get("GEMINI_ENDPOINT").unwrap_or(defaults.gemini_endpoint),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            qwen_endpoint: get("QWEN_API_ENDPOINT").unwrap_or(defaults.qwen_endpoint),
            qwen_model: get("QWEN_MODEL").unwrap_or(defaults.qwen_model),
            qwen_api_key: get("QWEN_API_KEY"),
            saul_endpoint: get("SAUL_API_ENDPOINT").unwrap_or(defaults.saul_endpoint),
            free_request_limit: get("FREE_REQUEST_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.free_request_limit),
            usage_window_ms: get("USAGE_WINDOW_MS")
                .and_then(|v| v.parse().ok())
                .filter(|ms: &i64| *ms > 0)
                .unwrap_or(defaults.usage_window_ms),
        }
    }
}
