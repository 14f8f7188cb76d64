use std::fmt;

use serde::{Deserialize, Serialize};

/// 示例配置里留下的占位密钥
const PLACEHOLDER_MARKER: &str = "your_qwen_api_key";

/// 调用方随请求提供的模型密钥，按次传递，不在服务端保存
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub gemini_key: Option<String>,
    #[serde(default)]
    pub qwen_key: Option<String>,
    #[serde(default)]
    pub hf_key: Option<String>,
}

impl Credentials {
    /// 去掉空白和占位密钥；调用方未给 Qwen 密钥时使用服务端默认值
    pub fn normalized(self, default_qwen_key: Option<&str>) -> Self {
        let qwen_key = usable(self.qwen_key).or_else(|| usable(default_qwen_key.map(str::to_string)));
        Self {
            gemini_key: usable(self.gemini_key),
            qwen_key,
            hf_key: usable(self.hf_key),
        }
    }
}

fn usable(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && !k.contains(PLACEHOLDER_MARKER))
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |key: &Option<String>| if key.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("gemini_key", &mask(&self.gemini_key))
            .field("qwen_key", &mask(&self.qwen_key))
            .field("hf_key", &mask(&self.hf_key))
            .finish()
    }
}
