/// 代理配置模块
///
/// 集中管理出站HTTP请求的代理设置
use serde::{Deserialize, Serialize};

/// 默认代理服务器地址
pub const PROXY_HOST: &str = "127.0.0.1";

/// 默认代理服务器端口
pub const PROXY_PORT: u16 = 1080;

/// 代理类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    /// HTTP代理
    Http,
    /// SOCKS5代理
    Socks5,
}

/// 默认使用的代理类型
pub const DEFAULT_PROXY_TYPE: ProxyType = ProxyType::Socks5;

/// 代理配置结构体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// 是否使用代理
    pub use_proxy: bool,
    /// 代理服务器地址
    pub host: String,
    /// 代理服务器端口
    pub port: u16,
    /// 代理类型
    pub proxy_type: ProxyType,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            use_proxy: false,
            host: PROXY_HOST.to_string(),
            port: PROXY_PORT,
            proxy_type: DEFAULT_PROXY_TYPE,
        }
    }
}

impl ProxyConfig {
    /// 获取完整的代理URL
    pub fn get_url(&self) -> String {
        match self.proxy_type {
            ProxyType::Http => format!("http://{}:{}", self.host, self.port),
            ProxyType::Socks5 => format!("socks5://{}:{}", self.host, self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_url() {
        let mut cfg = ProxyConfig::default();
        assert!(!cfg.use_proxy);
        assert_eq!(cfg.get_url(), "socks5://127.0.0.1:1080");

        cfg.proxy_type = ProxyType::Http;
        cfg.port = 7890;
        assert_eq!(cfg.get_url(), "http://127.0.0.1:7890");
    }
}
