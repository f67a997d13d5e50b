// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 以字符串形式解析链接
///
/// 基础URL或链接无法解析时原样返回链接，javascript:/mailto: 等伪链接同样原样返回
pub fn absolutize(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return href.to_string();
    }
    Url::parse(base)
        .and_then(|base_url| resolve_url(&base_url, href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// 校验URL是否为可抓取的 http/https 地址
pub fn parse_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("{raw}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("{raw}: unsupported scheme {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_protocol_relative_url() {
        let base = Url::parse("https://example.com/a/b").unwrap();
        assert_eq!(resolve_url(&base, "//t.co/c").unwrap().as_str(), "https://t.co/c");
    }

    #[test]
    fn test_absolutize_relative_board_link() {
        assert_eq!(
            absolutize("https://www.example.ac.kr/board/list.do", "view.do?rNo=12"),
            "https://www.example.ac.kr/board/view.do?rNo=12"
        );
    }

    #[test]
    fn test_absolutize_keeps_pseudo_links() {
        assert_eq!(absolutize("https://a.com/", "javascript:void(0)"), "javascript:void(0)");
        assert_eq!(absolutize("not a url", "/x"), "/x");
    }

    #[test]
    fn test_parse_http_url_rejects_other_schemes() {
        assert!(parse_http_url("https://example.com").is_ok());
        assert!(parse_http_url("ftp://example.com").is_err());
        assert!(parse_http_url("::").is_err());
    }
}
