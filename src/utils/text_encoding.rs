// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, EUC_KR, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

/// 文档头部 meta 中声明的字符集
static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-zA-Z0-9_\-]+)"#).unwrap()
});

/// 仅在文档开头查找 meta 声明
const META_SCAN_LIMIT: usize = 4096;

/// 将响应字节解码为字符串
///
/// 优先级：Content-Type 中的 charset → 文档 meta charset → 合法 UTF-8 → chardetng 检测。
/// 检测结果偏向 EUC-KR（韩文站点常见编码）。
///
/// # 参数
///
/// * `bytes` - 响应体原始字节
/// * `content_type` - 响应头 Content-Type（可选）
///
/// # 返回值
///
/// 解码后的字符串，非法字节被替换为 U+FFFD
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type.and_then(charset_from_content_type) {
        debug!(encoding = encoding.name(), "Decoding with Content-Type charset");
        return decode_with(encoding, bytes);
    }

    if let Some(encoding) = charset_from_meta(bytes) {
        debug!(encoding = encoding.name(), "Decoding with meta charset");
        return decode_with(encoding, bytes);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guessed = detector.guess(Some(b"kr"), true);
    debug!(encoding = guessed.name(), "Decoding with detected charset");
    decode_with(guessed, bytes)
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| lookup(value.trim().trim_matches('"')))
}

fn charset_from_meta(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SCAN_LIMIT)];
    let caps = META_CHARSET.captures(head)?;
    let label = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?;
    lookup(label)
}

fn lookup(label: &str) -> Option<&'static Encoding> {
    // ks_c_5601-1987 是 EUC-KR 的常见别名
    if label.eq_ignore_ascii_case("ks_c_5601-1987") {
        return Some(EUC_KR);
    }
    let encoding = Encoding::for_label(label.as_bytes())?;
    // UTF-16 声明在 HTML 字节流中几乎总是错误的
    if encoding.output_encoding() == UTF_8 {
        Some(UTF_8)
    } else {
        Some(encoding)
    }
}
