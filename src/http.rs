//! 共通HTTPヘルパー

use crate::error::{Result, SrcpmError};
use crate::host::MatchGroups;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// リクエストヘッダー（名前, 値）
pub type Header = (&'static str, String);

/// URLテンプレートの `{name}` を置換する
///
/// 置換値の非ASCIIバイトはパーセントエンコードする。未知の名前はそのまま残す。
pub fn expand(template: &str, groups: &MatchGroups, extra: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        let value = extra
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| *v)
            .or_else(|| groups.get(name));

        match value {
            Some(v) => out.push_str(&encode_non_ascii(v)),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn encode_non_ascii(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii() {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn with_headers(mut req: RequestBuilder, headers: &[Header]) -> RequestBuilder {
    for (name, value) in headers {
        req = req.header(*name, value);
    }
    req
}

/// 非2xxレスポンスを `HostApi` エラーに変換
async fn check_status(response: Response, host: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Err(SrcpmError::HostApi {
        host: host.to_string(),
        status,
        message,
    })
}

/// JSONを取得してデシリアライズ
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: &[Header],
    host: &str,
) -> Result<T> {
    tracing::debug!(url, "GET json");
    let req = with_headers(client.get(url), headers);
    let response = check_status(req.send().await?, host).await?;
    Ok(response.json().await?)
}

/// JSONを取得し、指定レスポンスヘッダーの値も返す
///
/// ページングAPI（`X-Next-Page` など）で使う。空のヘッダーは `None`。
pub async fn get_json_with_header<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: &[Header],
    host: &str,
    header: &str,
) -> Result<(T, Option<String>)> {
    tracing::debug!(url, "GET json page");
    let req = with_headers(client.get(url), headers);
    let response = check_status(req.send().await?, host).await?;
    let value = response
        .headers()
        .get(header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    Ok((response.json().await?, value))
}

/// プログレスバー付きダウンロード
pub async fn download_with_progress(
    client: &Client,
    url: &str,
    headers: &[Header],
    host: &str,
) -> Result<Vec<u8>> {
    tracing::debug!(url, "GET archive");
    let req = with_headers(client.get(url), headers);
    let mut response = check_status(req.send().await?, host).await?;

    let total_size = response.content_length().unwrap_or(0);

    let pb = if total_size > 0 {
        let pb = ProgressBar::new(total_size);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} Downloading...")
        {
            pb.set_style(style);
        }
        pb
    };

    let mut bytes = Vec::with_capacity((total_size as usize).min(64 << 20));
    while let Some(chunk) = response.chunk().await? {
        pb.inc(chunk.len() as u64);
        bytes.extend_from_slice(&chunk);
    }
    pb.finish_and_clear();

    Ok(bytes)
}
