use crate::error::FetchError;

/// True for sources that have to go over the network.
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Resolves `uri` relative to the location of `src` (for external glTF buffers).
pub fn resolve_relative(src: &str, uri: &str) -> String {
    if is_remote(uri) || uri.starts_with('/') {
        return uri.to_string();
    }
    match src.rfind('/') {
        Some(idx) => format!("{}/{}", &src[..idx], uri),
        None => uri.to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(src: &str) -> Result<reqwest::Url, FetchError> {
    let invalid = || FetchError::InvalidUrl(src.to_string());
    let window = web_sys::window().ok_or_else(invalid)?;
    let href = window.location().href().map_err(|_| invalid())?;
    let base = reqwest::Url::parse(&href).map_err(|_| invalid())?;
    base.join(src).map_err(|_| invalid())
}

pub async fn load_binary(src: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(src)?;
        reqwest::get(url).await?.error_for_status()?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = if is_remote(src) {
        reqwest::get(src).await?.error_for_status()?.bytes().await?.to_vec()
    } else {
        tokio::fs::read(src).await?
    };

    Ok(data)
}

/// Declared size of the asset at `src` in bytes, without downloading it.
///
/// URLs are asked with a `HEAD` request and answer with their
/// `Content-Length`; local files report their metadata length.
pub async fn fetch_file_size(src: &str) -> Result<u64, FetchError> {
    #[cfg(target_arch = "wasm32")]
    let size = head_content_length(format_url(src)?).await;
    #[cfg(not(target_arch = "wasm32"))]
    let size = if is_remote(src) {
        let url = reqwest::Url::parse(src).map_err(|_| FetchError::InvalidUrl(src.to_string()))?;
        head_content_length(url).await
    } else {
        Ok(tokio::fs::metadata(src).await?.len())
    };

    size
}

async fn head_content_length(url: reqwest::Url) -> Result<u64, FetchError> {
    let response = reqwest::Client::new().head(url).send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }
    let header = response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .map(|value| value.to_str().unwrap_or_default().to_string());
    parse_content_length(header.as_deref())
}

/// Reads a `Content-Length` header value.
pub fn parse_content_length(header: Option<&str>) -> Result<u64, FetchError> {
    let header = header.ok_or(FetchError::MissingContentLength)?;
    header
        .trim()
        .parse::<u64>()
        .map_err(|_| FetchError::InvalidContentLength(header.to_string()))
}
