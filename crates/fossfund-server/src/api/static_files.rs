//! Static file handler for `/static`
//!
//! In production the reverse proxy serves these files itself; the handler
//! keeps the application usable on its own, with the same gzip behaviour.

use std::path::{Component, Path, PathBuf};

use actix_web::{HttpRequest, HttpResponse, get, http::header, web};
use futures::{Stream, StreamExt, stream};
use tokio::{fs::File, io::AsyncReadExt};

use crate::{error::AppError, model::AppState};

const GZIP: &str = "gzip";
const OCTET_STREAM: &str = "application/octet-stream";

/// Bytes inspected when sniffing a file without a known extension
const SNIFF_LEN: usize = 512;

/// Bytes read per chunk of a streamed file
const CHUNK_SIZE: usize = 64 * 1024;

/// Resolve a request path below the static directory
///
/// Returns `None` for anything that could escape it.
pub fn safe_path(raw: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();

    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

/// Content type by file extension
pub fn content_type_by_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    Some(match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "pdf" => "application/pdf",
        _ => return None,
    })
}

/// Content type by magic bytes, for logos stored without an extension
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    let head = &data[..data.len().min(SNIFF_LEN)];

    if head.starts_with(b"\x89PNG\r\n\x1a\n") {
        return "image/png";
    }
    if head.starts_with(&[0xff, 0xd8, 0xff]) {
        return "image/jpeg";
    }
    if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        return "image/webp";
    }

    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg")) {
        return "image/svg+xml";
    }

    OCTET_STREAM
}

fn accepts_gzip(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            v.split(',')
                .any(|enc| enc.split(';').next().unwrap_or_default().trim() == GZIP)
        })
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn next_chunk(mut file: File) -> std::io::Result<Option<(web::Bytes, File)>> {
    let mut chunk = vec![0; CHUNK_SIZE];
    let n = file.read(&mut chunk).await?;
    if n == 0 {
        return Ok(None);
    }
    chunk.truncate(n);
    Ok(Some((web::Bytes::from(chunk), file)))
}

/// Stream a file's contents after its already read `head`
fn file_stream(head: Vec<u8>, file: File) -> impl Stream<Item = std::io::Result<web::Bytes>> {
    stream::once(async move { Ok::<_, std::io::Error>(web::Bytes::from(head)) })
        .chain(stream::try_unfold(file, next_chunk))
}

fn gzip_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

#[get("/static/{path:.*}")]
async fn serve(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let Some(relative) = safe_path(&path) else {
        return Ok(HttpResponse::NotFound().finish());
    };
    let file = data.logo_store.static_dir().join(relative);
    let gz = gzip_path(&file);
    let has_gz = is_file(&gz).await;

    let (source, encoded) = if has_gz && accepts_gzip(&req) {
        (&gz, true)
    } else if is_file(&file).await {
        (&file, false)
    } else {
        return Ok(HttpResponse::NotFound().finish());
    };

    let mut body = File::open(source).await.map_err(anyhow::Error::from)?;
    let len = body.metadata().await.map_err(anyhow::Error::from)?.len();
    let mut head = Vec::with_capacity(SNIFF_LEN);
    (&mut body)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await
        .map_err(anyhow::Error::from)?;

    let content_type = match content_type_by_extension(&file) {
        Some(content_type) => content_type,
        None if encoded => OCTET_STREAM,
        None => sniff_content_type(&head),
    };

    let mut response = HttpResponse::Ok();
    response.insert_header((header::CONTENT_TYPE, content_type));
    if has_gz {
        response.insert_header((header::VARY, "Accept-Encoding"));
    }
    if encoded {
        response.insert_header((header::CONTENT_ENCODING, GZIP));
    }

    Ok(response.no_chunking(len).streaming(file_stream(head, body)))
}
