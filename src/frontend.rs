use actix_web::{web, HttpResponse};
use rust_embed::RustEmbed;

/// Report form and listing UI, compiled into the binary.
#[derive(RustEmbed)]
#[folder = "frontend/"]
struct Assets;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/assets/{file:.*}", web::get().to(asset));
}

fn content_type(path: &str) -> mime::Mime {
    match path.rsplit('.').next() {
        Some("html") => mime::TEXT_HTML_UTF_8,
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("svg") => mime::IMAGE_SVG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

fn serve(path: &str) -> HttpResponse {
    match Assets::get(path) {
        Some(file) => HttpResponse::Ok()
            .content_type(content_type(path))
            .body(file.data.into_owned()),
        None => HttpResponse::NotFound().finish(),
    }
}

async fn index() -> HttpResponse {
    serve("index.html")
}

async fn asset(path: web::Path<String>) -> HttpResponse {
    serve(&path.into_inner())
}
