//! CORS - the endpoint is called from browsers on any origin.

use actix_cors::Cors;
use actix_web::http::header;

/// Any origin may POST a `Content-Type`d form. Preflight requests are
/// answered here and never reach the handlers.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(["POST"])
        .allowed_header(header::CONTENT_TYPE)
}
