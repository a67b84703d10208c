use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ping").route(web::get().to(handlers::ping)))
        .service(
            web::scope("/books")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::get_books))
                        .route(web::post().to(handlers::add_book))
                        .default_service(actix_web::web::to(handlers::method_not_allowed)),
                )
                .service(
                    web::resource("/{book_id}")
                        .route(web::get().to(handlers::get_book))
                        .route(web::put().to(handlers::replace_book))
                        .route(web::patch().to(handlers::patch_book))
                        .route(web::delete().to(handlers::delete_book))
                        .default_service(actix_web::web::to(handlers::method_not_allowed)),
                )
                .default_service(actix_web::web::to(handlers::unknown_route)),
        );
}

/// Json extractor config answering malformed bodies with the response envelope
pub fn json_config() -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default().error_handler(|err, _req| {
        let response = handlers::respond(
            StatusCode::BAD_REQUEST,
            format!("Malformed request body: {}", err),
        );
        InternalError::from_response(err, response).into()
    })
}
