use std::net::SocketAddr;
use std::time::Duration;

use actix_web::http::header::ContentType;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::page::StatusPage;

type SharedHtml = web::Data<RwLock<String>>;

/// Serve the last rendered page over HTTP, re-rendering it in the
/// background every `interval`.
pub async fn run(
    page: StatusPage,
    initial_html: String,
    addr: SocketAddr,
    interval: Duration,
) -> Result<(), AppError> {
    let html: SharedHtml = web::Data::new(RwLock::new(initial_html));

    let refresher = tokio::spawn(refresh_loop(page, html.clone(), interval));

    let served = html.clone();
    let result = HttpServer::new(move || App::new().app_data(served.clone()).configure(routes))
        .bind(addr)?
        .run()
        .await;

    refresher.abort();
    Ok(result?)
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(status_route);
}

/// Status page route, always serving the last successful rendering.
#[get("/")]
async fn status_route(html: SharedHtml) -> impl Responder {
    HttpResponse::Ok().content_type(ContentType::html()).body(html.read().await.clone())
}

async fn refresh_loop(mut page: StatusPage, html: SharedHtml, interval: Duration) {
    let mut timer = tokio::time::interval(interval);
    // the first tick completes immediately and the caller already rendered
    timer.tick().await;

    loop {
        timer.tick().await;
        match page.render().await {
            Ok(rendered) => *html.write().await = rendered,
            // keep serving the previous page when a refresh fails
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "failed to render the status page");
            }
        }
    }
}
