use log::{debug, info, warn};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Request, Response};

/// Logs every response; the once-a-second clock poll only at debug level.
pub struct PageLogger;

#[rocket::async_trait]
impl Fairing for PageLogger {
    fn info(&self) -> Info {
        Info {
            name: "Page Logger",
            kind: Kind::Response
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let status = response.status();
        if request.uri().path() == "/time" {
            debug!("{} {}: {}", request.method(), request.uri(), status);
        } else {
            info!("{} {}: {}", request.method(), request.uri(), status);
        }

        if status.code >= 400 {
            warn!(
                "Non-success status: {} for {} {}",
                status,
                request.method(),
                request.uri(),
            );
        }
    }
}
