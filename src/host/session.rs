use log::debug;

use crate::protocol::{Request, Response};

use super::handlers;

/// Runs one request against the filesystem and builds its response.
pub async fn dispatch(request: Request) -> Response {
    debug!("dispatch {}", request.name());

    match request {
        Request::ListDirectory { path } => {
            Response::Entries(handlers::handle_list_directory(&path).await)
        }
        Request::ReadFile { path } => Response::Text(handlers::handle_read_file(&path).await),
        Request::WriteFile { path, text } => {
            Response::Outcome(handlers::handle_write_file(&path, &text).await)
        }
        Request::CreateFile { path } => {
            Response::Outcome(handlers::handle_create_file(&path).await)
        }
        Request::CreateDirectory { path } => {
            Response::Outcome(handlers::handle_create_directory(&path).await)
        }
    }
}
