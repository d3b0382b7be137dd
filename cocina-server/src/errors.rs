use axum::{
    http,
    response::{Html, IntoResponse, Response},
};
pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Internal Server Error: {0}")]
    Internal(#[from] anyhow::Error),
    #[error("Templating error: {0:#}")]
    Template(#[from] minijinja::Error),
    /// Unknown pages, unplanned recipes, and recipes the CMS did not return.
    #[error("Not found")]
    NotFound,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            WebError::Internal(_) | WebError::Template(_) => {
                tracing::error!(error = %message, "Failed to render page");
                (http::StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
            WebError::NotFound => (
                http::StatusCode::NOT_FOUND,
                Html(include_str!("../templates/404.html")),
            )
                .into_response(),
        }
    }
}
