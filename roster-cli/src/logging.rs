use std::io::IsTerminal;
use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Local;
use colored::{Color, Colorize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn status_color(status: StatusCode) -> Color {
    if status.is_success() {
        Color::BrightGreen
    } else if status.is_redirection() {
        Color::BrightYellow
    } else {
        Color::BrightRed
    }
}

/// Colours log fragments only when stderr is a terminal.
#[derive(Clone, Copy)]
struct Painter {
    enabled: bool,
}

impl Painter {
    fn for_stderr() -> Self {
        Self {
            enabled: std::io::stderr().is_terminal(),
        }
    }

    fn paint(self, text: &str, color: Color) -> String {
        if self.enabled {
            text.color(color).to_string()
        } else {
            text.to_owned()
        }
    }

    fn dim(self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_owned()
        }
    }
}

/// Request logging for the upload server.
///
/// - `verbose == 0`: silent
/// - `verbose == 1`: one line per request (method, path, status, duration)
/// - `verbose >= 2`: also the request content type and size, and the JSON
///   response body. Upload bodies are binary and are never printed.
#[derive(Clone)]
pub struct LoggingMiddleware {
    pub verbose: u8,
}

impl LoggingMiddleware {
    #[must_use]
    pub fn new(verbose: u8) -> Self {
        Self { verbose }
    }

    #[allow(clippy::print_stderr)]
    pub async fn handle(&self, request: Request, next: Next) -> Response {
        if self.verbose == 0 {
            return next.run(request).await;
        }

        let painter = Painter::for_stderr();
        let method = request.method().clone();
        let path = request.uri().path().to_owned();
        let start = Instant::now();

        if self.verbose >= 2 {
            let header = |name| {
                request
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-")
                    .to_owned()
            };
            let detail = format!(
                "content-type={} content-length={}",
                header(CONTENT_TYPE),
                header(CONTENT_LENGTH)
            );
            eprintln!(
                "{} - DEBUG - {} {}",
                timestamp(),
                painter.dim("Request:"),
                painter.paint(&detail, Color::BrightBlack)
            );
        }

        let response = next.run(request).await;
        let status = response.status();
        let duration = format!("{:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

        // eprintln! rather than tracing, which escapes ANSI codes
        eprintln!(
            "{} - INFO - {} {} -> {} in {}",
            timestamp(),
            painter.paint(method.as_str(), Color::BrightCyan),
            painter.paint(&path, Color::BrightBlue),
            painter.paint(status.as_str(), status_color(status)),
            painter.paint(&duration, Color::BrightMagenta)
        );

        if self.verbose < 2 {
            return response;
        }

        let (parts, body) = response.into_parts();
        let Ok(bytes) = axum::body::to_bytes(body, usize::MAX).await else {
            return Response::from_parts(parts, Body::empty());
        };
        if let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            let pretty = serde_json::to_string_pretty(&json).unwrap_or_default();
            eprintln!(
                "{} - DEBUG - {}\n{}",
                timestamp(),
                painter.dim("Response body:"),
                painter.paint(&pretty, Color::BrightBlack)
            );
        }
        Response::from_parts(parts, Body::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors_follow_class() {
        assert_eq!(status_color(StatusCode::OK), Color::BrightGreen);
        assert_eq!(status_color(StatusCode::NO_CONTENT), Color::BrightGreen);
        assert_eq!(status_color(StatusCode::FOUND), Color::BrightYellow);
        assert_eq!(status_color(StatusCode::UNSUPPORTED_MEDIA_TYPE), Color::BrightRed);
        assert_eq!(status_color(StatusCode::INTERNAL_SERVER_ERROR), Color::BrightRed);
    }

    #[test]
    fn test_disabled_painter_leaves_text_plain() {
        let painter = Painter { enabled: false };
        assert_eq!(painter.paint("GET", Color::BrightCyan), "GET");
        assert_eq!(painter.dim("Request:"), "Request:");
    }
}
