use axum::{
    body::Body,
    extract::{FromRequest, Multipart},
    http::Request,
};

const BOUNDARY: &str = "MAKEUP_BOUNDARY123456789";

/// Builds the `multipart/form-data` body that browsers send for the item form.
#[derive(Default)]
pub(crate) struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub(crate) fn file(mut self, name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                filename=\"photo\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub(crate) async fn build(mut self) -> Multipart {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }
}
