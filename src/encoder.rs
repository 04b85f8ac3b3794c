//! multipart/form-data encoder

use anyhow::{Context, Result};
use rand::Rng;

use crate::boundary::Boundary;
use crate::form::{FieldValue, FileAttachment, FormData};
use crate::utf8::str_to_utf8;

const CRLF: &str = "\r\n";

/// Configuration for boundary handling
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Scan field values and file contents for the boundary delimiter and
    /// pick a new boundary while it occurs. Off by default, so a body that
    /// happens to contain its own delimiter is sent as-is.
    pub regenerate_on_collision: bool,
    /// Boundaries generated in total before settling for a colliding one.
    /// Values below 1 behave as 1.
    pub max_attempts: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            regenerate_on_collision: false,
            max_attempts: 8,
        }
    }
}

/// An encoded request body and its `Content-Type` header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    content_type: String,
    buffer: Vec<u8>,
    boundary: Boundary,
}

impl EncodedBody {
    fn new(boundary: Boundary, buffer: Vec<u8>) -> Self {
        Self {
            content_type: content_type_for(&boundary),
            buffer,
            boundary,
        }
    }

    /// The `Content-Type` header value
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The body bytes
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Take ownership of the body bytes
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }

    /// The boundary this body was framed with
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Write the body to a writer
    pub fn write_to<W: std::io::Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.buffer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the body to a file
    pub fn write_to_file(&self, path: &std::path::Path) -> Result<()> {
        std::fs::write(path, &self.buffer)
            .with_context(|| format!("Failed to write body to {}", path.display()))?;
        Ok(())
    }
}

/// `multipart/form-data; boundary=<boundary>`
pub fn content_type_for(boundary: &Boundary) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

/// Encodes form data into a multipart/form-data body
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with custom boundary handling
    pub fn with_config(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Encode a form with a freshly generated boundary
    pub fn encode<S>(&self, form: &FormData<S>) -> EncodedBody {
        let boundary = self.choose_boundary_with(&mut rand::thread_rng(), form.fields(), form.files());
        let buffer = self.encode_with_boundary(&boundary, form.fields(), form.files());

        tracing::debug!(
            boundary = %boundary,
            fields = form.fields().len(),
            files = form.files().len(),
            bytes = buffer.len(),
            "encoded multipart body"
        );

        EncodedBody::new(boundary, buffer)
    }

    /// Encode a form with a caller-supplied boundary.
    ///
    /// The boundary is used as given, even if collision checks are enabled.
    pub fn encode_form_with_boundary<S>(&self, form: &FormData<S>, boundary: Boundary) -> EncodedBody {
        let buffer = self.encode_with_boundary(&boundary, form.fields(), form.files());
        EncodedBody::new(boundary, buffer)
    }

    /// Frame fields, then files, then the closing delimiter
    pub fn encode_with_boundary(
        &self,
        boundary: &Boundary,
        fields: &[(String, FieldValue)],
        files: &[FileAttachment],
    ) -> Vec<u8> {
        let delimiter = boundary.delimiter();
        let mut output = Vec::with_capacity(estimate_len(&delimiter, fields, files));

        for (name, value) in fields {
            self.encode_field(&mut output, &delimiter, name, value);
        }

        for file in files {
            self.encode_file(&mut output, &delimiter, file);
        }

        output.extend(str_to_utf8(&boundary.close_delimiter()));
        output
    }

    /// Encode a single field part
    fn encode_field(&self, output: &mut Vec<u8>, delimiter: &str, name: &str, value: &FieldValue) {
        let mut head = String::new();
        head.push_str(delimiter);
        head.push_str(CRLF);
        head.push_str("Content-Disposition: form-data; name=\"");
        head.push_str(name);
        head.push('"');
        head.push_str(CRLF);
        head.push_str(CRLF);
        head.push_str(&value.to_string());

        output.extend(str_to_utf8(&head));
        output.extend(str_to_utf8(CRLF));
    }

    /// Encode a single file part; the file bytes are copied verbatim
    fn encode_file(&self, output: &mut Vec<u8>, delimiter: &str, file: &FileAttachment) {
        let mut head = String::new();
        head.push_str(delimiter);
        head.push_str(CRLF);
        head.push_str("Content-Disposition: form-data; name=\"");
        head.push_str(&file.name);
        head.push_str("\"; filename=\"");
        head.push_str(&file.file_name);
        head.push('"');
        head.push_str(CRLF);
        head.push_str("Content-Type: ");
        head.push_str(file.mime_type());
        head.push_str(CRLF);
        head.push_str(CRLF);

        output.extend(str_to_utf8(&head));
        output.extend_from_slice(&file.data);
        output.extend(str_to_utf8(CRLF));
    }

    fn choose_boundary_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        fields: &[(String, FieldValue)],
        files: &[FileAttachment],
    ) -> Boundary {
        let mut boundary = Boundary::generate_with(rng);
        if !self.config.regenerate_on_collision {
            return boundary;
        }

        let attempts = self.config.max_attempts.max(1);
        for attempt in 1..attempts {
            if !collides(&boundary, fields, files) {
                return boundary;
            }
            tracing::debug!(attempt, boundary = %boundary, "boundary collides with content");
            boundary = Boundary::generate_with(rng);
        }

        if collides(&boundary, fields, files) {
            tracing::warn!(attempts, "no collision-free boundary found, using {}", boundary);
        }
        boundary
    }
}

fn collides(boundary: &Boundary, fields: &[(String, FieldValue)], files: &[FileAttachment]) -> bool {
    fields.iter().any(|(name, value)| {
        boundary.occurs_in(name.as_bytes()) || boundary.occurs_in(value.to_string().as_bytes())
    }) || files.iter().any(|file| {
        boundary.occurs_in(&file.data)
            || boundary.occurs_in(file.name.as_bytes())
            || boundary.occurs_in(file.file_name.as_bytes())
    })
}

/// Rough capacity hint: file payloads plus a fixed allowance per part
fn estimate_len(delimiter: &str, fields: &[(String, FieldValue)], files: &[FileAttachment]) -> usize {
    let per_part = delimiter.len() + 128;
    let payload: usize = files.iter().map(|f| f.data.len()).sum();
    per_part * (fields.len() + files.len() + 1) + payload
}
