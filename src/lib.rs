//! # emx-formdata
//!
//! `multipart/form-data` body builder (RFC 7578 framing).
//!
//! Collects named fields and file attachments, then produces the exact body
//! bytes and `Content-Type` header value an HTTP client sends.
//!
//! ## Body Layout
//!
//! Fields come first, in insertion order, then files:
//!
//! ```text
//! --<boundary>\r\n
//! Content-Disposition: form-data; name="user"\r\n
//! \r\n
//! Bob\r\n
//! --<boundary>\r\n
//! Content-Disposition: form-data; name="avatar"; filename="me.png"\r\n
//! Content-Type: image/png\r\n
//! \r\n
//! <raw file bytes>\r\n
//! --<boundary>--
//! ```
//!
//! The body ends right after the closing `--<boundary>--`, with no trailing
//! CRLF. The header value is `multipart/form-data; boundary=<boundary>`.
//!
//! ## Text Encoding
//!
//! Every textual fragment goes through [`utf8`], which converts UTF-16 code
//! units to UTF-8. Unpaired surrogates are encoded as three-byte sequences
//! instead of being rejected, so the output matches encoders that operate on
//! UTF-16 strings.
//!
//! ## Boundaries
//!
//! Each encode draws a new boundary: a fixed prefix plus 17 random characters
//! from `0-9a-zA-Z`. Content is not scanned for the boundary unless
//! [`EncoderConfig::regenerate_on_collision`] is set.
//!
//! ## Example
//!
//! ```rust
//! use emx_formdata::FormData;
//!
//! let mut form = FormData::new();
//! form.append("name", "Bob");
//! form.append("age", 42);
//! form.append_file_bytes("avatar", b"\x89PNG".to_vec(), "me.png");
//!
//! let body = form.encode();
//! assert!(body.content_type().starts_with("multipart/form-data; boundary="));
//! assert!(body.buffer().ends_with(b"--"));
//! ```

pub mod boundary;
pub mod encoder;
pub mod form;
pub mod mime;
pub mod utf8;

pub use boundary::{Boundary, BoundaryError};
pub use encoder::{EncodedBody, Encoder, EncoderConfig};
pub use form::{AppendFileError, FieldValue, FileAttachment, FileSource, FormData, FsSource};
