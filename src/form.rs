//! Form data structures

use std::path::Path;
use std::sync::Arc;

use crate::encoder::{EncodedBody, Encoder};

/// The value of a scalar form field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text, sent as-is
    Text(String),
    /// Integer, sent in decimal
    Integer(i64),
    /// Float, sent in shortest round-trip form: plain decimal for
    /// magnitudes in `[1e-6, 1e21)`, exponent form (`1e+21`, `1.5e-7`)
    /// outside it
    Float(f64),
    /// Boolean, sent as `true` or `false`
    Boolean(bool),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(x) => f.write_str(&format_float(*x)),
            FieldValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Integral floats print without a fractional part (`3.0` -> `3`), and
/// non-finite values use the `NaN` / `Infinity` literals. Magnitudes of
/// `1e21` and above, or below `1e-6`, switch to exponent form with an
/// explicitly signed exponent.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x == f64::INFINITY {
        "Infinity".to_string()
    } else if x == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if x == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else if x.abs() >= 1e21 || x.abs() < 1e-6 {
        let sci = format!("{:e}", x);
        match sci.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => sci,
        }
    } else {
        format!("{}", x)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(f64::from(value))
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_int {
    ($($t:ty),*) => {
        $(
            /// Values outside the `i64` range are kept as their decimal text,
            /// so the field is sent with the same digits either way.
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    match i64::try_from(value) {
                        Ok(n) => FieldValue::Integer(n),
                        Err(_) => FieldValue::Text(value.to_string()),
                    }
                }
            }
        )*
    };
}

impl_from_wide_int!(u64, usize, isize);

/// A file registered for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    /// Form field name
    pub name: String,
    /// File contents, shared rather than copied
    pub data: Arc<[u8]>,
    /// File name for the disposition header and MIME lookup
    pub file_name: String,
}

impl FileAttachment {
    /// Create an attachment from an in-memory buffer
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>, file_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            file_name: file_name.into(),
        }
    }

    /// MIME type resolved from the file name
    pub fn mime_type(&self) -> &'static str {
        crate::mime::mime_for_file_name(&self.file_name)
    }
}

/// Source of file bytes for [`FormData::append_file`]
pub trait FileSource {
    /// Read the whole file at `path`
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Reads files from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

impl<F> FileSource for F
where
    F: Fn(&Path) -> std::io::Result<Vec<u8>>,
{
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self(path)
    }
}

/// Error type for file registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendFileError {
    /// The file source could not produce the file's bytes
    Read { path: String, message: String },
}

impl std::fmt::Display for AppendFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppendFileError::Read { path, message } => {
                write!(f, "Failed to read file '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for AppendFileError {}

/// Accumulates fields and files for one multipart body
#[derive(Debug, Clone)]
pub struct FormData<S = FsSource> {
    fields: Vec<(String, FieldValue)>,
    files: Vec<FileAttachment>,
    source: S,
}

impl Default for FormData<FsSource> {
    fn default() -> Self {
        Self::with_source(FsSource)
    }
}

impl FormData<FsSource> {
    /// Create an empty form that reads files from the local filesystem
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> FormData<S> {
    /// Create an empty form that reads files through `source`
    pub fn with_source(source: S) -> Self {
        Self {
            fields: Vec::new(),
            files: Vec::new(),
            source,
        }
    }

    /// Set a field. Re-using a name replaces the earlier value in its
    /// original position. Always returns `true`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> bool {
        let name = name.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
        true
    }

    /// Register an in-memory buffer as a file
    pub fn append_file_bytes(&mut self, name: impl Into<String>, data: impl Into<Arc<[u8]>>, file_name: impl Into<String>) {
        self.files.push(FileAttachment::new(name, data, file_name));
    }

    /// Fields in insertion order
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Look up a field value by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Files in insertion order
    pub fn files(&self) -> &[FileAttachment] {
        &self.files
    }

    /// Number of parts the encoded body will contain
    pub fn len(&self) -> usize {
        self.fields.len() + self.files.len()
    }

    /// Whether there are no fields and no files
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    /// Encode with a default [`Encoder`] and a fresh random boundary
    pub fn encode(&self) -> EncodedBody {
        Encoder::new().encode(self)
    }

    /// Alias for [`encode`](Self::encode)
    pub fn get_data(&self) -> EncodedBody {
        self.encode()
    }
}

impl<S: FileSource> FormData<S> {
    /// Register a file read from `path`.
    ///
    /// Returns `false` and leaves the form unchanged when the file cannot be
    /// read. Without `file_name`, the text after the last `/` of the path is
    /// used.
    pub fn append_file(&mut self, name: impl Into<String>, path: impl AsRef<Path>, file_name: Option<&str>) -> bool {
        match self.try_append_file(name, path, file_name) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("{}", err);
                false
            }
        }
    }

    /// Like [`append_file`](Self::append_file), but reports why registration failed
    pub fn try_append_file(
        &mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
        file_name: Option<&str>,
    ) -> Result<(), AppendFileError> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy();

        let data = self.source.read(path).map_err(|e| AppendFileError::Read {
            path: path_str.to_string(),
            message: e.to_string(),
        })?;

        let file_name = file_name
            .map(str::to_string)
            .unwrap_or_else(|| file_name_from_path(&path_str).to_string());

        tracing::debug!(path = %path_str, file_name = %file_name, bytes = data.len(), "registered file");

        self.files.push(FileAttachment::new(name, data, file_name));
        Ok(())
    }
}

/// Text after the last `/`, or the whole path when there is none
pub fn file_name_from_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_field_value_formatting() {
        assert_eq!(FieldValue::from("Bob").to_string(), "Bob");
        assert_eq!(FieldValue::from(42).to_string(), "42");
        assert_eq!(FieldValue::from(-7i64).to_string(), "-7");
        assert_eq!(FieldValue::from(true).to_string(), "true");
        assert_eq!(FieldValue::from(false).to_string(), "false");
        assert_eq!(FieldValue::from(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::from(3.0).to_string(), "3");
        assert_eq!(FieldValue::from(-0.0).to_string(), "0");
        assert_eq!(FieldValue::from(0.1).to_string(), "0.1");
    }

    #[test]
    fn test_field_value_exponent_form() {
        assert_eq!(FieldValue::from(1e21).to_string(), "1e+21");
        assert_eq!(FieldValue::from(-1.5e22).to_string(), "-1.5e+22");
        assert_eq!(FieldValue::from(1e-7).to_string(), "1e-7");
        assert_eq!(FieldValue::from(2.5e-8).to_string(), "2.5e-8");
        assert_eq!(FieldValue::from(1e20).to_string(), "100000000000000000000");
        assert_eq!(FieldValue::from(0.000001).to_string(), "0.000001");
    }

    #[test]
    fn test_field_value_wide_integers() {
        assert_eq!(FieldValue::from(3usize), FieldValue::Integer(3));
        assert_eq!(FieldValue::from(-4isize), FieldValue::Integer(-4));
        assert_eq!(FieldValue::from(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(FieldValue::from(u64::MAX), FieldValue::Text(u64::MAX.to_string()));

        let items = vec!["a", "b"];
        let mut form = FormData::new();
        form.append("count", items.len());
        assert_eq!(form.field("count"), Some(&FieldValue::Integer(2)));
    }

    #[test]
    fn test_field_value_non_finite() {
        assert_eq!(FieldValue::from(f64::NAN).to_string(), "NaN");
        assert_eq!(FieldValue::from(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(FieldValue::from(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut form = FormData::new();
        assert!(form.append("b", 1));
        assert!(form.append("a", 2));
        let names: Vec<&str> = form.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_append_overwrites_in_place() {
        let mut form = FormData::new();
        form.append("first", "1");
        form.append("second", "2");
        form.append("first", "updated");

        assert_eq!(form.fields().len(), 2);
        assert_eq!(form.fields()[0].0, "first");
        assert_eq!(form.field("first"), Some(&FieldValue::from("updated")));
    }

    #[test]
    fn test_append_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::File::create(&path).unwrap().write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let mut form = FormData::new();
        assert!(form.append_file("avatar", &path, None));

        let file = &form.files()[0];
        assert_eq!(file.name, "avatar");
        assert_eq!(file.file_name, "photo.png");
        assert_eq!(&*file.data, &[0x89, b'P', b'N', b'G']);
        assert_eq!(file.mime_type(), "image/png");
    }

    #[test]
    fn test_append_file_with_explicit_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmp123");
        std::fs::write(&path, b"data").unwrap();

        let mut form = FormData::new();
        assert!(form.append_file("doc", &path, Some("report.pdf")));
        assert_eq!(form.files()[0].file_name, "report.pdf");
    }

    #[test]
    fn test_append_missing_file_fails_without_change() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let mut form = FormData::new();
        form.append("kept", "yes");
        assert!(!form.append_file("upload", &missing, None));
        assert_eq!(form.files().len(), 0);
        assert_eq!(form.len(), 1);

        let err = form.try_append_file("upload", &missing, None).unwrap_err();
        assert!(matches!(err, AppendFileError::Read { .. }));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_custom_source() {
        let source = |path: &Path| -> std::io::Result<Vec<u8>> {
            if path == Path::new("virtual/a.txt") {
                Ok(b"virtual".to_vec())
            } else {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
            }
        };

        let mut form = FormData::with_source(source);
        assert!(form.append_file("f", "virtual/a.txt", None));
        assert!(!form.append_file("f", "virtual/b.txt", None));
        assert_eq!(form.files().len(), 1);
        assert_eq!(form.files()[0].file_name, "a.txt");
    }

    #[test]
    fn test_empty_file_is_accepted() {
        let source = |_: &Path| -> std::io::Result<Vec<u8>> { Ok(Vec::new()) };
        let mut form = FormData::with_source(source);
        assert!(form.append_file("empty", "empty.bin", None));
        assert!(form.files()[0].data.is_empty());
    }

    #[test]
    fn test_duplicate_file_names_allowed() {
        let mut form = FormData::new();
        form.append_file_bytes("files", b"one".to_vec(), "same.txt");
        form.append_file_bytes("files", b"two".to_vec(), "same.txt");
        assert_eq!(form.files().len(), 2);
        assert_eq!(form.len(), 2);
        assert!(!form.is_empty());
    }

    #[test]
    fn test_file_name_from_path() {
        assert_eq!(file_name_from_path("/tmp/dir/file.txt"), "file.txt");
        assert_eq!(file_name_from_path("file.txt"), "file.txt");
        assert_eq!(file_name_from_path("dir/"), "");
    }
}
