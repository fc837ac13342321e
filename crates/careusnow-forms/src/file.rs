//! Single-file picker
//!
//! Uploads are held in memory. A [`FilePicker`] holds zero or one file and a
//! new selection always replaces the previous one.

use crate::value::FieldValue;
use bytes::Bytes;
use percent_encoding::percent_decode_str;

/// Default upload limit for intake documents (5 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FileUploadError {
	#[error("Upload error: {0}")]
	Upload(String),
	#[error("Path traversal attempt detected")]
	PathTraversal,
	#[error("File too large: {size} bytes (max {max} bytes)")]
	TooLarge { size: usize, max: usize },
	#[error("Unsupported file type: {0}")]
	UnsupportedType(String),
}

/// Reject file names that could escape a storage directory.
///
/// # Examples
///
/// ```
/// use careusnow_forms::file::validate_safe_filename;
///
/// assert!(validate_safe_filename("passport.png").is_ok());
/// assert!(validate_safe_filename("../etc/passwd").is_err());
/// assert!(validate_safe_filename("%2e%2e%2fsecret").is_err());
/// ```
pub fn validate_safe_filename(filename: &str) -> Result<(), FileUploadError> {
	if filename.is_empty() {
		return Err(FileUploadError::Upload("Empty filename".to_string()));
	}

	// Percent-encoded traversal such as %2e%2e%2f is checked in decoded form too
	let decoded = percent_decode_str(filename).decode_utf8_lossy();
	for candidate in [filename, decoded.as_ref()] {
		if candidate.contains('\0') || candidate.contains("..") {
			return Err(FileUploadError::PathTraversal);
		}
		if candidate.contains('/') || candidate.contains('\\') {
			return Err(FileUploadError::PathTraversal);
		}
		let bytes = candidate.as_bytes();
		if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
			return Err(FileUploadError::PathTraversal);
		}
	}
	Ok(())
}

/// File received from a multipart submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
	pub file_name: String,
	pub content_type: String,
	pub bytes: Bytes,
}

impl UploadedFile {
	pub fn new(
		file_name: impl Into<String>,
		content_type: impl Into<String>,
		bytes: impl Into<Bytes>,
	) -> Self {
		Self {
			file_name: file_name.into(),
			content_type: content_type.into(),
			bytes: bytes.into(),
		}
	}

	pub fn size(&self) -> usize {
		self.bytes.len()
	}

	/// Lower-cased extension of the file name, if any
	pub fn extension(&self) -> Option<String> {
		self.file_name
			.rsplit_once('.')
			.map(|(_, ext)| ext.to_ascii_lowercase())
			.filter(|ext| !ext.is_empty())
	}
}

/// Constraints applied to a file field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
	pub accepted_extensions: Vec<String>,
	pub max_size: usize,
	/// Hint shown inside the drop zone
	pub hint: String,
}

impl Default for FileConfig {
	fn default() -> Self {
		Self {
			accepted_extensions: Vec::new(),
			max_size: DEFAULT_MAX_FILE_SIZE,
			hint: String::new(),
		}
	}
}

impl FileConfig {
	/// Images accepted for identification documents
	pub fn images() -> Self {
		Self {
			accepted_extensions: ["svg", "png", "jpg", "jpeg", "gif"]
				.into_iter()
				.map(String::from)
				.collect(),
			max_size: DEFAULT_MAX_FILE_SIZE,
			hint: "SVG, PNG, JPG or GIF (max 800x400)".to_string(),
		}
	}

	pub fn with_max_size(mut self, max_size: usize) -> Self {
		self.max_size = max_size;
		self
	}

	/// Value for the HTML `accept` attribute
	pub fn accept_attr(&self) -> Option<String> {
		if self.accepted_extensions.is_empty() {
			return None;
		}
		Some(
			self.accepted_extensions
				.iter()
				.map(|ext| format!(".{}", ext))
				.collect::<Vec<_>>()
				.join(","),
		)
	}

	pub fn check(&self, file: &UploadedFile) -> Result<(), FileUploadError> {
		validate_safe_filename(&file.file_name)?;
		if file.size() > self.max_size {
			return Err(FileUploadError::TooLarge {
				size: file.size(),
				max: self.max_size,
			});
		}
		if !self.accepted_extensions.is_empty() {
			let ext = file.extension().unwrap_or_default();
			if !self.accepted_extensions.iter().any(|a| *a == ext) {
				return Err(FileUploadError::UnsupportedType(file.file_name.clone()));
			}
		}
		Ok(())
	}
}

/// Holds zero or one selected file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePicker {
	selected: Option<UploadedFile>,
}

impl FilePicker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Select a file, replacing any earlier selection
	///
	/// # Examples
	///
	/// ```
	/// use careusnow_forms::file::{FilePicker, UploadedFile};
	///
	/// let mut picker = FilePicker::new();
	/// picker.select(UploadedFile::new("old.png", "image/png", &b"1"[..]));
	/// picker.select(UploadedFile::new("new.png", "image/png", &b"2"[..]));
	/// assert_eq!(picker.selected().unwrap().file_name, "new.png");
	/// ```
	pub fn select(&mut self, file: UploadedFile) -> Option<UploadedFile> {
		self.selected.replace(file)
	}

	pub fn clear(&mut self) -> Option<UploadedFile> {
		self.selected.take()
	}

	pub fn selected(&self) -> Option<&UploadedFile> {
		self.selected.as_ref()
	}

	pub fn is_empty(&self) -> bool {
		self.selected.is_none()
	}

	/// Hand the selection to a form as a field value
	pub fn into_value(self) -> FieldValue {
		match self.selected {
			Some(file) => FieldValue::File(file),
			None => FieldValue::Empty,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn png(name: &str, len: usize) -> UploadedFile {
		UploadedFile::new(name, "image/png", vec![0u8; len])
	}

	#[rstest]
	fn test_select_replaces_previous_file() {
		// Arrange
		let mut picker = FilePicker::new();
		picker.select(png("first.png", 1));

		// Act
		let previous = picker.select(png("second.png", 2));

		// Assert
		assert_eq!(previous.map(|f| f.file_name), Some("first.png".to_string()));
		assert_eq!(picker.selected().map(|f| f.size()), Some(2));
	}

	#[rstest]
	fn test_empty_picker_yields_empty_value() {
		assert_eq!(FilePicker::new().into_value(), FieldValue::Empty);
	}

	#[rstest]
	fn test_clear_removes_selection() {
		let mut picker = FilePicker::new();
		picker.select(png("id.png", 3));

		picker.clear();

		assert!(picker.is_empty());
	}

	#[rstest]
	#[case("..\\windows")]
	#[case("C:secret.png")]
	#[case("a/b.png")]
	#[case("")]
	fn test_unsafe_filenames_rejected(#[case] name: &str) {
		assert!(validate_safe_filename(name).is_err());
	}

	#[rstest]
	fn test_config_rejects_oversized_file() {
		// Arrange
		let config = FileConfig::images().with_max_size(4);

		// Act
		let result = config.check(&png("id.png", 5));

		// Assert
		assert_eq!(result, Err(FileUploadError::TooLarge { size: 5, max: 4 }));
	}

	#[rstest]
	fn test_config_rejects_unlisted_extension() {
		let config = FileConfig::images();

		let result = config.check(&UploadedFile::new("id.pdf", "application/pdf", vec![1u8]));

		assert!(matches!(result, Err(FileUploadError::UnsupportedType(_))));
	}

	#[rstest]
	fn test_extension_is_case_insensitive() {
		let config = FileConfig::images();

		assert!(config.check(&png("SCAN.JPG", 10)).is_ok());
	}

	#[rstest]
	fn test_accept_attr_lists_extensions() {
		assert_eq!(
			FileConfig::images().accept_attr().as_deref(),
			Some(".svg,.png,.jpg,.jpeg,.gif")
		);
		assert_eq!(FileConfig::default().accept_attr(), None);
	}
}
