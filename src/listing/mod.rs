//! Assembler Byte Listings
//!
//! Renders byte tables as ca65 source text and reads that text back.
//!
//! Format:
//! - Comments: `; text`
//! - Exports: `.export name,name`
//! - Labels: `name:`
//! - Data: a tab, `.byte`, then up to 12 `$hh` values separated by commas

pub mod reader;

pub use reader::{parse_listing, ListingImage, ListingLine};

/// Byte values per `.byte` line
pub const BYTES_PER_LINE: usize = 12;

/// Data directive
pub const BYTE_DIRECTIVE: &str = ".byte";

/// Symbol export directive
pub const EXPORT_DIRECTIVE: &str = ".export";

/// Format one byte as `$hh` with lowercase hex digits
#[inline]
pub fn format_byte(byte: u8) -> String {
    format!("${byte:02x}")
}

/// Render bytes as `.byte` lines, 12 values per line, each newline terminated
pub fn byte_lines(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(BYTES_PER_LINE)
        .map(|chunk| {
            let values: Vec<String> = chunk.iter().map(|&b| format_byte(b)).collect();
            format!("\t{} {}\n", BYTE_DIRECTIVE, values.join(","))
        })
        .collect()
}

/// Text builder for an assembler source file
#[derive(Debug, Clone, Default)]
pub struct AsmListing {
    text: String,
}

impl AsmListing {
    /// Create an empty listing
    pub fn new() -> Self {
        Self::default()
    }

    /// `; text`
    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.text.push_str("; ");
        self.text.push_str(text);
        self.text.push('\n');
        self
    }

    /// Empty line
    pub fn blank(&mut self) -> &mut Self {
        self.text.push('\n');
        self
    }

    /// `.export a,b,c`
    pub fn export<S: AsRef<str>>(&mut self, names: &[S]) -> &mut Self {
        let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        self.text.push_str(EXPORT_DIRECTIVE);
        self.text.push(' ');
        self.text.push_str(&names.join(","));
        self.text.push('\n');
        self
    }

    /// `name:`
    pub fn label(&mut self, name: &str) -> &mut Self {
        self.text.push_str(name);
        self.text.push_str(":\n");
        self
    }

    /// `.byte` lines for `bytes`
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for line in byte_lines(bytes) {
            self.text.push_str(&line);
        }
        self
    }

    /// Listing text so far
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the builder and return the text
    pub fn into_string(self) -> String {
        self.text
    }
}
