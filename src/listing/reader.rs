//! Listing Reader
//!
//! Parses the subset of ca65 syntax produced by [`super::AsmListing`] and
//! lays the data out as the assembler would, so rendered tables can be read
//! back by label.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1, take_while_m_n},
    character::complete::{char, space0, space1},
    combinator::{all_consuming, map, map_res, rest},
    multi::separated_list1,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use super::{BYTE_DIRECTIVE, EXPORT_DIRECTIVE};
use crate::{LutError, Result};

/// One non-blank listing line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingLine {
    /// Comment text without the leading `;`
    Comment(String),
    /// Exported symbol names
    Export(Vec<String>),
    /// Label definition
    Label(String),
    /// Data bytes
    Bytes(Vec<u8>),
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn list_separator(input: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0)(input)
}

fn hex_byte(input: &str) -> IResult<&str, u8> {
    preceded(
        char('$'),
        map_res(
            take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
            |digits: &str| u8::from_str_radix(digits, 16),
        ),
    )(input)
}

fn comment_line(input: &str) -> IResult<&str, &str> {
    preceded(tuple((space0, char(';'))), rest)(input)
}

fn export_line(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        tuple((space0, tag(EXPORT_DIRECTIVE), space1)),
        separated_list1(list_separator, identifier),
    )(input)
}

fn byte_line(input: &str) -> IResult<&str, Vec<u8>> {
    preceded(
        tuple((space1, tag(BYTE_DIRECTIVE), space1)),
        separated_list1(list_separator, hex_byte),
    )(input)
}

fn label_line(input: &str) -> IResult<&str, &str> {
    terminated(identifier, char(':'))(input)
}

fn line(input: &str) -> IResult<&str, ListingLine> {
    terminated(
        alt((
            map(comment_line, |text: &str| {
                ListingLine::Comment(text.trim().to_string())
            }),
            map(export_line, |names: Vec<&str>| {
                ListingLine::Export(names.into_iter().map(String::from).collect())
            }),
            map(byte_line, ListingLine::Bytes),
            map(label_line, |name: &str| ListingLine::Label(name.to_string())),
        )),
        space0,
    )(input)
}

/// Parse a whole listing, skipping blank lines
pub fn parse_listing(text: &str) -> Result<Vec<ListingLine>> {
    let mut lines = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let (_, parsed) = all_consuming(line)(raw).map_err(|_| LutError::ListingParse {
            line: idx + 1,
            msg: format!("unrecognised line {:?}", raw),
        })?;
        lines.push(parsed);
    }
    Ok(lines)
}

/// Assembled view of a listing: data bytes in order plus label addresses
#[derive(Debug, Clone, Default)]
pub struct ListingImage {
    /// Concatenated data bytes
    pub bytes: Vec<u8>,
    /// Label names with their offsets into `bytes`, in definition order
    pub labels: Vec<(String, usize)>,
    /// Every exported name, in order
    pub exports: Vec<String>,
}

impl ListingImage {
    /// Parse and lay out a listing
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::from_lines(parse_listing(text)?))
    }

    /// Lay out already parsed lines
    pub fn from_lines(lines: Vec<ListingLine>) -> Self {
        let mut image = ListingImage::default();
        for line in lines {
            match line {
                ListingLine::Comment(_) => {}
                ListingLine::Export(names) => image.exports.extend(names),
                ListingLine::Label(name) => image.labels.push((name, image.bytes.len())),
                ListingLine::Bytes(bytes) => image.bytes.extend(bytes),
            }
        }
        image
    }

    /// Offset of a label
    pub fn label_offset(&self, name: &str) -> Option<usize> {
        self.labels
            .iter()
            .find(|(label, _)| label == name)
            .map(|(_, offset)| *offset)
    }

    /// `len` bytes starting at a label
    pub fn window(&self, name: &str, len: usize) -> Option<&[u8]> {
        let offset = self.label_offset(name)?;
        self.bytes.get(offset..offset + len)
    }
}
