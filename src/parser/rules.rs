//! Lexical well-formedness rules that quick-xml leaves to the caller.

use crate::parser::error::{Result, XmlError};

pub fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// Characters allowed anywhere in a document
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

pub fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_ncname(name: &str) -> bool {
    !name.contains(':') && is_name(name)
}

/// Element and attribute names: a Name with at most one colon, separating
/// a non-empty prefix from a non-empty local part.
pub fn check_qname(name: &str) -> Result<()> {
    let valid = match name.split_once(':') {
        Some((prefix, local)) => is_ncname(prefix) && is_ncname(local),
        None => is_name(name),
    };

    if valid {
        Ok(())
    } else {
        Err(XmlError::InvalidName(name.to_string()))
    }
}

pub fn check_name(name: &str) -> Result<()> {
    if is_name(name) {
        Ok(())
    } else {
        Err(XmlError::InvalidName(name.to_string()))
    }
}

pub fn prefix_of(qname: &str) -> Option<&str> {
    qname.split_once(':').map(|(prefix, _)| prefix)
}

pub fn check_chars(text: &str) -> Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(XmlError::InvalidChar(c as u32)),
        None => Ok(()),
    }
}

/// Comment payloads may not contain `--` or end with `-`
pub fn check_comment(content: &str) -> Result<()> {
    if content.contains("--") || content.ends_with('-') {
        return Err(XmlError::InvalidComment);
    }
    check_chars(content)
}

/// Whether every quoted attribute value in the raw attribute section of a
/// tag is followed by whitespace or the end of the tag.
pub fn attributes_are_separated(raw: &[u8]) -> bool {
    let mut quote = None;

    for (i, &b) in raw.iter().enumerate() {
        match quote {
            Some(q) if b == q => {
                quote = None;
                match raw.get(i + 1) {
                    None => {}
                    Some(next) if next.is_ascii_whitespace() => {}
                    Some(b'/') if i + 2 == raw.len() => {}
                    Some(_) => return false,
                }
            }
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None => {}
        }
    }

    true
}
