#![allow(clippy::module_inception)]

use std::rc::Rc;

use colored::Colorize;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// Byte offset into a source file, together with the file's name.
#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }
}

/// Finds the line containing a byte offset.
///
/// # Returns
///
/// `(line number, line text, offset within the line)`, or `None` when the
/// offset lies past the end of the source.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    let mut start = 0;
    let mut line_number = 1;

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let line_pos = pos - start;
            return Some((line_number, line.to_string(), line_pos));
        }

        start = end;
        line_number += 1;
    }

    // Errors reported at EOF point one past the last character.
    if pos == source.len() {
        let last = source.split_inclusive('\n').last().unwrap_or("");
        return Some((line_number.saturating_sub(1).max(1), last.to_string(), last.len()));
    }

    None
}

pub fn display_error(error: &Error, source: &str) {
    /*
        error: message
        -> final.foc
           |
        20 | int a = #;
           | --------^
    */

    let position = error.get_position();

    if let ErrorTip::None = error.get_tip() {
        eprintln!("{} {}", "Error:".red().bold(), error.get_error_name());
    } else {
        eprintln!(
            "{} {} ({})",
            "Error:".red().bold(),
            error.get_error_name(),
            error.get_tip()
        );
    }
    eprintln!("-> {}", position.1);

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        return;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    eprintln!("{}", format!("{:>padding$}", "|").blue());

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    eprintln!("{} {} {}", line_string.blue(), "|".blue(), line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    eprintln!(
        "{} {}",
        format!("{:>padding$}", "|").blue(),
        format!("{:->arrows$}", "^").red()
    );
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\nint main() {\n    return 0;\nTesting { }\n";

        let (line_number, line, line_pos) = super::get_line_at_position(source, 10).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(source, 49).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);
    }

    #[test]
    fn test_get_line_past_end() {
        assert!(super::get_line_at_position("abc", 10).is_none());
        assert!(super::get_line_at_position("abc", 3).is_some());
    }

    #[test]
    fn test_remove_starting_whitespace() {
        let (text, removed) = super::remove_starting_whitespace("    return x;");
        assert_eq!(text, "return x;");
        assert_eq!(removed, 4);
    }
}
