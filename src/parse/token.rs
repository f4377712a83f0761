//! Token matching for plan files.
//!
//! Four fragments are recognised, independent of where they sit in the file:
//!
//! - coordinate tokens `(x,y),` or `(x,y,TAG),`
//! - agent headers `agent<N>:` at the start of a line
//! - history size lines `history_size=<N>`
//! - step headers `step<N>:`
//!
//! The matchers only look at one line at a time. Deciding what a match
//! means is left to the parser.

use std::str::FromStr;

use crate::model::Orientation;

/// Any line containing this switches the parser into the reference section.
pub const REFERENCE_MARKER: &str = "local_guidance=";

/// Primary-plan rows are recognised by this substring, e.g. `12:(3,4),`.
pub const PLAN_ROW_MARKER: &str = ":(";

/// A token matched the grammar but its contents could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("unknown orientation tag {0:?}")]
    UnknownOrientation(String),
}

/// A decoded coordinate token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateToken {
    pub x: u32,
    pub y: u32,
    pub orientation: Orientation,
}

/// Scans a line for coordinate tokens, left to right.
///
/// Text between tokens is skipped. Scanning stops at the first position
/// where no further token can be found, or after the first error.
pub fn coordinates(line: &str) -> Coordinates<'_> {
    Coordinates { line, cursor: 0 }
}

/// Iterator returned by [`coordinates`].
pub struct Coordinates<'a> {
    line: &'a str,
    cursor: usize,
}

impl Iterator for Coordinates<'_> {
    type Item = Result<CoordinateToken, TokenError>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.line.as_bytes();
        while self.cursor < bytes.len() {
            let start = self.cursor + self.line[self.cursor..].find('(')?;
            match match_coordinate(bytes, start) {
                Some(raw) => {
                    self.cursor = raw.end;
                    let token = raw.decode(self.line);
                    if token.is_err() {
                        self.cursor = bytes.len();
                    }
                    return Some(token);
                }
                None => self.cursor = start + 1,
            }
        }
        None
    }
}

/// Byte ranges of a matched coordinate token.
struct RawCoordinate {
    x: (usize, usize),
    y: (usize, usize),
    tag: Option<(usize, usize)>,
    end: usize,
}

impl RawCoordinate {
    fn decode(&self, line: &str) -> Result<CoordinateToken, TokenError> {
        let x = number(&line[self.x.0..self.x.1])?;
        let y = number(&line[self.y.0..self.y.1])?;
        let orientation = match self.tag {
            Some((start, end)) => {
                let tag = &line[start..end];
                Orientation::from_tag(tag)
                    .ok_or_else(|| TokenError::UnknownOrientation(tag.to_string()))?
            }
            None => Orientation::None,
        };
        Ok(CoordinateToken { x, y, orientation })
    }
}

/// Matches `\((\d+),(\d+),?([XY]_[A-Z]{4,5})?\),` anchored at `start`.
fn match_coordinate(b: &[u8], start: usize) -> Option<RawCoordinate> {
    let mut i = start;
    if b.get(i) != Some(&b'(') {
        return None;
    }
    i += 1;

    let x = digits(b, i)?;
    i = x.1;
    if b.get(i) != Some(&b',') {
        return None;
    }
    i += 1;

    let y = digits(b, i)?;
    i = y.1;
    if b.get(i) == Some(&b',') {
        i += 1;
    }

    let tag = orientation_tag(b, i);
    if let Some((_, end)) = tag {
        i = end;
    }

    if b.get(i) != Some(&b')') || b.get(i + 1) != Some(&b',') {
        return None;
    }

    Some(RawCoordinate {
        x,
        y,
        tag,
        end: i + 2,
    })
}

/// A non-empty run of ASCII digits starting at `start`.
fn digits(b: &[u8], start: usize) -> Option<(usize, usize)> {
    let len = b[start.min(b.len())..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    (len > 0).then_some((start, start + len))
}

/// `[XY]_[A-Z]{4,5}` starting at `start`.
fn orientation_tag(b: &[u8], start: usize) -> Option<(usize, usize)> {
    if !matches!(b.get(start), Some(b'X' | b'Y')) || b.get(start + 1) != Some(&b'_') {
        return None;
    }
    let suffix = b[start + 2..]
        .iter()
        .take(5)
        .take_while(|c| c.is_ascii_uppercase())
        .count();
    (suffix >= 4).then_some((start, start + 2 + suffix))
}

fn number<T: FromStr>(text: &str) -> Result<T, TokenError> {
    text.parse()
        .map_err(|_| TokenError::InvalidNumber(text.to_string()))
}

/// `agent<N>:` at the start of a line. Returns the id and the rest of the line.
pub fn agent_header(line: &str) -> Option<Result<(usize, &str), TokenError>> {
    let rest = line.strip_prefix("agent")?;
    let (_, end) = digits(rest.as_bytes(), 0)?;
    let tail = rest[end..].strip_prefix(':')?;
    Some(number(&rest[..end]).map(|id| (id, tail)))
}

/// A whole line of the form `history_size=<N>`.
pub fn history_size(line: &str) -> Option<Result<usize, TokenError>> {
    let value = line.strip_prefix("history_size=")?;
    whole_number(value).map(number)
}

/// A whole line of the form `step<N>:`.
pub fn step_header(line: &str) -> Option<Result<usize, TokenError>> {
    let value = line.strip_prefix("step")?.strip_suffix(':')?;
    whole_number(value).map(number)
}

fn whole_number(text: &str) -> Option<&str> {
    (!text.is_empty() && text.bytes().all(|c| c.is_ascii_digit())).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(token: &CoordinateToken) -> String {
        match token.orientation.tag() {
            Some(tag) => format!("({},{},{tag}),", token.x, token.y),
            None => format!("({},{}),", token.x, token.y),
        }
    }

    fn scan(line: &str) -> Vec<CoordinateToken> {
        coordinates(line).map(Result::unwrap).collect()
    }

    // ── Coordinates ──

    #[test]
    fn token_with_orientation_round_trips() {
        let tokens = scan("(3,5,X_NORTH),");

        assert_eq!(
            tokens,
            vec![CoordinateToken {
                x: 3,
                y: 5,
                orientation: Orientation::North
            }]
        );
        assert_eq!(render(&tokens[0]), "(3,5,X_NORTH),");
    }

    #[test]
    fn token_without_orientation() {
        let tokens = scan("(12,0),");
        assert_eq!(tokens.len(), 1);
        assert_eq!((tokens[0].x, tokens[0].y), (12, 0));
        assert!(tokens[0].orientation.is_none());
    }

    #[test]
    fn skips_row_prefix_and_reads_every_token() {
        let tokens = scan("0:(5,16),(21,29,Y_MINUS),(1,1),");
        let cells: Vec<_> = tokens.iter().map(|t| (t.x, t.y)).collect();

        assert_eq!(cells, vec![(5, 16), (21, 29), (1, 1)]);
        assert_eq!(tokens[1].orientation, Orientation::YMinus);
    }

    #[test]
    fn long_prefix_does_not_duplicate_tokens() {
        let tokens = scan("123456789:(1,2),(3,4),");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn long_rows_are_read_in_full() {
        let line: String = (0..200).map(|i| format!("({i},{i}),")).collect();
        assert_eq!(scan(&line).len(), 200);
    }

    #[test]
    fn trailing_comma_is_required() {
        assert!(scan("(1,2)").is_empty());
        assert_eq!(scan("(1,2),(3,4)").len(), 1);
    }

    #[test]
    fn comma_before_tag_is_optional() {
        let tokens = scan("(1,2X_PLUS),(3,4,),");

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].orientation, Orientation::XPlus);
        assert!(tokens[1].orientation.is_none());
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        let tokens = scan("(a,b),(1,),(-1,2),(7,8),");
        let cells: Vec<_> = tokens.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(cells, vec![(7, 8)]);
    }

    #[test]
    fn tag_outside_pattern_does_not_match() {
        assert!(scan("(1,2,Z_PLUS),").is_empty());
        assert!(scan("(1,2,X_PLUSES),").is_empty());
        assert!(scan("(1,2,X_abc),").is_empty());
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let mut iter = coordinates("(1,2,X_ABCD),(3,4),");
        assert_eq!(
            iter.next(),
            Some(Err(TokenError::UnknownOrientation("X_ABCD".into())))
        );
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn oversized_number_is_an_error() {
        let mut iter = coordinates("(99999999999,1),");
        assert!(matches!(
            iter.next(),
            Some(Err(TokenError::InvalidNumber(_)))
        ));
    }

    #[test]
    fn no_tokens_in_noise() {
        assert!(scan("").is_empty());
        assert!(scan("solved=1").is_empty());
        assert!(scan("((((").is_empty());
    }

    // ── Headers ──

    #[test]
    fn agent_header_returns_rest_of_line() {
        let (id, rest) = agent_header("agent12:(0,0),").unwrap().unwrap();
        assert_eq!(id, 12);
        assert_eq!(rest, "(0,0),");
    }

    #[test]
    fn agent_header_must_start_the_line() {
        assert!(agent_header(" agent1:(0,0),").is_none());
        assert!(agent_header("agent:(0,0),").is_none());
        assert!(agent_header("agent1(0,0),").is_none());
    }

    #[test]
    fn history_size_needs_whole_line() {
        assert_eq!(history_size("history_size=3"), Some(Ok(3)));
        assert!(history_size("history_size=3 extra").is_none());
        assert!(history_size("history_size=").is_none());
        assert!(history_size("xhistory_size=3").is_none());
    }

    #[test]
    fn step_header_needs_whole_line() {
        assert_eq!(step_header("step42:"), Some(Ok(42)));
        assert!(step_header("step42: agent0").is_none());
        assert!(step_header("step:").is_none());
    }

    #[test]
    fn header_overflow_is_an_error() {
        assert!(matches!(
            step_header("step999999999999999999999999:"),
            Some(Err(TokenError::InvalidNumber(_)))
        ));
    }
}
