// src/parser.rs

/// Byte cursor over template source. All markers are ASCII, so positions
/// always land on char boundaries.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    /// Consume whichever of `lits` matches at the cursor first.
    pub fn consume_any(&mut self, lits: &[&str]) -> bool {
        match lits.iter().find(|lit| self.peek_str(lit)) {
            Some(lit) => {
                self.i += lit.len();
                true
            }
            None => false,
        }
    }

    pub fn consume_str(&mut self, lit: &str) -> bool {
        self.consume_any(&[lit])
    }

    pub fn bump(&mut self) {
        if let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
        }
    }

    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        &self.s[from..to]
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

/// Split `text` into alternating literal and bracket-interior segments.
///
/// The result always starts and ends with a literal (either may be empty),
/// so interiors sit at odd indices. Inside a bracket every `inner` marker
/// needs its own `end` before the outer bracket closes. A bracket still open
/// at end of input is closed there.
pub fn split_bracket<'a>(text: &'a str, start: &str, end: &str, inner: &[&str]) -> Vec<&'a str> {
    debug_assert!(!start.is_empty() && !end.is_empty());
    let mut p = Parser::new(text);
    let mut out = Vec::new();
    let mut literal_from = 0;

    while !p.eof() {
        if !p.peek_str(start) {
            p.bump();
            continue;
        }
        out.push(p.slice(literal_from, p.pos()));
        p.consume_str(start);

        let body_from = p.pos();
        let mut body_to = None;
        let mut depth = 1usize;
        while !p.eof() {
            if p.peek_str(end) {
                depth -= 1;
                if depth == 0 {
                    body_to = Some(p.pos());
                    p.consume_str(end);
                    break;
                }
                p.consume_str(end);
            } else if p.consume_any(inner) {
                depth += 1;
            } else {
                p.bump();
            }
        }
        out.push(p.slice(body_from, body_to.unwrap_or(p.pos())));
        literal_from = p.pos();
    }

    out.push(p.slice(literal_from, p.pos()));
    out
}

/// Split on `delim` except inside `start ... }` brackets. Pieces are trimmed.
///
/// `a | f(${b | g}) | h` splits into `a`, `f(${b | g})` and `h`.
pub fn split_outer(text: &str, delim: char, start: &str) -> Vec<String> {
    let mut out = vec![String::new()];
    for (n, part) in split_bracket(text, start, "}", &["{"]).into_iter().enumerate() {
        if n % 2 == 1 {
            if let Some(current) = out.last_mut() {
                current.push_str(start);
                current.push_str(part);
                current.push('}');
            }
            continue;
        }
        let mut tokens = part.split(delim);
        if let (Some(current), Some(first)) = (out.last_mut(), tokens.next()) {
            current.push_str(first);
        }
        out.extend(tokens.map(str::to_string));
    }
    out.into_iter().map(|piece| piece.trim().to_string()).collect()
}

const NEST_OPEN: [char; 2] = ['{', '['];
const NEST_CLOSE: [char; 2] = ['}', ']'];

/// Split on `delim` wherever no `{`/`[` is left open. Pieces are not trimmed.
pub fn split_nested(text: &str, delim: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut from = 0;
    for (i, c) in text.char_indices() {
        if NEST_OPEN.contains(&c) {
            depth += 1;
        } else if NEST_CLOSE.contains(&c) {
            depth = depth.saturating_sub(1);
        } else if c == delim && depth == 0 {
            out.push(&text[from..i]);
            from = i + c.len_utf8();
        }
    }
    out.push(&text[from..]);
    out
}

/// Content between the opener at the start of `text` and its matching
/// closer. When the closer is missing the whole remainder is returned.
pub fn bracket_interior<'a>(text: &'a str, open: &[char], close: &[char]) -> &'a str {
    let mut chars = text.char_indices();
    let body_from = match chars.next() {
        Some((_, c)) if open.contains(&c) => c.len_utf8(),
        _ => return text,
    };
    let mut depth = 1usize;
    for (i, c) in chars {
        if open.contains(&c) {
            depth += 1;
        } else if close.contains(&c) {
            depth -= 1;
            if depth == 0 {
                return &text[body_from..i];
            }
        }
    }
    &text[body_from..]
}

/// [`bracket_interior`] for object and array literals.
pub fn nested_interior(text: &str) -> &str {
    bracket_interior(text, &NEST_OPEN, &NEST_CLOSE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_bracket_alternates_literals_and_bodies() {
        let parts = split_bracket("a ${b} c ${d}", "${", "}", &["{"]);
        assert_eq!(parts, vec!["a ", "b", " c ", "d", ""]);
    }

    #[test]
    fn split_bracket_counts_inner_openers() {
        let parts = split_bracket("x ${a | f({k: ${v}})} y", "${", "}", &["{"]);
        assert_eq!(parts, vec!["x ", "a | f({k: ${v}})", " y"]);
    }

    #[test]
    fn split_bracket_closes_at_end_of_input() {
        let parts = split_bracket("x ${a | f(${b}", "${", "}", &["{"]);
        assert_eq!(parts, vec!["x ", "a | f(${b}", ""]);
    }

    #[test]
    fn split_bracket_ignores_lone_braces_outside() {
        let parts = split_bracket("${$}{var}", "${", "}", &["{"]);
        assert_eq!(parts, vec!["", "$", "{var}"]);
    }

    #[test]
    fn split_outer_keeps_nested_pipes() {
        let parts = split_outer("a | f(${b | g}) |h", '|', "${");
        assert_eq!(parts, vec!["a", "f(${b | g})", "h"]);
    }

    #[test]
    fn split_outer_unclosed_param_object() {
        let parts = split_outer("x | orElse({first: A, last: ${p}} | name", '|', "${");
        assert_eq!(parts, vec!["x", "orElse({first: A, last: ${p}}", "name"]);
    }

    #[test]
    fn split_nested_respects_objects_and_arrays() {
        let parts = split_nested("a,{b:1, c:[2,3]},[d,e], f", ',');
        assert_eq!(parts, vec!["a", "{b:1, c:[2,3]}", "[d,e]", " f"]);
    }

    #[test]
    fn interior_tolerates_missing_close() {
        assert_eq!(nested_interior("{a:{b:1}}"), "a:{b:1}");
        assert_eq!(nested_interior("{a:{b:1}"), "a:{b:1}");
        assert_eq!(bracket_interior("(2", &['('], &[')']), "2");
        assert_eq!(bracket_interior("(f(x), y)", &['('], &[')']), "f(x), y");
    }
}
