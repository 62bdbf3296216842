//! Tolerant query-string lexer: turns a raw query string into a
//! doubly-linked sequence of [`Token`]s plus a list of non-fatal
//! `syntax_errors`, used ahead of query parsing proper so that an
//! editor can keep rendering a half-typed query instead of refusing it.
//!
//! Conceptually a four-stage pipeline — escape unescaped-operator chars,
//! merge `&&`/`||` with one unit of lookahead, accumulate runs between
//! terminators, classify each run/terminator in context — collapsed into
//! one pass over `char_indices()` for this crate rather than the base
//! crate's regex-driven `analysis` stage (removed; string queries here
//! are parsed, not free-text analyzed).

pub mod token_type;

use token_type as tt;

/// One lexical unit: either an accumulated run of ordinary characters or
/// a single structural/operator character, classified according to its
/// context (what precedes it, what follows it, whether it closes an open
/// group/quote/regex-delimiter).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub types: u32,
    pub start: usize,
    pub end: usize,
    /// The field governing this token — the field context active at the
    /// point this token was lexed (e.g. the `title` in `title:foo`'s
    /// `foo` token).
    pub parent_field: Option<String>,
    /// The field that would be active immediately after this token.
    pub next_field: Option<String>,
    /// Index of the `Quote` token opening the phrase this token is a
    /// member of, if any.
    pub phrase_start: Option<usize>,
    /// Bit flags describing this token's phrase membership; see
    /// [`token_type::PHRASE_MEMBER`]. A separate bit set from `types`
    /// because phrase membership and lexical type are independent axes.
    pub phrase_flags: u32,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

impl Token {
    fn fresh(pos: usize, types: u32) -> Token {
        Token {
            text: String::new(),
            types,
            start: pos,
            end: pos,
            parent_field: None,
            next_field: None,
            phrase_start: None,
            phrase_flags: 0,
            prev: None,
            next: None,
        }
    }

    pub fn is_type(&self, flag: u32) -> bool {
        self.types & flag != 0
    }

    pub fn is_phrase_member(&self) -> bool {
        self.phrase_flags & tt::PHRASE_MEMBER != 0
    }
}

/// A bracket/range span recorded while lexing: `start`/`end` are byte
/// offsets into the query, `end` is the query length when the opener was
/// never matched by a closer. `field` is the field context active at the
/// moment the opener was lexed, used to answer "what field governs a
/// caret sitting inside this still-open group".
#[derive(Debug, Clone)]
pub struct GroupScope {
    pub start: usize,
    pub end: usize,
    pub field: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TokenSequence {
    pub tokens: Vec<Token>,
    pub syntax_errors: Vec<String>,
    /// Bracket/range spans (groups, closed ranges, open ranges), matched
    /// or not, recorded so caret queries can tell whether a position
    /// sits inside an unclosed group without re-lexing.
    pub group_scopes: Vec<GroupScope>,
    query: String,
}

impl TokenSequence {
    /// Step 1-4 of the edited-token lookup: a token strictly containing
    /// the caret, else the token on the left adjacent to it by decreasing
    /// priority (modifier, field/value/wildcard, multi-char boolean),
    /// else a fresh empty token typed by whether `caret` sits inside
    /// quote/field/group scope. A CJK boundary character suppresses the
    /// adjacency rules entirely, forcing a fresh token.
    pub fn get_edited_token(&self, caret: usize) -> Token {
        if let Some(t) = self.tokens.iter().find(|t| t.start < caret && caret < t.end) {
            return t.clone();
        }

        if !self.boundary_is_cjk(caret) {
            let modifier = tt::MODIFIER_BOOST | tt::MODIFIER_SLOPE;
            if self.tokens.iter().any(|t| t.end == caret && t.is_type(modifier)) {
                return Token::fresh(caret, tt::MODIFIER_VALUE);
            }

            let relevant =
                tt::FIELD | tt::FIELD_VALUE | tt::MODIFIER_BOOST | tt::MODIFIER_SLOPE | tt::WILDCARD_ANY_CHAR | tt::WILDCARD_ANY_STRING;
            if let Some(t) = self.tokens.iter().find(|t| t.end == caret && t.is_type(relevant)) {
                return t.clone();
            }

            let boolean = tt::BOOLEAN_AND | tt::BOOLEAN_OR | tt::BOOLEAN_NOT;
            if let Some(t) = self.tokens.iter().find(|t| t.end == caret && t.is_type(boolean) && t.text.len() > 1) {
                return t.clone();
            }
        }

        let in_scope = self.is_in_quote_or_field_scope(caret);
        let mut fresh = Token::fresh(caret, if in_scope { tt::FIELD_VALUE } else { tt::FIELD });
        fresh.parent_field = self.field_active_at(caret);
        fresh
    }

    /// Same precedence as [`Self::get_edited_token`]; kept as a distinct
    /// entry point because a caller inserting fresh text at an arbitrary
    /// position, rather than editing the token under the caret, is a
    /// conceptually different operation even though today it resolves
    /// identically.
    pub fn get_token_for_arbitrary_insertion(&self, caret: usize) -> Token {
        self.get_edited_token(caret)
    }

    /// Walks forward from `caret`, skipping tokens that are members of an
    /// still-open quoted phrase, and returns a fresh `FieldValue` token
    /// positioned just before the first token outside any phrase (or at
    /// the end of the query if every remaining token is phrase-internal).
    pub fn get_token_for_term_insertion(&self, caret: usize) -> Token {
        for t in &self.tokens {
            if t.end <= caret || t.is_phrase_member() || t.is_type(tt::QUOTE) {
                continue;
            }
            return Token::fresh(t.start, tt::FIELD_VALUE);
        }
        Token::fresh(self.query.len(), tt::FIELD_VALUE)
    }

    /// True if `caret` sits inside an open quote, right after a `field:`,
    /// or inside an unclosed group/range span — any of which mean a
    /// fresh token at `caret` should be typed `FieldValue` rather than
    /// top-level `Field`.
    fn is_in_quote_or_field_scope(&self, caret: usize) -> bool {
        let mut quote_open = false;
        let mut after_colon = false;
        for t in &self.tokens {
            if t.start >= caret {
                break;
            }
            if t.is_type(tt::QUOTE) {
                quote_open = !quote_open;
                after_colon = false;
            } else if t.is_type(tt::COLON) {
                after_colon = true;
            } else {
                after_colon = false;
            }
        }
        let in_group = self.group_scopes.iter().any(|g| g.start < caret && caret <= g.end);
        quote_open || after_colon || in_group
    }

    /// The field governing position `caret`: the `next_field` of the
    /// last token ending at or before `caret`, falling back to the field
    /// recorded on the innermost enclosing group if `caret` is inside one
    /// that opened before any token in it set a field of its own.
    fn field_active_at(&self, caret: usize) -> Option<String> {
        if let Some(field) = self.tokens.iter().filter(|t| t.end <= caret).last().and_then(|t| t.next_field.clone()) {
            return Some(field);
        }
        self.group_scopes.iter().filter(|g| g.start < caret && caret <= g.end).last().and_then(|g| g.field.clone())
    }

    fn boundary_is_cjk(&self, caret: usize) -> bool {
        let before = self.query[..caret.min(self.query.len())].chars().next_back();
        let after = self.query.get(caret..).and_then(|s| s.chars().next());
        before.is_some_and(is_cjk) || after.is_some_and(is_cjk)
    }
}

fn is_cjk(ch: char) -> bool {
    let cp = ch as u32;
    matches!(cp,
        0x3040..=0x309F   // Hiragana
        | 0x30A0..=0x30FF // Katakana
        | 0x3400..=0x4DBF // CJK Unified Ideographs Extension A
        | 0x4E00..=0x9FFF // CJK Unified Ideographs
        | 0xAC00..=0xD7A3 // Hangul Syllables
        | 0xF900..=0xFAFF // CJK Compatibility Ideographs
        | 0xFF00..=0xFFEF // Halfwidth and Fullwidth Forms
        | 0x20000..=0x2A6DF // CJK Unified Ideographs Extension B
    )
}

fn is_structural(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '{' | '}' | '"' | '/' | ':' | '^' | '~')
}

fn push_token(tokens: &mut Vec<Token>, text: String, types: u32, start: usize, end: usize) {
    tokens.push(Token {
        text,
        types,
        start,
        end,
        parent_field: None,
        next_field: None,
        phrase_start: None,
        phrase_flags: 0,
        prev: None,
        next: None,
    });
}

fn classify_run(text: &str, tokens: &[Token], wildcard_flags: u32, followed_by_colon: bool) -> u32 {
    match text {
        "AND" => return tt::BOOLEAN_AND,
        "OR" => return tt::BOOLEAN_OR,
        "NOT" => return tt::BOOLEAN_NOT,
        _ => {}
    }
    if followed_by_colon {
        return tt::FIELD;
    }
    let prev_is_modifier = tokens.last().map(|t| t.is_type(tt::MODIFIER_BOOST | tt::MODIFIER_SLOPE)).unwrap_or(false);
    let base = if prev_is_modifier { tt::MODIFIER_VALUE } else { tt::FIELD_VALUE };
    base | wildcard_flags
}

/// One entry of the bracket stack used while lexing: the byte position
/// the opener started at and the field context active at that point.
struct OpenGroup {
    group_type: u32,
    start: usize,
    field: Option<String>,
}

/// Open/close tracking for groups, ranges, quotes and regex delimiters;
/// quotes and regex delimiters are symmetric (same char opens and
/// closes), everything else has a distinct opening character. Matched
/// group/range spans are appended to `group_scopes` as they close;
/// anything left on `open_stack` when lexing ends is finalized by the
/// caller as spanning to end-of-query.
fn handle_structural(
    ch: char,
    start: usize,
    end: usize,
    tokens: &mut Vec<Token>,
    open_stack: &mut Vec<OpenGroup>,
    group_scopes: &mut Vec<GroupScope>,
    current_field: &Option<String>,
    syntax_errors: &mut Vec<String>,
) {
    if ch == '"' || ch == '/' {
        let this_type = if ch == '"' { tt::QUOTE } else { tt::REGEX_DELIMITER };
        push_token(tokens, ch.to_string(), this_type, start, end);
        return;
    }

    let (this_type, opener) = match ch {
        '(' => (tt::OPEN_GROUP, None),
        ')' => (tt::CLOSE_GROUP, Some(tt::OPEN_GROUP)),
        '[' => (tt::OPEN_CLOSED_RANGE, None),
        ']' => (tt::CLOSE_CLOSED_RANGE, Some(tt::OPEN_CLOSED_RANGE)),
        '{' => (tt::OPEN_OPEN_RANGE, None),
        '}' => (tt::CLOSE_OPEN_RANGE, Some(tt::OPEN_OPEN_RANGE)),
        ':' => (tt::COLON, None),
        '^' => (tt::MODIFIER_BOOST, None),
        '~' => (tt::MODIFIER_SLOPE, None),
        _ => unreachable!("non-structural char reached handle_structural"),
    };

    if let Some(expected) = opener {
        if open_stack.last().map(|g| g.group_type) == Some(expected) {
            let opened = open_stack.pop().unwrap();
            group_scopes.push(GroupScope { start: opened.start, end, field: opened.field });
        } else {
            syntax_errors.push(format!("unmatched '{ch}' at position {start}"));
        }
    } else if matches!(ch, '(' | '[' | '{') {
        open_stack.push(OpenGroup { group_type: this_type, start, field: current_field.clone() });
    }

    push_token(tokens, ch.to_string(), this_type, start, end);
}

/// Fills `parent_field`/`next_field` (a running "currently active field"
/// scan: a `Field` token updates the field effective from itself
/// onward) and `phrase_start`/`phrase_flags` (membership between a
/// `Quote` token and its match) in one forward pass.
fn fill_fields_and_phrases(tokens: &mut [Token]) {
    let mut current_field: Option<String> = None;
    let mut open_quote_idx: Option<usize> = None;

    for i in 0..tokens.len() {
        tokens[i].parent_field = current_field.clone();
        if tokens[i].is_type(tt::FIELD) {
            current_field = Some(tokens[i].text.clone());
        }
        tokens[i].next_field = current_field.clone();

        if tokens[i].is_type(tt::QUOTE) {
            match open_quote_idx {
                None => open_quote_idx = Some(i),
                Some(_) => open_quote_idx = None,
            }
        } else if let Some(open_idx) = open_quote_idx {
            tokens[i].phrase_start = Some(open_idx);
            tokens[i].phrase_flags |= tt::PHRASE_MEMBER;
        }
    }
}

fn link(tokens: &mut [Token]) {
    let n = tokens.len();
    for i in 0..n {
        tokens[i].prev = if i == 0 { None } else { Some(i - 1) };
        tokens[i].next = if i + 1 < n { Some(i + 1) } else { None };
    }
}

/// Lexes `query` into a [`TokenSequence`]. Never fails: anything it
/// can't make sense of (a trailing escape, an unmatched closing bracket)
/// is recorded in `syntax_errors` and lexing continues.
pub fn tokenize(query: &str) -> TokenSequence {
    let chars: Vec<(usize, char)> = query.char_indices().collect();
    let n = chars.len();
    let mut i = 0usize;

    let mut tokens: Vec<Token> = Vec::new();
    let mut syntax_errors: Vec<String> = Vec::new();
    let mut open_stack: Vec<OpenGroup> = Vec::new();
    let mut group_scopes: Vec<GroupScope> = Vec::new();
    let mut current_field: Option<String> = None;

    let mut run = String::new();
    let mut run_start: Option<usize> = None;
    let mut run_wildcard: u32 = 0;

    let byte_at = |idx: usize| -> usize {
        if idx < n {
            chars[idx].0
        } else {
            query.len()
        }
    };

    macro_rules! flush_run {
        ($end:expr, $followed_by_colon:expr) => {
            if let Some(start) = run_start.take() {
                let text = std::mem::take(&mut run);
                let types = classify_run(&text, &tokens, run_wildcard, $followed_by_colon);
                run_wildcard = 0;
                if types & tt::FIELD != 0 {
                    current_field = Some(text.clone());
                }
                push_token(&mut tokens, text, types, start, $end);
            }
        };
    }

    while i < n {
        let (byte_pos, ch) = chars[i];

        if ch == '\\' {
            if i + 1 < n {
                let (_, next_ch) = chars[i + 1];
                if run_start.is_none() {
                    run_start = Some(byte_pos);
                }
                run.push(next_ch);
                i += 2;
            } else {
                syntax_errors.push(format!("trailing escape at position {byte_pos}"));
                if run_start.is_none() {
                    run_start = Some(byte_pos);
                }
                run.push('\\');
                i += 1;
            }
            continue;
        }

        if (ch == '&' || ch == '|') && i + 1 < n && chars[i + 1].1 == ch {
            flush_run!(byte_pos, false);
            let end = byte_at(i + 2);
            let (text, ttype) = if ch == '&' { ("&&", tt::BOOLEAN_AND) } else { ("||", tt::BOOLEAN_OR) };
            push_token(&mut tokens, text.to_string(), ttype, byte_pos, end);
            i += 2;
            continue;
        }

        if ch.is_whitespace() {
            flush_run!(byte_pos, false);
            i += 1;
            continue;
        }

        if is_structural(ch) {
            flush_run!(byte_pos, ch == ':');
            let end = byte_at(i + 1);
            handle_structural(ch, byte_pos, end, &mut tokens, &mut open_stack, &mut group_scopes, &current_field, &mut syntax_errors);
            i += 1;
            continue;
        }

        if run_start.is_none() {
            run_start = Some(byte_pos);
        }
        if ch == '*' {
            run_wildcard |= tt::WILDCARD_ANY_STRING;
        }
        if ch == '?' {
            run_wildcard |= tt::WILDCARD_ANY_CHAR;
        }
        run.push(ch);
        i += 1;

        if is_cjk(ch) {
            flush_run!(byte_at(i), false);
        }
    }
    flush_run!(query.len(), false);

    for opened in open_stack.drain(..) {
        group_scopes.push(GroupScope { start: opened.start, end: query.len(), field: opened.field });
    }

    link(&mut tokens);
    fill_fields_and_phrases(&mut tokens);

    TokenSequence { tokens, syntax_errors, group_scopes, query: query.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_colon_value_is_classified() {
        let seq = tokenize("title:hello");
        let kinds: Vec<u32> = seq.tokens.iter().map(|t| t.types).collect();
        assert_eq!(kinds, vec![tt::FIELD, tt::COLON, tt::FIELD_VALUE]);
        assert_eq!(seq.tokens[2].parent_field.as_deref(), Some("title"));
    }

    #[test]
    fn boolean_and_is_a_single_token() {
        let seq = tokenize("a AND b");
        assert_eq!(seq.tokens.len(), 3);
        assert!(seq.tokens[1].is_type(tt::BOOLEAN_AND));
        assert_eq!(seq.tokens[1].text, "AND");
    }

    #[test]
    fn double_ampersand_is_merged_into_one_token() {
        let seq = tokenize("a && b");
        assert_eq!(seq.tokens[1].text, "&&");
        assert!(seq.tokens[1].is_type(tt::BOOLEAN_AND));
    }

    #[test]
    fn wildcard_characters_set_wildcard_flags() {
        let seq = tokenize("te*t");
        assert!(seq.tokens[0].is_type(tt::WILDCARD_ANY_STRING));
        assert!(seq.tokens[0].is_type(tt::FIELD_VALUE));
    }

    #[test]
    fn adjacent_cjk_ideographs_become_separate_tokens() {
        let seq = tokenize("你好world");
        let texts: Vec<&str> = seq.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["你", "好", "world"]);
    }

    #[test]
    fn unmatched_close_paren_is_a_syntax_error_not_a_failure() {
        let seq = tokenize("a)");
        assert_eq!(seq.tokens.len(), 2);
        assert!(!seq.syntax_errors.is_empty());
        assert!(seq.tokens[1].is_type(tt::CLOSE_GROUP));
    }

    #[test]
    fn trailing_backslash_is_a_syntax_error_not_a_failure() {
        let seq = tokenize("abc\\");
        assert!(!seq.syntax_errors.is_empty());
        assert_eq!(seq.tokens[0].text, "abc\\");
    }

    #[test]
    fn quoted_phrase_toggles_quote_tokens() {
        let seq = tokenize("\"big idea\"");
        assert!(seq.tokens[0].is_type(tt::QUOTE));
        assert_eq!(seq.tokens[1].text, "big");
        assert!(seq.tokens[1].is_phrase_member());
        assert_eq!(seq.tokens[2].text, "idea");
        assert!(seq.tokens[3].is_type(tt::QUOTE));
        assert!(!seq.tokens[3].is_phrase_member());
    }

    #[test]
    fn get_edited_token_finds_the_token_the_caret_is_inside() {
        let seq = tokenize("hello world");
        let tok = seq.get_edited_token(2);
        assert_eq!(tok.text, "hello");
    }

    #[test]
    fn get_edited_token_at_a_gap_returns_a_fresh_field_token() {
        let seq = tokenize("a b");
        let tok = seq.get_edited_token(10);
        assert_eq!(tok.text, "");
        assert!(tok.is_type(tt::FIELD));
    }

    #[test]
    fn get_token_for_term_insertion_skips_past_an_open_phrase() {
        let seq = tokenize("\"a b\" c");
        let tok = seq.get_token_for_term_insertion(1);
        assert_eq!(tok.start, seq.query.len() - 1);
    }

    #[test]
    fn caret_inside_a_value_reports_its_governing_field() {
        // "title:foo AND body:b*"; "foo" spans bytes [6, 9), so caret=7 is
        // strictly inside it.
        let seq = tokenize("title:foo AND body:b*");
        let tok = seq.get_edited_token(7);
        assert_eq!(tok.text, "foo");
        assert_eq!(tok.parent_field.as_deref(), Some("title"));
    }

    #[test]
    fn caret_inside_an_unclosed_group_yields_a_field_value_with_no_parent_field() {
        let seq = tokenize("(a OR ");
        assert!(seq.syntax_errors.is_empty());
        assert_eq!(seq.group_scopes.len(), 1);
        let tok = seq.get_edited_token(seq.query.len());
        assert_eq!(tok.text, "");
        assert!(tok.is_type(tt::FIELD_VALUE));
        assert_eq!(tok.parent_field, None);
    }

    #[test]
    fn a_token_starting_right_after_the_caret_is_not_treated_as_adjacent() {
        // "title" is a Field token starting at byte 0; caret=0 sits at its
        // start (i.e. to its right, not its left). Rule 3 only considers
        // the token on the LEFT, so this must fall through to a fresh
        // top-level Field token rather than returning "title".
        let seq = tokenize("title:foo");
        let tok = seq.get_edited_token(0);
        assert_eq!(tok.text, "");
        assert!(tok.is_type(tt::FIELD));
    }

    #[test]
    fn cjk_boundary_forces_a_fresh_token_instead_of_extending() {
        let seq = tokenize("你好");
        // Caret sits between the two ideographs; both neighbors are CJK,
        // so the boundary is never "connected" and a fresh token appears
        // rather than either neighboring token being returned.
        let tok = seq.get_edited_token(3);
        assert_eq!(tok.text, "");
    }
}
