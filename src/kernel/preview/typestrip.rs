//! Byte-level scanner that drops TypeScript type syntax and leaves JSX untouched.
//!
//! This is a best-effort rewrite, not a parser. It recognises the handful of
//! places annotations show up in generated React code: parameter lists,
//! variable declarators, return positions, `as` casts, call generics and
//! non-null assertions.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TYPE_DECL_RE: Regex = Regex::new(
        r"(?m)^[ \t]*(?:export[ \t]+)?(?:(?P<iface>(?:declare[ \t]+)?interface[ \t]+[A-Za-z_$][\w$]*)|(?P<alias>(?:declare[ \t]+)?type[ \t]+[A-Za-z_$][\w$]*[ \t]*[<=])|(?P<block>declare[ \t]+(?:global|module|namespace)\b)|(?P<stmt>declare[ \t]+(?:const|let|var|function|class|enum)\b))"
    )
    .expect("type declaration pattern");
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "case", "catch", "class", "const", "default", "delete", "do", "else",
    "export", "extends", "for", "function", "if", "import", "in", "instanceof", "let", "new",
    "of", "return", "switch", "throw", "typeof", "var", "void", "while", "with", "yield",
];

const CAST_PRIMITIVES: &[&str] = &[
    "any", "bigint", "boolean", "const", "keyof", "never", "null", "number", "object", "readonly",
    "string", "symbol", "typeof", "undefined", "unknown", "void",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TypeContext {
    /// Ends at `,`, `)` or a default value.
    Param,
    /// Ends at the initializer, `;` or a line break.
    Var,
    /// Ends at the function body.
    FnReturn,
    /// Ends at `=>`.
    ArrowReturn,
    Cast,
    Alias,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tok<'a> {
    None,
    Word(&'a str),
    Punct(u8),
}

impl Tok<'_> {
    fn ends_expression(self) -> bool {
        match self {
            Tok::Word(w) => !is_keyword(w),
            Tok::Punct(c) => matches!(c, b')' | b']' | b'"'),
            Tok::None => false,
        }
    }
}

/// Removes type-only syntax from `src`.
pub fn strip_types(src: &str) -> String {
    let without_decls = strip_type_declarations(src);
    strip_annotations(&without_decls)
}

/// Drops `interface`, `type` alias and `declare` statements.
pub fn strip_type_declarations(src: &str) -> String {
    let b = src.as_bytes();
    let mut out = String::with_capacity(src.len());
    let mut cursor = 0;

    for caps in TYPE_DECL_RE.captures_iter(src) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() < cursor {
            continue;
        }

        let end = if caps.name("iface").is_some() || caps.name("block").is_some() {
            block_end(b, whole.end())
        } else if caps.name("alias").is_some() {
            alias_end(b, whole.end() - 1)
        } else {
            Some(statement_end(b, whole.end()))
        };
        let Some(end) = end else {
            continue;
        };

        out.push_str(&src[cursor..whole.start()]);
        cursor = consume_line_rest(b, end);
    }

    out.push_str(&src[cursor..]);
    out
}

/// Removes inline annotations, casts, call generics and non-null assertions.
pub fn strip_annotations(src: &str) -> String {
    Stripper::new(src).run()
}

fn block_end(b: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < b.len() {
        match b[i] {
            b'{' => return find_matching(b, i).map(|close| close + 1),
            b';' => return Some(i + 1),
            b'\'' | b'"' | b'`' => {
                i = skip_string(b, i);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// `at` points at the `<` of the alias generics or the `=`.
fn alias_end(b: &[u8], at: usize) -> Option<usize> {
    let mut eq = at;
    if b.get(at) == Some(&b'<') {
        let mut depth = 0usize;
        let mut i = at;
        while i < b.len() {
            match b[i] {
                b'<' => depth += 1,
                b'>' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        eq = skip_ws(b, i + 1);
        if b.get(eq) != Some(&b'=') {
            return None;
        }
    }

    let end = scan_type(b, eq + 1, TypeContext::Alias);
    Some(if b.get(end) == Some(&b';') { end + 1 } else { end })
}

fn statement_end(b: &[u8], from: usize) -> usize {
    let end = scan_type(b, from, TypeContext::Alias);
    if b.get(end) == Some(&b';') {
        end + 1
    } else {
        end
    }
}

fn consume_line_rest(b: &[u8], mut i: usize) -> usize {
    if b.get(i) == Some(&b';') {
        i += 1;
    }
    while matches!(b.get(i), Some(b' ' | b'\t' | b'\r')) {
        i += 1;
    }
    if b.get(i) == Some(&b'\n') {
        i += 1;
    }
    i
}

/// One JSX element tree being copied.
#[derive(Debug, Default)]
struct JsxScope {
    /// Elements opened and not yet closed.
    open: usize,
    /// `Some(closing)` while inside a `<...>` tag.
    tag: Option<bool>,
    /// `{` nesting of the current attribute value or expression container.
    braces: usize,
}

struct Stripper<'a> {
    src: &'a str,
    b: &'a [u8],
    pos: usize,
    out: String,
    recent: [Tok<'a>; 2],
    jsx: Vec<JsxScope>,
}

impl<'a> Stripper<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            b: src.as_bytes(),
            pos: 0,
            out: String::with_capacity(src.len()),
            recent: [Tok::None, Tok::None],
            jsx: Vec::new(),
        }
    }

    fn run(mut self) -> String {
        while self.pos < self.b.len() {
            if self.in_jsx_text() {
                self.jsx_text();
                continue;
            }
            let c = self.b[self.pos];
            match c {
                b'\'' | b'"' | b'`' => {
                    let end = skip_string(self.b, self.pos);
                    self.copy_to(end);
                    self.push(Tok::Punct(b'"'));
                }
                b'/' if matches!(self.b.get(self.pos + 1), Some(b'/' | b'*')) => {
                    let end = skip_comment(self.b, self.pos);
                    self.copy_to(end);
                }
                c if is_ident_start(c) || c.is_ascii_digit() => self.word(),
                b'(' => self.paren(),
                b'!' => self.bang(),
                b'<' if self.jsx_starts() => {
                    self.jsx.push(JsxScope {
                        tag: Some(false),
                        ..JsxScope::default()
                    });
                    self.copy_to(self.pos + 1);
                    self.push(Tok::Punct(b'<'));
                }
                b'>' if self.in_tag() => self.close_tag(),
                b'{' | b'}' => {
                    if let Some(scope) = self.jsx.last_mut() {
                        if c == b'{' {
                            scope.braces += 1;
                        } else {
                            scope.braces = scope.braces.saturating_sub(1);
                        }
                    }
                    self.copy_to(self.pos + 1);
                    self.push(Tok::Punct(c));
                }
                c if c.is_ascii_whitespace() => self.copy_to(self.pos + 1),
                c if c.is_ascii() => {
                    self.copy_to(self.pos + 1);
                    self.push(Tok::Punct(c));
                }
                _ => {
                    let len = self.src[self.pos..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                    self.copy_to(self.pos + len);
                    self.push(Tok::Punct(0));
                }
            }
        }
        self.out
    }

    fn copy_to(&mut self, end: usize) {
        self.out.push_str(&self.src[self.pos..end]);
        self.pos = end;
    }

    fn push(&mut self, tok: Tok<'a>) {
        self.recent = [tok, self.recent[0]];
    }

    fn in_jsx_text(&self) -> bool {
        self.jsx
            .last()
            .is_some_and(|s| s.open > 0 && s.tag.is_none() && s.braces == 0)
    }

    fn in_tag(&self) -> bool {
        self.jsx
            .last()
            .is_some_and(|s| s.tag.is_some() && s.braces == 0)
    }

    /// A `<` in expression position followed by a tag name or `>`. `<T,>` and
    /// `<T extends U>` are arrow generics.
    fn jsx_starts(&self) -> bool {
        if self.recent[0].ends_expression() {
            return false;
        }
        let b = self.b;
        match b.get(self.pos + 1) {
            Some(b'>') => true,
            Some(&c) if is_ident_start(c) => {
                let next = skip_blanks(b, ident_end(b, self.pos + 1));
                b.get(next) != Some(&b',') && !b[next..].starts_with(b"extends ")
            }
            _ => false,
        }
    }

    /// Copies element text verbatim up to the next tag or expression container.
    fn jsx_text(&mut self) {
        let b = self.b;
        let c = b[self.pos];
        match c {
            b'<' | b'{' => {
                let closing = b.get(self.pos + 1) == Some(&b'/');
                if let Some(scope) = self.jsx.last_mut() {
                    if c == b'<' {
                        scope.tag = Some(closing);
                    } else {
                        scope.braces += 1;
                    }
                }
                self.copy_to(self.pos + 1);
                self.push(Tok::Punct(c));
            }
            _ => {
                let end = b[self.pos..]
                    .iter()
                    .position(|&ch| ch == b'<' || ch == b'{')
                    .map_or(b.len(), |off| self.pos + off);
                self.copy_to(end);
            }
        }
    }

    fn close_tag(&mut self) {
        let self_closing = self.out.trim_end().ends_with('/');
        self.copy_to(self.pos + 1);
        self.push(Tok::Punct(b'>'));

        let Some(scope) = self.jsx.last_mut() else {
            return;
        };
        match scope.tag.take() {
            Some(true) => scope.open = scope.open.saturating_sub(1),
            Some(false) if !self_closing => scope.open += 1,
            _ => {}
        }
        if scope.open == 0 {
            self.jsx.pop();
        }
    }

    fn word(&mut self) {
        let src = self.src;
        let start = self.pos;
        let end = ident_end(self.b, start);
        let word = &src[start..end];

        if word == "as" && self.recent[0].ends_expression() {
            if let Some(stop) = self.cast_end(end) {
                let trimmed = self.out.trim_end_matches([' ', '\t']).len();
                self.out.truncate(trimmed);
                self.pos = stop;
                return;
            }
        }

        self.copy_to(end);
        self.push(Tok::Word(word));

        match word {
            "const" | "let" | "var" => self.declarator(),
            _ if !is_keyword(word) && self.b.get(end) == Some(&b'<') => self.call_generics(),
            _ => {}
        }
    }

    /// `const name: Type = ...` / `let [a, b]: [A, B] = ...`
    fn declarator(&mut self) {
        let src = self.src;
        let b = self.b;
        let start = self.pos;
        let i = skip_blanks(b, start);
        if i == start {
            return;
        }

        let (pattern_end, tok) = match b.get(i) {
            Some(&c) if is_ident_start(c) => {
                let e = ident_end(b, i);
                (e, Tok::Word(&src[i..e]))
            }
            Some(&c @ (b'{' | b'[')) => match find_matching(b, i) {
                Some(close) => (close + 1, Tok::Punct(if c == b'{' { b'}' } else { b']' })),
                None => return,
            },
            _ => return,
        };

        let j = skip_blanks(b, pattern_end);
        let colon = match b.get(j) {
            Some(b':') => j,
            Some(b'!') if b.get(j + 1) == Some(&b':') => j + 1,
            _ => return,
        };

        let end = scan_type(b, colon + 1, TypeContext::Var);
        self.copy_to(pattern_end);
        self.push(tok);
        self.pos = end;
        if b.get(end) == Some(&b'=') {
            self.out.push(' ');
        }
    }

    /// `useState<T>(` becomes `useState(`.
    fn call_generics(&mut self) {
        let b = self.b;
        let start = self.pos;
        let mut depth = 0usize;
        let mut i = start;
        while i < b.len() {
            match b[i] {
                b'<' | b'(' | b'[' | b'{' => depth += 1,
                b'>' | b')' | b']' | b'}' => {
                    let Some(d) = depth.checked_sub(1) else {
                        return;
                    };
                    depth = d;
                    if depth == 0 {
                        break;
                    }
                }
                b'=' if b.get(i + 1) == Some(&b'>') => {
                    i += 2;
                    continue;
                }
                b'\'' | b'"' => {
                    i = skip_string(b, i);
                    continue;
                }
                b'\n' | b';' | b'/' => return,
                _ => {}
            }
            i += 1;
        }

        if b.get(i) == Some(&b'>') && b.get(i + 1) == Some(&b'(') {
            self.pos = i + 1;
        }
    }

    fn cast_end(&self, after_as: usize) -> Option<usize> {
        let b = self.b;
        let i = skip_blanks(b, after_as);
        if i == after_as {
            return None;
        }

        let first = *b.get(i)?;
        let typeish = if is_ident_start(first) {
            let w = &self.src[i..ident_end(b, i)];
            first.is_ascii_uppercase() || CAST_PRIMITIVES.contains(&w)
        } else {
            matches!(first, b'{' | b'[')
        };
        if !typeish {
            return None;
        }

        let end = scan_type(b, i, TypeContext::Cast);
        let span = &self.src[i..end];
        if span.contains("</") || span.contains("/>") {
            return None;
        }
        match b.get(end) {
            None
            | Some(b')' | b';' | b',' | b']' | b'}' | b'\n' | b'\r' | b'=' | b'?' | b':') => {
                Some(end)
            }
            _ => None,
        }
    }

    fn paren(&mut self) {
        let b = self.b;
        let open = self.pos;

        let declared = match self.recent {
            [Tok::Word("function" | "catch"), _] => true,
            [Tok::Word(w), Tok::Word("function")] => !is_keyword(w),
            _ => false,
        };

        let Some(close) = find_matching(b, open) else {
            self.copy_to(open + 1);
            self.push(Tok::Punct(b'('));
            return;
        };

        let after = skip_ws(b, close + 1);
        let context = if declared {
            Some(TypeContext::FnReturn)
        } else if b[after..].starts_with(b"=>") {
            Some(TypeContext::ArrowReturn)
        } else if b.get(after) == Some(&b':') && b.get(after + 1) != Some(&b':') {
            let end = scan_type(b, after + 1, TypeContext::ArrowReturn);
            b[end..]
                .starts_with(b"=>")
                .then_some(TypeContext::ArrowReturn)
        } else if b.get(after) == Some(&b'{')
            && matches!(self.recent[0], Tok::Word(w) if !is_keyword(w))
        {
            // Method shorthand.
            Some(TypeContext::FnReturn)
        } else {
            None
        };

        let Some(context) = context else {
            self.copy_to(open + 1);
            self.push(Tok::Punct(b'('));
            return;
        };

        self.out.push('(');
        self.out.push_str(&strip_params(&self.src[open + 1..close]));
        self.out.push(')');
        self.pos = close + 1;
        self.push(Tok::Punct(b')'));

        let after = skip_ws(b, self.pos);
        if b.get(after) != Some(&b':') {
            return;
        }
        let end = scan_type(b, after + 1, context);
        let body_follows = match context {
            TypeContext::ArrowReturn => b[end..].starts_with(b"=>"),
            _ => b.get(end) == Some(&b'{'),
        };
        if body_follows {
            self.out.push(' ');
            self.pos = end;
        }
    }

    fn bang(&mut self) {
        let b = self.b;
        let tight = self.pos > 0 && !b[self.pos - 1].is_ascii_whitespace();
        let next = b.get(self.pos + 1).copied();
        if tight
            && self.recent[0].ends_expression()
            && matches!(next, Some(b'.' | b')' | b',' | b';' | b'['))
        {
            self.pos += 1;
            return;
        }
        self.copy_to(self.pos + 1);
        self.push(Tok::Punct(b'!'));
    }
}

/// Strips annotations from the text between a parameter list's parentheses.
fn strip_params(inner: &str) -> String {
    let b = inner.as_bytes();
    let mut out = String::with_capacity(inner.len());
    let mut pos = 0;

    while pos < b.len() {
        let (seg_end, stop) = scan_binding(b, pos);
        let name = &inner[pos..seg_end];
        match stop {
            Some(b':') => {
                let trimmed = name.trim_end();
                out.push_str(trimmed.strip_suffix('?').unwrap_or(trimmed));
                let end = scan_type(b, seg_end + 1, TypeContext::Param);
                if b.get(end) == Some(&b'=') {
                    out.push(' ');
                }
                pos = end;
            }
            Some(b'=') => {
                out.push_str(name);
                let end = scan_default(b, seg_end);
                out.push_str(&strip_annotations(&inner[seg_end..end]));
                pos = end;
            }
            Some(b',') => {
                out.push_str(strip_optional_marker(name));
                out.push(',');
                pos = seg_end + 1;
            }
            _ => {
                out.push_str(strip_optional_marker(name));
                pos = b.len();
            }
        }
    }

    out
}

fn strip_optional_marker(name: &str) -> &str {
    let trimmed = name.trim_end();
    match trimmed.strip_suffix('?') {
        Some(bare) => bare,
        None => name,
    }
}

/// Scans a binding pattern up to a top-level `:`, `,` or `=`.
fn scan_binding(b: &[u8], from: usize) -> (usize, Option<u8>) {
    let mut depth = 0usize;
    let mut i = from;
    while i < b.len() {
        let c = b[i];
        match c {
            b'\'' | b'"' | b'`' => {
                i = skip_string(b, i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b':' | b',' | b'=' if depth == 0 => return (i, Some(c)),
            _ => {}
        }
        i += 1;
    }
    (b.len(), None)
}

/// Scans a default value up to the next top-level `,`.
fn scan_default(b: &[u8], from: usize) -> usize {
    let mut depth = 0usize;
    let mut i = from;
    while i < b.len() {
        match b[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(b, i);
                continue;
            }
            b'/' if matches!(b.get(i + 1), Some(b'/' | b'*')) => {
                i = skip_comment(b, i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => return i,
            _ => {}
        }
        i += 1;
    }
    b.len()
}

/// Index of the byte that ends the type starting at `start`.
fn scan_type(b: &[u8], start: usize, ctx: TypeContext) -> usize {
    let mut depth = 0usize;
    let mut last: Option<u8> = None;
    let mut i = start;

    while i < b.len() {
        let c = b[i];
        if matches!(c, b'\'' | b'"' | b'`') {
            i = skip_string(b, i);
            last = Some(b'"');
            continue;
        }
        if c == b'=' && b.get(i + 1) == Some(&b'>') {
            if depth == 0 && ctx == TypeContext::ArrowReturn {
                return i;
            }
            i += 2;
            last = Some(b'>');
            continue;
        }
        if depth == 0 && ends_type(b, i, ctx, last) {
            return i;
        }
        match c {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            _ => {}
        }
        if !c.is_ascii_whitespace() {
            last = Some(c);
        }
        i += 1;
    }
    b.len()
}

fn ends_type(b: &[u8], i: usize, ctx: TypeContext, last: Option<u8>) -> bool {
    let c = b[i];
    let incomplete = matches!(
        last,
        None | Some(b'|' | b'&' | b':' | b',' | b'<' | b'=' | b'?')
    );
    let line_break = c == b'\n' && !incomplete && !continues_on_next_line(b, i);

    match ctx {
        TypeContext::Param => matches!(c, b',' | b'='),
        TypeContext::Var | TypeContext::Alias => matches!(c, b'=' | b';') || line_break,
        TypeContext::FnReturn => c == b';' || (c == b'{' && !incomplete),
        TypeContext::ArrowReturn => {
            matches!(c, b';' | b',') || (c == b'{' && !incomplete) || line_break
        }
        TypeContext::Cast => {
            matches!(c, b';' | b',' | b'=' | b'?' | b':' | b'\n')
        }
    }
}

fn continues_on_next_line(b: &[u8], i: usize) -> bool {
    matches!(b.get(skip_ws(b, i)), Some(b'|' | b'&'))
}

fn find_matching(b: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < b.len() {
        match b[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(b, i);
                continue;
            }
            b'/' if matches!(b.get(i + 1), Some(b'/' | b'*')) => {
                i = skip_comment(b, i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index just past the string literal opening at `start`. Quote strings stop at a line break.
fn skip_string(b: &[u8], start: usize) -> usize {
    let quote = b[start];
    let mut i = start + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            b'\n' if quote != b'`' => return i,
            _ => i += 1,
        }
    }
    b.len()
}

fn skip_comment(b: &[u8], start: usize) -> usize {
    if b.get(start + 1) == Some(&b'/') {
        return b[start..]
            .iter()
            .position(|c| *c == b'\n')
            .map_or(b.len(), |off| start + off);
    }
    let mut i = start + 2;
    while i + 1 < b.len() {
        if b[i] == b'*' && b[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    b.len()
}

fn skip_ws(b: &[u8], mut i: usize) -> usize {
    while i < b.len() && b[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn skip_blanks(b: &[u8], mut i: usize) -> usize {
    while matches!(b.get(i), Some(b' ' | b'\t')) {
        i += 1;
    }
    i
}

fn ident_end(b: &[u8], mut i: usize) -> usize {
    while i < b.len() && is_ident_char(b[i]) {
        i += 1;
    }
    i
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/preview/typestrip.rs"]
mod tests;
