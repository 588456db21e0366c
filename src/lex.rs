/**
 * Copyright 2022 - Jahred Love
 *
 * Redistribution and use in source and binary forms, with or without modification,
 * are permitted provided that the following conditions are met:
 *
 * 1. Redistributions of source code must retain the above copyright notice, this
 * list of conditions and the following disclaimer.
 *
 * 2. Redistributions in binary form must reproduce the above copyright notice, this
 * list of conditions and the following disclaimer in the documentation and/or other
 * materials provided with the distribution.
 *
 * 3. Neither the name of the copyright holder nor the names of its contributors may
 * be used to endorse or promote products derived from this software without specific
 * prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS “AS IS” AND
 * ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED
 * WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED.
 * IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT,
 * INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT
 * NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
 * PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
 * WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
 * ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
 * POSSIBILITY OF SUCH DAMAGE.
 */

// Stateful character-stream tokenizer with two layout modes. In Python mode
// leading whitespace drives INDENT/DEDENT tokens; in brace mode leading
// whitespace is ignored. Interpolated strings are handled by a nested
// sub-tokenizer over the substitution text.

use crate::token::{classify_word, Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a str,
    i: usize,
    line: usize,
    python_mode: bool,
    /// Active indentation levels; bottom is always 0 and never popped.
    indent_stack: Vec<i32>,
    verbose: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, python_mode: bool, verbose: bool) -> Self {
        Self {
            src,
            i: 0,
            line: 1,
            python_mode,
            indent_stack: vec![0],
            verbose,
        }
    }

    fn eof(&self) -> bool {
        self.i >= self.src.len()
    }

    fn peek_char(&self) -> Option<char> {
        if self.eof() {
            return None;
        }
        self.src[self.i..].chars().next()
    }

    fn bump_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.i += ch.len_utf8();
        Some(ch)
    }

    fn rest_starts_with(&self, pat: &str) -> bool {
        self.src.get(self.i..).map(|s| s.starts_with(pat)).unwrap_or(false)
    }

    fn at_line_start(&self) -> bool {
        self.i == 0 || self.src.as_bytes().get(self.i - 1) == Some(&b'\n')
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        while !self.eof() {
            if self.python_mode && self.at_line_start() {
                self.measure_indent(&mut tokens);
                if self.eof() {
                    break;
                }
            }

            let current = match self.peek_char() {
                Some(c) => c,
                None => break,
            };

            if current.is_whitespace() {
                if current == '\n' {
                    self.line += 1;
                }
                self.bump_char();
                continue;
            }

            if current == '#' {
                self.handle_hash(&mut tokens);
                continue;
            }

            if current == '/' && self.rest_starts_with("//") {
                while let Some(c) = self.peek_char() {
                    if c == '\n' {
                        break;
                    }
                    self.bump_char();
                }
                continue;
            }
            if current == '/' && self.rest_starts_with("/*") {
                self.i += 2;
                loop {
                    if self.eof() {
                        break;
                    }
                    if self.rest_starts_with("*/") {
                        self.i += 2;
                        break;
                    }
                    if self.peek_char() == Some('\n') {
                        self.line += 1;
                    }
                    self.bump_char();
                }
                continue;
            }

            if current.is_ascii_digit() {
                tokens.push(self.read_number());
            } else if current == '"' {
                if self.rest_starts_with("\"\"\"") {
                    tokens.push(self.read_triple_string());
                } else {
                    tokens.push(self.read_string());
                }
            } else if current == 'f' && self.src.get(self.i + 1..).map(|s| s.starts_with('"')).unwrap_or(false) {
                self.bump_char(); // 'f'
                self.tokenize_fstring(&mut tokens);
            } else if current.is_ascii_alphabetic() || current == '_' {
                tokens.push(self.read_identifier());
            } else {
                tokens.push(self.read_operator());
            }
        }

        // Close any still-open indentation levels before EOF.
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            if self.verbose {
                eprintln!("lexer: DEDENT at line {} (eof)", self.line);
            }
            tokens.push(Token::new(TokenKind::Dedent, "", self.line));
        }
        tokens.push(Token::new(TokenKind::Eof, "", self.line));
        tokens
    }

    /// Measure the indentation of the line at the cursor (tab = 4 columns,
    /// space = 1) and emit INDENT/DEDENT tokens against the stack.
    fn measure_indent(&mut self, tokens: &mut Vec<Token>) {
        let mut indent: i32 = 0;
        while let Some(c) = self.peek_char() {
            match c {
                '\t' => indent += 4,
                ' ' => indent += 1,
                _ => break,
            }
            self.bump_char();
        }
        let top = *self.indent_stack.last().unwrap_or(&0);
        if indent > top {
            self.indent_stack.push(indent);
            if self.verbose {
                eprintln!("lexer: INDENT {} at line {}", indent, self.line);
            }
            tokens.push(Token::new(TokenKind::Indent, indent.to_string(), self.line));
        } else {
            while indent < *self.indent_stack.last().unwrap_or(&0) {
                self.indent_stack.pop();
                if self.verbose {
                    eprintln!("lexer: DEDENT at line {}", self.line);
                }
                tokens.push(Token::new(TokenKind::Dedent, "", self.line));
            }
        }
    }

    /// `#define` and `#include` lines are consumed whole (the preprocessor
    /// has already inlined real includes). Any other `#word` leaves `#` as
    /// an UNKNOWN token and re-lexes the word normally.
    fn handle_hash(&mut self, tokens: &mut Vec<Token>) {
        let hash_at = self.i;
        self.bump_char(); // '#'
        let word_start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                break;
            }
            self.bump_char();
        }
        let directive = &self.src[word_start..self.i];
        if directive == "define" || directive == "include" {
            while let Some(c) = self.peek_char() {
                if c == '\n' {
                    break;
                }
                self.bump_char();
            }
        } else {
            self.i = hash_at + 1;
            tokens.push(Token::new(TokenKind::Unknown, "#", self.line));
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || c == '.' {
                self.bump_char();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Integer, &self.src[start..self.i], self.line)
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.bump_char();
            } else {
                break;
            }
        }
        let word = &self.src[start..self.i];
        Token::new(classify_word(word), word, self.line)
    }

    fn read_string(&mut self) -> Token {
        self.bump_char(); // opening "
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '"' {
                break;
            }
            self.bump_char();
        }
        let val = self.src[start..self.i].to_string();
        self.bump_char(); // closing "
        Token::new(TokenKind::Str, val, self.line)
    }

    fn read_triple_string(&mut self) -> Token {
        self.i += 3; // opening """
        let start = self.i;
        while !self.eof() && !self.rest_starts_with("\"\"\"") {
            if self.peek_char() == Some('\n') {
                self.line += 1;
            }
            self.bump_char();
        }
        let val = self.src[start..self.i.min(self.src.len())].to_string();
        self.i = (self.i + 3).min(self.src.len()); // closing """
        Token::new(TokenKind::Str, val, self.line)
    }

    /// Tokenize an f-string body into FSTRING_PART / LBRACE_EXP ... RBRACE_EXP
    /// runs. Substitutions are extracted with a brace depth counter and
    /// re-lexed with a nested lexer; nested string literals containing `{`
    /// will miscount, which is the accepted limit of this scheme.
    fn tokenize_fstring(&mut self, tokens: &mut Vec<Token>) {
        self.bump_char(); // opening "
        let mut part = String::new();
        while let Some(c) = self.peek_char() {
            if c == '"' {
                break;
            }
            if c == '{' {
                if !part.is_empty() {
                    tokens.push(Token::new(TokenKind::FStringPart, std::mem::take(&mut part), self.line));
                }
                tokens.push(Token::new(TokenKind::LBraceExp, "{", self.line));
                self.bump_char(); // '{'

                let expr_start = self.i;
                let mut depth = 1;
                while let Some(c2) = self.peek_char() {
                    match c2 {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    self.bump_char();
                }
                let expr = &self.src[expr_start..self.i];
                self.bump_char(); // closing '}'

                let mut inner = Lexer::new(expr, self.python_mode, false).tokenize();
                while matches!(inner.last().map(|t| t.kind), Some(TokenKind::Eof)) {
                    inner.pop();
                }
                tokens.extend(inner);
                tokens.push(Token::new(TokenKind::RBraceExp, "}", self.line));
                continue;
            }
            part.push(c);
            self.bump_char();
        }
        if !part.is_empty() {
            tokens.push(Token::new(TokenKind::FStringPart, part, self.line));
        }
        self.bump_char(); // closing "
    }

    /// Maximal-munch operator recognition; single characters fall back to
    /// their own token, unrecognized characters become UNKNOWN.
    fn read_operator(&mut self) -> Token {
        let line = self.line;
        let current = match self.bump_char() {
            Some(c) => c,
            None => return Token::new(TokenKind::Eof, "", line),
        };

        macro_rules! two {
            ($next:expr, $kind:expr, $text:expr) => {
                if self.peek_char() == Some($next) {
                    self.bump_char();
                    return Token::new($kind, $text, line);
                }
            };
        }

        match current {
            '+' => {
                two!('+', TokenKind::PlusPlus, "++");
                two!('=', TokenKind::PlusEq, "+=");
                Token::new(TokenKind::Plus, "+", line)
            }
            '-' => {
                two!('-', TokenKind::MinusMinus, "--");
                two!('>', TokenKind::Arrow, "->");
                two!('=', TokenKind::MinusEq, "-=");
                Token::new(TokenKind::Minus, "-", line)
            }
            '*' => {
                two!('=', TokenKind::StarEq, "*=");
                Token::new(TokenKind::Star, "*", line)
            }
            '/' => {
                two!('=', TokenKind::SlashEq, "/=");
                Token::new(TokenKind::Slash, "/", line)
            }
            '%' => {
                two!('=', TokenKind::PercentEq, "%=");
                Token::new(TokenKind::Percent, "%", line)
            }
            '<' => {
                if self.peek_char() == Some('<') {
                    self.bump_char();
                    two!('=', TokenKind::ShlEq, "<<=");
                    return Token::new(TokenKind::Shl, "<<", line);
                }
                two!('=', TokenKind::Le, "<=");
                Token::new(TokenKind::Lt, "<", line)
            }
            '>' => {
                if self.peek_char() == Some('>') {
                    self.bump_char();
                    two!('=', TokenKind::ShrEq, ">>=");
                    return Token::new(TokenKind::Shr, ">>", line);
                }
                two!('=', TokenKind::Ge, ">=");
                Token::new(TokenKind::Gt, ">", line)
            }
            '&' => {
                two!('&', TokenKind::AmpAmp, "&&");
                two!('=', TokenKind::AmpEq, "&=");
                Token::new(TokenKind::Amp, "&", line)
            }
            '|' => {
                two!('|', TokenKind::PipePipe, "||");
                two!('=', TokenKind::PipeEq, "|=");
                Token::new(TokenKind::Pipe, "|", line)
            }
            '!' => {
                two!('=', TokenKind::NotEq, "!=");
                Token::new(TokenKind::Not, "!", line)
            }
            '^' => {
                two!('=', TokenKind::CaretEq, "^=");
                Token::new(TokenKind::Caret, "^", line)
            }
            '~' => Token::new(TokenKind::Tilde, "~", line),
            '.' => Token::new(TokenKind::Dot, ".", line),
            '=' => {
                two!('=', TokenKind::EqEq, "==");
                Token::new(TokenKind::Eq, "=", line)
            }
            ':' => {
                two!('=', TokenKind::Walrus, ":=");
                Token::new(TokenKind::Colon, ":", line)
            }
            '(' => Token::new(TokenKind::LParen, "(", line),
            ')' => Token::new(TokenKind::RParen, ")", line),
            '{' => Token::new(TokenKind::LBrace, "{", line),
            '}' => Token::new(TokenKind::RBrace, "}", line),
            '[' => Token::new(TokenKind::LBracket, "[", line),
            ']' => Token::new(TokenKind::RBracket, "]", line),
            ';' => Token::new(TokenKind::Semicolon, ";", line),
            ',' => Token::new(TokenKind::Comma, ",", line),
            other => Token::new(TokenKind::Unknown, other.to_string(), line),
        }
    }
}

/// Lex an entire source string; the result always ends in an EOF token.
pub fn lex(src: &str, python_mode: bool, verbose: bool) -> Vec<Token> {
    Lexer::new(src, python_mode, verbose).tokenize()
}
