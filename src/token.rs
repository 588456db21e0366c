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

/// One lexical unit. The raw text is kept on every token: the parser
/// recognizes keywords, declaration modifiers, and type names by value,
/// which is what lets three dialects share a single token stream.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Integer,
    Str,

    // f-string pieces
    FStringPart,
    LBraceExp,
    RBraceExp,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    ShlEq,
    ShrEq,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpAmp,
    PipePipe,
    Not,
    Amp,
    Pipe,
    Caret,
    Tilde,
    AmpEq,
    PipeEq,
    CaretEq,
    Walrus, // :=
    Arrow,  // ->
    Dot,

    // Structural
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,

    // Layout (indentation mode)
    Indent,
    Dedent,

    Eof,
    Unknown,
}

/// Reserved words across all three dialects. Every entry lexes as
/// `TokenKind::Keyword`; the parser decides what (if anything) to do with it.
const KEYWORDS: &[&str] = &[
    // C/C++ core
    "int", "if", "else", "while", "def", "return", "class", "import", "using", "namespace",
    "static", "void", "public", "for", "in", "try", "except", "finally", "as", "raise",
    "continue", "True", "False", "None", "private", "protected", "typedef", "struct", "union",
    "enum", "bool", "true", "false",
    // C++ keywords
    "alignas", "alignof", "asm", "auto", "break", "case", "catch", "char", "char8_t",
    "char16_t", "char32_t", "concept", "const", "consteval", "constexpr", "constinit",
    "const_cast", "co_await", "co_return", "co_yield", "decltype", "default", "delete", "do",
    "double", "dynamic_cast", "explicit", "export", "extern", "float", "friend", "goto",
    "inline", "long", "module", "mutable", "new", "noexcept", "nullptr", "operator",
    "register", "reinterpret_cast", "requires", "short", "signed", "sizeof", "static_assert",
    "static_cast", "switch", "template", "this", "thread_local", "throw", "typeid",
    "typename", "unsigned", "virtual", "volatile", "wchar_t",
    // C11 / C23
    "_Alignas", "_Alignof", "_Atomic", "_Bool", "_Complex", "_Generic", "_Imaginary",
    "_Noreturn", "_Static_assert", "_Thread_local", "restrict", "typeof", "typeof_unqual",
    // Python
    "pass", "del", "global", "nonlocal", "lambda", "with", "yield", "async", "await", "from",
    "elif", "is", "assert", "match",
    // Synthetic markers inserted by the preprocessor
    "__module__", "__endmodule__",
];

/// Alternative operator spellings resolve straight to operator tokens, so
/// the parser never has to branch on them.
const ALT_SPELLINGS: &[(&str, TokenKind)] = &[
    ("and", TokenKind::AmpAmp),
    ("or", TokenKind::PipePipe),
    ("not", TokenKind::Not),
    ("not_eq", TokenKind::NotEq),
    ("bitand", TokenKind::Amp),
    ("bitor", TokenKind::Pipe),
    ("compl", TokenKind::Tilde),
    ("xor", TokenKind::Caret),
    ("and_eq", TokenKind::AmpEq),
    ("or_eq", TokenKind::PipeEq),
    ("xor_eq", TokenKind::CaretEq),
];

/// Classify an identifier-shaped word: an alternative operator spelling, a
/// reserved word, or a plain identifier.
pub fn classify_word(word: &str) -> TokenKind {
    for (spelling, kind) in ALT_SPELLINGS {
        if *spelling == word {
            return *kind;
        }
    }
    if KEYWORDS.contains(&word) {
        return TokenKind::Keyword;
    }
    TokenKind::Identifier
}
