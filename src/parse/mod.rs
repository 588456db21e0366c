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

// Single-pass parser/emitter. Tokens are consumed left to right and bytes
// are appended to one output buffer; forward references resolve by
// back-patching, never by a second pass. There is no AST.

mod expr;
mod stmt;

use std::collections::HashMap;

use crate::casm::{CodeBuf, Op};
use crate::token::{Token, TokenKind};
use crate::typectx::{self, TypeInfo};

/// Storage-class and qualifier words consumed (and discarded) ahead of a
/// declaration. The parenthesized forms get their argument lists swallowed.
const DECL_MODIFIERS: &[&str] = &[
    "static", "extern", "public", "private", "async", "readonly", "sealed", "typedef",
    "alignas", "alignof", "asm", "auto", "const", "consteval", "constexpr", "constinit",
    "explicit", "export", "inline", "mutable", "register", "thread_local", "virtual",
    "volatile", "template", "typename", "concept", "requires", "noexcept", "friend",
    "restrict", "_Alignas", "_Alignof", "_Atomic", "_Bool", "_Complex", "_Generic",
    "_Imaginary", "_Noreturn", "_Static_assert", "_Thread_local", "typeof", "typeof_unqual",
];

fn is_decl_modifier(word: &str) -> bool {
    DECL_MODIFIERS.contains(&word)
}

pub struct CompiledProgram {
    pub code: Vec<u8>,
    /// Mangled function names mapped to their bytecode entry offsets.
    pub symbols: HashMap<String, usize>,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    code: CodeBuf,
    symbols: HashMap<String, usize>,
    types: HashMap<&'static str, TypeInfo>,
    /// Active `__module__` nesting; each entry ends in `.`.
    module_stack: Vec<String>,
    python_mode: bool,
    verbose: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, python_mode: bool, verbose: bool) -> Self {
        Self {
            tokens,
            pos: 0,
            code: CodeBuf::new(),
            symbols: HashMap::new(),
            types: typectx::builtin_types(),
            module_stack: Vec::new(),
            python_mode,
            verbose,
        }
    }

    pub fn compile(mut self) -> CompiledProgram {
        while !self.eof() {
            self.parse_top_level();
        }
        // The artifact entry point: `main`, or failing that `Main`.
        let entry = if self.symbols.contains_key("main") {
            Some("main")
        } else if self.symbols.contains_key("Main") {
            Some("Main")
        } else {
            None
        };
        if let Some(entry) = entry {
            self.code.op(Op::Call);
            self.code.name(entry);
        }
        self.code.op(Op::Halt);
        CompiledProgram {
            code: self.code.into_bytes(),
            symbols: self.symbols,
        }
    }

    // ---- token cursor -------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn kind(&self) -> TokenKind {
        self.peek().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn text(&self) -> &str {
        self.peek().map(|t| t.text.as_str()).unwrap_or("")
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(t)
    }

    fn eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn at_text(&self, text: &str) -> bool {
        self.text() == text
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_to_semicolon(&mut self) {
        while !self.eof() && !self.at(TokenKind::Semicolon) {
            self.bump();
        }
        self.eat(TokenKind::Semicolon);
    }

    /// Swallow a balanced `( ... )` group if one starts here.
    fn skip_parenthesized(&mut self) {
        if !self.eat(TokenKind::LParen) {
            return;
        }
        let mut depth = 1;
        while depth > 0 && !self.eof() {
            match self.kind() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.bump();
        }
    }

    fn trace(&self, msg: &str) {
        if self.verbose {
            eprintln!("parse: {}", msg);
        }
    }

    /// Prefix a simple name with the innermost module prefix. Dotted names
    /// stay verbatim so cross-module qualified access keeps working.
    fn mangle(&self, name: &str) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        match self.module_stack.last() {
            Some(prefix) => format!("{}{}", prefix, name),
            None => name.to_string(),
        }
    }

    // ---- top level ----------------------------------------------------

    fn parse_top_level(&mut self) {
        if self.eof() {
            return;
        }
        if self.at_text("__module__") {
            self.bump();
            if let Some(t) = self.bump() {
                self.trace(&format!("enter module {}", t.text));
                self.module_stack.push(format!("{}.", t.text));
            }
            return;
        }
        if self.at_text("__endmodule__") {
            self.bump();
            self.trace("leave module");
            self.module_stack.pop();
            self.eat(TokenKind::Semicolon);
            return;
        }

        while !self.eof() {
            let word = self.text().to_string();
            if !is_decl_modifier(&word) {
                break;
            }
            match word.as_str() {
                "alignas" | "alignof" | "_Alignas" | "_Alignof" | "typeof" | "typeof_unqual" => {
                    self.bump();
                    self.skip_parenthesized();
                }
                "static_assert" | "_Static_assert" => {
                    self.bump();
                    self.skip_parenthesized();
                    self.eat(TokenKind::Semicolon);
                }
                _ => {
                    self.bump();
                }
            }
        }
        if self.eof() {
            return;
        }

        let kind = self.kind();
        if kind == TokenKind::Keyword || kind == TokenKind::Identifier {
            let word = self.text().to_string();
            match word.as_str() {
                "using" | "import" | "module" | "export" => {
                    self.bump();
                    self.skip_to_semicolon();
                    return;
                }
                "namespace" | "class" | "struct" | "union" | "enum" => {
                    self.bump();
                    if self.at(TokenKind::Identifier) {
                        self.bump();
                    }
                    if self.eat(TokenKind::LBrace) {
                        while !self.eof() && !self.at(TokenKind::RBrace) {
                            self.parse_top_level();
                        }
                        self.eat(TokenKind::RBrace);
                        self.eat(TokenKind::Semicolon);
                    }
                    return;
                }
                word if word == "def" || self.types.contains_key(word) => {
                    self.parse_declaration();
                    return;
                }
                _ => {}
            }
        }
        self.parse_statement();
    }

    // ---- declarations -------------------------------------------------

    /// Read a (possibly multi-word) type name: a run of scalar specifiers
    /// joined by spaces, or a single keyword/identifier.
    fn parse_type_name(&mut self) -> String {
        let mut name = String::new();
        while !self.eof() && typectx::is_type_specifier(self.text()) {
            if let Some(t) = self.bump() {
                if !name.is_empty() {
                    name.push(' ');
                }
                name.push_str(&t.text);
            }
        }
        if name.is_empty() && matches!(self.kind(), TokenKind::Keyword | TokenKind::Identifier) {
            if let Some(t) = self.bump() {
                name = t.text;
            }
        }
        name
    }

    fn parse_declaration(&mut self) {
        let type_name = self.parse_type_name();
        if type_name.is_empty() {
            return;
        }
        // Declarator decoration: pointer stars and optional markers.
        while self.at(TokenKind::Star) || self.at_text("?") {
            self.bump();
        }
        let name = match self.bump() {
            Some(t) if !t.text.is_empty() => t.text,
            _ => return,
        };
        let sym = self.mangle(&name);

        if self.at(TokenKind::LParen) {
            self.parse_function(&sym);
        } else {
            self.parse_variable(&type_name, &sym);
        }
    }

    fn parse_function(&mut self, sym: &str) {
        self.bump(); // '('
        let params = self.parse_params();
        self.eat(TokenKind::RParen);
        self.eat(TokenKind::Colon);

        // Prologue: reserve the symbol with a STORE of the entry address,
        // then skip the body with a back-patched jump so definitions fall
        // through without executing.
        let entry_place = self.code.len();
        self.code.push_int(0);
        self.code.op(Op::Store);
        self.code.name(sym);
        let skip_patch = self.code.jump_placeholder(Op::Jmp);

        let body_start = self.code.len();
        self.symbols.insert(sym.to_string(), body_start);
        self.code.patch_int(entry_place + 1, body_start as i32);
        self.trace(&format!("fn {} at offset {}", sym, body_start));

        // Arguments arrive on the stack; pop them into their names in
        // reverse declaration order.
        for param in params.iter().rev() {
            let mangled = self.mangle(param);
            self.code.op(Op::Store);
            self.code.name(&mangled);
        }

        self.parse_block();
        self.code.op(Op::Ret);
        let after_body = self.code.len() as i32;
        self.code.patch_int(skip_patch, after_body);
    }

    /// Parameter list: `type [name]` per entry; an entry whose first token
    /// is not a recognized type is an untyped name (Python-style). Unnamed
    /// entries contribute nothing to the prologue pops.
    fn parse_params(&mut self) -> Vec<String> {
        let mut params: Vec<String> = Vec::new();
        while !self.eof() && !self.at(TokenKind::RParen) {
            if typectx::is_type_specifier(self.text()) || self.types.contains_key(self.text()) {
                let _ = self.parse_type_name();
                while self.at(TokenKind::Star) {
                    self.bump();
                }
                if self.at(TokenKind::Identifier) {
                    if let Some(t) = self.bump() {
                        params.push(t.text);
                    }
                }
            } else if self.at(TokenKind::Identifier) {
                if let Some(t) = self.bump() {
                    params.push(t.text);
                }
            } else {
                self.bump();
                continue;
            }
            if !self.eat(TokenKind::Comma) && !self.at(TokenKind::RParen) {
                // default values and other decoration
                while !self.eof() && !self.at(TokenKind::Comma) && !self.at(TokenKind::RParen) {
                    self.bump();
                }
                self.eat(TokenKind::Comma);
            }
        }
        params
    }

    fn parse_variable(&mut self, type_name: &str, sym: &str) {
        if self.eat(TokenKind::LBracket) {
            self.eat(TokenKind::RBracket);
        }
        if self.eat(TokenKind::Eq) {
            if self.eat(TokenKind::LBrace) {
                // Brace-initialized aggregate: each element stores under
                // NAME.FIELD from the type's field list, or NAME[index]
                // once the fields run out.
                let fields: &'static [(&'static str, i32)] = self
                    .types
                    .get(type_name)
                    .map(|t| t.fields)
                    .unwrap_or(&[]);
                let mut index = 0usize;
                while !self.eof() && !self.at(TokenKind::RBrace) {
                    self.parse_expression(0);
                    let slot = match fields.get(index) {
                        Some((field, _offset)) => format!("{}.{}", sym, field),
                        None => format!("{}[{}]", sym, index),
                    };
                    self.code.op(Op::Store);
                    self.code.name(&slot);
                    index += 1;
                    self.eat(TokenKind::Comma);
                }
                self.eat(TokenKind::RBrace);
            } else {
                self.parse_expression(0);
                self.code.op(Op::Store);
                self.code.name(sym);
            }
        }
        self.eat(TokenKind::Semicolon);
    }

    // ---- blocks -------------------------------------------------------

    /// A block opens with INDENT or `{` and closes with the matching DEDENT
    /// or `}`. Absent either, a single item serves as the block.
    fn parse_block(&mut self) {
        let end = if self.at(TokenKind::Indent) {
            TokenKind::Dedent
        } else if self.at(TokenKind::LBrace) {
            TokenKind::RBrace
        } else {
            self.parse_top_level();
            return;
        };
        self.bump();
        while !self.eof() && !self.at(end) {
            self.parse_top_level();
        }
        self.eat(end);
    }
}
