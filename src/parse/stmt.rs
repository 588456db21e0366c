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

// Statement recognition and emission. Control flow compiles with forward
// jumps whose placeholder targets are overwritten once the destination
// offset is known; unrecognized keywords degrade to a best-effort skip.

use super::Parser;
use crate::casm::{Op, SYS_ABORT};
use crate::token::TokenKind;

impl Parser {
    pub(super) fn parse_statement(&mut self) {
        let t = match self.bump() {
            Some(t) => t,
            None => return,
        };

        if t.kind == TokenKind::Keyword {
            match t.text.as_str() {
                "if" => self.parse_if(),
                "for" => self.parse_for(),
                "try" => self.parse_try(),
                "return" => {
                    self.parse_expression(0);
                    self.code.op(Op::Ret);
                    self.eat(TokenKind::Semicolon);
                }
                "raise" | "throw" => {
                    self.parse_expression(0);
                    self.code.op(Op::Raise);
                    self.eat(TokenKind::Semicolon);
                }
                "yield" => {
                    self.parse_expression(0);
                    self.eat(TokenKind::Semicolon);
                }
                "pass" => {
                    self.eat(TokenKind::Semicolon);
                }
                "del" | "global" | "nonlocal" => self.skip_to_semicolon(),
                "with" => {
                    while !self.eof() && !self.at(TokenKind::Colon) {
                        self.bump();
                    }
                    self.eat(TokenKind::Colon);
                    self.parse_block();
                }
                "assert" => self.parse_assert(),
                // break/continue/switch/case/default/do/lambda/async/await/
                // match/goto and every other keyword: skip to the next ; or
                // :, and a trailing : still opens a block.
                other => {
                    self.trace(&format!("skip '{}' statement at line {}", other, t.line));
                    while !self.eof() && !self.at(TokenKind::Semicolon) && !self.at(TokenKind::Colon) {
                        self.bump();
                    }
                    if self.eat(TokenKind::Colon) {
                        self.parse_block();
                    } else {
                        self.eat(TokenKind::Semicolon);
                    }
                }
            }
            return;
        }

        // Not a keyword: a recognized type starts a declaration, anything
        // else is an expression statement.
        self.pos -= 1;
        if self.types.contains_key(self.text()) {
            self.parse_declaration();
            return;
        }
        self.parse_expression(0);
        self.eat(TokenKind::Semicolon);
    }

    fn parse_if(&mut self) {
        self.eat(TokenKind::LParen);
        self.parse_expression(0);
        self.eat(TokenKind::RParen);
        self.eat(TokenKind::Colon);
        let mut pending_jz = Some(self.code.jump_placeholder(Op::Jz));
        self.parse_block();

        // Terminal jumps of completed arms all land on the end of the
        // whole construct.
        let mut terminals: Vec<usize> = Vec::new();
        loop {
            if self.at_text("elif") {
                self.bump();
                terminals.push(self.code.jump_placeholder(Op::Jmp));
                let arm_start = self.code.len() as i32;
                if let Some(p) = pending_jz.take() {
                    self.code.patch_int(p, arm_start);
                }
                self.eat(TokenKind::LParen);
                self.parse_expression(0);
                self.eat(TokenKind::RParen);
                self.eat(TokenKind::Colon);
                pending_jz = Some(self.code.jump_placeholder(Op::Jz));
                self.parse_block();
            } else if self.at_text("else") {
                self.bump();
                self.eat(TokenKind::Colon);
                terminals.push(self.code.jump_placeholder(Op::Jmp));
                let arm_start = self.code.len() as i32;
                if let Some(p) = pending_jz.take() {
                    self.code.patch_int(p, arm_start);
                }
                self.parse_block();
                break;
            } else {
                break;
            }
        }

        let end = self.code.len() as i32;
        if let Some(p) = pending_jz {
            self.code.patch_int(p, end);
        }
        for t in terminals {
            self.code.patch_int(t, end);
        }
    }

    fn parse_for(&mut self) {
        self.eat(TokenKind::LParen);
        let var = match self.bump() {
            Some(t) => t.text,
            None => return,
        };
        if self.at_text("in") {
            self.bump();
        }
        self.parse_expression(0); // iterable
        self.eat(TokenKind::RParen);
        self.eat(TokenKind::Colon);

        let loop_top = self.code.len();
        let exit_patch = self.code.jump_placeholder(Op::ForIter);
        let mangled = self.mangle(&var);
        self.code.op(Op::Store);
        self.code.name(&mangled);

        self.parse_block();
        self.code.jump_to(Op::Jmp, loop_top as i32);
        let after_loop = self.code.len() as i32;
        self.code.patch_int(exit_patch, after_loop);
    }

    fn parse_try(&mut self) {
        self.eat(TokenKind::Colon);
        let handler_patch = self.code.jump_placeholder(Op::TryEnter);
        self.parse_block();
        self.code.op(Op::TryExit);
        let skip_patch = self.code.jump_placeholder(Op::Jmp);

        let handler_start = self.code.len() as i32;
        self.code.patch_int(handler_patch, handler_start);
        if self.at_text("except") || self.at_text("catch") {
            self.bump();
            self.skip_parenthesized();
            // exception names / `as` bindings are discarded
            while !self.eof()
                && !matches!(
                    self.kind(),
                    TokenKind::Colon | TokenKind::LBrace | TokenKind::Indent | TokenKind::Semicolon
                )
            {
                self.bump();
            }
            if self.eat(TokenKind::Colon) {
                self.parse_block();
            } else if self.at(TokenKind::LBrace) || self.at(TokenKind::Indent) {
                self.parse_block();
            } else {
                self.eat(TokenKind::Semicolon);
            }
        }

        let after_handler = self.code.len() as i32;
        self.code.patch_int(skip_patch, after_handler);
    }

    /// `assert cond[, msg]` compiles to a JZ into the abort trap; when the
    /// condition holds, the message expression (if any) evaluates on the
    /// fall-through path ahead of the trap.
    fn parse_assert(&mut self) {
        self.parse_expression(0);
        let fail_patch = self.code.jump_placeholder(Op::Jz);
        if self.eat(TokenKind::Comma) {
            self.parse_expression(0); // evaluated, discarded
        }
        let abort_at = self.code.len() as i32;
        self.code.push_int(1);
        self.code.syscall(SYS_ABORT);
        self.code.patch_int(fail_patch, abort_at);
        self.eat(TokenKind::Semicolon);
    }
}
