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

// Compilation orchestration. The pipeline is strictly sequential:
// preprocessor -> lexer -> fused parser/emitter -> artifact bytes. Only the
// two I/O edges can fail; everything between is best-effort lowering.

use std::path::{Path, PathBuf};

use crate::casm;
use crate::error::SoulError;
use crate::lex;
use crate::parse::{CompiledProgram, Parser};
use crate::preprocess::Preprocessor;

pub struct CompileOptions {
    pub include_paths: Vec<PathBuf>,
    pub python_mode: bool,
    pub verbose: bool,
}

/// Default lexer mode heuristic: indentation mode when the input path
/// mentions a Python-flavored extension, brace mode otherwise.
pub fn python_mode_for_path(path: &Path) -> bool {
    let s = path.to_string_lossy();
    s.contains(".py") || s.contains(".soul")
}

pub fn compile_source(source: &str, current_dir: &Path, opts: &CompileOptions) -> CompiledProgram {
    let expanded = Preprocessor::new(opts.include_paths.clone()).expand(source, current_dir);
    let tokens = lex::lex(&expanded, opts.python_mode, opts.verbose);
    Parser::new(tokens, opts.python_mode, opts.verbose).compile()
}

pub fn compile_file(input: &Path, opts: &CompileOptions) -> Result<CompiledProgram, SoulError> {
    let source = std::fs::read_to_string(input).map_err(|e| SoulError::ReadInput {
        path: input.to_path_buf(),
        source: e,
    })?;
    let current_dir = input.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
    Ok(compile_source(&source, &current_dir, opts))
}

/// Write the artifact: the literal `CASM` tag followed by the raw bytecode.
pub fn write_artifact_file(out: &Path, code: &[u8]) -> Result<(), SoulError> {
    let mut f = std::fs::File::create(out).map_err(|e| SoulError::WriteArtifact {
        path: out.to_path_buf(),
        source: e,
    })?;
    casm::write_artifact(&mut f, code).map_err(|e| SoulError::WriteArtifact {
        path: out.to_path_buf(),
        source: e,
    })
}
