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

// Line-oriented textual inlining of import/#include directives across a
// multi-extension search path. Inclusion is idempotent through a seen-set
// keyed by the resolved path; imported modules (but not #includes) are
// bracketed with synthetic __module__/__endmodule__ markers so the parser
// can mangle their names.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Well-known headers and modules assumed intrinsic; their directives expand
/// to nothing.
const STDLIB_NAMES: &[&str] = &[
    "math", "math.h", "cmath",
    "sys", "stdlib.h", "cstdlib",
    "time", "time.h", "ctime",
    "iostream", "stdio.h",
    "vector", "string", "map",
];

/// Package-style roots tried after the caller-supplied include paths.
const PACKAGE_ROOTS: &[&str] = &["packages", "site-packages", "lib", "src", "include"];

/// Candidate file extensions for a module spec without a dot, in resolution
/// order. A spec that already contains a dot is tried verbatim.
const CANDIDATE_SHAPES: &[&str] = &[
    "{}/__init__.soul",
    "{}/__init__.py",
    "{}.soul",
    "{}.py",
    "{}.h",
    "{}.c",
    "{}.cpp",
    "{}.hpp",
    "{}.cc",
    "{}.hh",
    "{}",
];

enum Directive {
    Import(String),
    Include(String),
}

pub struct Preprocessor {
    include_paths: Vec<PathBuf>,
    /// Paths already inlined, for the lifetime of one compilation.
    included: HashSet<String>,
}

impl Preprocessor {
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        Self {
            include_paths,
            included: HashSet::new(),
        }
    }

    /// Expand one source string. `current_dir` is the directory of the file
    /// the source came from; it heads the search order.
    pub fn expand(&mut self, source: &str, current_dir: &Path) -> String {
        let mut result = String::new();
        for line in source.lines() {
            match parse_directive(line) {
                Some(directive) => self.expand_directive(line, directive, current_dir, &mut result),
                None => {
                    result.push_str(line);
                    result.push('\n');
                }
            }
        }
        result
    }

    fn expand_directive(&mut self, line: &str, directive: Directive, current_dir: &Path, result: &mut String) {
        let (module, is_import) = match &directive {
            Directive::Import(m) => (m.as_str(), true),
            Directive::Include(m) => (m.as_str(), false),
        };
        if module.is_empty() || STDLIB_NAMES.contains(&module) {
            return;
        }

        let attempts = candidate_names(module);
        for root in self.search_roots(current_dir) {
            for attempt in &attempts {
                let full = join_root(&root, attempt);
                let key = full.to_string_lossy().into_owned();
                if self.included.contains(&key) {
                    result.push_str(&format!("// Skipped {}\n", key));
                    return;
                }
                let src = match std::fs::read_to_string(&full) {
                    Ok(s) => s,
                    Err(_) => continue,
                };
                self.included.insert(key);
                if is_import {
                    result.push_str(&format!("__module__ {}\n", module));
                    result.push_str(&self.expand(&src, &root));
                    result.push_str("\n__endmodule__\n");
                } else {
                    result.push_str(&self.expand(&src, &root));
                    result.push('\n');
                }
                return;
            }
        }

        // Unresolved: an #include survives as a comment, an import vanishes.
        if !is_import {
            result.push_str(&format!("// {}\n", line));
        }
    }

    fn search_roots(&self, current_dir: &Path) -> Vec<PathBuf> {
        let mut roots = vec![current_dir.to_path_buf(), PathBuf::from(".")];
        roots.extend(self.include_paths.iter().cloned());
        roots.extend(PACKAGE_ROOTS.iter().map(PathBuf::from));
        for var in ["C_INCLUDE_PATH", "SOUL_PACKAGES"] {
            if let Ok(p) = std::env::var(var) {
                if !p.is_empty() {
                    roots.push(PathBuf::from(p));
                }
            }
        }
        roots
    }
}

fn join_root(root: &Path, name: &str) -> PathBuf {
    if root.as_os_str().is_empty() {
        PathBuf::from(name)
    } else {
        root.join(name)
    }
}

fn candidate_names(module: &str) -> Vec<String> {
    if module.contains('.') {
        return vec![module.to_string()];
    }
    CANDIDATE_SHAPES
        .iter()
        .map(|shape| shape.replace("{}", module))
        .collect()
}

/// Recognize a directive on one line. The first non-whitespace content must
/// be `import <spec>`, `from <name> import ...`, or `#include "..."`/`<...>`.
fn parse_directive(line: &str) -> Option<Directive> {
    let trimmed = line.trim_start();

    if let Some(rest) = trimmed.strip_prefix("import ") {
        let mut spec = rest;
        if let Some(at) = spec.find(" as ") {
            spec = &spec[..at];
        }
        return Some(Directive::Import(strip_spec(spec)));
    }

    if let Some(rest) = trimmed.strip_prefix("from ") {
        // `from NAME import ...` takes the segment between from and import.
        if let Some(at) = rest.find(" import") {
            return Some(Directive::Import(strip_spec(&rest[..at])));
        }
        return None;
    }

    if trimmed.starts_with("#include") {
        let start = trimmed.find(|c| c == '"' || c == '<')?;
        let end = trimmed.rfind(|c| c == '"' || c == '>')?;
        if end <= start {
            return None;
        }
        return Some(Directive::Include(strip_spec(&trimmed[start + 1..end])));
    }

    None
}

/// Trailing whitespace and all embedded whitespace are stripped from a spec.
fn strip_spec(spec: &str) -> String {
    spec.chars().filter(|c| !c.is_whitespace()).collect()
}
