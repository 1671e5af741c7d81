//! DIMACS CNF text codec: parses the `p cnf <vars> <clauses>` format into a
//! `Formula`, maintaining a forward/backward variable substitution table so
//! sparse or out-of-order external ids still produce a dense internal `Var`
//! range, and writes a solved model back out in terms of the caller's
//! original ids. Transparently decompresses a gzip-wrapped stream by
//! probing the same bytes as both a gzip and a plain reader.

use std::collections::{HashMap, HashSet};
use std::io::{self, Read, Write};
use std::path::Path;
use std::{fs, str};

use flate2::read::GzDecoder;

use crate::error::SolverError;
use crate::sat::formula::{Formula, Lit, Match, Trit, Var};

/// Variable ids the caller used, in internal `Var` order; `backward[v.index()]`
/// is the external id that was mapped to `v`.
pub type BackwardSubst = Vec<i32>;

pub fn parse_file<P: AsRef<Path>>(path: P, strict: bool) -> Result<(Formula, BackwardSubst), SolverError> {
    let open = || fs::File::open(&path).map(io::BufReader::new);
    match parse(&mut GzDecoder::new(open()?), strict) {
        Ok(result) => Ok(result),
        Err(_) => parse(&mut open()?, strict),
    }
}

pub fn parse<R: Read>(stream: &mut R, strict: bool) -> Result<(Formula, BackwardSubst), SolverError> {
    let mut subst = Subst::new();
    let mut raw_clauses: Vec<Vec<i32>> = Vec::new();
    DimacsParser::parse(stream, strict, |cl| raw_clauses.push(cl))?;

    let mut formula = Formula::new(subst.len_after(&raw_clauses));
    for raw in raw_clauses {
        let clause: Vec<Lit> = raw.iter().map(|&id| subst.lit_of(id)).collect();
        formula.add_clause(clause)?;
    }
    Ok((formula, subst.backward))
}

pub fn write<W: Write>(stream: &mut W, formula: &Formula) -> io::Result<()> {
    writeln!(stream, "p cnf {} {}", formula.variable_count, formula.n_clauses())?;
    for clause in &formula.clauses {
        for lit in clause {
            write!(stream, "{} ", lit.get())?;
        }
        writeln!(stream, "0")?;
    }
    Ok(())
}

pub fn write_model<W: Write>(stream: &mut W, backward_subst: &BackwardSubst, model: &Match) -> io::Result<()> {
    for (i, &value) in model.values.iter().enumerate() {
        if value == Trit::Unassigned {
            continue;
        }
        let var_id = backward_subst[i];
        write!(stream, "{} ", if value == Trit::True { var_id } else { -var_id })?;
    }
    writeln!(stream, "0")
}

/// Checks a written model against the original DIMACS text directly, as a
/// self-check independent of the in-memory `Formula` used to solve it.
pub fn validate_model_file<P: AsRef<Path>>(path: P, backward_subst: &BackwardSubst, model: &Match) -> Result<bool, SolverError> {
    let open = || fs::File::open(&path).map(io::BufReader::new);
    match validate_model(&mut GzDecoder::new(open()?), backward_subst, model) {
        Ok(result) => Ok(result),
        Err(_) => validate_model(&mut open()?, backward_subst, model),
    }
}

pub fn validate_model<R: Read>(stream: &mut R, backward_subst: &BackwardSubst, model: &Match) -> Result<bool, SolverError> {
    let mut lits = HashSet::new();
    for (i, &value) in model.values.iter().enumerate() {
        if value == Trit::Unassigned {
            continue;
        }
        let var_id = backward_subst[i];
        lits.insert(if value == Trit::True { var_id } else { -var_id });
    }

    let mut ok = true;
    DimacsParser::parse(stream, false, |cl| {
        if !cl.iter().any(|lit| lits.contains(lit)) {
            ok = false;
        }
    })?;
    Ok(ok)
}

/// Maps sparse/out-of-order external ids to dense, 0-indexed internal `Var`s
/// in order of first appearance.
struct Subst {
    forward: HashMap<i32, Var>,
    backward: BackwardSubst,
}

impl Subst {
    fn new() -> Self {
        Subst { forward: HashMap::new(), backward: Vec::new() }
    }

    fn lit_of(&mut self, id: i32) -> Lit {
        let var = self.var_of(id.abs());
        if id < 0 {
            var.neg_lit()
        } else {
            var.pos_lit()
        }
    }

    fn var_of(&mut self, external_id: i32) -> Var {
        if let Some(&v) = self.forward.get(&external_id) {
            return v;
        }
        let v = Var::from_index(self.backward.len());
        self.forward.insert(external_id, v);
        self.backward.push(external_id);
        v
    }

    /// Every id seen in `raw_clauses` is reflected in `forward`/`backward`
    /// only once the clauses are actually translated; callers need the
    /// final variable count before building the formula, so this walks the
    /// raw ids once up front without mutating the table twice.
    fn len_after(&mut self, raw_clauses: &[Vec<i32>]) -> usize {
        for clause in raw_clauses {
            for &id in clause {
                self.var_of(id.abs());
            }
        }
        self.backward.len()
    }
}

/// A hand-rolled char-stream parser for the DIMACS grammar: `c` comment
/// lines, one `p cnf <vars> <clauses>` header, then clauses as
/// whitespace/newline-separated signed integers terminated by `0`.
struct DimacsParser<'p> {
    reader: str::Chars<'p>,
    cur: Option<char>,
    vars_seen: HashSet<i32>,
    clauses_seen: usize,
}

impl<'p> DimacsParser<'p> {
    fn parse<R: Read, F: FnMut(Vec<i32>)>(reader: &mut R, strict: bool, clause: F) -> Result<(), SolverError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;

        let mut p = DimacsParser { reader: buf.chars(), cur: None, vars_seen: HashSet::new(), clauses_seen: 0 };
        p.advance();
        p.run(strict, clause)
    }

    fn run<F: FnMut(Vec<i32>)>(&mut self, strict: bool, mut clause: F) -> Result<(), SolverError> {
        self.skip_whitespace();
        while self.cur == Some('c') {
            self.skip_line();
            self.skip_whitespace();
        }
        self.consume("p cnf")?;
        let declared_vars = self.next_uint()?;
        let declared_clauses = self.next_uint()?;

        loop {
            self.skip_whitespace();
            match self.cur {
                Some('c') => self.skip_line(),
                None => break,
                _ => {
                    let c = self.parse_clause()?;
                    clause(c);
                }
            }
        }

        if strict {
            if declared_clauses != self.clauses_seen {
                return Err(SolverError::MalformedFormula {
                    reason: format!(
                        "DIMACS header declared {} clauses, {} were parsed",
                        declared_clauses, self.clauses_seen
                    ),
                });
            }
            if declared_vars < self.vars_seen.len() {
                return Err(SolverError::MalformedFormula {
                    reason: format!(
                        "DIMACS header declared {} variables, {} were discovered",
                        declared_vars,
                        self.vars_seen.len()
                    ),
                });
            }
        }
        Ok(())
    }

    fn parse_clause(&mut self) -> Result<Vec<i32>, SolverError> {
        let mut lits = Vec::new();
        loop {
            let lit = self.next_int()?;
            if lit == 0 {
                self.clauses_seen += 1;
                return Ok(lits);
            }
            self.vars_seen.insert(lit.abs());
            lits.push(lit);
        }
    }

    fn advance(&mut self) {
        self.cur = self.reader.next();
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cur, Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn skip_line(&mut self) {
        loop {
            match self.cur {
                None => break,
                Some('\n') => {
                    self.advance();
                    break;
                }
                _ => self.advance(),
            }
        }
    }

    fn consume(&mut self, target: &str) -> Result<(), SolverError> {
        for expected in target.chars() {
            match self.cur {
                Some(c) if c == expected => self.advance(),
                _ => {
                    return Err(SolverError::MalformedFormula {
                        reason: format!("expected to find '{}' in DIMACS header", target),
                    });
                }
            }
        }
        Ok(())
    }

    fn read_uint_body(&mut self) -> Result<usize, SolverError> {
        let mut len = 0usize;
        let mut value = 0usize;
        loop {
            match self.cur.and_then(|c| c.to_digit(10)) {
                Some(d) => {
                    value = value * 10 + d as usize;
                    len += 1;
                    self.advance();
                }
                None if len > 0 => return Ok(value),
                None => return Err(SolverError::MalformedFormula { reason: "expected an integer".to_string() }),
            }
        }
    }

    fn next_int(&mut self) -> Result<i32, SolverError> {
        self.skip_whitespace();
        let sign = match self.cur {
            Some('+') => {
                self.advance();
                1
            }
            Some('-') => {
                self.advance();
                -1
            }
            _ => 1,
        };
        let val = self.read_uint_body()?;
        Ok(sign * val as i32)
    }

    fn next_uint(&mut self) -> Result<usize, SolverError> {
        self.skip_whitespace();
        if self.cur == Some('+') {
            self.advance();
        }
        self.read_uint_body()
    }
}
