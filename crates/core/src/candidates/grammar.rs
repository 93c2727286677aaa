//! Shallow chunk grammar over part-of-speech tags
//!
//! Grammars are written as a cascade of labelled stages, each with one or
//! more tag patterns:
//!
//! ```text
//! NBAR:
//!     {<NOUN|PROPN|ADJ>*<NOUN|PROPN>}
//! NP:
//!     {<NBAR>}
//!     {<NBAR><ADP><NBAR>}
//! ```
//!
//! Stages run in order over the output of the previous stage, so a later
//! pattern can refer to an earlier label. Within a stage the patterns run one
//! after another, and a pattern only sees items that no earlier pattern of
//! the same stage has chunked. Each pattern takes leftmost, greedy,
//! non-overlapping matches. `#` starts a comment.

use crate::error::{KpxError, Result};
use once_cell::sync::Lazy;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Noun-phrase grammar used when none is configured
pub const DEFAULT_GRAMMAR: &str = "
NBAR:
    {<NOUN|PROPN|ADJ>*<NOUN|PROPN>}

NP:
    {<NBAR>}
    {<NBAR><ADP><NBAR>}
";

static DEFAULT_CHUNK_GRAMMAR: Lazy<ChunkGrammar> = Lazy::new(|| {
    DEFAULT_GRAMMAR
        .parse()
        .expect("Failed to parse default chunk grammar")
});

/// Label whose spans become candidate phrases
pub const PHRASE_LABEL: &str = "NP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Quantifier {
    fn bounds(self) -> (usize, Option<usize>) {
        match self {
            Self::One => (1, Some(1)),
            Self::ZeroOrOne => (0, Some(1)),
            Self::ZeroOrMore => (0, None),
            Self::OneOrMore => (1, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TagMatcher {
    Exact(String),
    /// `NN.*` style prefix match
    Prefix(String),
    Any,
}

impl TagMatcher {
    fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(KpxError::validation("Empty tag in grammar pattern"));
        }
        if raw == ".*" {
            return Ok(Self::Any);
        }
        if let Some(prefix) = raw.strip_suffix(".*") {
            return Ok(Self::Prefix(prefix.to_string()));
        }
        if raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Ok(Self::Exact(raw.to_string()));
        }
        Err(KpxError::validation(format!(
            "Unsupported tag expression in grammar: <{}>",
            raw
        )))
    }

    fn matches(&self, label: &str) -> bool {
        match self {
            Self::Exact(tag) => tag == label,
            Self::Prefix(prefix) => label.starts_with(prefix.as_str()),
            Self::Any => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Atom {
    alternatives: Vec<TagMatcher>,
    quantifier: Quantifier,
}

impl Atom {
    fn matches(&self, label: &str) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(label))
    }
}

/// One `{...}` tag pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    atoms: Vec<Atom>,
    source: String,
}

impl Pattern {
    fn parse(body: &str) -> Result<Self> {
        let mut atoms = Vec::new();
        let mut chars = body.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                c if c.is_whitespace() => {}
                '<' => {
                    let mut inner = String::new();
                    loop {
                        match chars.next() {
                            Some('>') => break,
                            Some(ch) => inner.push(ch),
                            None => {
                                return Err(KpxError::validation(format!(
                                    "Unclosed '<' in grammar pattern {{{}}}",
                                    body
                                )))
                            }
                        }
                    }
                    let alternatives = inner
                        .split('|')
                        .map(TagMatcher::parse)
                        .collect::<Result<Vec<_>>>()?;
                    let quantifier = match chars.peek() {
                        Some('*') => Quantifier::ZeroOrMore,
                        Some('+') => Quantifier::OneOrMore,
                        Some('?') => Quantifier::ZeroOrOne,
                        _ => Quantifier::One,
                    };
                    if quantifier != Quantifier::One {
                        chars.next();
                    }
                    atoms.push(Atom {
                        alternatives,
                        quantifier,
                    });
                }
                other => {
                    return Err(KpxError::validation(format!(
                        "Unexpected '{}' in grammar pattern {{{}}}",
                        other, body
                    )))
                }
            }
        }

        if atoms.is_empty() {
            return Err(KpxError::validation("Empty grammar pattern"));
        }

        Ok(Self {
            atoms,
            source: body.trim().to_string(),
        })
    }

    /// End of the preferred match starting at `start`, if any
    ///
    /// Quantified atoms are greedy and give back items when the rest of the
    /// pattern fails, as with a backtracking regex.
    fn match_at(&self, labels: &[&str], start: usize) -> Option<usize> {
        match_atoms(&self.atoms, labels, start)
    }
}

fn match_atoms(atoms: &[Atom], labels: &[&str], pos: usize) -> Option<usize> {
    let Some((atom, rest)) = atoms.split_first() else {
        return Some(pos);
    };

    let (min, max) = atom.quantifier.bounds();
    let mut available = 0;
    while pos + available < labels.len()
        && max.map_or(true, |m| available < m)
        && atom.matches(labels[pos + available])
    {
        available += 1;
    }
    if available < min {
        return None;
    }

    (min..=available)
        .rev()
        .find_map(|taken| match_atoms(rest, labels, pos + taken))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Stage {
    label: String,
    patterns: Vec<Pattern>,
}

/// A node of the chunked sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNode {
    /// Index of an input tag
    Leaf(usize),
    Chunk { label: String, children: Vec<ParseNode> },
}

impl ParseNode {
    /// Leaf indices under this node, in order
    pub fn leaves(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<usize>) {
        match self {
            Self::Leaf(index) => out.push(*index),
            Self::Chunk { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    fn collect_spans(&self, label: &str, out: &mut Vec<Range<usize>>) {
        if let Self::Chunk {
            label: own,
            children,
        } = self
        {
            if own == label {
                let leaves = self.leaves();
                if let (Some(first), Some(last)) = (leaves.first(), leaves.last()) {
                    out.push(*first..*last + 1);
                }
            }
            for child in children {
                child.collect_spans(label, out);
            }
        }
    }
}

/// A parsed cascade of chunking stages
///
/// # Examples
///
/// ```
/// use kpx_core::candidates::ChunkGrammar;
///
/// let grammar: ChunkGrammar = "NP: {<ADJ>*<NOUN>+}".parse().unwrap();
/// let spans = grammar.spans(&["ADJ", "NOUN", "ADP", "NOUN"], "NP");
///
/// assert_eq!(spans, vec![0..2, 3..4]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkGrammar {
    stages: Vec<Stage>,
}

impl ChunkGrammar {
    /// Labels of the stages, in order
    pub fn labels(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.label.as_str()).collect()
    }

    /// Runs every stage over `tags` and returns the top-level nodes
    pub fn parse_tags(&self, tags: &[&str]) -> Vec<ParseNode> {
        let mut nodes: Vec<ParseNode> = (0..tags.len()).map(ParseNode::Leaf).collect();

        for stage in &self.stages {
            nodes = apply_stage(stage, nodes, tags);
        }

        nodes
    }

    /// Leaf ranges of every chunk labelled `label`, outermost first
    pub fn spans(&self, tags: &[&str], label: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        for node in self.parse_tags(tags) {
            node.collect_spans(label, &mut spans);
        }
        spans
    }
}

/// Items of a stage in progress: untouched nodes or chunks made in this stage
enum Item {
    Open(ParseNode),
    Closed(ParseNode),
}

fn apply_stage(stage: &Stage, nodes: Vec<ParseNode>, tags: &[&str]) -> Vec<ParseNode> {
    let mut items: Vec<Item> = nodes.into_iter().map(Item::Open).collect();

    for pattern in &stage.patterns {
        let mut next: Vec<Item> = Vec::with_capacity(items.len());
        let mut run: Vec<ParseNode> = Vec::new();

        for item in items {
            match item {
                Item::Open(node) => run.push(node),
                Item::Closed(node) => {
                    chunk_run(stage, pattern, std::mem::take(&mut run), tags, &mut next);
                    next.push(Item::Closed(node));
                }
            }
        }
        chunk_run(stage, pattern, run, tags, &mut next);
        items = next;
    }

    items
        .into_iter()
        .map(|item| match item {
            Item::Open(node) | Item::Closed(node) => node,
        })
        .collect()
}

fn chunk_run(
    stage: &Stage,
    pattern: &Pattern,
    run: Vec<ParseNode>,
    tags: &[&str],
    out: &mut Vec<Item>,
) {
    let owned: Vec<String> = run
        .iter()
        .map(|node| match node {
            ParseNode::Leaf(index) => tags[*index].to_string(),
            ParseNode::Chunk { label, .. } => label.clone(),
        })
        .collect();
    let labels: Vec<&str> = owned.iter().map(String::as_str).collect();

    let mut run = run.into_iter().map(Some).collect::<Vec<_>>();
    let mut i = 0;
    while i < run.len() {
        match pattern.match_at(&labels, i).filter(|&end| end > i) {
            Some(end) => {
                let children = run[i..end].iter_mut().filter_map(Option::take).collect();
                out.push(Item::Closed(ParseNode::Chunk {
                    label: stage.label.clone(),
                    children,
                }));
                i = end;
            }
            None => {
                if let Some(node) = run[i].take() {
                    out.push(Item::Open(node));
                }
                i += 1;
            }
        }
    }
}

impl FromStr for ChunkGrammar {
    type Err = KpxError;

    fn from_str(text: &str) -> Result<Self> {
        let mut stages: Vec<Stage> = Vec::new();
        let mut chars = text.chars().peekable();

        while let Some(&c) = chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    chars.next();
                }
                '#' => {
                    while let Some(ch) = chars.next() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                '{' => {
                    chars.next();
                    let mut body = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => body.push(ch),
                            None => return Err(KpxError::validation("Unclosed '{' in grammar")),
                        }
                    }
                    let stage = stages.last_mut().ok_or_else(|| {
                        KpxError::validation("Grammar pattern appears before any label")
                    })?;
                    stage.patterns.push(Pattern::parse(&body)?);
                }
                c if c.is_ascii_alphanumeric() || c == '_' => {
                    let mut label = String::new();
                    while let Some(&ch) = chars.peek() {
                        if ch.is_ascii_alphanumeric() || ch == '_' {
                            label.push(ch);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    while chars.peek().is_some_and(|ch| ch.is_whitespace()) {
                        chars.next();
                    }
                    if chars.next() != Some(':') {
                        return Err(KpxError::validation(format!(
                            "Expected ':' after grammar label {}",
                            label
                        )));
                    }
                    stages.push(Stage {
                        label,
                        patterns: Vec::new(),
                    });
                }
                other => {
                    return Err(KpxError::validation(format!(
                        "Unexpected '{}' in grammar",
                        other
                    )))
                }
            }
        }

        if stages.is_empty() {
            return Err(KpxError::validation("Grammar defines no stages"));
        }
        if let Some(empty) = stages.iter().find(|s| s.patterns.is_empty()) {
            return Err(KpxError::validation(format!(
                "Grammar label {} has no patterns",
                empty.label
            )));
        }

        Ok(Self { stages })
    }
}

impl Default for ChunkGrammar {
    fn default() -> Self {
        DEFAULT_CHUNK_GRAMMAR.clone()
    }
}

impl fmt::Display for ChunkGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            writeln!(f, "{}:", stage.label)?;
            for pattern in &stage.patterns {
                writeln!(f, "    {{{}}}", pattern.source)?;
            }
        }
        Ok(())
    }
}
