//! The type aggregate: a class-like plus everything it inherits.
//!
//! The associated set is the transitive closure of extends / implements /
//! use links, resolved through the symbol store by FQN on every step so a
//! reparse never leaves dangling parent pointers. Cycles are broken with
//! a visited set; a back edge is never followed.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use store::SymbolStore;
use symbols::{Symbol, SymbolKind};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Error, Debug)]
pub enum AggregateError {
    /// Fail-fast contract violation: aggregates only exist for class-likes.
    #[error("not a class-like symbol: {fqn}")]
    NotClassLike { fqn: String },

    /// The FQN has no class-like in the store.
    #[error("unknown class-like: {fqn}")]
    UnknownClassLike { fqn: String },
}

/// How members merge along the inheritance chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Plain concatenation, duplicates kept.
    None,
    /// Root-first, first declaration per name wins.
    #[default]
    Override,
    /// As Override, but a documented member replaces an undocumented one.
    Documented,
    /// Root-first walk with last-seen-wins, so base declarations surface.
    Base,
}

/// Snapshot of one class-like's inheritance graph. Walks the store once
/// at construction; afterwards all queries are pure.
#[derive(Debug)]
pub struct TypeAggregate {
    root: Arc<Symbol>,
    /// Inherited class-likes in breadth-first encounter order, traits
    /// separated out so their members append last.
    ancestors: Vec<Arc<Symbol>>,
    traits: Vec<Arc<Symbol>>,
}

impl TypeAggregate {
    /// Build the aggregate for an FQN.
    pub fn build(
        store: &SymbolStore,
        fqn: &str,
        cancel: &CancellationToken,
    ) -> Result<Self, AggregateError> {
        let root = store
            .class_like(fqn)
            .ok_or_else(|| AggregateError::UnknownClassLike { fqn: fqn.to_string() })?;
        Self::from_symbol(store, root, cancel)
    }

    /// Build the aggregate for an already-looked-up symbol.
    pub fn from_symbol(
        store: &SymbolStore,
        root: Arc<Symbol>,
        cancel: &CancellationToken,
    ) -> Result<Self, AggregateError> {
        if !root.is_class_like() {
            return Err(AggregateError::NotClassLike {
                fqn: root.name.clone(),
            });
        }

        let mut visited: FxHashSet<String> = FxHashSet::default();
        visited.insert(root.name.to_lowercase());

        let mut ancestors = Vec::new();
        let mut traits = Vec::new();
        let mut frontier: Vec<String> = root.associated.clone();

        while let Some(fqn) = frontier.first().cloned() {
            frontier.remove(0);
            if cancel.is_cancelled() {
                ancestors.clear();
                traits.clear();
                break;
            }
            let key = fqn.trim_start_matches('\\').to_lowercase();
            if !visited.insert(key) {
                continue;
            }
            let Some(found) = store.class_like(&fqn) else {
                debug!(fqn = %fqn, "associated class-like not in store");
                continue;
            };
            frontier.extend(found.associated.iter().cloned());
            if found.kind == SymbolKind::Trait {
                traits.push(found);
            } else {
                ancestors.push(found);
            }
        }

        Ok(Self {
            root,
            ancestors,
            traits,
        })
    }

    pub fn root(&self) -> &Arc<Symbol> {
        &self.root
    }

    /// Every class-like reachable from the root, encounter-ordered:
    /// classes and interfaces first, then traits.
    pub fn associated(&self) -> Vec<Arc<Symbol>> {
        self.ancestors
            .iter()
            .chain(self.traits.iter())
            .cloned()
            .collect()
    }

    /// The effective member set under a merge strategy.
    ///
    /// Root members come first, ancestors follow in encounter order, and
    /// trait members append after the class chain. Privates of inherited
    /// class-likes are filtered out; the root's own stay. Interface and
    /// trait roots concatenate without merging.
    pub fn members(&self, strategy: MergeStrategy) -> Vec<&Symbol> {
        let strategy = if self.root.kind == SymbolKind::Class {
            strategy
        } else {
            MergeStrategy::None
        };

        let mut candidates: Vec<&Symbol> = Vec::new();
        candidates.extend(member_children(&self.root));
        for ancestor in self.ancestors.iter().chain(self.traits.iter()) {
            candidates.extend(
                member_children(ancestor)
                    .filter(|m| !m.modifiers.contains(symbols::Modifiers::PRIVATE)),
            );
        }

        if strategy == MergeStrategy::None {
            return candidates;
        }

        let mut kept: Vec<&Symbol> = Vec::new();
        let mut index_of: rustc_hash::FxHashMap<String, usize> = rustc_hash::FxHashMap::default();
        for candidate in candidates {
            let key = candidate.member_key();
            match index_of.get(&key) {
                None => {
                    index_of.insert(key, kept.len());
                    kept.push(candidate);
                }
                Some(&slot) => {
                    let current = kept[slot];
                    if should_replace(strategy, current, candidate) {
                        kept[slot] = candidate;
                    }
                }
            }
        }
        kept
    }

    /// Look up one member by name under Override semantics. Method names
    /// fold case, property and constant names do not.
    pub fn member(&self, name: &str, kind: SymbolKind) -> Option<&Symbol> {
        self.members(MergeStrategy::Override)
            .into_iter()
            .find(|m| {
                m.kind == kind
                    && if kind.case_sensitive() {
                        m.name == name
                    } else {
                        m.name.eq_ignore_ascii_case(name)
                    }
            })
    }
}

fn member_children(symbol: &Symbol) -> impl Iterator<Item = &Symbol> {
    symbol.children.iter().filter(|c| c.kind.is_member())
}

/// Whether `candidate` replaces the currently kept member. A concrete
/// member always beats a kept magic one; a magic member never displaces a
/// concrete one.
fn should_replace(strategy: MergeStrategy, current: &Symbol, candidate: &Symbol) -> bool {
    if current.is_magic() && !candidate.is_magic() {
        return true;
    }
    if candidate.is_magic() && !current.is_magic() {
        return false;
    }
    match strategy {
        MergeStrategy::None | MergeStrategy::Override => false,
        MergeStrategy::Documented => {
            current.description.is_empty() && !candidate.description.is_empty()
        }
        MergeStrategy::Base => true,
    }
}
