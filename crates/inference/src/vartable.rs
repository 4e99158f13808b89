//! Scoped variable-type tracking with branch groups.
//!
//! The table is an explicit stack of frames: plain scopes (function,
//! method, closure bodies), branch groups (one per if-chain), and the
//! branch overlays inside them. Keeping the three as a tagged variant
//! avoids conflating scope pushes with branch pushes.

use rustc_hash::FxHashMap;
use symbols::TypeString;

#[derive(Debug)]
enum Frame {
    Scope(FxHashMap<String, TypeString>),
    /// Committed branches of an open group, in push order.
    BranchGroup(Vec<FxHashMap<String, TypeString>>),
    /// The overlay writes land in while a branch is active.
    Branch(FxHashMap<String, TypeString>),
}

#[derive(Debug)]
pub struct VariableTable {
    frames: Vec<Frame>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::Scope(FxHashMap::default())],
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Frame::Scope(FxHashMap::default()));
    }

    /// Pop frames up to and including the nearest scope. Unpopped branch
    /// frames inside it are discarded with it.
    pub fn pop_scope(&mut self) {
        while let Some(frame) = self.frames.pop() {
            if matches!(frame, Frame::Scope(_)) {
                break;
            }
        }
        if self.frames.is_empty() {
            self.frames.push(Frame::Scope(FxHashMap::default()));
        }
    }

    pub fn push_branch_group(&mut self) {
        self.frames.push(Frame::BranchGroup(Vec::new()));
    }

    pub fn push_branch(&mut self) {
        self.frames.push(Frame::Branch(FxHashMap::default()));
    }

    /// Commit the active branch overlay into its group.
    pub fn pop_branch(&mut self) {
        let Some(Frame::Branch(vars)) = self.frames.pop() else {
            return;
        };
        if let Some(Frame::BranchGroup(branches)) = self.frames.last_mut() {
            branches.push(vars);
        }
    }

    /// Fold the group into the enclosing frame: per variable touched in
    /// any branch, the union of its per-branch types; a branch that did
    /// not touch the variable contributes the pre-group type instead
    /// (nothing, if there was none).
    pub fn pop_branch_group(&mut self) {
        let Some(Frame::BranchGroup(branches)) = self.frames.pop() else {
            return;
        };

        let mut names: Vec<&String> = branches.iter().flat_map(|b| b.keys()).collect();
        names.sort();
        names.dedup();

        let mut merged: Vec<(String, TypeString)> = Vec::new();
        for name in names {
            let mut union = TypeString::new();
            let mut missed_somewhere = false;
            for branch in &branches {
                match branch.get(name) {
                    Some(ty) => union = union.merge(ty),
                    None => missed_somewhere = true,
                }
            }
            if missed_somewhere && let Some(prior) = self.get_type(name) {
                union = union.merge(&prior);
            }
            merged.push((name.clone(), union));
        }
        for (name, ty) in merged {
            self.set_type(&name, ty);
        }
    }

    /// Bind a variable in the innermost write target: the active branch
    /// overlay when one is open, the scope otherwise.
    pub fn set_type(&mut self, name: &str, ty: TypeString) {
        for frame in self.frames.iter_mut().rev() {
            match frame {
                Frame::Branch(vars) | Frame::Scope(vars) => {
                    vars.insert(name.to_string(), ty);
                    return;
                }
                Frame::BranchGroup(_) => continue,
            }
        }
    }

    /// Lookup precedence: active branch overlay, then the merged view of
    /// committed branches in each open group, then scopes walking out.
    pub fn get_type(&self, name: &str) -> Option<TypeString> {
        for frame in self.frames.iter().rev() {
            match frame {
                Frame::Branch(vars) | Frame::Scope(vars) => {
                    if let Some(ty) = vars.get(name) {
                        return Some(ty.clone());
                    }
                }
                Frame::BranchGroup(branches) => {
                    let mut union = TypeString::new();
                    for branch in branches {
                        if let Some(ty) = branch.get(name) {
                            union = union.merge(ty);
                        }
                    }
                    if !union.is_empty() {
                        return Some(union);
                    }
                }
            }
        }
        None
    }
}

impl Default for VariableTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(text: &str) -> TypeString {
        TypeString::from_text(text)
    }

    #[test]
    fn branch_group_unions_per_branch_types() {
        let mut table = VariableTable::new();
        table.push_branch_group();
        table.push_branch();
        table.set_type("v", ty("A"));
        table.pop_branch();
        table.push_branch();
        table.set_type("v", ty("B"));
        table.pop_branch();
        table.pop_branch_group();
        assert_eq!(table.get_type("v"), Some(ty("A|B")));
    }

    #[test]
    fn untouched_branch_contributes_prior_type() {
        let mut table = VariableTable::new();
        table.set_type("x", ty("Baz"));
        table.push_branch_group();
        table.push_branch();
        table.set_type("x", ty("Bar"));
        table.pop_branch();
        table.push_branch(); // else branch, does not touch x
        table.pop_branch();
        table.pop_branch_group();
        assert_eq!(table.get_type("x"), Some(ty("Bar|Baz")));
    }

    #[test]
    fn lookup_prefers_overlay_then_group_then_scope() {
        let mut table = VariableTable::new();
        table.set_type("x", ty("Baz"));
        table.push_branch_group();
        table.push_branch();
        table.set_type("x", ty("Bar"));
        // Active overlay wins.
        assert_eq!(table.get_type("x"), Some(ty("Bar")));
        table.pop_branch();
        // Committed-branch view wins over the scope binding.
        assert_eq!(table.get_type("x"), Some(ty("Bar")));
        table.push_branch();
        table.set_type("x", ty("Qux"));
        assert_eq!(table.get_type("x"), Some(ty("Qux")));
    }

    #[test]
    fn scopes_isolate_and_restore() {
        let mut table = VariableTable::new();
        table.set_type("a", ty("Outer"));
        table.push_scope();
        table.set_type("a", ty("Inner"));
        assert_eq!(table.get_type("a"), Some(ty("Inner")));
        table.pop_scope();
        assert_eq!(table.get_type("a"), Some(ty("Outer")));
    }

    #[test]
    fn nested_groups_fold_into_the_enclosing_branch() {
        let mut table = VariableTable::new();
        table.push_branch_group();
        table.push_branch();
        // Inner if inside the outer then-branch.
        table.push_branch_group();
        table.push_branch();
        table.set_type("v", ty("A"));
        table.pop_branch();
        table.push_branch();
        table.set_type("v", ty("B"));
        table.pop_branch();
        table.pop_branch_group();
        assert_eq!(table.get_type("v"), Some(ty("A|B")));
        table.pop_branch();
        table.push_branch(); // outer else, untouched
        table.pop_branch();
        table.pop_branch_group();
        assert_eq!(table.get_type("v"), Some(ty("A|B")));
    }
}
