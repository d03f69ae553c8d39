//! The import-control policy tree.
//!
//! Nodes live in an arena owned by [`ImportControl`] and refer to each other
//! by [`NodeId`]. Children are kept in declaration order, which decides ties
//! when several children match the same package. The tree only grows through
//! `&mut self`; every query takes `&self`, so a built tree can be shared
//! across threads without locking.
//!
//! ```text
//! com.example                (package, disallowed)
//! ├── common                 (package, delegate-to-parent)
//! │   └── Main               (file, delegate-to-parent)
//! └── (?:api|web)            (package regex, delegate-to-parent)
//! ```

use regex::Regex;

use crate::access::{AccessResult, MismatchStrategy};
use crate::error::PolicyError;
use crate::rule::ImportRule;

/// Index of a node inside its [`ImportControl`].
///
/// Ids are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena; the root is `0`.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a node stands for a package or a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A package and, transitively, its sub-packages.
    Package,
    /// One file of the parent package, matched by file name.
    File,
}

/// Compiled form of a regex node name.
#[derive(Debug, Clone)]
struct NodePatterns {
    exact: Regex,
    /// Package nodes only: the name itself or any sub-package of it.
    partial: Option<Regex>,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    name: String,
    /// Package nodes: dotted package, or the composed regex when `patterns`
    /// is set. File nodes: the file name pattern.
    full_name: String,
    patterns: Option<NodePatterns>,
    strategy: MismatchStrategy,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rules: Vec<ImportRule>,
}

impl Node {
    fn is_regex(&self) -> bool {
        self.patterns.is_some()
    }
}

/// Final outcome for one import of one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The import is permitted.
    Allowed,
    /// The policy denies the import.
    Disallowed,
    /// No node of the policy covers the importing package.
    UnknownPackage,
}

fn enclose_in_group(expression: &str) -> String {
    format!("(?:{expression})")
}

fn compile(source: &str, expression: &str) -> Result<Regex, PolicyError> {
    Regex::new(expression).map_err(|e| PolicyError::InvalidRegex {
        pattern: source.to_string(),
        reason: e.to_string(),
    })
}

fn package_patterns(source: &str, full: &str) -> Result<NodePatterns, PolicyError> {
    Ok(NodePatterns {
        exact: compile(source, &format!("^{full}$"))?,
        partial: Some(compile(source, &format!(r"^{full}(?:\..*)?$"))?),
    })
}

/// A tree of packages and files, each with ordered import rules.
#[derive(Debug, Clone)]
pub struct ImportControl {
    nodes: Vec<Node>,
}

impl ImportControl {
    /// Creates a policy whose root covers `pkg` and everything below it.
    ///
    /// # Errors
    ///
    /// Returns an error if `pkg` is empty or, with `regex`, does not compile.
    pub fn new(pkg: &str, regex: bool, strategy: MismatchStrategy) -> Result<Self, PolicyError> {
        if pkg.is_empty() {
            return Err(PolicyError::EmptyName);
        }
        let (full_name, patterns) = if regex {
            let full = enclose_in_group(pkg);
            let patterns = package_patterns(pkg, &full)?;
            (full, Some(patterns))
        } else {
            (pkg.to_string(), None)
        };
        tracing::debug!(pkg, regex, %strategy, "import-control root");
        Ok(Self {
            nodes: vec![Node {
                kind: NodeKind::Package,
                name: pkg.to_string(),
                full_name,
                patterns,
                strategy,
                parent: None,
                children: Vec::new(),
                rules: Vec::new(),
            }],
        })
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a policy has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Read-only view of a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.nodes.get(id.0).map(|node| NodeRef {
            tree: self,
            id,
            node,
        })
    }

    fn package_parent(&self, parent: NodeId) -> Result<&Node, PolicyError> {
        let node = self
            .nodes
            .get(parent.0)
            .ok_or(PolicyError::UnknownNode(parent.0))?;
        if node.kind == NodeKind::File {
            return Err(PolicyError::FileParent {
                name: node.full_name.clone(),
            });
        }
        Ok(node)
    }

    fn attach(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Adds a sub-package below `parent`.
    ///
    /// The child's full name is `parent + "." + name`. When either side is a
    /// regex, literal parts are escaped and regex parts grouped so that an
    /// alternation such as `foo|bar` stays confined to its own segment.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is unknown or a file node, `name` is
    /// empty, or the composed regex does not compile.
    pub fn add_package(
        &mut self,
        parent: NodeId,
        name: &str,
        regex: bool,
        strategy: MismatchStrategy,
    ) -> Result<NodeId, PolicyError> {
        if name.is_empty() {
            return Err(PolicyError::EmptyName);
        }
        let parent_node = self.package_parent(parent)?;
        let (full_name, patterns) = if regex || parent_node.is_regex() {
            let parent_part = if parent_node.is_regex() {
                enclose_in_group(&parent_node.full_name)
            } else {
                regex::escape(&parent_node.full_name)
            };
            let own_part = if regex {
                enclose_in_group(name)
            } else {
                regex::escape(name)
            };
            let full = format!(r"{parent_part}\.{own_part}");
            let patterns = package_patterns(name, &full)?;
            (full, Some(patterns))
        } else {
            (format!("{}.{name}", parent_node.full_name), None)
        };
        tracing::debug!(full_name = %full_name, %strategy, "import-control subpackage");
        Ok(self.attach(
            parent,
            Node {
                kind: NodeKind::Package,
                name: name.to_string(),
                full_name,
                patterns,
                strategy,
                parent: Some(parent),
                children: Vec::new(),
                rules: Vec::new(),
            },
        ))
    }

    /// Adds a file node below the package `parent`.
    ///
    /// `name` is matched against the source file name without extension,
    /// literally or as an anchored regex.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is unknown or a file node, `name` is
    /// empty, a literal `name` contains `.`, or the regex does not compile.
    pub fn add_file(
        &mut self,
        parent: NodeId,
        name: &str,
        regex: bool,
        strategy: MismatchStrategy,
    ) -> Result<NodeId, PolicyError> {
        if name.is_empty() {
            return Err(PolicyError::EmptyName);
        }
        if !regex && name.contains('.') {
            return Err(PolicyError::DottedFileName {
                name: name.to_string(),
            });
        }
        self.package_parent(parent)?;
        let patterns = if regex {
            Some(NodePatterns {
                exact: compile(name, &format!("^{}$", enclose_in_group(name)))?,
                partial: None,
            })
        } else {
            None
        };
        tracing::debug!(file = name, %strategy, "import-control file");
        Ok(self.attach(
            parent,
            Node {
                kind: NodeKind::File,
                name: name.to_string(),
                full_name: name.to_string(),
                patterns,
                strategy,
                parent: Some(parent),
                children: Vec::new(),
                rules: Vec::new(),
            },
        ))
    }

    /// Appends a rule to `node`; rules are consulted in the order added.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn add_rule(&mut self, node: NodeId, rule: ImportRule) -> Result<(), PolicyError> {
        let target = self
            .nodes
            .get_mut(node.0)
            .ok_or(PolicyError::UnknownNode(node.0))?;
        target.rules.push(rule);
        Ok(())
    }

    /// Package equals this node's package, or is a sub-package of it.
    fn matches_at_front(node: &Node, pkg: &str) -> bool {
        match node.patterns.as_ref().and_then(|p| p.partial.as_ref()) {
            Some(partial) => partial.is_match(pkg),
            None => pkg
                .strip_prefix(node.full_name.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.')),
        }
    }

    fn matches_package_exactly(node: &Node, pkg: &str) -> bool {
        match &node.patterns {
            Some(p) => p.exact.is_match(pkg),
            None => node.full_name == pkg,
        }
    }

    /// The `(pkg, file)` pair is this very node, not something below it.
    fn matches_exactly(&self, node: &Node, pkg: &str, file: &str) -> bool {
        match node.kind {
            NodeKind::Package => Self::matches_package_exactly(node, pkg),
            NodeKind::File => {
                let in_parent = node
                    .parent
                    .and_then(|p| self.nodes.get(p.0))
                    .is_some_and(|parent| Self::matches_package_exactly(parent, pkg));
                let file_matches = match &node.patterns {
                    Some(p) => p.exact.is_match(file),
                    None => node.name == file,
                };
                in_parent && file_matches
            }
        }
    }

    /// Finds the most specific node owning `file` in package `pkg`.
    ///
    /// Returns `None` when the root itself does not cover `pkg`; callers
    /// report that as an unknown package, not as a denial.
    #[must_use]
    pub fn locate_finest(&self, pkg: &str, file: &str) -> Option<NodeId> {
        self.locate_finest_from(self.root(), pkg, file)
    }

    /// Like [`locate_finest`](Self::locate_finest), starting at `start`.
    #[must_use]
    pub fn locate_finest_from(&self, start: NodeId, pkg: &str, file: &str) -> Option<NodeId> {
        let node = self.nodes.get(start.0)?;
        match node.kind {
            NodeKind::Package => {
                if !Self::matches_at_front(node, pkg) {
                    return None;
                }
                node.children
                    .iter()
                    .find_map(|&child| self.locate_finest_from(child, pkg, file))
                    .or(Some(start))
            }
            NodeKind::File => self.matches_exactly(node, pkg, file).then_some(start),
        }
    }

    /// Decides whether `import` is allowed for a file governed by `node`.
    ///
    /// Rules of each node are scanned in order and the first match wins.
    /// Local-only rules are skipped unless `(pkg, file)` is the node itself.
    /// When nothing matches, the node's [`MismatchStrategy`] decides, walking
    /// up for [`MismatchStrategy::DelegateToParent`]; a root that delegates
    /// yields `Disallowed`.
    ///
    /// The result is always `Allowed` or `Disallowed`.
    #[must_use]
    pub fn check_access(&self, node: NodeId, pkg: &str, file: &str, import: &str) -> AccessResult {
        let mut current = Some(node);
        while let Some(node) = current.and_then(|id| self.nodes.get(id.0)) {
            let local = self.matches_exactly(node, pkg, file);
            let verdict = node
                .rules
                .iter()
                .filter(|rule| local || !rule.is_local_only())
                .map(|rule| rule.verify_import(import))
                .find(|r| !r.is_unknown());
            if let Some(verdict) = verdict {
                return verdict;
            }
            match node.strategy {
                MismatchStrategy::Allowed => return AccessResult::Allowed,
                MismatchStrategy::Disallowed => return AccessResult::Disallowed,
                MismatchStrategy::DelegateToParent => current = node.parent,
            }
        }
        AccessResult::Disallowed
    }

    /// Locates the owning node and checks `import` against it.
    #[must_use]
    pub fn evaluate(&self, pkg: &str, file: &str, import: &str) -> Decision {
        let Some(node) = self.locate_finest(pkg, file) else {
            return Decision::UnknownPackage;
        };
        let verdict = self.check_access(node, pkg, file, import);
        tracing::trace!(pkg, file, import, node = node.0, %verdict, "import checked");
        match verdict {
            AccessResult::Allowed => Decision::Allowed,
            AccessResult::Disallowed | AccessResult::Unknown => Decision::Disallowed,
        }
    }
}

/// Borrowed view of one node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a ImportControl,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    /// The node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Package or file.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    /// The name as declared (one segment, a file name, or a regex).
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    /// Dotted package for literal package nodes, composed regex for regex
    /// package nodes, file name pattern for file nodes.
    #[must_use]
    pub fn full_name(&self) -> &'a str {
        &self.node.full_name
    }

    /// Whether the node is matched by regex.
    #[must_use]
    pub fn is_regex(&self) -> bool {
        self.node.is_regex()
    }

    /// Strategy for unmatched imports.
    #[must_use]
    pub fn strategy(&self) -> MismatchStrategy {
        self.node.strategy
    }

    /// Rules in priority order.
    #[must_use]
    pub fn rules(&self) -> &'a [ImportRule] {
        &self.node.rules
    }

    /// The parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node.parent.and_then(|p| self.tree.node(p))
    }

    /// Children in declaration order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.node.children.iter().filter_map(move |&c| tree.node(c))
    }
}
