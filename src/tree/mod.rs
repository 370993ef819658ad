use phylotree::tree::{Node as PhyloNode, Tree as PhyloTree};

pub type NodeId = phylotree::tree::NodeId;

/// Externally-owned node handle as exposed by the renderer: an `id` string
/// (non-empty for leaves only), ordered children, screen position and the
/// renderer's collapsed flag. The engine only ever reads these.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef {
    pub id: String,
    pub children: Vec<NodeRef>,
    pub x: f32,
    pub y: f32,
    pub collapsed: bool,
}

impl NodeRef {
    pub fn leaf(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            x: 0.0,
            y: 0.0,
            collapsed: false,
        }
    }

    pub fn internal(children: Vec<NodeRef>) -> Self {
        Self {
            id: String::new(),
            children,
            x: 0.0,
            y: 0.0,
            collapsed: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Owned representation of a tree returned by the tree-builder service,
/// with an explicit node list.
#[derive(Debug, Clone)]
pub struct Tree {
    pub newick: String,
    pub root: Option<NodeId>,
    pub nodes: Vec<TreeNode>,
    pub phylo: PhyloTree,
}

impl Tree {
    pub fn new(newick: String, phylo: PhyloTree) -> Self {
        let root = phylo.get_root().ok();
        let nodes = Self::build_nodes_from_phylo(&phylo);
        Self {
            newick,
            root,
            nodes,
            phylo,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.and_then(|id| self.nodes.get(id))
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    pub fn external_nodes(&self) -> Vec<&TreeNode> {
        self.nodes.iter().filter(|node| node.is_leaf()).collect()
    }

    /// Convert to the handle shape the annotation engine consumes. Leaf ids
    /// come from taxon names; internal nodes keep an empty id. Positions are
    /// left at the origin until a renderer lays the tree out.
    pub fn to_node_ref(&self) -> Option<NodeRef> {
        fn convert(tree: &Tree, id: NodeId) -> Option<NodeRef> {
            let node = tree.nodes.get(id)?;
            if node.is_leaf() {
                return Some(NodeRef::leaf(node.name.clone().unwrap_or_default()));
            }
            let children = node
                .children
                .iter()
                .filter_map(|&child| convert(tree, child))
                .collect();
            Some(NodeRef::internal(children))
        }

        self.root.and_then(|root| convert(self, root))
    }

    fn build_nodes_from_phylo(phylo: &PhyloTree) -> Vec<TreeNode> {
        let mut nodes = Vec::with_capacity(phylo.size());
        for idx in 0..phylo.size() {
            match phylo.get(&idx) {
                Ok(node) => nodes.push(TreeNode::from_phylo(node)),
                Err(_) => nodes.push(TreeNode::new(idx, None, None)),
            }
        }
        nodes
    }
}

/// Node within an owned tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub name: Option<String>,
    pub length: Option<f64>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl TreeNode {
    pub fn new(id: NodeId, name: Option<String>, length: Option<f64>) -> Self {
        Self {
            id,
            name,
            length,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn from_phylo(node: &PhyloNode) -> Self {
        let mut tree_node = TreeNode::new(node.id, node.name.clone(), node.parent_edge);
        tree_node.parent = node.parent;
        tree_node.children = node.children.clone();
        tree_node
    }
}
