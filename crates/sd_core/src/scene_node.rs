use serde::{Deserialize, Serialize};

use crate::CollisionFlags;

/// A node in the visual subtree owned by a template or an instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(skip, default = "CollisionFlags::normal")]
    pub collision: CollisionFlags,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collision: CollisionFlags::normal(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including the root.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// Whether every node in the subtree carries exactly `flags`.
    pub fn all_collision(&self, flags: CollisionFlags) -> bool {
        self.collision == flags && self.children.iter().all(|c| c.all_collision(flags))
    }
}

/// Assign `flags` to `root` and every descendant.
pub fn set_collision_recursive(root: &mut SceneNode, flags: CollisionFlags) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        node.collision = flags;
        stack.extend(node.children.iter_mut());
    }
}
