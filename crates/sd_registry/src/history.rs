use sd_core::InstanceId;

use crate::instance::SpawnedInstance;

/// A reversible change to the registry.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
    Placed(SpawnedInstance),
    /// `index` is the position the instance held before removal.
    Removed { instance: SpawnedInstance, index: usize },
}

impl Edit {
    pub fn instance_id(&self) -> InstanceId {
        match self {
            Self::Placed(instance) => instance.instance_id,
            Self::Removed { instance, .. } => instance.instance_id,
        }
    }

    fn remap(&mut self, old: InstanceId, new: InstanceId) {
        let instance = match self {
            Self::Placed(instance) => instance,
            Self::Removed { instance, .. } => instance,
        };
        if instance.instance_id == old {
            instance.instance_id = new;
        }
    }
}

/// Undo and redo stacks of registry edits. No depth limit.
#[derive(Debug, Default)]
pub struct EditHistory {
    undo: Vec<Edit>,
    redo: Vec<Edit>,
}

impl EditHistory {
    /// Record a fresh user edit. Invalidates the redo stack.
    pub fn record(&mut self, edit: Edit) {
        self.undo.push(edit);
        self.redo.clear();
    }

    pub fn pop_undo(&mut self) -> Option<Edit> {
        self.undo.pop()
    }

    pub fn pop_redo(&mut self) -> Option<Edit> {
        self.redo.pop()
    }

    pub fn push_undo(&mut self, edit: Edit) {
        self.undo.push(edit);
    }

    pub fn push_redo(&mut self, edit: Edit) {
        self.redo.push(edit);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Rewrite references after an instance came back under a new id.
    pub fn remap(&mut self, old: InstanceId, new: InstanceId) {
        for edit in self.undo.iter_mut().chain(self.redo.iter_mut()) {
            edit.remap(old, new);
        }
    }
}
