//! Red-Black Tree Backend
//!
//! A self-balancing binary search tree keyed on strings. Nodes live in an
//! index-based arena: child links and the non-owning parent reference are
//! plain indices, so there are no pointer cycles to manage.
//!
//! Rebalancing follows the canonical recipe. Insertion colors the new node
//! red and repairs upward (red uncle: recolor and recurse; black uncle: one
//! or two rotations depending on which side the node and its parent sit on).
//! Deletion swaps a two-child node with its in-order successor, then repairs
//! the black-height deficit at the leaf that actually leaves the tree.

use crate::codec;
use crate::storage::record::Record;
use crate::storage::scheduler::{Scheduler, TaskId};
use crate::storage::Store;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::debug;

type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug)]
struct Node {
    key: String,
    value: Record,
    color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// The tree structure itself, free of any locking or TTL concerns.
#[derive(Default)]
struct Tree {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

impl Tree {
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id].as_ref().expect("live arena slot")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id].as_mut().expect("live arena slot")
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn free_slot(&mut self, id: NodeId) {
        self.nodes[id] = None;
        self.free.push(id);
    }

    fn find(&self, key: &str) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = self.node(id);
            cur = match key.cmp(&node.key) {
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
                std::cmp::Ordering::Equal => return Some(id),
            };
        }
        None
    }

    fn get(&self, key: &str) -> Option<&Record> {
        self.find(key).map(|id| &self.node(id).value)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.find(key).map(|id| &mut self.node_mut(id).value)
    }

    fn insert(&mut self, key: &str, value: Record) -> bool {
        let Some(root) = self.root else {
            let id = self.alloc(Node {
                key: key.to_owned(),
                value,
                color: Color::Black,
                parent: None,
                left: None,
                right: None,
            });
            self.root = Some(id);
            self.len += 1;
            return true;
        };

        // Standard BST descent to the attachment point.
        let mut cur = root;
        let new_id = loop {
            let node = self.node(cur);
            match key.cmp(&node.key) {
                std::cmp::Ordering::Less => match node.left {
                    Some(left) => cur = left,
                    None => {
                        let id = self.alloc_red_child(cur, key, value);
                        self.node_mut(cur).left = Some(id);
                        break id;
                    }
                },
                std::cmp::Ordering::Greater => match node.right {
                    Some(right) => cur = right,
                    None => {
                        let id = self.alloc_red_child(cur, key, value);
                        self.node_mut(cur).right = Some(id);
                        break id;
                    }
                },
                std::cmp::Ordering::Equal => return false,
            }
        };

        self.insertion_fixup(new_id);
        self.len += 1;
        true
    }

    fn alloc_red_child(&mut self, parent: NodeId, key: &str, value: Record) -> NodeId {
        self.alloc(Node {
            key: key.to_owned(),
            value,
            color: Color::Red,
            parent: Some(parent),
            left: None,
            right: None,
        })
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.find(key) {
            Some(id) => {
                self.delete_node(id);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Structural helpers
    // ------------------------------------------------------------------

    fn is_red(&self, id: NodeId) -> bool {
        self.node(id).color == Color::Red
    }

    fn is_left_child(&self, id: NodeId) -> bool {
        self.node(id)
            .parent
            .is_some_and(|p| self.node(p).left == Some(id))
    }

    fn is_right_child(&self, id: NodeId) -> bool {
        self.node(id)
            .parent
            .is_some_and(|p| self.node(p).right == Some(id))
    }

    fn sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        if self.node(parent).left == Some(id) {
            self.node(parent).right
        } else {
            self.node(parent).left
        }
    }

    /// The far nephew sits on the opposite side of the sibling from `id`;
    /// the near nephew on the same side.
    fn nephew(&self, id: NodeId, far: bool) -> Option<NodeId> {
        let sibling = self.sibling(id)?;
        if self.is_left_child(id) == far {
            self.node(sibling).right
        } else {
            self.node(sibling).left
        }
    }

    fn children_black(&self, id: NodeId) -> bool {
        let node = self.node(id);
        !node.left.is_some_and(|l| self.is_red(l)) && !node.right.is_some_and(|r| self.is_red(r))
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: Option<NodeId>) {
        let node = self.node_mut(parent);
        if node.left == Some(old) {
            node.left = new;
        } else if node.right == Some(old) {
            node.right = new;
        }
    }

    /// Flips the node red, unless it is red already or is the root, in which
    /// case it becomes black.
    fn recolor(&mut self, id: NodeId) {
        let color = if self.is_red(id) || self.root == Some(id) {
            Color::Black
        } else {
            Color::Red
        };
        self.node_mut(id).color = color;
    }

    fn swap_colors(&mut self, a: NodeId, b: NodeId) {
        let color_a = self.node(a).color;
        let color_b = self.node(b).color;
        self.node_mut(a).color = color_b;
        self.node_mut(b).color = color_a;
    }

    fn swap_contents(&mut self, a: NodeId, b: NodeId) {
        debug_assert_ne!(a, b);
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.nodes.split_at_mut(high);
        let node_a = head[low].as_mut().expect("live arena slot");
        let node_b = tail[0].as_mut().expect("live arena slot");
        std::mem::swap(&mut node_a.key, &mut node_b.key);
        std::mem::swap(&mut node_a.value, &mut node_b.value);
    }

    /// Promotes `id` above its parent. With `right` true the parent becomes
    /// the node's right child and the node's former right subtree becomes the
    /// parent's left subtree; the left rotation is symmetric.
    fn rotate(&mut self, id: NodeId, right: bool) {
        let parent = self.node(id).parent.expect("rotation needs a parent");
        let grandpa = self.node(parent).parent;

        match grandpa {
            Some(g) => self.replace_child(g, parent, Some(id)),
            None => self.root = Some(id),
        }
        self.node_mut(id).parent = grandpa;
        self.node_mut(parent).parent = Some(id);

        if right {
            let moved = self.node(id).right;
            self.node_mut(parent).left = moved;
            if let Some(m) = moved {
                self.node_mut(m).parent = Some(parent);
            }
            self.node_mut(id).right = Some(parent);
        } else {
            let moved = self.node(id).left;
            self.node_mut(parent).right = moved;
            if let Some(m) = moved {
                self.node_mut(m).parent = Some(parent);
            }
            self.node_mut(id).left = Some(parent);
        }
    }

    // ------------------------------------------------------------------
    // Insertion rebalancing
    // ------------------------------------------------------------------

    fn insertion_fixup(&mut self, id: NodeId) {
        if self.root == Some(id) {
            return;
        }
        let Some(parent) = self.node(id).parent else {
            return;
        };
        if !self.is_red(parent) {
            return;
        }

        match self.sibling(parent) {
            Some(uncle) if self.is_red(uncle) => {
                self.recolor(parent);
                self.recolor(uncle);
                if let Some(grandpa) = self.node(parent).parent {
                    if self.root != Some(grandpa) {
                        self.recolor(grandpa);
                        self.insertion_fixup(grandpa);
                    }
                }
            }
            _ => self.fixup_rotation(id),
        }
    }

    /// The four black-uncle cases: opposite-side configurations take a double
    /// rotation through the node, same-side configurations a single rotation
    /// of the parent.
    fn fixup_rotation(&mut self, id: NodeId) {
        let parent = self.node(id).parent.expect("fixup node has a parent");

        if self.is_right_child(id) && self.is_left_child(parent) {
            self.rotate(id, false);
            self.rotate(id, true);
            self.recolor(id);
            if let Some(right) = self.node(id).right {
                self.recolor(right);
            }
        } else if self.is_left_child(id) && self.is_right_child(parent) {
            self.rotate(id, true);
            self.rotate(id, false);
            self.recolor(id);
            if let Some(left) = self.node(id).left {
                self.recolor(left);
            }
        } else if self.is_right_child(id) && self.is_right_child(parent) {
            self.rotate(parent, false);
            self.recolor(parent);
            if let Some(left) = self.node(parent).left {
                self.recolor(left);
            }
        } else if self.is_left_child(id) && self.is_left_child(parent) {
            self.rotate(parent, true);
            self.recolor(parent);
            if let Some(right) = self.node(parent).right {
                self.recolor(right);
            }
        }
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    fn delete_node(&mut self, id: NodeId) {
        let (left, right) = {
            let node = self.node(id);
            (node.left, node.right)
        };

        if let (Some(_), Some(right)) = (left, right) {
            // Two children: swap with the in-order successor and delete the
            // successor's slot, which has at most one child.
            let mut successor = right;
            while let Some(l) = self.node(successor).left {
                successor = l;
            }
            self.swap_contents(id, successor);
            self.delete_node(successor);
        } else if let Some(child) = left.or(right) {
            self.swap_contents(id, child);
            self.delete_node(child);
        } else {
            self.deletion_fixup(id);
            match self.node(id).parent {
                Some(parent) => self.replace_child(parent, id, None),
                None => self.root = None,
            }
            self.free_slot(id);
        }
    }

    /// Restores the black-height deficit at `id` before it is unlinked.
    fn deletion_fixup(&mut self, id: NodeId) {
        if self.root == Some(id) || self.is_red(id) {
            return;
        }
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let Some(sibling) = self.sibling(id) else {
            return;
        };

        if !self.is_red(sibling) {
            if self.children_black(sibling) {
                self.recolor(sibling);
                if self.is_red(parent) {
                    self.node_mut(parent).color = Color::Black;
                } else {
                    self.deletion_fixup(parent);
                }
            } else if let Some(far) = self.nephew(id, true).filter(|&n| self.is_red(n)) {
                self.swap_colors(sibling, parent);
                self.recolor(far);
                let toward = self.is_right_child(id);
                self.rotate(sibling, toward);
            } else {
                let near = self.nephew(id, false).expect("near nephew is red");
                self.swap_colors(near, sibling);
                let away = self.is_left_child(id);
                self.rotate(near, away);
                self.deletion_fixup(id);
            }
        } else {
            self.swap_colors(sibling, parent);
            let toward = !self.is_left_child(id);
            self.rotate(sibling, toward);
            self.deletion_fixup(id);
        }
    }

    // ------------------------------------------------------------------
    // Ordered traversal
    // ------------------------------------------------------------------

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.leftmost(root))
    }

    /// In-order successor: the minimum of the right subtree if there is one,
    /// otherwise the first ancestor reached from a left child.
    fn next(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(id).right {
            return Some(self.leftmost(right));
        }
        let mut cur = id;
        while let Some(parent) = self.node(cur).parent {
            if self.node(parent).left == Some(cur) {
                return Some(parent);
            }
            cur = parent;
        }
        None
    }

    fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            cur: self.first(),
        }
    }
}

struct Iter<'a> {
    tree: &'a Tree,
    cur: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Record);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.tree.next(id);
        let node = self.tree.node(id);
        Some((node.key.as_str(), &node.value))
    }
}

struct Inner {
    tree: Tree,
    /// key -> pending expiry task
    pending: HashMap<String, TaskId>,
}

/// The red-black tree backend. Enumeration runs in ascending key order.
pub struct RbTree {
    inner: Arc<Mutex<Inner>>,
    scheduler: Scheduler,
}

impl RbTree {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                tree: Tree::default(),
                pending: HashMap::new(),
            })),
            scheduler: Scheduler::new(),
        }
    }

    /// Stops the expiry workers and waits for them to exit.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    fn set_locked(&self, inner: &mut Inner, key: &str, value: Record, lifetime: Option<u64>) -> bool {
        if !inner.tree.insert(key, value) {
            return false;
        }
        if let Some(secs) = lifetime {
            let id = self.schedule_delete(key, secs);
            inner.pending.insert(key.to_owned(), id);
        }
        true
    }

    fn delete_locked(&self, inner: &mut Inner, key: &str) -> bool {
        if let Some(id) = inner.pending.remove(key) {
            self.scheduler.stop_task(id);
        }
        inner.tree.remove(key)
    }

    fn schedule_delete(&self, key: &str, secs: u64) -> TaskId {
        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        let key = key.to_owned();
        self.scheduler.delay_task(Duration::from_secs(secs), move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap();
                inner.pending.remove(&key);
                if inner.tree.remove(&key) {
                    debug!(key = %key, "expired key removed");
                }
            }
        })
    }
}

impl Default for RbTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for RbTree {
    fn set(&self, key: &str, value: Record, lifetime: Option<u64>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        self.set_locked(&mut inner, key, value, lifetime)
    }

    fn get(&self, key: &str) -> Record {
        let inner = self.inner.lock().unwrap();
        inner.tree.get(key).cloned().unwrap_or_default()
    }

    fn exists(&self, key: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.tree.find(key).is_some()
    }

    fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        self.delete_locked(&mut inner, key)
    }

    fn update(&self, key: &str, patch: &Record) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.tree.get_mut(key) {
            Some(value) => {
                value.merge(patch);
                true
            }
            None => false,
        }
    }

    fn keys(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.tree.iter().map(|(key, _)| key.to_owned()).collect()
    }

    fn rename(&self, from: &str, to: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();

        let Some(value) = inner.tree.get(from).cloned() else {
            return false;
        };
        if from == to {
            return true;
        }

        let remaining = inner
            .pending
            .get(from)
            .map(|id| self.scheduler.remain_time(*id).as_secs());
        if !self.set_locked(&mut inner, to, value, remaining) {
            return false;
        }
        self.delete_locked(&mut inner, from)
    }

    fn ttl(&self, key: &str) -> Option<u64> {
        let inner = self.inner.lock().unwrap();
        inner
            .pending
            .get(key)
            .map(|id| self.scheduler.remain_time(*id).as_secs())
    }

    fn find(&self, query: &Record) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .tree
            .iter()
            .filter(|(_, value)| value.matches(query))
            .map(|(key, _)| key.to_owned())
            .collect()
    }

    fn show_all(&self) -> Vec<Record> {
        let inner = self.inner.lock().unwrap();
        inner.tree.iter().map(|(_, value)| value.clone()).collect()
    }

    fn upload(&self, path: &Path) -> usize {
        let Ok(file) = File::open(path) else {
            return 0;
        };

        let mut count = 0;
        let mut inner = self.inner.lock().unwrap();
        for line in BufReader::new(file).lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match codec::parse_line(&line) {
                Ok((key, value)) => {
                    self.set_locked(&mut inner, &key, value, None);
                    count += 1;
                }
                Err(_) => break,
            }
        }
        count
    }

    fn export(&self, path: &Path) -> usize {
        let Ok(file) = File::create(path) else {
            return 0;
        };

        let mut writer = BufWriter::new(file);
        let mut count = 0;
        let inner = self.inner.lock().unwrap();
        for (key, value) in inner.tree.iter() {
            if writeln!(writer, "{}", codec::format_line(key, value)).is_err() {
                break;
            }
            count += 1;
        }
        count
    }

    fn len(&self) -> usize {
        self.inner.lock().unwrap().tree.len
    }
}

#[cfg(test)]
impl Tree {
    /// Asserts every red-black invariant plus arena link consistency.
    fn check_invariants(&self) {
        if let Some(root) = self.root {
            assert!(self.node(root).parent.is_none(), "root has a parent");
            assert_eq!(self.node(root).color, Color::Black, "root is red");
            self.check_subtree(root);
        }

        let keys: Vec<_> = self.iter().map(|(key, _)| key).collect();
        assert_eq!(keys.len(), self.len, "len out of sync with traversal");
        assert!(
            keys.windows(2).all(|w| w[0] < w[1]),
            "in-order traversal not strictly ascending"
        );
    }

    /// Returns the black-height of the subtree, checking color and link
    /// invariants along the way.
    fn check_subtree(&self, id: NodeId) -> usize {
        let node = self.node(id);

        for child in [node.left, node.right].into_iter().flatten() {
            assert_eq!(self.node(child).parent, Some(id), "broken parent link");
            if node.color == Color::Red {
                assert_eq!(self.node(child).color, Color::Black, "red-red edge");
            }
        }

        let left_height = node.left.map_or(1, |l| self.check_subtree(l));
        let right_height = node.right.map_or(1, |r| self.check_subtree(r));
        assert_eq!(left_height, right_height, "unequal black-heights");

        left_height + usize::from(node.color == Color::Black)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::contract;

    fn store() -> RbTree {
        RbTree::new()
    }

    #[tokio::test]
    async fn set_then_get() {
        contract::set_then_get(&store());
    }

    #[tokio::test]
    async fn set_twice_keeps_first_value() {
        contract::set_twice_keeps_first_value(&store());
    }

    #[tokio::test]
    async fn get_missing_returns_default() {
        contract::get_missing_returns_default(&store());
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        contract::delete_removes_entry(&store());
    }

    #[tokio::test]
    async fn delete_missing_is_noop() {
        contract::delete_missing_is_noop(&store());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        contract::update_merges_fields(&store());
    }

    #[tokio::test]
    async fn update_missing_returns_false() {
        contract::update_missing_returns_false(&store());
    }

    #[tokio::test]
    async fn rename_semantics() {
        contract::rename_moves_value(&store());
        contract::rename_same_key_succeeds(&store());
        contract::rename_missing_source_fails(&store());
        contract::rename_existing_destination_fails(&store());
    }

    #[tokio::test]
    async fn find_honors_wildcards() {
        contract::find_honors_wildcards(&store());
    }

    #[tokio::test]
    async fn keys_align_with_show_all() {
        contract::keys_align_with_show_all(&store());
    }

    #[tokio::test]
    async fn ttl_absent_without_lifetime() {
        contract::ttl_absent_without_lifetime(&store());
    }

    #[tokio::test]
    async fn ttl_lower_bound() {
        contract::ttl_lower_bound(&store()).await;
    }

    #[tokio::test]
    async fn ttl_expiry_removes_key() {
        contract::ttl_expiry_removes_key(&store()).await;
    }

    #[tokio::test]
    async fn delete_cancels_pending_expiry() {
        contract::delete_cancels_pending_expiry(&store()).await;
    }

    #[tokio::test]
    async fn rename_preserves_ttl() {
        contract::rename_preserves_ttl(&store()).await;
    }

    #[tokio::test]
    async fn upload_export_round_trip() {
        contract::upload_export_round_trip(&store(), &store());
    }

    #[tokio::test]
    async fn upload_missing_file_returns_zero() {
        contract::upload_missing_file_returns_zero(&store());
    }

    #[tokio::test]
    async fn upload_stops_at_first_parse_failure() {
        contract::upload_stops_at_first_parse_failure(&store());
    }

    #[tokio::test]
    async fn keys_are_sorted() {
        let store = store();
        contract::fill(&store);

        let expected: Vec<String> = (0..10).map(|i| format!("foo{i}")).collect();
        assert_eq!(store.keys(), expected);
    }

    #[test]
    fn invariants_hold_for_ascending_inserts() {
        let mut tree = Tree::default();
        for i in 0..100 {
            assert!(tree.insert(&format!("key{i:03}"), Record::default()));
            tree.check_invariants();
        }
        assert_eq!(tree.len, 100);
    }

    #[test]
    fn invariants_hold_for_descending_inserts() {
        let mut tree = Tree::default();
        for i in (0..100).rev() {
            assert!(tree.insert(&format!("key{i:03}"), Record::default()));
            tree.check_invariants();
        }
        assert_eq!(tree.len, 100);
    }

    #[test]
    fn invariants_hold_across_interleaved_deletes() {
        let mut tree = Tree::default();
        for i in 0..100 {
            tree.insert(&format!("key{i:03}"), Record::default());
        }

        // Delete every third key, then every remaining even key.
        for i in (0..100).step_by(3) {
            assert!(tree.remove(&format!("key{i:03}")));
            tree.check_invariants();
        }
        for i in (0..100).step_by(2) {
            tree.remove(&format!("key{i:03}"));
            tree.check_invariants();
        }

        let keys: Vec<_> = tree.iter().map(|(key, _)| key.to_owned()).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn invariants_hold_for_pseudorandom_workload() {
        let mut tree = Tree::default();

        // Simple LCG so the workload is deterministic.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut step = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) as usize
        };

        for _ in 0..500 {
            let key = format!("key{:03}", step() % 250);
            if step() % 3 == 0 {
                tree.remove(&key);
            } else {
                tree.insert(&key, Record::default());
            }
            tree.check_invariants();
        }
    }

    #[test]
    fn delete_root_repeatedly_until_empty() {
        let mut tree = Tree::default();
        for i in 0..32 {
            tree.insert(&format!("key{i:02}"), Record::default());
        }

        while let Some(root) = tree.root {
            let key = tree.node(root).key.clone();
            assert!(tree.remove(&key));
            tree.check_invariants();
        }
        assert_eq!(tree.len, 0);
    }

    #[test]
    fn arena_slots_are_reused() {
        let mut tree = Tree::default();
        tree.insert("a", Record::default());
        tree.insert("b", Record::default());
        tree.remove("a");
        tree.insert("c", Record::default());

        // "c" reclaims the slot freed by "a".
        assert_eq!(tree.nodes.iter().filter(|slot| slot.is_some()).count(), 2);
        assert!(tree.free.is_empty());
    }
}
